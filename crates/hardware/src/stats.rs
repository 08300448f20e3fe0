//! Simulation statistics collection and reporting.
//!
//! This module tracks the outcome counters of a run. It provides:
//! 1. **Cache outcomes:** Hits, misses, and evictions folded from every access.
//! 2. **Record mix:** Counts by trace record kind, including ignored instruction fetches.
//! 3. **Trace health:** Number of malformed lines that were skipped.
//! 4. **Reporting:** The one-line summary, a sectioned report, and JSON export.

use std::io::{self, Write};

use serde::Serialize;

use crate::cache::AccessOutcome;

/// Simulation statistics structure tracking all counters of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SimStats {
    /// Accesses that found their tag resident.
    pub hits: u64,
    /// Accesses that did not; includes evicting misses.
    pub misses: u64,
    /// Misses that replaced a valid line.
    pub evictions: u64,

    /// Load (`L`) records processed.
    pub loads: u64,
    /// Store (`S`) records processed.
    pub stores: u64,
    /// Modify (`M`) records processed; each one is two accesses.
    pub modifies: u64,
    /// Instruction-fetch (`I`) records seen and ignored.
    pub instructions_ignored: u64,

    /// Malformed trace lines skipped.
    pub skipped_lines: u64,
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"records"`.
/// Pass an empty slice to `write_sections` to write all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "records"];

impl SimStats {
    /// Folds one access outcome into the counters.
    ///
    /// A hit counts one hit; a miss counts one miss, plus one eviction if a
    /// valid line was replaced.
    pub const fn record(&mut self, outcome: AccessOutcome) {
        match outcome {
            AccessOutcome::Hit => self.hits += 1,
            AccessOutcome::MissNoEviction => self.misses += 1,
            AccessOutcome::MissWithEviction { .. } => {
                self.misses += 1;
                self.evictions += 1;
            }
        }
    }

    /// Total cache accesses, `hits + misses`.
    #[inline]
    pub const fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    /// Accesses implied by the record mix: one per load or store, two per modify.
    #[inline]
    pub const fn expected_accesses(&self) -> u64 {
        self.loads + self.stores + 2 * self.modifies
    }

    /// Hit rate in percent, or `0.0` before any access.
    pub fn hit_rate(&self) -> f64 {
        let total = self.accesses();
        if total == 0 {
            0.0
        } else {
            100.0 * (self.hits as f64 / total as f64)
        }
    }

    /// The classic one-line summary: `hits:H misses:M evictions:E`.
    pub fn summary_line(&self) -> String {
        format!(
            "hits:{} misses:{} evictions:{}",
            self.hits, self.misses, self.evictions
        )
    }

    /// Serializes the counters as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Propagates any `serde_json` serialization failure.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Writes only the requested statistics sections to `out`.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`].
    /// An empty slice writes everything.
    ///
    /// # Errors
    ///
    /// Propagates any failure writing to `out`.
    pub fn write_sections(&self, out: &mut impl Write, sections: &[String]) -> io::Result<()> {
        let want = |name: &str| sections.is_empty() || sections.iter().any(|s| s == name);

        writeln!(out, "==========================================================")?;
        writeln!(out, "CACHE SIMULATION STATISTICS")?;
        writeln!(out, "==========================================================")?;
        if want("summary") {
            writeln!(out, "cache.accesses           {}", self.accesses())?;
            writeln!(out, "cache.hits               {}", self.hits)?;
            writeln!(out, "cache.misses             {}", self.misses)?;
            writeln!(out, "cache.evictions          {}", self.evictions)?;
            writeln!(out, "cache.hit_rate           {:.2}%", self.hit_rate())?;
            writeln!(out, "----------------------------------------------------------")?;
        }
        if want("records") {
            writeln!(out, "TRACE RECORDS")?;
            writeln!(out, "  op.load                {}", self.loads)?;
            writeln!(out, "  op.store               {}", self.stores)?;
            writeln!(out, "  op.modify              {}", self.modifies)?;
            writeln!(out, "  op.ifetch (ignored)    {}", self.instructions_ignored)?;
            writeln!(out, "  lines.skipped          {}", self.skipped_lines)?;
        }
        writeln!(out, "==========================================================")
    }

    /// Writes all statistics sections to `out`.
    ///
    /// Equivalent to `write_sections(out, &[])`.
    ///
    /// # Errors
    ///
    /// Propagates any failure writing to `out`.
    pub fn write_report(&self, out: &mut impl Write) -> io::Result<()> {
        self.write_sections(out, &[])
    }
}
