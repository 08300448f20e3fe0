//! Simulator: owns the cache model and the run's statistics side-by-side.
//!
//! Each trace record is decoded once and applied to the cache zero, one, or two
//! times depending on its kind; every outcome is folded into [`SimStats`] before
//! the next record is read.

use std::fmt;
use std::io::BufRead;
use std::path::Path;

use tracing::{debug, info, warn};

use super::trace::{AccessKind, TraceLine, TraceReader, TraceRecord};
use crate::cache::{AccessOutcome, CacheModel};
use crate::common::addr;
use crate::common::error::{ConfigError, SimError, TraceError};
use crate::config::Organization;
use crate::stats::SimStats;

/// Outcomes of the accesses performed for one record, in call order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepReport {
    outcomes: [AccessOutcome; 2],
    len: usize,
}

impl StepReport {
    const EMPTY: Self = Self {
        outcomes: [AccessOutcome::Hit; 2],
        len: 0,
    };

    const fn push(&mut self, outcome: AccessOutcome) {
        self.outcomes[self.len] = outcome;
        self.len += 1;
    }

    /// Outcomes in call order: empty for `I`, one for `L`/`S`, two for `M`.
    pub fn outcomes(&self) -> &[AccessOutcome] {
        &self.outcomes[..self.len]
    }

    /// `true` when the record caused no access.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Record text followed by the outcome markers, e.g. `M 20,1 miss hit`.
    pub fn verbose_line(&self, text: &str) -> String {
        format!("{text} {self}")
    }
}

impl fmt::Display for StepReport {
    /// Space-separated markers: `hit`, `miss`, or `miss eviction` per access.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, outcome) in self.outcomes().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(outcome.marker())?;
        }
        Ok(())
    }
}

/// Top-level simulator: cache state plus accumulated counters.
#[derive(Debug, Clone)]
pub struct Simulator {
    /// The simulated cache.
    pub cache: CacheModel,
    /// Counters accumulated so far.
    pub stats: SimStats,
}

impl Simulator {
    /// Creates a simulator with a cold cache.
    ///
    /// # Errors
    ///
    /// [`ConfigError::TooLarge`] if the cache arena cannot be allocated.
    pub fn new(org: Organization) -> Result<Self, ConfigError> {
        Ok(Self {
            cache: CacheModel::new(org)?,
            stats: SimStats::default(),
        })
    }

    /// Applies one trace record.
    ///
    /// `I` records are counted and otherwise ignored. `L` and `S` access the cache
    /// once. `M` accesses it twice at the same address; the second access is
    /// simulated like any other and is not assumed to hit.
    pub fn step(&mut self, record: &TraceRecord) -> StepReport {
        let mut report = StepReport::EMPTY;
        match record.kind {
            AccessKind::Instruction => {
                self.stats.instructions_ignored += 1;
                return report;
            }
            AccessKind::Load => self.stats.loads += 1,
            AccessKind::Store => self.stats.stores += 1,
            AccessKind::Modify => self.stats.modifies += 1,
        }

        let decoded = addr::decode(record.address, self.cache.organization());
        debug!(
            kind = %record.kind,
            address = record.address,
            tag = decoded.tag,
            set = decoded.set_index,
            "record"
        );
        for _ in 0..record.kind.access_count() {
            let outcome = self.cache.access_decoded(&decoded);
            self.stats.record(outcome);
            report.push(outcome);
        }
        report
    }

    /// Replays a whole trace.
    ///
    /// `sink` is called with each simulated (non-`I`) record and its outcomes, in
    /// trace order. Malformed lines are logged, counted in
    /// [`SimStats::skipped_lines`], and skipped.
    ///
    /// # Errors
    ///
    /// [`TraceError::Read`] if the underlying reader fails; counters reflect the
    /// records processed before the failure.
    pub fn run<R, F>(
        &mut self,
        reader: TraceReader<R>,
        mut sink: F,
    ) -> Result<&SimStats, TraceError>
    where
        R: BufRead,
        F: FnMut(&TraceLine, &StepReport),
    {
        let org = *self.cache.organization();
        info!(
            s = org.set_index_bits(),
            e = org.lines_per_set(),
            b = org.block_offset_bits(),
            sets = org.num_sets(),
            "starting simulation"
        );

        for item in reader {
            let line = match item {
                Ok(line) => line,
                Err(err) if err.is_recoverable() => {
                    warn!("skipping {err}");
                    self.stats.skipped_lines += 1;
                    continue;
                }
                Err(err) => return Err(err),
            };
            let report = self.step(&line.record);
            if !report.is_empty() {
                sink(&line, &report);
            }
        }

        info!(
            hits = self.stats.hits,
            misses = self.stats.misses,
            evictions = self.stats.evictions,
            skipped = self.stats.skipped_lines,
            "simulation finished"
        );
        Ok(&self.stats)
    }
}

/// Opens `path` and replays it against a fresh cache built from `org`.
///
/// # Errors
///
/// [`SimError::Config`] if the cache is too large to build, [`SimError::Trace`]
/// if the trace cannot be opened or read.
pub fn simulate_file<F>(org: Organization, path: &Path, sink: F) -> Result<SimStats, SimError>
where
    F: FnMut(&TraceLine, &StepReport),
{
    let mut sim = Simulator::new(org)?;
    let reader = TraceReader::open(path)?;
    let _ = sim.run(reader, sink)?;
    Ok(sim.stats)
}
