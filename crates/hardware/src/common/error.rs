//! Error definitions for the cache simulator.
//!
//! This module defines the failure taxonomy of a simulation run. It provides:
//! 1. **Configuration errors:** Missing or inconsistent cache organization and run parameters.
//! 2. **Trace errors:** Unreadable trace files (fatal) and malformed records (skippable).
//! 3. **Run errors:** An umbrella type returned by top-level entry points.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Invalid or incomplete simulator configuration.
///
/// Always fatal: a run never starts with a configuration that produced one of these.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required organization parameter was not supplied (`s`, `E` or `b`).
    #[error("missing required parameter -{0}")]
    Missing(&'static str),

    /// Associativity of zero leaves no line to hold a block.
    #[error("lines per set (E) must be at least 1")]
    ZeroAssociativity,

    /// Set-index and block-offset fields together exceed the address width.
    #[error(
        "set index bits ({set_index_bits}) + block offset bits ({block_offset_bits}) exceed 64"
    )]
    FieldsTooWide {
        /// Requested set-index bit count (S).
        set_index_bits: u32,
        /// Requested block-offset bit count (B).
        block_offset_bits: u32,
    },

    /// The line arena `2^S * E` would be larger than the simulator allows.
    #[error("cache needs {total_lines} lines, limit is {limit}")]
    TooLarge {
        /// Number of lines the organization asks for (saturated at `u64::MAX`).
        total_lines: u64,
        /// Maximum number of lines accepted.
        limit: u64,
    },

    /// No trace file was given.
    #[error("missing required trace file (-t)")]
    MissingTracePath,

    /// A configuration file could not be read.
    #[error("could not read config file '{}'", path.display())]
    Read {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// A configuration file is not valid JSON for [`Config`](crate::config::Config).
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure while reading or decoding the trace.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The trace file could not be opened.
    #[error("could not open trace file '{}'", path.display())]
    Open {
        /// Path of the trace file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// Reading from an open trace failed part-way through.
    #[error("trace read failed at line {line}")]
    Read {
        /// 1-based line number that could not be read.
        line: usize,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// A line does not have the `<kind> <hex address>,<size>` shape.
    ///
    /// The driver skips these and keeps going.
    #[error("malformed trace line {line} ({reason}): {text:?}")]
    Malformed {
        /// 1-based line number.
        line: usize,
        /// Raw line text.
        text: String,
        /// What was wrong with it.
        #[source]
        reason: RecordError,
    },
}

impl TraceError {
    /// Returns `true` for errors the driver recovers from by skipping the line.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}

/// Why a single trace record could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Nothing but whitespace.
    #[error("empty record")]
    Empty,
    /// First character is not one of `I`, `L`, `S`, `M`.
    #[error("unknown access kind {0:?}")]
    UnknownKind(char),
    /// Kind letter not followed by whitespace.
    #[error("expected whitespace after access kind")]
    MissingSeparator,
    /// No `,` between address and size.
    #[error("expected `<address>,<size>`")]
    MissingComma,
    /// Address is empty, not hexadecimal, or wider than 64 bits.
    #[error("invalid hexadecimal address")]
    BadAddress,
    /// Size is empty or not a decimal integer.
    #[error("invalid access size")]
    BadSize,
}

/// Any error that aborts a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    /// Bad configuration, detected before simulation starts.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Trace could not be opened or read.
    #[error(transparent)]
    Trace(#[from] TraceError),
}
