//! Trace replay.
//!
//! Provides the trace reader and the driver that applies each record to the
//! cache model and accumulates statistics.

/// Trace record parsing.
pub mod trace;

/// Per-record dispatch and whole-trace runs.
pub mod simulator;

pub use simulator::{Simulator, StepReport, simulate_file};
pub use trace::{AccessKind, TraceLine, TraceReader, TraceRecord};
