//! Common types shared across the cache simulator.
//!
//! This module provides:
//! 1. **Address decoding:** Splitting a raw address into tag, set index, and block offset.
//! 2. **Error handling:** Configuration, trace, and run-level error types.

/// Address decomposition into tag / set index / block offset.
pub mod addr;

/// Error types for configuration, trace reading, and runs.
pub mod error;

pub use addr::{DecodedAddr, decode};
pub use error::{ConfigError, RecordError, SimError, TraceError};
