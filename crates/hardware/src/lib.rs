//! Trace-driven set-associative cache simulator library.
//!
//! This crate replays valgrind memory traces against a configurable cache with the following:
//! 1. **Addressing:** Splitting 64-bit addresses into tag, set index, and block offset.
//! 2. **Cache:** Set/line storage with least-recently-used replacement.
//! 3. **Simulation:** Trace parsing and per-record dispatch (load, store, modify).
//! 4. **Configuration:** Validated cache organization and JSON config files.
//! 5. **Statistics:** Hit, miss, and eviction counters with text and JSON reporting.

/// Cache model (line arena, access, LRU victim selection).
pub mod cache;
/// Common types (address decoding, errors).
pub mod common;
/// Simulator configuration (organization, general options, JSON loading).
pub mod config;
/// Trace reader and driver.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Set-associative LRU cache model; construct with `CacheModel::new`.
pub use crate::cache::{AccessOutcome, CacheModel};
/// Validated cache geometry; construct with `Organization::new`.
pub use crate::config::{Config, Organization};
/// Driver that replays a trace against a `CacheModel`.
pub use crate::sim::Simulator;
/// Run counters.
pub use crate::stats::SimStats;
