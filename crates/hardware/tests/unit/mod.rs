//! # Unit Components
//!
//! Unit tests grouped by library module.

/// Tag / set index / block offset extraction.
pub mod address_decoding;

/// Cache model hit, miss, eviction, and recency bookkeeping.
pub mod cache_model;
