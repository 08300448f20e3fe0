//! Configuration system for the cache simulator.
//!
//! This module defines the structures used to parameterize a run. It provides:
//! 1. **Organization:** The validated, immutable cache geometry (S, E, B).
//! 2. **Specs:** Partially-filled organization parameters from files or flags, merged and resolved.
//! 3. **Run config:** General options (verbosity, trace path) loaded from JSON.
//!
//! Configuration is supplied from command-line flags, optionally layered on top of a
//! JSON file. Flags always win over file values.
//!
//! # Example
//!
//! ```
//! use csim_core::config::Config;
//!
//! let json = r#"{ "cache": { "s": 4, "E": 1, "b": 4 } }"#;
//! let config = Config::from_json_str(json).unwrap();
//! let org = config.cache.resolve().unwrap();
//! assert_eq!(org.num_sets(), 16);
//! assert_eq!(org.block_bytes(), 16);
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::common::error::ConfigError;

/// Width of a simulated address in bits.
pub const ADDRESS_BITS: u32 = u64::BITS;

/// Upper bound on `2^S * E`, the number of lines allocated up front.
pub const MAX_TOTAL_LINES: u64 = 1 << 28;

/// Immutable cache geometry.
///
/// Built only through [`Organization::new`], so every instance satisfies
/// `S + B <= 64` and `E >= 1`. Any such organization can decode addresses;
/// building a cache additionally requires [`Organization::check_capacity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Organization {
    #[serde(rename = "s")]
    set_index_bits: u32,
    #[serde(rename = "E")]
    lines_per_set: u32,
    #[serde(rename = "b")]
    block_offset_bits: u32,
}

impl Organization {
    /// Validates and builds a cache organization.
    ///
    /// # Arguments
    ///
    /// * `set_index_bits` - S, the number of set-index bits (`2^S` sets).
    /// * `lines_per_set` - E, the associativity.
    /// * `block_offset_bits` - B, the number of block-offset bits (`2^B` byte blocks).
    ///
    /// # Errors
    ///
    /// [`ConfigError::ZeroAssociativity`] when `E == 0` and [`ConfigError::FieldsTooWide`]
    /// when `S + B > 64`. The arena size is not checked here; see
    /// [`Organization::check_capacity`].
    pub fn new(
        set_index_bits: u32,
        lines_per_set: u32,
        block_offset_bits: u32,
    ) -> Result<Self, ConfigError> {
        if lines_per_set == 0 {
            return Err(ConfigError::ZeroAssociativity);
        }
        let too_wide = set_index_bits
            .checked_add(block_offset_bits)
            .is_none_or(|width| width > ADDRESS_BITS);
        if too_wide {
            return Err(ConfigError::FieldsTooWide {
                set_index_bits,
                block_offset_bits,
            });
        }

        Ok(Self {
            set_index_bits,
            lines_per_set,
            block_offset_bits,
        })
    }

    /// Number of lines a cache with this organization must allocate.
    ///
    /// # Errors
    ///
    /// [`ConfigError::TooLarge`] when `2^S * E` exceeds [`MAX_TOTAL_LINES`].
    pub fn check_capacity(&self) -> Result<usize, ConfigError> {
        let total_lines = self.total_lines();
        let too_large = ConfigError::TooLarge {
            total_lines,
            limit: MAX_TOTAL_LINES,
        };
        if total_lines > MAX_TOTAL_LINES {
            return Err(too_large);
        }
        usize::try_from(total_lines).map_err(|_| too_large)
    }

    /// Number of set-index bits (S).
    #[inline]
    pub const fn set_index_bits(&self) -> u32 {
        self.set_index_bits
    }

    /// Number of lines in each set (E).
    #[inline]
    pub const fn lines_per_set(&self) -> u32 {
        self.lines_per_set
    }

    /// Number of block-offset bits (B).
    #[inline]
    pub const fn block_offset_bits(&self) -> u32 {
        self.block_offset_bits
    }

    /// Width of the tag field, `64 - S - B`.
    #[inline]
    pub const fn tag_bits(&self) -> u32 {
        ADDRESS_BITS - self.set_index_bits - self.block_offset_bits
    }

    /// Number of sets, `2^S`, saturating at `u64::MAX` for `S = 64`.
    pub const fn num_sets(&self) -> u64 {
        match 1u64.checked_shl(self.set_index_bits) {
            Some(sets) => sets,
            None => u64::MAX,
        }
    }

    /// Block size in bytes, `2^B`, saturating at `u64::MAX` for `B = 64`.
    pub const fn block_bytes(&self) -> u64 {
        match 1u64.checked_shl(self.block_offset_bits) {
            Some(bytes) => bytes,
            None => u64::MAX,
        }
    }

    /// Total number of lines, `2^S * E`, saturating at `u64::MAX`.
    pub fn total_lines(&self) -> u64 {
        self.num_sets().saturating_mul(u64::from(self.lines_per_set))
    }
}

/// Organization parameters as supplied by a config file or the command line.
///
/// Any field may be missing; [`OrganizationSpec::resolve`] reports the first gap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrganizationSpec {
    /// Set-index bits (S).
    #[serde(default, rename = "s", alias = "set_index_bits")]
    pub set_index_bits: Option<u32>,

    /// Lines per set (E).
    #[serde(default, rename = "E", alias = "lines_per_set")]
    pub lines_per_set: Option<u32>,

    /// Block-offset bits (B).
    #[serde(default, rename = "b", alias = "block_offset_bits")]
    pub block_offset_bits: Option<u32>,
}

impl OrganizationSpec {
    /// Layers `overrides` on top of `self`; fields set in `overrides` win.
    #[must_use]
    pub fn merge(self, overrides: Self) -> Self {
        Self {
            set_index_bits: overrides.set_index_bits.or(self.set_index_bits),
            lines_per_set: overrides.lines_per_set.or(self.lines_per_set),
            block_offset_bits: overrides.block_offset_bits.or(self.block_offset_bits),
        }
    }

    /// Turns the collected parameters into a validated [`Organization`].
    ///
    /// # Errors
    ///
    /// [`ConfigError::Missing`] naming the first unset parameter, or any error
    /// from [`Organization::new`].
    pub fn resolve(&self) -> Result<Organization, ConfigError> {
        let s = self.set_index_bits.ok_or(ConfigError::Missing("s"))?;
        let e = self.lines_per_set.ok_or(ConfigError::Missing("E"))?;
        let b = self.block_offset_bits.ok_or(ConfigError::Missing("b"))?;
        Organization::new(s, e, b)
    }
}

impl From<Organization> for OrganizationSpec {
    fn from(org: Organization) -> Self {
        Self {
            set_index_bits: Some(org.set_index_bits),
            lines_per_set: Some(org.lines_per_set),
            block_offset_bits: Some(org.block_offset_bits),
        }
    }
}

/// General run options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Echo every trace record with its hit/miss/eviction outcome.
    #[serde(default)]
    pub verbose: bool,

    /// Trace file to replay.
    #[serde(default, rename = "trace", alias = "trace_path")]
    pub trace_path: Option<PathBuf>,
}

/// Root configuration: cache organization plus general options.
///
/// Every section is optional in JSON; missing sections take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Cache organization parameters.
    #[serde(default)]
    pub cache: OrganizationSpec,

    /// General run options.
    #[serde(default)]
    pub general: GeneralConfig,
}

impl Config {
    /// Parses a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] if the text is not a valid configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] if the file cannot be read, [`ConfigError::Parse`]
    /// if its contents are invalid.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Returns the trace path, or [`ConfigError::MissingTracePath`].
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingTracePath`] when no trace was configured.
    pub fn trace_path(&self) -> Result<&Path, ConfigError> {
        self.general
            .trace_path
            .as_deref()
            .ok_or(ConfigError::MissingTracePath)
    }
}
