//! Set-Associative Cache Model.
//!
//! This module implements the storage and replacement logic of a set-associative
//! cache with LRU replacement. It tracks only which tags are present and how
//! recently they were touched; no data is stored.
//!
//! Lines live in a single arena of `2^S * E` entries, indexed by
//! `set_index * E + slot`, allocated once at construction.

/// LRU hit lookup and victim selection.
pub mod lru;

use tracing::trace;

use self::lru::Slot;
use crate::common::addr::{self, DecodedAddr};
use crate::common::error::ConfigError;
use crate::config::Organization;

/// One storage slot within a set.
///
/// `tag` and `recency` are only meaningful while `valid` is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheLine {
    valid: bool,
    tag: u64,
    recency: u64,
}

impl CacheLine {
    /// A valid line holding `tag`, last touched at `recency`.
    #[inline]
    pub const fn occupied(tag: u64, recency: u64) -> Self {
        Self {
            valid: true,
            tag,
            recency,
        }
    }

    /// Whether the line currently holds a block.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Tag of the resident block.
    #[inline]
    pub const fn tag(&self) -> u64 {
        self.tag
    }

    /// Recency clock value at the last touch; larger is more recent.
    #[inline]
    pub const fn recency(&self) -> u64 {
        self.recency
    }
}

/// Result of a single cache access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessOutcome {
    /// The tag was resident.
    Hit,
    /// The tag was absent and went into a previously invalid line.
    MissNoEviction,
    /// The tag was absent and replaced the least recently used line.
    MissWithEviction {
        /// Tag of the block that was evicted.
        evicted_tag: u64,
    },
}

impl AccessOutcome {
    /// `true` for [`AccessOutcome::Hit`].
    #[inline]
    pub const fn is_hit(&self) -> bool {
        matches!(self, Self::Hit)
    }

    /// `true` for both miss variants.
    #[inline]
    pub const fn is_miss(&self) -> bool {
        !self.is_hit()
    }

    /// `true` when a valid line was replaced.
    #[inline]
    pub const fn is_eviction(&self) -> bool {
        matches!(self, Self::MissWithEviction { .. })
    }

    /// Verbose-mode marker: `hit`, `miss` or `miss eviction`.
    pub const fn marker(&self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::MissNoEviction => "miss",
            Self::MissWithEviction { .. } => "miss eviction",
        }
    }
}

/// Set-associative cache with LRU replacement.
#[derive(Debug, Clone)]
pub struct CacheModel {
    org: Organization,
    ways: usize,
    lines: Vec<CacheLine>,
    clock: u64,
}

impl CacheModel {
    /// Creates a cold cache: every line invalid, recency clock at zero.
    ///
    /// # Arguments
    ///
    /// * `org` - Validated cache organization; fixes the arena size for the model's lifetime.
    ///
    /// # Errors
    ///
    /// [`ConfigError::TooLarge`] when the organization needs more lines than
    /// [`MAX_TOTAL_LINES`](crate::config::MAX_TOTAL_LINES).
    pub fn new(org: Organization) -> Result<Self, ConfigError> {
        let total_lines = org.check_capacity()?;
        Ok(Self {
            org,
            ways: org.lines_per_set() as usize,
            lines: vec![CacheLine::default(); total_lines],
            clock: 0,
        })
    }

    /// Number of sets held by the arena.
    #[inline]
    pub const fn num_sets(&self) -> usize {
        self.lines.len() / self.ways
    }

    /// Organization the model was built with.
    #[inline]
    pub const fn organization(&self) -> &Organization {
        &self.org
    }

    /// Number of accesses performed so far, which is also the latest recency stamp.
    #[inline]
    pub const fn recency_counter(&self) -> u64 {
        self.clock
    }

    /// Lines of set `set_index`, in slot order.
    ///
    /// # Panics
    ///
    /// If `set_index >= self.num_sets()`.
    pub fn lines(&self, set_index: usize) -> &[CacheLine] {
        let base = set_index * self.ways;
        &self.lines[base..base + self.ways]
    }

    /// Number of valid lines in set `set_index`.
    pub fn valid_lines(&self, set_index: usize) -> usize {
        self.lines(set_index).iter().filter(|l| l.valid).count()
    }

    /// Tags resident in set `set_index`, in slot order.
    pub fn resident_tags(&self, set_index: usize) -> Vec<u64> {
        self.lines(set_index)
            .iter()
            .filter(|l| l.valid)
            .map(|l| l.tag)
            .collect()
    }

    /// Whether `address` is currently resident. Does not touch recency.
    pub fn contains(&self, address: u64) -> bool {
        let d = addr::decode(address, &self.org);
        lru::find_hit(self.lines(d.set()), d.tag).is_some()
    }

    /// Simulates one reference to `tag` in set `set_index`.
    ///
    /// On a hit the line's recency is refreshed. On a miss the block goes into the
    /// first invalid line, or replaces the least recently used one when the set is
    /// full. The recency clock advances on every call.
    ///
    /// `set_index` must come from [`addr::decode`] with this model's organization.
    ///
    /// # Panics
    ///
    /// If `set_index >= self.num_sets()`.
    pub fn access(&mut self, tag: u64, set_index: usize) -> AccessOutcome {
        debug_assert!(set_index < self.num_sets(), "set index out of range");
        self.clock += 1;
        let stamp = self.clock;
        let base = set_index * self.ways;
        let set = &mut self.lines[base..base + self.ways];

        if let Some(slot) = lru::find_hit(set, tag) {
            set[slot].recency = stamp;
            trace!(set_index, slot, tag, "hit");
            return AccessOutcome::Hit;
        }

        match lru::select_slot(set) {
            Slot::Fill(slot) => {
                set[slot] = CacheLine::occupied(tag, stamp);
                trace!(set_index, slot, tag, "miss");
                AccessOutcome::MissNoEviction
            }
            Slot::Evict(slot) => {
                let evicted_tag = set[slot].tag;
                set[slot].tag = tag;
                set[slot].recency = stamp;
                trace!(set_index, slot, tag, evicted_tag, "miss eviction");
                AccessOutcome::MissWithEviction { evicted_tag }
            }
        }
    }

    /// Accesses an address already split by [`addr::decode`].
    pub fn access_decoded(&mut self, decoded: &DecodedAddr) -> AccessOutcome {
        self.access(decoded.tag, decoded.set())
    }

    /// Decodes a raw address with this model's organization and accesses it.
    pub fn access_address(&mut self, address: u64) -> AccessOutcome {
        let decoded = addr::decode(address, &self.org);
        self.access_decoded(&decoded)
    }
}
