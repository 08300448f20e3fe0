//! Cache Model Unit Tests.
//!
//! Verifies hit/miss/eviction classification, LRU victim choice, recency
//! bookkeeping, and set isolation of `CacheModel`. Most tests drive the model
//! through the harness with byte-granular blocks (`b = 0`) so addresses and tags
//! coincide in single-set caches.

use crate::common::{TestContext, org};
use csim_core::cache::CacheModel;
use pretty_assertions::assert_eq;

use csim_core::cache::AccessOutcome::{Hit, MissNoEviction, MissWithEviction};

// ──────────────────────────────────────────────────────────
// 1. Cold and warm accesses
// ──────────────────────────────────────────────────────────

#[test]
fn new_cache_is_cold() {
    let cache = CacheModel::new(org(2, 3, 4)).unwrap();
    for set in 0..4 {
        assert_eq!(cache.valid_lines(set), 0);
        assert!(cache.lines(set).iter().all(|l| !l.is_valid()));
    }
    assert_eq!(cache.recency_counter(), 0);
    assert_eq!(cache.num_sets(), 4);
}

#[test]
fn oversized_cache_is_refused() {
    let err = CacheModel::new(org(29, 1, 0)).unwrap_err();
    assert!(matches!(
        err,
        csim_core::common::ConfigError::TooLarge {
            total_lines: 536_870_912,
            ..
        }
    ));
}

#[test]
fn first_access_is_a_miss_without_eviction() {
    let mut cache = CacheModel::new(org(0, 1, 0)).unwrap();
    assert_eq!(cache.access(7, 0), MissNoEviction);
    assert_eq!(cache.resident_tags(0), vec![7]);
}

#[test]
fn repeated_access_hits() {
    let mut cache = CacheModel::new(org(0, 2, 0)).unwrap();
    assert_eq!(cache.access(7, 0), MissNoEviction);
    for _ in 0..5 {
        assert_eq!(cache.access(7, 0), Hit);
    }
    assert_eq!(cache.valid_lines(0), 1);
}

#[test]
fn offsets_within_a_block_hit() {
    let mut cache = CacheModel::new(org(1, 1, 4)).unwrap();
    assert_eq!(cache.access_address(0x40), MissNoEviction);
    assert_eq!(cache.access_address(0x4f), Hit);
    assert!(cache.contains(0x47));
    assert!(!cache.contains(0x50));
}

// ──────────────────────────────────────────────────────────
// 2. Eviction and LRU order
// ──────────────────────────────────────────────────────────

/// 1 set, 2 lines: [0, 1, 2] fills both lines, then evicts tag 0.
#[test]
fn third_distinct_tag_evicts_oldest() {
    let mut ctx = TestContext::new(0, 2, 0);
    let outcomes = ctx.loads(&[0, 1, 2]);
    assert_eq!(
        outcomes,
        vec![
            MissNoEviction,
            MissNoEviction,
            MissWithEviction { evicted_tag: 0 }
        ]
    );
    assert_eq!(ctx.counts(), (0, 3, 1));
    assert_eq!(ctx.sim.cache.resident_tags(0), vec![2, 1]);
}

/// Re-touching tag 0 makes tag 1 the victim.
#[test]
fn hit_refreshes_recency() {
    let mut ctx = TestContext::new(0, 2, 0);
    let outcomes = ctx.loads(&[0, 1, 0, 2]);
    assert_eq!(
        outcomes,
        vec![
            MissNoEviction,
            MissNoEviction,
            Hit,
            MissWithEviction { evicted_tag: 1 }
        ]
    );
    assert_eq!(ctx.counts(), (1, 3, 1));
    assert!(ctx.sim.cache.contains(0));
    assert!(!ctx.sim.cache.contains(1));
}

#[test]
fn direct_mapped_conflicts_always_evict() {
    let mut ctx = TestContext::new(0, 1, 0);
    let outcomes = ctx.loads(&[1, 2, 1, 2]);
    assert_eq!(
        outcomes,
        vec![
            MissNoEviction,
            MissWithEviction { evicted_tag: 1 },
            MissWithEviction { evicted_tag: 2 },
            MissWithEviction { evicted_tag: 1 },
        ]
    );
    assert_eq!(ctx.counts(), (0, 4, 3));
}

#[test]
fn four_way_evicts_in_lru_order() {
    let mut ctx = TestContext::new(0, 4, 0);
    let _ = ctx.loads(&[10, 11, 12, 13]);
    // Touch 10 and 12 so 11 then 13 are the oldest.
    assert_eq!(ctx.loads(&[10, 12]), vec![Hit, Hit]);
    assert_eq!(ctx.load(14), MissWithEviction { evicted_tag: 11 });
    assert_eq!(ctx.load(15), MissWithEviction { evicted_tag: 13 });
    assert_eq!(ctx.load(16), MissWithEviction { evicted_tag: 10 });
    let mut resident = ctx.sim.cache.resident_tags(0);
    resident.sort_unstable();
    assert_eq!(resident, vec![12, 14, 15, 16]);
}

/// An invalid line is filled even when the set also holds valid lines.
#[test]
fn invalid_line_preferred_over_eviction() {
    let mut ctx = TestContext::new(0, 3, 0);
    let _ = ctx.loads(&[1, 2]);
    assert_eq!(ctx.load(3), MissNoEviction);
    assert_eq!(ctx.counts().2, 0);
    assert_eq!(ctx.sim.cache.valid_lines(0), 3);
}

#[test]
fn evicted_line_is_reused_in_place() {
    let mut cache = CacheModel::new(org(0, 2, 0)).unwrap();
    let _ = cache.access(1, 0);
    let _ = cache.access(2, 0);
    let _ = cache.access(3, 0);
    // Tag 1 sat in slot 0; tag 3 replaces it there.
    let tags: Vec<u64> = cache.lines(0).iter().map(|l| l.tag()).collect();
    assert_eq!(tags, vec![3, 2]);
}

// ──────────────────────────────────────────────────────────
// 3. Set isolation
// ──────────────────────────────────────────────────────────

/// s=1, E=1, b=0: addresses 0 and 2 both have bit 0 clear, so both map to
/// set 0 with tags 0 and 1 and keep evicting each other.
#[test]
fn two_sets_colliding_addresses() {
    let mut ctx = TestContext::new(1, 1, 0);
    let o = *ctx.sim.cache.organization();
    let a = csim_core::common::decode(0, &o);
    let b = csim_core::common::decode(2, &o);
    assert_eq!((a.set_index, a.tag), (0, 0));
    assert_eq!((b.set_index, b.tag), (0, 1));

    let stats = ctx.run_trace("L 0,1\nL 2,1\nL 0,1\n");
    assert_eq!((stats.hits, stats.misses, stats.evictions), (0, 3, 2));
}

/// s=1, E=1, b=0: address 1 lands in set 1 and does not disturb set 0.
#[test]
fn two_sets_separate_addresses() {
    let mut ctx = TestContext::new(1, 1, 0);
    let stats = ctx.run_trace("L 0,1\nL 1,1\nL 0,1\n");
    assert_eq!((stats.hits, stats.misses, stats.evictions), (1, 2, 0));
    assert_eq!(ctx.sim.cache.resident_tags(0), vec![0]);
    assert_eq!(ctx.sim.cache.resident_tags(1), vec![0]);
}

#[test]
fn filling_one_set_leaves_others_cold() {
    let mut cache = CacheModel::new(org(2, 2, 0)).unwrap();
    for tag in 0..6 {
        let _ = cache.access(tag, 3);
    }
    assert_eq!(cache.valid_lines(3), 2);
    for set in 0..3 {
        assert_eq!(cache.valid_lines(set), 0);
    }
}

// ──────────────────────────────────────────────────────────
// 4. Recency clock
// ──────────────────────────────────────────────────────────

#[test]
fn clock_advances_on_every_access() {
    let mut cache = CacheModel::new(org(1, 2, 0)).unwrap();
    let _ = cache.access(5, 0);
    assert_eq!(cache.recency_counter(), 1);
    let _ = cache.access(5, 0);
    assert_eq!(cache.recency_counter(), 2);
    let _ = cache.access(9, 1);
    assert_eq!(cache.recency_counter(), 3);
}

#[test]
fn recency_stamps_are_unique_across_sets() {
    let mut cache = CacheModel::new(org(1, 2, 0)).unwrap();
    let _ = cache.access(1, 0);
    let _ = cache.access(1, 1);
    let _ = cache.access(2, 0);
    let _ = cache.access(1, 0);
    let mut stamps: Vec<u64> = (0..2)
        .flat_map(|set| cache.lines(set).iter())
        .filter(|l| l.is_valid())
        .map(|l| l.recency())
        .collect();
    stamps.sort_unstable();
    stamps.dedup();
    assert_eq!(stamps, vec![2, 3, 4]);
}

#[test]
#[should_panic]
fn out_of_range_set_index_panics() {
    let mut cache = CacheModel::new(org(1, 1, 0)).unwrap();
    let _ = cache.access(0, 2);
}
