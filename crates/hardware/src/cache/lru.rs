//! Least Recently Used (LRU) slot selection.
//!
//! Every valid line carries the value of the cache-wide recency clock at its last
//! touch. Since the clock advances by one on every access, stamps are unique and the
//! valid line with the smallest stamp is the least recently used one.
//!
//! On a miss, an invalid line is always preferred over evicting a valid one, so the
//! stamp left in never-used lines has no effect on victim choice.
//!
//! # Performance
//!
//! - **Time Complexity:** O(E) per lookup and per victim scan.
//! - **Space Complexity:** One `u64` stamp per line.

use super::CacheLine;

/// Where a missing block will be placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    /// Fill the invalid line at this slot; nothing is evicted.
    Fill(usize),
    /// Evict the valid least-recently-used line at this slot.
    Evict(usize),
}

/// Returns the slot holding a valid line tagged `tag`, if any.
#[inline]
pub fn find_hit(lines: &[CacheLine], tag: u64) -> Option<usize> {
    lines.iter().position(|line| line.valid && line.tag == tag)
}

/// Chooses the slot a missing block goes into.
///
/// The first invalid slot wins. When the set is full, the valid line with the
/// smallest recency stamp is chosen, ties going to the lowest slot index.
pub fn select_slot(lines: &[CacheLine]) -> Slot {
    if let Some(free) = lines.iter().position(|line| !line.valid) {
        return Slot::Fill(free);
    }

    let mut victim = 0;
    for (slot, line) in lines.iter().enumerate().skip(1) {
        if line.recency < lines[victim].recency {
            victim = slot;
        }
    }
    Slot::Evict(victim)
}
