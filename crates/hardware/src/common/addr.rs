//! Address decomposition.
//!
//! Splits a 64-bit address into the three fields a set-associative cache cares about:
//!
//! ```text
//!  63                    S+B  S+B-1        B  B-1           0
//! +-------------------------+---------------+---------------+
//! |           tag           |   set index   | block offset  |
//! +-------------------------+---------------+---------------+
//! ```
//!
//! Decoding is total for every organization with `S + B <= 64`, including the
//! degenerate widths where a field is empty or spans the whole address.

use crate::config::Organization;

/// An address split into tag, set index, and block offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DecodedAddr {
    /// Upper `64 - S - B` bits.
    pub tag: u64,
    /// Middle `S` bits.
    pub set_index: u64,
    /// Low `B` bits. Not used for cache decisions.
    pub block_offset: u64,
}

/// Mask with the low `bits` bits set, for `bits` in `0..=64`.
#[inline(always)]
const fn low_mask(bits: u32) -> u64 {
    match 1u64.checked_shl(bits) {
        Some(bit) => bit - 1,
        None => u64::MAX,
    }
}

/// Logical right shift where shifting by the full width yields zero.
#[inline(always)]
const fn shr(value: u64, amount: u32) -> u64 {
    match value.checked_shr(amount) {
        Some(v) => v,
        None => 0,
    }
}

/// Left shift where shifting by the full width yields zero.
#[inline(always)]
const fn shl(value: u64, amount: u32) -> u64 {
    match value.checked_shl(amount) {
        Some(v) => v,
        None => 0,
    }
}

/// Splits `address` according to `org`.
///
/// # Arguments
///
/// * `address` - Raw 64-bit address from the trace.
/// * `org` - Cache organization supplying S and B.
///
/// # Returns
///
/// The tag (`address >> (S + B)`), the set index (bits `B..S+B`), and the block offset.
#[inline]
pub const fn decode(address: u64, org: &Organization) -> DecodedAddr {
    let s = org.set_index_bits();
    let b = org.block_offset_bits();
    DecodedAddr {
        tag: shr(address, s + b),
        set_index: shr(address, b) & low_mask(s),
        block_offset: address & low_mask(b),
    }
}

impl DecodedAddr {
    /// Concatenates the fields back into the original address.
    pub const fn recombine(&self, org: &Organization) -> u64 {
        let s = org.set_index_bits();
        let b = org.block_offset_bits();
        shl(self.tag, s + b) | shl(self.set_index, b) | self.block_offset
    }

    /// Set index as an arena index.
    ///
    /// In range for any cache built with the organization passed to [`decode`].
    #[inline]
    pub const fn set(&self) -> usize {
        self.set_index as usize
    }
}
