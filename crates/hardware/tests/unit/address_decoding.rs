//! # Address Decoding Tests
//!
//! Verifies the tag / set index / block offset split for ordinary and
//! degenerate field widths.

use crate::common::org;
use csim_core::common::addr::{DecodedAddr, decode};
use rstest::rstest;

#[rstest]
// s=4, b=4: offset = bits 0..4, set = bits 4..8, tag = bits 8..
#[case(4, 4, 0x7ff0_0038, 0x7ff000, 0x3, 0x8)]
#[case(4, 4, 0x0000_0000, 0x0, 0x0, 0x0)]
#[case(1, 4, 0x0000_0010, 0x0, 0x1, 0x0)]
#[case(1, 4, 0x0000_0020, 0x1, 0x0, 0x0)]
// single set: every address lands in set 0
#[case(0, 0, 0xdead_beef, 0xdead_beef, 0x0, 0x0)]
#[case(0, 5, 0xffff_ffe3, 0x7ff_ffff, 0x0, 0x3)]
// no block offset
#[case(3, 0, 0b1101_0110, 0b1_1010, 0b110, 0x0)]
fn decode_splits_fields(
    #[case] s: u32,
    #[case] b: u32,
    #[case] address: u64,
    #[case] tag: u64,
    #[case] set_index: u64,
    #[case] block_offset: u64,
) {
    let d = decode(address, &org(s, 1, b));
    assert_eq!(
        d,
        DecodedAddr {
            tag,
            set_index,
            block_offset
        }
    );
}

#[test]
fn full_width_block_offset_leaves_no_tag_or_set() {
    let d = decode(u64::MAX, &org(0, 1, 64));
    assert_eq!(d.tag, 0);
    assert_eq!(d.set_index, 0);
    assert_eq!(d.block_offset, u64::MAX);
}

#[test]
fn zero_width_tag_keeps_set_and_offset() {
    // s + b = 64: everything above the offset is set index.
    let o = org(28, 1, 36);
    let address = 0xabcd_ef12_3456_789a;
    let d = decode(address, &o);
    assert_eq!(d.tag, 0);
    assert_eq!(d.set_index, address >> 36);
    assert_eq!(d.block_offset, address & ((1 << 36) - 1));
    assert_eq!(d.recombine(&o), address);
}

#[rstest]
#[case(40, 24)]
#[case(64, 0)]
#[case(29, 0)]
#[case(63, 1)]
fn wide_set_fields_decode_without_a_cache(#[case] s: u32, #[case] b: u32) {
    let o = org(s, 1, b);
    let address = 0xfedc_ba98_7654_3210;
    let d = decode(address, &o);
    assert_eq!(d.tag, address.checked_shr(s + b).unwrap_or(0));
    assert_eq!(d.block_offset, address & ((1u64 << b) - 1));
    assert_eq!(d.recombine(&o), address);
}

#[test]
fn full_width_set_index_takes_whole_address() {
    let d = decode(u64::MAX, &org(64, 1, 0));
    assert_eq!(d.tag, 0);
    assert_eq!(d.set_index, u64::MAX);
    assert_eq!(d.block_offset, 0);
}

#[test]
fn set_index_is_always_in_range() {
    let o = org(3, 2, 2);
    for address in (0..4096u64).map(|a| a.wrapping_mul(0x9e37_79b9_7f4a_7c15)) {
        assert!(decode(address, &o).set_index < o.num_sets());
    }
}

#[test]
fn same_block_different_offset_shares_tag_and_set() {
    let o = org(2, 1, 6);
    let a = decode(0x1000, &o);
    let b = decode(0x1000 + 63, &o);
    assert_eq!((a.tag, a.set_index), (b.tag, b.set_index));
    assert_ne!(a.block_offset, b.block_offset);
}

#[test]
fn recombine_restores_address() {
    let o = org(5, 4, 6);
    for address in [0, 1, 0x7ff0_0000_1234, u64::MAX, 0x8000_0000_0000_0000] {
        assert_eq!(decode(address, &o).recombine(&o), address);
    }
}
