//! Static DEFLATE tables (RFC 1951 Sections 3.2.5 to 3.2.7).
//!
//! Length and distance symbols carry a base value plus a number of extra
//! bits. The fixed Huffman decode tables are built once on first use and
//! shared read-only afterwards.

use crate::huffman::DecodeTable;
use std::sync::OnceLock;

/// Base lengths for literal/length symbols 257-285.
pub const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115,
    131, 163, 195, 227, 258,
];

/// Extra bits for literal/length symbols 257-285.
pub const LENGTH_EXTRA_BITS: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/// Base distances for distance symbols 0-29.
pub const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

/// Extra bits for distance symbols 0-29.
pub const DISTANCE_EXTRA_BITS: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// Transmission order of the code-length code lengths.
pub const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Minimum match length.
pub const MIN_MATCH: usize = 3;

/// Maximum match length.
pub const MAX_MATCH: usize = 258;

/// Size of the back-reference window.
pub const WINDOW_SIZE: usize = 32768;

/// A symbol together with the extra bits that refine it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolExtra {
    /// Huffman symbol.
    pub symbol: u16,
    /// Number of extra bits following the symbol.
    pub extra_bits: u8,
    /// Value carried in the extra bits.
    pub extra_value: u16,
}

/// Map a match length (3-258) to its literal/length symbol.
pub fn length_symbol(length: u16) -> SymbolExtra {
    debug_assert!((3..=258).contains(&length), "Length out of range: {}", length);

    // 258 has its own symbol even though 227 + 31 would also reach it.
    let index = if length == 258 {
        LENGTH_BASE.len() - 1
    } else {
        LENGTH_BASE[..LENGTH_BASE.len() - 1].partition_point(|&base| base <= length) - 1
    };

    SymbolExtra {
        symbol: 257 + index as u16,
        extra_bits: LENGTH_EXTRA_BITS[index],
        extra_value: length - LENGTH_BASE[index],
    }
}

/// Map a distance (1-32768) to its distance symbol.
pub fn distance_symbol(distance: u16) -> SymbolExtra {
    debug_assert!(distance >= 1, "Distance out of range: {}", distance);

    let index = DISTANCE_BASE.partition_point(|&base| base <= distance) - 1;

    SymbolExtra {
        symbol: index as u16,
        extra_bits: DISTANCE_EXTRA_BITS[index],
        extra_value: distance - DISTANCE_BASE[index],
    }
}

/// Fixed literal/length code lengths: 8, 9, 7 and 8 bits for the ranges
/// 0-143, 144-255, 256-279 and 280-287.
pub fn fixed_litlen_lengths() -> [u8; 288] {
    std::array::from_fn(|symbol| match symbol {
        0..=143 => 8,
        144..=255 => 9,
        256..=279 => 7,
        _ => 8,
    })
}

/// Fixed distance code lengths: 5 bits for all 30 symbols.
pub fn fixed_distance_lengths() -> [u8; 30] {
    [5; 30]
}

/// Fixed literal/length decode table.
pub fn fixed_litlen_table() -> &'static DecodeTable {
    static TABLE: OnceLock<DecodeTable> = OnceLock::new();
    TABLE.get_or_init(|| DecodeTable::build(&fixed_litlen_lengths()))
}

/// Fixed distance decode table.
pub fn fixed_distance_table() -> &'static DecodeTable {
    static TABLE: OnceLock<DecodeTable> = OnceLock::new();
    TABLE.get_or_init(|| DecodeTable::build(&fixed_distance_lengths()))
}
