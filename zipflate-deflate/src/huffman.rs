//! Canonical Huffman codes for DEFLATE.
//!
//! Code lengths are derived from symbol frequencies with the package-merge
//! algorithm, which yields optimal codes under a maximum-length constraint.
//! Codes are then assigned canonically: ascending by `(length, symbol)`,
//! incrementing by one within a length and shifting left by one whenever the
//! length grows. Decoders rebuild the same codes from the lengths alone.
//!
//! # Alphabets
//!
//! DEFLATE uses three Huffman alphabets:
//! - **Literal/Length**: 0-285 (0-255 literals, 256 EOB, 257-285 lengths)
//! - **Distance**: 0-29 (back-reference distances)
//! - **Code Length**: 0-18 (for encoding dynamic Huffman trees)

use std::collections::BTreeMap;
use zipflate_core::bitstream::{BitCode, BitReader};
use zipflate_core::error::{Result, ZipflateError};

/// Maximum code length for the literal/length and distance alphabets.
pub const MAX_CODE_LENGTH: u8 = 15;

/// Maximum code length for the code-length alphabet.
pub const MAX_CODELEN_CODE_LENGTH: u8 = 7;

/// Size of the literal/length alphabet (0-285).
pub const LITLEN_ALPHABET_SIZE: usize = 286;

/// Size of the distance alphabet (0-29).
pub const DISTANCE_ALPHABET_SIZE: usize = 30;

/// Size of the code length alphabet (0-18).
pub const CODELEN_ALPHABET_SIZE: usize = 19;

/// End of block symbol.
pub const END_OF_BLOCK: u16 = 256;

/// Tabulate symbol occurrences.
///
/// The map iterates in ascending symbol order, which the package-merge
/// tie-break depends on.
pub fn count_frequencies<I>(symbols: I) -> BTreeMap<u16, u32>
where
    I: IntoIterator<Item = u16>,
{
    let mut freqs = BTreeMap::new();
    for symbol in symbols {
        *freqs.entry(symbol).or_insert(0) += 1;
    }
    freqs
}

/// An intermediate node of the package-merge algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Package {
    /// Sum of the frequencies of every symbol in the package.
    weight: u64,
    /// Symbols contained in the package (with repetition).
    symbols: Vec<u16>,
    min_symbol: u16,
}

impl Package {
    fn single(symbol: u16, weight: u32) -> Self {
        Self {
            weight: weight as u64,
            symbols: vec![symbol],
            min_symbol: symbol,
        }
    }

    fn merge(first: &Package, second: &Package) -> Self {
        let mut symbols = Vec::with_capacity(first.symbols.len() + second.symbols.len());
        symbols.extend_from_slice(&first.symbols);
        symbols.extend_from_slice(&second.symbols);
        Self {
            weight: first.weight + second.weight,
            symbols,
            min_symbol: first.min_symbol.min(second.min_symbol),
        }
    }

    fn sort_key(&self) -> (u64, usize, u16) {
        (self.weight, self.symbols.len(), self.min_symbol)
    }
}

/// Derive length-limited code lengths from symbol frequencies.
///
/// A lone symbol gets length 1. Fails when the alphabet cannot fit into
/// `max_length` bits.
pub fn package_merge(freqs: &BTreeMap<u16, u32>, max_length: u8) -> Result<BTreeMap<u16, u8>> {
    match freqs.len() {
        0 => return Ok(BTreeMap::new()),
        1 => return Ok(freqs.keys().map(|&symbol| (symbol, 1)).collect()),
        n if max_length >= 32 || n > (1usize << max_length) => {
            return Err(ZipflateError::invalid_input(format!(
                "{} symbols do not fit in {}-bit codes",
                n, max_length
            )));
        }
        _ => {}
    }

    let mut previous: Vec<Package> = Vec::new();
    for _ in 0..max_length {
        let mut round: Vec<Package> = freqs
            .iter()
            .map(|(&symbol, &weight)| Package::single(symbol, weight))
            .collect();
        round.extend(
            previous
                .chunks_exact(2)
                .map(|pair| Package::merge(&pair[0], &pair[1])),
        );

        // Stable: equal keys keep their construction order.
        round.sort_by_key(Package::sort_key);
        if round.len() % 2 != 0 {
            round.pop();
        }
        previous = round;
    }

    let mut lengths = BTreeMap::new();
    for package in &previous {
        for &symbol in &package.symbols {
            *lengths.entry(symbol).or_insert(0u8) += 1;
        }
    }
    Ok(lengths)
}

/// Assign canonical codes to `(symbol, length)` pairs.
fn assign_canonical<I>(lengths: I) -> BTreeMap<u16, BitCode>
where
    I: IntoIterator<Item = (u16, u8)>,
{
    let mut ordered: Vec<(u8, u16)> = lengths
        .into_iter()
        .filter(|&(_, len)| len > 0)
        .map(|(symbol, len)| (len, symbol))
        .collect();
    ordered.sort_unstable();

    let mut codes = BTreeMap::new();
    let Some(&(mut current_len, _)) = ordered.first() else {
        return codes;
    };

    let mut code = 0u32;
    for (len, symbol) in ordered {
        while current_len < len {
            code <<= 1;
            current_len += 1;
        }
        codes.insert(symbol, BitCode::new(code, len));
        code += 1;
    }
    codes
}

/// Symbol to codeword mapping used by the encoder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeTable {
    codes: BTreeMap<u16, BitCode>,
}

impl EncodeTable {
    /// Build a table from symbol frequencies.
    pub fn from_frequencies(freqs: &BTreeMap<u16, u32>, max_length: u8) -> Result<Self> {
        let lengths = package_merge(freqs, max_length)?;
        Ok(Self::from_lengths(&lengths))
    }

    /// Build a table from explicit code lengths. Zero lengths are skipped.
    pub fn from_lengths(lengths: &BTreeMap<u16, u8>) -> Self {
        Self {
            codes: assign_canonical(lengths.iter().map(|(&s, &l)| (s, l))),
        }
    }

    /// Look up the codeword for `symbol`.
    pub fn code(&self, symbol: u16) -> Result<BitCode> {
        self.codes.get(&symbol).copied().ok_or_else(|| {
            ZipflateError::corrupted(0, format!("symbol {} missing from Huffman table", symbol))
        })
    }

    /// Code length for `symbol`, or 0 if it has no code.
    pub fn code_length(&self, symbol: u16) -> u8 {
        self.codes.get(&symbol).map_or(0, |code| code.length)
    }

    /// Highest symbol that has a code.
    pub fn max_symbol(&self) -> Option<u16> {
        self.codes.keys().next_back().copied()
    }

    /// Number of symbols with a code.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Iterate `(symbol, code)` pairs in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, BitCode)> + '_ {
        self.codes.iter().map(|(&s, &c)| (s, c))
    }
}

/// Codeword to symbol mapping used by the decoder.
///
/// Canonical codes of one length are consecutive, so each length only needs
/// its first code and the offset of its first symbol.
#[derive(Debug, Clone)]
pub struct DecodeTable {
    /// Symbols ordered by `(length, symbol)`.
    symbols: Vec<u16>,
    /// First code value for each length.
    first_code: [u32; MAX_CODE_LENGTH as usize + 1],
    /// Index into `symbols` of the first symbol of each length.
    offsets: [u16; MAX_CODE_LENGTH as usize + 1],
    /// Number of codes of each length.
    counts: [u16; MAX_CODE_LENGTH as usize + 1],
    min_length: u8,
    max_length: u8,
}

impl DecodeTable {
    /// Build a table from per-symbol code lengths (`lengths[symbol]`).
    ///
    /// Rejects lengths above 15 and over-subscribed codes. Incomplete codes
    /// are accepted, as DEFLATE allows a single distance code.
    pub fn from_lengths(lengths: &[u8]) -> Result<Self> {
        let mut counts = [0u32; MAX_CODE_LENGTH as usize + 1];
        for &len in lengths {
            if len > MAX_CODE_LENGTH {
                return Err(ZipflateError::corrupted(
                    0,
                    format!("code length {} exceeds maximum {}", len, MAX_CODE_LENGTH),
                ));
            }
            counts[len as usize] += 1;
        }

        let mut left = 1i64;
        for &count in &counts[1..] {
            left = (left << 1) - count as i64;
            if left < 0 {
                return Err(ZipflateError::corrupted(0, "over-subscribed Huffman code"));
            }
        }

        Ok(Self::build(lengths))
    }

    /// Build a table from lengths already known to be valid.
    pub(crate) fn build(lengths: &[u8]) -> Self {
        let mut counts = [0u16; MAX_CODE_LENGTH as usize + 1];
        for &len in lengths.iter().filter(|&&len| len > 0) {
            counts[len as usize] += 1;
        }

        // counts[0] is always zero here, so unused symbols never shift codes.
        let mut first_code = [0u32; MAX_CODE_LENGTH as usize + 1];
        let mut offsets = [0u16; MAX_CODE_LENGTH as usize + 1];
        let mut code = 0u32;
        let mut offset = 0u16;
        for len in 1..=MAX_CODE_LENGTH as usize {
            code = (code + counts[len - 1] as u32) << 1;
            first_code[len] = code;
            offsets[len] = offset;
            offset += counts[len];
        }

        let mut symbols = vec![0u16; offset as usize];
        let mut next = offsets;
        for (symbol, &len) in lengths.iter().enumerate() {
            if len > 0 {
                symbols[next[len as usize] as usize] = symbol as u16;
                next[len as usize] += 1;
            }
        }

        let min_length = (1..=MAX_CODE_LENGTH).find(|&l| counts[l as usize] > 0).unwrap_or(0);
        let max_length = (1..=MAX_CODE_LENGTH).rev().find(|&l| counts[l as usize] > 0).unwrap_or(0);

        Self {
            symbols,
            first_code,
            offsets,
            counts,
            min_length,
            max_length,
        }
    }

    /// Shortest code length in the table (0 when empty).
    pub fn min_length(&self) -> u8 {
        self.min_length
    }

    /// Longest code length in the table (0 when empty).
    pub fn max_length(&self) -> u8 {
        self.max_length
    }

    /// Whether the table holds no codes.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Decode one symbol.
    ///
    /// Bits are accumulated MSB-first starting at the shortest code length;
    /// no match by the longest length is `CorruptData`. Running out of input
    /// surfaces as `OutOfRange` from the reader.
    #[inline]
    pub fn decode(&self, reader: &mut BitReader<'_>) -> Result<u16> {
        if self.is_empty() {
            return Err(ZipflateError::corrupted(
                reader.byte_position() as u64,
                "symbol decoded from empty Huffman table",
            ));
        }

        let mut code = reader.read_range_coded(self.min_length)?;
        let mut len = self.min_length;
        loop {
            let l = len as usize;
            if code >= self.first_code[l] {
                let index = code - self.first_code[l];
                if index < self.counts[l] as u32 {
                    return Ok(self.symbols[self.offsets[l] as usize + index as usize]);
                }
            }
            if len >= self.max_length {
                break;
            }
            code = (code << 1) | reader.read_bit()?;
            len += 1;
        }

        Err(ZipflateError::corrupted(
            reader.byte_position() as u64,
            "no Huffman code matches input bits",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zipflate_core::bitstream::BitWriter;

    fn assert_prefix_free(table: &EncodeTable) {
        let codes: Vec<BitCode> = table.iter().map(|(_, c)| c).collect();
        for (i, a) in codes.iter().enumerate() {
            for (j, b) in codes.iter().enumerate() {
                if i != j {
                    assert!(!a.is_prefix_of(b), "{:?} is a prefix of {:?}", a, b);
                }
            }
        }
    }

    #[test]
    fn test_count_frequencies() {
        let freqs = count_frequencies([5u16, 1, 5, 3, 5]);
        assert_eq!(freqs.into_iter().collect::<Vec<_>>(), vec![(1, 1), (3, 1), (5, 3)]);
    }

    #[test]
    fn test_single_symbol() {
        let freqs = count_frequencies([256u16]);
        let table = EncodeTable::from_frequencies(&freqs, MAX_CODE_LENGTH).unwrap();
        assert_eq!(table.code(256).unwrap(), BitCode::new(0, 1));
    }

    #[test]
    fn test_empty_input() {
        let table = EncodeTable::from_frequencies(&BTreeMap::new(), MAX_CODE_LENGTH).unwrap();
        assert!(table.is_empty());
        assert!(table.code(0).is_err());
    }

    #[test]
    fn test_package_ordering() {
        let a = Package::single(7, 3);
        let b = Package::single(2, 3);
        let merged = Package::merge(&a, &b);
        assert_eq!(merged.weight, 6);
        assert_eq!(merged.symbols, vec![7, 2]);

        // Equal weight: fewer symbols first, then the smaller symbol.
        let c = Package::single(9, 6);
        assert!(c.sort_key() < merged.sort_key());
        assert!(b.sort_key() < a.sort_key());
    }

    #[test]
    fn test_known_lengths() {
        // Frequencies 1, 1, 2, 4 -> a classic 3/3/2/1 code.
        let freqs: BTreeMap<u16, u32> = [(0, 1), (1, 1), (2, 2), (3, 4)].into_iter().collect();
        let lengths = package_merge(&freqs, MAX_CODE_LENGTH).unwrap();
        assert_eq!(lengths.values().copied().collect::<Vec<_>>(), vec![3, 3, 2, 1]);

        let table = EncodeTable::from_lengths(&lengths);
        assert_eq!(table.code(3).unwrap(), BitCode::new(0b0, 1));
        assert_eq!(table.code(2).unwrap(), BitCode::new(0b10, 2));
        assert_eq!(table.code(0).unwrap(), BitCode::new(0b110, 3));
        assert_eq!(table.code(1).unwrap(), BitCode::new(0b111, 3));
    }

    #[test]
    fn test_length_limit() {
        // Fibonacci weights would need 9-bit codes without a limit.
        let weights = [1u32, 1, 2, 3, 5, 8, 13, 21, 34, 55];
        let freqs: BTreeMap<u16, u32> = weights
            .iter()
            .enumerate()
            .map(|(s, &w)| (s as u16, w))
            .collect();

        let table = EncodeTable::from_frequencies(&freqs, 4).unwrap();
        assert_eq!(table.len(), weights.len());
        assert!(table.iter().all(|(_, c)| c.length <= 4));
        assert_prefix_free(&table);
    }

    #[test]
    fn test_complete_code() {
        let freqs = count_frequencies((0u16..40).flat_map(|s| std::iter::repeat_n(s, (s as usize % 7) + 1)));
        let lengths = package_merge(&freqs, MAX_CODE_LENGTH).unwrap();

        let kraft: f64 = lengths.values().map(|&l| 0.5f64.powi(l as i32)).sum();
        assert!((kraft - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_too_many_symbols() {
        let freqs = count_frequencies(0u16..9);
        assert!(package_merge(&freqs, 3).is_err());
    }

    #[test]
    fn test_deterministic() {
        let freqs = count_frequencies([7u16, 3, 3, 9, 9, 1, 1, 1, 4]);
        let a = EncodeTable::from_frequencies(&freqs, MAX_CODE_LENGTH).unwrap();
        let b = EncodeTable::from_frequencies(&freqs, MAX_CODE_LENGTH).unwrap();
        assert_eq!(a, b);
        assert_prefix_free(&a);
    }

    #[test]
    fn test_decode_simple() {
        // A=0, B=10, C=11
        let table = DecodeTable::from_lengths(&[1, 2, 2]).unwrap();

        // Stream order: 0 | 1 0 | 1 1 | 0 -> bits 0..6 = 0,1,0,1,1,0
        let data = [0b0001_1010u8];
        let mut reader = BitReader::new(&data);

        assert_eq!(table.decode(&mut reader).unwrap(), 0);
        assert_eq!(table.decode(&mut reader).unwrap(), 1);
        assert_eq!(table.decode(&mut reader).unwrap(), 2);
        assert_eq!(table.decode(&mut reader).unwrap(), 0);
    }

    #[test]
    fn test_encode_decode_agree() {
        let freqs = count_frequencies([0u16, 0, 0, 1, 2, 2, 5, 5, 5, 5, 9]);
        let encode = EncodeTable::from_frequencies(&freqs, MAX_CODE_LENGTH).unwrap();

        let mut lengths = [0u8; 10];
        for (symbol, code) in encode.iter() {
            lengths[symbol as usize] = code.length;
        }
        let decode = DecodeTable::from_lengths(&lengths).unwrap();

        let message = [5u16, 9, 0, 1, 2, 5];
        let mut writer = BitWriter::with_capacity(16);
        for &symbol in &message {
            writer.write_range_coded(encode.code(symbol).unwrap()).unwrap();
        }
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        for &symbol in &message {
            assert_eq!(decode.decode(&mut reader).unwrap(), symbol);
        }
    }

    #[test]
    fn test_incomplete_code_rejects_unused_pattern() {
        // Only code "0" exists; a 1 bit cannot match.
        let table = DecodeTable::from_lengths(&[1, 0, 0]).unwrap();
        let mut reader = BitReader::new(&[0b0000_0010]);
        assert_eq!(table.decode(&mut reader).unwrap(), 0);
        assert!(matches!(
            table.decode(&mut reader),
            Err(ZipflateError::CorruptData { .. })
        ));
    }

    #[test]
    fn test_oversubscribed() {
        assert!(DecodeTable::from_lengths(&[1, 1, 1]).is_err());
        assert!(DecodeTable::from_lengths(&[16]).is_err());
    }

    #[test]
    fn test_empty_decode_table() {
        let table = DecodeTable::from_lengths(&[0, 0]).unwrap();
        assert!(table.is_empty());
        assert!(table.decode(&mut BitReader::new(&[0xFF])).is_err());
    }
}
