//! DEFLATE decompression (inflate).
//!
//! This module implements the DEFLATE decompression algorithm as specified
//! in RFC 1951. It supports all three block types:
//! - Type 0: Stored (uncompressed)
//! - Type 1: Fixed Huffman codes
//! - Type 2: Dynamic Huffman codes
//!
//! Decoding is all-or-nothing: on any error the partial output is dropped.
//! Input that runs out before a final block has been decoded is reported as
//! [`ZipflateError::Truncated`].

use crate::huffman::{
    CODELEN_ALPHABET_SIZE, DISTANCE_ALPHABET_SIZE, DecodeTable, END_OF_BLOCK, LITLEN_ALPHABET_SIZE,
};
use crate::tables::{
    CODE_LENGTH_ORDER, DISTANCE_BASE, DISTANCE_EXTRA_BITS, LENGTH_BASE, LENGTH_EXTRA_BITS,
    fixed_distance_table, fixed_litlen_table,
};
use tracing::debug;
use zipflate_core::bitstream::BitReader;
use zipflate_core::error::{Result, ZipflateError};

/// DEFLATE decompressor over an in-memory stream.
#[derive(Debug)]
pub struct Inflater<'a> {
    reader: BitReader<'a>,
    output: Vec<u8>,
    final_block: bool,
}

impl<'a> Inflater<'a> {
    /// Create a decompressor for the stream starting at the beginning of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self::at_offset(data, 0)
    }

    /// Create a decompressor for the stream starting at byte `offset`.
    pub fn at_offset(data: &'a [u8], offset: usize) -> Self {
        Self {
            reader: BitReader::at_offset(data, offset),
            output: Vec::new(),
            final_block: false,
        }
    }

    /// Decode every block up to and including the final one.
    pub fn inflate(mut self) -> Result<Vec<u8>> {
        self.run()?;
        Ok(self.output)
    }

    /// Byte offset just past the last consumed bit.
    pub fn position(&self) -> usize {
        self.reader.byte_position() + usize::from(self.reader.bit_position() % 8 != 0)
    }

    fn run(&mut self) -> Result<()> {
        let mut block = 0usize;
        while !self.final_block {
            if block > 0 && self.reader.is_end() {
                return Err(ZipflateError::truncated(self.reader.byte_position() as u64));
            }
            self.inflate_block(block).map_err(|err| {
                if err.is_out_of_range() {
                    ZipflateError::truncated(self.reader.byte_position() as u64)
                } else {
                    err
                }
            })?;
            block += 1;
        }
        Ok(())
    }

    fn offset(&self) -> u64 {
        self.reader.byte_position() as u64
    }

    fn corrupted(&self, message: impl Into<String>) -> ZipflateError {
        ZipflateError::corrupted(self.offset(), message)
    }

    /// Decompress a single block.
    fn inflate_block(&mut self, index: usize) -> Result<()> {
        self.final_block = self.reader.read_bit()? == 1;
        let btype = self.reader.read_range(2)?;
        let start = self.output.len();

        match btype {
            0 => self.inflate_stored()?,
            1 => self.inflate_huffman(fixed_litlen_table(), fixed_distance_table())?,
            2 => self.inflate_dynamic()?,
            _ => return Err(self.corrupted("reserved block type 3")),
        }

        debug!(
            block = index,
            btype,
            is_final = self.final_block,
            output = self.output.len() - start,
            "inflated block"
        );
        Ok(())
    }

    /// Decompress a stored (uncompressed) block.
    fn inflate_stored(&mut self) -> Result<()> {
        self.reader.align_to_byte();

        let len = self.reader.read_range(16)? as u16;
        let nlen = self.reader.read_range(16)? as u16;
        if len != !nlen {
            return Err(self.corrupted(format!("LEN/NLEN mismatch: {:#06x} vs {:#06x}", len, nlen)));
        }

        let bytes = self.reader.read_bytes(len as usize)?;
        self.output.extend_from_slice(bytes);
        Ok(())
    }

    /// Read the code tables of a dynamic block, then its data.
    fn inflate_dynamic(&mut self) -> Result<()> {
        let hlit = self.reader.read_range(5)? as usize + 257;
        let hdist = self.reader.read_range(5)? as usize + 1;
        let hclen = self.reader.read_range(4)? as usize + 4;

        if hlit > LITLEN_ALPHABET_SIZE || hdist > DISTANCE_ALPHABET_SIZE {
            return Err(self.corrupted(format!("too many codes: HLIT={} HDIST={}", hlit, hdist)));
        }

        let mut codelen_lengths = [0u8; CODELEN_ALPHABET_SIZE];
        for &symbol in &CODE_LENGTH_ORDER[..hclen] {
            codelen_lengths[symbol] = self.reader.read_range(3)? as u8;
        }
        let codelen_table = self.table(&codelen_lengths)?;

        let mut lengths = vec![0u8; hlit + hdist];
        let mut i = 0;
        while i < lengths.len() {
            let (value, repeat) = match codelen_table.decode(&mut self.reader)? {
                symbol @ 0..=15 => (symbol as u8, 1),
                16 => {
                    if i == 0 {
                        return Err(self.corrupted("repeat code 16 with no previous length"));
                    }
                    (lengths[i - 1], self.reader.read_range(2)? as usize + 3)
                }
                17 => (0, self.reader.read_range(3)? as usize + 3),
                18 => (0, self.reader.read_range(7)? as usize + 11),
                symbol => {
                    return Err(self.corrupted(format!("invalid code length symbol {}", symbol)));
                }
            };

            if i + repeat > lengths.len() {
                return Err(self.corrupted("code length run overflows HLIT + HDIST"));
            }
            lengths[i..i + repeat].fill(value);
            i += repeat;
        }

        if lengths[END_OF_BLOCK as usize] == 0 {
            return Err(self.corrupted("no code for end-of-block"));
        }

        let litlen_table = self.table(&lengths[..hlit])?;
        let distance_table = self.table(&lengths[hlit..])?;
        self.inflate_huffman(&litlen_table, &distance_table)
    }

    /// Build a decode table, reporting errors at the current position.
    fn table(&self, lengths: &[u8]) -> Result<DecodeTable> {
        DecodeTable::from_lengths(lengths).map_err(|err| match err {
            ZipflateError::CorruptData { message, .. } => self.corrupted(message),
            other => other,
        })
    }

    /// Decode literal/length and distance symbols until end-of-block.
    fn inflate_huffman(&mut self, litlen: &DecodeTable, distance: &DecodeTable) -> Result<()> {
        loop {
            let symbol = litlen.decode(&mut self.reader)?;
            match symbol {
                0..=255 => self.output.push(symbol as u8),
                END_OF_BLOCK => return Ok(()),
                257..=285 => {
                    let index = (symbol - 257) as usize;
                    let extra = self.reader.read_range(LENGTH_EXTRA_BITS[index])?;
                    let length = LENGTH_BASE[index] as usize + extra as usize;

                    let dist_symbol = distance.decode(&mut self.reader)? as usize;
                    if dist_symbol >= DISTANCE_ALPHABET_SIZE {
                        return Err(self.corrupted(format!("invalid distance symbol {}", dist_symbol)));
                    }
                    let extra = self.reader.read_range(DISTANCE_EXTRA_BITS[dist_symbol])?;
                    let dist = DISTANCE_BASE[dist_symbol] as usize + extra as usize;

                    self.copy_match(dist, length)?;
                }
                _ => {
                    return Err(self.corrupted(format!("invalid literal/length symbol {}", symbol)));
                }
            }
        }
    }

    /// Copy `length` bytes from `distance` back. Overlapping copies repeat.
    fn copy_match(&mut self, distance: usize, length: usize) -> Result<()> {
        if distance > self.output.len() {
            return Err(self.corrupted(format!(
                "distance {} exceeds {} bytes of output",
                distance,
                self.output.len()
            )));
        }

        let start = self.output.len() - distance;
        self.output.reserve(length);
        for i in 0..length {
            let byte = self.output[start + i];
            self.output.push(byte);
        }
        Ok(())
    }
}

/// Decompress a raw DEFLATE stream.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    Inflater::new(data).inflate()
}

/// Decompress a raw DEFLATE stream that starts `offset` bytes into `data`.
pub fn inflate_at(data: &[u8], offset: usize) -> Result<Vec<u8>> {
    Inflater::at_offset(data, offset).inflate()
}
