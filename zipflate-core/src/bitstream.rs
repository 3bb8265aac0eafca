//! Bit-level I/O over in-memory byte buffers.
//!
//! This module provides `BitReader` and `BitWriter` for reading and writing
//! data at the bit level, which is essential for the variable-length codes
//! used by DEFLATE.
//!
//! # Bit Ordering
//!
//! DEFLATE packs bits starting from the least significant bit of each byte.
//! Plain integer fields (block headers, extra bits, stored lengths) are
//! therefore read and written LSB-first with [`BitReader::read_range`] and
//! [`BitWriter::write_range`]. Huffman codes are the exception: they are
//! transmitted most significant bit first, which is what
//! [`BitReader::read_range_coded`] and [`BitWriter::write_range_coded`] do.
//!
//! # Bounds
//!
//! Both sides work on a fixed-size buffer. Any read or write that would move
//! past the end fails with [`ZipflateError::OutOfRange`] instead of producing
//! garbage, so writers must be created with a generous capacity.
//!
//! # Example
//!
//! ```
//! use zipflate_core::bitstream::{BitCode, BitReader, BitWriter};
//!
//! let mut writer = BitWriter::with_capacity(4);
//! writer.write_range(0b101, 3).unwrap();
//! writer.write_range_coded(BitCode::new(0b1100, 4)).unwrap();
//! let bytes = writer.finish();
//!
//! let mut reader = BitReader::new(&bytes);
//! assert_eq!(reader.read_range(3).unwrap(), 0b101);
//! assert_eq!(reader.read_range_coded(4).unwrap(), 0b1100);
//! ```

use crate::error::{Result, ZipflateError};

/// One canonical Huffman codeword.
///
/// `value` holds the code in its natural (MSB-first) orientation; only the
/// low `length` bits are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct BitCode {
    /// Code bits, most significant bit transmitted first.
    pub value: u32,
    /// Number of bits in the code.
    pub length: u8,
}

impl BitCode {
    /// Create a new codeword.
    pub const fn new(value: u32, length: u8) -> Self {
        Self { value, length }
    }

    /// Check whether `self` is a proper or equal prefix of `other`.
    pub fn is_prefix_of(&self, other: &BitCode) -> bool {
        if self.length > other.length {
            return false;
        }
        let shift = other.length - self.length;
        (other.value >> shift) == self.value
    }
}

/// A bit-level reader over a byte slice.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// Underlying bytes.
    data: &'a [u8],
    /// Index of the byte holding the next bit.
    byte_pos: usize,
    /// Index of the next bit inside the current byte (0-7).
    bit_pos: u8,
}

impl<'a> BitReader<'a> {
    /// Create a reader positioned at the first bit of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self::at_offset(data, 0)
    }

    /// Create a reader positioned at byte `offset` of `data`.
    pub fn at_offset(data: &'a [u8], offset: usize) -> Self {
        Self {
            data,
            byte_pos: offset,
            bit_pos: 0,
        }
    }

    /// Current byte cursor.
    pub fn byte_position(&self) -> usize {
        self.byte_pos
    }

    /// Current absolute bit position (for error reporting).
    pub fn bit_position(&self) -> u64 {
        self.byte_pos as u64 * 8 + self.bit_pos as u64
    }

    /// Whether every bit of the buffer has been consumed.
    pub fn is_end(&self) -> bool {
        self.byte_pos >= self.data.len()
    }

    /// Read a single bit.
    #[inline]
    pub fn read_bit(&mut self) -> Result<u32> {
        let byte = *self
            .data
            .get(self.byte_pos)
            .ok_or_else(|| ZipflateError::out_of_range(self.byte_pos, self.data.len()))?;

        let bit = (byte >> self.bit_pos) & 1;
        self.advance(1);
        Ok(bit as u32)
    }

    /// Read up to 32 bits, least significant bit first.
    ///
    /// The first bit read ends up in bit 0 of the result.
    pub fn read_range(&mut self, count: u8) -> Result<u32> {
        debug_assert!(count <= 32, "Cannot read more than 32 bits at once");

        let needed_bits = self.bit_pos as usize + count as usize;
        let last_byte = self.byte_pos + needed_bits.div_ceil(8);
        if count > 0 && last_byte > self.data.len() {
            return Err(ZipflateError::out_of_range(last_byte - 1, self.data.len()));
        }

        let mut result = 0u64;
        let mut filled = 0u8;
        while filled < count {
            let available = 8 - self.bit_pos;
            let take = available.min(count - filled);
            let chunk = (self.data[self.byte_pos] >> self.bit_pos) as u64 & ((1u64 << take) - 1);
            result |= chunk << filled;
            filled += take;
            self.advance(take);
        }

        Ok(result as u32)
    }

    /// Read `count` bits, most significant bit first.
    ///
    /// Each bit read is shifted in from the right, which is how canonical
    /// Huffman codes are accumulated.
    pub fn read_range_coded(&mut self, count: u8) -> Result<u32> {
        let mut result = 0u32;
        for _ in 0..count {
            result = (result << 1) | self.read_bit()?;
        }
        Ok(result)
    }

    /// Skip the remaining bits of the current byte.
    pub fn align_to_byte(&mut self) {
        if self.bit_pos != 0 {
            self.byte_pos += 1;
            self.bit_pos = 0;
        }
    }

    /// Read `len` raw bytes. The reader is aligned to a byte boundary first.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.align_to_byte();

        let end = self.byte_pos + len;
        if end > self.data.len() {
            return Err(ZipflateError::out_of_range(end, self.data.len()));
        }

        let bytes = &self.data[self.byte_pos..end];
        self.byte_pos = end;
        Ok(bytes)
    }

    #[inline]
    fn advance(&mut self, bits: u8) {
        let total = self.bit_pos + bits;
        self.byte_pos += (total / 8) as usize;
        self.bit_pos = total % 8;
    }
}

/// A bit-level writer into a fixed-capacity byte buffer.
///
/// Call [`BitWriter::finish`] when done; it pads the final partial byte with
/// zero bits and returns the bytes written.
#[derive(Debug, Clone)]
pub struct BitWriter {
    /// Pre-sized output buffer (zero-filled).
    buffer: Vec<u8>,
    /// Index of the byte receiving the next bit.
    byte_pos: usize,
    /// Index of the next bit inside the current byte (0-7).
    bit_pos: u8,
}

impl BitWriter {
    /// Create a writer that can hold at most `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: vec![0; capacity],
            byte_pos: 0,
            bit_pos: 0,
        }
    }

    /// Maximum number of bytes this writer can produce.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Number of bytes touched so far, including a trailing partial byte.
    pub fn len(&self) -> usize {
        self.byte_pos + usize::from(self.bit_pos != 0)
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bit index inside the current byte (0 when byte-aligned).
    pub fn bit_index(&self) -> u8 {
        self.bit_pos
    }

    /// Whether the cursor has reached the end of the buffer.
    pub fn is_end(&self) -> bool {
        self.byte_pos >= self.buffer.len()
    }

    /// Complete bytes written so far.
    pub fn written(&self) -> &[u8] {
        &self.buffer[..self.byte_pos]
    }

    /// Write a single bit.
    #[inline]
    pub fn write_bit(&mut self, bit: u32) -> Result<()> {
        if self.is_end() {
            return Err(ZipflateError::out_of_range(self.byte_pos, self.buffer.len()));
        }

        self.buffer[self.byte_pos] |= ((bit & 1) as u8) << self.bit_pos;
        self.bit_pos += 1;
        if self.bit_pos == 8 {
            self.byte_pos += 1;
            self.bit_pos = 0;
        }
        Ok(())
    }

    /// Write the low `count` bits of `value`, least significant bit first.
    pub fn write_range(&mut self, value: u32, count: u8) -> Result<()> {
        debug_assert!(count <= 32, "Cannot write more than 32 bits at once");

        let needed_bits = self.bit_pos as usize + count as usize;
        let last_byte = self.byte_pos + needed_bits.div_ceil(8);
        if count > 0 && last_byte > self.buffer.len() {
            return Err(ZipflateError::out_of_range(last_byte - 1, self.buffer.len()));
        }

        let mut value = value as u64;
        let mut remaining = count;
        while remaining > 0 {
            let space = 8 - self.bit_pos;
            let take = space.min(remaining);
            let chunk = (value & ((1u64 << take) - 1)) as u8;
            self.buffer[self.byte_pos] |= chunk << self.bit_pos;
            value >>= take;
            remaining -= take;

            self.bit_pos += take;
            if self.bit_pos == 8 {
                self.byte_pos += 1;
                self.bit_pos = 0;
            }
        }
        Ok(())
    }

    /// Write a Huffman codeword, most significant bit first.
    pub fn write_range_coded(&mut self, code: BitCode) -> Result<()> {
        for shift in (0..code.length).rev() {
            self.write_bit(code.value >> shift)?;
        }
        Ok(())
    }

    /// Pad the current byte with zero bits.
    pub fn align_to_byte(&mut self) {
        if self.bit_pos != 0 {
            self.byte_pos += 1;
            self.bit_pos = 0;
        }
    }

    /// Write raw bytes at the next byte boundary.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.align_to_byte();

        let end = self.byte_pos + bytes.len();
        if end > self.buffer.len() {
            return Err(ZipflateError::out_of_range(end, self.buffer.len()));
        }

        self.buffer[self.byte_pos..end].copy_from_slice(bytes);
        self.byte_pos = end;
        Ok(())
    }

    /// Pad to a byte boundary and return the written bytes.
    pub fn finish(mut self) -> Vec<u8> {
        self.align_to_byte();
        self.buffer.truncate(self.byte_pos);
        self.buffer
    }
}
