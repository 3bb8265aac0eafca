//! DEFLATE compression.
//!
//! The encoder splits its input into blocks of `DeflateConfig::block_size`
//! bytes and writes every block with dynamic Huffman codes built from that
//! block's own token statistics. Stored framing is available separately
//! through [`deflate_stored`].

use crate::config::DeflateConfig;
use crate::huffman::{
    EncodeTable, END_OF_BLOCK, MAX_CODE_LENGTH, MAX_CODELEN_CODE_LENGTH, count_frequencies,
};
use crate::lz77::{Lz77Token, MatchFinder};
use crate::tables::{CODE_LENGTH_ORDER, distance_symbol, length_symbol};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, trace};
use zipflate_core::bitstream::BitWriter;
use zipflate_core::error::Result;

/// Largest payload of one stored block.
const MAX_STORED_BLOCK: usize = 65_535;

/// Upper bound on the bytes a dynamic block header can take.
const MAX_DYNAMIC_HEADER: usize = 1024;

/// One entry of the run-length coded code-length sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CodeLengthOp {
    /// Code-length alphabet symbol (0-18).
    symbol: u16,
    /// Repeat count carried in the extra bits, for 16, 17 and 18.
    repeat: u8,
}

impl CodeLengthOp {
    fn length(len: u8) -> Self {
        Self {
            symbol: len as u16,
            repeat: 0,
        }
    }

    /// `(bit count, value)` of the extra bits that follow the symbol.
    fn extra(&self) -> Option<(u8, u32)> {
        match self.symbol {
            16 => Some((2, self.repeat as u32 - 3)),
            17 => Some((3, self.repeat as u32 - 3)),
            18 => Some((7, self.repeat as u32 - 11)),
            _ => None,
        }
    }
}

/// Run-length code a code-length sequence with symbols 16, 17 and 18.
fn rle_encode_lengths(lengths: &[u8]) -> Vec<CodeLengthOp> {
    let mut ops = Vec::new();
    let mut i = 0;

    while i < lengths.len() {
        let len = lengths[i];
        let run = lengths[i..].iter().take_while(|&&l| l == len).count();
        i += run;

        let mut left = run;
        if len == 0 {
            while left >= 11 {
                let n = left.min(138);
                ops.push(CodeLengthOp { symbol: 18, repeat: n as u8 });
                left -= n;
            }
            if left >= 3 {
                ops.push(CodeLengthOp { symbol: 17, repeat: left as u8 });
                left = 0;
            }
        } else {
            ops.push(CodeLengthOp::length(len));
            left -= 1;
            while left >= 3 {
                let n = left.min(6);
                ops.push(CodeLengthOp { symbol: 16, repeat: n as u8 });
                left -= n;
            }
        }
        ops.extend(std::iter::repeat_n(CodeLengthOp::length(len), left));
    }

    ops
}

/// Number of code-length code lengths to transmit (at least 4).
fn find_hclen(codelen_table: &EncodeTable) -> usize {
    CODE_LENGTH_ORDER
        .iter()
        .rposition(|&symbol| codelen_table.code_length(symbol as u16) > 0)
        .map_or(4, |last| (last + 1).max(4))
}

/// DEFLATE compressor.
#[derive(Debug, Clone)]
pub struct Deflater {
    config: DeflateConfig,
    finder: MatchFinder,
}

impl Deflater {
    /// Create a compressor. Fails if `config` is unusable.
    pub fn new(config: DeflateConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            finder: MatchFinder::new(&config),
            config,
        })
    }

    /// The configuration in use.
    pub fn config(&self) -> &DeflateConfig {
        &self.config
    }

    /// Compress `data` into a raw DEFLATE stream.
    ///
    /// Empty input produces a single final block holding only the
    /// end-of-block symbol.
    pub fn compress_to_vec(&self, data: &[u8]) -> Result<Vec<u8>> {
        let blocks = data
            .chunks(self.config.block_size)
            .map(|block| (block.len(), self.finder.find_tokens(block)));
        self.encode_blocks(data.len(), blocks)
    }

    /// Compress `data`, searching blocks for matches on the rayon pool.
    ///
    /// Blocks never reference each other, so the output is byte-identical
    /// to [`Deflater::compress_to_vec`].
    #[cfg(feature = "parallel")]
    pub fn compress_to_vec_parallel(&self, data: &[u8]) -> Result<Vec<u8>> {
        let blocks: Vec<(usize, Vec<Lz77Token>)> = data
            .par_chunks(self.config.block_size)
            .map(|block| (block.len(), self.finder.find_tokens(block)))
            .collect();
        self.encode_blocks(data.len(), blocks.into_iter())
    }

    /// Write tokenized blocks, given as `(input length, tokens)` pairs.
    fn encode_blocks(
        &self,
        input_len: usize,
        blocks: impl Iterator<Item = (usize, Vec<Lz77Token>)>,
    ) -> Result<Vec<u8>> {
        let block_count = input_len.div_ceil(self.config.block_size).max(1);
        // A token never costs more than two bytes per input byte.
        let capacity = input_len * 2 + block_count * MAX_DYNAMIC_HEADER + 16;
        let mut writer = BitWriter::with_capacity(capacity);

        if input_len == 0 {
            self.write_dynamic_block(&mut writer, &[], true)?;
            return Ok(writer.finish());
        }

        for (index, (block_len, tokens)) in blocks.enumerate() {
            let is_final = index + 1 == block_count;
            let before = writer.len();
            self.write_dynamic_block(&mut writer, &tokens, is_final)?;
            debug!(
                block = index,
                input = block_len,
                tokens = tokens.len(),
                output = writer.len() - before,
                is_final,
                "wrote dynamic block"
            );
        }

        Ok(writer.finish())
    }

    /// Write one dynamic Huffman block (BTYPE=10).
    fn write_dynamic_block(
        &self,
        writer: &mut BitWriter,
        tokens: &[Lz77Token],
        is_final: bool,
    ) -> Result<()> {
        // Symbol statistics
        let litlen_symbols = tokens
            .iter()
            .map(|token| match *token {
                Lz77Token::Literal(byte) => byte as u16,
                Lz77Token::Match { length, .. } => length_symbol(length).symbol,
            })
            .chain(std::iter::once(END_OF_BLOCK));
        let distance_symbols = tokens.iter().filter_map(|token| match *token {
            Lz77Token::Match { distance, .. } => Some(distance_symbol(distance).symbol),
            Lz77Token::Literal(_) => None,
        });

        let litlen_table =
            EncodeTable::from_frequencies(&count_frequencies(litlen_symbols), MAX_CODE_LENGTH)?;
        let distance_table =
            EncodeTable::from_frequencies(&count_frequencies(distance_symbols), MAX_CODE_LENGTH)?;

        // Code length sequence: literal/length then distance
        let hlit = litlen_table.max_symbol().map_or(257, |max| (max as usize + 1).max(257));
        let hdist = distance_table.max_symbol().map_or(1, |max| max as usize + 1);
        let lengths: Vec<u8> = (0..hlit)
            .map(|symbol| litlen_table.code_length(symbol as u16))
            .chain((0..hdist).map(|symbol| distance_table.code_length(symbol as u16)))
            .collect();

        let ops = rle_encode_lengths(&lengths);
        let codelen_table = EncodeTable::from_frequencies(
            &count_frequencies(ops.iter().map(|op| op.symbol)),
            MAX_CODELEN_CODE_LENGTH,
        )?;
        let hclen = find_hclen(&codelen_table);

        trace!(
            hlit,
            hdist,
            hclen,
            litlen_codes = litlen_table.len(),
            distance_codes = distance_table.len(),
            "dynamic block tables"
        );

        // Block header
        writer.write_range(is_final as u32, 1)?;
        writer.write_range(0b10, 2)?;
        writer.write_range((hlit - 257) as u32, 5)?;
        writer.write_range((hdist - 1) as u32, 5)?;
        writer.write_range((hclen - 4) as u32, 4)?;

        for &symbol in &CODE_LENGTH_ORDER[..hclen] {
            writer.write_range(codelen_table.code_length(symbol as u16) as u32, 3)?;
        }

        for op in &ops {
            writer.write_range_coded(codelen_table.code(op.symbol)?)?;
            if let Some((bits, value)) = op.extra() {
                writer.write_range(value, bits)?;
            }
        }

        // Compressed data
        for token in tokens {
            match *token {
                Lz77Token::Literal(byte) => {
                    writer.write_range_coded(litlen_table.code(byte as u16)?)?;
                }
                Lz77Token::Match { length, distance } => {
                    let len = length_symbol(length);
                    writer.write_range_coded(litlen_table.code(len.symbol)?)?;
                    writer.write_range(len.extra_value as u32, len.extra_bits)?;

                    let dist = distance_symbol(distance);
                    writer.write_range_coded(distance_table.code(dist.symbol)?)?;
                    writer.write_range(dist.extra_value as u32, dist.extra_bits)?;
                }
            }
        }

        writer.write_range_coded(litlen_table.code(END_OF_BLOCK)?)
    }
}

impl Default for Deflater {
    fn default() -> Self {
        Self {
            config: DeflateConfig::DEFAULT,
            finder: MatchFinder::default(),
        }
    }
}

/// Compress data with the default configuration.
pub fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    Deflater::default().compress_to_vec(data)
}

/// Frame data in stored (BTYPE=00) blocks without compressing it.
pub fn deflate_stored(data: &[u8]) -> Result<Vec<u8>> {
    let block_count = data.len().div_ceil(MAX_STORED_BLOCK).max(1);
    let mut writer = BitWriter::with_capacity(data.len() + block_count * 5);

    let mut chunks = data.chunks(MAX_STORED_BLOCK).peekable();
    if chunks.peek().is_none() {
        write_stored_block(&mut writer, &[], true)?;
    }
    while let Some(chunk) = chunks.next() {
        write_stored_block(&mut writer, chunk, chunks.peek().is_none())?;
    }

    debug!(input = data.len(), blocks = block_count, "wrote stored blocks");
    Ok(writer.finish())
}

fn write_stored_block(writer: &mut BitWriter, chunk: &[u8], is_final: bool) -> Result<()> {
    writer.write_range(is_final as u32, 1)?;
    writer.write_range(0b00, 2)?;
    writer.align_to_byte();

    let len = chunk.len() as u16;
    writer.write_bytes(&len.to_le_bytes())?;
    writer.write_bytes(&(!len).to_le_bytes())?;
    writer.write_bytes(chunk)
}
