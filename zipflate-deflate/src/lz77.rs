//! LZ77 match finding for DEFLATE.
//!
//! Each block is searched on its own. Every 3-byte prefix in the block is
//! indexed to the ascending list of positions where it occurs; at each cursor
//! the earlier occurrences inside the 32 KiB window are scanned from the most
//! recent backward and the longest match wins.
//!
//! # Effort
//!
//! The scan is bounded by [`DeflateConfig`]: at most `max_candidates`
//! positions are compared, and the scan stops after `min_candidates` once a
//! match of `good_length` bytes is in hand. This is a greedy heuristic, not
//! an exhaustive search.

use crate::config::DeflateConfig;
use crate::tables::{MAX_MATCH, MIN_MATCH, WINDOW_SIZE};
use std::collections::HashMap;
use tracing::trace;

/// A token produced by the match finder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lz77Token {
    /// A literal byte.
    Literal(u8),
    /// A back-reference to previously seen data.
    Match {
        /// Number of bytes to copy (3-258).
        length: u16,
        /// Distance back into the window (1-32768).
        distance: u16,
    },
}

impl Lz77Token {
    /// Number of input bytes this token stands for.
    pub fn span(&self) -> usize {
        match *self {
            Self::Literal(_) => 1,
            Self::Match { length, .. } => length as usize,
        }
    }
}

/// Positions sharing one 3-byte prefix, plus the scan window over them.
#[derive(Debug, Default)]
struct PrefixChain {
    positions: Vec<usize>,
    /// First position still inside the 32 KiB window.
    window_start: usize,
    /// First position not yet behind the cursor.
    cursor: usize,
}

impl PrefixChain {
    /// Move both bounds forward for a scan at `pos` and return the
    /// candidate range.
    fn candidates(&mut self, pos: usize) -> &[usize] {
        let window_base = pos.saturating_sub(WINDOW_SIZE);
        while self.window_start < self.positions.len() && self.positions[self.window_start] < window_base {
            self.window_start += 1;
        }
        while self.cursor < self.positions.len() && self.positions[self.cursor] < pos {
            self.cursor += 1;
        }
        let start = self.window_start.min(self.cursor);
        &self.positions[start..self.cursor]
    }
}

#[inline]
fn prefix_key(data: &[u8], pos: usize) -> u32 {
    (data[pos] as u32) << 16 | (data[pos + 1] as u32) << 8 | data[pos + 2] as u32
}

/// Greedy LZ77 match finder.
#[derive(Debug, Clone)]
pub struct MatchFinder {
    max_candidates: usize,
    min_candidates: usize,
    good_length: usize,
}

impl MatchFinder {
    /// Create a match finder with the effort limits of `config`.
    pub fn new(config: &DeflateConfig) -> Self {
        Self {
            max_candidates: config.max_candidates,
            min_candidates: config.min_candidates,
            good_length: config.good_length,
        }
    }

    /// Tokenize one block.
    ///
    /// Matches never reach outside `block`, so the tokens of a block can be
    /// expanded without the bytes of any other block.
    pub fn find_tokens(&self, block: &[u8]) -> Vec<Lz77Token> {
        let mut tokens = Vec::with_capacity(block.len() / 2 + 1);
        if block.len() < MIN_MATCH {
            tokens.extend(block.iter().map(|&b| Lz77Token::Literal(b)));
            return tokens;
        }

        let last_prefix = block.len() - MIN_MATCH;
        let mut index: HashMap<u32, PrefixChain> = HashMap::new();
        for pos in 0..=last_prefix {
            index.entry(prefix_key(block, pos)).or_default().positions.push(pos);
        }

        let mut pos = 0;
        while pos <= last_prefix {
            let chain = match index.get_mut(&prefix_key(block, pos)) {
                Some(chain) if chain.positions.len() >= 2 => chain,
                _ => {
                    tokens.push(Lz77Token::Literal(block[pos]));
                    pos += 1;
                    continue;
                }
            };

            let candidates = chain.candidates(pos);
            match self.longest_match(block, pos, candidates) {
                Some((length, distance)) => {
                    tokens.push(Lz77Token::Match {
                        length: length as u16,
                        distance: distance as u16,
                    });
                    pos += length;
                }
                None => {
                    tokens.push(Lz77Token::Literal(block[pos]));
                    pos += 1;
                }
            }
        }

        tokens.extend(block[pos..].iter().map(|&b| Lz77Token::Literal(b)));
        trace!(bytes = block.len(), tokens = tokens.len(), prefixes = index.len(), "lz77 block tokenized");
        tokens
    }

    /// Scan `candidates` most-recent first and return `(length, distance)`
    /// of the longest match, if it reaches the minimum length.
    fn longest_match(&self, block: &[u8], pos: usize, candidates: &[usize]) -> Option<(usize, usize)> {
        let max_len = MAX_MATCH.min(block.len() - pos);
        let mut best_len = 0;
        let mut best_pos = 0;

        for (examined, &candidate) in candidates.iter().rev().enumerate() {
            if examined >= self.max_candidates
                || (best_len >= self.good_length && examined >= self.min_candidates)
            {
                break;
            }

            // Quick reject: cannot beat the current best.
            if best_len > 0 && block[candidate + best_len] != block[pos + best_len] {
                continue;
            }

            let len = block[candidate..]
                .iter()
                .zip(&block[pos..pos + max_len])
                .take_while(|(a, b)| a == b)
                .count();

            if len > best_len {
                best_len = len;
                best_pos = candidate;
                if len >= max_len {
                    break;
                }
            }
        }

        (best_len >= MIN_MATCH).then(|| (best_len, pos - best_pos))
    }
}

impl Default for MatchFinder {
    fn default() -> Self {
        Self::new(&DeflateConfig::DEFAULT)
    }
}

/// Expand tokens back into bytes.
pub fn expand_tokens(tokens: &[Lz77Token]) -> Vec<u8> {
    let mut out = Vec::with_capacity(tokens.iter().map(Lz77Token::span).sum());
    for token in tokens {
        match *token {
            Lz77Token::Literal(b) => out.push(b),
            Lz77Token::Match { length, distance } => {
                let start = out.len() - distance as usize;
                for i in 0..length as usize {
                    out.push(out[start + i]);
                }
            }
        }
    }
    out
}
