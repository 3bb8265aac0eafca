//! Encoder configuration.

use zipflate_core::error::{Result, ZipflateError};

/// DEFLATE encoder parameters.
///
/// The match finder is a bounded-effort heuristic: it examines at most
/// `max_candidates` earlier positions per cursor, and stops after
/// `min_candidates` once a match of `good_length` bytes has been found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeflateConfig {
    /// Input bytes per DEFLATE block.
    pub block_size: usize,
    /// Upper bound on candidates examined per position.
    pub max_candidates: usize,
    /// Candidate count after which a good match ends the scan.
    pub min_candidates: usize,
    /// Match length considered good enough to stop early.
    pub good_length: usize,
}

impl DeflateConfig {
    /// Default configuration.
    ///
    /// - 128 KiB blocks
    /// - 128 candidates, early exit after 16 once an 8-byte match exists
    pub const DEFAULT: Self = Self {
        block_size: 131_072,
        max_candidates: 128,
        min_candidates: 16,
        good_length: 8,
    };

    /// Lower-effort configuration for large, less compressible inputs.
    pub const FAST: Self = Self {
        block_size: 131_072,
        max_candidates: 16,
        min_candidates: 4,
        good_length: 8,
    };

    /// Create a configuration with the given block size and default effort.
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size,
            ..Self::DEFAULT
        }
    }

    /// Set the block size.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Set both candidate caps.
    pub fn with_candidates(mut self, max_candidates: usize, min_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self.min_candidates = min_candidates;
        self
    }

    /// Set the early-exit match length.
    pub fn with_good_length(mut self, good_length: usize) -> Self {
        self.good_length = good_length;
        self
    }

    /// Check that the parameters describe a usable encoder.
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(ZipflateError::invalid_input("block size must be positive"));
        }
        if self.max_candidates == 0 {
            return Err(ZipflateError::invalid_input(
                "at least one match candidate must be examined",
            ));
        }
        if self.min_candidates > self.max_candidates {
            return Err(ZipflateError::invalid_input(format!(
                "min_candidates {} exceeds max_candidates {}",
                self.min_candidates, self.max_candidates
            )));
        }
        Ok(())
    }
}

impl Default for DeflateConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
