//! # zipflate Core
//!
//! Core components for the zipflate DEFLATE codec.
//!
//! - [`bitstream`]: Bit-level I/O in both DEFLATE bit orders
//! - [`crc`]: CRC-32 checksum
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! zipflate is designed as a layered stack:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L4: CLI                                                 │
//! │     zipflate binary                                     │
//! ├─────────────────────────────────────────────────────────┤
//! │ L3: Container                                           │
//! │     ZIP writer                                          │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     Deflate (LZ77+Huffman), PDF FlateDecode streams     │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: BitStream (this crate)                              │
//! │     BitReader/BitWriter, CRC-32, errors                 │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use zipflate_core::bitstream::BitReader;
//! use zipflate_core::crc::Crc32;
//!
//! let data = [0xAB, 0xCD];
//! let mut reader = BitReader::new(&data);
//! assert_eq!(reader.read_range(12).unwrap(), 0xDAB);
//!
//! assert_eq!(Crc32::compute(b"Hello, World!"), 0xEC4AC3D0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod crc;
pub mod error;

// Re-exports for convenience
pub use bitstream::{BitCode, BitReader, BitWriter};
pub use crc::Crc32;
pub use error::{Result, ZipflateError};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{BitCode, BitReader, BitWriter};
    pub use crate::crc::Crc32;
    pub use crate::error::{Result, ZipflateError};
}
