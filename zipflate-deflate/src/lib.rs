//! # zipflate Deflate
//!
//! Pure Rust implementation of the DEFLATE compression algorithm (RFC 1951).
//!
//! ## Features
//!
//! - **Decompression**: Full support for all DEFLATE block types
//!   - Stored (uncompressed) blocks
//!   - Fixed Huffman codes
//!   - Dynamic Huffman codes
//! - **Compression**: greedy LZ77 + dynamic Huffman blocks
//!   - Length-limited canonical codes built with package-merge
//!   - Byte-identical output for identical input
//! - **PDF**: `/FlateDecode` stream objects
//! - **Parallel** (feature `parallel`): block match search on the rayon pool
//!
//! ## Example
//!
//! ```rust
//! use zipflate_deflate::{deflate, inflate};
//!
//! let original = b"Hello, World! Hello, World!";
//! let compressed = deflate(original).unwrap();
//!
//! let decompressed = inflate(&compressed).unwrap();
//! assert_eq!(&decompressed, original);
//! ```
//!
//! ## Tuning
//!
//! Block size and match-finder effort are set through [`DeflateConfig`]:
//!
//! ```rust
//! use zipflate_deflate::{DeflateConfig, Deflater, inflate};
//!
//! let deflater = Deflater::new(DeflateConfig::FAST.with_block_size(4096)).unwrap();
//! let compressed = deflater.compress_to_vec(b"abcabcabcabc").unwrap();
//! assert_eq!(inflate(&compressed).unwrap(), b"abcabcabcabc");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod deflate;
pub mod huffman;
pub mod inflate;
pub mod lz77;
pub mod pdf;
pub mod tables;

// Re-exports
pub use config::DeflateConfig;
pub use deflate::{Deflater, deflate, deflate_stored};
pub use huffman::{DecodeTable, EncodeTable};
pub use inflate::{Inflater, inflate, inflate_at};
pub use lz77::{Lz77Token, MatchFinder};
pub use pdf::{decode_flate_stream, decode_stream_object, flate_stream_object};
