//! # zipflate Archive
//!
//! ZIP container writing on top of `zipflate-deflate`.
//!
//! Entries are compressed with DEFLATE when that saves space and stored
//! verbatim otherwise. The whole archive is built in memory and handed back
//! by [`ZipWriter::flush`].
//!
//! ## Example
//!
//! ```rust
//! use zipflate_archive::zip::{DosDateTime, ZipWriter};
//!
//! let stamp = DosDateTime::from_civil(2024, 5, 17, 9, 30, 0).unwrap();
//! let mut writer = ZipWriter::new().with_timestamp(stamp);
//! writer.append(b"hello world", "hello.txt").unwrap();
//! writer.append(b"", "empty.bin").unwrap();
//!
//! let archive = writer.flush().unwrap();
//! assert_eq!(&archive[..4], b"PK\x03\x04");
//! assert_eq!(writer.entry_count(), 0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod zip;

// Re-exports
pub use zip::{DosDateTime, ZipEntry, ZipMethod, ZipWriter};
