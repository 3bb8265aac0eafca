//! ZIP archive writing.
//!
//! Layout of an archive produced here:
//!
//! ```text
//! [local header][name][payload]   one per entry, in append order
//! [central directory header][name] one per entry
//! [end of central directory record]
//! ```
//!
//! No ZIP64, encryption, data descriptors or extra fields are written.

mod dos_time;
mod header;
mod writer;

pub use dos_time::DosDateTime;
pub use header::{
    CENTRAL_DIR_HEADER_SIG, END_OF_CENTRAL_DIR_SIG, LOCAL_FILE_HEADER_SIG, ZIP_VERSION, ZipEntry,
    ZipMethod,
};
pub use writer::ZipWriter;
