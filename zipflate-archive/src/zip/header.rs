//! ZIP header structures.

use super::dos_time::DosDateTime;
use std::borrow::Cow;

/// ZIP local file header signature.
pub const LOCAL_FILE_HEADER_SIG: u32 = 0x04034B50;

/// ZIP central directory header signature.
pub const CENTRAL_DIR_HEADER_SIG: u32 = 0x02014B50;

/// ZIP end of central directory signature.
pub const END_OF_CENTRAL_DIR_SIG: u32 = 0x06054B50;

/// Version made by / needed to extract (2.0, deflate).
pub const ZIP_VERSION: u16 = 0x0014;

/// Size of a local file header without the name.
pub(crate) const LOCAL_HEADER_LEN: usize = 30;

/// Size of a central directory header without the name.
pub(crate) const CENTRAL_HEADER_LEN: usize = 46;

/// Size of the end of central directory record.
pub(crate) const END_RECORD_LEN: usize = 22;

const INTERNAL_ATTR_TEXT: u16 = 0x0001;
const EXTERNAL_ATTR_ARCHIVE: u32 = 0x0000_0020;

/// ZIP compression methods written by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZipMethod {
    /// Stored (no compression).
    Store,
    /// Deflate compression.
    Deflate,
}

impl ZipMethod {
    /// Create from the method field of a header.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(Self::Store),
            8 => Some(Self::Deflate),
            _ => None,
        }
    }

    /// Convert to the method field of a header.
    pub fn to_u16(self) -> u16 {
        match self {
            Self::Store => 0,
            Self::Deflate => 8,
        }
    }
}

/// One finalized archive entry.
///
/// Everything the central directory needs is captured when the entry is
/// appended; the payload itself lives only in the writer's buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipEntry {
    /// File name bytes as written to the archive. Names handed over as
    /// `&str` are UTF-8; other encodings pass through unchanged.
    pub name: Vec<u8>,
    /// Compression method actually used.
    pub method: ZipMethod,
    /// CRC-32 of the uncompressed data.
    pub crc32: u32,
    /// Payload size in the archive.
    pub compressed_size: u32,
    /// Original data size.
    pub uncompressed_size: u32,
    /// Modification time.
    pub modified: DosDateTime,
    /// Offset of the local file header from the start of the archive.
    pub local_header_offset: u32,
}

impl ZipEntry {
    /// Name bytes as stored in the headers.
    pub fn name_bytes(&self) -> &[u8] {
        &self.name
    }

    /// Name for display, with invalid UTF-8 replaced.
    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    /// Bytes taken by the local header, name and payload.
    pub fn local_record_len(&self) -> usize {
        LOCAL_HEADER_LEN + self.name.len() + self.compressed_size as usize
    }

    /// Name length field. Names are checked against `u16::MAX` on append.
    fn name_len(&self) -> u16 {
        self.name.len() as u16
    }

    /// Write the local file header followed by the name.
    pub(crate) fn write_local_header(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&LOCAL_FILE_HEADER_SIG.to_le_bytes());
        // Version needed to extract
        out.extend_from_slice(&ZIP_VERSION.to_le_bytes());
        // General purpose flags
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&self.method.to_u16().to_le_bytes());
        out.extend_from_slice(&self.modified.time().to_le_bytes());
        out.extend_from_slice(&self.modified.date().to_le_bytes());
        out.extend_from_slice(&self.crc32.to_le_bytes());
        out.extend_from_slice(&self.compressed_size.to_le_bytes());
        out.extend_from_slice(&self.uncompressed_size.to_le_bytes());
        out.extend_from_slice(&self.name_len().to_le_bytes());
        // Extra field length
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(self.name_bytes());
    }

    /// Write the central directory header followed by the name.
    pub(crate) fn write_central_header(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&CENTRAL_DIR_HEADER_SIG.to_le_bytes());
        // Version made by
        out.extend_from_slice(&ZIP_VERSION.to_le_bytes());
        // Version needed to extract
        out.extend_from_slice(&ZIP_VERSION.to_le_bytes());
        // General purpose flags
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&self.method.to_u16().to_le_bytes());
        out.extend_from_slice(&self.modified.time().to_le_bytes());
        out.extend_from_slice(&self.modified.date().to_le_bytes());
        out.extend_from_slice(&self.crc32.to_le_bytes());
        out.extend_from_slice(&self.compressed_size.to_le_bytes());
        out.extend_from_slice(&self.uncompressed_size.to_le_bytes());
        out.extend_from_slice(&self.name_len().to_le_bytes());
        // Extra field, comment, disk number start
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&INTERNAL_ATTR_TEXT.to_le_bytes());
        out.extend_from_slice(&EXTERNAL_ATTR_ARCHIVE.to_le_bytes());
        out.extend_from_slice(&self.local_header_offset.to_le_bytes());
        out.extend_from_slice(self.name_bytes());
    }
}

/// Write the end of central directory record.
pub(crate) fn write_end_record(out: &mut Vec<u8>, entries: u16, dir_size: u32, dir_offset: u32) {
    out.extend_from_slice(&END_OF_CENTRAL_DIR_SIG.to_le_bytes());
    // This disk, disk with the central directory
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    // Entries on this disk, total entries
    out.extend_from_slice(&entries.to_le_bytes());
    out.extend_from_slice(&entries.to_le_bytes());
    out.extend_from_slice(&dir_size.to_le_bytes());
    out.extend_from_slice(&dir_offset.to_le_bytes());
    // Comment length
    out.extend_from_slice(&0u16.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> ZipEntry {
        ZipEntry {
            name: b"a.txt".to_vec(),
            method: ZipMethod::Deflate,
            crc32: 0xDEAD_BEEF,
            compressed_size: 7,
            uncompressed_size: 11,
            modified: DosDateTime::from_raw(0x5821, 0x6000),
            local_header_offset: 0x1234,
        }
    }

    #[test]
    fn test_method_codes() {
        assert_eq!(ZipMethod::Store.to_u16(), 0);
        assert_eq!(ZipMethod::Deflate.to_u16(), 8);
        assert_eq!(ZipMethod::from_u16(8), Some(ZipMethod::Deflate));
        assert_eq!(ZipMethod::from_u16(12), None);
    }

    #[test]
    fn test_local_header_layout() {
        let mut out = Vec::new();
        sample_entry().write_local_header(&mut out);

        assert_eq!(out.len(), LOCAL_HEADER_LEN + 5);
        assert_eq!(&out[0..4], b"PK\x03\x04");
        assert_eq!(&out[4..6], &[0x14, 0x00]);
        assert_eq!(&out[6..8], &[0, 0]);
        assert_eq!(&out[8..10], &[8, 0]);
        assert_eq!(&out[10..12], &0x6000u16.to_le_bytes());
        assert_eq!(&out[12..14], &0x5821u16.to_le_bytes());
        assert_eq!(&out[14..18], &0xDEAD_BEEFu32.to_le_bytes());
        assert_eq!(&out[18..22], &7u32.to_le_bytes());
        assert_eq!(&out[22..26], &11u32.to_le_bytes());
        assert_eq!(&out[26..28], &5u16.to_le_bytes());
        assert_eq!(&out[28..30], &[0, 0]);
        assert_eq!(&out[30..], b"a.txt");
    }

    #[test]
    fn test_central_header_layout() {
        let mut out = Vec::new();
        sample_entry().write_central_header(&mut out);

        assert_eq!(out.len(), CENTRAL_HEADER_LEN + 5);
        assert_eq!(&out[0..4], b"PK\x01\x02");
        assert_eq!(&out[4..8], &[0x14, 0x00, 0x14, 0x00]);
        assert_eq!(&out[10..12], &[8, 0]);
        assert_eq!(&out[28..30], &5u16.to_le_bytes());
        assert_eq!(&out[30..36], &[0; 6]);
        assert_eq!(&out[36..38], &1u16.to_le_bytes());
        assert_eq!(&out[38..42], &0x20u32.to_le_bytes());
        assert_eq!(&out[42..46], &0x1234u32.to_le_bytes());
        assert_eq!(&out[46..], b"a.txt");
    }

    #[test]
    fn test_name_lossy() {
        let mut entry = sample_entry();
        assert_eq!(entry.name_lossy(), "a.txt");
        entry.name = vec![b'a', 0xFF, b'b'];
        assert_eq!(entry.name_lossy(), "a\u{FFFD}b");
        assert_eq!(entry.name_bytes(), &[b'a', 0xFF, b'b']);
    }

    #[test]
    fn test_end_record_layout() {
        let mut out = Vec::new();
        write_end_record(&mut out, 3, 150, 900);

        assert_eq!(out.len(), END_RECORD_LEN);
        assert_eq!(&out[0..4], b"PK\x05\x06");
        assert_eq!(&out[4..8], &[0, 0, 0, 0]);
        assert_eq!(&out[8..12], &[3, 0, 3, 0]);
        assert_eq!(&out[12..16], &150u32.to_le_bytes());
        assert_eq!(&out[16..20], &900u32.to_le_bytes());
        assert_eq!(&out[20..22], &[0, 0]);
    }
}
