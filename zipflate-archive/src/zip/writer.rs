//! In-memory ZIP archive writer.

use super::dos_time::DosDateTime;
use super::header::{CENTRAL_HEADER_LEN, END_RECORD_LEN, ZipEntry, ZipMethod, write_end_record};
use std::borrow::Cow;
use tracing::debug;
use zipflate_core::Crc32;
use zipflate_core::error::{Result, ZipflateError};
use zipflate_deflate::{DeflateConfig, Deflater};

/// Deflated payloads must save more than this many bytes to be kept.
const MIN_SAVINGS: usize = 4;

/// ZIP archive writer.
///
/// Entries are written to an internal buffer as they are appended. The
/// central directory and end record follow on [`ZipWriter::flush`], which
/// also hands the archive back and leaves the writer empty for reuse.
#[derive(Debug)]
pub struct ZipWriter {
    output: Vec<u8>,
    entries: Vec<ZipEntry>,
    deflater: Deflater,
    timestamp: Option<DosDateTime>,
}

impl ZipWriter {
    /// Create a writer with the default DEFLATE settings.
    pub fn new() -> Self {
        Self::with_deflater(Deflater::default())
    }

    /// Create a writer that compresses with `config`.
    pub fn with_config(config: DeflateConfig) -> Result<Self> {
        Ok(Self::with_deflater(Deflater::new(config)?))
    }

    fn with_deflater(deflater: Deflater) -> Self {
        Self {
            output: Vec::new(),
            entries: Vec::new(),
            deflater,
            timestamp: None,
        }
    }

    /// Stamp every entry with `timestamp` instead of the time of appending.
    pub fn with_timestamp(mut self, timestamp: DosDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Number of entries appended since the last flush.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Entries appended since the last flush, in order.
    pub fn entries(&self) -> &[ZipEntry] {
        &self.entries
    }

    /// Bytes buffered so far.
    pub fn len(&self) -> usize {
        self.output.len()
    }

    /// Whether nothing has been buffered.
    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    /// Compress `data` and append it as `name`.
    ///
    /// The entry is stored uncompressed when DEFLATE does not save at least
    /// five bytes.
    pub fn append(&mut self, data: &[u8], name: &str) -> Result<&ZipEntry> {
        self.append_bytes(data, name.as_bytes())
    }

    /// Like [`ZipWriter::append`], with the name given as raw bytes.
    pub fn append_bytes(&mut self, data: &[u8], name: &[u8]) -> Result<&ZipEntry> {
        if name.len() > usize::from(u16::MAX) {
            return Err(ZipflateError::invalid_input(format!(
                "entry name is {} bytes, the limit is {}",
                name.len(),
                u16::MAX
            )));
        }
        let uncompressed_size = to_u32(data.len(), "entry size")?;
        let local_header_offset = to_u32(self.output.len(), "entry offset")?;

        let crc32 = Crc32::compute(data);
        let deflated = self.deflater.compress_to_vec(data)?;
        let (method, payload) = if deflated.len() + MIN_SAVINGS >= data.len() {
            (ZipMethod::Store, Cow::Borrowed(data))
        } else {
            (ZipMethod::Deflate, Cow::Owned(deflated))
        };

        let entry = ZipEntry {
            name: name.to_vec(),
            method,
            crc32,
            compressed_size: payload.len() as u32,
            uncompressed_size,
            modified: self.timestamp.unwrap_or_else(DosDateTime::now),
            local_header_offset,
        };

        self.output.reserve(entry.local_record_len());
        entry.write_local_header(&mut self.output);
        self.output.extend_from_slice(&payload);

        debug!(
            name = %String::from_utf8_lossy(name),
            ?method,
            size = data.len(),
            compressed = payload.len(),
            crc32,
            "appended zip entry"
        );

        let index = self.entries.len();
        self.entries.push(entry);
        Ok(&self.entries[index])
    }

    /// Write the central directory and end record, return the archive and
    /// reset the writer.
    pub fn flush(&mut self) -> Result<Vec<u8>> {
        let count = u16::try_from(self.entries.len()).map_err(|_| {
            ZipflateError::invalid_input(format!(
                "{} entries exceed the ZIP limit of {}",
                self.entries.len(),
                u16::MAX
            ))
        })?;
        let dir_offset = to_u32(self.output.len(), "central directory offset")?;

        let dir_len: usize = self.entries.iter().map(|e| CENTRAL_HEADER_LEN + e.name.len()).sum();
        self.output.reserve(dir_len + END_RECORD_LEN);
        for entry in &self.entries {
            entry.write_central_header(&mut self.output);
        }
        let dir_size = to_u32(self.output.len() - dir_offset as usize, "central directory size")?;
        write_end_record(&mut self.output, count, dir_size, dir_offset);

        debug!(entries = count, bytes = self.output.len(), "flushed zip archive");

        self.entries.clear();
        Ok(std::mem::take(&mut self.output))
    }
}

impl Default for ZipWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn to_u32(value: usize, what: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| ZipflateError::invalid_input(format!("{} {} does not fit in 32 bits", what, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_writer() -> ZipWriter {
        ZipWriter::new().with_timestamp(DosDateTime::from_raw(0x5821, 0x6000))
    }

    #[test]
    fn test_small_entry_is_stored() {
        let mut writer = fixed_writer();
        let entry = writer.append(b"abc", "abc.txt").unwrap();
        assert_eq!(entry.method, ZipMethod::Store);
        assert_eq!(entry.compressed_size, 3);
        assert_eq!(entry.uncompressed_size, 3);
        assert_eq!(writer.len(), 30 + 7 + 3);
    }

    #[test]
    fn test_repetitive_entry_is_deflated() {
        let data = b"zipflate ".repeat(200);
        let mut writer = fixed_writer();
        let entry = writer.append(&data, "repeat.txt").unwrap();
        assert_eq!(entry.method, ZipMethod::Deflate);
        assert!((entry.compressed_size as usize) < data.len());
        assert_eq!(entry.crc32, Crc32::compute(&data));
    }

    #[test]
    fn test_offsets_accumulate() {
        let mut writer = fixed_writer();
        writer.append(b"one", "1").unwrap();
        writer.append(b"two", "2").unwrap();
        let offsets: Vec<u32> = writer.entries().iter().map(|e| e.local_header_offset).collect();
        assert_eq!(offsets, vec![0, 34]);
    }

    #[test]
    fn test_empty_archive() {
        let mut writer = ZipWriter::new();
        let archive = writer.flush().unwrap();
        assert_eq!(archive.len(), 22);
        assert_eq!(&archive[..4], b"PK\x05\x06");
        assert!(archive[4..20].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_name_too_long() {
        let name = "n".repeat(70_000);
        let mut writer = ZipWriter::new();
        assert!(matches!(
            writer.append(b"x", &name),
            Err(ZipflateError::InvalidInput { .. })
        ));
        assert_eq!(writer.entry_count(), 0);
        assert!(writer.is_empty());
    }

    #[test]
    fn test_non_utf8_name() {
        let mut writer = fixed_writer();
        let entry = writer.append_bytes(b"data", b"caf\xE9.txt").unwrap();
        assert_eq!(entry.name_bytes(), b"caf\xE9.txt");
        assert_eq!(writer.len(), 30 + 8 + 4);
        assert_eq!(&writer.output[30..38], b"caf\xE9.txt");
    }

    #[test]
    fn test_with_config() {
        let config = DeflateConfig::FAST.with_block_size(1024);
        let mut writer = ZipWriter::with_config(config).unwrap();
        writer.append(&vec![7u8; 5000], "sevens.bin").unwrap();
        assert_eq!(writer.entries()[0].method, ZipMethod::Deflate);

        assert!(ZipWriter::with_config(DeflateConfig::new(0)).is_err());
    }
}
