//! Archive-level tests for the ZIP writer.

use zipflate_archive::zip::{DosDateTime, ZipMethod, ZipWriter};
use zipflate_core::Crc32;
use zipflate_deflate::inflate;

fn u16_at(data: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([data[pos], data[pos + 1]])
}

fn u32_at(data: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
}

/// An entry read back through the central directory.
struct Listed {
    name: Vec<u8>,
    method: u16,
    crc32: u32,
    data: Vec<u8>,
}

fn list(archive: &[u8]) -> Vec<Listed> {
    let eocd = archive.len() - 22;
    assert_eq!(u32_at(archive, eocd), 0x06054B50);
    let count = u16_at(archive, eocd + 10) as usize;
    let mut pos = u32_at(archive, eocd + 16) as usize;

    let mut listed = Vec::new();
    for _ in 0..count {
        assert_eq!(u32_at(archive, pos), 0x02014B50);
        let method = u16_at(archive, pos + 10);
        let crc32 = u32_at(archive, pos + 16);
        let comp_size = u32_at(archive, pos + 20) as usize;
        let name_len = u16_at(archive, pos + 28) as usize;
        let local = u32_at(archive, pos + 42) as usize;
        let name = archive[pos + 46..pos + 46 + name_len].to_vec();

        assert_eq!(u32_at(archive, local), 0x04034B50);
        assert_eq!(u16_at(archive, local + 26) as usize, name_len);
        let start = local + 30 + name_len;
        let payload = &archive[start..start + comp_size];
        let data = match method {
            0 => payload.to_vec(),
            8 => inflate(payload).unwrap(),
            other => panic!("unexpected method {}", other),
        };

        listed.push(Listed {
            name,
            method,
            crc32,
            data,
        });
        pos += 46 + name_len;
    }
    listed
}

fn stamp() -> DosDateTime {
    DosDateTime::from_civil(2024, 5, 17, 9, 30, 0).unwrap()
}

#[test]
fn test_two_small_entries() {
    let mut writer = ZipWriter::new().with_timestamp(stamp());
    writer.append(b"hello world", "hello.txt").unwrap();
    writer.append(b"", "empty.bin").unwrap();

    let entries = writer.entries();
    assert_eq!(entries[0].crc32, 0x0D4A_1185);
    assert_eq!(entries[0].uncompressed_size, 11);
    assert_eq!(entries[1].crc32, 0);
    assert_eq!(entries[1].uncompressed_size, 0);
    assert!(entries.iter().all(|e| e.method == ZipMethod::Store));

    let archive = writer.flush().unwrap();
    let eocd = archive.len() - 22;
    assert_eq!(u16_at(&archive, eocd + 8), 2);
    assert_eq!(u16_at(&archive, eocd + 10), 2);

    let listed = list(&archive);
    assert_eq!(listed[0].name, b"hello.txt");
    assert_eq!(listed[0].data, b"hello world");
    assert_eq!(listed[0].crc32, 0x0D4A_1185);
    assert_eq!(listed[1].name, b"empty.bin");
    assert!(listed[1].data.is_empty());
}

#[test]
fn test_layout_sizes() {
    let mut writer = ZipWriter::new().with_timestamp(stamp());
    writer.append(b"hello world", "hello.txt").unwrap();
    writer.append(b"", "empty.bin").unwrap();
    let archive = writer.flush().unwrap();

    let locals = (30 + 9 + 11) + (30 + 9);
    let directory = (46 + 9) * 2;
    assert_eq!(archive.len(), locals + directory + 22);

    let eocd = archive.len() - 22;
    assert_eq!(u32_at(&archive, eocd + 12) as usize, directory);
    assert_eq!(u32_at(&archive, eocd + 16) as usize, locals);
}

#[test]
fn test_store_fallback_for_incompressible_data() {
    let mut seed = 0x1234_5678u32;
    let noise: Vec<u8> = (0..4096)
        .map(|_| {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            seed as u8
        })
        .collect();

    let mut writer = ZipWriter::new().with_timestamp(stamp());
    let entry = writer.append(&noise, "noise.bin").unwrap();
    assert_eq!(entry.method, ZipMethod::Store);
    assert_eq!(entry.compressed_size, 4096);

    let listed = list(&writer.flush().unwrap());
    assert_eq!(listed[0].method, 0);
    assert_eq!(listed[0].data, noise);
}

#[test]
fn test_deflated_entry_roundtrip() {
    let text = b"All work and no play makes Jack a dull boy.\n".repeat(300);
    let mut writer = ZipWriter::new().with_timestamp(stamp());
    writer.append(&text, "jack.txt").unwrap();

    let listed = list(&writer.flush().unwrap());
    assert_eq!(listed[0].method, 8);
    assert_eq!(listed[0].data, text);
    assert_eq!(listed[0].crc32, Crc32::compute(&text));
}

#[test]
fn test_header_fields() {
    let mut writer = ZipWriter::new().with_timestamp(stamp());
    writer.append(b"hello world", "hello.txt").unwrap();
    let archive = writer.flush().unwrap();

    // Local header: version, flags, method, time, date.
    assert_eq!(u16_at(&archive, 4), 0x0014);
    assert_eq!(u16_at(&archive, 6), 0);
    assert_eq!(u16_at(&archive, 8), 0);
    assert_eq!(u16_at(&archive, 10), stamp().time());
    assert_eq!(u16_at(&archive, 12), stamp().date());
    assert_eq!(u16_at(&archive, 12), 44 << 9 | 5 << 5 | 17);
    assert_eq!(u16_at(&archive, 10), 9 << 11 | 30 << 5);

    // Central directory attributes.
    let central = 30 + 9 + 11;
    assert_eq!(u16_at(&archive, central + 4), 0x0014);
    assert_eq!(u16_at(&archive, central + 6), 0x0014);
    assert_eq!(u16_at(&archive, central + 36), 1);
    assert_eq!(u32_at(&archive, central + 38), 0x20);
    assert_eq!(u32_at(&archive, central + 42), 0);
}

#[test]
fn test_flush_resets_writer() {
    let mut writer = ZipWriter::new().with_timestamp(stamp());
    writer.append(b"first", "a.txt").unwrap();
    let first = writer.flush().unwrap();
    assert_eq!(writer.entry_count(), 0);
    assert!(writer.is_empty());

    writer.append(b"first", "a.txt").unwrap();
    let second = writer.flush().unwrap();
    assert_eq!(first, second);
    assert_eq!(list(&second).len(), 1);
}

#[test]
fn test_utf8_names() {
    let mut writer = ZipWriter::new().with_timestamp(stamp());
    writer.append(b"data", "fonts/ゴシック.ttf").unwrap();
    assert_eq!(writer.entries()[0].name_bytes().len(), "fonts/ゴシック.ttf".len());

    let listed = list(&writer.flush().unwrap());
    assert_eq!(listed[0].name, "fonts/ゴシック.ttf".as_bytes());
}

#[test]
fn test_default_timestamp_is_current() {
    let mut writer = ZipWriter::new();
    let entry = writer.append(b"now", "now.txt").unwrap();
    assert!(entry.modified.year() >= 2024);
}

#[test]
fn test_raw_byte_names() {
    // CP437 box-drawing byte, not valid UTF-8.
    let name = b"dir/\xC9report.txt";
    let mut writer = ZipWriter::new().with_timestamp(stamp());
    writer.append_bytes(b"payload", name).unwrap();
    assert_eq!(writer.entries()[0].name, name.to_vec());
    assert_eq!(writer.entries()[0].name_lossy(), "dir/\u{FFFD}report.txt");

    let listed = list(&writer.flush().unwrap());
    assert_eq!(listed[0].name, name.to_vec());
    assert_eq!(listed[0].data, b"payload");
}
