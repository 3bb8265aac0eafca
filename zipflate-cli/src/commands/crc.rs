//! CRC-32 command.

use super::CmdResult;
use rayon::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use zipflate_core::Crc32;

const READ_BUFFER: usize = 64 * 1024;

#[derive(Debug, Serialize)]
struct Checksum {
    file: String,
    crc32: String,
    size: u64,
}

/// Checksum a file without loading it whole.
fn file_crc32(path: &Path) -> io::Result<(u32, u64)> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut buffer = vec![0u8; READ_BUFFER];
    let mut crc = Crc32::new();
    let mut size = 0u64;

    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        crc.update(&buffer[..n]);
        size += n as u64;
    }
    Ok((crc.finalize(), size))
}

pub fn cmd_crc32(files: &[PathBuf], json: bool) -> CmdResult {
    let results: Vec<io::Result<(u32, u64)>> = files.par_iter().map(|path| file_crc32(path)).collect();

    let mut checksums = Vec::with_capacity(files.len());
    for (path, result) in files.iter().zip(results) {
        let (crc, size) = result.map_err(|e| format!("{}: {}", path.display(), e))?;
        checksums.push(Checksum {
            file: path.display().to_string(),
            crc32: format!("{:08x}", crc),
            size,
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&checksums)?);
    } else {
        for checksum in &checksums {
            println!("{}  {}", checksum.crc32, checksum.file);
        }
    }
    Ok(())
}
