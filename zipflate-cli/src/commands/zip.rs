//! Zip command implementation.

use super::{CmdResult, CompressionLevel, create_progress_bar, savings, write_output};
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::info;
use zipflate_archive::{ZipEntry, ZipMethod, ZipWriter};

#[derive(Debug, Serialize)]
struct EntrySummary {
    name: String,
    method: &'static str,
    size: u32,
    compressed_size: u32,
    crc32: String,
}

impl From<&ZipEntry> for EntrySummary {
    fn from(entry: &ZipEntry) -> Self {
        Self {
            name: entry.name_lossy().into_owned(),
            method: match entry.method {
                ZipMethod::Store => "stored",
                ZipMethod::Deflate => "deflated",
            },
            size: entry.uncompressed_size,
            compressed_size: entry.compressed_size,
            crc32: format!("{:08x}", entry.crc32),
        }
    }
}

/// Archive name for a path: its normal components joined with `/`.
fn entry_name(path: &Path) -> Option<String> {
    let parts: Vec<String> = path
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}

pub fn cmd_zip(
    archive: &Path,
    files: &[PathBuf],
    compression: CompressionLevel,
    progress: bool,
    verbose: bool,
    json: bool,
) -> CmdResult {
    let mut writer = ZipWriter::with_config(compression.config())?;
    let pb = create_progress_bar(files.len() as u64, progress);

    for path in files {
        let name = entry_name(path).ok_or_else(|| format!("cannot name entry for {}", path.display()))?;
        pb.set_message(name.clone());

        let data = fs::read(path).map_err(|e| format!("{}: {}", path.display(), e))?;
        let entry = writer.append(&data, &name)?;
        if verbose {
            eprintln!(
                "  adding: {} ({} {:.0}%)",
                entry.name_lossy(),
                if entry.method == ZipMethod::Deflate { "deflated" } else { "stored" },
                savings(u64::from(entry.uncompressed_size), u64::from(entry.compressed_size))
            );
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let summaries: Vec<EntrySummary> = writer.entries().iter().map(EntrySummary::from).collect();
    let bytes = writer.flush()?;
    info!(archive = %archive.display(), entries = summaries.len(), bytes = bytes.len(), "wrote zip archive");
    write_output(Some(archive), &bytes)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    }
    Ok(())
}
