//! Compress and decompress commands.

use super::{CmdResult, CompressionLevel, read_input, savings, write_output};
use std::path::Path;
use tracing::info;
use zipflate_deflate::{Deflater, deflate_stored, inflate_at};

pub fn cmd_compress(
    input: &Path,
    output: Option<&Path>,
    compression: CompressionLevel,
    stored: bool,
) -> CmdResult {
    let data = read_input(input)?;
    let compressed = if stored {
        deflate_stored(&data)?
    } else {
        Deflater::new(compression.config())?.compress_to_vec_parallel(&data)?
    };

    info!(
        input = %input.display(),
        size = data.len(),
        compressed = compressed.len(),
        "compressed {:.1}%",
        savings(data.len() as u64, compressed.len() as u64)
    );
    write_output(output, &compressed)?;
    Ok(())
}

pub fn cmd_decompress(input: &Path, output: Option<&Path>, offset: usize) -> CmdResult {
    let data = read_input(input)?;
    if offset > data.len() {
        return Err(format!("offset {} is past the end of {} bytes of input", offset, data.len()).into());
    }

    let decompressed = inflate_at(&data, offset)?;
    info!(
        input = %input.display(),
        compressed = data.len() - offset,
        size = decompressed.len(),
        "decompressed"
    );
    write_output(output, &decompressed)?;
    Ok(())
}
