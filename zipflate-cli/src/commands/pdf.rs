//! PDF stream command.

use super::{CmdResult, read_input, write_output};
use std::path::Path;
use tracing::info;
use zipflate_deflate::{decode_stream_object, flate_stream_object};

pub fn cmd_pdf_stream(input: &Path, output: Option<&Path>, decode: bool) -> CmdResult {
    let data = read_input(input)?;
    let result = if decode {
        decode_stream_object(&data)?
    } else {
        flate_stream_object(&data)?
    };

    info!(input = %input.display(), decode, bytes = result.len(), "pdf stream");
    write_output(output, &result)?;
    Ok(())
}
