//! PDF `/FlateDecode` stream objects.
//!
//! A content stream is written as
//!
//! ```text
//! <</Filter /FlateDecode /Length N>>stream\n
//! 0x68 0xDE <raw DEFLATE data>\n
//! endstream\n
//! ```
//!
//! where `N` counts the two header bytes plus the DEFLATE data. The header
//! is a zlib CMF/FLG pair (deflate, 16 KiB window); no Adler-32 trailer is
//! written, and readers here do not require one.

use crate::deflate::deflate;
use crate::inflate::inflate_at;
use tracing::debug;
use zipflate_core::error::{Result, ZipflateError};

/// zlib header written in front of every stream.
pub const FLATE_HEADER: [u8; 2] = [0x68, 0xDE];

const STREAM_KEYWORD: &[u8] = b">>stream\n";
const LENGTH_KEY: &[u8] = b"/Length ";

/// Compress `content` and wrap it in a `/FlateDecode` stream object.
pub fn flate_stream_object(content: &[u8]) -> Result<Vec<u8>> {
    let compressed = deflate(content)?;
    let length = compressed.len() + FLATE_HEADER.len();

    let mut object = Vec::with_capacity(length + 64);
    object.extend_from_slice(format!("<</Filter /FlateDecode /Length {}", length).as_bytes());
    object.extend_from_slice(STREAM_KEYWORD);
    object.extend_from_slice(&FLATE_HEADER);
    object.extend_from_slice(&compressed);
    object.extend_from_slice(b"\nendstream\n");

    debug!(content = content.len(), stream = length, "wrote FlateDecode stream");
    Ok(object)
}

/// Decode the bytes of a stream body: a 2-byte zlib header followed by
/// DEFLATE data.
pub fn decode_flate_stream(body: &[u8]) -> Result<Vec<u8>> {
    let [cmf, flg, ..] = *body else {
        return Err(ZipflateError::truncated(body.len() as u64));
    };

    if cmf & 0x0F != 8 || cmf >> 4 > 7 {
        return Err(ZipflateError::corrupted(0, format!("unsupported stream header {:#04x}", cmf)));
    }
    if (u16::from(cmf) << 8 | u16::from(flg)) % 31 != 0 {
        return Err(ZipflateError::corrupted(1, "stream header check bits do not match"));
    }
    if flg & 0x20 != 0 {
        return Err(ZipflateError::corrupted(1, "preset dictionaries are not supported"));
    }

    inflate_at(body, FLATE_HEADER.len())
}

/// Decode a whole stream object as produced by [`flate_stream_object`].
pub fn decode_stream_object(object: &[u8]) -> Result<Vec<u8>> {
    let dict_end = find(object, STREAM_KEYWORD)
        .ok_or_else(|| ZipflateError::corrupted(0, "missing stream keyword"))?;
    let dictionary = &object[..dict_end];

    let length_start = find(dictionary, LENGTH_KEY)
        .map(|pos| pos + LENGTH_KEY.len())
        .ok_or_else(|| ZipflateError::corrupted(0, "missing /Length entry"))?;
    let digits: &[u8] = {
        let rest = &dictionary[length_start..];
        let end = rest.iter().position(|b| !b.is_ascii_digit()).unwrap_or(rest.len());
        &rest[..end]
    };
    let length: usize = std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ZipflateError::corrupted(length_start as u64, "invalid /Length value"))?;

    let body_start = dict_end + STREAM_KEYWORD.len();
    let body_end = body_start
        .checked_add(length)
        .ok_or_else(|| ZipflateError::corrupted(length_start as u64, "invalid /Length value"))?;
    let body = object
        .get(body_start..body_end)
        .ok_or_else(|| ZipflateError::truncated(object.len() as u64))?;
    decode_flate_stream(body)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}
