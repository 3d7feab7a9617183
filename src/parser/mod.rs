//! Decoding of the BLP container from raw bytes.
//!
//! [`parse_blp`] handles in-memory buffers, [`load_blp`] reads from the
//! filesystem and also picks up the sidecar mipmap files a BLP0 file
//! keeps next to itself.

mod bounds;
/// Error types for BLP parsing operations
pub mod error;
mod header;
mod indexed;
mod jpeg;
mod mipmaps;
/// Native byte reading utilities
mod reader;
/// Type definitions used by the BLP parser
pub mod types;

use super::types::*;
use crate::path::make_mipmap_path;
use crate::warning::{LogSink, WarningSink};
pub use error::{Error, LoadError};
use indexed::parse_indexed_content;
use jpeg::parse_jpeg_content;
use std::path::{Path, PathBuf};
use types::ParseResult;

pub(crate) use header::parse_header;
pub(crate) use indexed::read_palette;
pub(crate) use jpeg::read_shared_header;
pub(crate) use mipmaps::parse_mipmap_payloads;
pub(crate) use reader::Cursor;

/// Read a BLP file from the file system. If it is the BLP0 format, uses
/// the mipmap sidecar files near the root file.
pub fn load_blp<Q>(path: Q) -> Result<BlpImage, LoadError>
where
    Q: AsRef<Path>,
{
    let input =
        std::fs::read(&path).map_err(|e| LoadError::FileSystem(path.as_ref().to_owned(), e))?;
    load_blp_ex(Some(path), &input, &mut LogSink)
}

/// Read a BLP file from a buffer (`Vec<u8>`). BLP0 sidecar mipmaps are
/// not available through this entry point.
pub fn load_blp_from_buf(buf: &[u8]) -> Result<BlpImage, LoadError> {
    let path: Option<PathBuf> = None;
    load_blp_ex(path, buf, &mut LogSink)
}

pub(crate) fn load_blp_ex<Q>(
    path: Option<Q>,
    input: &[u8],
    sink: &mut dyn WarningSink,
) -> Result<BlpImage, LoadError>
where
    Q: AsRef<Path>,
{
    // We have to preload all mipmaps in memory as we are constrained
    // with a lifetime that should be equal to the lifetime of the root
    // input stream.
    let mipmaps = match path {
        Some(path) => preload_sidecars(path)?,
        None => vec![],
    };

    let image = parse_blp_with_sink(input, |i| preloaded_mipmaps(&mipmaps, i), sink)?;
    Ok(image)
}

/// Read the sidecar mipmap files living next to a BLP0 main file into
/// memory, stopping at the first absent level.
pub(crate) fn preload_sidecars<Q>(path: Q) -> Result<Vec<Vec<u8>>, LoadError>
where
    Q: AsRef<Path>,
{
    let mut mipmaps = vec![];
    for i in 0..16 {
        let mipmap_path = make_mipmap_path(&path, i)
            .ok_or_else(|| LoadError::InvalidFilename(path.as_ref().to_owned()))?;
        if mipmap_path.is_file() {
            let mipmap = std::fs::read(mipmap_path)
                .map_err(|e| LoadError::FileSystem(path.as_ref().to_owned(), e))?;
            mipmaps.push(mipmap);
        } else {
            break;
        }
    }
    Ok(mipmaps)
}

/// Parse a BLP file from a slice, failing if external files would be
/// required (case BLP0).
pub fn parse_blp(input: &[u8]) -> ParseResult<BlpImage> {
    parse_blp_with_externals(input, no_mipmaps)
}

/// Helper for [`parse_blp_with_externals`] when no external mipmaps are
/// available.
pub fn no_mipmaps<'a>(_: usize) -> Result<Option<&'a [u8]>, Box<dyn std::error::Error>> {
    Ok(None)
}

/// Helper for [`parse_blp_with_externals`] when external mipmaps are
/// located in the filesystem near the root file and were loaded in
/// memory ahead of parsing.
pub fn preloaded_mipmaps(
    mipmaps: &[Vec<u8>],
    i: usize,
) -> Result<Option<&[u8]>, Box<dyn std::error::Error>> {
    if i >= mipmaps.len() {
        Ok(None)
    } else {
        Ok(Some(&mipmaps[i]))
    }
}

/// Parse a BLP file from a slice and use the user provided callback to
/// read external mipmaps. Recoverable corruption is logged.
pub fn parse_blp_with_externals<'a, F>(
    root_input: &'a [u8],
    external_mipmaps: F,
) -> ParseResult<BlpImage>
where
    F: FnMut(usize) -> Result<Option<&'a [u8]>, Box<dyn std::error::Error>>,
{
    parse_blp_with_sink(root_input, external_mipmaps, &mut LogSink)
}

/// Parse a BLP file from a slice, delivering recoverable-corruption
/// warnings to the given sink.
pub fn parse_blp_with_sink<'a, F>(
    root_input: &'a [u8],
    external_mipmaps: F,
    sink: &mut dyn WarningSink,
) -> ParseResult<BlpImage>
where
    F: FnMut(usize) -> Result<Option<&'a [u8]>, Box<dyn std::error::Error>>,
{
    // Parse header
    let header = parse_header(root_input).map_err(|e| e.with_context("header"))?;

    // Calculate where content starts (after header)
    let header_size = BlpHeader::size(header.version);
    if root_input.len() < header_size {
        return Err(Error::UnexpectedEof);
    }
    let content_input = &root_input[header_size..];

    // Parse image content
    let content = parse_content(&header, external_mipmaps, root_input, content_input, sink)
        .map_err(|e| e.with_context("image content"))?;

    Ok(BlpImage { header, content })
}

fn parse_content<'a, F>(
    blp_header: &BlpHeader,
    external_mipmaps: F,
    original_input: &'a [u8],
    input: &'a [u8],
    sink: &mut dyn WarningSink,
) -> ParseResult<BlpContent>
where
    F: FnMut(usize) -> Result<Option<&'a [u8]>, Box<dyn std::error::Error>>,
{
    match blp_header.content {
        BlpContentTag::Jpeg => {
            let content =
                parse_jpeg_content(blp_header, external_mipmaps, original_input, input, sink)
                    .map_err(|e| e.with_context("jpeg content"))?;
            Ok(BlpContent::Jpeg(content))
        }
        BlpContentTag::Indexed => {
            let content = parse_indexed_content(blp_header, external_mipmaps, original_input, input)
                .map_err(|e| e.with_context("indexed content"))?;
            Ok(BlpContent::Indexed(content))
        }
    }
}
