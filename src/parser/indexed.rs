use super::mipmaps::parse_mipmap_payloads;
use super::reader::{ByteReader, Cursor, read_u32_array};
use super::types::ParseResult;
use crate::types::*;

/// Parse palettized content: the 1024 byte palette block followed by
/// one payload blob per stored mipmap level. Payload blobs are kept
/// verbatim; size validation happens at decode time so that corrupt
/// but recoverable files still parse.
pub fn parse_indexed_content<'a, F>(
    blp_header: &BlpHeader,
    external_mipmaps: F,
    original_input: &'a [u8],
    input: &'a [u8],
) -> ParseResult<IndexedContent>
where
    F: FnMut(usize) -> Result<Option<&'a [u8]>, Box<dyn std::error::Error>>,
{
    let mut reader = Cursor::new(input);
    let cmap = read_palette(&mut reader).map_err(|e| e.with_context("color palette"))?;
    let images = parse_mipmap_payloads(blp_header, external_mipmaps, original_input)?;
    Ok(IndexedContent { cmap, images })
}

/// Read the serialized palette block: 256 little-endian color words,
/// kept verbatim.
pub fn read_palette(reader: &mut impl ByteReader) -> ParseResult<[u32; PALETTE_LENGTH]> {
    let words = read_u32_array(reader, PALETTE_LENGTH)?;
    let mut cmap = [0u32; PALETTE_LENGTH];
    cmap.copy_from_slice(&words);
    Ok(cmap)
}
