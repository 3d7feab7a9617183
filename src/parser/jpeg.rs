use super::mipmaps::parse_mipmap_payloads;
use super::reader::{ByteReader, Cursor};
use super::types::ParseResult;
use crate::types::*;
use crate::warning::{Warning, WarningSink};
use log::warn;

/// Parse JPEG content: the shared header prelude followed by one JPEG
/// tail per stored mipmap level.
pub fn parse_jpeg_content<'a, F>(
    blp_header: &BlpHeader,
    external_mipmaps: F,
    original_input: &'a [u8],
    input: &'a [u8],
    sink: &mut dyn WarningSink,
) -> ParseResult<JpegContent>
where
    F: FnMut(usize) -> Result<Option<&'a [u8]>, Box<dyn std::error::Error>>,
{
    let mut reader = Cursor::new(input);
    let header = read_shared_header(&mut reader, sink)?;
    let images = parse_mipmap_payloads(blp_header, external_mipmaps, original_input)?;
    Ok(JpegContent { header, images })
}

/// Read the shared JPEG header prelude: a little-endian length word
/// followed by that many bytes. Oversized headers are tolerated with a
/// warning; a length past the end of the stream is fatal.
pub fn read_shared_header(
    reader: &mut Cursor<'_>,
    sink: &mut dyn WarningSink,
) -> ParseResult<Vec<u8>> {
    let header_size = reader.read_u32_le()? as usize;
    if header_size > MAX_SHARED_HEADER {
        warn!(
            "JPEG header size {header_size} is greater than {MAX_SHARED_HEADER}, \
             that might cause crashes of some tools."
        );
        sink.warning(Warning::BadJpegHeader {
            actual: header_size,
            limit: MAX_SHARED_HEADER,
        });
    }
    reader.read_bytes(header_size)
}
