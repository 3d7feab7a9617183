use super::error::Error;
use super::reader::{ByteReader, Cursor, read_u32_array};
use super::types::ParseResult;
use crate::types::*;
use std::str;

pub fn parse_header(input: &[u8]) -> ParseResult<BlpHeader> {
    let mut reader = Cursor::new(input);

    let version = parse_magic(&mut reader).map_err(|e| e.with_context("version"))?;
    let content_field = reader
        .read_u32_le()
        .map_err(|e| e.with_context("content field"))?;
    let content: BlpContentTag = content_field
        .try_into()
        .map_err(Error::UnsupportedEncoding)?;

    let alpha_bits = reader
        .read_u32_le()
        .map_err(|e| e.with_context("alpha_bits field"))?;
    if !content.alpha_bits_valid(alpha_bits) {
        return Err(Error::UnsupportedAlphaBits {
            content,
            alpha_bits,
        });
    }

    let width = reader
        .read_u32_le()
        .map_err(|e| e.with_context("width field"))?;
    let height = reader
        .read_u32_le()
        .map_err(|e| e.with_context("height field"))?;
    if width == 0 || height == 0 || width > BLP_MAX_WIDTH || height > BLP_MAX_HEIGHT {
        return Err(Error::InvalidDimensions { width, height });
    }

    // Reserved word, read inconsistently by the game itself. Kept
    // verbatim so foreign files survive a parse/encode cycle.
    let extra = reader
        .read_u32_le()
        .map_err(|e| e.with_context("extra field"))?;
    let mipmaps = reader
        .read_u32_le()
        .map_err(|e| e.with_context("has_mipmaps field"))?;

    let mipmap_locator =
        parse_mipmap_locator(version, &mut reader).map_err(|e| e.with_context("mipmap locator"))?;

    Ok(BlpHeader {
        version,
        content,
        alpha_bits,
        width,
        height,
        extra,
        mipmaps,
        mipmap_locator,
    })
}

fn parse_magic(reader: &mut impl ByteReader) -> ParseResult<BlpVersion> {
    let mut magic_fixed: [u8; 4] = Default::default();
    reader.read_into(&mut magic_fixed)?;

    let version = BlpVersion::from_magic(magic_fixed).ok_or_else(|| {
        Error::WrongMagic(
            str::from_utf8(&magic_fixed)
                .map(|s| s.to_owned())
                .unwrap_or_else(|_| format!("{magic_fixed:?}")),
        )
    })?;

    Ok(version)
}

fn parse_mipmap_locator(
    version: BlpVersion,
    reader: &mut impl ByteReader,
) -> ParseResult<MipmapLocator> {
    match version {
        BlpVersion::Blp1 => {
            let mut offsets: [u32; 16] = Default::default();
            let mut sizes: [u32; 16] = Default::default();

            let offsets_vec = read_u32_array(reader, 16)?;
            offsets.copy_from_slice(&offsets_vec);

            let sizes_vec = read_u32_array(reader, 16)?;
            sizes.copy_from_slice(&sizes_vec);

            Ok(MipmapLocator::Internal { offsets, sizes })
        }
        // For BLP0 mipmaps are located in external files
        BlpVersion::Blp0 => Ok(MipmapLocator::External),
    }
}
