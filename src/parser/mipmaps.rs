//! Locating and reading per-mipmap payload blobs.

use super::bounds::get_bounded_slice;
use super::error::Error;
use super::types::ParseResult;
use crate::types::*;
use log::warn;

/// Collect the payload blob of every stored mipmap level, through the
/// internal offset/size directory or the external sidecar callback.
///
/// Level 0 is mandatory. Higher internal levels are read until the
/// first zero-sized directory entry; a missing external level stops
/// collection there, the levels below it stay readable.
pub fn parse_mipmap_payloads<'a, F>(
    blp_header: &BlpHeader,
    mut external_mipmaps: F,
    original_input: &'a [u8],
) -> ParseResult<Vec<Vec<u8>>>
where
    F: FnMut(usize) -> Result<Option<&'a [u8]>, Box<dyn std::error::Error>>,
{
    let mut images = vec![];
    match blp_header.mipmap_locator {
        MipmapLocator::External => {
            let image0 = external_mipmaps(0).map_err(|e| Error::ExternalMipmap(0, e))?;
            images.push(image0.ok_or(Error::MissingImage(0))?.to_vec());

            if blp_header.has_mipmaps() {
                for i in 1..blp_header.mipmap_count().min(16) {
                    let image_bytes_opt =
                        external_mipmaps(i).map_err(|e| Error::ExternalMipmap(i, e))?;
                    match image_bytes_opt {
                        Some(image_bytes) => images.push(image_bytes.to_vec()),
                        None => {
                            warn!("External mipmap {i} is missing, stopping at level {i}");
                            break;
                        }
                    }
                }
            }
        }
        MipmapLocator::Internal { offsets, sizes } => {
            let mut read_image = |i: usize| -> ParseResult<()> {
                let image_bytes = get_bounded_slice(original_input, offsets[i], sizes[i], i)?;
                images.push(image_bytes.to_vec());
                Ok(())
            };

            read_image(0)?;
            if blp_header.has_mipmaps() {
                for i in 1..blp_header.mipmap_count().min(16) {
                    if sizes[i] == 0 {
                        break;
                    }
                    read_image(i)?;
                }
            }
        }
    }
    Ok(images)
}
