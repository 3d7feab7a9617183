//! Encoding of the BLP container into a stream of bytes.
//!
//! [`encode_blp`] produces a single in-memory buffer for formats with an
//! internal mipmap directory (BLP1). [`save_blp`] writes to the
//! filesystem and also handles BLP0, whose mipmap payloads go into
//! sidecar files next to the main one.

/// Error types for BLP encoding operations
pub mod error;

use crate::convert::{DefaultJpegCodec, Processor};
use crate::path::make_mipmap_path;
use crate::types::*;
pub use error::Error;
use std::path::Path;
use std::sync::Arc;

/// Encode a BLP image into a single byte buffer.
///
/// Only versions with an internal mipmap directory can be expressed in
/// one buffer; encoding a BLP0 image fails with
/// [`Error::ExternalNeedsPath`].
pub fn encode_blp(image: &BlpImage) -> Result<Vec<u8>, Error> {
    validate(image)?;
    match image.header.version {
        BlpVersion::Blp0 => Err(Error::ExternalNeedsPath(BlpVersion::Blp0)),
        BlpVersion::Blp1 => Ok(encode_internal(image)),
    }
}

/// Write a BLP image to the filesystem. For BLP0 the main file receives
/// the header and the processor prelude while each mipmap payload is
/// written to its `.bNN` sidecar.
pub fn save_blp<Q>(image: &BlpImage, path: Q) -> Result<(), Error>
where
    Q: AsRef<Path>,
{
    validate(image)?;
    let path = path.as_ref();
    match image.header.version {
        BlpVersion::Blp1 => {
            let bytes = encode_internal(image);
            std::fs::write(path, bytes).map_err(|e| Error::FileSystem(path.to_owned(), e))
        }
        BlpVersion::Blp0 => {
            let main = encode_external_main(image);
            std::fs::write(path, main).map_err(|e| Error::FileSystem(path.to_owned(), e))?;
            for (i, payload) in payloads(image).iter().enumerate() {
                let mipmap_path = make_mipmap_path(path, i)
                    .ok_or_else(|| Error::FileNameInvalid(path.to_owned()))?;
                std::fs::write(&mipmap_path, payload)
                    .map_err(|e| Error::FileSystem(mipmap_path, e))?;
            }
            Ok(())
        }
    }
}

fn validate(image: &BlpImage) -> Result<(), Error> {
    let header = &image.header;
    if header.width > BLP_MAX_WIDTH {
        return Err(Error::WidthTooHigh(header.width));
    }
    if header.height > BLP_MAX_HEIGHT {
        return Err(Error::HeightTooHigh(header.height));
    }
    // A writer emits exactly the mipmap count the header promises
    let expected = header.mipmap_count();
    let actual = image.image_count();
    if actual != expected {
        return Err(Error::WrongLevelCount { expected, actual });
    }
    Ok(())
}

fn payloads(image: &BlpImage) -> &[Vec<u8>] {
    match &image.content {
        BlpContent::Indexed(content) => &content.images,
        BlpContent::Jpeg(content) => &content.images,
    }
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Append the fixed 28 byte header common to BLP0 and BLP1. The
/// encoding word is derived from the content itself, which is what the
/// rest of the stream follows.
fn header_bytes(out: &mut Vec<u8>, image: &BlpImage) {
    let header = &image.header;
    out.extend_from_slice(&header.version.to_magic());
    put_u32(out, image.content.tag().into());
    put_u32(out, header.alpha_bits);
    put_u32(out, header.width);
    put_u32(out, header.height);
    put_u32(out, header.extra);
    put_u32(out, header.mipmaps);
}

/// Append the processor prelude that directly follows the header (and
/// the directory, when present). The processor owns the serialized
/// form: the palette block for indexed content, the shared JPEG header
/// for JPEG content.
fn prelude_bytes(out: &mut Vec<u8>, image: &BlpImage) {
    Processor::for_image(image, Arc::new(DefaultJpegCodec)).write_prelude(out);
}

fn encode_internal(image: &BlpImage) -> Vec<u8> {
    let mut out = Vec::with_capacity(image.estimated_file_size());
    header_bytes(&mut out, image);

    // Reserve the mipmap directory; offsets are known only after the
    // payloads are laid out.
    let directory_pos = out.len();
    out.resize(directory_pos + 128, 0);

    prelude_bytes(&mut out, image);

    let mut offsets = [0u32; 16];
    let mut sizes = [0u32; 16];
    for (i, payload) in payloads(image).iter().enumerate() {
        offsets[i] = out.len() as u32;
        sizes[i] = payload.len() as u32;
        out.extend_from_slice(payload);
    }

    for (i, value) in offsets.iter().chain(sizes.iter()).enumerate() {
        let at = directory_pos + i * 4;
        out[at..at + 4].copy_from_slice(&value.to_le_bytes());
    }

    out
}

/// Main file of the external variant: header and prelude only, the
/// payloads live in sidecar files.
fn encode_external_main(image: &BlpImage) -> Vec<u8> {
    let mut out = Vec::with_capacity(image.estimated_file_size());
    header_bytes(&mut out, image);
    prelude_bytes(&mut out, image);
    out
}
