//! Processing between mipmap payloads and images for JPEG content.
//!
//! Every mipmap shares one JPEG header prefix; a payload becomes a
//! complete JPEG stream only after the shared header is prepended. The
//! streams store bands in blue, green, red, alpha order, so decoded and
//! encoded rasters pass through the `[2, 1, 0, 3]` band permutation,
//! which is its own inverse.
//!
//! Decoded JPEGs of the wrong size are cropped or padded with
//! transparent black on the right and bottom edges, with a warning.
//! Files declared opaque get an optional scan for stray translucent
//! pixels, reported once per image.

use super::codec::{JpegCodec, JpegRaster};
use super::error::Error;
use crate::parser::{self, Cursor};
use crate::types::jpeg::{JpegContent, MAX_SHARED_HEADER};
use crate::warning::{Warning, WarningSink};
use image::{DynamicImage, RgbImage, RgbaImage, imageops};
use std::sync::Arc;

/// Band order permutation between JPEG streams and RGBA rasters.
/// Applying it twice restores the original order.
const BAND_SWAP: [usize; 4] = [2, 1, 0, 3];

/// Processor for JPEG encoded mipmaps. One instance serves a whole
/// codec session: the shared JPEG header read from (or computed for)
/// the file applies to every mipmap level.
pub struct JpegProcessor {
    alpha_bits: u32,
    shared_header: Vec<u8>,
    codec: Arc<dyn JpegCodec>,
}

impl JpegProcessor {
    /// Processor for a fresh encoding session. The shared header is
    /// empty until [`encode_all`](Self::encode_all) computes it.
    pub fn new(alpha_bits: u32, codec: Arc<dyn JpegCodec>) -> JpegProcessor {
        debug_assert!(
            matches!(alpha_bits, 0 | 8),
            "illegal alpha bits for jpeg content"
        );
        JpegProcessor {
            alpha_bits,
            shared_header: Vec::new(),
            codec,
        }
    }

    /// Processor over already parsed JPEG content.
    pub fn from_content(
        content: &JpegContent,
        alpha_bits: u32,
        codec: Arc<dyn JpegCodec>,
    ) -> JpegProcessor {
        JpegProcessor {
            alpha_bits,
            shared_header: content.header.clone(),
            codec,
        }
    }

    /// The shared JPEG header currently held by the processor.
    pub fn shared_header(&self) -> &[u8] {
        &self.shared_header
    }

    /// Alpha depth of the session, 0 or 8 for JPEG content.
    pub fn alpha_bits(&self) -> u32 {
        self.alpha_bits
    }

    /// Read the serialized prelude (length word plus shared header)
    /// from the start of `data`. Returns the number of bytes consumed.
    pub fn read_prelude(
        &mut self,
        data: &[u8],
        sink: &mut dyn WarningSink,
    ) -> Result<usize, parser::Error> {
        let mut reader = Cursor::new(data);
        self.shared_header = parser::read_shared_header(&mut reader, sink)?;
        Ok(reader.position())
    }

    /// Append the serialized prelude to `out`.
    pub fn write_prelude(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.shared_header.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.shared_header);
    }

    /// Decode one mipmap payload into an image of the expected size.
    /// The alpha band is exposed only when the file declares 8 alpha
    /// bits; otherwise the result is opaque RGB and, when `deep_check`
    /// is set, stray translucent pixels are reported to the sink.
    pub fn decode_mipmap(
        &self,
        payload: &[u8],
        width: u32,
        height: u32,
        deep_check: bool,
        sink: &mut dyn WarningSink,
    ) -> Result<DynamicImage, Error> {
        let mut full = Vec::with_capacity(self.shared_header.len() + payload.len());
        full.extend_from_slice(&self.shared_header);
        full.extend_from_slice(payload);

        let raster = self.codec.decode(&full, sink)?;
        let mut rgba = raster_to_rgba(raster)?;

        if rgba.width() != width || rgba.height() != height {
            sink.warning(Warning::BadMipmapDimension {
                width: rgba.width(),
                height: rgba.height(),
                expected_width: width,
                expected_height: height,
            });
            // Resize on the right and bottom edges, padding is
            // transparent black.
            let mut canvas = RgbaImage::new(width, height);
            imageops::replace(&mut canvas, &rgba, 0, 0);
            rgba = canvas;
        }

        if self.alpha_bits == 8 {
            return Ok(DynamicImage::ImageRgba8(rgba));
        }

        if deep_check {
            scan_opaque(&rgba, sink);
        }
        Ok(DynamicImage::ImageRgb8(drop_alpha(&rgba)))
    }

    /// Normalize an input image to the form [`encode_all`](Self::encode_all)
    /// consumes. With 0 alpha bits the alpha band is overwritten with
    /// opaque after an optional deep check of the original values.
    pub fn prepare_raster(
        &self,
        image: &DynamicImage,
        deep_check: bool,
        sink: &mut dyn WarningSink,
    ) -> RgbaImage {
        let mut rgba = image.to_rgba8();
        if self.alpha_bits == 0 {
            if deep_check {
                scan_opaque(&rgba, sink);
            }
            for pixel in rgba.pixels_mut() {
                pixel.0[3] = 255;
            }
        }
        rgba
    }

    /// Encode every mipmap level and compute the shared header as the
    /// longest common prefix of the resulting streams, capped at
    /// [`MAX_SHARED_HEADER`]. Returns the per-level payload tails; the
    /// shared header stays in the processor for
    /// [`write_prelude`](Self::write_prelude).
    pub fn encode_all(
        &mut self,
        levels: &[RgbaImage],
        quality: f32,
        sink: &mut dyn WarningSink,
    ) -> Result<Vec<Vec<u8>>, Error> {
        let mut jpegs = Vec::with_capacity(levels.len());
        for level in levels {
            let raster = rgba_to_raster(level);
            jpegs.push(self.codec.encode(&raster, quality, sink)?);
        }

        let shared = longest_common_prefix(&jpegs).min(MAX_SHARED_HEADER);
        self.shared_header = jpegs
            .first()
            .map(|jpeg| jpeg[..shared].to_vec())
            .unwrap_or_default();
        for jpeg in &mut jpegs {
            jpeg.drain(..shared);
        }
        Ok(jpegs)
    }
}

/// Turn a codec raster (file band order) into an RGBA image.
fn raster_to_rgba(raster: JpegRaster) -> Result<RgbaImage, Error> {
    let expected = raster.width as usize * raster.height as usize * 4;
    if raster.data.len() != expected {
        return Err(Error::JpegPixelFormat(format!(
            "codec returned {} samples for a {}x{} four band raster",
            raster.data.len(),
            raster.width,
            raster.height
        )));
    }
    let mut data = raster.data;
    swap_bands(&mut data);
    Ok(RgbaImage::from_raw(raster.width, raster.height, data)
        .expect("raster length matches dimensions"))
}

/// Turn an RGBA image into a codec raster (file band order).
fn rgba_to_raster(image: &RgbaImage) -> JpegRaster {
    let mut data = image.as_raw().clone();
    swap_bands(&mut data);
    JpegRaster {
        width: image.width(),
        height: image.height(),
        data,
    }
}

/// Apply the `[2, 1, 0, 3]` permutation to every pixel in place. Used
/// for both directions since the swap is self-inverse.
fn swap_bands(data: &mut [u8]) {
    for pixel in data.chunks_exact_mut(4) {
        let source = [pixel[0], pixel[1], pixel[2], pixel[3]];
        for (band, &from) in BAND_SWAP.iter().enumerate() {
            pixel[band] = source[from];
        }
    }
}

fn drop_alpha(rgba: &RgbaImage) -> RgbImage {
    let mut rgb = RgbImage::new(rgba.width(), rgba.height());
    for (src, dest) in rgba.pixels().zip(rgb.pixels_mut()) {
        dest.0 = [src.0[0], src.0[1], src.0[2]];
    }
    rgb
}

/// Count pixels that are not fully opaque and report them once.
fn scan_opaque(rgba: &RgbaImage, sink: &mut dyn WarningSink) {
    let transparent = rgba.pixels().filter(|p| p.0[3] != 255).count() as u64;
    if transparent != 0 {
        sink.warning(Warning::BadPixelAlpha {
            transparent,
            total: rgba.width() as u64 * rgba.height() as u64,
        });
    }
}

/// Length of the common byte prefix across all streams.
fn longest_common_prefix(images: &[Vec<u8>]) -> usize {
    let Some(first) = images.first() else {
        return 0;
    };
    let mut common = first.len();
    for image in &images[1..] {
        let here = first
            .iter()
            .zip(image.iter())
            .take_while(|(a, b)| a == b)
            .count();
        common = common.min(here);
    }
    common
}
