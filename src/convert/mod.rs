//! Pixel-level conversion between BLP payloads and images.
//!
//! The two payload encodings are served by two processors behind the
//! [`Processor`] enum. A processor lives for one codec session and
//! accumulates the state shared by every mipmap of a file: the palette
//! for indexed content, the shared JPEG header for JPEG content.

/// Boundary to the host JPEG codec
pub mod codec;
/// Error types for BLP conversion operations
pub mod error;
/// Processor for palettized content
pub mod indexed;
/// Processor for JPEG content
pub mod jpeg;
/// Mipmap pyramid generation and dimension optimization
pub mod mipmap;

use crate::parser;
use crate::raster::{IndexPalette, IndexedRaster, RgbSpace};
use crate::types::*;
use crate::warning::{LogSink, WarningSink};
pub use codec::{DefaultJpegCodec, JpegCodec, JpegRaster};
pub use error::Error;
use ::image::DynamicImage;
pub use indexed::IndexedProcessor;
pub use jpeg::JpegProcessor;
pub use mipmap::{DEFAULT_MAX_DIMENSION, DimensionOpt, generate_mipmaps, optimize_dimensions};
use std::sync::Arc;

/// Tagged processor over the two payload encodings. Dispatches the
/// common capability set; encoding-specific operations live on the
/// variants themselves.
pub enum Processor {
    /// Palettized content
    Indexed(IndexedProcessor),
    /// JPEG content
    Jpeg(JpegProcessor),
}

impl Processor {
    /// Build a processor for a fresh session. Indexed content without
    /// an explicit palette starts from the universal 8x8x4 cube, until
    /// either [`read_prelude`](Self::read_prelude) replaces it with the
    /// file's palette (decode) or it serves as the fallback quantizer
    /// (encode); real users are expected to supply an adaptive palette.
    pub fn new(
        content: BlpContentTag,
        alpha_bits: u32,
        palette: Option<&[u32]>,
        codec: Arc<dyn JpegCodec>,
    ) -> Processor {
        match content {
            BlpContentTag::Indexed => {
                let palette = match palette {
                    Some(colors) => IndexPalette::new(colors, alpha_bits, RgbSpace::Linear),
                    None => IndexPalette::universal(alpha_bits, RgbSpace::Linear),
                };
                Processor::Indexed(IndexedProcessor::new(palette))
            }
            BlpContentTag::Jpeg => Processor::Jpeg(JpegProcessor::new(alpha_bits, codec)),
        }
    }

    /// Build a processor over already parsed content, adopting its
    /// palette or shared JPEG header.
    pub fn for_image(image: &BlpImage, codec: Arc<dyn JpegCodec>) -> Processor {
        let alpha_bits = image.header.alpha_bits;
        match &image.content {
            BlpContent::Indexed(content) => {
                Processor::Indexed(IndexedProcessor::from_content(content, alpha_bits))
            }
            BlpContent::Jpeg(content) => {
                Processor::Jpeg(JpegProcessor::from_content(content, alpha_bits, codec))
            }
        }
    }

    /// Read the serialized prelude (palette block or shared JPEG
    /// header) from the start of `data`, returning the bytes consumed.
    pub fn read_prelude(
        &mut self,
        data: &[u8],
        sink: &mut dyn WarningSink,
    ) -> Result<usize, parser::Error> {
        match self {
            Processor::Indexed(p) => p.read_prelude(data),
            Processor::Jpeg(p) => p.read_prelude(data, sink),
        }
    }

    /// Append the serialized prelude to `out`.
    pub fn write_prelude(&self, out: &mut Vec<u8>) {
        match self {
            Processor::Indexed(p) => p.write_prelude(out),
            Processor::Jpeg(p) => p.write_prelude(out),
        }
    }

    /// Decode one mipmap payload into an image of the expected size.
    pub fn decode_mipmap(
        &self,
        payload: &[u8],
        width: u32,
        height: u32,
        deep_check: bool,
        sink: &mut dyn WarningSink,
    ) -> Result<DynamicImage, Error> {
        match self {
            Processor::Indexed(p) => p.decode_mipmap(payload, width, height, sink),
            Processor::Jpeg(p) => p.decode_mipmap(payload, width, height, deep_check, sink),
        }
    }

    /// Decode one mipmap payload into a packed raster without palette
    /// expansion. Only palettized content has such a raster.
    pub fn decode_raster(
        &self,
        payload: &[u8],
        width: u32,
        height: u32,
        sink: &mut dyn WarningSink,
    ) -> Result<IndexedRaster, Error> {
        match self {
            Processor::Indexed(p) => p.decode_raster(payload, width, height, sink),
            Processor::Jpeg(_) => Err(Error::NotIndexed),
        }
    }

    /// Normalize and encode all mipmap levels into their payload bytes.
    /// The JPEG processor needs every level at once to compute the
    /// shared header; the indexed processor works level by level.
    pub fn encode_all(
        &mut self,
        levels: &[DynamicImage],
        quality: f32,
        deep_check: bool,
        sink: &mut dyn WarningSink,
    ) -> Result<Vec<Vec<u8>>, Error> {
        match self {
            Processor::Indexed(p) => {
                let mut payloads = Vec::with_capacity(levels.len());
                for level in levels {
                    let raster = p.prepare_raster(level)?;
                    payloads.push(p.encode_mipmap(&raster));
                }
                Ok(payloads)
            }
            Processor::Jpeg(p) => {
                let prepared: Vec<_> = levels
                    .iter()
                    .map(|level| p.prepare_raster(level, deep_check, sink))
                    .collect();
                p.encode_all(&prepared, quality, sink)
            }
        }
    }

    /// Does the processor expose an alpha band in decoded images?
    pub fn exposes_alpha(&self) -> bool {
        match self {
            Processor::Indexed(p) => p.palette().alpha_bits() != 0,
            Processor::Jpeg(p) => p.alpha_bits() != 0,
        }
    }
}

/// Convert one mipmap level of a parsed BLP image into an image.
/// Warnings go to the log; use a [`crate::decoder::Decoder`] to receive
/// them through a sink.
pub fn blp_to_image(image: &BlpImage, mipmap_level: usize) -> Result<DynamicImage, Error> {
    let count = image.header.mipmap_count();
    if mipmap_level >= count {
        return Err(Error::InvalidMipmapIndex {
            index: mipmap_level,
            count,
        });
    }

    let payload = match &image.content {
        BlpContent::Indexed(content) => content.images.get(mipmap_level),
        BlpContent::Jpeg(content) => content.images.get(mipmap_level),
    }
    .ok_or(Error::MissingImage(mipmap_level))?;

    let (width, height) = image.header.mipmap_size(mipmap_level);
    let processor = Processor::for_image(image, Arc::new(DefaultJpegCodec));
    processor.decode_mipmap(payload, width, height, true, &mut LogSink)
}
