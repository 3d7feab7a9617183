//! Processing between mipmap payloads and images for palettized
//! content.
//!
//! A payload of the wrong size is padded with zeroes or truncated to
//! fit, with a warning. Some poor BLP implementations, such as used by
//! some versions of Warcraft III, do not process mipmap data safely, so
//! meaningful visual information can sometimes be extracted from a
//! technically corrupt file.

use super::error::Error;
use crate::parser::{self, Cursor};
use crate::raster::{IndexPalette, IndexedRaster, PackedLayout, rescale_alpha};
use crate::types::indexed::IndexedContent;
use crate::warning::{Warning, WarningSink};
use image::{DynamicImage, RgbImage, RgbaImage};

/// Processor for palettized mipmaps. One instance serves a whole codec
/// session: the palette read from (or chosen for) the file applies to
/// every mipmap level.
pub struct IndexedProcessor {
    palette: IndexPalette,
}

impl IndexedProcessor {
    /// Processor around an explicit palette.
    pub fn new(palette: IndexPalette) -> IndexedProcessor {
        IndexedProcessor { palette }
    }

    /// Processor over already parsed indexed content.
    pub fn from_content(content: &IndexedContent, alpha_bits: u32) -> IndexedProcessor {
        IndexedProcessor {
            palette: IndexPalette::new(
                &content.cmap,
                alpha_bits,
                crate::raster::RgbSpace::Linear,
            ),
        }
    }

    /// The palette the processor resolves indices with.
    pub fn palette(&self) -> &IndexPalette {
        &self.palette
    }

    /// Read the serialized prelude (256 little-endian palette words)
    /// from the start of `data`. Returns the number of bytes consumed.
    pub fn read_prelude(&mut self, data: &[u8]) -> Result<usize, parser::Error> {
        let mut reader = Cursor::new(data);
        let words = parser::read_palette(&mut reader)?;
        self.palette = IndexPalette::new(&words, self.palette.alpha_bits(), self.palette.space());
        Ok(reader.position())
    }

    /// Append the serialized prelude to `out`. Palette words pass
    /// through verbatim, including unused entries.
    pub fn write_prelude(&self, out: &mut Vec<u8>) {
        for word in self.palette.entries() {
            out.extend_from_slice(&word.to_le_bytes());
        }
    }

    /// Wrap one mipmap payload as a packed raster of the expected size,
    /// fixing up a wrong payload size with a warning.
    pub fn decode_raster(
        &self,
        payload: &[u8],
        width: u32,
        height: u32,
        sink: &mut dyn WarningSink,
    ) -> Result<IndexedRaster, Error> {
        let layout = PackedLayout::new(width, height, self.palette.alpha_bits());
        let expected = layout.buffer_size();
        let mut data = payload.to_vec();
        if data.len() != expected {
            sink.warning(Warning::BadDataBuffer {
                actual: data.len(),
                expected,
            });
            data.resize(expected, 0);
        }
        Ok(IndexedRaster::from_vec(layout, data)?)
    }

    /// Decode one mipmap payload into an image, resolving indices
    /// through the palette. The alpha band is exposed only when the
    /// file declares a nonzero alpha depth.
    pub fn decode_mipmap(
        &self,
        payload: &[u8],
        width: u32,
        height: u32,
        sink: &mut dyn WarningSink,
    ) -> Result<DynamicImage, Error> {
        let raster = self.decode_raster(payload, width, height, sink)?;
        let alpha_bits = self.palette.alpha_bits();

        if alpha_bits == 0 {
            let mut rgb = RgbImage::new(width, height);
            for y in 0..height {
                for x in 0..width {
                    let index = raster.index(x, y)?;
                    rgb.put_pixel(x, y, image::Rgb(self.palette.color(index)));
                }
            }
            Ok(DynamicImage::ImageRgb8(rgb))
        } else {
            let mut rgba = RgbaImage::new(width, height);
            for y in 0..height {
                for x in 0..width {
                    let index = raster.index(x, y)?;
                    let [r, g, b] = self.palette.color(index);
                    let alpha = rescale_alpha(raster.alpha(x, y)?, alpha_bits, 8);
                    rgba.put_pixel(x, y, image::Rgba([r, g, b, alpha]));
                }
            }
            Ok(DynamicImage::ImageRgba8(rgba))
        }
    }

    /// Quantize an input image into a packed raster: every pixel is
    /// resolved to its nearest palette index, alpha is rescaled to the
    /// target depth. Missing alpha becomes fully opaque.
    pub fn prepare_raster(&self, image: &DynamicImage) -> Result<IndexedRaster, Error> {
        let rgba = image.to_rgba8();
        let layout = PackedLayout::new(rgba.width(), rgba.height(), self.palette.alpha_bits());
        let mut raster = IndexedRaster::new(layout);
        for (x, y, pixel) in rgba.enumerate_pixels() {
            let [r, g, b, a] = pixel.0;
            raster.set_index(x, y, self.palette.quantize_srgb([r, g, b]))?;
            if layout.has_alpha() {
                raster.set_alpha(x, y, rescale_alpha(a, 8, layout.alpha_bits()))?;
            }
        }
        Ok(raster)
    }

    /// Rebuild a caller supplied packed raster into the session's
    /// layout. A raster that already conforms is copied verbatim;
    /// otherwise the index band passes through unchanged (samples are
    /// assumed to be palette indices already) and the alpha band is
    /// rescaled, or filled with opaque when the source has none.
    pub fn prepare_indexed(&self, raster: &IndexedRaster) -> Result<IndexedRaster, Error> {
        let source = raster.layout();
        let layout = PackedLayout::new(source.width(), source.height(), self.palette.alpha_bits());
        if source.compatible_with(&layout) {
            return Ok(raster.clone());
        }

        let mut dest = IndexedRaster::new(layout);
        for y in 0..layout.height() {
            for x in 0..layout.width() {
                dest.set_index(x, y, raster.index(x, y)?)?;
                if layout.has_alpha() {
                    let sample = if source.has_alpha() {
                        rescale_alpha(raster.alpha(x, y)?, source.alpha_bits(), layout.alpha_bits())
                    } else {
                        rescale_alpha(0, 0, layout.alpha_bits())
                    };
                    dest.set_alpha(x, y, sample)?;
                }
            }
        }
        Ok(dest)
    }

    /// Serialize one prepared raster into its payload bytes. The output
    /// equals the raster's packed buffer.
    pub fn encode_mipmap(&self, raster: &IndexedRaster) -> Vec<u8> {
        raster.data().to_vec()
    }
}
