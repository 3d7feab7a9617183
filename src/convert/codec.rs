//! Boundary to the host JPEG codec.
//!
//! BLP JPEG payloads are four component streams carrying the bands in
//! file order (blue, green, red, alpha), stored in a CMYK container.
//! The container layer only needs a decode and an encode capability
//! over such streams; everything BLP specific (shared header, band
//! permutation, dimension fixups) stays outside the codec.

use super::error::Error;
use crate::warning::WarningSink;
use jpeg_decoder::PixelFormat;
use jpeg_encoder::{ColorType, Encoder as JpegEncoder, SamplingFactor};
use std::io;

/// A raster exchanged with the JPEG codec: four interleaved 8-bit bands
/// per pixel in the stream's native order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JpegRaster {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// `width * height * 4` interleaved samples
    pub data: Vec<u8>,
}

/// Capability of compressing and decompressing single JPEG images once
/// the container has reconstituted them. The default implementation is
/// [`DefaultJpegCodec`]; a custom one can be injected through the read
/// and write options.
pub trait JpegCodec {
    /// Name of the implementation, attached to codec warnings.
    fn vendor(&self) -> &str;

    /// Decompress a complete JPEG stream into a four band raster in the
    /// stream's native band order.
    fn decode(&self, data: &[u8], sink: &mut dyn WarningSink) -> Result<JpegRaster, Error>;

    /// Compress a four band raster into a complete JPEG stream. Quality
    /// is in `0.0..=1.0`.
    fn encode(
        &self,
        raster: &JpegRaster,
        quality: f32,
        sink: &mut dyn WarningSink,
    ) -> Result<Vec<u8>, Error>;
}

/// JPEG codec backed by the `jpeg-decoder` and `jpeg-encoder` crates.
///
/// Four component streams pass through as-is; both crates follow the
/// Adobe CMYK storage convention symmetrically, so a raster survives an
/// encode/decode cycle unchanged up to quantization loss. Three
/// component and grayscale streams are widened to four bands with an
/// opaque alpha.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultJpegCodec;

impl JpegCodec for DefaultJpegCodec {
    fn vendor(&self) -> &str {
        "jpeg-decoder/jpeg-encoder"
    }

    fn decode(&self, data: &[u8], _sink: &mut dyn WarningSink) -> Result<JpegRaster, Error> {
        let mut decoder = jpeg_decoder::Decoder::new(io::Cursor::new(data));
        let pixels = decoder.decode()?;
        let info = decoder
            .info()
            .ok_or_else(|| Error::JpegPixelFormat("missing stream info".to_owned()))?;
        let width = info.width as u32;
        let height = info.height as u32;
        let n = width as usize * height as usize;

        let data = match info.pixel_format {
            PixelFormat::CMYK32 => pixels,
            PixelFormat::RGB24 => {
                let mut out = Vec::with_capacity(n * 4);
                for px in pixels.chunks_exact(3) {
                    out.extend_from_slice(&[px[0], px[1], px[2], 255]);
                }
                out
            }
            PixelFormat::L8 => {
                let mut out = Vec::with_capacity(n * 4);
                for &l in &pixels {
                    out.extend_from_slice(&[l, l, l, 255]);
                }
                out
            }
            other => return Err(Error::JpegPixelFormat(format!("{other:?}"))),
        };

        Ok(JpegRaster {
            width,
            height,
            data,
        })
    }

    fn encode(
        &self,
        raster: &JpegRaster,
        quality: f32,
        _sink: &mut dyn WarningSink,
    ) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        let mut encoder = JpegEncoder::new(&mut out, map_quality(quality));
        // Keep every component at full resolution. Subsampling would
        // bleed the alpha band into neighbours and shorten the common
        // prefix between mipmap levels.
        encoder.set_sampling_factor(SamplingFactor::F_1_1);
        encoder.encode(
            &raster.data,
            raster.width as u16,
            raster.height as u16,
            ColorType::Cmyk,
        )?;
        Ok(out)
    }
}

/// Map the normalized quality to the 1..=100 scale of the encoder.
fn map_quality(quality: f32) -> u8 {
    (quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8
}
