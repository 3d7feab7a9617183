//! High-level writing session producing BLP output.
//!
//! An [`Encoder`] is configured once with the target version, content
//! encoding and alpha depth, then turns input images into BLP files.
//! The single-image entry points derive the mipmap pyramid themselves;
//! the level entry points take a caller supplied pyramid.

use crate::convert::{
    self, DEFAULT_MAX_DIMENSION, DefaultJpegCodec, DimensionOpt, IndexedProcessor, JpegCodec,
    Processor, generate_mipmaps, optimize_dimensions,
};
use crate::encode::{self, encode_blp, save_blp};
use crate::raster::{IndexPalette, IndexedRaster, RgbSpace};
use crate::types::*;
use crate::warning::{LogSink, WarningSink};
use ::image::DynamicImage;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors of the writing session
#[derive(Debug, Error)]
pub enum Error {
    /// Emitting the container failed
    #[error("{0}")]
    Encode(#[from] encode::Error),
    /// Preparing or compressing a mipmap failed
    #[error("{0}")]
    Convert(#[from] convert::Error),
    /// Alpha depth is not legal for the content encoding
    #[error("Alpha depth of {alpha_bits} bits is not supported for {content} content")]
    UnsupportedAlphaBits {
        /// Target content encoding
        content: BlpContentTag,
        /// The illegal alpha bits value
        alpha_bits: u32,
    },
    /// The caller supplied pyramid has the wrong number of levels
    #[error("Expected {expected} mipmap levels, got {actual}")]
    WrongLevelCount {
        /// Level count the root dimensions require
        expected: usize,
        /// Level count actually supplied
        actual: usize,
    },
}

/// Options of a writing session.
#[derive(Clone)]
pub struct WriteOptions {
    /// How oversized input dimensions are adjusted before encoding
    pub dimension_opt: DimensionOpt,
    /// Largest dimension [`DimensionOpt::Ratio`] and
    /// [`DimensionOpt::Clamp`] aim for
    pub max_dimension: u32,
    /// Derive the mipmap pyramid from the input image. When disabled
    /// the output carries only the full-scale image.
    pub auto_mipmap: bool,
    /// JPEG quality in `0.0..=1.0`
    pub jpeg_quality: f32,
    /// Palette for indexed content. Without one a universal 8x8x4 color
    /// cube is used; pre-indexed rasters require an explicit palette.
    pub palette: Option<[u32; 256]>,
    /// Scan input images declared opaque for stray translucent pixels
    pub deep_check: bool,
    /// Override the JPEG codec. `None` uses the built-in
    /// [`DefaultJpegCodec`].
    pub jpeg_codec: Option<Arc<dyn JpegCodec>>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            dimension_opt: DimensionOpt::None,
            max_dimension: DEFAULT_MAX_DIMENSION,
            auto_mipmap: true,
            jpeg_quality: 0.9,
            palette: None,
            deep_check: true,
            jpeg_codec: None,
        }
    }
}

impl fmt::Debug for WriteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteOptions")
            .field("dimension_opt", &self.dimension_opt)
            .field("max_dimension", &self.max_dimension)
            .field("auto_mipmap", &self.auto_mipmap)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("palette", &self.palette.map(|_| "[u32; 256]"))
            .field("deep_check", &self.deep_check)
            .field(
                "jpeg_codec",
                &self.jpeg_codec.as_ref().map(|c| c.vendor().to_owned()),
            )
            .finish()
    }
}

/// A writing session. Not safe for concurrent use; run disjoint
/// encoders in parallel instead.
pub struct Encoder {
    version: BlpVersion,
    content: BlpContentTag,
    alpha_bits: u32,
    options: WriteOptions,
    sink: Box<dyn WarningSink>,
}

impl Encoder {
    /// Configure a writing session. Fails when the alpha depth is not
    /// legal for the content encoding.
    pub fn new(
        version: BlpVersion,
        content: BlpContentTag,
        alpha_bits: u32,
        options: WriteOptions,
    ) -> Result<Encoder, Error> {
        if !content.alpha_bits_valid(alpha_bits) {
            return Err(Error::UnsupportedAlphaBits {
                content,
                alpha_bits,
            });
        }
        Ok(Encoder {
            version,
            content,
            alpha_bits,
            options,
            sink: Box::new(LogSink),
        })
    }

    /// Replace the warning sink.
    pub fn set_warning_sink(&mut self, sink: Box<dyn WarningSink>) {
        self.sink = sink;
    }

    /// Encode a single image into an in-memory BLP1 buffer, applying
    /// dimension optimization and auto-mipmap per the options.
    pub fn encode_to_vec(&mut self, image: &DynamicImage) -> Result<Vec<u8>, Error> {
        let blp = self.build(image)?;
        Ok(encode_blp(&blp)?)
    }

    /// Encode a single image to a file, applying dimension optimization
    /// and auto-mipmap per the options. For BLP0 the mipmap payloads go
    /// into `.bNN` sidecar files next to the main one.
    pub fn write_file<Q>(&mut self, path: Q, image: &DynamicImage) -> Result<(), Error>
    where
        Q: AsRef<Path>,
    {
        let blp = self.build(image)?;
        Ok(save_blp(&blp, path)?)
    }

    /// Encode a caller supplied mipmap pyramid into an in-memory BLP1
    /// buffer. A single level produces a file without mipmaps; anything
    /// else must be the complete pyramid.
    pub fn encode_levels_to_vec(&mut self, levels: &[DynamicImage]) -> Result<Vec<u8>, Error> {
        let blp = self.build_levels(levels)?;
        Ok(encode_blp(&blp)?)
    }

    /// Encode a caller supplied mipmap pyramid to a file.
    pub fn write_levels_file<Q>(&mut self, path: Q, levels: &[DynamicImage]) -> Result<(), Error>
    where
        Q: AsRef<Path>,
    {
        let blp = self.build_levels(levels)?;
        Ok(save_blp(&blp, path)?)
    }

    /// Encode caller supplied pre-quantized rasters into an in-memory
    /// BLP1 buffer. Their packed buffers pass through verbatim (after
    /// an alpha rescale when depths differ); the options must carry an
    /// explicit palette.
    pub fn encode_indexed_levels_to_vec(
        &mut self,
        levels: &[IndexedRaster],
    ) -> Result<Vec<u8>, Error> {
        let blp = self.build_indexed_levels(levels)?;
        Ok(encode_blp(&blp)?)
    }

    /// Encode caller supplied pre-quantized rasters to a file.
    pub fn write_indexed_levels_file<Q>(
        &mut self,
        path: Q,
        levels: &[IndexedRaster],
    ) -> Result<(), Error>
    where
        Q: AsRef<Path>,
    {
        let blp = self.build_indexed_levels(levels)?;
        Ok(save_blp(&blp, path)?)
    }

    /// Build the parsed-form container for a single input image without
    /// serializing it.
    pub fn build(&mut self, image: &DynamicImage) -> Result<BlpImage, Error> {
        let rgba = optimize_dimensions(
            image.to_rgba8(),
            self.options.dimension_opt,
            self.options.max_dimension,
        );
        let levels: Vec<DynamicImage> = if self.options.auto_mipmap {
            generate_mipmaps(rgba)
                .into_iter()
                .map(DynamicImage::ImageRgba8)
                .collect()
        } else {
            vec![DynamicImage::ImageRgba8(rgba)]
        };
        self.assemble(&levels)
    }

    /// Build the parsed-form container for a caller supplied pyramid
    /// without serializing it.
    pub fn build_levels(&mut self, levels: &[DynamicImage]) -> Result<BlpImage, Error> {
        self.check_pyramid(levels.iter().map(|l| (l.width(), l.height())))?;
        self.assemble(levels)
    }

    /// Build the parsed-form container for caller supplied pre-indexed
    /// rasters without serializing it.
    pub fn build_indexed_levels(&mut self, levels: &[IndexedRaster]) -> Result<BlpImage, Error> {
        if self.content != BlpContentTag::Indexed {
            return Err(convert::Error::NotIndexed.into());
        }
        let Some(palette_words) = self.options.palette else {
            return Err(convert::Error::PaletteRequired.into());
        };
        self.check_pyramid(
            levels
                .iter()
                .map(|l| (l.layout().width(), l.layout().height())),
        )?;

        let processor = IndexedProcessor::new(IndexPalette::new(
            &palette_words,
            self.alpha_bits,
            RgbSpace::Linear,
        ));
        let mut payloads = Vec::with_capacity(levels.len());
        for level in levels {
            let prepared = processor.prepare_indexed(level)?;
            payloads.push(processor.encode_mipmap(&prepared));
        }

        let (width, height) = (levels[0].layout().width(), levels[0].layout().height());
        let content = BlpContent::Indexed(IndexedContent {
            cmap: *processor.palette().entries(),
            images: payloads,
        });
        self.finish(width, height, levels.len() > 1, content)
    }

    fn assemble(&mut self, levels: &[DynamicImage]) -> Result<BlpImage, Error> {
        let Some(root) = levels.first() else {
            return Err(Error::WrongLevelCount {
                expected: 1,
                actual: 0,
            });
        };
        let (width, height) = (root.width(), root.height());
        // reject oversized input before any payload is compressed
        if width > BLP_MAX_WIDTH {
            return Err(encode::Error::WidthTooHigh(width).into());
        }
        if height > BLP_MAX_HEIGHT {
            return Err(encode::Error::HeightTooHigh(height).into());
        }

        let codec: Arc<dyn JpegCodec> = self
            .options
            .jpeg_codec
            .clone()
            .unwrap_or_else(|| Arc::new(DefaultJpegCodec));
        let mut processor = Processor::new(
            self.content,
            self.alpha_bits,
            self.options.palette.as_ref().map(|p| &p[..]),
            codec,
        );
        let payloads = processor.encode_all(
            levels,
            self.options.jpeg_quality,
            self.options.deep_check,
            &mut *self.sink,
        )?;

        let content = match processor {
            Processor::Indexed(p) => BlpContent::Indexed(IndexedContent {
                cmap: *p.palette().entries(),
                images: payloads,
            }),
            Processor::Jpeg(p) => BlpContent::Jpeg(JpegContent {
                header: p.shared_header().to_vec(),
                images: payloads,
            }),
        };
        self.finish(width, height, levels.len() > 1, content)
    }

    fn finish(
        &self,
        width: u32,
        height: u32,
        has_mipmaps: bool,
        content: BlpContent,
    ) -> Result<BlpImage, Error> {
        if width > BLP_MAX_WIDTH {
            return Err(encode::Error::WidthTooHigh(width).into());
        }
        if height > BLP_MAX_HEIGHT {
            return Err(encode::Error::HeightTooHigh(height).into());
        }
        Ok(BlpImage {
            header: BlpHeader {
                version: self.version,
                content: self.content,
                alpha_bits: self.alpha_bits,
                width,
                height,
                // reserved word, always zero on write
                extra: 0,
                mipmaps: has_mipmaps as u32,
                mipmap_locator: match self.version {
                    BlpVersion::Blp0 => MipmapLocator::External,
                    BlpVersion::Blp1 => MipmapLocator::default(),
                },
            },
            content,
        })
    }

    /// Validate a caller supplied pyramid: either exactly one level, or
    /// the complete chain down to 1x1 with each level halving the
    /// previous one.
    fn check_pyramid(
        &self,
        mut dims: impl ExactSizeIterator<Item = (u32, u32)>,
    ) -> Result<(), Error> {
        let actual = dims.len();
        let Some((width, height)) = dims.next() else {
            return Err(Error::WrongLevelCount {
                expected: 1,
                actual: 0,
            });
        };
        if actual == 1 {
            return Ok(());
        }

        let max_dim = width.max(height).max(1);
        let expected = (32 - max_dim.leading_zeros()) as usize;
        if actual != expected {
            return Err(Error::WrongLevelCount { expected, actual });
        }
        for (level, (got_w, got_h)) in dims.enumerate() {
            let level = level + 1;
            let expected_width = (width >> level).max(1);
            let expected_height = (height >> level).max(1);
            if (got_w, got_h) != (expected_width, expected_height) {
                return Err(convert::Error::MismatchSizes {
                    level,
                    width: got_w,
                    height: got_h,
                    expected_width,
                    expected_height,
                }
                .into());
            }
        }
        Ok(())
    }
}
