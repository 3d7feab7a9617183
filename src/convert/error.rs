use thiserror::Error;

/// Errors that can occur during BLP conversion operations
#[derive(Debug, Error)]
pub enum Error {
    /// The requested mipmap level does not exist in the BLP file
    #[error("There is no image in the BLP mipmaps level {0}!")]
    MissingImage(usize),
    /// The requested mipmap level lies outside the pyramid the header
    /// describes
    #[error("Mipmap index {index} is out of range, the image has {count} levels")]
    InvalidMipmapIndex {
        /// Requested level
        index: usize,
        /// Number of levels the header describes
        count: usize,
    },
    /// The content is not palettized, so no indexed raster exists
    #[error("The image content is not palettized")]
    NotIndexed,
    /// Raster or palette operation failed
    #[error("Raster error: {0}")]
    Raster(#[from] crate::raster::Error),
    /// The external JPEG decoder failed
    #[error("JPEG decoding error: {0}")]
    JpegDecode(#[from] jpeg_decoder::Error),
    /// The external JPEG encoder failed
    #[error("JPEG encoding error: {0}")]
    JpegEncode(#[from] jpeg_encoder::EncodingError),
    /// The JPEG stream decoded to a pixel format the codec cannot map
    /// to a four band raster
    #[error("Unsupported JPEG pixel format: {0}")]
    JpegPixelFormat(String),
    /// Encoding pre-quantized rasters requires an explicit palette
    #[error("An explicit palette is required to encode pre-indexed rasters")]
    PaletteRequired,
    /// A supplied raster does not match the dimensions of its mipmap
    /// level
    #[error(
        "Mipmap {level} must be {expected_width}x{expected_height}, but the raster is {width}x{height}"
    )]
    MismatchSizes {
        /// Mipmap level being encoded
        level: usize,
        /// Supplied raster width
        width: u32,
        /// Supplied raster height
        height: u32,
        /// Width the pyramid requires
        expected_width: u32,
        /// Height the pyramid requires
        expected_height: u32,
    },
}
