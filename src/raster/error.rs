use thiserror::Error;

/// Errors produced by packed rasters and the palette color model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Pixel coordinate lies outside the raster
    #[error("Coordinate ({x}, {y}) is outside of a {width}x{height} raster")]
    InvalidCoord {
        /// Requested column
        x: u32,
        /// Requested row
        y: u32,
        /// Raster width in pixels
        width: u32,
        /// Raster height in pixels
        height: u32,
    },
    /// The raster was created with zero alpha bits and carries no alpha band
    #[error("The raster has no alpha band")]
    NoAlphaBand,
    /// A data buffer does not match the layout it is wrapped with
    #[error("Data buffer has {actual} bytes, layout requires {expected}")]
    BufferSize {
        /// Size of the supplied buffer
        actual: usize,
        /// Size the layout requires
        expected: usize,
    },
    /// A universal palette was requested with more colors than a palette can hold
    #[error("{red}x{green}x{blue} color levels do not fit into a 256 color palette")]
    TooManyColors {
        /// Requested red levels
        red: u32,
        /// Requested green levels
        green: u32,
        /// Requested blue levels
        blue: u32,
    },
}
