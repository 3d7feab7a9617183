//! Mipmap pyramid generation and dimension optimization.

use image::{RgbaImage, imageops};

/// Conservative default for the largest dimension the game handles
/// comfortably. Overridable through the write options.
pub const DEFAULT_MAX_DIMENSION: u32 = 512;

/// How the encoder adjusts oversized input dimensions before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DimensionOpt {
    /// Keep the input dimensions untouched
    #[default]
    None,
    /// Scale down preserving the aspect ratio until both dimensions fit
    /// the configured maximum
    Ratio,
    /// Clamp each dimension independently into `1..=max`
    Clamp,
}

/// Dimensions after applying the optimization. `None` leaves them,
/// `Ratio` divides both by the same factor, `Clamp` forces each into
/// range separately.
pub fn optimized_dimensions(
    width: u32,
    height: u32,
    opt: DimensionOpt,
    max_dimension: u32,
) -> (u32, u32) {
    match opt {
        DimensionOpt::None => (width, height),
        DimensionOpt::Ratio => {
            let largest = width.max(height);
            if largest <= max_dimension {
                (width, height)
            } else {
                let scale = |v: u32| {
                    ((v as u64 * max_dimension as u64 / largest as u64) as u32).max(1)
                };
                (scale(width), scale(height))
            }
        }
        DimensionOpt::Clamp => (
            width.clamp(1, max_dimension),
            height.clamp(1, max_dimension),
        ),
    }
}

/// Apply the dimension optimization to an image. Downscaling uses area
/// averaging.
pub fn optimize_dimensions(
    image: RgbaImage,
    opt: DimensionOpt,
    max_dimension: u32,
) -> RgbaImage {
    let (width, height) = optimized_dimensions(image.width(), image.height(), opt, max_dimension);
    if (width, height) == image.dimensions() {
        image
    } else {
        imageops::thumbnail(&image, width, height)
    }
}

/// Compute the full mipmap pyramid for a root image by successive area
/// averaging. Level `i` has dimensions `(max(w >> i, 1), max(h >> i, 1))`;
/// the last level is 1x1.
pub fn generate_mipmaps(root: RgbaImage) -> Vec<RgbaImage> {
    let mut levels = vec![root];
    loop {
        let previous = levels.last().expect("pyramid starts with the root");
        let (width, height) = previous.dimensions();
        if width <= 1 && height <= 1 {
            break;
        }
        let next = imageops::thumbnail(previous, (width / 2).max(1), (height / 2).max(1));
        levels.push(next);
    }
    levels
}
