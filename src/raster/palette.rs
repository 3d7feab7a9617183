use super::error::Error;
use crate::types::indexed::PALETTE_LENGTH;
use std::cell::OnceCell;

/// RGB color space a palette's entries are expressed in. BLP1 palettes
/// are linear RGB; the type exists so callers can override that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RgbSpace {
    /// Linear RGB, the native space of BLP palettes
    #[default]
    Linear,
    /// Standard sRGB with the usual transfer curve
    Srgb,
}

/// BLP compliant index (palette) color model. Maps 8-bit palette indices
/// to 24-bit RGB values and performs the inverse nearest-color lookup.
///
/// The quantization here is best effort: comparison happens in sRGB with
/// plain Euclidean distance and accuracy is not measured. Callers with
/// quality requirements should quantize with a dedicated algorithm and
/// feed the resulting indices in directly.
#[derive(Debug, Clone)]
pub struct IndexPalette {
    entries: [u32; PALETTE_LENGTH],
    alpha_bits: u32,
    space: RgbSpace,
    /// Palette entries converted to sRGB, built on first inverse lookup.
    /// Single-owner write-once cache, no synchronization needed.
    srgb_cache: OnceCell<Box<[[f32; 3]; PALETTE_LENGTH]>>,
}

impl IndexPalette {
    /// Construct a palette from up to 256 color words in the given
    /// space. Missing entries are zero-filled, surplus entries are
    /// ignored. Each word holds red in bits 16..24, green in 8..16 and
    /// blue in 0..8.
    pub fn new(colors: &[u32], alpha_bits: u32, space: RgbSpace) -> IndexPalette {
        let mut entries = [0u32; PALETTE_LENGTH];
        let n = colors.len().min(PALETTE_LENGTH);
        entries[..n].copy_from_slice(&colors[..n]);
        IndexPalette {
            entries,
            alpha_bits,
            space,
            srgb_cache: OnceCell::new(),
        }
    }

    /// Universal 8x8x4 color cube. Sufficient to hold any image with
    /// vague color accuracy; an adaptive palette gives far better
    /// results.
    pub fn universal(alpha_bits: u32, space: RgbSpace) -> IndexPalette {
        Self::universal_cube(8, 8, 4, alpha_bits, space)
            .expect("8x8x4 cube always fits a 256 color palette")
    }

    /// Universal palette with the given number of levels per color.
    /// Levels are distributed uniformly across sRGB and converted into
    /// the target space. Each color needs at least two levels and the
    /// product must fit into 256 entries.
    pub fn universal_cube(
        red_levels: u32,
        green_levels: u32,
        blue_levels: u32,
        alpha_bits: u32,
        space: RgbSpace,
    ) -> Result<IndexPalette, Error> {
        if red_levels < 2
            || green_levels < 2
            || blue_levels < 2
            || red_levels * green_levels * blue_levels > PALETTE_LENGTH as u32
        {
            return Err(Error::TooManyColors {
                red: red_levels,
                green: green_levels,
                blue: blue_levels,
            });
        }

        let mut entries = [0u32; PALETTE_LENGTH];
        let mut i = 0;
        for r in 0..red_levels {
            let red = r as f32 / (red_levels - 1) as f32;
            for g in 0..green_levels {
                let green = g as f32 / (green_levels - 1) as f32;
                for b in 0..blue_levels {
                    let blue = b as f32 / (blue_levels - 1) as f32;
                    entries[i] = pack_word(from_srgb([red, green, blue], space));
                    i += 1;
                }
            }
        }

        Ok(IndexPalette {
            entries,
            alpha_bits,
            space,
            srgb_cache: OnceCell::new(),
        })
    }

    /// The palette words exactly as stored.
    pub fn entries(&self) -> &[u32; PALETTE_LENGTH] {
        &self.entries
    }

    /// Bit depth of the alpha channel this palette is paired with.
    pub fn alpha_bits(&self) -> u32 {
        self.alpha_bits
    }

    /// Color space the palette entries are expressed in.
    pub fn space(&self) -> RgbSpace {
        self.space
    }

    /// RGB bytes of the color at the given index, in palette space.
    pub fn color(&self, index: u8) -> [u8; 3] {
        let word = self.entries[index as usize];
        [(word >> 16) as u8, (word >> 8) as u8, word as u8]
    }

    /// Index of the palette color closest to the requested one. The
    /// input is normalized RGB in the palette's space; comparison runs
    /// in sRGB with Euclidean distance. Ties go to the lowest index.
    pub fn nearest_index(&self, rgb: [f32; 3]) -> u8 {
        let desired = to_srgb(rgb, self.space);
        let cache = self.srgb_components();

        let mut best = 0u8;
        let mut best_diff = f32::MAX;
        for (i, entry) in cache.iter().enumerate() {
            let mut diff = 0f32;
            for c in 0..3 {
                let delta = entry[c] - desired[c];
                diff += delta * delta;
            }
            if diff < best_diff {
                best = i as u8;
                best_diff = diff;
            }
        }
        best
    }

    /// Nearest palette index for an sRGB byte triple. Convenience
    /// wrapper that routes the color through the palette's space.
    pub fn quantize_srgb(&self, rgb: [u8; 3]) -> u8 {
        let normalized = [
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
        ];
        self.nearest_index(from_srgb(normalized, self.space))
    }

    fn srgb_components(&self) -> &[[f32; 3]; PALETTE_LENGTH] {
        self.srgb_cache.get_or_init(|| {
            let mut cache = Box::new([[0f32; 3]; PALETTE_LENGTH]);
            for (entry, components) in self.entries.iter().zip(cache.iter_mut()) {
                let normalized = [
                    ((entry >> 16) & 0xFF) as f32 / 255.0,
                    ((entry >> 8) & 0xFF) as f32 / 255.0,
                    (entry & 0xFF) as f32 / 255.0,
                ];
                *components = to_srgb(normalized, self.space);
            }
            cache
        })
    }
}

/// Rescale an alpha sample between bit depths:
/// `round(sample * (2^to - 1) / (2^from - 1))`. A missing source band
/// (`from_bits == 0`) maps to fully opaque.
pub fn rescale_alpha(sample: u8, from_bits: u32, to_bits: u32) -> u8 {
    if to_bits == 0 {
        return 0;
    }
    let to_max = (1u32 << to_bits) - 1;
    if from_bits == 0 {
        return to_max as u8;
    }
    let from_max = (1u32 << from_bits) - 1;
    if from_bits == to_bits {
        return sample & from_max as u8;
    }
    let sample = (sample as u32).min(from_max);
    ((sample * to_max + from_max / 2) / from_max) as u8
}

/// Convert a single sRGB component to linear RGB.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Convert a single linear RGB component to sRGB.
pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

fn to_srgb(rgb: [f32; 3], space: RgbSpace) -> [f32; 3] {
    match space {
        RgbSpace::Srgb => rgb,
        RgbSpace::Linear => rgb.map(linear_to_srgb),
    }
}

fn from_srgb(rgb: [f32; 3], space: RgbSpace) -> [f32; 3] {
    match space {
        RgbSpace::Srgb => rgb,
        RgbSpace::Linear => rgb.map(srgb_to_linear),
    }
}

fn pack_word(rgb: [f32; 3]) -> u32 {
    let r = (rgb[0].clamp(0.0, 1.0) * 255.0).round() as u32;
    let g = (rgb[1].clamp(0.0, 1.0) * 255.0).round() as u32;
    let b = (rgb[2].clamp(0.0, 1.0) * 255.0).round() as u32;
    r << 16 | g << 8 | b
}
