use super::locator::MipmapLocator;
use super::version::BlpVersion;
use std::fmt;

/// Content encoding tag stored in the BLP header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BlpContentTag {
    /// Payloads are JPEG streams sharing a common header prefix
    Jpeg,
    /// Payloads are palette indices with an optional packed alpha band
    Indexed,
}

impl TryFrom<u32> for BlpContentTag {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, u32> {
        match value {
            0 => Ok(BlpContentTag::Jpeg),
            1 => Ok(BlpContentTag::Indexed),
            _ => Err(value),
        }
    }
}

impl From<BlpContentTag> for u32 {
    fn from(value: BlpContentTag) -> u32 {
        match value {
            BlpContentTag::Jpeg => 0,
            BlpContentTag::Indexed => 1,
        }
    }
}

impl fmt::Display for BlpContentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlpContentTag::Jpeg => write!(f, "jpeg"),
            BlpContentTag::Indexed => write!(f, "indexed"),
        }
    }
}

impl BlpContentTag {
    /// Check that an alpha channel bit depth is legal for this content
    /// encoding. Indexed content allows 0, 1, 4 and 8 bits, JPEG content
    /// allows 0 and 8.
    pub fn alpha_bits_valid(self, alpha_bits: u32) -> bool {
        match self {
            BlpContentTag::Jpeg => matches!(alpha_bits, 0 | 8),
            BlpContentTag::Indexed => matches!(alpha_bits, 0 | 1 | 4 | 8),
        }
    }
}

/// Parsed BLP file header. The layout strictly follows the on-disk
/// structure for easy encoding/decoding.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlpHeader {
    /// Container version derived from the magic bytes
    pub version: BlpVersion,
    /// Payload encoding
    pub content: BlpContentTag,
    /// Alpha channel bit depth: 0, 1, 4 or 8
    pub alpha_bits: u32,
    /// Width of the full-scale image in pixels
    pub width: u32,
    /// Height of the full-scale image in pixels
    pub height: u32,
    /// Reserved word at offset 20. Ignored by this crate but preserved
    /// verbatim so that foreign files survive a parse/encode cycle.
    pub extra: u32,
    /// Raw mipmap flag word; any nonzero value means the file carries a
    /// full mipmap pyramid
    pub mipmaps: u32,
    /// Where mipmap payloads are located
    pub mipmap_locator: MipmapLocator,
}

impl BlpHeader {
    /// Does the file carry a mipmap pyramid beyond the root image?
    pub fn has_mipmaps(&self) -> bool {
        self.mipmaps != 0
    }

    /// Number of images stored in the file. With mipmaps present this is
    /// `floor(log2(max(width, height))) + 1`, otherwise exactly one.
    pub fn mipmap_count(&self) -> usize {
        if self.has_mipmaps() {
            let max_dim = self.width.max(self.height).max(1);
            (32 - max_dim.leading_zeros()) as usize
        } else {
            1
        }
    }

    /// Dimensions of the given mipmap level. Each level halves the
    /// previous one, clamped to a minimum of one pixel per axis.
    pub fn mipmap_size(&self, level: usize) -> (u32, u32) {
        let shift = level.min(31) as u32;
        ((self.width >> shift).max(1), (self.height >> shift).max(1))
    }

    /// Pixel count of the given mipmap level.
    pub fn mipmap_pixels(&self, level: usize) -> u32 {
        let (width, height) = self.mipmap_size(level);
        width * height
    }

    /// Number of bytes the packed alpha band of the given mipmap level
    /// occupies on disk.
    pub fn mipmap_alpha_bytes(&self, level: usize) -> usize {
        (self.mipmap_pixels(level) as usize * self.alpha_bits as usize).div_ceil(8)
    }

    /// Size of the fixed header in bytes, including the mipmap directory
    /// for versions that store one.
    pub fn size(version: BlpVersion) -> usize {
        match version {
            // magic + 6 fields
            BlpVersion::Blp0 => 28,
            // magic + 6 fields + 16 offsets + 16 sizes
            BlpVersion::Blp1 => 28 + 128,
        }
    }
}
