use super::header::*;
use super::indexed::IndexedContent;
use super::jpeg::JpegContent;
pub use super::version::BlpVersion;

/// Maximum width that a BLP image can have due to the limitation
/// of mipmap storage.
pub const BLP_MAX_WIDTH: u32 = 65535;
/// Maximum height that a BLP image can have due to the limitation
/// of mipmap storage.
pub const BLP_MAX_HEIGHT: u32 = 65535;

/// Parsed information from a BLP file. The structure of the type
/// strictly follows how the file is stored on the disk for
/// easy encoding/decoding and further transformations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlpImage {
    /// File header containing metadata
    pub header: BlpHeader,
    /// Actual image data
    pub content: BlpContent,
}

impl BlpImage {
    /// Get total amount of images encoded in the content
    pub fn image_count(&self) -> usize {
        match &self.content {
            BlpContent::Indexed(v) => v.images.len(),
            BlpContent::Jpeg(v) => v.images.len(),
        }
    }

    /// If the image is JPEG encoded, return the content
    pub fn content_jpeg(&self) -> Option<&JpegContent> {
        self.content.jpeg()
    }

    /// If the image is palettized, return the content
    pub fn content_indexed(&self) -> Option<&IndexedContent> {
        self.content.indexed()
    }

    /// Get the alpha bit depth for this BLP image
    pub fn alpha_bit_depth(&self) -> u32 {
        self.header.alpha_bits
    }

    /// Find the best mipmap level for a target resolution.
    /// Returns the mipmap level closest to the target size.
    pub fn best_mipmap_for_size(&self, target_size: u32) -> usize {
        let image_count = self.image_count();
        if image_count == 0 {
            return 0;
        }

        let mut best_level = 0;
        let mut best_diff = u32::MAX;

        for level in 0..image_count {
            let (width, height) = self.header.mipmap_size(level);
            let size = width.max(height);
            let diff = size.abs_diff(target_size);

            if diff < best_diff {
                best_diff = diff;
                best_level = level;
            }
        }

        best_level
    }

    /// Get information about all stored mipmap levels
    pub fn mipmap_info(&self) -> Vec<MipmapInfo> {
        let mut info = Vec::new();

        for level in 0..self.image_count() {
            let (width, height) = self.header.mipmap_size(level);
            let data_size = match &self.content {
                BlpContent::Jpeg(jpeg) => jpeg.images.get(level).map(Vec::len).unwrap_or(0),
                BlpContent::Indexed(raw) => raw.images.get(level).map(Vec::len).unwrap_or(0),
            };

            info.push(MipmapInfo {
                level,
                width,
                height,
                data_size,
                pixel_count: width * height,
            });
        }

        info
    }

    /// Get total file size estimation (excluding external mipmaps)
    pub fn estimated_file_size(&self) -> usize {
        let header_size = BlpHeader::size(self.header.version);
        let content_size = match &self.content {
            BlpContent::Jpeg(jpeg) => {
                4 + jpeg.header.len() + jpeg.images.iter().map(Vec::len).sum::<usize>()
            }
            BlpContent::Indexed(raw) => {
                raw.cmap.len() * 4 + raw.images.iter().map(Vec::len).sum::<usize>()
            }
        };

        header_size + content_size
    }
}

/// Information about a single mipmap level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MipmapInfo {
    /// Mipmap level (0 = original)
    pub level: usize,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Size of stored payload in bytes
    pub data_size: usize,
    /// Total pixel count
    pub pixel_count: u32,
}

/// Collects all possible content types with actual data
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BlpContent {
    /// JPEG compressed image data
    Jpeg(JpegContent),
    /// Palettized image data with optional packed alpha
    Indexed(IndexedContent),
}

impl BlpContent {
    /// Get the content tag type for this content
    pub fn tag(&self) -> BlpContentTag {
        match self {
            BlpContent::Jpeg { .. } => BlpContentTag::Jpeg,
            BlpContent::Indexed { .. } => BlpContentTag::Indexed,
        }
    }

    /// Get JPEG content if this is JPEG encoded
    pub fn jpeg(&self) -> Option<&JpegContent> {
        match self {
            BlpContent::Jpeg(v) => Some(v),
            _ => None,
        }
    }

    /// Get indexed content if this is palettized
    pub fn indexed(&self) -> Option<&IndexedContent> {
        match self {
            BlpContent::Indexed(v) => Some(v),
            _ => None,
        }
    }
}
