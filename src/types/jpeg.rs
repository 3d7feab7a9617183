/// Soft limit for the shared JPEG header length in bytes. Longer headers
/// are tolerated on read with a warning, but some tools crash on them,
/// so the encoder never produces one.
pub const MAX_SHARED_HEADER: usize = 624;

/// JPEG BLP content: the shared header prefix followed by one JPEG tail
/// per mipmap level.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JpegContent {
    /// Shared JPEG header prepended to every mipmap tail
    pub header: Vec<u8>,
    /// JPEG tail for each stored mipmap level
    pub images: Vec<Vec<u8>>,
}

impl JpegContent {
    /// Concatenate the shared header with the tail of the given level,
    /// producing a complete JPEG stream. Returns `None` if the level is
    /// not stored.
    pub fn full_jpeg(&self, level: usize) -> Option<Vec<u8>> {
        let tail = self.images.get(level)?;
        let mut jpeg = Vec::with_capacity(self.header.len() + tail.len());
        jpeg.extend_from_slice(&self.header);
        jpeg.extend_from_slice(tail);
        Some(jpeg)
    }
}
