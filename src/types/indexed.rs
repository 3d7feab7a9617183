/// Number of colors in a BLP palette block.
pub const PALETTE_LENGTH: usize = 256;

/// Palettized BLP content: the color map followed by one payload blob
/// per mipmap level.
///
/// Palette words are kept exactly as loaded (little-endian), so unused
/// entries survive a parse/encode cycle verbatim. After loading, a word
/// holds red in bits 16..24, green in 8..16 and blue in 0..8; the high
/// byte is reserved.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexedContent {
    /// Color map with exactly [`PALETTE_LENGTH`] entries
    pub cmap: [u32; PALETTE_LENGTH],
    /// Raw payload blob for each stored mipmap level. The expected size
    /// is `width * height` index bytes followed by the packed alpha
    /// band, but corrupt files may store more or less.
    pub images: Vec<Vec<u8>>,
}

impl IndexedContent {
    /// Raw payload of the given mipmap level, if stored.
    pub fn image(&self, level: usize) -> Option<&[u8]> {
        self.images.get(level).map(Vec::as_slice)
    }
}
