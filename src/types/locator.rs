/// Describes where to search for mipmap payloads
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MipmapLocator {
    /// Mipmaps are located inside the BLP file with given offsets
    /// and sizes. Unused entries are zero.
    Internal {
        /// Byte offsets from file start to each mipmap level (up to 16)
        offsets: [u32; 16],
        /// Byte sizes of each mipmap level (up to 16)
        sizes: [u32; 16],
    },
    /// Mipmaps are located in sidecar files with names
    /// `<base_name>.b<two digit number>`. Ex. `.b00`, `.b10`.
    External,
}

impl Default for MipmapLocator {
    fn default() -> Self {
        MipmapLocator::Internal {
            offsets: [0; 16],
            sizes: [0; 16],
        }
    }
}
