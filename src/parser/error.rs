use crate::types::BlpContentTag;
use thiserror::Error;

/// Errors that appear when loading from the filesystem
#[derive(Debug, Error)]
pub enum LoadError {
    /// Parsing the container failed
    #[error("{0}")]
    Parsing(#[from] Error),
    /// File system error when reading BLP or mipmap files
    #[error("File system error with file {0}, due: {1}")]
    FileSystem(std::path::PathBuf, std::io::Error),
    /// Invalid or malformed BLP filename
    #[error("Cannot derive mipmap name for {0}")]
    InvalidFilename(std::path::PathBuf),
}

/// Errors that the BLP parser can produce
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid magic bytes in the BLP header. Note that BLP2 has valid
    /// magic but is not supported by this crate.
    #[error("Unexpected magic value {0}. The file format is not BLP or not supported.")]
    WrongMagic(String),
    /// Unknown encoding kind code in the header
    #[error("Unknown content encoding code {0}, expected 0 (jpeg) or 1 (indexed)")]
    UnsupportedEncoding(u32),
    /// Alpha channel depth is not legal for the content encoding
    #[error("Alpha depth of {alpha_bits} bits is not supported for {content} content")]
    UnsupportedAlphaBits {
        /// Content encoding from the header
        content: BlpContentTag,
        /// The illegal alpha bits value
        alpha_bits: u32,
    },
    /// Image dimensions are zero or exceed the format limit
    #[error("Dimensions {width}x{height} are outside of the supported range")]
    InvalidDimensions {
        /// Width from the header
        width: u32,
        /// Height from the header
        height: u32,
    },
    /// Failed to load an external mipmap file
    #[error("Failed to extract external mipmap number {0} with error {1}")]
    ExternalMipmap(usize, Box<dyn std::error::Error>),
    /// Missing image data for the specified mipmap level
    #[error("There is no body of image for BLP0 mipmap number {0}")]
    MissingImage(usize),
    /// Image data extends beyond file boundaries
    #[error("Part of image exceeds bounds of file at offset {offset} with size {size}")]
    OutOfBounds {
        /// Offset where the out of bounds access occurred
        offset: usize,
        /// Size of data that was attempted to be read
        size: usize,
    },
    /// Unexpected end of file while parsing
    #[error("Unexpected end of file")]
    UnexpectedEof,
    /// Parser error with context information
    #[error("Context: {0}. Error: {1}")]
    Context(String, Box<Self>),
}

impl Error {
    /// Add context information to an error
    pub fn with_context(self, context: &str) -> Self {
        Error::Context(context.to_owned(), Box::new(self))
    }
}
