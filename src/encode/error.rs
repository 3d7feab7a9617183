use crate::types::BlpVersion;
use thiserror::Error;

/// Errors that can occur during BLP encoding operations
#[derive(Debug, Error)]
pub enum Error {
    /// Image width exceeds BLP format maximum of 65,535 pixels
    #[error("BLP supports width up to 65,535, the width: {0}")]
    WidthTooHigh(u32),
    /// Image height exceeds BLP format maximum of 65,535 pixels
    #[error("BLP supports height up to 65,535, the height: {0}")]
    HeightTooHigh(u32),
    /// The version keeps mipmaps in sidecar files, which cannot be
    /// expressed in a single output buffer
    #[error("{0} stores mipmaps in sidecar files, write to a path instead of a buffer")]
    ExternalNeedsPath(BlpVersion),
    /// The number of stored mipmap levels does not match the header
    #[error("The image stores {actual} mipmap levels, the header requires {expected}")]
    WrongLevelCount {
        /// Level count the header requires
        expected: usize,
        /// Level count actually stored
        actual: usize,
    },
    /// Filesystem operation failed
    #[error("Failed to proceed {0}, due: {1}")]
    FileSystem(std::path::PathBuf, std::io::Error),
    /// Invalid or malformed file name for BLP file
    #[error("Name of root file is malformed: {0}")]
    FileNameInvalid(std::path::PathBuf),
}
