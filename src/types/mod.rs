/// BLP file header structures
pub mod header;
/// Main BLP image type
pub mod image;
/// Indexed (palettized) BLP content
pub mod indexed;
/// JPEG-specific BLP content
pub mod jpeg;
/// Mipmap locator information
pub mod locator;
/// BLP version definitions
pub mod version;

pub use self::image::*;
pub use header::*;
pub use indexed::*;
pub use jpeg::*;
pub use locator::*;
pub use version::*;
