pub use super::error::Error;

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, Error>;
