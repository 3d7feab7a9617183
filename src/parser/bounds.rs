//! Bounds checking utilities for mipmap directory entries

use super::error::Error;
use super::types::ParseResult;
use log::error;

/// Check that a directory entry with the given offset and size lies
/// within the bounds of the input data.
pub fn check_bounds(input: &[u8], offset: u32, size: u32, mipmap_index: usize) -> ParseResult<()> {
    let offset = offset as usize;
    let size = size as usize;

    if offset >= input.len() {
        error!(
            "Offset of mipmap {} is out of bounds! {} >= {}",
            mipmap_index,
            offset,
            input.len()
        );
        return Err(Error::OutOfBounds { offset, size: 0 });
    }

    if offset + size > input.len() {
        error!(
            "Offset+size of mipmap {} is out of bounds! {} > {}",
            mipmap_index,
            offset + size,
            input.len()
        );
        return Err(Error::OutOfBounds { offset, size });
    }

    Ok(())
}

/// Get a slice of the input after bounds checking the directory entry.
pub fn get_bounded_slice(
    input: &[u8],
    offset: u32,
    size: u32,
    mipmap_index: usize,
) -> ParseResult<&[u8]> {
    check_bounds(input, offset, size, mipmap_index)?;
    Ok(&input[offset as usize..offset as usize + size as usize])
}
