//! Filename convention for BLP0 mipmap sidecar files.
//!
//! A BLP0 main file `X.blp` keeps its mipmap payloads in sibling files
//! `X.b00`, `X.b01`, … one per level, two-digit level number.

use std::path::{Path, PathBuf};

/// Derive the sidecar path of the given mipmap level from the main BLP
/// file path. Returns `None` when the path has no file name to derive
/// from.
pub fn make_mipmap_path<Q>(path: Q, level: usize) -> Option<PathBuf>
where
    Q: AsRef<Path>,
{
    let path = path.as_ref();
    path.file_stem()?;
    Some(path.with_extension(format!("b{level:02}")))
}
