//! Codec for Warcraft III BLP (texture) files.
//!
//! This crate reads and writes BLP texture files as used by Warcraft III.
//! BLP is Blizzard's proprietary texture container carrying a mipmap
//! pyramid with either palettized or JPEG compressed payloads.
//!
//! # Supported Versions
//!
//! - **BLP0** - Used in Warcraft III ROC Beta builds; mipmaps are stored
//!   in sidecar files next to the main file.
//! - **BLP1** - Warcraft III release format; mipmaps are stored inside
//!   the file behind an offset/size directory.
//!
//! BLP2 (World of Warcraft) is explicitly not supported.
//!
//! # Supported Encodings
//!
//! - **Indexed** - 256-color palette plus an optional separate alpha
//!   channel of 1, 4 or 8 bits per pixel.
//! - **JPEG** - JPEG compressed images sharing a common header prefix
//!   across all mipmap levels.
//!
//! # Examples
//!
//! ## Loading a BLP file
//!
//! ```no_run
//! use war3_blp::decoder::{Decoder, ReadOptions};
//!
//! let mut decoder = Decoder::open_path("texture.blp", ReadOptions::default());
//! let image = decoder.read(0).expect("Failed to decode");
//! ```
//!
//! ## Saving an image as BLP
//!
//! ```no_run
//! use image::DynamicImage;
//! use war3_blp::encoder::{Encoder, WriteOptions};
//! use war3_blp::types::{BlpContentTag, BlpVersion};
//!
//! # let image = DynamicImage::new_rgba8(256, 256);
//! let mut encoder = Encoder::new(
//!     BlpVersion::Blp1,
//!     BlpContentTag::Indexed,
//!     8,
//!     WriteOptions::default(),
//! )
//! .expect("Invalid encoder configuration");
//! encoder.write_file("output.blp", &image).expect("Failed to save");
//! ```

#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Pixel-level conversion between BLP payloads and images
pub mod convert;
/// High-level reading session over a BLP source
pub mod decoder;
/// Encoding BLP format into a stream of bytes or files
pub mod encode;
/// High-level writing session producing BLP output
pub mod encoder;
/// Decoding BLP format from raw bytes
pub mod parser;
/// Utilities for mipmap sidecar filename generation
pub mod path;
/// Packed index/alpha rasters and the palette color model
pub mod raster;
/// Defines structure of parsed BLP file
pub mod types;
/// Typed warning events and sink interface
pub mod warning;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use types::*;
