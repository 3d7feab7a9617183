//! Typed warning events emitted for recoverable corruption.
//!
//! Warnings are non-fatal: the codec patches the data up and keeps
//! going. They are delivered synchronously to a [`WarningSink`] supplied
//! at codec construction; the `Display` impls are a default English
//! rendering, hosts may match on the variants and format their own.

use log::warn;
use thiserror::Error;

/// A recoverable problem encountered while reading or writing BLP data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    /// A mipmap payload had the wrong size and was zero-padded or
    /// truncated to the expected one
    #[error("mipmap data buffer has {actual} bytes, expected {expected}")]
    BadDataBuffer {
        /// Size of the stored payload
        actual: usize,
        /// Size implied by the header
        expected: usize,
    },
    /// A decoded JPEG did not match the mipmap dimensions and was
    /// cropped or padded with transparent black
    #[error(
        "decoded mipmap is {width}x{height}, expected {expected_width}x{expected_height}"
    )]
    BadMipmapDimension {
        /// Decoded width
        width: u32,
        /// Decoded height
        height: u32,
        /// Width implied by the header
        expected_width: u32,
        /// Height implied by the header
        expected_height: u32,
    },
    /// An image declared opaque carries pixels with alpha below 255
    #[error("{transparent} of {total} pixels are not opaque in an image declared opaque")]
    BadPixelAlpha {
        /// Number of non-opaque samples found
        transparent: u64,
        /// Number of samples scanned
        total: u64,
    },
    /// The shared JPEG header exceeds the soft limit; some tools crash
    /// on such files
    #[error("shared JPEG header is {actual} bytes, exceeding the limit of {limit}")]
    BadJpegHeader {
        /// Stored shared header length
        actual: usize,
        /// The soft limit, [`crate::types::jpeg::MAX_SHARED_HEADER`]
        limit: usize,
    },
    /// The external JPEG decoder reported a warning
    #[error("JPEG decoder ({vendor}): {message}")]
    JpegDecoder {
        /// Name of the decoder implementation
        vendor: String,
        /// The decoder's message
        message: String,
    },
    /// The external JPEG encoder reported a warning
    #[error("JPEG encoder ({vendor}): {message}")]
    JpegEncoder {
        /// Name of the encoder implementation
        vendor: String,
        /// The encoder's message
        message: String,
    },
}

/// Receiver for [`Warning`] events. Any `FnMut(Warning)` closure is a
/// sink.
pub trait WarningSink {
    /// Deliver one warning. Called synchronously from the codec.
    fn warning(&mut self, warning: Warning);
}

impl<F: FnMut(Warning)> WarningSink for F {
    fn warning(&mut self, warning: Warning) {
        self(warning)
    }
}

/// Default sink that forwards every warning to [`log::warn!`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl WarningSink for LogSink {
    fn warning(&mut self, warning: Warning) {
        warn!("{warning}");
    }
}
