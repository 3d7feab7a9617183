//! High-level reading session over a BLP source.
//!
//! A [`Decoder`] wraps an input (a byte buffer or a filesystem path),
//! reads the header lazily on the first query and caches the parsed
//! container for the lifetime of the session. Mipmap levels are
//! decoded on demand: index 0 is the full-scale image, higher levels
//! are the thumbnails of the pyramid.

use crate::convert::{self, DefaultJpegCodec, JpegCodec, Processor};
use crate::parser::{self, LoadError};
use crate::raster::IndexedRaster;
use crate::types::*;
use crate::warning::{LogSink, WarningSink};
use ::image::DynamicImage;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors of the reading session
#[derive(Debug, Error)]
pub enum Error {
    /// Reading the source from the filesystem failed
    #[error("{0}")]
    Load(#[from] LoadError),
    /// Parsing the container failed
    #[error("{0}")]
    Parse(#[from] parser::Error),
    /// Decoding a mipmap payload failed
    #[error("{0}")]
    Convert(#[from] convert::Error),
    /// The requested mipmap level lies outside the pyramid
    #[error("Mipmap index {index} is out of range, the file has {count} levels")]
    InvalidMipmapIndex {
        /// Requested level
        index: usize,
        /// Number of levels in the file
        count: usize,
    },
    /// The mipmap level is inside the pyramid but its payload is not
    /// stored (a missing BLP0 sidecar or a truncated directory)
    #[error("Mipmap {0} is not stored in the file")]
    MissingMipmap(usize),
    /// The mipmap level was released by a flush and can no longer be
    /// requested
    #[error("Mipmap {0} was flushed and can no longer be read")]
    MipmapFlushed(usize),
}

/// Options of a reading session.
#[derive(Clone)]
pub struct ReadOptions {
    /// Run the pixel-by-pixel opacity scan on JPEG files declared
    /// opaque. On by default; disabling it trades the
    /// [`crate::warning::Warning::BadPixelAlpha`] diagnostic for speed.
    pub deep_check: bool,
    /// Override the JPEG codec. `None` uses the built-in
    /// [`DefaultJpegCodec`].
    pub jpeg_codec: Option<Arc<dyn JpegCodec>>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions {
            deep_check: true,
            jpeg_codec: None,
        }
    }
}

impl fmt::Debug for ReadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOptions")
            .field("deep_check", &self.deep_check)
            .field(
                "jpeg_codec",
                &self.jpeg_codec.as_ref().map(|c| c.vendor().to_owned()),
            )
            .finish()
    }
}

enum Input {
    Buffer(Vec<u8>),
    File(PathBuf),
}

struct Session {
    image: BlpImage,
    processor: Processor,
    flushed_below: usize,
}

/// A reading session over one BLP source. Not safe for concurrent use;
/// run disjoint decoders in parallel instead.
pub struct Decoder {
    input: Input,
    options: ReadOptions,
    sink: Box<dyn WarningSink>,
    session: Option<Session>,
}

impl Decoder {
    /// Open a decoder over an in-memory buffer. BLP0 sidecar mipmaps
    /// are not reachable from a buffer; open a path for those.
    pub fn open_buffer(bytes: impl Into<Vec<u8>>, options: ReadOptions) -> Decoder {
        Decoder {
            input: Input::Buffer(bytes.into()),
            options,
            sink: Box::new(LogSink),
            session: None,
        }
    }

    /// Open a decoder over a byte stream, buffering it fully. BLP0
    /// sidecar mipmaps are not reachable this way; open a path for
    /// those.
    pub fn open_reader(
        mut reader: impl std::io::Read,
        options: ReadOptions,
    ) -> std::io::Result<Decoder> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Decoder::open_buffer(bytes, options))
    }

    /// Open a decoder over a filesystem path. Required for BLP0, whose
    /// mipmaps live in sidecar files next to the main one.
    pub fn open_path(path: impl AsRef<Path>, options: ReadOptions) -> Decoder {
        Decoder {
            input: Input::File(path.as_ref().to_owned()),
            options,
            sink: Box::new(LogSink),
            session: None,
        }
    }

    /// Replace the warning sink. Warnings encountered while parsing the
    /// header and payloads are delivered synchronously to the sink, so
    /// set it before the first query.
    pub fn set_warning_sink(&mut self, sink: Box<dyn WarningSink>) {
        self.sink = sink;
    }

    /// The parsed header. Parsing happens once, on the first query.
    pub fn header(&mut self) -> Result<&BlpHeader, Error> {
        self.load_session()?;
        Ok(&self.session().image.header)
    }

    /// The whole parsed container.
    pub fn image(&mut self) -> Result<&BlpImage, Error> {
        self.load_session()?;
        Ok(&self.session().image)
    }

    /// Number of mipmap levels the header describes.
    pub fn mipmap_count(&mut self) -> Result<usize, Error> {
        Ok(self.header()?.mipmap_count())
    }

    /// Dimensions of the given mipmap level.
    pub fn dimensions(&mut self, mipmap_index: usize) -> Result<(u32, u32), Error> {
        self.load_session()?;
        self.check_index(mipmap_index)?;
        Ok(self.session().image.header.mipmap_size(mipmap_index))
    }

    /// Decode the given mipmap level into an image. Index 0 is the
    /// full-scale image.
    pub fn read(&mut self, mipmap_index: usize) -> Result<DynamicImage, Error> {
        self.load_session()?;
        self.check_index(mipmap_index)?;
        let deep_check = self.options.deep_check;
        let sink = &mut *self.sink;
        let session = self.session.as_mut().expect("session is loaded above");

        let (width, height) = session.image.header.mipmap_size(mipmap_index);
        let payload = stored_payload(&session.image, mipmap_index)?;
        Ok(session
            .processor
            .decode_mipmap(payload, width, height, deep_check, sink)?)
    }

    /// Decode the given mipmap level of a palettized file into its
    /// packed raster, without palette expansion.
    pub fn read_indexed(&mut self, mipmap_index: usize) -> Result<IndexedRaster, Error> {
        self.load_session()?;
        self.check_index(mipmap_index)?;
        let sink = &mut *self.sink;
        let session = self.session.as_mut().expect("session is loaded above");

        let (width, height) = session.image.header.mipmap_size(mipmap_index);
        let payload = stored_payload(&session.image, mipmap_index)?;
        Ok(session
            .processor
            .decode_raster(payload, width, height, sink)?)
    }

    /// Assert that mipmaps below the given level will no longer be
    /// requested and release their payload buffers. Reading a flushed
    /// level afterwards fails with [`Error::MipmapFlushed`].
    pub fn flush_to(&mut self, mipmap_index: usize) -> Result<(), Error> {
        self.load_session()?;
        let session = self.session.as_mut().expect("session is loaded above");
        let images = match &mut session.image.content {
            BlpContent::Indexed(content) => &mut content.images,
            BlpContent::Jpeg(content) => &mut content.images,
        };
        for image in images.iter_mut().take(mipmap_index) {
            *image = Vec::new();
        }
        session.flushed_below = session.flushed_below.max(mipmap_index);
        Ok(())
    }

    /// Run the session setup: parse the header, let the processor for
    /// the encoding kind consume its prelude, then locate the mipmap
    /// payloads.
    fn load_session(&mut self) -> Result<(), Error> {
        if self.session.is_some() {
            return Ok(());
        }

        let codec: Arc<dyn JpegCodec> = self
            .options
            .jpeg_codec
            .clone()
            .unwrap_or_else(|| Arc::new(DefaultJpegCodec));
        let sink = &mut *self.sink;

        let file_input;
        let (input, sidecars): (&[u8], Vec<Vec<u8>>) = match &self.input {
            Input::Buffer(bytes) => (bytes.as_slice(), Vec::new()),
            Input::File(path) => {
                file_input =
                    std::fs::read(path).map_err(|e| LoadError::FileSystem(path.clone(), e))?;
                (file_input.as_slice(), parser::preload_sidecars(path)?)
            }
        };

        let header = parser::parse_header(input)?;
        let header_size = BlpHeader::size(header.version);
        if input.len() < header_size {
            return Err(parser::Error::UnexpectedEof.into());
        }

        let mut processor = Processor::new(header.content, header.alpha_bits, None, codec);
        processor.read_prelude(&input[header_size..], sink)?;
        let payloads = parser::parse_mipmap_payloads(
            &header,
            |i| parser::preloaded_mipmaps(&sidecars, i),
            input,
        )?;

        let content = match &processor {
            Processor::Indexed(p) => BlpContent::Indexed(IndexedContent {
                cmap: *p.palette().entries(),
                images: payloads,
            }),
            Processor::Jpeg(p) => BlpContent::Jpeg(JpegContent {
                header: p.shared_header().to_vec(),
                images: payloads,
            }),
        };
        self.session = Some(Session {
            image: BlpImage { header, content },
            processor,
            flushed_below: 0,
        });
        Ok(())
    }

    fn session(&self) -> &Session {
        self.session.as_ref().expect("session is loaded above")
    }

    fn check_index(&self, mipmap_index: usize) -> Result<(), Error> {
        let session = self.session();
        let count = session.image.header.mipmap_count();
        if mipmap_index >= count {
            return Err(Error::InvalidMipmapIndex {
                index: mipmap_index,
                count,
            });
        }
        if mipmap_index < session.flushed_below {
            return Err(Error::MipmapFlushed(mipmap_index));
        }
        Ok(())
    }
}

fn stored_payload(image: &BlpImage, mipmap_index: usize) -> Result<&[u8], Error> {
    let payload = match &image.content {
        BlpContent::Indexed(content) => content.images.get(mipmap_index),
        BlpContent::Jpeg(content) => content.images.get(mipmap_index),
    };
    payload
        .map(Vec::as_slice)
        .ok_or(Error::MissingMipmap(mipmap_index))
}
