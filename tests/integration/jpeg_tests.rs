//! Tests for JPEG content: shared header handling, band order,
//! dimension fixups and the deep alpha check

use std::cell::RefCell;
use std::rc::Rc;
use test_log::test;
use war3_blp::convert::{DefaultJpegCodec, JpegCodec, JpegRaster};
use war3_blp::decoder::{Decoder, ReadOptions};
use war3_blp::encoder::{Encoder, WriteOptions};
use war3_blp::types::{
    BlpContent, BlpContentTag, BlpHeader, BlpImage, BlpVersion, JpegContent, MAX_SHARED_HEADER,
    MipmapLocator,
};
use war3_blp::warning::Warning;

fn collecting_decoder(bytes: Vec<u8>) -> (Decoder, Rc<RefCell<Vec<Warning>>>) {
    let warnings = Rc::new(RefCell::new(Vec::new()));
    let inner = warnings.clone();
    let mut decoder = Decoder::open_buffer(bytes, ReadOptions::default());
    decoder.set_warning_sink(Box::new(move |w: Warning| inner.borrow_mut().push(w)));
    (decoder, warnings)
}

fn jpeg_blp1(width: u32, height: u32, alpha_bits: u32, content: JpegContent) -> BlpImage {
    let has_mipmaps = content.images.len() > 1;
    BlpImage {
        header: BlpHeader {
            version: BlpVersion::Blp1,
            content: BlpContentTag::Jpeg,
            alpha_bits,
            width,
            height,
            extra: 0,
            mipmaps: has_mipmaps as u32,
            mipmap_locator: MipmapLocator::default(),
        },
        content: BlpContent::Jpeg(content),
    }
}

#[test]
fn single_pixel_rgba_survives_the_round_trip() {
    let mut input = image::RgbaImage::new(1, 1);
    input.put_pixel(0, 0, image::Rgba([10, 20, 30, 128]));

    let mut encoder = Encoder::new(
        BlpVersion::Blp1,
        BlpContentTag::Jpeg,
        8,
        WriteOptions::default(),
    )
    .unwrap();
    let bytes = encoder
        .encode_to_vec(&image::DynamicImage::ImageRgba8(input))
        .unwrap();

    let (mut decoder, warnings) = collecting_decoder(bytes);
    let decoded = decoder.read(0).unwrap();
    let rgba = decoded.as_rgba8().expect("8 alpha bits expose the band");
    let pixel = rgba.get_pixel(0, 0).0;
    for (got, want) in pixel.iter().zip([10u8, 20, 30, 128]) {
        assert!(
            got.abs_diff(want) <= 2,
            "channel drifted from {want} to {got}, pixel {pixel:?}"
        );
    }
    assert!(warnings.borrow().is_empty());
}

#[test]
fn mipmapped_jpeg_shares_the_common_prefix() {
    let mut input = image::RgbaImage::new(8, 8);
    for (x, y, pixel) in input.enumerate_pixels_mut() {
        *pixel = image::Rgba([(x * 30) as u8, (y * 30) as u8, 90, 255]);
    }

    let mut encoder = Encoder::new(
        BlpVersion::Blp1,
        BlpContentTag::Jpeg,
        0,
        WriteOptions::default(),
    )
    .unwrap();
    let bytes = encoder
        .encode_to_vec(&image::DynamicImage::ImageRgba8(input))
        .unwrap();

    let parsed = war3_blp::parser::parse_blp(&bytes).unwrap();
    let content = parsed.content_jpeg().expect("jpeg content");
    assert_eq!(parsed.header.mipmap_count(), 4);
    assert_eq!(content.images.len(), 4);
    assert!(content.header.len() <= MAX_SHARED_HEADER);

    // every reassembled stream is a complete JPEG again
    for level in 0..content.images.len() {
        let full = content.full_jpeg(level).unwrap();
        assert_eq!(&full[..2], &[0xFF, 0xD8], "level {level} lost its SOI");
    }

    // the shared header is maximal: the byte right after it differs
    // between at least two tails
    if content.header.len() < MAX_SHARED_HEADER {
        let firsts: Vec<Option<u8>> = content
            .images
            .iter()
            .map(|tail| tail.first().copied())
            .collect();
        assert!(
            firsts.windows(2).any(|w| w[0] != w[1]),
            "prefix was not maximal: {firsts:?}"
        );
    }

    // decoding each level yields the pyramid dimensions
    let (mut decoder, warnings) = collecting_decoder(bytes);
    for (level, dims) in [(0, (8, 8)), (1, (4, 4)), (2, (2, 2)), (3, (1, 1))] {
        let image = decoder.read(level).unwrap();
        assert_eq!((image.width(), image.height()), dims);
    }
    assert!(warnings.borrow().is_empty());
}

#[test]
fn opaque_file_with_translucent_pixel_warns_once() {
    // hand-build an opaque-declared file whose embedded JPEG carries
    // a translucent pixel
    let codec = DefaultJpegCodec;
    let mut sink = |_: Warning| {};
    let raster = JpegRaster {
        width: 1,
        height: 1,
        // file band order, alpha 128
        data: vec![30, 20, 10, 128],
    };
    let jpeg = codec.encode(&raster, 1.0, &mut sink).unwrap();

    let blp = jpeg_blp1(
        1,
        1,
        0,
        JpegContent {
            header: Vec::new(),
            images: vec![jpeg],
        },
    );
    let bytes = war3_blp::encode::encode_blp(&blp).unwrap();

    let (mut decoder, warnings) = collecting_decoder(bytes);
    let decoded = decoder.read(0).unwrap();
    // the alpha band is not exposed on an opaque file
    assert!(decoded.as_rgb8().is_some());
    assert_eq!(
        warnings.borrow().as_slice(),
        &[Warning::BadPixelAlpha {
            transparent: 1,
            total: 1
        }]
    );

    // the deep check can be disabled
    let bytes = war3_blp::encode::encode_blp(&blp).unwrap();
    let warnings = Rc::new(RefCell::new(Vec::new()));
    let inner = warnings.clone();
    let mut decoder = Decoder::open_buffer(
        bytes,
        ReadOptions {
            deep_check: false,
            ..ReadOptions::default()
        },
    );
    decoder.set_warning_sink(Box::new(move |w: Warning| inner.borrow_mut().push(w)));
    decoder.read(0).unwrap();
    assert!(warnings.borrow().is_empty());
}

#[test]
fn encoding_an_opaque_file_forces_opaque_alpha() {
    let mut input = image::RgbaImage::new(2, 2);
    for pixel in input.pixels_mut() {
        *pixel = image::Rgba([100, 150, 200, 40]);
    }

    let warnings = Rc::new(RefCell::new(Vec::new()));
    let inner = warnings.clone();
    let mut encoder = Encoder::new(
        BlpVersion::Blp1,
        BlpContentTag::Jpeg,
        0,
        WriteOptions {
            auto_mipmap: false,
            ..WriteOptions::default()
        },
    )
    .unwrap();
    encoder.set_warning_sink(Box::new(move |w: Warning| inner.borrow_mut().push(w)));
    let bytes = encoder
        .encode_to_vec(&image::DynamicImage::ImageRgba8(input))
        .unwrap();

    // the translucent input is reported on the way in
    assert_eq!(
        warnings.borrow().as_slice(),
        &[Warning::BadPixelAlpha {
            transparent: 4,
            total: 4
        }]
    );

    // and the file itself decodes fully opaque without warnings
    let (mut decoder, read_warnings) = collecting_decoder(bytes);
    decoder.read(0).unwrap();
    assert!(read_warnings.borrow().is_empty());
}

#[test]
fn wrong_jpeg_dimensions_pad_with_transparent_black() {
    // the embedded JPEG is 2x2 while the header promises 4x4
    let codec = DefaultJpegCodec;
    let mut sink = |_: Warning| {};
    let raster = JpegRaster {
        width: 2,
        height: 2,
        data: vec![200; 2 * 2 * 4],
    };
    let jpeg = codec.encode(&raster, 1.0, &mut sink).unwrap();

    let blp = jpeg_blp1(
        4,
        4,
        8,
        JpegContent {
            header: Vec::new(),
            images: vec![jpeg],
        },
    );
    let bytes = war3_blp::encode::encode_blp(&blp).unwrap();

    let (mut decoder, warnings) = collecting_decoder(bytes);
    let decoded = decoder.read(0).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (4, 4));
    assert_eq!(
        warnings.borrow().as_slice(),
        &[Warning::BadMipmapDimension {
            width: 2,
            height: 2,
            expected_width: 4,
            expected_height: 4
        }]
    );

    let rgba = decoded.to_rgba8();
    // the decoded content stays in the top-left corner
    assert!(rgba.get_pixel(0, 0).0[0] > 150);
    // padding is transparent black
    assert_eq!(rgba.get_pixel(3, 3).0, [0, 0, 0, 0]);
}

#[test]
fn oversized_shared_header_is_tolerated_with_a_warning() {
    // build a valid single-level file, then split it so the stored
    // shared header exceeds the soft limit
    let codec = DefaultJpegCodec;
    let mut sink = |_: Warning| {};
    let raster = JpegRaster {
        width: 8,
        height: 8,
        data: (0..8 * 8 * 4).map(|i| (i % 251) as u8).collect(),
    };
    let jpeg = codec.encode(&raster, 1.0, &mut sink).unwrap();
    assert!(jpeg.len() > MAX_SHARED_HEADER + 1);

    let split = MAX_SHARED_HEADER + 1;
    let blp = jpeg_blp1(
        8,
        8,
        8,
        JpegContent {
            header: jpeg[..split].to_vec(),
            images: vec![jpeg[split..].to_vec()],
        },
    );
    let bytes = war3_blp::encode::encode_blp(&blp).unwrap();

    let (mut decoder, warnings) = collecting_decoder(bytes);
    decoder.read(0).unwrap();
    assert_eq!(
        warnings.borrow().as_slice(),
        &[Warning::BadJpegHeader {
            actual: MAX_SHARED_HEADER + 1,
            limit: MAX_SHARED_HEADER
        }]
    );
}

#[test]
fn indexed_raster_access_is_rejected_for_jpeg_content() {
    let mut encoder = Encoder::new(
        BlpVersion::Blp1,
        BlpContentTag::Jpeg,
        0,
        WriteOptions::default(),
    )
    .unwrap();
    let bytes = encoder
        .encode_to_vec(&image::DynamicImage::new_rgba8(2, 2))
        .unwrap();

    let mut decoder = Decoder::open_buffer(bytes, ReadOptions::default());
    assert!(matches!(
        decoder.read_indexed(0),
        Err(war3_blp::decoder::Error::Convert(
            war3_blp::convert::Error::NotIndexed
        ))
    ));
}

#[test]
fn custom_codec_vendor_is_pluggable() {
    struct CountingCodec(Rc<RefCell<usize>>);
    impl JpegCodec for CountingCodec {
        fn vendor(&self) -> &str {
            "counting"
        }
        fn decode(
            &self,
            data: &[u8],
            sink: &mut dyn war3_blp::warning::WarningSink,
        ) -> Result<JpegRaster, war3_blp::convert::Error> {
            *self.0.borrow_mut() += 1;
            DefaultJpegCodec.decode(data, sink)
        }
        fn encode(
            &self,
            raster: &JpegRaster,
            quality: f32,
            sink: &mut dyn war3_blp::warning::WarningSink,
        ) -> Result<Vec<u8>, war3_blp::convert::Error> {
            DefaultJpegCodec.encode(raster, quality, sink)
        }
    }

    let mut encoder = Encoder::new(
        BlpVersion::Blp1,
        BlpContentTag::Jpeg,
        0,
        WriteOptions::default(),
    )
    .unwrap();
    let bytes = encoder
        .encode_to_vec(&image::DynamicImage::new_rgba8(2, 2))
        .unwrap();

    let decodes = Rc::new(RefCell::new(0));
    let mut decoder = Decoder::open_buffer(
        bytes,
        ReadOptions {
            jpeg_codec: Some(std::sync::Arc::new(CountingCodec(decodes.clone()))),
            ..ReadOptions::default()
        },
    );
    decoder.read(0).unwrap();
    decoder.read(1).unwrap();
    assert_eq!(*decodes.borrow(), 2);
}
