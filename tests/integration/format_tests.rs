//! Container-level tests for palettized BLP1 files

use std::cell::RefCell;
use std::rc::Rc;
use test_log::test;
use war3_blp::decoder::{Decoder, ReadOptions};
use war3_blp::encoder::{Encoder, WriteOptions};
use war3_blp::raster::{IndexedRaster, PackedLayout};
use war3_blp::types::{BlpContentTag, BlpVersion, PALETTE_LENGTH};
use war3_blp::warning::Warning;

/// Byte offset of the first payload in a BLP1 indexed file:
/// header + mipmap directory + palette block.
const PAYLOAD_START: usize = 28 + 128 + 1024;

fn indexed_encoder(alpha_bits: u32, palette: &[u32]) -> Encoder {
    let mut full = [0u32; PALETTE_LENGTH];
    full[..palette.len()].copy_from_slice(palette);
    Encoder::new(
        BlpVersion::Blp1,
        BlpContentTag::Indexed,
        alpha_bits,
        WriteOptions {
            palette: Some(full),
            auto_mipmap: false,
            ..WriteOptions::default()
        },
    )
    .expect("valid encoder configuration")
}

fn collecting_decoder(bytes: Vec<u8>) -> (Decoder, Rc<RefCell<Vec<Warning>>>) {
    let warnings = Rc::new(RefCell::new(Vec::new()));
    let inner = warnings.clone();
    let mut decoder = Decoder::open_buffer(bytes, ReadOptions::default());
    decoder.set_warning_sink(Box::new(move |w: Warning| inner.borrow_mut().push(w)));
    (decoder, warnings)
}

#[test]
fn indexed_2x2_payload_is_the_raw_index_band() {
    let palette = [0xFF0000u32, 0x00FF00, 0x0000FF, 0xFFFFFF];
    let mut raster = IndexedRaster::new(PackedLayout::new(2, 2, 0));
    raster.set_index(0, 0, 0).unwrap();
    raster.set_index(1, 0, 1).unwrap();
    raster.set_index(0, 1, 2).unwrap();
    raster.set_index(1, 1, 3).unwrap();

    let mut encoder = indexed_encoder(0, &palette);
    let bytes = encoder
        .encode_indexed_levels_to_vec(std::slice::from_ref(&raster))
        .unwrap();

    assert_eq!(&bytes[PAYLOAD_START..], &[0x00, 0x01, 0x02, 0x03]);

    // palette words are little-endian right after the directory
    let palette_start = 28 + 128;
    assert_eq!(
        &bytes[palette_start..palette_start + 4],
        &0xFF0000u32.to_le_bytes()
    );

    // the parsed content carries the palette verbatim
    let parsed = war3_blp::parser::parse_blp(&bytes).unwrap();
    let content = parsed.content_indexed().expect("indexed content");
    assert_eq!(content.cmap[..4], palette);
    assert_eq!(content.cmap[4..], [0u32; 252]);

    let (mut decoder, warnings) = collecting_decoder(bytes);
    let image = decoder.read(0).unwrap().to_rgb8();
    assert_eq!(image.get_pixel(0, 0).0, [255, 0, 0]);
    assert_eq!(image.get_pixel(1, 0).0, [0, 255, 0]);
    assert_eq!(image.get_pixel(0, 1).0, [0, 0, 255]);
    assert_eq!(image.get_pixel(1, 1).0, [255, 255, 255]);
    assert!(warnings.borrow().is_empty());
}

#[test]
fn one_bit_alpha_packs_lsb_first() {
    let mut raster = IndexedRaster::new(PackedLayout::new(4, 1, 1));
    for (x, alpha) in [1u8, 0, 1, 0].into_iter().enumerate() {
        raster.set_alpha(x as u32, 0, alpha).unwrap();
    }

    let mut encoder = indexed_encoder(1, &[0x000000]);
    let bytes = encoder
        .encode_indexed_levels_to_vec(std::slice::from_ref(&raster))
        .unwrap();
    assert_eq!(&bytes[PAYLOAD_START..], &[0x00, 0x00, 0x00, 0x00, 0x05]);
}

#[test]
fn four_bit_alpha_fills_the_low_nibble_first() {
    let mut raster = IndexedRaster::new(PackedLayout::new(2, 1, 4));
    raster.set_alpha(0, 0, 0xA).unwrap();
    raster.set_alpha(1, 0, 0x3).unwrap();

    let mut encoder = indexed_encoder(4, &[0x000000]);
    let bytes = encoder
        .encode_indexed_levels_to_vec(std::slice::from_ref(&raster))
        .unwrap();
    assert_eq!(&bytes[PAYLOAD_START..], &[0x00, 0x00, 0x3A]);
}

#[test]
fn pre_indexed_rasters_round_trip_pixel_for_pixel() {
    let mut raster = IndexedRaster::new(PackedLayout::new(3, 2, 4));
    for y in 0..2 {
        for x in 0..3 {
            raster.set_index(x, y, (y * 3 + x) as u8 * 7).unwrap();
            raster.set_alpha(x, y, (x + y) as u8).unwrap();
        }
    }

    let mut encoder = indexed_encoder(4, &[0x123456]);
    let bytes = encoder
        .encode_indexed_levels_to_vec(std::slice::from_ref(&raster))
        .unwrap();

    let (mut decoder, warnings) = collecting_decoder(bytes);
    let decoded = decoder.read_indexed(0).unwrap();
    assert_eq!(decoded.data(), raster.data());
    assert_eq!(decoded.layout(), raster.layout());
    assert!(warnings.borrow().is_empty());
}

#[test]
fn pre_indexed_rasters_require_a_palette() {
    let raster = IndexedRaster::new(PackedLayout::new(2, 2, 0));
    let mut encoder = Encoder::new(
        BlpVersion::Blp1,
        BlpContentTag::Indexed,
        0,
        WriteOptions {
            auto_mipmap: false,
            ..WriteOptions::default()
        },
    )
    .unwrap();
    let result = encoder.encode_indexed_levels_to_vec(std::slice::from_ref(&raster));
    assert!(
        matches!(
            result,
            Err(war3_blp::encoder::Error::Convert(
                war3_blp::convert::Error::PaletteRequired
            ))
        ),
        "got {result:?}"
    );
}

#[test]
fn alpha_is_rescaled_when_raster_and_file_depths_differ() {
    // 8 bit source raster into a 1 bit file
    let mut raster = IndexedRaster::new(PackedLayout::new(2, 1, 8));
    raster.set_alpha(0, 0, 255).unwrap();
    raster.set_alpha(1, 0, 3).unwrap();

    let mut encoder = indexed_encoder(1, &[0x000000]);
    let bytes = encoder
        .encode_indexed_levels_to_vec(std::slice::from_ref(&raster))
        .unwrap();
    // two index bytes, then one alpha byte holding 0b01
    assert_eq!(&bytes[PAYLOAD_START..], &[0x00, 0x00, 0x01]);
}

#[test]
fn short_payload_warns_and_zero_fills() {
    let palette = [0xFF0000u32];
    let mut raster = IndexedRaster::new(PackedLayout::new(2, 2, 0));
    for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
        raster.set_index(x, y, 0).unwrap();
    }
    let mut encoder = indexed_encoder(0, &palette);
    let mut bytes = encoder
        .encode_indexed_levels_to_vec(std::slice::from_ref(&raster))
        .unwrap();

    // chop the last payload byte and patch the directory size
    bytes.truncate(bytes.len() - 1);
    let size_entry = 28 + 64;
    bytes[size_entry..size_entry + 4].copy_from_slice(&3u32.to_le_bytes());

    let (mut decoder, warnings) = collecting_decoder(bytes);
    let image = decoder.read(0).unwrap().to_rgb8();
    assert_eq!(
        warnings.borrow().as_slice(),
        &[Warning::BadDataBuffer {
            actual: 3,
            expected: 4
        }]
    );
    // the missing byte decodes as index 0
    assert_eq!(image.get_pixel(1, 1).0, [255, 0, 0]);
}

#[test]
fn auto_mipmap_encoding_round_trips_byte_identical() {
    let mut input = image::RgbaImage::new(8, 4);
    for (x, y, pixel) in input.enumerate_pixels_mut() {
        *pixel = image::Rgba([(x * 32) as u8, (y * 64) as u8, 128, 255]);
    }

    let mut encoder = Encoder::new(
        BlpVersion::Blp1,
        BlpContentTag::Indexed,
        0,
        WriteOptions::default(),
    )
    .unwrap();
    let bytes = encoder
        .encode_to_vec(&image::DynamicImage::ImageRgba8(input))
        .unwrap();

    let parsed = war3_blp::parser::parse_blp(&bytes).unwrap();
    assert_eq!(parsed.header.mipmap_count(), 4);
    assert_eq!(parsed.image_count(), 4);
    let reencoded = war3_blp::encode::encode_blp(&parsed).unwrap();
    assert_eq!(reencoded, bytes);
}

#[test]
fn decoder_reports_header_and_dimensions() {
    let mut encoder = Encoder::new(
        BlpVersion::Blp1,
        BlpContentTag::Indexed,
        8,
        WriteOptions::default(),
    )
    .unwrap();
    let bytes = encoder
        .encode_to_vec(&image::DynamicImage::new_rgba8(16, 4))
        .unwrap();

    let mut decoder = Decoder::open_buffer(bytes, ReadOptions::default());
    assert_eq!(decoder.mipmap_count().unwrap(), 5);
    assert_eq!(decoder.dimensions(0).unwrap(), (16, 4));
    assert_eq!(decoder.dimensions(2).unwrap(), (4, 1));
    assert_eq!(decoder.dimensions(4).unwrap(), (1, 1));
    assert!(matches!(
        decoder.dimensions(5),
        Err(war3_blp::decoder::Error::InvalidMipmapIndex { index: 5, count: 5 })
    ));

    let header = decoder.header().unwrap();
    assert_eq!(header.version, BlpVersion::Blp1);
    assert_eq!(header.alpha_bits, 8);
    assert_eq!(header.extra, 0);
    assert_eq!(decoder.image().unwrap().alpha_bit_depth(), 8);
}

#[test]
fn flushed_levels_can_no_longer_be_read() {
    let mut encoder = Encoder::new(
        BlpVersion::Blp1,
        BlpContentTag::Indexed,
        0,
        WriteOptions::default(),
    )
    .unwrap();
    let bytes = encoder
        .encode_to_vec(&image::DynamicImage::new_rgba8(4, 4))
        .unwrap();

    let mut decoder = Decoder::open_buffer(bytes, ReadOptions::default());
    decoder.flush_to(2).unwrap();
    assert!(matches!(
        decoder.read(0),
        Err(war3_blp::decoder::Error::MipmapFlushed(0))
    ));
    assert!(matches!(
        decoder.read(1),
        Err(war3_blp::decoder::Error::MipmapFlushed(1))
    ));
    // levels at and above the watermark stay readable
    assert!(decoder.read(2).is_ok());
}

#[test]
fn wrong_pyramid_shapes_are_rejected() {
    let mut encoder = Encoder::new(
        BlpVersion::Blp1,
        BlpContentTag::Indexed,
        0,
        WriteOptions::default(),
    )
    .unwrap();

    // 4x4 needs 3 levels, 2 supplied
    let levels = vec![
        image::DynamicImage::new_rgba8(4, 4),
        image::DynamicImage::new_rgba8(2, 2),
    ];
    assert!(matches!(
        encoder.encode_levels_to_vec(&levels),
        Err(war3_blp::encoder::Error::WrongLevelCount {
            expected: 3,
            actual: 2
        })
    ));

    // full count but a level with wrong dimensions
    let levels = vec![
        image::DynamicImage::new_rgba8(4, 4),
        image::DynamicImage::new_rgba8(3, 2),
        image::DynamicImage::new_rgba8(1, 1),
    ];
    assert!(matches!(
        encoder.encode_levels_to_vec(&levels),
        Err(war3_blp::encoder::Error::Convert(
            war3_blp::convert::Error::MismatchSizes { level: 1, .. }
        ))
    ));
}

#[test]
fn dimension_optimization_shapes_the_header() {
    let input = image::DynamicImage::new_rgba8(1024, 256);

    let mut ratio = Encoder::new(
        BlpVersion::Blp1,
        BlpContentTag::Indexed,
        0,
        WriteOptions {
            dimension_opt: war3_blp::convert::DimensionOpt::Ratio,
            ..WriteOptions::default()
        },
    )
    .unwrap();
    let blp = ratio.build(&input).unwrap();
    assert_eq!((blp.header.width, blp.header.height), (512, 128));

    let mut clamp = Encoder::new(
        BlpVersion::Blp1,
        BlpContentTag::Indexed,
        0,
        WriteOptions {
            dimension_opt: war3_blp::convert::DimensionOpt::Clamp,
            ..WriteOptions::default()
        },
    )
    .unwrap();
    let blp = clamp.build(&input).unwrap();
    assert_eq!((blp.header.width, blp.header.height), (512, 256));
}

#[test]
fn universal_palette_fallback_quantizes_extremes() {
    let mut input = image::RgbaImage::new(2, 1);
    input.put_pixel(0, 0, image::Rgba([0, 0, 0, 255]));
    input.put_pixel(1, 0, image::Rgba([255, 255, 255, 255]));

    let mut encoder = Encoder::new(
        BlpVersion::Blp1,
        BlpContentTag::Indexed,
        0,
        WriteOptions {
            auto_mipmap: false,
            ..WriteOptions::default()
        },
    )
    .unwrap();
    let bytes = encoder
        .encode_to_vec(&image::DynamicImage::ImageRgba8(input))
        .unwrap();

    let (mut decoder, _) = collecting_decoder(bytes);
    let image = decoder.read(0).unwrap().to_rgb8();
    assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0]);
    assert_eq!(image.get_pixel(1, 0).0, [255, 255, 255]);
}
