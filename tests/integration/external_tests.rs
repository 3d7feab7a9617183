//! Tests for the BLP0 external variant: sidecar mipmap files next to
//! the main one

use test_log::test;
use war3_blp::decoder::{Decoder, ReadOptions};
use war3_blp::encoder::{Encoder, WriteOptions};
use war3_blp::types::{BlpContentTag, BlpVersion};

fn checkerboard(size: u32) -> image::DynamicImage {
    let mut img = image::RgbaImage::new(size, size);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let v = if (x + y) % 2 == 0 { 255 } else { 0 };
        *pixel = image::Rgba([v, v, v, 255]);
    }
    image::DynamicImage::ImageRgba8(img)
}

fn write_blp0(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("texture.blp");
    let mut encoder = Encoder::new(
        BlpVersion::Blp0,
        BlpContentTag::Indexed,
        0,
        WriteOptions::default(),
    )
    .unwrap();
    encoder.write_file(&path, &checkerboard(4)).unwrap();
    path
}

#[test]
fn blp0_write_produces_one_sidecar_per_level() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_blp0(dir.path());

    // main file holds only the header and the palette block
    let main = std::fs::read(&path).unwrap();
    assert_eq!(main.len(), 28 + 1024);
    assert_eq!(&main[0..4], b"BLP0");

    // 4x4 with mipmaps: 16, 4 and 1 byte of indices
    let sizes: Vec<u64> = (0..3)
        .map(|i| {
            let sidecar = dir.path().join(format!("texture.b{i:02}"));
            std::fs::metadata(sidecar).unwrap().len()
        })
        .collect();
    assert_eq!(sizes, vec![16, 4, 1]);
    assert!(!dir.path().join("texture.b03").exists());
}

#[test]
fn blp0_read_returns_the_full_pyramid() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_blp0(dir.path());

    let mut decoder = Decoder::open_path(&path, ReadOptions::default());
    assert_eq!(decoder.mipmap_count().unwrap(), 3);
    for (level, size) in [(0usize, 4u32), (1, 2), (2, 1)] {
        let image = decoder.read(level).unwrap();
        assert_eq!((image.width(), image.height()), (size, size));
    }
}

#[test]
fn blp0_round_trips_through_the_functional_api() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_blp0(dir.path());

    let loaded = war3_blp::parser::load_blp(&path).unwrap();
    assert_eq!(loaded.header.version, BlpVersion::Blp0);
    assert_eq!(loaded.image_count(), 3);

    let copy = dir.path().join("copy.blp");
    war3_blp::encode::save_blp(&loaded, &copy).unwrap();
    assert_eq!(
        std::fs::read(&path).unwrap(),
        std::fs::read(&copy).unwrap()
    );
    for i in 0..3 {
        assert_eq!(
            std::fs::read(dir.path().join(format!("texture.b{i:02}"))).unwrap(),
            std::fs::read(dir.path().join(format!("copy.b{i:02}"))).unwrap(),
            "sidecar {i} differs"
        );
    }
}

#[test]
fn missing_high_level_sidecar_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_blp0(dir.path());
    std::fs::remove_file(dir.path().join("texture.b02")).unwrap();

    let mut decoder = Decoder::open_path(&path, ReadOptions::default());
    assert!(decoder.read(0).is_ok());
    assert!(decoder.read(1).is_ok());
    assert!(matches!(
        decoder.read(2),
        Err(war3_blp::decoder::Error::MissingMipmap(2))
    ));
}

#[test]
fn missing_root_sidecar_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_blp0(dir.path());
    std::fs::remove_file(dir.path().join("texture.b00")).unwrap();

    let mut decoder = Decoder::open_path(&path, ReadOptions::default());
    assert!(decoder.read(0).is_err());
}

#[test]
fn blp0_cannot_be_encoded_into_a_buffer() {
    let mut encoder = Encoder::new(
        BlpVersion::Blp0,
        BlpContentTag::Indexed,
        0,
        WriteOptions::default(),
    )
    .unwrap();
    assert!(matches!(
        encoder.encode_to_vec(&checkerboard(4)),
        Err(war3_blp::encoder::Error::Encode(
            war3_blp::encode::Error::ExternalNeedsPath(BlpVersion::Blp0)
        ))
    ));
}
