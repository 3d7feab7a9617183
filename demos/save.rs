use image::ImageReader;
use war3_blp::encoder::{Encoder, WriteOptions};
use war3_blp::types::{BlpContentTag, BlpVersion};

fn main() {
    let input_filename = std::env::args().nth(1).unwrap_or("test.png".to_owned());
    let output_filename = std::env::args().nth(2).unwrap_or("output.blp".to_owned());

    let img_file = ImageReader::open(input_filename)
        .expect("open")
        .decode()
        .expect("decode");

    let mut encoder = Encoder::new(
        BlpVersion::Blp1,
        BlpContentTag::Indexed,
        1,
        WriteOptions::default(),
    )
    .expect("configuration");
    encoder.write_file(&output_filename, &img_file).expect("saved");
    println!("wrote {output_filename}");
}
