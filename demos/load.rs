use war3_blp::decoder::{Decoder, ReadOptions};

fn main() {
    let input_filename = std::env::args().nth(1).unwrap_or("texture.blp".to_owned());
    let output_filename = std::env::args().nth(2).unwrap_or("output.png".to_owned());

    let mut decoder = Decoder::open_path(&input_filename, ReadOptions::default());
    let count = decoder.mipmap_count().expect("header");
    println!("{input_filename}: {count} mipmap levels");

    let image = decoder.read(0).expect("decode");
    image.save(&output_filename).expect("save");
    println!("wrote {}x{} image to {output_filename}", image.width(), image.height());
}
