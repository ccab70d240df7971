use std::{env, error::Error};

use qrpad::{coordinator::is_http_url, scanner::QrDecoder};

fn main() -> Result<(), Box<dyn Error>> {
    let path = env::args().nth(1).unwrap_or_else(|| "qr_square.png".to_string());

    let img = image::open(&path)?;
    let text = QrDecoder::decode_image(&img)?;

    println!("Decoded: {text}");
    if is_http_url(&text) {
        println!("Link: {text}");
    }
    Ok(())
}
