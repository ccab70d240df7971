use async_trait::async_trait;
use image::DynamicImage;
use tracing::debug;

use super::{FileDecoder, ImageBlob, QrBox};
use crate::error::{Error, Result};

/// Decoder backed by `rqrr`. The first grid that decodes wins.
#[derive(Debug, Default, Clone, Copy)]
pub struct QrDecoder;

impl QrDecoder {
    pub fn decode_image(img: &DynamicImage) -> Result<String> {
        let gray = img.to_luma8();
        let (w, h) = gray.dimensions();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(w as usize, h as usize, |x, y| {
            gray.get_pixel(x as u32, y as u32).0[0]
        });

        let grids = prepared.detect_grids();
        if grids.is_empty() {
            return Err(Error::NoCode);
        }

        let mut last_err = String::new();
        for grid in grids.iter() {
            match grid.decode() {
                Ok((_, text)) => return Ok(text),
                Err(e) => last_err = e.to_string(),
            }
        }
        Err(Error::Decode(last_err))
    }

    pub fn decode_bytes(bytes: &[u8]) -> Result<String> {
        let img = image::load_from_memory(bytes)?;
        Self::decode_image(&img)
    }

    pub fn decode_region(img: &DynamicImage, qrbox: Option<QrBox>) -> Result<String> {
        match qrbox {
            Some(b) => Self::decode_image(&crop_centre(img, b)),
            None => Self::decode_image(img),
        }
    }
}

pub(crate) fn crop_centre(img: &DynamicImage, qrbox: QrBox) -> DynamicImage {
    let w = qrbox.width.min(img.width());
    let h = qrbox.height.min(img.height());
    img.crop_imm((img.width() - w) / 2, (img.height() - h) / 2, w, h)
}

#[async_trait]
impl FileDecoder for QrDecoder {
    async fn decode_file(&self, blob: &ImageBlob) -> Result<String> {
        debug!(name = ?blob.name, bytes = blob.bytes.len(), "Decoding image");
        let bytes = blob.bytes.clone();
        tokio::task::spawn_blocking(move || Self::decode_bytes(&bytes)).await?
    }
}

#[cfg(test)]
mod decode_tests {
    use image::{DynamicImage, Rgb, RgbImage};

    use super::{crop_centre, QrDecoder};
    use crate::{
        error::Error,
        scanner::{FileDecoder, ImageBlob, QrBox},
    };

    #[test]
    fn test_crop_centre() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(400, 300));
        let cropped = crop_centre(&img, QrBox { width: 250, height: 250 });
        assert_eq!((cropped.width(), cropped.height()), (250, 250));

        let cropped = crop_centre(&img, QrBox { width: 500, height: 100 });
        assert_eq!((cropped.width(), cropped.height()), (400, 100));
    }

    #[test]
    fn test_blank_image() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(120, 120, Rgb([255, 255, 255])));
        assert!(matches!(QrDecoder::decode_image(&img), Err(Error::NoCode)));
    }

    #[tokio::test]
    async fn test_file_not_an_image() {
        let blob = ImageBlob::new(b"plain text".to_vec());
        assert!(matches!(QrDecoder.decode_file(&blob).await, Err(Error::Image(_))));
    }
}
