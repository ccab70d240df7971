use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use image::DynamicImage;

use crate::error::{Error, Result};

/// Image embedded in the centre of a generated code.
#[derive(Clone, PartialEq, Eq)]
pub struct Logo {
    mime: String,
    bytes: Vec<u8>,
}

impl fmt::Debug for Logo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logo").field("mime", &self.mime).field("len", &self.bytes.len()).finish()
    }
}

impl Logo {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { mime: mime.into(), bytes }
    }

    /// Sniffs the mime type from the image header.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let format = image::guess_format(&bytes)?;
        Ok(Self::new(format.to_mime_type(), bytes))
    }

    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let rest = uri.strip_prefix("data:").ok_or(Error::InvalidDataUri)?;
        let (header, payload) = rest.split_once(',').ok_or(Error::InvalidDataUri)?;
        let mime = header.strip_suffix(";base64").ok_or(Error::InvalidDataUri)?;
        if !is_image_mime(mime) {
            return Err(Error::InvalidDataUri);
        }
        let bytes = STANDARD.decode(payload.trim())?;
        Ok(Self::new(mime, bytes))
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn decode(&self) -> Result<DynamicImage> {
        Ok(image::load_from_memory(&self.bytes)?)
    }
}

// `image/<subtype>` with a token-safe subtype, e.g. `image/svg+xml`
fn is_image_mime(mime: &str) -> bool {
    mime.strip_prefix("image/").is_some_and(|sub| {
        !sub.is_empty() && sub.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

#[cfg(test)]
mod logo_tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgb, RgbImage};
    use test_case::test_case;

    use super::Logo;
    use crate::error::Error;

    fn png_bytes() -> Vec<u8> {
        let img = RgbImage::from_pixel(4, 4, Rgb([200, 10, 10]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        bytes
    }

    #[test]
    fn test_data_uri() {
        let logo = Logo::from_bytes(png_bytes()).unwrap();
        assert_eq!(logo.mime(), "image/png");

        let uri = logo.to_data_uri();
        assert!(uri.starts_with("data:image/png;base64,"));
        assert_eq!(Logo::from_data_uri(&uri).unwrap(), logo);
        assert_eq!(logo.decode().unwrap().width(), 4);
    }

    #[test]
    fn test_invalid_data_uri() {
        assert!(Logo::from_data_uri("image/png;base64,AAAA").is_err());
        assert!(Logo::from_data_uri("data:image/png,AAAA").is_err());
        assert!(Logo::from_data_uri("data:image/png;base64").is_err());
        assert!(Logo::from_data_uri("data:image/png;base64,@@@").is_err());
    }

    #[test_case("data:;base64,AQID"; "empty mime")]
    #[test_case("data:text/html;base64,AQID"; "not an image")]
    #[test_case("data:image/;base64,AQID"; "empty subtype")]
    #[test_case(r#"data:image/png" onload="alert(1);base64,AQID"#; "quoted attribute")]
    #[test_case("data:image/png><script>;base64,AQID"; "markup")]
    fn test_rejects_unsafe_mime(uri: &str) {
        assert!(matches!(Logo::from_data_uri(uri), Err(Error::InvalidDataUri)));
    }

    #[test]
    fn test_accepts_svg_mime() {
        let logo = Logo::from_data_uri("data:image/svg+xml;base64,AQID").unwrap();
        assert_eq!(logo.mime(), "image/svg+xml");
        assert_eq!(logo.bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_unknown_bytes() {
        assert!(Logo::from_bytes(b"definitely not an image".to_vec()).is_err());
    }
}
