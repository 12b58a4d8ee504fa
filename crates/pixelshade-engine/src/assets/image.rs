use std::path::Path;

use anyhow::{Context, Result};

/// Tightly packed RGBA8 pixels, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl DecodedImage {
    pub fn from_rgba8(image: ::image::RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            pixels: image.into_raw(),
            width,
            height,
        }
    }
}

/// Decodes an image file into RGBA8.
pub fn decode_image(path: &Path) -> Result<DecodedImage> {
    let image = ::image::open(path)
        .with_context(|| format!("failed to decode image {}", path.display()))?;
    let decoded = DecodedImage::from_rgba8(image.to_rgba8());
    log::debug!(
        "decoded {} ({}x{})",
        path.display(),
        decoded.width,
        decoded.height
    );
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_rgba_buffer() {
        let img = ::image::RgbaImage::from_pixel(2, 3, ::image::Rgba([1, 2, 3, 4]));
        let decoded = DecodedImage::from_rgba8(img);
        assert_eq!((decoded.width, decoded.height), (2, 3));
        assert_eq!(decoded.pixels.len(), 2 * 3 * 4);
        assert_eq!(&decoded.pixels[..4], &[1, 2, 3, 4]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = decode_image(Path::new("does/not/exist.png")).unwrap_err();
        assert!(format!("{err:#}").contains("exist.png"));
    }
}
