use image::DynamicImage;
use std::path::Path;
use tracing::debug;

use crate::watermark::WatermarkError;

/// Save image as lossless WebP, keeping the alpha channel when there is one
pub fn save_lossless(image: &DynamicImage, path: &Path) -> Result<(), WatermarkError> {
    let (width, height) = (image.width(), image.height());

    let encoded = if image.color().has_alpha() {
        let rgba_data = image.to_rgba8().into_raw();
        webp::Encoder::from_rgba(&rgba_data, width, height).encode_simple(true, 100.0)
    } else {
        let rgb_data = image.to_rgb8().into_raw();
        webp::Encoder::from_rgb(&rgb_data, width, height).encode_simple(true, 100.0)
    }
    .map_err(|e| WatermarkError::WebPEncoding(format!("{:?}", e)))?;

    std::fs::write(path, &*encoded)?;
    debug!("Lossless WebP written to {:?}: {} bytes", path, encoded.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage, Rgba, RgbaImage};
    use tempfile::TempDir;

    #[test]
    fn test_save_lossless_is_exact() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.webp");
        let mut img = RgbImage::from_pixel(12, 12, Rgb([0, 0, 0]));
        img.put_pixel(5, 5, Rgb([77, 77, 77]));

        save_lossless(&DynamicImage::ImageRgb8(img), &path).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.dimensions(), (12, 12));
        assert_eq!(decoded.get_pixel(5, 5), Rgba([77, 77, 77, 255]));
        assert_eq!(decoded.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_save_lossless_keeps_alpha() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("alpha.webp");
        let img = RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 40]));

        save_lossless(&DynamicImage::ImageRgba8(img), &path).unwrap();

        let decoded = image::open(&path).unwrap();
        assert!(decoded.color().has_alpha());
        assert_eq!(decoded.get_pixel(3, 3), Rgba([255, 0, 0, 40]));
    }
}
