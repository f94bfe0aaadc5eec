pub mod jpeg;
pub mod native;
pub mod webp;

use image::{DynamicImage, ImageFormat};
use std::path::Path;

use super::WatermarkError;

/// How a watermarked image is written back to disk, chosen from the format
/// the source was decoded as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    /// Flattened to RGB, lossy at high quality
    Jpeg,
    /// Lossless
    WebP,
    /// Same encoder as the source with its pixel layout preserved
    Native(ImageFormat),
}

impl SaveFormat {
    pub fn from_source(format: ImageFormat) -> Result<Self, WatermarkError> {
        match format {
            ImageFormat::Jpeg => Ok(SaveFormat::Jpeg),
            ImageFormat::WebP => Ok(SaveFormat::WebP),
            ImageFormat::Png | ImageFormat::Tiff | ImageFormat::Bmp | ImageFormat::Gif => {
                Ok(SaveFormat::Native(format))
            }
            other => Err(WatermarkError::UnsupportedFormat(other)),
        }
    }

    pub fn save(&self, image: &DynamicImage, path: &Path) -> Result<(), WatermarkError> {
        match self {
            SaveFormat::Jpeg => jpeg::save(image, path, jpeg::JPEG_QUALITY),
            SaveFormat::WebP => webp::save_lossless(image, path),
            SaveFormat::Native(format) => native::save(image, path, *format),
        }
    }
}
