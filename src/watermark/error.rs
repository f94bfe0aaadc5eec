use image::ImageFormat;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatermarkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Could not determine the image format")]
    UnknownFormat,

    #[error("Unsupported image format: {0:?}")]
    UnsupportedFormat(ImageFormat),

    #[error("WebP encoding failed: {0}")]
    WebPEncoding(String),

    #[error("Failed to parse font {0:?}")]
    InvalidFont(PathBuf),

    #[error("Invalid font size: {0}")]
    InvalidFontSize(f32),
}
