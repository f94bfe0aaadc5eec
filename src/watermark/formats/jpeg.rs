use image::{DynamicImage, codecs::jpeg::JpegEncoder};
use std::io::BufWriter;
use std::path::Path;
use tracing::debug;

use crate::watermark::WatermarkError;

pub const JPEG_QUALITY: u8 = 95;

/// Save image as JPEG. JPEG has no alpha channel, so the image is flattened
/// to RGB first.
pub fn save(image: &DynamicImage, path: &Path, quality: u8) -> Result<(), WatermarkError> {
    let rgb_image = DynamicImage::ImageRgb8(image.to_rgb8());
    let output = BufWriter::new(std::fs::File::create(path)?);

    // JpegEncoder exposes no Huffman optimisation switch, only quality
    let encoder = JpegEncoder::new_with_quality(output, quality);
    rgb_image.write_with_encoder(encoder)?;

    debug!("JPEG written to {:?} at quality {}", path, quality);
    Ok(())
}
