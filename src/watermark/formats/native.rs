use image::{ColorType, DynamicImage, ImageFormat};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::watermark::WatermarkError;

/// Save image in `format`, narrowing the pixel layout only where the encoder
/// cannot write it as-is
pub fn save(image: &DynamicImage, path: &Path, format: ImageFormat) -> Result<(), WatermarkError> {
    let encodable = encodable_layout(image, format);
    let mut output = BufWriter::new(std::fs::File::create(path)?);
    encodable.write_to(&mut output, format)?;
    output.flush()?;

    debug!(
        "{:?} written to {:?} as {:?}",
        format,
        path,
        encodable.color()
    );
    Ok(())
}

fn encodable_layout(image: &DynamicImage, format: ImageFormat) -> DynamicImage {
    let color = image.color();
    match format {
        // The GIF encoder quantizes from RGBA8
        ImageFormat::Gif if color != ColorType::Rgba8 => DynamicImage::ImageRgba8(image.to_rgba8()),
        ImageFormat::Bmp => match color {
            ColorType::L16 => DynamicImage::ImageLuma8(image.to_luma8()),
            ColorType::La16 => DynamicImage::ImageLumaA8(image.to_luma_alpha8()),
            ColorType::Rgb16 | ColorType::Rgb32F => DynamicImage::ImageRgb8(image.to_rgb8()),
            ColorType::Rgba16 | ColorType::Rgba32F => DynamicImage::ImageRgba8(image.to_rgba8()),
            _ => image.clone(),
        },
        ImageFormat::Tiff => match color {
            ColorType::La8 => DynamicImage::ImageRgba8(image.to_rgba8()),
            ColorType::La16 => DynamicImage::ImageRgba16(image.to_rgba16()),
            _ => image.clone(),
        },
        ImageFormat::Png => match color {
            ColorType::Rgb32F => DynamicImage::ImageRgb16(image.to_rgb16()),
            ColorType::Rgba32F => DynamicImage::ImageRgba16(image.to_rgba16()),
            _ => image.clone(),
        },
        _ => image.clone(),
    }
}
