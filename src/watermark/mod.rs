// Watermark rendering - overlay creation, compositing, and format-specific saving
pub mod bitmap_font;
pub mod composite;
mod error;
pub mod formats;
mod typeface;

pub use error::WatermarkError;
pub use formats::SaveFormat;
pub use typeface::{DEFAULT_FONT_SIZE, Typeface};

use image::{DynamicImage, ImageReader, Rgba, RgbaImage};
use std::path::Path;
use tracing::debug;

/// White at roughly 30% opacity
pub const WATERMARK_FILL: Rgba<u8> = Rgba([255, 255, 255, 77]);

/// Top-left corner that centers a `text_size` box on an `image_size` canvas.
/// Negative when the text is larger than the image.
pub fn centered_origin(image_size: (u32, u32), text_size: (u32, u32)) -> (i32, i32) {
    let x = (image_size.0 as i64 - text_size.0 as i64) / 2;
    let y = (image_size.1 as i64 - text_size.1 as i64) / 2;
    (x as i32, y as i32)
}

/// Transparent layer the size of the image with `text` drawn in its center
pub fn render_overlay(width: u32, height: u32, text: &str, typeface: &Typeface) -> RgbaImage {
    let mut overlay = RgbaImage::new(width, height);
    let (x, y) = centered_origin((width, height), typeface.measure(text));
    typeface.draw(&mut overlay, WATERMARK_FILL, x, y, text);
    overlay
}

/// Watermark an already decoded image. The result keeps the source's
/// dimensions and pixel layout.
pub fn watermark_image(image: &DynamicImage, text: &str, typeface: &Typeface) -> DynamicImage {
    let overlay = render_overlay(image.width(), image.height(), text, typeface);
    let merged = composite::composite(image, &overlay);
    composite::restore_color(merged, image.color())
}

/// Read `source_path`, stamp `text` on it and write the result to
/// `output_path` in the source's format.
pub fn apply_watermark(
    source_path: &Path,
    output_path: &Path,
    text: &str,
    typeface: &Typeface,
) -> Result<(), WatermarkError> {
    // The reader owns the file handle; it is released once decoding returns
    let (image, source_format) = {
        let reader = ImageReader::open(source_path)?.with_guessed_format()?;
        let format = reader.format().ok_or(WatermarkError::UnknownFormat)?;
        (reader.decode()?, format)
    };
    let save_format = SaveFormat::from_source(source_format)?;

    debug!(
        "Decoded {:?}: {}x{} {:?} ({:?})",
        source_path,
        image.width(),
        image.height(),
        image.color(),
        source_format
    );

    let watermarked = watermark_image(&image, text, typeface);
    save_format.save(&watermarked, output_path)
}
