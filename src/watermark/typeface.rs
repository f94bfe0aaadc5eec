use ab_glyph::{FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::path::Path;
use tracing::debug;

use super::{WatermarkError, bitmap_font};

/// Default pixel height for TrueType fonts
pub const DEFAULT_FONT_SIZE: f32 = 24.0;

/// The font used to render watermark text
#[derive(Default)]
pub enum Typeface {
    /// Built-in 5x7 bitmap font, needs no font file
    #[default]
    Builtin,
    /// A TrueType/OpenType font loaded from disk
    TrueType { font: FontVec, scale: PxScale },
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Typeface::Builtin => write!(f, "Builtin"),
            Typeface::TrueType { scale, .. } => write!(f, "TrueType({}px)", scale.y),
        }
    }
}

impl Typeface {
    /// Load a font file at the given pixel size
    pub fn from_file(font_path: &Path, font_size: f32) -> Result<Self, WatermarkError> {
        if !font_size.is_finite() || font_size <= 0.0 {
            return Err(WatermarkError::InvalidFontSize(font_size));
        }

        let font_data = std::fs::read(font_path)?;
        let font = FontVec::try_from_vec(font_data)
            .map_err(|_| WatermarkError::InvalidFont(font_path.to_path_buf()))?;

        debug!("Loaded font {:?} at {}px", font_path, font_size);
        Ok(Typeface::TrueType {
            font,
            scale: PxScale::from(font_size),
        })
    }

    /// Width and height of the rendered text in pixels
    pub fn measure(&self, text: &str) -> (u32, u32) {
        match self {
            Typeface::Builtin => bitmap_font::text_size(text),
            Typeface::TrueType { font, scale } => text_size(*scale, font, text),
        }
    }

    pub fn draw(&self, canvas: &mut RgbaImage, color: Rgba<u8>, x: i32, y: i32, text: &str) {
        match self {
            Typeface::Builtin => bitmap_font::draw_text(canvas, color, x, y, text),
            Typeface::TrueType { font, scale } => {
                draw_text_mut(canvas, color, x, y, *scale, font, text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_measure() {
        let typeface = Typeface::default();
        assert_eq!(typeface.measure("demo"), (23, 7));
    }

    #[test]
    fn test_from_file_missing() {
        let temp_dir = TempDir::new().unwrap();
        let result = Typeface::from_file(&temp_dir.path().join("nope.ttf"), 20.0);
        assert!(matches!(result, Err(WatermarkError::Io(_))));
    }

    #[test]
    fn test_from_file_not_a_font() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bogus.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();

        let result = Typeface::from_file(&path, 20.0);
        assert!(matches!(result, Err(WatermarkError::InvalidFont(_))));
    }

    #[test]
    fn test_from_file_rejects_bad_size() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("font.ttf");
        assert!(matches!(
            Typeface::from_file(&path, 0.0),
            Err(WatermarkError::InvalidFontSize(_))
        ));
        assert!(matches!(
            Typeface::from_file(&path, f32::NAN),
            Err(WatermarkError::InvalidFontSize(_))
        ));
    }

    #[test]
    fn test_add_text_with_system_font() {
        // Skip test if font file doesn't exist
        let font_path = Path::new("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf");
        if !font_path.exists() {
            return;
        }

        let typeface = Typeface::from_file(font_path, 16.0).unwrap();
        let (width, height) = typeface.measure("Test");
        assert!(width > 0);
        assert!(height > 0);

        let mut canvas = RgbaImage::new(100, 40);
        typeface.draw(&mut canvas, Rgba([255, 255, 255, 77]), 10, 10, "Test");
        assert!(canvas.pixels().any(|p| p[3] > 0));
    }
}
