use image::{Rgba, RgbaImage};

/// Width of a glyph cell in pixels
pub const GLYPH_WIDTH: u32 = 5;
/// Height of a glyph cell in pixels
pub const GLYPH_HEIGHT: u32 = 7;
/// Blank columns between two glyphs
pub const GLYPH_SPACING: u32 = 1;

const FIRST_CHAR: char = ' ';
const LAST_CHAR: char = '~';
const FALLBACK_CHAR: char = '?';

// Printable ASCII, one byte per column, least significant bit is the top row.
const GLYPHS: [[u8; 5]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x00, 0x00, 0x5F, 0x00, 0x00], // '!'
    [0x00, 0x07, 0x00, 0x07, 0x00], // '"'
    [0x14, 0x7F, 0x14, 0x7F, 0x14], // '#'
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], // '$'
    [0x23, 0x13, 0x08, 0x64, 0x62], // '%'
    [0x36, 0x49, 0x55, 0x22, 0x50], // '&'
    [0x00, 0x05, 0x03, 0x00, 0x00], // '\''
    [0x00, 0x1C, 0x22, 0x41, 0x00], // '('
    [0x00, 0x41, 0x22, 0x1C, 0x00], // ')'
    [0x08, 0x2A, 0x1C, 0x2A, 0x08], // '*'
    [0x08, 0x08, 0x3E, 0x08, 0x08], // '+'
    [0x00, 0x50, 0x30, 0x00, 0x00], // ','
    [0x08, 0x08, 0x08, 0x08, 0x08], // '-'
    [0x00, 0x60, 0x60, 0x00, 0x00], // '.'
    [0x20, 0x10, 0x08, 0x04, 0x02], // '/'
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // '0'
    [0x00, 0x42, 0x7F, 0x40, 0x00], // '1'
    [0x42, 0x61, 0x51, 0x49, 0x46], // '2'
    [0x21, 0x41, 0x45, 0x4B, 0x31], // '3'
    [0x18, 0x14, 0x12, 0x7F, 0x10], // '4'
    [0x27, 0x45, 0x45, 0x45, 0x39], // '5'
    [0x3C, 0x4A, 0x49, 0x49, 0x30], // '6'
    [0x01, 0x71, 0x09, 0x05, 0x03], // '7'
    [0x36, 0x49, 0x49, 0x49, 0x36], // '8'
    [0x06, 0x49, 0x49, 0x29, 0x1E], // '9'
    [0x00, 0x36, 0x36, 0x00, 0x00], // ':'
    [0x00, 0x56, 0x36, 0x00, 0x00], // ';'
    [0x08, 0x14, 0x22, 0x41, 0x00], // '<'
    [0x14, 0x14, 0x14, 0x14, 0x14], // '='
    [0x00, 0x41, 0x22, 0x14, 0x08], // '>'
    [0x02, 0x01, 0x51, 0x09, 0x06], // '?'
    [0x32, 0x49, 0x79, 0x41, 0x3E], // '@'
    [0x7E, 0x11, 0x11, 0x11, 0x7E], // 'A'
    [0x7F, 0x49, 0x49, 0x49, 0x36], // 'B'
    [0x3E, 0x41, 0x41, 0x41, 0x22], // 'C'
    [0x7F, 0x41, 0x41, 0x22, 0x1C], // 'D'
    [0x7F, 0x49, 0x49, 0x49, 0x41], // 'E'
    [0x7F, 0x09, 0x09, 0x09, 0x01], // 'F'
    [0x3E, 0x41, 0x49, 0x49, 0x7A], // 'G'
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // 'H'
    [0x00, 0x41, 0x7F, 0x41, 0x00], // 'I'
    [0x20, 0x40, 0x41, 0x3F, 0x01], // 'J'
    [0x7F, 0x08, 0x14, 0x22, 0x41], // 'K'
    [0x7F, 0x40, 0x40, 0x40, 0x40], // 'L'
    [0x7F, 0x02, 0x0C, 0x02, 0x7F], // 'M'
    [0x7F, 0x04, 0x08, 0x10, 0x7F], // 'N'
    [0x3E, 0x41, 0x41, 0x41, 0x3E], // 'O'
    [0x7F, 0x09, 0x09, 0x09, 0x06], // 'P'
    [0x3E, 0x41, 0x51, 0x21, 0x5E], // 'Q'
    [0x7F, 0x09, 0x19, 0x29, 0x46], // 'R'
    [0x46, 0x49, 0x49, 0x49, 0x31], // 'S'
    [0x01, 0x01, 0x7F, 0x01, 0x01], // 'T'
    [0x3F, 0x40, 0x40, 0x40, 0x3F], // 'U'
    [0x1F, 0x20, 0x40, 0x20, 0x1F], // 'V'
    [0x3F, 0x40, 0x38, 0x40, 0x3F], // 'W'
    [0x63, 0x14, 0x08, 0x14, 0x63], // 'X'
    [0x07, 0x08, 0x70, 0x08, 0x07], // 'Y'
    [0x61, 0x51, 0x49, 0x45, 0x43], // 'Z'
    [0x00, 0x7F, 0x41, 0x41, 0x00], // '['
    [0x02, 0x04, 0x08, 0x10, 0x20], // '\\'
    [0x00, 0x41, 0x41, 0x7F, 0x00], // ']'
    [0x04, 0x02, 0x01, 0x02, 0x04], // '^'
    [0x40, 0x40, 0x40, 0x40, 0x40], // '_'
    [0x00, 0x01, 0x02, 0x04, 0x00], // '`'
    [0x20, 0x54, 0x54, 0x54, 0x78], // 'a'
    [0x7F, 0x48, 0x44, 0x44, 0x38], // 'b'
    [0x38, 0x44, 0x44, 0x44, 0x20], // 'c'
    [0x38, 0x44, 0x44, 0x48, 0x7F], // 'd'
    [0x38, 0x54, 0x54, 0x54, 0x18], // 'e'
    [0x08, 0x7E, 0x09, 0x01, 0x02], // 'f'
    [0x0C, 0x52, 0x52, 0x52, 0x3E], // 'g'
    [0x7F, 0x08, 0x04, 0x04, 0x78], // 'h'
    [0x00, 0x44, 0x7D, 0x40, 0x00], // 'i'
    [0x20, 0x40, 0x44, 0x3D, 0x00], // 'j'
    [0x7F, 0x10, 0x28, 0x44, 0x00], // 'k'
    [0x00, 0x41, 0x7F, 0x40, 0x00], // 'l'
    [0x7C, 0x04, 0x18, 0x04, 0x78], // 'm'
    [0x7C, 0x08, 0x04, 0x04, 0x78], // 'n'
    [0x38, 0x44, 0x44, 0x44, 0x38], // 'o'
    [0x7C, 0x14, 0x14, 0x14, 0x08], // 'p'
    [0x08, 0x14, 0x14, 0x18, 0x7C], // 'q'
    [0x7C, 0x08, 0x04, 0x04, 0x08], // 'r'
    [0x48, 0x54, 0x54, 0x54, 0x20], // 's'
    [0x04, 0x3F, 0x44, 0x40, 0x20], // 't'
    [0x3C, 0x40, 0x40, 0x20, 0x7C], // 'u'
    [0x1C, 0x20, 0x40, 0x20, 0x1C], // 'v'
    [0x3C, 0x40, 0x30, 0x40, 0x3C], // 'w'
    [0x44, 0x28, 0x10, 0x28, 0x44], // 'x'
    [0x0C, 0x50, 0x50, 0x50, 0x3C], // 'y'
    [0x44, 0x64, 0x54, 0x4C, 0x44], // 'z'
    [0x00, 0x08, 0x36, 0x41, 0x00], // '{'
    [0x00, 0x00, 0x7F, 0x00, 0x00], // '|'
    [0x00, 0x41, 0x36, 0x08, 0x00], // '}'
    [0x10, 0x08, 0x08, 0x10, 0x08], // '~'
];

/// Column bitmap for `c`. Characters outside printable ASCII render as '?'.
fn glyph(c: char) -> &'static [u8; 5] {
    let c = if (FIRST_CHAR..=LAST_CHAR).contains(&c) {
        c
    } else {
        FALLBACK_CHAR
    };
    &GLYPHS[(c as u32 - FIRST_CHAR as u32) as usize]
}

/// Size of the box covered by `text`. Trailing spacing after the last glyph
/// is not counted.
pub fn text_size(text: &str) -> (u32, u32) {
    let count = text.chars().count() as u32;
    if count == 0 {
        return (0, 0);
    }
    (
        count * (GLYPH_WIDTH + GLYPH_SPACING) - GLYPH_SPACING,
        GLYPH_HEIGHT,
    )
}

/// Draw `text` with its top-left corner at (`x`, `y`).
///
/// Lit pixels are replaced with `color`; pixels outside the canvas are
/// clipped.
pub fn draw_text(canvas: &mut RgbaImage, color: Rgba<u8>, x: i32, y: i32, text: &str) {
    let (width, height) = (canvas.width() as i64, canvas.height() as i64);
    let advance = (GLYPH_WIDTH + GLYPH_SPACING) as i64;

    for (index, c) in text.chars().enumerate() {
        let origin_x = x as i64 + index as i64 * advance;
        if origin_x >= width {
            break;
        }

        for (column, bits) in glyph(c).iter().enumerate() {
            let px = origin_x + column as i64;
            if px < 0 || px >= width {
                continue;
            }
            for row in 0..GLYPH_HEIGHT as i64 {
                if bits & (1 << row) == 0 {
                    continue;
                }
                let py = y as i64 + row;
                if py >= 0 && py < height {
                    canvas.put_pixel(px as u32, py as u32, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    #[test]
    fn test_text_size() {
        assert_eq!(text_size(""), (0, 0));
        assert_eq!(text_size("I"), (5, 7));
        assert_eq!(text_size("demo"), (23, 7));
    }

    #[test]
    fn test_text_size_counts_characters_not_bytes() {
        assert_eq!(text_size("é"), text_size("e"));
    }

    #[test]
    fn test_non_ascii_falls_back_to_question_mark() {
        assert_eq!(glyph('€'), glyph('?'));
        assert_eq!(glyph('\n'), glyph('?'));
    }

    #[test]
    fn test_draw_letter_i() {
        let mut canvas = RgbaImage::new(10, 10);
        draw_text(&mut canvas, WHITE, 1, 1, "I");

        // Middle column of 'I' is fully lit
        for row in 1..8 {
            assert_eq!(canvas.get_pixel(3, row), &WHITE);
        }
        // Top and bottom serifs
        assert_eq!(canvas.get_pixel(2, 1), &WHITE);
        assert_eq!(canvas.get_pixel(4, 7), &WHITE);
        // Gap next to the stem stays untouched
        assert_eq!(canvas.get_pixel(2, 4), &Rgba([0, 0, 0, 0]));
        assert_eq!(canvas.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_draw_clips_outside_canvas() {
        let mut canvas = RgbaImage::new(4, 4);
        draw_text(&mut canvas, WHITE, -3, -3, "WWWW");
        draw_text(&mut canvas, WHITE, 2, 2, "WWWW");
        assert!(canvas.pixels().any(|p| p == &WHITE));
    }
}
