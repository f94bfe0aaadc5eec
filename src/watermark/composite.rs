use image::{
    ColorType, DynamicImage, GenericImage, GenericImageView, ImageBuffer, Rgb, RgbImage,
    RgbaImage, imageops,
};

/// RGB with 16 bits per channel
pub type Rgb16Image = ImageBuffer<Rgb<u16>, Vec<u16>>;

/// Merge the overlay onto the source image.
///
/// Sources with an alpha channel (including palette images with a
/// transparent entry, which decode to RGBA) are alpha-composited. Opaque
/// sources get the overlay pasted through its own alpha mask. Sources with
/// more than 8 bits per channel are composited at 16 bits so pixels outside
/// the text keep their exact values.
pub fn composite(source: &DynamicImage, overlay: &RgbaImage) -> DynamicImage {
    let has_alpha = source.color().has_alpha();
    if is_high_depth(source.color()) {
        if has_alpha {
            let mut base = source.to_rgba16();
            let overlay = DynamicImage::ImageRgba8(overlay.clone()).to_rgba16();
            alpha_composite(&mut base, &overlay);
            DynamicImage::ImageRgba16(base)
        } else {
            let mut base = source.to_rgb16();
            paste_with_mask_16(&mut base, overlay);
            DynamicImage::ImageRgb16(base)
        }
    } else if has_alpha {
        let mut base = source.to_rgba8();
        alpha_composite(&mut base, overlay);
        DynamicImage::ImageRgba8(base)
    } else {
        let mut base = source.to_rgb8();
        paste_with_mask(&mut base, overlay);
        DynamicImage::ImageRgb8(base)
    }
}

// 32-bit float sources are composited at 16 bits
fn is_high_depth(color: ColorType) -> bool {
    color.bytes_per_pixel() / color.channel_count() > 1
}

/// Blend `overlay` over `base`, taking the alpha of both into account
pub fn alpha_composite<I, J>(base: &mut I, overlay: &J)
where
    I: GenericImage,
    J: GenericImageView<Pixel = I::Pixel>,
{
    imageops::overlay(base, overlay, 0, 0);
}

/// Paste the color of `overlay` onto `base`, weighted by the overlay alpha.
/// Fully transparent overlay pixels leave `base` untouched.
pub fn paste_with_mask(base: &mut RgbImage, overlay: &RgbaImage) {
    for (base_pixel, overlay_pixel) in base.pixels_mut().zip(overlay.pixels()) {
        let alpha = overlay_pixel[3] as u32;
        if alpha == 0 {
            continue;
        }
        for channel in 0..3 {
            let under = base_pixel[channel] as u32;
            let over = overlay_pixel[channel] as u32;
            base_pixel[channel] = ((under * (255 - alpha) + over * alpha + 127) / 255) as u8;
        }
    }
}

/// [`paste_with_mask`] for 16-bit bases; the 8-bit overlay color is widened
pub fn paste_with_mask_16(base: &mut Rgb16Image, overlay: &RgbaImage) {
    for (base_pixel, overlay_pixel) in base.pixels_mut().zip(overlay.pixels()) {
        let alpha = overlay_pixel[3] as u32;
        if alpha == 0 {
            continue;
        }
        for channel in 0..3 {
            let under = base_pixel[channel] as u32;
            let over = overlay_pixel[channel] as u32 * 257;
            base_pixel[channel] = ((under * (255 - alpha) + over * alpha + 127) / 255) as u16;
        }
    }
}

/// Convert the composited image back to the source's pixel layout
pub fn restore_color(image: DynamicImage, color: ColorType) -> DynamicImage {
    match color {
        ColorType::L8 => DynamicImage::ImageLuma8(image.to_luma8()),
        ColorType::La8 => DynamicImage::ImageLumaA8(image.to_luma_alpha8()),
        ColorType::Rgb8 => DynamicImage::ImageRgb8(image.to_rgb8()),
        ColorType::Rgba8 => DynamicImage::ImageRgba8(image.to_rgba8()),
        ColorType::L16 => DynamicImage::ImageLuma16(image.to_luma16()),
        ColorType::La16 => DynamicImage::ImageLumaA16(image.to_luma_alpha16()),
        ColorType::Rgb16 => DynamicImage::ImageRgb16(image.to_rgb16()),
        ColorType::Rgba16 => DynamicImage::ImageRgba16(image.to_rgba16()),
        ColorType::Rgb32F => DynamicImage::ImageRgb32F(image.to_rgb32f()),
        ColorType::Rgba32F => DynamicImage::ImageRgba32F(image.to_rgba32f()),
        _ => image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgba};

    fn overlay_with_mark(width: u32, height: u32, x: u32, y: u32) -> RgbaImage {
        let mut overlay = RgbaImage::new(width, height);
        overlay.put_pixel(x, y, Rgba([255, 255, 255, 77]));
        overlay
    }

    #[test]
    fn test_paste_with_mask_blends_marked_pixels_only() {
        let mut base = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
        let overlay = overlay_with_mark(4, 4, 1, 2);

        paste_with_mask(&mut base, &overlay);

        assert_eq!(base.get_pixel(1, 2), &Rgb([77, 77, 77]));
        assert_eq!(base.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(base.get_pixel(2, 1), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_paste_with_mask_over_white_stays_white() {
        let mut base = RgbImage::from_pixel(2, 2, Rgb([255, 255, 255]));
        let overlay = overlay_with_mark(2, 2, 0, 0);

        paste_with_mask(&mut base, &overlay);

        assert_eq!(base.get_pixel(0, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_alpha_composite_on_transparent_background() {
        let mut base = RgbaImage::new(4, 4);
        let overlay = overlay_with_mark(4, 4, 3, 3);

        alpha_composite(&mut base, &overlay);

        let marked = base.get_pixel(3, 3);
        assert!((76..=78).contains(&marked[3]), "alpha was {}", marked[3]);
        assert!(marked[0] >= 250);
        assert_eq!(base.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_composite_picks_path_by_alpha() {
        let overlay = overlay_with_mark(3, 3, 1, 1);

        let opaque = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 3, Rgb([0, 0, 0])));
        let result = composite(&opaque, &overlay);
        assert_eq!(result.color(), ColorType::Rgb8);
        assert_eq!(result.get_pixel(1, 1), Rgba([77, 77, 77, 255]));

        let transparent = DynamicImage::ImageRgba8(RgbaImage::new(3, 3));
        let result = composite(&transparent, &overlay);
        assert_eq!(result.color(), ColorType::Rgba8);
        assert!(result.get_pixel(1, 1)[3] > 0);
        assert_eq!(result.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_paste_with_mask_16_keeps_untouched_pixels_exact() {
        let mut base = Rgb16Image::from_pixel(4, 4, Rgb([0x1234, 0x1234, 0x1234]));
        let overlay = overlay_with_mark(4, 4, 2, 2);

        paste_with_mask_16(&mut base, &overlay);

        assert_eq!(base.get_pixel(0, 0), &Rgb([0x1234, 0x1234, 0x1234]));
        let marked = base.get_pixel(2, 2)[0];
        assert!(marked > 0x1234 && marked < 0xFFFF);
    }

    #[test]
    fn test_composite_16_bit_sources_stay_16_bit() {
        let overlay = overlay_with_mark(3, 3, 1, 1);

        let gray: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_pixel(3, 3, Luma([4660]));
        let result = composite(&DynamicImage::ImageLuma16(gray), &overlay);
        assert_eq!(result.color(), ColorType::Rgb16);
        let restored = restore_color(result, ColorType::L16).to_luma16();
        assert_eq!(restored.get_pixel(0, 0), &Luma([4660]));
        assert!(restored.get_pixel(1, 1)[0] > 4660);

        let rgba = DynamicImage::ImageRgba16(ImageBuffer::from_pixel(
            3,
            3,
            Rgba([4660u16, 4660, 4660, 30000]),
        ));
        let result = composite(&rgba, &overlay);
        assert_eq!(result.color(), ColorType::Rgba16);
        assert_eq!(
            result.to_rgba16().get_pixel(2, 2),
            &Rgba([4660, 4660, 4660, 30000])
        );
    }

    #[test]
    fn test_restore_color() {
        let rgb = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([10, 10, 10])));

        assert_eq!(restore_color(rgb.clone(), ColorType::L8).color(), ColorType::L8);
        assert_eq!(
            restore_color(rgb.clone(), ColorType::Rgb16).color(),
            ColorType::Rgb16
        );
        assert_eq!(restore_color(rgb, ColorType::Rgb8).dimensions(), (2, 2));
    }
}
