use ab_glyph::{Font, GlyphId, PxScale, ScaleFont};
use image::{RgbImage, RgbaImage};

pub struct TextExtent {
    pub width: u32,
    pub height: u32,
}

/// Advance width (with kerning) and outlined glyph height of a single line.
pub fn measure(font: &impl Font, scale: PxScale, text: &str) -> TextExtent {
    let scaled = font.as_scaled(scale);
    let mut caret = 0.0f32;
    let mut last: Option<GlyphId> = None;
    let mut top = f32::MAX;
    let mut bottom = f32::MIN;

    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = last {
            caret += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(scale, ab_glyph::point(caret, 0.0));
        if let Some(outline) = font.outline_glyph(glyph) {
            let bounds = outline.px_bounds();
            top = top.min(bounds.min.y);
            bottom = bottom.max(bounds.max.y);
        }
        caret += scaled.h_advance(id);
        last = Some(id);
    }

    TextExtent {
        width: caret.ceil() as u32,
        height: if bottom > top {
            (bottom - top).ceil() as u32
        } else {
            0
        },
    }
}

/// Alpha-blends `overlay` onto `base` at a signed offset; pixels falling
/// outside the base are dropped.
pub fn blit_rgba_over_rgb(base: &mut RgbImage, overlay: &RgbaImage, x: i64, y: i64) {
    let (base_w, base_h) = (base.width() as i64, base.height() as i64);
    for (ox, oy, pixel) in overlay.enumerate_pixels() {
        let alpha = pixel[3] as u32;
        if alpha == 0 {
            continue;
        }
        let bx = x + ox as i64;
        let by = y + oy as i64;
        if bx < 0 || by < 0 || bx >= base_w || by >= base_h {
            continue;
        }
        let under = base.get_pixel_mut(bx as u32, by as u32);
        for ch in 0..3 {
            let over = pixel[ch] as u32;
            let cur = under[ch] as u32;
            under[ch] = ((over * alpha + cur * (255 - alpha)) / 255) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontSet;
    use image::{Rgb, Rgba};

    #[test]
    fn longer_text_measures_wider() {
        let Ok(fonts) = FontSet::load(None, None) else {
            eprintln!("no serif font installed, skipping");
            return;
        };
        let scale = PxScale::from(80.0);
        let short = measure(&fonts.bold, scale, "Al");
        let long = measure(&fonts.bold, scale, "Alexandria");
        assert!(long.width > short.width);
        assert!(short.height > 0);
    }

    #[test]
    fn whitespace_has_advance_but_no_height() {
        let Ok(fonts) = FontSet::load(None, None) else {
            eprintln!("no serif font installed, skipping");
            return;
        };
        let extent = measure(&fonts.regular, PxScale::from(15.0), "   ");
        assert!(extent.width > 0);
        assert_eq!(extent.height, 0);
    }

    #[test]
    fn blit_blends_alpha_and_clips_negative_offsets() {
        let mut base = RgbImage::from_pixel(4, 4, Rgb([200, 200, 200]));
        let overlay = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));

        blit_rgba_over_rgb(&mut base, &overlay, 3, -1);

        // Only the overlay's bottom-left pixel lands inside the base.
        assert_eq!(base.get_pixel(3, 0), &Rgb([0, 0, 0]));
        assert_eq!(base.get_pixel(2, 0), &Rgb([200, 200, 200]));
        assert_eq!(base.get_pixel(3, 1), &Rgb([200, 200, 200]));
    }

    #[test]
    fn blit_leaves_transparent_pixels_alone() {
        let mut base = RgbImage::from_pixel(2, 2, Rgb([10, 20, 30]));
        let overlay = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 0]));

        blit_rgba_over_rgb(&mut base, &overlay, 0, 0);

        assert_eq!(base.get_pixel(1, 1), &Rgb([10, 20, 30]));
    }

    #[test]
    fn blit_half_alpha_mixes_colors() {
        let mut base = RgbImage::from_pixel(1, 1, Rgb([0, 0, 0]));
        let overlay = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 128]));

        blit_rgba_over_rgb(&mut base, &overlay, 0, 0);

        let px = base.get_pixel(0, 0);
        assert!(px[0] > 120 && px[0] < 135, "got {}", px[0]);
    }
}
