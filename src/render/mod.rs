mod text;

use ab_glyph::PxScale;
use image::{Rgb, Rgba, RgbImage, RgbaImage};
use imageproc::drawing::draw_text_mut;

use crate::error::{Error, Result};
use crate::fonts::FontSet;

pub use text::{blit_rgba_over_rgb, measure, TextExtent};

const NAME_SCALE: f32 = 80.0;
const DETAIL_SCALE: f32 = 15.0;
// The name sits this many pixels above true vertical center.
const NAME_LIFT: i32 = 200;
const INK: Rgb<u8> = Rgb([0, 0, 0]);
const DETAIL_GREY: Rgb<u8> = Rgb([128, 128, 128]);
const ID_STRIP_SIZE: (u32, u32) = (300, 50);
// Clips the top of the rotated strip against the canvas edge; the cut-off
// look near the corner is the intended placement.
const ID_STRIP_OFFSET: (i64, i64) = (50, -50);
const STAMP_INSET_LEFT: i32 = 60;
const STAMP_INSET_BOTTOM: i32 = 80;

/// Composites one certificate: the template, the recipient's name centered,
/// the rotated ID strip near the top-left corner, and the issue line at the
/// bottom-left. `issued_at` is a preformatted `YYYY-MM-DD HH:MM:SS` string.
pub fn render_certificate(
    template_bytes: &[u8],
    fonts: &FontSet,
    name: &str,
    certificate_id: &str,
    issued_at: &str,
) -> Result<RgbImage> {
    let mut certificate = decode_template(template_bytes)?;
    draw_name(&mut certificate, fonts, name);
    stamp_certificate_id(&mut certificate, fonts, certificate_id);
    stamp_issue_line(&mut certificate, fonts, issued_at);
    Ok(certificate)
}

/// Decodes the pristine template. Called fresh for every recipient so no
/// overlay ever leaks from one certificate into the next.
pub fn decode_template(bytes: &[u8]) -> Result<RgbImage> {
    let image =
        image::load_from_memory(bytes).map_err(|e| Error::TemplateLoad(e.to_string()))?;
    Ok(image.to_rgb8())
}

fn draw_name(certificate: &mut RgbImage, fonts: &FontSet, name: &str) {
    let scale = PxScale::from(NAME_SCALE);
    let extent = measure(&fonts.bold, scale, name);
    let x = (certificate.width() as i32 - extent.width as i32) / 2;
    let y = (certificate.height() as i32 - extent.height as i32) / 2 - NAME_LIFT;
    draw_text_mut(certificate, INK, x, y, scale, &fonts.bold, name);
}

fn stamp_certificate_id(certificate: &mut RgbImage, fonts: &FontSet, certificate_id: &str) {
    let (w, h) = ID_STRIP_SIZE;
    let mut strip = RgbaImage::new(w, h);
    draw_text_mut(
        &mut strip,
        Rgba([128, 128, 128, 255]),
        0,
        0,
        PxScale::from(DETAIL_SCALE),
        &fonts.regular,
        certificate_id,
    );
    let upright = image::imageops::rotate270(&strip);
    blit_rgba_over_rgb(certificate, &upright, ID_STRIP_OFFSET.0, ID_STRIP_OFFSET.1);
}

fn stamp_issue_line(certificate: &mut RgbImage, fonts: &FontSet, issued_at: &str) {
    let line = format!("Generated on :{} +05:30 GMT", issued_at);
    let y = certificate.height() as i32 - STAMP_INSET_BOTTOM;
    draw_text_mut(
        certificate,
        DETAIL_GREY,
        STAMP_INSET_LEFT,
        y,
        PxScale::from(DETAIL_SCALE),
        &fonts.regular,
        &line,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn template_png(w: u32, h: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(w, h, Rgb([250, 247, 240]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn test_fonts() -> Option<FontSet> {
        match FontSet::load(None, None) {
            Ok(fonts) => Some(fonts),
            Err(_) => {
                eprintln!("no serif font installed, skipping");
                None
            }
        }
    }

    #[test]
    fn rejects_bytes_that_are_not_an_image() {
        let err = decode_template(b"not an image").unwrap_err();
        assert!(matches!(err, Error::TemplateLoad(_)));
    }

    #[test]
    fn rendered_certificate_differs_from_the_blank_template() {
        let Some(fonts) = test_fonts() else { return };
        let template = template_png(1200, 900);

        let blank = decode_template(&template).unwrap();
        let rendered =
            render_certificate(&template, &fonts, "Alice", "AAAA-1111-NXSP01", "2024-01-01 10:00:00")
                .unwrap();

        assert_eq!(rendered.dimensions(), blank.dimensions());
        assert!(rendered.pixels().zip(blank.pixels()).any(|(a, b)| a != b));
    }

    #[test]
    fn renders_start_from_a_pristine_template_every_time() {
        let Some(fonts) = test_fonts() else { return };
        let template = template_png(1200, 900);

        let _first =
            render_certificate(&template, &fonts, "Alice", "AAAA-1111-NXSP01", "2024-01-01 10:00:00")
                .unwrap();
        let second =
            render_certificate(&template, &fonts, "Bob", "BBBB-2222-NXSP02", "2024-01-01 10:00:05")
                .unwrap();
        let second_again =
            render_certificate(&template, &fonts, "Bob", "BBBB-2222-NXSP02", "2024-01-01 10:00:05")
                .unwrap();

        // Identical inputs rasterize identically, so any residue from the
        // first render would show up as a pixel difference here.
        assert_eq!(second.as_raw(), second_again.as_raw());
    }

    #[test]
    fn name_ink_lands_above_center() {
        let Some(fonts) = test_fonts() else { return };
        let template = template_png(1200, 900);
        let rendered =
            render_certificate(&template, &fonts, "Alice", "AAAA-1111-NXSP01", "2024-01-01 10:00:00")
                .unwrap();

        let mid = 450u32;
        let upper_ink = rendered
            .enumerate_pixels()
            .filter(|(_, y, px)| *y < mid && px.0 == [0, 0, 0])
            .count();
        assert!(upper_ink > 0, "expected black name pixels in the upper half");
    }
}
