// Wraps one rendered certificate image into a single-page A4 document.
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, RgbImage};
use printpdf::{
    ColorBits, ColorSpace, Image, ImageFilter, ImageTransform, ImageXObject, Mm, PdfDocument, Px,
};

use crate::error::{Error, Result};

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
const JPEG_QUALITY: u8 = 90;

pub fn image_to_pdf(certificate: &RgbImage, title: &str) -> Result<Vec<u8>> {
    let (width, height) = certificate.dimensions();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
        .encode(certificate.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(|e| Error::PdfWrite(e.to_string()))?;

    let (doc, page, layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "certificate");
    let current_layer = doc.get_page(page).get_layer(layer);

    // The dpi pins the image width to exactly 210 mm; the vertical scale then
    // stretches the height to exactly 297 mm. Non-A4 templates distort.
    let dpi = width as f32 * 25.4 / PAGE_WIDTH_MM;
    let vertical_stretch = (PAGE_HEIGHT_MM * width as f32) / (PAGE_WIDTH_MM * height as f32);

    let pdf_image = Image::from(ImageXObject {
        width: Px(width as usize),
        height: Px(height as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: true,
        image_data: jpeg,
        image_filter: Some(ImageFilter::DCT),
        clipping_bbox: None,
        smask: None,
    });
    pdf_image.add_to_layer(
        current_layer,
        ImageTransform {
            translate_x: Some(Mm(0.0)),
            translate_y: Some(Mm(0.0)),
            scale_x: Some(1.0),
            scale_y: Some(vertical_stretch),
            dpi: Some(dpi),
            ..Default::default()
        },
    );

    doc.save_to_bytes().map_err(|e| Error::PdfWrite(e.to_string()))
}
