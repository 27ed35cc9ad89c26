//! PDF output using printpdf.

use printpdf::{
    BuiltinFont, Color, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject,
    IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Px,
};

use super::document::{DocumentRenderer, DrawOp, PAGE_HEIGHT_MM, PAGE_WIDTH_MM, Rgb};
use super::{Document, ReportError};
use crate::drawing::decode_data_url;

/// Resolution used to size embedded drawings.
const IMAGE_DPI: f32 = 300.0;

const LAYER_NAME: &str = "Layer 1";

/// Renders documents as A4 PDFs with the built-in Helvetica font.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfRenderer;

impl DocumentRenderer for PdfRenderer {
    fn render(&self, document: &Document) -> Result<Vec<u8>, ReportError> {
        let (doc, page1, layer1) = PdfDocument::new(
            document.title.as_str(),
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            LAYER_NAME,
        );
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Pdf(e.to_string()))?;

        for (i, page) in document.pages.iter().enumerate() {
            let layer = if i == 0 {
                doc.get_page(page1).get_layer(layer1)
            } else {
                let (page_index, layer_index) =
                    doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
                doc.get_page(page_index).get_layer(layer_index)
            };
            for op in &page.ops {
                draw(&layer, &font, op)?;
            }
        }

        let bytes = doc
            .save_to_bytes()
            .map_err(|e| ReportError::Pdf(e.to_string()))?;
        log::info!(
            "Rendered '{}' ({} pages, {} bytes)",
            document.title,
            document.pages.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}

/// Top-left millimeters to PDF's bottom-left origin.
fn flip_y(y: f32) -> Mm {
    Mm(PAGE_HEIGHT_MM - y)
}

fn to_color(color: Rgb) -> Color {
    let Rgb(r, g, b) = color;
    Color::Rgb(printpdf::Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

/// Line widths are given in millimeters, PDF wants points.
fn mm_to_pt(mm: f32) -> f32 {
    mm * 72.0 / 25.4
}

fn draw(layer: &PdfLayerReference, font: &IndirectFontRef, op: &DrawOp) -> Result<(), ReportError> {
    match op {
        DrawOp::Text {
            text,
            x,
            y,
            size,
            color,
        } => {
            layer.set_fill_color(to_color(*color));
            layer.use_text(text.as_str(), *size, Mm(*x), flip_y(*y), font);
        }
        DrawOp::Rect {
            x,
            y,
            width,
            height,
            stroke,
            line_width,
        } => {
            layer.set_outline_color(to_color(*stroke));
            layer.set_outline_thickness(mm_to_pt(*line_width));
            let (left, right) = (Mm(*x), Mm(x + width));
            let (top, bottom) = (flip_y(*y), flip_y(y + height));
            layer.add_line(Line {
                points: vec![
                    (Point::new(left, top), false),
                    (Point::new(right, top), false),
                    (Point::new(right, bottom), false),
                    (Point::new(left, bottom), false),
                ],
                is_closed: true,
            });
        }
        DrawOp::Line {
            from,
            to,
            stroke,
            line_width,
        } => {
            layer.set_outline_color(to_color(*stroke));
            layer.set_outline_thickness(mm_to_pt(*line_width));
            layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(from.0), flip_y(from.1)), false),
                    (Point::new(Mm(to.0), flip_y(to.1)), false),
                ],
                is_closed: false,
            });
        }
        DrawOp::Image {
            data,
            x,
            y,
            width,
            height,
        } => embed_image(layer, data, *x, *y, *width, *height)?,
    }
    Ok(())
}

/// Decode a data URL drawing and stretch it over the given box.
fn embed_image(
    layer: &PdfLayerReference,
    data: &str,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
) -> Result<(), ReportError> {
    let rgb = decode_data_url(data)?.to_rgb8();
    let (px_width, px_height) = rgb.dimensions();
    if px_width == 0 || px_height == 0 {
        return Ok(());
    }

    let natural_width = px_width as f32 / IMAGE_DPI * 25.4;
    let natural_height = px_height as f32 / IMAGE_DPI * 25.4;

    let image = Image::from(ImageXObject {
        width: Px(px_width as usize),
        height: Px(px_height as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: true,
        image_data: rgb.into_raw(),
        image_filter: None,
        clipping_bbox: None,
        smask: None,
    });
    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x)),
            translate_y: Some(flip_y(y + height)),
            scale_x: Some(width / natural_width),
            scale_y: Some(height / natural_height),
            dpi: Some(IMAGE_DPI),
            ..Default::default()
        },
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::{ImageCodec, PngDataUrlCodec};
    use crate::model::{Piece, PieceDraft};
    use crate::report::{ReportVariant, generate};
    use crate::units::CurrencyFormat;

    fn drawing() -> String {
        let mut pixmap = tiny_skia::Pixmap::new(60, 20).unwrap();
        pixmap.fill(tiny_skia::Color::from_rgba8(0, 0, 255, 255));
        PngDataUrlCodec.encode(&pixmap).unwrap()
    }

    fn pieces(drawing: String) -> Vec<Piece> {
        (0..6)
            .map(|i| {
                Piece::new(
                    format!("p{i}"),
                    PieceDraft {
                        group: if i % 2 == 0 { "Cozinha" } else { "Área de serviço" }.to_string(),
                        quantity: 1,
                        width: 0.9,
                        height: 0.6,
                        unit_price: 250.0,
                        details: "borda reta".to_string(),
                        drawing: drawing.clone(),
                    },
                    i,
                )
            })
            .collect()
    }

    #[test]
    fn test_renders_pdf_bytes() {
        let date = time::Date::from_calendar_date(2024, time::Month::May, 1).unwrap();
        for variant in [ReportVariant::Client, ReportVariant::Technical] {
            let doc = generate(variant, &pieces(drawing()), date, &CurrencyFormat::default());
            assert!(doc.pages.len() > 1);
            let bytes = PdfRenderer.render(&doc).unwrap();
            assert!(bytes.starts_with(b"%PDF"));
        }
    }

    #[test]
    fn test_bad_drawing_is_an_error() {
        let date = time::Date::from_calendar_date(2024, time::Month::May, 1).unwrap();
        let doc = generate(
            ReportVariant::Client,
            &pieces("not an image".to_string()),
            date,
            &CurrencyFormat::default(),
        );
        assert!(matches!(
            PdfRenderer.render(&doc),
            Err(ReportError::Image(_))
        ));
    }

    #[test]
    fn test_unit_conversions() {
        assert!((mm_to_pt(25.4) - 72.0).abs() < 1e-4);
        assert_eq!(flip_y(20.0), Mm(277.0));
    }
}
