//! Report layout.
//!
//! Lays pieces out group by group, one outlined box per piece, with page
//! breaks decided by a vertical cursor. Groups appear in the order their
//! first piece appears.

use time::Date;
use time::macros::format_description;

use super::document::{Document, DrawOp, Rgb};
use crate::model::Piece;
use crate::summary::Totals;
use crate::units::{CurrencyFormat, format_area, format_dimensions_cm};

const MARGIN_X: f32 = 15.0;
const TEXT_X: f32 = 20.0;
const TOP_Y: f32 = 20.0;
const RULE_END_X: f32 = 195.0;
const BOX_WIDTH: f32 = 180.0;

/// Start a new page before a group header below this cursor.
const GROUP_BREAK_Y: f32 = 250.0;
/// Start a new page before a piece box or the totals below this cursor.
const ENTRY_BREAK_Y: f32 = 270.0;

const TITLE_SIZE: f32 = 20.0;
const DATE_SIZE: f32 = 10.0;
const HEADER_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 11.0;
const SUBTOTAL_SIZE: f32 = 12.0;
const TOTAL_SIZE: f32 = 14.0;

const HEADER_COLOR: Rgb = Rgb(0, 102, 204);
const BOX_COLOR: Rgb = Rgb(220, 220, 220);
const BOX_LINE_WIDTH: f32 = 0.5;
const RULE_LINE_WIDTH: f32 = 1.0;

/// Which report to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportVariant {
    /// Quotation with prices
    Client,
    /// Measurements, details and larger drawings, no prices
    Technical,
}

impl ReportVariant {
    pub fn title(&self) -> &'static str {
        match self {
            ReportVariant::Client => "Orçamento de Metragem",
            ReportVariant::Technical => "Rascunho Técnico de Medidas",
        }
    }

    pub fn filename(&self) -> &'static str {
        match self {
            ReportVariant::Client => crate::constants::CLIENT_REPORT_FILENAME,
            ReportVariant::Technical => crate::constants::TECHNICAL_REPORT_FILENAME,
        }
    }

    fn box_height(&self) -> f32 {
        match self {
            ReportVariant::Client => 50.0,
            ReportVariant::Technical => 70.0,
        }
    }

    /// Cursor advance per piece.
    fn entry_advance(&self) -> f32 {
        match self {
            ReportVariant::Client => 60.0,
            ReportVariant::Technical => 80.0,
        }
    }

    /// Drawing box `(x, y offset, size)`.
    fn image_box(&self) -> (f32, f32, f32) {
        match self {
            ReportVariant::Client => (140.0, 5.0, 40.0),
            ReportVariant::Technical => (120.0, 5.0, 60.0),
        }
    }
}

/// Pieces grouped by `group`, groups in order of first appearance.
pub fn partition_by_group(pieces: &[Piece]) -> Vec<(&str, Vec<&Piece>)> {
    let mut groups: Vec<(&str, Vec<&Piece>)> = Vec::new();
    for piece in pieces {
        match groups.iter_mut().find(|(name, _)| *name == piece.group()) {
            Some((_, members)) => members.push(piece),
            None => groups.push((piece.group(), vec![piece])),
        }
    }
    groups
}

/// `dd/mm/yyyy`.
pub fn format_date(date: Date) -> String {
    let format = format_description!("[day]/[month]/[year]");
    date.format(format).unwrap_or_else(|_| date.to_string())
}

/// Lay out a report. Pieces are not validated; a piece without a drawing
/// simply has no image.
pub fn generate(
    variant: ReportVariant,
    pieces: &[Piece],
    date: Date,
    currency: &CurrencyFormat,
) -> Document {
    let mut layout = Layout::new(variant.title());

    layout.text(variant.title(), MARGIN_X, TITLE_SIZE, Rgb::BLACK);
    layout.y += 15.0;
    layout.text(
        &format!("Data: {}", format_date(date)),
        MARGIN_X,
        DATE_SIZE,
        Rgb::BLACK,
    );
    layout.y += 10.0;

    for (group, members) in partition_by_group(pieces) {
        layout.break_if_below(GROUP_BREAK_Y);
        layout.text(&format!("Espaço: {}", group), MARGIN_X, HEADER_SIZE, HEADER_COLOR);
        layout.y += 10.0;

        for piece in &members {
            layout.break_if_below(ENTRY_BREAK_Y);
            layout.entry(variant, piece, currency);
        }

        let totals = Totals::of(members.iter().copied());
        let subtotal = match variant {
            ReportVariant::Client => format!(
                "Total {}: {} | {}",
                group,
                format_area(totals.area),
                currency.format(totals.value)
            ),
            ReportVariant::Technical => format!("Total {}: {}", group, format_area(totals.area)),
        };
        layout.text(&subtotal, MARGIN_X, SUBTOTAL_SIZE, Rgb::BLACK);
        layout.y += 15.0;
    }

    let totals = Totals::of(pieces);
    layout.break_if_below(ENTRY_BREAK_Y);
    layout.doc.push(DrawOp::Line {
        from: (MARGIN_X, layout.y),
        to: (RULE_END_X, layout.y),
        stroke: Rgb::BLACK,
        line_width: RULE_LINE_WIDTH,
    });
    layout.y += 10.0;
    layout.text(
        &format!("Total Geral: {}", format_area(totals.area)),
        MARGIN_X,
        TOTAL_SIZE,
        Rgb::BLACK,
    );
    if variant == ReportVariant::Client {
        layout.y += 10.0;
        layout.text(
            &format!("Valor Total: {}", currency.format(totals.value)),
            MARGIN_X,
            TOTAL_SIZE,
            Rgb::BLACK,
        );
    }

    log::info!(
        "📄 Laid out '{}': {} pieces on {} pages",
        variant.title(),
        pieces.len(),
        layout.doc.pages.len()
    );
    layout.doc
}

/// Document under construction plus the vertical cursor.
struct Layout {
    doc: Document,
    y: f32,
}

impl Layout {
    fn new(title: &str) -> Self {
        Self {
            doc: Document::new(title),
            y: TOP_Y,
        }
    }

    fn break_if_below(&mut self, limit: f32) {
        if self.y > limit {
            self.doc.add_page();
            self.y = TOP_Y;
        }
    }

    fn text(&mut self, text: &str, x: f32, size: f32, color: Rgb) {
        self.text_at(text, x, self.y, size, color);
    }

    fn text_at(&mut self, text: &str, x: f32, y: f32, size: f32, color: Rgb) {
        self.doc.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            size,
            color,
        });
    }

    fn entry(&mut self, variant: ReportVariant, piece: &Piece, currency: &CurrencyFormat) {
        let y = self.y;
        self.doc.push(DrawOp::Rect {
            x: MARGIN_X,
            y,
            width: BOX_WIDTH,
            height: variant.box_height(),
            stroke: BOX_COLOR,
            line_width: BOX_LINE_WIDTH,
        });

        self.text_at(
            &format!("Quantidade: {}", piece.quantity()),
            TEXT_X,
            y + 10.0,
            BODY_SIZE,
            Rgb::BLACK,
        );
        self.text_at(
            &format!("Medida: {}", format_dimensions_cm(piece.width(), piece.height())),
            TEXT_X,
            y + 20.0,
            BODY_SIZE,
            Rgb::BLACK,
        );
        self.text_at(
            &format!("Área: {}", format_area(piece.area())),
            TEXT_X,
            y + 30.0,
            BODY_SIZE,
            Rgb::BLACK,
        );
        match variant {
            ReportVariant::Client => self.text_at(
                &format!("Valor: {}", currency.format(piece.total_value())),
                TEXT_X,
                y + 40.0,
                BODY_SIZE,
                Rgb::BLACK,
            ),
            ReportVariant::Technical if !piece.details().is_empty() => self.text_at(
                &format!("Detalhes: {}", piece.details()),
                TEXT_X,
                y + 40.0,
                BODY_SIZE,
                Rgb::BLACK,
            ),
            ReportVariant::Technical => {}
        }

        if piece.has_drawing() {
            let (x, dy, size) = variant.image_box();
            self.doc.push(DrawOp::Image {
                data: piece.drawing().to_string(),
                x,
                y: y + dy,
                width: size,
                height: size,
            });
        }

        self.y += variant.entry_advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PieceDraft;
    use time::Month;

    fn piece(group: &str, details: &str, drawing: &str) -> Piece {
        Piece::new(
            crate::model::new_id(),
            PieceDraft {
                group: group.to_string(),
                quantity: 2,
                width: 1.25,
                height: 0.15,
                unit_price: 100.0,
                details: details.to_string(),
                drawing: drawing.to_string(),
            },
            0,
        )
    }

    fn date() -> Date {
        Date::from_calendar_date(2024, Month::March, 5).unwrap()
    }

    fn client(pieces: &[Piece]) -> Document {
        generate(ReportVariant::Client, pieces, date(), &CurrencyFormat::default())
    }

    fn technical(pieces: &[Piece]) -> Document {
        generate(ReportVariant::Technical, pieces, date(), &CurrencyFormat::default())
    }

    fn text_y(doc: &Document, page: usize, prefix: &str) -> Option<f32> {
        doc.pages[page].ops.iter().find_map(|op| match op {
            DrawOp::Text { text, y, .. } if text.starts_with(prefix) => Some(*y),
            _ => None,
        })
    }

    #[test]
    fn test_partition_keeps_first_appearance_order() {
        let pieces = vec![piece("Sala", "", ""), piece("Cozinha", "", ""), piece("Sala", "", "")];
        let groups = partition_by_group(&pieces);
        let names: Vec<_> = groups.iter().map(|(n, m)| (*n, m.len())).collect();
        assert_eq!(names, vec![("Sala", 2), ("Cozinha", 1)]);
    }

    #[test]
    fn test_date_format() {
        assert_eq!(format_date(date()), "05/03/2024");
    }

    #[test]
    fn test_client_kitchen_report() {
        let doc = client(&[piece("Cozinha", "polido", "")]);
        let texts: Vec<_> = doc.texts().collect();
        assert_eq!(
            texts,
            vec![
                "Orçamento de Metragem",
                "Data: 05/03/2024",
                "Espaço: Cozinha",
                "Quantidade: 2",
                "Medida: 125 × 15 cm",
                "Área: 0.38 m²",
                "Valor: R$ 200,00",
                "Total Cozinha: 0.38 m² | R$ 200,00",
                "Total Geral: 0.38 m²",
                "Valor Total: R$ 200,00",
            ]
        );
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(text_y(&doc, 0, "Data:"), Some(35.0));
        assert_eq!(text_y(&doc, 0, "Espaço:"), Some(45.0));
        assert_eq!(text_y(&doc, 0, "Quantidade:"), Some(65.0));
        // 55 + 60 for the entry
        assert_eq!(text_y(&doc, 0, "Total Cozinha"), Some(115.0));
        assert_eq!(text_y(&doc, 0, "Total Geral"), Some(140.0));
        assert_eq!(text_y(&doc, 0, "Valor Total"), Some(150.0));
    }

    #[test]
    fn test_technical_details_and_no_prices() {
        let doc = technical(&[piece("Sala", "furo de pia", ""), piece("Sala", "", "")]);
        let texts: Vec<_> = doc.texts().collect();
        assert!(texts.contains(&"Rascunho Técnico de Medidas"));
        assert_eq!(texts.iter().filter(|t| t.starts_with("Detalhes:")).count(), 1);
        assert!(texts.contains(&"Detalhes: furo de pia"));
        assert!(texts.contains(&"Total Sala: 0.75 m²"));
        assert!(!texts.iter().any(|t| t.contains("R$")));
    }

    #[test]
    fn test_image_placement() {
        let drawing = "data:image/png;base64,AAAA";
        let images = |doc: &Document| -> Vec<(f32, f32, f32)> {
            doc.pages[0]
                .ops
                .iter()
                .filter_map(|op| match op {
                    DrawOp::Image { x, y, width, .. } => Some((*x, *y, *width)),
                    _ => None,
                })
                .collect()
        };

        let pieces = vec![piece("Sala", "", drawing), piece("Sala", "", "")];
        assert_eq!(images(&client(&pieces)), vec![(140.0, 60.0, 40.0)]);
        assert_eq!(images(&technical(&pieces)), vec![(120.0, 60.0, 60.0)]);
    }

    #[test]
    fn test_entry_box_sizes() {
        let rect_height = |doc: &Document| {
            doc.pages[0].ops.iter().find_map(|op| match op {
                DrawOp::Rect { height, stroke, .. } => Some((*height, *stroke)),
                _ => None,
            })
        };
        let pieces = vec![piece("Sala", "", "")];
        assert_eq!(rect_height(&client(&pieces)), Some((50.0, Rgb(220, 220, 220))));
        assert_eq!(rect_height(&technical(&pieces)), Some((70.0, Rgb(220, 220, 220))));
    }

    #[test]
    fn test_page_breaks() {
        let pieces: Vec<_> = (0..5).map(|_| piece("Sala", "", "")).collect();
        let doc = client(&pieces);
        // entries at 55, 115, 175, 235, then 295 > 270 breaks
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.pages[0].texts().filter(|t| t.starts_with("Quantidade")).count(), 4);
        assert_eq!(text_y(&doc, 1, "Quantidade:"), Some(30.0));
        assert_eq!(text_y(&doc, 1, "Total Sala"), Some(80.0));
    }

    #[test]
    fn test_group_header_breaks_below_250() {
        let mut pieces: Vec<_> = (0..3).map(|_| piece("Sala", "", "")).collect();
        pieces.push(piece("Cozinha", "", ""));
        let doc = client(&pieces);
        // after 3 entries the cursor is 235, subtotal pushes it to 250: no break
        assert_eq!(text_y(&doc, 0, "Espaço: Cozinha"), Some(250.0));
        // the Cozinha entry at 260 still fits, the totals at 335 don't
        assert_eq!(text_y(&doc, 0, "Quantidade"), Some(65.0));
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(text_y(&doc, 1, "Total Geral"), Some(30.0));
    }

    #[test]
    fn test_empty_report_has_totals() {
        let doc = client(&[]);
        let texts: Vec<_> = doc.texts().collect();
        assert!(texts.contains(&"Total Geral: 0.00 m²"));
        assert!(texts.contains(&"Valor Total: R$ 0,00"));
    }
}
