use std::io::BufWriter;
use std::path::Path;

use printpdf::image_crate::{self, DynamicImage, GenericImageView};
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Rect, Rgb,
};
use thiserror::Error;
use tracing::{debug, warn};

use sheetbill_core::DomainError;
use sheetbill_invoicing::InvoiceDocument;

use crate::layout::{self, TableRow, PAYEE};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("pdf engine error: {0}")]
    Engine(String),

    #[error("render pool is closed")]
    PoolClosed,

    #[error("render task panicked: {0}")]
    Panicked(String),
}

impl From<RenderError> for DomainError {
    fn from(err: RenderError) -> Self {
        DomainError::upstream(err.to_string())
    }
}

impl From<printpdf::Error> for RenderError {
    fn from(err: printpdf::Error) -> Self {
        RenderError::Engine(err.to_string())
    }
}

/// Turns a finalized invoice into PDF bytes.
///
/// Implementations are CPU-bound and are driven from blocking threads by
/// [`crate::RenderPool`].
pub trait InvoiceRenderer: Send + Sync + 'static {
    fn render(&self, doc: &InvoiceDocument) -> Result<Vec<u8>, RenderError>;
}

/// Load the branding image. A missing or undecodable file leaves the logo
/// region blank instead of failing renders.
pub fn load_logo(path: impl AsRef<Path>) -> Option<DynamicImage> {
    let path = path.as_ref();
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "logo not readable; rendering without it");
            return None;
        }
    };
    match image_crate::load_from_memory(&bytes) {
        Ok(img) => {
            debug!(
                path = %path.display(),
                width = img.width(),
                height = img.height(),
                "logo loaded"
            );
            // Alpha channels are flattened; the PDF image is plain RGB.
            Some(DynamicImage::ImageRgb8(img.to_rgb8()))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "logo not decodable; rendering without it");
            None
        }
    }
}

const LOGO_DPI: f32 = 300.0;
const LOGO_MAX_W: f32 = 60.0;
const LOGO_MAX_H: f32 = 25.0;

const TITLE_SIZE: f32 = 22.0;
const HEADING_SIZE: f32 = 10.0;
const BODY_SIZE: f32 = 9.5;
const SMALL_SIZE: f32 = 8.0;

const HEADER_GRAY: f32 = 0.87;
const TOTAL_GRAY: f32 = 0.94;

/// Column x positions: description is left aligned, the rest right aligned to
/// their right edges.
const DESC_X: f32 = layout::CONTENT_LEFT + 2.0;
const HOURS_RIGHT: f32 = 120.0;
const RATE_RIGHT: f32 = 155.0;
const AMOUNT_RIGHT: f32 = layout::CONTENT_RIGHT - 2.0;
const DESC_MAX_CHARS: usize = 48;

/// printpdf-backed renderer producing an A4 invoice.
#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer {
    logo: Option<DynamicImage>,
}

impl DocumentRenderer {
    pub fn new(logo: Option<DynamicImage>) -> Self {
        Self { logo }
    }

    pub fn has_logo(&self) -> bool {
        self.logo.is_some()
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl InvoiceRenderer for DocumentRenderer {
    fn render(&self, doc: &InvoiceDocument) -> Result<Vec<u8>, RenderError> {
        let title = format!("Invoice {}", doc.invoice_number());
        let (pdf, page, layer) =
            PdfDocument::new(&title, Mm(layout::PAGE_W), Mm(layout::PAGE_H), "Layer 1");
        let fonts = Fonts {
            regular: pdf.add_builtin_font(BuiltinFont::Helvetica)?,
            bold: pdf.add_builtin_font(BuiltinFont::HelveticaBold)?,
        };

        let rows = layout::table_rows(doc);
        let pages = layout::paginate(&rows);
        let page_count = pages.len();

        let mut current = pdf.get_page(page).get_layer(layer);
        self.draw_header(&current, &fonts, doc);
        let mut table_top = draw_billing(&current, &fonts, doc);

        let mut y = layout::TABLE_BOTTOM;
        for (idx, page_rows) in pages.into_iter().enumerate() {
            if idx > 0 {
                current = new_page(&pdf);
                push_text(
                    &current,
                    &fonts.regular,
                    &format!("Invoice #{} (continued)", doc.invoice_number()),
                    HEADING_SIZE,
                    layout::CONTENT_LEFT,
                    layout::CONTENT_TOP - 4.0,
                );
                table_top = layout::NEXT_TABLE_TOP;
            }
            y = draw_table(&current, &fonts, table_top, page_rows);
        }

        if y - layout::NOTES_BLOCK_H < layout::TABLE_BOTTOM {
            current = new_page(&pdf);
            y = layout::CONTENT_TOP;
        }
        draw_notes(&current, &fonts, y);
        draw_footer(&current, &fonts);

        let mut writer = BufWriter::new(Vec::<u8>::new());
        pdf.save(&mut writer)?;
        let bytes = writer
            .into_inner()
            .map_err(|e| RenderError::Engine(e.to_string()))?;

        debug!(
            invoice_number = doc.invoice_number(),
            pages = page_count,
            bytes = bytes.len(),
            "invoice rendered"
        );
        Ok(bytes)
    }
}

impl DocumentRenderer {
    fn draw_header(&self, layer: &PdfLayerReference, fonts: &Fonts, doc: &InvoiceDocument) {
        let top = layout::CONTENT_TOP;

        if let Some(logo) = &self.logo {
            let (px_w, px_h) = logo.dimensions();
            let natural_w = px_w as f32 / LOGO_DPI * 25.4;
            let natural_h = px_h as f32 / LOGO_DPI * 25.4;
            let scale = (LOGO_MAX_W / natural_w.max(0.1))
                .min(LOGO_MAX_H / natural_h.max(0.1))
                .max(0.01);
            Image::from_dynamic_image(logo).add_to_layer(
                layer.clone(),
                ImageTransform {
                    translate_x: Some(Mm(layout::CONTENT_LEFT)),
                    translate_y: Some(Mm(top - natural_h * scale)),
                    rotate: None,
                    scale_x: Some(scale),
                    scale_y: Some(scale),
                    dpi: Some(LOGO_DPI),
                },
            );
        }

        push_right(layer, &fonts.bold, "INVOICE", TITLE_SIZE, layout::CONTENT_RIGHT, top - 8.0);
        let meta = [
            format!("Invoice #: {}", doc.invoice_number()),
            format!("Date: {}", doc.formatted_invoice_date()),
            format!("Period: {}", doc.period()),
        ];
        for (i, line) in meta.iter().enumerate() {
            push_right(
                layer,
                &fonts.regular,
                line,
                BODY_SIZE,
                layout::CONTENT_RIGHT,
                top - 16.0 - i as f32 * 5.0,
            );
        }

        draw_rule(
            layer,
            layout::CONTENT_LEFT,
            layout::CONTENT_RIGHT,
            top - layout::HEADER_BLOCK_H + 2.0,
            0.75,
        );
    }
}

/// Billing columns and project line. Returns the table top for the first page.
fn draw_billing(layer: &PdfLayerReference, fonts: &Fonts, doc: &InvoiceDocument) -> f32 {
    let top = layout::CONTENT_TOP - layout::HEADER_BLOCK_H - 4.0;
    let right_col = layout::PAGE_W / 2.0 + 5.0;
    let company = doc.company();

    push_text(layer, &fonts.bold, "INVOICE FOR:", HEADING_SIZE, layout::CONTENT_LEFT, top);
    let bill_to = [company.legal_name.as_str(), company.address.as_str(), company.city.as_str()];
    for (i, line) in bill_to.iter().enumerate() {
        let y = top - 6.0 - i as f32 * 5.0;
        push_text(layer, &fonts.regular, line, BODY_SIZE, layout::CONTENT_LEFT, y);
    }

    push_text(layer, &fonts.bold, "PAYABLE TO:", HEADING_SIZE, right_col, top);
    for (i, line) in [PAYEE.name, PAYEE.street, PAYEE.city].iter().enumerate() {
        push_text(layer, &fonts.regular, line, BODY_SIZE, right_col, top - 6.0 - i as f32 * 5.0);
    }

    let project_y = layout::FIRST_TABLE_TOP + 4.0;
    if !company.project.trim().is_empty() {
        push_text(layer, &fonts.bold, "Project:", BODY_SIZE, layout::CONTENT_LEFT, project_y);
        push_text(
            layer,
            &fonts.regular,
            &company.project,
            BODY_SIZE,
            layout::CONTENT_LEFT + 16.0,
            project_y,
        );
    }

    layout::FIRST_TABLE_TOP
}

/// Column header plus `rows` starting at `top`. Returns the y below the last row.
fn draw_table(layer: &PdfLayerReference, fonts: &Fonts, top: f32, rows: &[TableRow]) -> f32 {
    let width = layout::CONTENT_RIGHT - layout::CONTENT_LEFT;
    fill_rect(layer, layout::CONTENT_LEFT, top, width, layout::ROW_H, HEADER_GRAY);
    let header_base = top - layout::ROW_H + 2.6;
    push_text(layer, &fonts.bold, "Description", BODY_SIZE, DESC_X, header_base);
    push_right(layer, &fonts.bold, "Hours", BODY_SIZE, HOURS_RIGHT, header_base);
    push_right(layer, &fonts.bold, "Rate", BODY_SIZE, RATE_RIGHT, header_base);
    push_right(layer, &fonts.bold, "Amount", BODY_SIZE, AMOUNT_RIGHT, header_base);

    let mut y = top - layout::ROW_H;
    for row in rows {
        let font = match row {
            TableRow::Item { .. } | TableRow::Expense { .. } => &fonts.regular,
            TableRow::SectionHeader(_) | TableRow::Total { .. } => &fonts.bold,
        };
        if let TableRow::Total { .. } = row {
            fill_rect(layer, layout::CONTENT_LEFT, y, width, layout::ROW_H, TOTAL_GRAY);
            draw_rule(layer, layout::CONTENT_LEFT, layout::CONTENT_RIGHT, y, 1.5);
        }

        let base = y - layout::ROW_H + 2.6;
        let [description, hours, rate, amount] = row.cells();
        let description = layout::fit_text(description, DESC_MAX_CHARS);
        push_text(layer, font, &description, BODY_SIZE, DESC_X, base);
        push_right(layer, font, hours, BODY_SIZE, HOURS_RIGHT, base);
        push_right(layer, font, rate, BODY_SIZE, RATE_RIGHT, base);
        push_right(layer, font, amount, BODY_SIZE, AMOUNT_RIGHT, base);

        y -= layout::ROW_H;
        if !matches!(row, TableRow::Total { .. }) {
            draw_rule(layer, layout::CONTENT_LEFT, layout::CONTENT_RIGHT, y, 0.25);
        }
    }
    y
}

fn draw_notes(layer: &PdfLayerReference, fonts: &Fonts, y: f32) {
    let top = y - 6.0;
    push_text(layer, &fonts.bold, layout::NOTES_TITLE, BODY_SIZE, layout::CONTENT_LEFT, top);
    push_text(
        layer,
        &fonts.regular,
        layout::PAYMENT_TERMS,
        BODY_SIZE,
        layout::CONTENT_LEFT,
        top - 5.0,
    );
}

fn draw_footer(layer: &PdfLayerReference, fonts: &Fonts) {
    let y = layout::MARGIN + 8.0;
    draw_rule(layer, layout::CONTENT_LEFT, layout::CONTENT_RIGHT, y + 5.0, 0.5);
    push_centered(layer, &fonts.bold, layout::THANK_YOU, BODY_SIZE, y);
    let payee = format!("{} | {} | {}", PAYEE.name, PAYEE.street, PAYEE.city);
    push_centered(layer, &fonts.regular, &payee, SMALL_SIZE, y - 5.0);
}

fn new_page(pdf: &PdfDocumentReference) -> PdfLayerReference {
    let (page, layer) = pdf.add_page(Mm(layout::PAGE_W), Mm(layout::PAGE_H), "Layer 1");
    pdf.get_page(page).get_layer(layer)
}

fn push_text(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    text: &str,
    size: f32,
    x: f32,
    y: f32,
) {
    layer.use_text(text, size, Mm(x), Mm(y), font);
}

fn push_right(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    text: &str,
    size: f32,
    right: f32,
    y: f32,
) {
    let x = right - layout::text_width_mm(text, size);
    push_text(layer, font, text, size, x, y);
}

fn push_centered(layer: &PdfLayerReference, font: &IndirectFontRef, text: &str, size: f32, y: f32) {
    let x = (layout::PAGE_W - layout::text_width_mm(text, size)) / 2.0;
    push_text(layer, font, text, size, x.max(layout::CONTENT_LEFT), y);
}

fn draw_rule(layer: &PdfLayerReference, x1: f32, x2: f32, y: f32, thickness: f32) {
    layer.set_outline_thickness(thickness);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(x1), Mm(y)), false),
            (Point::new(Mm(x2), Mm(y)), false),
        ],
        is_closed: false,
    });
}

fn fill_rect(layer: &PdfLayerReference, x: f32, y_top: f32, w: f32, h: f32, gray: f32) {
    layer.set_fill_color(Color::Rgb(Rgb::new(gray, gray, gray, None)));
    let rect = Rect::new(Mm(x), Mm(y_top - h), Mm(x + w), Mm(y_top)).with_mode(PaintMode::Fill);
    layer.add_rect(rect);
    layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use sheetbill_companies::{CompanyRegistry, InMemoryRegistryStore};
    use sheetbill_core::{InvoicePeriod, Month};
    use sheetbill_invoicing::{InvoiceComposer, ManualExpense};
    use sheetbill_timesheets::LineItem;

    fn invoice(items: usize, with_expense: bool) -> InvoiceDocument {
        let registry = Arc::new(CompanyRegistry::open(InMemoryRegistryStore::new()).unwrap());
        let company = registry.get_by_key("Daily Kos").unwrap();
        let line_items = (0..items)
            .map(|i| LineItem {
                consultant_name: format!("Consultant number {i}"),
                company_name: "Daily Kos".to_string(),
                actual_hours: Decimal::new(125, 1),
                client_rate: Decimal::new(80, 0),
                amount_to_invoice: Decimal::new(1000, 0),
            })
            .collect();
        let expenses = if with_expense {
            vec![ManualExpense {
                description: "Travel".to_string(),
                amount: Decimal::new(12050, 2),
            }]
        } else {
            vec![]
        };
        InvoiceComposer::new(registry)
            .compose(
                &company,
                InvoicePeriod::new(Month::June, 2025),
                line_items,
                expenses,
                NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            )
            .unwrap()
    }

    #[test]
    fn renders_a_pdf_without_logo() {
        let bytes = DocumentRenderer::new(None).render(&invoice(1, false)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn renders_a_pdf_with_logo_and_expenses() {
        let logo = DynamicImage::new_rgb8(120, 40);
        let renderer = DocumentRenderer::new(Some(logo));
        assert!(renderer.has_logo());
        let bytes = renderer.render(&invoice(3, true)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_invoices_span_pages() {
        let renderer = DocumentRenderer::default();
        let short = renderer.render(&invoice(1, false)).unwrap();
        let long = renderer.render(&invoice(60, true)).unwrap();
        assert!(long.starts_with(b"%PDF"));
        assert!(long.len() > short.len());
    }

    #[test]
    fn missing_logo_degrades_to_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_logo(dir.path().join("nope.png")).is_none());
    }

    #[test]
    fn undecodable_logo_degrades_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, b"definitely not an image").unwrap();
        assert!(load_logo(&path).is_none());
    }

    #[test]
    fn render_errors_map_to_upstream() {
        let err: DomainError = RenderError::PoolClosed.into();
        assert_eq!(err, DomainError::upstream("render pool is closed"));
    }
}
