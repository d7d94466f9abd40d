//! Store report rendering
//!
//! [`ReportRenderer`] is the seam between report data and the document
//! format. [`PdfReportRenderer`] lays the report out on A4 pages using the
//! bundled DejaVu Sans faces, so non-Latin store, book and author names are
//! drawn instead of dropped. Characters the faces do not cover are drawn as
//! `?` and logged.

use chrono::NaiveDate;
use printpdf::{IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use thiserror::Error;
use tracing::warn;

use crate::services::report_aggregator::StoreReport;

/// Rendering failures
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

/// Turns report data into a binary document
pub trait ReportRenderer: Send + Sync {
    /// MIME type of the produced document
    fn content_type(&self) -> &'static str;

    fn render(&self, report: &StoreReport) -> Result<Vec<u8>, RenderError>;
}

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_TOP: f32 = 20.0;
const MARGIN_BOTTOM: f32 = 20.0;
const MARGIN_LEFT: f32 = 15.0;

const TEXT_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
const HEADING_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

/// Drawn in place of characters the embedded face has no glyph for
const REPLACEMENT_CHAR: char = '?';

// Column offsets (mm from the left margin) of the two tables
const BOOK_COLUMNS: [f32; 5] = [0.0, 10.0, 85.0, 140.0, 165.0];
const AUTHOR_COLUMNS: [f32; 4] = [0.0, 10.0, 110.0, 145.0];

/// A4 PDF renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfReportRenderer;

impl ReportRenderer for PdfReportRenderer {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn render(&self, report: &StoreReport) -> Result<Vec<u8>, RenderError> {
        let title = format!("{} - Store Report", report.store.name);
        let (doc, page, layer) =
            PdfDocument::new(&title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");

        let regular = EmbeddedFont::load(&doc, TEXT_FONT)?;
        let bold = EmbeddedFont::load(&doc, HEADING_FONT)?;

        let mut cursor = PageCursor {
            layer: doc.get_page(page).get_layer(layer),
            y: PAGE_HEIGHT - MARGIN_TOP,
        };

        cursor.text(&doc, "Store Sales Report", 20.0, &bold, 10.0);
        cursor.text(&doc, &report.store.name, 14.0, &bold, 7.0);
        cursor.text(&doc, &report.store.address, 11.0, &regular, 6.0);
        cursor.text(
            &doc,
            &format!("Report date: {}", report.report_date),
            11.0,
            &regular,
            14.0,
        );

        cursor.text(
            &doc,
            &heading(report.top_books.len(), "Priciest Books"),
            14.0,
            &bold,
            8.0,
        );
        if report.top_books.is_empty() {
            cursor.text(&doc, "No books currently in stock.", 11.0, &regular, 12.0);
        } else {
            cursor.row(&doc, &["#", "Title", "Author", "Price", "Copies"], &BOOK_COLUMNS, &bold);
            for (rank, book) in report.top_books.iter().enumerate() {
                cursor.row(
                    &doc,
                    &[
                        (rank + 1).to_string().as_str(),
                        book.name.as_str(),
                        book.author_name.as_str(),
                        format!("${}", book.price).as_str(),
                        book.copies.to_string().as_str(),
                    ],
                    &BOOK_COLUMNS,
                    &regular,
                );
            }
            cursor.gap(6.0);
        }

        cursor.text(
            &doc,
            &heading(report.top_authors.len(), "Prolific Authors"),
            14.0,
            &bold,
            8.0,
        );
        if report.top_authors.is_empty() {
            cursor.text(&doc, "No authors currently in stock.", 11.0, &regular, 12.0);
        } else {
            cursor.row(&doc, &["#", "Author", "Books", "Copies"], &AUTHOR_COLUMNS, &bold);
            for (rank, author) in report.top_authors.iter().enumerate() {
                cursor.row(
                    &doc,
                    &[
                        (rank + 1).to_string().as_str(),
                        author.name.as_str(),
                        author.total_books.to_string().as_str(),
                        author.total_copies.to_string().as_str(),
                    ],
                    &AUTHOR_COLUMNS,
                    &regular,
                );
            }
        }

        doc.save_to_bytes().map_err(pdf_error)
    }
}

fn heading(count: usize, label: &str) -> String {
    if count == 0 {
        label.to_string()
    } else {
        format!("Top {} {}", count, label)
    }
}

fn pdf_error<E: std::fmt::Debug>(e: E) -> RenderError {
    RenderError::Pdf(format!("{:?}", e))
}

/// A TrueType face registered with the document
struct EmbeddedFont {
    pdf: IndirectFontRef,
    face: ttf_parser::Face<'static>,
}

impl EmbeddedFont {
    fn load(doc: &PdfDocumentReference, data: &'static [u8]) -> Result<Self, RenderError> {
        let face = ttf_parser::Face::parse(data, 0).map_err(pdf_error)?;
        let pdf = doc.add_external_font(data).map_err(pdf_error)?;
        Ok(Self { pdf, face })
    }

    /// `text` with every character lacking a glyph replaced
    fn printable(&self, text: &str) -> String {
        let mut missing = Vec::new();
        let printable = text
            .chars()
            .map(|c| {
                if self.face.glyph_index(c).is_some() {
                    c
                } else {
                    missing.push(c);
                    REPLACEMENT_CHAR
                }
            })
            .collect();

        if !missing.is_empty() {
            warn!(
                text,
                missing = %missing.iter().collect::<String>(),
                "Report font has no glyph for some characters"
            );
        }
        printable
    }
}

/// Top-down writing position that spills onto new pages
struct PageCursor {
    layer: PdfLayerReference,
    y: f32,
}

impl PageCursor {
    /// Write one line and move down by `advance` mm
    fn text(
        &mut self,
        doc: &PdfDocumentReference,
        text: &str,
        size: f32,
        font: &EmbeddedFont,
        advance: f32,
    ) {
        self.ensure_room(doc, advance);
        self.layer.use_text(
            font.printable(text),
            size,
            Mm(MARGIN_LEFT),
            Mm(self.y),
            &font.pdf,
        );
        self.y -= advance;
    }

    fn row(
        &mut self,
        doc: &PdfDocumentReference,
        cells: &[&str],
        columns: &[f32],
        font: &EmbeddedFont,
    ) {
        const ROW_HEIGHT: f32 = 6.5;
        self.ensure_room(doc, ROW_HEIGHT);
        for (cell, x) in cells.iter().zip(columns) {
            self.layer.use_text(
                font.printable(&truncate(cell, 40)),
                10.0,
                Mm(MARGIN_LEFT + x),
                Mm(self.y),
                &font.pdf,
            );
        }
        self.y -= ROW_HEIGHT;
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn ensure_room(&mut self, doc: &PdfDocumentReference, needed: f32) {
        if self.y - needed < MARGIN_BOTTOM {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN_TOP;
        }
    }
}

/// Keep table cells inside their column
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(max_chars - 3).collect();
        short.push_str("...");
        short
    }
}

/// `<store name with non-alphanumerics as '-'>-Report-<YYYY-MM-DD>.pdf`
pub fn report_filename(store_name: &str, date: NaiveDate) -> String {
    let sanitized: String = store_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("{}-Report-{}.pdf", sanitized, date.format("%Y-%m-%d"))
}
