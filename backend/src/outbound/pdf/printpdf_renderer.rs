//! A4 circuit-breaker detail sheets rendered with `printpdf`.

use async_trait::async_trait;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use crate::domain::ports::{CbDetailRecord, DETAIL_SHEET_TITLE, PdfRenderError, PdfRenderer};

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const MARGIN: f32 = 20.0;
const TITLE_SIZE: f32 = 18.0;
const HEADER_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;
const LINE_HEIGHT: f32 = 6.0;

/// Renders every sheet as a single-font text document.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintPdfRenderer;

fn render_error(err: impl std::fmt::Display) -> PdfRenderError {
    PdfRenderError::render(err.to_string())
}

/// Writes lines top-down, starting a new page when the bottom margin is hit.
struct Cursor<'a> {
    doc: &'a printpdf::PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    y: f32,
    pages: usize,
}

impl Cursor<'_> {
    fn line(&mut self, text: &str, size: f32) {
        if self.y < MARGIN {
            self.pages += 1;
            let (page, layer) =
                self.doc
                    .add_page(PAGE_WIDTH, PAGE_HEIGHT, format!("Page {}", self.pages));
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT.0 - MARGIN;
        }
        self.layer
            .use_text(text, size, Mm(MARGIN), Mm(self.y), &self.font);
        self.y -= LINE_HEIGHT;
    }
}

fn render_sheet(record: &CbDetailRecord) -> Result<Vec<u8>, PdfRenderError> {
    let (doc, page, layer) =
        PdfDocument::new(DETAIL_SHEET_TITLE, PAGE_WIDTH, PAGE_HEIGHT, "Page 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(render_error)?;
    let layer = doc.get_page(page).get_layer(layer);

    let mut cursor = Cursor {
        doc: &doc,
        layer,
        font,
        y: PAGE_HEIGHT.0 - MARGIN,
        pages: 1,
    };
    cursor.line(DETAIL_SHEET_TITLE, TITLE_SIZE);
    cursor.y -= LINE_HEIGHT;
    for header in record.header_lines() {
        cursor.line(&header, HEADER_SIZE);
    }
    cursor.y -= LINE_HEIGHT / 2.0;
    for body in record.body_lines() {
        cursor.line(&body, BODY_SIZE);
    }

    doc.save_to_bytes().map_err(render_error)
}

#[async_trait]
impl PdfRenderer for PrintPdfRenderer {
    async fn render(&self, record: &CbDetailRecord) -> Result<Vec<u8>, PdfRenderError> {
        render_sheet(record)
    }
}
