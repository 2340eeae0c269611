use super::prose::Block;
use super::RenderError;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

// US Letter with one inch margins.
const PAGE_WIDTH: Mm = Mm(215.9);
const PAGE_HEIGHT: Mm = Mm(279.4);
const MARGIN: f32 = 25.4;

const FONT_SIZE: f32 = 11.0;
const LINE_HEIGHT: f32 = 5.3;
// Helvetica at 11pt averages about 85 characters across 6.5 inches.
const WRAP_COLUMNS: usize = 85;

struct Cursor {
    layer: PdfLayerReference,
    y: f32,
    pages: usize,
}

impl Cursor {
    fn advance(&mut self, doc: &PdfDocumentReference, lines: f32) {
        self.y -= LINE_HEIGHT * lines;
        if self.y < MARGIN {
            self.pages += 1;
            let (page, layer) = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, format!("Page {}", self.pages));
            self.layer = doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT.0 - MARGIN;
        }
    }
}

pub(super) fn write(path: &Path, title: &str, blocks: &[Block]) -> Result<(), RenderError> {
    let (doc, page, layer) = PdfDocument::new(
        format!("Contract - {}", title),
        PAGE_WIDTH,
        PAGE_HEIGHT,
        "Page 1",
    );
    let regular = builtin(&doc, BuiltinFont::Helvetica)?;
    let bold = builtin(&doc, BuiltinFont::HelveticaBold)?;

    let mut cursor = Cursor {
        layer: doc.get_page(page).get_layer(layer),
        y: PAGE_HEIGHT.0 - MARGIN,
        pages: 1,
    };

    for block in blocks {
        let font = if block.bold { &bold } else { &regular };
        for line in textwrap::wrap(&block.text, WRAP_COLUMNS) {
            cursor
                .layer
                .use_text(line.as_ref(), FONT_SIZE, Mm(MARGIN), Mm(cursor.y), font);
            cursor.advance(&doc, 1.0);
        }
        if block.space_after > 0 {
            cursor.advance(&doc, f32::from(block.space_after));
        }
    }

    let mut writer = BufWriter::new(File::create(path)?);
    doc.save(&mut writer)
        .map_err(|e| RenderError::Pdf(e.to_string()))
}

fn builtin(doc: &PdfDocumentReference, font: BuiltinFont) -> Result<IndirectFontRef, RenderError> {
    doc.add_builtin_font(font)
        .map_err(|e| RenderError::Pdf(e.to_string()))
}
