use super::prose::Block;
use super::RenderError;
use docx_rs::{Docx, PageMargin, Paragraph, Run, RunFonts};
use std::fs::File;
use std::path::Path;

// Twentieths of a point: US Letter, one inch margins.
const PAGE_WIDTH: u32 = 12240;
const PAGE_HEIGHT: u32 = 15840;
const MARGIN: i32 = 1440;
// Half-points.
const FONT_SIZE: usize = 24;

pub(super) fn write(path: &Path, blocks: &[Block]) -> Result<(), RenderError> {
    let mut docx = Docx::new()
        .page_size(PAGE_WIDTH, PAGE_HEIGHT)
        .page_margin(
            PageMargin::new()
                .top(MARGIN)
                .bottom(MARGIN)
                .left(MARGIN)
                .right(MARGIN),
        )
        .default_fonts(RunFonts::new().ascii("Arial").hi_ansi("Arial"))
        .default_size(FONT_SIZE);

    for block in blocks {
        let mut run = Run::new().add_text(block.text.as_str());
        if block.bold {
            run = run.bold();
        }
        docx = docx.add_paragraph(Paragraph::new().add_run(run));
        for _ in 0..block.space_after {
            docx = docx.add_paragraph(Paragraph::new());
        }
    }

    let file = File::create(path)?;
    docx.build()
        .pack(file)
        .map_err(|e| RenderError::Docx(e.to_string()))
}
