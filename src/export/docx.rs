use std::io::Cursor;

use anyhow::Result;
use docx_rs::*;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::chart::RenderedChart;

// Run sizes are in half-points.
const TITLE_SIZE: usize = 48;
const H2_SIZE: usize = 32;
const H3_SIZE: usize = 28;
const BODY_SIZE: usize = 22;

/// Chart images are placed five inches wide.
const IMAGE_WIDTH_EMU: u32 = 5 * 914_400;

/// One-table document: a bold header row with the column names, then one row
/// per data row with every cell stringified.
pub fn table_to_docx(table: &crate::data::Table) -> Result<Vec<u8>> {
    let mut table_rows = Vec::with_capacity(table.len() + 1);

    let header_cells: Vec<TableCell> = table
        .columns()
        .iter()
        .map(|h| text_cell(h, true))
        .collect();
    table_rows.push(TableRow::new(header_cells));

    for row in table.to_string_rows() {
        let cells: Vec<TableCell> = row.iter().map(|c| text_cell(c, false)).collect();
        table_rows.push(TableRow::new(cells));
    }

    let docx = Docx::new().add_table(Table::new(table_rows));
    pack(docx)
}

fn text_cell(text: &str, bold: bool) -> TableCell {
    let mut run = Run::new().add_text(text).size(BODY_SIZE);
    if bold {
        run = run.bold();
    }
    TableCell::new().add_paragraph(Paragraph::new().add_run(run))
}

/// Convert report Markdown into a Word document: headings become large bold
/// paragraphs, `**bold**` runs stay bold, pipe tables become Word tables and
/// links keep their target in parentheses. Charts follow under a "Graphs and
/// Visualizations" heading.
pub fn report_to_docx(markdown: &str, charts: &[RenderedChart]) -> Result<Vec<u8>> {
    let mut docx = Docx::new();

    let mut runs: Vec<Run> = Vec::new();
    let mut bold_active = false;
    let mut heading: Option<HeadingLevel> = None;
    let mut link_target: Option<String> = None;
    let mut in_item = false;

    let mut in_table = false;
    let mut in_table_head = false;
    let mut table_rows: Vec<TableRow> = Vec::new();
    let mut row_cells: Vec<TableCell> = Vec::new();

    for event in Parser::new_ext(markdown, Options::ENABLE_TABLES) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                runs.clear();
                heading = Some(level);
            }
            Event::End(TagEnd::Heading(_)) => {
                docx = docx.add_paragraph(paragraph(runs.drain(..)));
                heading = None;
            }

            Event::Start(Tag::Paragraph) => {
                if !in_item {
                    runs.clear();
                }
            }
            Event::End(TagEnd::Paragraph) => {
                docx = docx.add_paragraph(paragraph(runs.drain(..)));
            }

            // Tight list items carry their text without a paragraph.
            Event::Start(Tag::Item) => {
                if !runs.is_empty() {
                    docx = docx.add_paragraph(paragraph(runs.drain(..)));
                }
                in_item = true;
                runs.push(Run::new().add_text("• ").size(BODY_SIZE));
            }
            Event::End(TagEnd::Item) => {
                in_item = false;
                if !runs.is_empty() {
                    docx = docx.add_paragraph(paragraph(runs.drain(..)));
                }
            }

            Event::Start(Tag::Strong) => bold_active = true,
            Event::End(TagEnd::Strong) => bold_active = false,

            Event::Start(Tag::Link { dest_url, .. }) => link_target = Some(dest_url.to_string()),
            Event::End(TagEnd::Link) => {
                if let Some(target) = link_target.take() {
                    runs.push(Run::new().add_text(format!(" ({target})")).size(BODY_SIZE));
                }
            }

            Event::Start(Tag::Table(_)) => {
                in_table = true;
                table_rows.clear();
            }
            Event::End(TagEnd::Table) => {
                in_table = false;
                docx = docx.add_table(Table::new(std::mem::take(&mut table_rows)));
                docx = docx.add_paragraph(Paragraph::new());
            }
            Event::Start(Tag::TableHead) => {
                in_table_head = true;
                row_cells.clear();
            }
            Event::End(TagEnd::TableHead) => {
                in_table_head = false;
                table_rows.push(TableRow::new(std::mem::take(&mut row_cells)));
            }
            Event::Start(Tag::TableRow) => row_cells.clear(),
            Event::End(TagEnd::TableRow) => {
                table_rows.push(TableRow::new(std::mem::take(&mut row_cells)));
            }
            Event::Start(Tag::TableCell) => runs.clear(),
            Event::End(TagEnd::TableCell) => {
                row_cells.push(TableCell::new().add_paragraph(paragraph(runs.drain(..))));
            }

            Event::Text(text) | Event::Code(text) | Event::Html(text) | Event::InlineHtml(text) => {
                let bold = bold_active || heading.is_some() || (in_table && in_table_head);
                let size = match heading {
                    Some(HeadingLevel::H1) => TITLE_SIZE,
                    Some(HeadingLevel::H2) => H2_SIZE,
                    Some(_) => H3_SIZE,
                    None => BODY_SIZE,
                };
                let mut run = Run::new().add_text(text.as_ref()).size(size);
                if bold {
                    run = run.bold();
                }
                runs.push(run);
            }
            Event::SoftBreak | Event::HardBreak => {
                runs.push(Run::new().add_text(" ").size(BODY_SIZE));
            }
            _ => {}
        }
    }

    if !charts.is_empty() {
        let heading_run = Run::new()
            .add_text("Graphs and Visualizations")
            .bold()
            .size(TITLE_SIZE);
        docx = docx.add_paragraph(Paragraph::new().add_run(heading_run));

        for chart in charts {
            let caption = Run::new().add_text(&chart.title).bold().size(BODY_SIZE);
            docx = docx.add_paragraph(Paragraph::new().add_run(caption));

            let height_emu = (IMAGE_WIDTH_EMU as u64 * chart.height as u64 / chart.width.max(1) as u64) as u32;
            let pic = Pic::new(&chart.png).size(IMAGE_WIDTH_EMU, height_emu);
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_image(pic)));
        }
    }

    pack(docx)
}

fn paragraph(runs: impl Iterator<Item = Run>) -> Paragraph {
    runs.fold(Paragraph::new(), |p, r| p.add_run(r))
}

fn pack(docx: Docx) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| anyhow::anyhow!("Failed to pack DOCX: {}", e))?;

    Ok(buf.into_inner())
}
