//! Intermediate markup rendering.
//!
//! Line-oriented text: `#` headings, `**bold**`, `[text]( url )` links,
//! `[img ...]` tags, fenced ` ```json ` blocks for annotation rows and
//! ` ```plashka ` blocks for callouts, pipe tables for generic grids.

use crate::error::{Error, Result};
use crate::model::{
    AnnotationPair, Callout, Document, GenericGrid, GridRow, Paragraph, Part, Table, TableItem,
};
use serde::Serialize;

use super::lines::split_lines;
use super::options::TABLE_STUB;
use super::{RenderOptions, RenderResult, RenderStats};

/// Convert a document to markup.
pub fn to_markup(doc: &Document, options: &RenderOptions) -> Result<String> {
    let renderer = MarkupRenderer::new(options.clone());
    renderer.render(doc)
}

/// Convert a document to markup with statistics.
pub fn to_markup_with_stats(doc: &Document, options: &RenderOptions) -> Result<RenderResult> {
    let mut options = options.clone();
    options.collect_stats = true;
    let renderer = MarkupRenderer::new(options);
    renderer.render_with_stats(doc)
}

/// JSON shape of an annotation row.
#[derive(Serialize)]
struct PoleJson<'a> {
    left: Vec<String>,
    right: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
}

/// Markup renderer.
pub struct MarkupRenderer {
    options: RenderOptions,
    stats: RenderStats,
}

impl MarkupRenderer {
    /// Create a new markup renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            stats: RenderStats::new(),
        }
    }

    /// Render a document to markup.
    pub fn render(mut self, doc: &Document) -> Result<String> {
        self.render_internal(doc)
    }

    /// Render a document to markup with statistics.
    pub fn render_with_stats(mut self, doc: &Document) -> Result<RenderResult> {
        self.options.collect_stats = true;
        let content = self.render_internal(doc)?;
        self.stats.count_text(&content);
        Ok(RenderResult::new(content, doc.title(), self.stats))
    }

    fn render_internal(&mut self, doc: &Document) -> Result<String> {
        let mut blocks = Vec::new();
        for part in split_lines(&doc.parts) {
            let block = match &part {
                Part::Paragraph(p) if p.is_blank() => continue,
                Part::Paragraph(p) => {
                    self.count_paragraph(p);
                    p.to_markup()
                }
                Part::Table(t) => self.render_table(t)?,
            };
            if !block.is_empty() {
                blocks.push(block);
            }
        }
        Ok(blocks.join("\n\n"))
    }

    fn render_table(&mut self, table: &Table) -> Result<String> {
        let mut blocks = Vec::with_capacity(table.items.len());
        for item in &table.items {
            let block = self.render_item(item)?;
            if !block.is_empty() {
                blocks.push(block);
            }
        }
        Ok(blocks.join("\n\n"))
    }

    fn render_item(&mut self, item: &TableItem) -> Result<String> {
        match item {
            TableItem::Paragraph(p) if p.is_blank() => Ok(String::new()),
            TableItem::Paragraph(p) => {
                self.count_paragraph(p);
                Ok(p.to_markup())
            }
            TableItem::Pole(pole) => self.render_pole(pole),
            TableItem::Callout(callout) => self.render_callout(callout),
            TableItem::Grid(grid) => Ok(self.render_grid(grid)),
        }
    }

    fn render_pole(&mut self, pole: &AnnotationPair) -> Result<String> {
        if self.options.collect_stats {
            self.stats.pole_count += 1;
        }
        let value = PoleJson {
            left: pole.left.iter().map(Paragraph::to_markup).collect(),
            right: pole.right.iter().map(Paragraph::to_markup).collect(),
            url: pole.url.as_deref(),
        };
        let json = serde_json::to_string_pretty(&value)
            .map_err(|e| Error::Render(format!("annotation row serialization error: {}", e)))?;
        Ok(format!("```json\n{}\n```", json))
    }

    fn render_callout(&mut self, callout: &Callout) -> Result<String> {
        if self.options.collect_stats {
            self.stats.callout_count += 1;
        }
        let mut lines = vec!["```plashka".to_string()];
        if let Some(title) = &callout.title {
            lines.push(title.to_markup());
        }
        for item in &callout.parts {
            let block = self.render_item(item)?;
            if !block.is_empty() {
                lines.push(block);
            }
        }
        lines.push("```".to_string());
        Ok(lines.join("\n"))
    }

    fn render_grid(&mut self, grid: &GenericGrid) -> String {
        if self.options.collect_stats {
            self.stats.grid_count += 1;
        }
        if self.options.skip_tables {
            return TABLE_STUB.to_string();
        }

        let columns = grid.column_count();
        if columns == 0 {
            return String::new();
        }

        let mut output = String::new();
        match &grid.header {
            Some(header) => render_pipe_row(&mut output, header, columns),
            None => {
                output.push('|');
                output.push_str(&"  |".repeat(columns));
                output.push('\n');
            }
        }
        output.push('|');
        output.push_str(&" --- |".repeat(columns));
        for row in &grid.rows {
            output.push('\n');
            render_pipe_row(&mut output, row, columns);
        }
        output.trim_end().to_string()
    }

    fn count_paragraph(&mut self, p: &Paragraph) {
        if self.options.collect_stats {
            self.stats.count_paragraph(p);
        }
    }
}

fn render_pipe_row(output: &mut String, row: &GridRow, columns: usize) {
    output.push('|');
    for index in 0..columns {
        let content = row
            .cells
            .get(index)
            .map(|cell| {
                cell.paragraphs
                    .iter()
                    .filter(|p| !p.is_blank())
                    .map(|p| p.to_markup().replace('\n', " "))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();
        output.push_str(&format!(" {} |", content.trim()));
    }
    output.push('\n');
}
