//! Table classifier and sub-builders.
//!
//! A source table is classified once from its geometry (see
//! [`TableGeometry::classify`]) and then handed to the matching builder:
//! annotation rows for two-column layouts, a callout for single-column
//! tables and a generic grid for everything else.

use super::paragraph::ParagraphBuilder;
use crate::error::Result;
use crate::model::{
    AnnotationPair, Callout, GenericGrid, GridCell, GridRow, Inline, Paragraph, Table,
    TableGeometry, TableItem, TableKind,
};
use crate::source::{CellElement, SourceCell, SourceTable};
use url::Url;

/// Metrics of a source table as seen by the classifier.
pub fn geometry(table: &SourceTable) -> TableGeometry {
    let first_row = table.rows.first();
    let cell_len = |index: usize| {
        first_row
            .and_then(|row| row.cells.get(index))
            .map(|cell| cell.text_content().chars().count())
            .unwrap_or(0)
    };

    TableGeometry {
        rows: table.row_count(),
        columns: table.column_count(),
        left_width: table.column_width(0),
        right_width: table.column_width(1),
        left_len: cell_len(0),
        right_len: cell_len(1),
    }
}

/// Check if a URL points at `domain` or one of its subdomains.
///
/// URLs that do not parse as absolute URLs are never internal.
pub fn is_internal_url(url: &str, domain: &str) -> bool {
    let domain = domain.trim().trim_end_matches('.').to_lowercase();
    if domain.is_empty() {
        return false;
    }
    let Ok(parsed) = Url::parse(url.trim()) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };

    host == domain || host.ends_with(&format!(".{}", domain))
}

/// Builds classified tables.
#[derive(Debug, Clone, Copy)]
pub struct TableBuilder<'a> {
    paragraphs: ParagraphBuilder<'a>,
}

impl<'a> TableBuilder<'a> {
    /// Create a table builder on top of a paragraph builder.
    pub fn new(paragraphs: ParagraphBuilder<'a>) -> Self {
        Self { paragraphs }
    }

    /// Classify and build a table.
    pub fn build(&self, source: &SourceTable) -> Result<Table> {
        let geometry = geometry(source);
        let kind = geometry.classify();
        log::debug!(
            "table {}x{} (widths {}/{}, lengths {}/{}) classified as {:?}",
            geometry.rows,
            geometry.columns,
            geometry.left_width,
            geometry.right_width,
            geometry.left_len,
            geometry.right_len,
            kind
        );

        let mut table = Table::new(kind);
        match kind {
            TableKind::None => {}
            TableKind::AnnotationPair => {
                for row in &source.rows {
                    let empty = SourceCell::default();
                    let left = row.cells.first().unwrap_or(&empty);
                    let right = row.cells.get(1).unwrap_or(&empty);
                    table.items.extend(self.build_pole(left, right)?);
                }
            }
            TableKind::Callout => {
                let mut rows = source.rows.iter();
                if let Some(first) = rows.next() {
                    let cell = first.cells.first().cloned().unwrap_or_default();
                    table.items.push(TableItem::Callout(self.build_callout(&cell)?));
                }
                for row in rows {
                    for cell in &row.cells {
                        for paragraph in self.cell_paragraphs(cell)? {
                            table.items.push(TableItem::Paragraph(paragraph));
                        }
                    }
                }
            }
            TableKind::GenericGrid => {
                table.items.push(TableItem::Grid(self.build_grid(source)?));
            }
        }
        Ok(table)
    }

    /// Non-blank paragraphs of a cell, headings disabled.
    fn cell_paragraphs(&self, cell: &SourceCell) -> Result<Vec<Paragraph>> {
        let mut paragraphs = Vec::new();
        for source in cell.paragraph_iter() {
            let paragraph = self.paragraphs.build(source, false)?;
            if !paragraph.is_blank() {
                paragraphs.push(paragraph);
            }
        }
        Ok(paragraphs)
    }

    /// One annotation row.
    ///
    /// A row whose right cell holds no text is plain prose and comes back as
    /// standalone paragraphs.
    fn build_pole(&self, left: &SourceCell, right: &SourceCell) -> Result<Vec<TableItem>> {
        let left = self.cell_paragraphs(left)?;
        let right = self.cell_paragraphs(right)?;

        if right.is_empty() {
            return Ok(left.into_iter().map(TableItem::Paragraph).collect());
        }

        let mut pole = AnnotationPair {
            left,
            right,
            url: None,
            removed_parts: Vec::new(),
        };

        if let Some(url) = self.hoistable_url(&pole.right) {
            let label = pole.right[0].text();
            pole.url = Some(url);
            pole.right = vec![Paragraph::with_text(label)];
        } else {
            self.strip_internal_links(&mut pole);
        }

        Ok(vec![TableItem::Pole(pole)])
    }

    /// The URL of a right side that is nothing but one external link.
    fn hoistable_url(&self, right: &[Paragraph]) -> Option<String> {
        let [paragraph] = right else {
            return None;
        };
        let mut links = paragraph.parts.iter().filter_map(|p| match p {
            Inline::Link(link) => Some(link),
            _ => None,
        });
        let link = links.next()?;
        if links.next().is_some() || link.span.text.trim() != paragraph.text().trim() {
            return None;
        }
        if is_internal_url(&link.url, &self.paragraphs.options().internal_domain) {
            return None;
        }
        Some(link.url.clone())
    }

    fn strip_internal_links(&self, pole: &mut AnnotationPair) {
        let domain = self.paragraphs.options().internal_domain.as_str();
        for paragraph in &mut pole.right {
            let (removed, kept): (Vec<Inline>, Vec<Inline>) =
                paragraph.parts.drain(..).partition(|part| match part {
                    Inline::Link(link) => is_internal_url(&link.url, domain),
                    _ => false,
                });
            paragraph.parts = kept;
            if !removed.is_empty() {
                log::debug!("removed {} internal link(s) from aside", removed.len());
            }
            pole.removed_parts.extend(removed);
        }
        pole.right.retain(|p| !p.is_blank());
    }

    /// A callout from the content of one cell.
    ///
    /// Nested tables contribute their items in place. The first non-blank
    /// paragraph becomes the title.
    fn build_callout(&self, cell: &SourceCell) -> Result<Callout> {
        let mut parts = Vec::new();
        for element in &cell.content {
            match element {
                CellElement::Paragraph(source) => {
                    let paragraph = self.paragraphs.build(source, false)?;
                    parts.push(TableItem::Paragraph(paragraph));
                }
                CellElement::Table(nested) => {
                    parts.extend(self.build(nested)?.items);
                }
            }
        }

        let title_index = parts.iter().position(|item| match item {
            TableItem::Paragraph(p) => !p.is_blank() && !p.is_picture(),
            _ => false,
        });
        let title = match title_index.map(|i| parts.remove(i)) {
            Some(TableItem::Paragraph(p)) => Some(p),
            _ => None,
        };

        Ok(Callout { title, parts })
    }

    fn build_grid(&self, source: &SourceTable) -> Result<GenericGrid> {
        let mut rows = Vec::with_capacity(source.rows.len());
        for row in &source.rows {
            let mut cells = Vec::with_capacity(row.cells.len());
            for cell in &row.cells {
                let mut paragraphs = Vec::new();
                for paragraph in cell.paragraph_iter() {
                    paragraphs.push(self.paragraphs.build(paragraph, false)?);
                }
                if cell.content.iter().any(|e| matches!(e, CellElement::Table(_))) {
                    log::debug!("nested table inside grid cell ignored");
                }
                cells.push(GridCell::new(paragraphs));
            }
            rows.push(GridRow::new(cells));
        }
        Ok(GenericGrid::from_rows(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::BuildOptions;
    use crate::source::{Relationships, SourceParagraph, SourceRow, SourceRun};

    fn build(table: &SourceTable, relationships: &Relationships) -> Table {
        let options = BuildOptions::default();
        let paragraphs = ParagraphBuilder::new(relationships, &options);
        TableBuilder::new(paragraphs).build(table).unwrap()
    }

    fn pole_table(left: &str, right: &str) -> SourceTable {
        SourceTable::with_widths([4000.0, 2000.0]).row(SourceRow::from_strings([left, right]))
    }

    #[test]
    fn test_is_internal_url() {
        assert!(is_internal_url("https://verstak.local/a", "verstak.local"));
        assert!(is_internal_url("http://www.Verstak.local:8080/", "verstak.local"));
        assert!(is_internal_url("https://user@docs.verstak.local?x=1", "verstak.local"));
        assert!(!is_internal_url("https://notverstak.local/", "verstak.local"));
        assert!(!is_internal_url("https://example.com/verstak.local", "verstak.local"));
        assert!(!is_internal_url("https://example.com", ""));
        assert!(!is_internal_url("https://verstak.local@example.com/", "verstak.local"));
        assert!(!is_internal_url("/relative/path", "verstak.local"));
        assert!(is_internal_url("https://[::1]:8080/x", "[::1]"));
    }

    #[test]
    fn test_annotation_pair() {
        let left = "x".repeat(40);
        let right = "y".repeat(10);
        let table = build(&pole_table(&left, &right), &Relationships::new());
        assert_eq!(table.kind, TableKind::AnnotationPair);
        match &table.items[0] {
            TableItem::Pole(pole) => {
                assert_eq!(pole.left[0].text(), left);
                assert_eq!(pole.right[0].text(), right);
                assert!(pole.url.is_none());
            }
            other => panic!("expected pole, got {:?}", other),
        }
    }

    #[test]
    fn test_ratio_failure_is_grid() {
        let table = build(
            &pole_table(&"x".repeat(40), &"y".repeat(30)),
            &Relationships::new(),
        );
        assert_eq!(table.kind, TableKind::GenericGrid);
    }

    #[test]
    fn test_empty_right_cell_gives_paragraphs() {
        let source = pole_table(&"x".repeat(40), "")
            .row(SourceRow::from_strings(["второй ряд", "   "]));
        let table = build(&source, &Relationships::new());
        assert_eq!(table.kind, TableKind::AnnotationPair);
        assert_eq!(table.items.len(), 2);
        assert!(table
            .items
            .iter()
            .all(|item| matches!(item, TableItem::Paragraph(_))));
    }

    #[test]
    fn test_lone_link_is_hoisted() {
        let mut relationships = Relationships::new();
        relationships.insert("rId1", "https://example.com/more");
        let right = SourceCell::paragraphs(vec![SourceParagraph::new().hyperlink("rId1", "Подробнее")]);
        let source = SourceTable::with_widths([4000.0, 2000.0]).row(SourceRow::new(vec![
            SourceCell::text("x".repeat(40)),
            right,
        ]));

        let table = build(&source, &relationships);
        match &table.items[0] {
            TableItem::Pole(pole) => {
                assert_eq!(pole.url.as_deref(), Some("https://example.com/more"));
                assert_eq!(pole.right, vec![Paragraph::with_text("Подробнее")]);
            }
            other => panic!("expected pole, got {:?}", other),
        }
    }

    #[test]
    fn test_internal_links_removed() {
        let mut relationships = Relationships::new();
        relationships.insert("rId1", "https://verstak.local/page");
        let right = SourceCell::paragraphs(vec![SourceParagraph::new()
            .run(SourceRun::new("См. "))
            .hyperlink("rId1", "тут")]);
        let source = SourceTable::with_widths([4000.0, 2000.0]).row(SourceRow::new(vec![
            SourceCell::text("x".repeat(40)),
            right,
        ]));

        let table = build(&source, &relationships);
        match &table.items[0] {
            TableItem::Pole(pole) => {
                assert!(pole.url.is_none());
                assert_eq!(pole.right[0].text(), "См. ");
                assert_eq!(
                    pole.removed_parts,
                    vec![Inline::link("тут", "https://verstak.local/page")]
                );
            }
            other => panic!("expected pole, got {:?}", other),
        }
    }

    #[test]
    fn test_callout_with_extra_rows() {
        let cell = SourceCell::paragraphs(vec![
            SourceParagraph::with_text(""),
            SourceParagraph::with_text("Важно"),
            SourceParagraph::with_text("Текст плашки"),
        ]);
        let source = SourceTable::with_widths([9000.0])
            .row(SourceRow::new(vec![cell]))
            .row(SourceRow::from_strings(["хвост"]));

        let table = build(&source, &Relationships::new());
        assert_eq!(table.kind, TableKind::Callout);
        assert_eq!(table.items.len(), 2);
        match &table.items[0] {
            TableItem::Callout(callout) => {
                assert_eq!(callout.title.as_ref().map(Paragraph::text).as_deref(), Some("Важно"));
                assert_eq!(callout.parts.len(), 2);
            }
            other => panic!("expected callout, got {:?}", other),
        }
        assert_eq!(table.items[1], TableItem::Paragraph(Paragraph::with_text("хвост")));
    }

    #[test]
    fn test_callout_nested_table() {
        let nested = SourceTable::with_widths([4000.0, 2000.0, 1000.0])
            .row(SourceRow::from_strings(["a", "b", "c"]));
        let cell = SourceCell {
            content: vec![
                CellElement::Paragraph(SourceParagraph::with_text("Заголовок")),
                CellElement::Table(nested),
            ],
        };
        let source = SourceTable::with_widths([9000.0]).row(SourceRow::new(vec![cell]));

        let table = build(&source, &Relationships::new());
        match &table.items[0] {
            TableItem::Callout(callout) => {
                assert!(callout.title.is_some());
                assert!(matches!(callout.parts[0], TableItem::Grid(_)));
            }
            other => panic!("expected callout, got {:?}", other),
        }
    }

    #[test]
    fn test_grid_with_header() {
        let header = SourceRow::new(vec![
            SourceCell::paragraphs(vec![SourceParagraph::new().run(SourceRun::bold("Год"))]),
            SourceCell::paragraphs(vec![SourceParagraph::new().run(SourceRun::bold("Сумма"))]),
            SourceCell::paragraphs(vec![SourceParagraph::new().run(SourceRun::bold("Итог"))]),
        ]);
        let source = SourceTable::with_widths([1000.0, 1000.0, 1000.0])
            .row(header)
            .row(SourceRow::from_strings(["2020", "10", "20"]));

        let table = build(&source, &Relationships::new());
        assert_eq!(table.kind, TableKind::GenericGrid);
        match &table.items[0] {
            TableItem::Grid(grid) => {
                assert!(grid.header.is_some());
                assert_eq!(grid.rows.len(), 1);
                assert_eq!(grid.rows[0].cells[1].text(), "10");
            }
            other => panic!("expected grid, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_rows() {
        let table = build(&SourceTable::with_widths([1.0, 2.0]), &Relationships::new());
        assert_eq!(table.kind, TableKind::None);
        assert!(table.is_empty());
    }
}
