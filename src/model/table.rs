//! Table types: annotation pairs, callouts and generic grids.

use super::inline::Inline;
use super::paragraph::Paragraph;
use crate::typograf::Typograf;
use serde::{Deserialize, Serialize};

/// Annotation layout: `left_width * WIDTH_RATIO` must exceed `right_width`.
pub const WIDTH_RATIO: f64 = 0.6;

/// Annotation layout: `left_len * LENGTH_RATIO` must exceed `right_len`.
pub const LENGTH_RATIO: f64 = 0.5;

/// Table idiom, fixed when the table is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// No rows
    #[default]
    None,
    /// Two columns: a wide dense left side and a narrow aside
    AnnotationPair,
    /// A single-cell highlighted box
    Callout,
    /// Anything else
    GenericGrid,
}

/// Raw metrics the classifier looks at.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TableGeometry {
    /// Number of rows
    pub rows: usize,
    /// Number of grid columns
    pub columns: usize,
    /// Width of the first grid column
    pub left_width: f64,
    /// Width of the second grid column
    pub right_width: f64,
    /// Character count of the first row's left cell
    pub left_len: usize,
    /// Character count of the first row's right cell
    pub right_len: usize,
}

impl TableGeometry {
    /// Pick the table idiom.
    ///
    /// Zero rows gives [`TableKind::None`], one column a callout, two
    /// columns an annotation pair when both ratio checks pass, and
    /// everything else a generic grid.
    pub fn classify(&self) -> TableKind {
        if self.rows == 0 {
            return TableKind::None;
        }
        match self.columns {
            1 => TableKind::Callout,
            2 if self.left_width * WIDTH_RATIO > self.right_width
                && self.left_len as f64 * LENGTH_RATIO > self.right_len as f64 =>
            {
                TableKind::AnnotationPair
            }
            _ => TableKind::GenericGrid,
        }
    }
}

/// One "pole" row: body text on the left, an aside on the right.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationPair {
    /// Non-blank paragraphs of the left cell
    pub left: Vec<Paragraph>,

    /// Non-blank paragraphs of the right cell
    pub right: Vec<Paragraph>,

    /// Hoisted link target when the aside was a lone link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Links to the internal domain stripped from the aside
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed_parts: Vec<Inline>,
}

/// A single-cell box of paragraphs and nested table content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Callout {
    /// First non-blank paragraph, used as the box title
    #[serde(default)]
    pub title: Option<Paragraph>,

    /// Body content
    #[serde(default)]
    pub parts: Vec<TableItem>,
}

/// A cell of a generic grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    /// Paragraphs in the cell
    pub paragraphs: Vec<Paragraph>,
}

impl GridCell {
    /// Create a cell from paragraphs.
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self { paragraphs }
    }

    /// Cell text: paragraph texts joined by newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check if every visible leaf in the cell is bold.
    ///
    /// Whitespace-only leaves are ignored. A cell with no visible text
    /// passes trivially.
    pub fn is_all_bold(&self) -> bool {
        self.paragraphs.iter().flat_map(|p| &p.parts).all(|part| match part {
            Inline::Bold(bold) => bold.is_bold || bold.span.text.trim().is_empty(),
            other => other.text().trim().is_empty() && !other.is_image(),
        })
    }

    fn has_bold(&self) -> bool {
        self.paragraphs
            .iter()
            .flat_map(|p| &p.parts)
            .any(|part| matches!(part, Inline::Bold(b) if b.is_bold))
    }
}

/// A row of a generic grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRow {
    /// Cells in the row
    pub cells: Vec<GridCell>,
}

impl GridRow {
    /// Create a row from cells.
    pub fn new(cells: Vec<GridCell>) -> Self {
        Self { cells }
    }

    /// Check if the row looks like a header: all bold, with some bold text.
    pub fn is_header(&self) -> bool {
        self.cells.iter().all(GridCell::is_all_bold) && self.cells.iter().any(GridCell::has_bold)
    }
}

/// A data table rendered literally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericGrid {
    /// Header row, when the first row is entirely bold
    #[serde(default)]
    pub header: Option<GridRow>,

    /// Body rows
    #[serde(default)]
    pub rows: Vec<GridRow>,
}

impl GenericGrid {
    /// Build a grid, promoting the first row to a header when it qualifies.
    pub fn from_rows(mut rows: Vec<GridRow>) -> Self {
        let header = match rows.first() {
            Some(first) if first.is_header() => Some(rows.remove(0)),
            _ => None,
        };
        Self { header, rows }
    }

    /// Number of columns (widest row).
    pub fn column_count(&self) -> usize {
        self.header
            .iter()
            .chain(&self.rows)
            .map(|r| r.cells.len())
            .max()
            .unwrap_or(0)
    }

    fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.header
            .iter_mut()
            .chain(self.rows.iter_mut())
            .flat_map(|r| r.cells.iter_mut())
            .flat_map(|c| c.paragraphs.iter_mut())
    }
}

/// An item produced from a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableItem {
    /// Standalone prose
    Paragraph(Paragraph),
    /// Annotation row
    Pole(AnnotationPair),
    /// Callout box
    Callout(Callout),
    /// Data grid
    Grid(GenericGrid),
}

impl TableItem {
    /// Run the typography engine over every paragraph in the item.
    pub fn typeset(&mut self, typograf: &Typograf<'_>, nobr_enabled: bool) {
        match self {
            TableItem::Paragraph(p) => p.typeset(typograf, nobr_enabled),
            TableItem::Pole(pole) => {
                for p in pole.left.iter_mut().chain(pole.right.iter_mut()) {
                    p.typeset(typograf, nobr_enabled);
                }
            }
            TableItem::Callout(callout) => {
                if let Some(title) = &mut callout.title {
                    title.typeset(typograf, nobr_enabled);
                }
                for item in &mut callout.parts {
                    item.typeset(typograf, nobr_enabled);
                }
            }
            TableItem::Grid(grid) => {
                for p in grid.paragraphs_mut() {
                    p.typeset(typograf, nobr_enabled);
                }
            }
        }
    }
}

/// A classified table and its items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Table idiom
    pub kind: TableKind,

    /// Items in reading order
    pub items: Vec<TableItem>,
}

impl Table {
    /// Create a table of a kind with no items.
    pub fn new(kind: TableKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
        }
    }

    /// Check if the table produced no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Run the typography engine over the table content.
    pub fn typeset(&mut self, typograf: &Typograf<'_>, nobr_enabled: bool) {
        for item in &mut self.items {
            item.typeset(typograf, nobr_enabled);
        }
    }
}
