//! Source element tree handed over by a document reader.
//!
//! Verstak does not read the `.docx` container itself. A reader (python-docx,
//! docx-rs, a hand-written fixture) supplies the body as a flat stream of
//! paragraphs and tables with resolved text, bold flags, style names,
//! numbering levels, table geometry and the hyperlink relationship map.
//! The tree is plain serde data so it can also be stored as JSON.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A document body plus its relationship targets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Top-level body elements in reading order
    #[serde(default)]
    pub body: Vec<BodyElement>,

    /// Hyperlink relationship targets
    #[serde(default)]
    pub relationships: Relationships,
}

impl SourceDocument {
    /// Create an empty source document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a source document from its JSON form.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a source document from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Append a paragraph to the body.
    pub fn push_paragraph(&mut self, paragraph: SourceParagraph) {
        self.body.push(BodyElement::Paragraph(paragraph));
    }

    /// Append a table to the body.
    pub fn push_table(&mut self, table: SourceTable) {
        self.body.push(BodyElement::Table(table));
    }

    /// Register a relationship target and return self.
    pub fn with_relationship(mut self, id: impl Into<String>, target: impl Into<String>) -> Self {
        self.relationships.insert(id, target);
        self
    }
}

/// Relationship id to target URL map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Relationships {
    targets: HashMap<String, String>,
}

impl Relationships {
    /// Create an empty relationship map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a target for an id.
    pub fn insert(&mut self, id: impl Into<String>, target: impl Into<String>) {
        self.targets.insert(id.into(), target.into());
    }

    /// Resolve a hyperlink relationship id.
    ///
    /// A hyperlink without a resolvable target cannot be rendered, so a
    /// missing id is a hard error rather than an empty URL.
    pub fn resolve(&self, id: Option<&str>) -> Result<&str> {
        let id = id.ok_or_else(|| Error::MissingRelationship("<none>".to_string()))?;
        self.targets
            .get(id)
            .map(String::as_str)
            .ok_or_else(|| Error::MissingRelationship(id.to_string()))
    }

    /// Number of registered targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Check if no targets are registered.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// A top-level body element.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BodyElement {
    /// A paragraph
    Paragraph(SourceParagraph),
    /// A table
    Table(SourceTable),
}

/// A paragraph as an ordered stream of low-level elements.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceParagraph {
    /// Style name, e.g. "Heading 2" or "Title"
    #[serde(default)]
    pub style: Option<String>,

    /// Elements in document order
    #[serde(default)]
    pub elements: Vec<ParagraphElement>,
}

impl SourceParagraph {
    /// Create an empty paragraph with the default style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty paragraph with a named style.
    pub fn styled(style: impl Into<String>) -> Self {
        Self {
            style: Some(style.into()),
            elements: Vec::new(),
        }
    }

    /// Create a paragraph holding a single plain run.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new().run(SourceRun::new(text))
    }

    /// Append a run and return self.
    pub fn run(mut self, run: SourceRun) -> Self {
        self.elements.push(ParagraphElement::Run(run));
        self
    }

    /// Append a hyperlink and return self.
    pub fn hyperlink(mut self, rel_id: impl Into<String>, text: impl Into<String>) -> Self {
        self.elements.push(ParagraphElement::Hyperlink {
            rel_id: Some(rel_id.into()),
            text: text.into(),
        });
        self
    }

    /// Prepend numbering properties (list membership) and return self.
    pub fn numbered(mut self, level: u32) -> Self {
        self.elements.insert(
            0,
            ParagraphElement::Properties {
                numbering_level: Some(level),
            },
        );
        self
    }

    /// Append an arbitrary element and return self.
    pub fn element(mut self, element: ParagraphElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Visible text of the paragraph.
    pub fn text(&self) -> String {
        self.elements
            .iter()
            .filter_map(|e| match e {
                ParagraphElement::Run(run) => Some(run.text.as_str()),
                ParagraphElement::Hyperlink { text, .. } => Some(text.as_str()),
                ParagraphElement::Other { text } => text.as_deref(),
                ParagraphElement::Properties { .. } => None,
            })
            .collect()
    }
}

/// A low-level element inside a paragraph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParagraphElement {
    /// Paragraph properties; carries the numbering level of list paragraphs
    Properties {
        /// Numbering level (None when the paragraph is not numbered)
        #[serde(default)]
        numbering_level: Option<u32>,
    },

    /// A text run
    Run(SourceRun),

    /// A hyperlink with its relationship id
    Hyperlink {
        /// Relationship id
        #[serde(default)]
        rel_id: Option<String>,
        /// Visible label
        #[serde(default)]
        text: String,
    },

    /// Any other element that may carry text
    Other {
        /// Text content, if any
        #[serde(default)]
        text: Option<String>,
    },
}

/// A run of text sharing one formatting set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceRun {
    /// Run text
    #[serde(default)]
    pub text: String,

    /// Bold flag: None when the run has no bold element
    #[serde(default)]
    pub bold: Option<bool>,

    /// The run embeds a drawing (picture)
    #[serde(default)]
    pub has_drawing: bool,
}

impl SourceRun {
    /// Create a plain run.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Create a bold run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: Some(true),
            has_drawing: false,
        }
    }

    /// Create a run holding a drawing.
    pub fn drawing() -> Self {
        Self {
            has_drawing: true,
            ..Default::default()
        }
    }
}

/// A table with its grid geometry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceTable {
    /// Grid column widths in twentieths of a point (None when absent)
    #[serde(default)]
    pub column_widths: Vec<Option<f64>>,

    /// Rows in the table
    #[serde(default)]
    pub rows: Vec<SourceRow>,
}

impl SourceTable {
    /// Create an empty table with the given grid column widths.
    pub fn with_widths(widths: impl IntoIterator<Item = f64>) -> Self {
        Self {
            column_widths: widths.into_iter().map(Some).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row and return self.
    pub fn row(mut self, row: SourceRow) -> Self {
        self.rows.push(row);
        self
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of grid columns (falls back to the first row's cells).
    pub fn column_count(&self) -> usize {
        if self.column_widths.is_empty() {
            self.rows.first().map(|r| r.cells.len()).unwrap_or(0)
        } else {
            self.column_widths.len()
        }
    }

    /// Width of a grid column, 0 when unknown.
    pub fn column_width(&self, index: usize) -> f64 {
        self.column_widths
            .get(index)
            .copied()
            .flatten()
            .unwrap_or(0.0)
    }
}

/// A table row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceRow {
    /// Cells in the row
    #[serde(default)]
    pub cells: Vec<SourceCell>,
}

impl SourceRow {
    /// Create a row from cells.
    pub fn new(cells: Vec<SourceCell>) -> Self {
        Self { cells }
    }

    /// Create a row of single-paragraph plain text cells.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(SourceCell::text).collect())
    }
}

/// A table cell holding paragraphs and nested tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceCell {
    /// Cell content in document order
    #[serde(default)]
    pub content: Vec<CellElement>,
}

impl SourceCell {
    /// Create a cell with one plain paragraph.
    pub fn text(text: impl Into<String>) -> Self {
        Self::paragraphs(vec![SourceParagraph::with_text(text)])
    }

    /// Create a cell from paragraphs.
    pub fn paragraphs(paragraphs: Vec<SourceParagraph>) -> Self {
        Self {
            content: paragraphs.into_iter().map(CellElement::Paragraph).collect(),
        }
    }

    /// Paragraphs directly inside the cell.
    pub fn paragraph_iter(&self) -> impl Iterator<Item = &SourceParagraph> {
        self.content.iter().filter_map(|e| match e {
            CellElement::Paragraph(p) => Some(p),
            CellElement::Table(_) => None,
        })
    }

    /// Cell text: paragraph texts joined by newlines.
    pub fn text_content(&self) -> String {
        self.paragraph_iter()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Content element inside a table cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CellElement {
    /// A paragraph
    Paragraph(SourceParagraph),
    /// A nested table
    Table(SourceTable),
}
