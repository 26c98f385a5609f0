//! Document-level types.

use super::paragraph::Paragraph;
use super::table::{Table, TableKind};
use crate::typograf::Typograf;
use serde::{Deserialize, Serialize};

/// A built document: the ordered part sequence plus the excluded boilerplate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Parts in reading order
    pub parts: Vec<Part>,

    /// The first heading, kept out of `parts`
    #[serde(default)]
    pub first_title: Option<Paragraph>,

    /// The first table, kept out of `parts`
    #[serde(default)]
    pub first_table: Option<Table>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of the excluded first heading.
    pub fn title(&self) -> Option<String> {
        self.first_title.as_ref().map(Paragraph::text)
    }

    /// Append a paragraph.
    pub fn push_paragraph(&mut self, paragraph: Paragraph) {
        self.parts.push(Part::Paragraph(paragraph));
    }

    /// Append a table.
    pub fn push_table(&mut self, table: Table) {
        self.parts.push(Part::Table(table));
    }

    /// Number of parts.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Check if the document has no parts.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Iterate over top-level paragraphs.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.parts.iter().filter_map(|p| match p {
            Part::Paragraph(paragraph) => Some(paragraph),
            Part::Table(_) => None,
        })
    }

    /// Iterate over top-level tables.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.parts.iter().filter_map(|p| match p {
            Part::Table(table) => Some(table),
            Part::Paragraph(_) => None,
        })
    }

    /// Run the typography engine over every part.
    ///
    /// Meant to run once, right after building; the text is edited in place.
    pub fn typeset(&mut self, typograf: &Typograf<'_>, nobr_enabled: bool) {
        for part in &mut self.parts {
            match part {
                Part::Paragraph(p) => p.typeset(typograf, nobr_enabled),
                Part::Table(t) => t.typeset(typograf, nobr_enabled),
            }
        }
    }
}

/// A top-level document part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    /// A paragraph
    Paragraph(Paragraph),
    /// A classified table
    Table(Table),
}

impl Part {
    /// The paragraph, if this part is one.
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Part::Paragraph(p) => Some(p),
            Part::Table(_) => None,
        }
    }

    /// Check if this part is a generic grid table.
    pub fn is_grid(&self) -> bool {
        matches!(self, Part::Table(t) if t.kind == TableKind::GenericGrid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typograf::TypographyRuleSet;

    #[test]
    fn test_document_new() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert!(doc.title().is_none());
    }

    #[test]
    fn test_part_iterators() {
        let mut doc = Document::new();
        doc.push_paragraph(Paragraph::with_text("a"));
        doc.push_table(Table::new(TableKind::GenericGrid));
        doc.push_paragraph(Paragraph::with_text("b"));

        assert_eq!(doc.len(), 3);
        assert_eq!(doc.paragraphs().count(), 2);
        assert_eq!(doc.tables().count(), 1);
        assert!(doc.parts[1].is_grid());
        assert!(!doc.parts[0].is_grid());
    }

    #[test]
    fn test_typeset_document() {
        let rules = TypographyRuleSet::builtin();
        let typograf = Typograf::new(&rules);

        let mut doc = Document::new();
        doc.push_paragraph(Paragraph::with_text("про себя"));
        doc.typeset(&typograf, true);

        assert_eq!(doc.paragraphs().next().unwrap().text(), "про&nbsp;себя");
    }
}
