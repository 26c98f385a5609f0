//! JSON export of the built tree.
//!
//! The tree is wrapped in an envelope with the document title and a summary
//! of its parts, so regression fixtures can be diffed at a glance.

use crate::error::{Error, Result};
use crate::model::{Document, Part, TableKind};
use serde::{Deserialize, Serialize};

/// Version of the export envelope.
pub const EXPORT_VERSION: u32 = 1;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Indented
    #[default]
    Pretty,
    /// Single line
    Compact,
}

/// Part counts written next to the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub parts: usize,
    pub paragraphs: usize,
    pub annotation_tables: usize,
    pub callouts: usize,
    pub grids: usize,
    /// Kind of the excluded cover table
    pub first_table: Option<TableKind>,
}

impl ExportSummary {
    fn of(doc: &Document) -> Self {
        let mut summary = Self {
            parts: doc.len(),
            first_table: doc.first_table.as_ref().map(|t| t.kind),
            ..Self::default()
        };
        for part in &doc.parts {
            match part {
                Part::Paragraph(_) => summary.paragraphs += 1,
                Part::Table(t) => match t.kind {
                    TableKind::AnnotationPair => summary.annotation_tables += 1,
                    TableKind::Callout => summary.callouts += 1,
                    TableKind::GenericGrid => summary.grids += 1,
                    TableKind::None => {}
                },
            }
        }
        summary
    }
}

#[derive(Serialize)]
struct Export<'a> {
    version: u32,
    title: Option<String>,
    summary: ExportSummary,
    document: &'a Document,
}

#[derive(Deserialize)]
struct Import {
    version: u32,
    document: Document,
}

/// Serialize a built document inside the export envelope.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    let export = Export {
        version: EXPORT_VERSION,
        title: doc.title(),
        summary: ExportSummary::of(doc),
        document: doc,
    };
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(&export),
        JsonFormat::Compact => serde_json::to_string(&export),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Read back a document written by [`to_json`].
///
/// Envelopes from a newer version are rejected.
pub fn from_json(json: &str) -> Result<Document> {
    let import: Import = serde_json::from_str(json)?;
    if import.version > EXPORT_VERSION {
        return Err(Error::Render(format!(
            "unsupported export version {} (expected {})",
            import.version, EXPORT_VERSION
        )));
    }
    Ok(import.document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Inline, Paragraph, Table};

    fn sample() -> Document {
        let mut doc = Document::new();
        doc.first_title = Some(Paragraph::heading("Заголовок", 0));
        doc.first_table = Some(Table::new(TableKind::GenericGrid));
        doc.push_paragraph(Paragraph::with_parts(vec![Inline::bold("Важно")]));
        doc.push_table(Table::new(TableKind::Callout));
        doc
    }

    #[test]
    fn test_envelope() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["version"], EXPORT_VERSION);
        assert_eq!(value["title"], "Заголовок");
        assert_eq!(value["summary"]["parts"], 2);
        assert_eq!(value["summary"]["paragraphs"], 1);
        assert_eq!(value["summary"]["callouts"], 1);
        assert_eq!(value["summary"]["first_table"], "generic_grid");
        assert_eq!(value["document"]["parts"][0]["parts"][0]["type"], "bold");
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_compact() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_reload() {
        let doc = sample();
        let json = to_json(&doc, JsonFormat::Compact).unwrap();
        assert_eq!(from_json(&json).unwrap(), doc);
    }

    #[test]
    fn test_newer_version_rejected() {
        let json = to_json(&sample(), JsonFormat::Compact)
            .unwrap()
            .replacen("\"version\":1", "\"version\":7", 1);
        assert!(matches!(from_json(&json), Err(Error::Render(_))));
    }
}
