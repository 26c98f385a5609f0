//! # verstak
//!
//! Turns a word-processing element tree into a publishing-ready intermediate
//! markup and HTML, applying Russian typographic glue along the way.
//!
//! ## Quick Start
//!
//! ```no_run
//! use verstak::{parse_file, render};
//!
//! fn main() -> verstak::Result<()> {
//!     // Build the typed tree from a JSON element-tree dump
//!     let doc = parse_file("article.json")?;
//!
//!     // Render both outputs
//!     let options = render::RenderOptions::default();
//!     println!("{}", render::to_markup(&doc, &options)?);
//!     println!("{}", render::to_html(&doc, &options)?);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Typed tree**: paragraphs with bold, link, list and image leaves
//! - **Table idioms**: annotation rows, callout boxes and generic grids told
//!   apart from raw grid geometry
//! - **Typography**: `[nobr]`, `&nbsp;` and `<span>` glue from configurable
//!   regex rules, inserted at computed offsets
//! - **Outputs**: intermediate markup, HTML with bracket macros, JSON

pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod source;
pub mod typograf;

// Re-export commonly used types
pub use error::{Error, Result};
pub use model::{
    AnnotationPair, Callout, Document, GenericGrid, Inline, ListKind, Paragraph, Part, Table,
    TableItem, TableKind,
};
pub use parser::{BuildOptions, ErrorMode};
pub use render::{JsonFormat, RenderOptions, RenderResult, RenderStats};
pub use source::{SourceDocument, SourceParagraph, SourceRun, SourceTable};
pub use typograf::{GlueKind, LoadMode, Typograf, TypographyRuleSet};

use log::debug;
use rayon::prelude::*;
use std::path::Path;

/// Build a document with default options.
///
/// Typography rules come from the file named by
/// [`typograf::RULES_ENV_VAR`] when set, otherwise the built-in set.
/// Malformed rule sections are skipped with a warning.
pub fn build_document(source: &SourceDocument) -> Result<Document> {
    let rules = TypographyRuleSet::from_env(LoadMode::Lenient)?;
    build_document_with(source, &BuildOptions::default(), &rules)
}

/// Build a document with custom options and rules.
///
/// # Example
///
/// ```
/// use verstak::{build_document_with, BuildOptions, SourceDocument, SourceParagraph};
/// use verstak::TypographyRuleSet;
///
/// let mut source = SourceDocument::new();
/// source.push_paragraph(SourceParagraph::with_text("про себя"));
///
/// let rules = TypographyRuleSet::builtin();
/// let doc = build_document_with(&source, &BuildOptions::default(), &rules).unwrap();
/// assert_eq!(doc.paragraphs().next().unwrap().text(), "про&nbsp;себя");
/// ```
pub fn build_document_with(
    source: &SourceDocument,
    options: &BuildOptions,
    rules: &TypographyRuleSet,
) -> Result<Document> {
    let mut document = parser::build(source, options)?;
    if options.typography {
        debug!("typesetting with {} rules", rules.len());
        document.typeset(&Typograf::new(rules), options.nobr);
    }
    Ok(document)
}

/// Load a JSON element tree from a file and build it.
///
/// # Example
///
/// ```no_run
/// use verstak::parse_file;
///
/// let doc = parse_file("article.json").unwrap();
/// println!("Parts: {}", doc.len());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let source = SourceDocument::from_file(path)?;
    build_document(&source)
}

/// Build a document from a JSON element tree held in memory.
pub fn parse_str(json: &str) -> Result<Document> {
    let source = SourceDocument::from_json_str(json)?;
    build_document(&source)
}

/// Load and build several JSON element tree files in parallel.
///
/// Each document is built on its own worker; the rule set is shared
/// read-only. Results keep the order of `paths`.
pub fn parse_files<P: AsRef<Path> + Sync>(
    paths: &[P],
    options: &BuildOptions,
    rules: &TypographyRuleSet,
) -> Vec<Result<Document>> {
    paths
        .par_iter()
        .map(|path| {
            let source = SourceDocument::from_file(path)?;
            build_document_with(&source, options, rules)
        })
        .collect()
}

/// Convert a JSON element tree file to intermediate markup.
///
/// # Example
///
/// ```no_run
/// use verstak::to_markup;
///
/// let markup = to_markup("article.json").unwrap();
/// std::fs::write("article.md", markup).unwrap();
/// ```
pub fn to_markup<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = parse_file(path)?;
    render::to_markup(&doc, &RenderOptions::default())
}

/// Convert a JSON element tree file to HTML.
pub fn to_html<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = parse_file(path)?;
    render::to_html(&doc, &RenderOptions::default())
}

/// Convert a JSON element tree file to a JSON dump of the built tree.
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = parse_file(path)?;
    render::to_json(&doc, format)
}

/// Builder for building and rendering documents.
///
/// # Example
///
/// ```no_run
/// use verstak::Verstak;
///
/// let html = Verstak::new()
///     .lenient()
///     .with_header_links(true)
///     .parse("article.json")?
///     .to_html()?;
/// # Ok::<(), verstak::Error>(())
/// ```
pub struct Verstak {
    build_options: BuildOptions,
    render_options: RenderOptions,
    rules: Option<TypographyRuleSet>,
}

impl Verstak {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            build_options: BuildOptions::default(),
            render_options: RenderOptions::default(),
            rules: None,
        }
    }

    /// Degrade unresolvable hyperlinks to plain text instead of failing.
    pub fn lenient(mut self) -> Self {
        self.build_options = self.build_options.lenient();
        self
    }

    /// Use an explicit typography rule set instead of the environment one.
    pub fn with_rules(mut self, rules: TypographyRuleSet) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Enable or disable the typography pass.
    pub fn with_typography(mut self, enabled: bool) -> Self {
        self.build_options = self.build_options.with_typography(enabled);
        self
    }

    /// Enable or disable `[nobr]` joins.
    pub fn with_nobr(mut self, enabled: bool) -> Self {
        self.build_options = self.build_options.with_nobr(enabled);
        self
    }

    /// Set the domain whose links are stripped from annotation asides.
    pub fn with_internal_domain(mut self, domain: impl Into<String>) -> Self {
        self.build_options = self.build_options.with_internal_domain(domain);
        self
    }

    /// Keep hyperlinks inside HTML headings.
    pub fn with_header_links(mut self, allow: bool) -> Self {
        self.render_options = self.render_options.with_header_links(allow);
        self
    }

    /// Render a stub instead of generic grids.
    pub fn with_skip_tables(mut self, skip: bool) -> Self {
        self.render_options = self.render_options.with_skip_tables(skip);
        self
    }

    /// Replace the build options wholesale.
    pub fn with_build_options(mut self, options: BuildOptions) -> Self {
        self.build_options = options;
        self
    }

    /// Replace the render options wholesale.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Load and build a JSON element tree file.
    pub fn parse<P: AsRef<Path>>(self, path: P) -> Result<VerstakResult> {
        let source = SourceDocument::from_file(path)?;
        self.build(&source)
    }

    /// Build an in-memory source tree.
    pub fn build(self, source: &SourceDocument) -> Result<VerstakResult> {
        let rules = match self.rules {
            Some(rules) => rules,
            None => TypographyRuleSet::from_env(LoadMode::Lenient)?,
        };
        let document = build_document_with(source, &self.build_options, &rules)?;
        Ok(VerstakResult {
            document,
            render_options: self.render_options,
        })
    }
}

impl Default for Verstak {
    fn default() -> Self {
        Self::new()
    }
}

/// A built document paired with the render options to use.
pub struct VerstakResult {
    /// The built document
    pub document: Document,
    /// Render options to use
    render_options: RenderOptions,
}

impl VerstakResult {
    /// Convert to intermediate markup.
    pub fn to_markup(&self) -> Result<String> {
        render::to_markup(&self.document, &self.render_options)
    }

    /// Convert to HTML.
    pub fn to_html(&self) -> Result<String> {
        render::to_html(&self.document, &self.render_options)
    }

    /// Convert to HTML and collect statistics.
    pub fn to_html_with_stats(&self) -> Result<RenderResult> {
        render::to_html_with_stats(&self.document, &self.render_options)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Text of the excluded first heading.
    pub fn title(&self) -> Option<String> {
        self.document.title()
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceRow;

    fn sample() -> SourceDocument {
        let mut source = SourceDocument::new().with_relationship("rId1", "https://example.com");
        source.push_paragraph(SourceParagraph::styled("Heading 1").run(SourceRun::new("Статья")));
        source.push_paragraph(SourceParagraph::with_text("Как бы я хотел этого"));
        source.push_paragraph(
            SourceParagraph::new()
                .run(SourceRun::new("см. "))
                .hyperlink("rId2", "сайт"),
        );
        source.push_table(
            SourceTable::with_widths([3000.0])
                .row(SourceRow::from_strings(["Обложка"])),
        );
        source
    }

    #[test]
    fn test_verstak_builder() {
        let verstak = Verstak::new()
            .lenient()
            .with_nobr(false)
            .with_header_links(true)
            .with_skip_tables(true);

        assert!(matches!(
            verstak.build_options.error_mode,
            parser::ErrorMode::Lenient
        ));
        assert!(!verstak.build_options.nobr);
        assert!(verstak.render_options.allow_header_links);
        assert!(verstak.render_options.skip_tables);
    }

    #[test]
    fn test_missing_relationship_strict() {
        let result = build_document_with(
            &sample(),
            &BuildOptions::default(),
            &TypographyRuleSet::builtin(),
        );
        assert!(matches!(result, Err(Error::MissingRelationship(_))));
    }

    #[test]
    fn test_lenient_build_and_render() {
        let result = Verstak::new()
            .lenient()
            .with_rules(TypographyRuleSet::builtin())
            .build(&sample())
            .unwrap();

        assert_eq!(result.title().as_deref(), Some("Статья"));
        assert!(result.document().first_table.is_some());
        assert_eq!(
            result.to_html().unwrap(),
            "<p><span>Как&nbsp;бы</span> я хотел этого</p>\n\n<p>см. сайт</p>"
        );
    }

    #[test]
    fn test_typography_disabled() {
        let mut source = SourceDocument::new();
        source.push_paragraph(SourceParagraph::with_text("про себя"));
        let options = BuildOptions::default().without_typography();
        let doc = build_document_with(&source, &options, &TypographyRuleSet::builtin()).unwrap();
        assert_eq!(doc.paragraphs().next().unwrap().text(), "про себя");
    }

    #[test]
    fn test_parse_str_invalid_json() {
        assert!(matches!(parse_str("{not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_parse_file_missing() {
        assert!(matches!(
            parse_file("/nonexistent/article.json"),
            Err(Error::Io(_))
        ));
    }
}
