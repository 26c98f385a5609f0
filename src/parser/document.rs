//! Document assembler: walks the body and applies document-level rules.

use super::options::BuildOptions;
use super::paragraph::ParagraphBuilder;
use super::table::TableBuilder;
use crate::error::Result;
use crate::model::{Document, Inline, Paragraph, Part, TableKind};
use crate::source::{BodyElement, SourceDocument};

/// State of the image caption window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum CaptionWindow {
    /// No image run is waiting for a caption
    #[default]
    Closed,
    /// An image run was just emitted
    Open,
    /// One blank paragraph after the image run was skipped
    OpenAfterBlank,
}

/// Whether the leading heading can still be taken as the document title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum TitleCapture {
    /// Nothing has been emitted yet
    #[default]
    Open,
    /// A title was taken, or content came first
    Closed,
}

/// Builds a [`Document`] from a source tree.
pub struct DocumentBuilder<'a> {
    source: &'a SourceDocument,
    paragraphs: ParagraphBuilder<'a>,
    tables: TableBuilder<'a>,
    document: Document,
    caption: CaptionWindow,
    title: TitleCapture,
}

impl<'a> DocumentBuilder<'a> {
    /// Create a builder for one source document.
    pub fn new(source: &'a SourceDocument, options: &'a BuildOptions) -> Self {
        let paragraphs = ParagraphBuilder::new(&source.relationships, options);
        Self {
            source,
            paragraphs,
            tables: TableBuilder::new(paragraphs),
            document: Document::new(),
            caption: CaptionWindow::Closed,
            title: TitleCapture::Open,
        }
    }

    /// Walk the body in order and return the assembled document.
    pub fn build(mut self) -> Result<Document> {
        let source = self.source;
        for element in &source.body {
            match element {
                BodyElement::Paragraph(p) => {
                    let paragraph = self.paragraphs.build(p, true)?;
                    self.push_paragraph(paragraph);
                }
                BodyElement::Table(t) => {
                    self.caption = CaptionWindow::Closed;
                    if self.document.first_table.is_none() {
                        log::debug!("first table kept out of the part sequence");
                        self.document.first_table = Some(self.tables.build(t)?);
                        continue;
                    }
                    let table = self.tables.build(t)?;
                    let is_grid = table.kind == TableKind::GenericGrid;
                    self.document.push_table(table);
                    if is_grid {
                        self.promote_grid_heading();
                    }
                }
            }
        }

        log::debug!(
            "assembled {} parts (title: {}, first table: {})",
            self.document.len(),
            self.document.first_title.is_some(),
            self.document.first_table.is_some()
        );
        Ok(self.document)
    }

    fn push_paragraph(&mut self, paragraph: Paragraph) {
        if self.title == TitleCapture::Open {
            if !self.document.is_empty() {
                self.title = TitleCapture::Closed;
            } else if paragraph.is_title {
                log::debug!("leading heading kept out of the part sequence");
                self.title = TitleCapture::Closed;
                self.document.first_title = Some(paragraph);
                self.caption = CaptionWindow::Closed;
                return;
            }
        }

        if paragraph.is_picture() {
            self.document.push_paragraph(paragraph);
            self.caption = CaptionWindow::Open;
            return;
        }

        match self.caption {
            CaptionWindow::Closed => {}
            _ if paragraph.is_title => self.caption = CaptionWindow::Closed,
            CaptionWindow::Open if paragraph.is_blank() => {
                self.caption = CaptionWindow::OpenAfterBlank;
                return;
            }
            CaptionWindow::OpenAfterBlank if paragraph.is_blank() => {
                self.caption = CaptionWindow::Closed;
            }
            CaptionWindow::Open | CaptionWindow::OpenAfterBlank => {
                self.caption = CaptionWindow::Closed;
                if let Some(index) = self.caption_target() {
                    self.attach_caption(index, paragraph);
                    return;
                }
            }
        }

        self.document.push_paragraph(paragraph);
    }

    /// Index of the first paragraph in the trailing picture run.
    fn caption_target(&self) -> Option<usize> {
        let parts = &self.document.parts;
        let start = parts
            .iter()
            .rposition(|part| !matches!(part, Part::Paragraph(p) if p.is_picture()))
            .map(|i| i + 1)
            .unwrap_or(0);
        (start < parts.len()).then_some(start)
    }

    /// Move a caption paragraph into the first image of the part at `index`.
    fn attach_caption(&mut self, index: usize, caption: Paragraph) {
        let Some(Part::Paragraph(target)) = self.document.parts.get_mut(index) else {
            return;
        };
        if let Some(image) = target.first_image_mut() {
            image.caption = caption
                .parts
                .into_iter()
                .filter(|p| !matches!(p, Inline::ListMarker(_)))
                .collect();
            log::debug!("caption attached to image at part {}", index);
        }
    }

    /// A generic grid turns the text paragraph right before it into a level 2
    /// heading. Pictures, list items and blank paragraphs stay as they are.
    fn promote_grid_heading(&mut self) {
        let parts = &mut self.document.parts;
        if parts.len() < 2 {
            return;
        }
        let index = parts.len() - 2;
        if let Part::Paragraph(heading) = &mut parts[index] {
            if heading.is_picture() || heading.is_list_item() || heading.is_blank() {
                log::debug!("paragraph before grid at part {} not promoted", index);
                return;
            }
            heading.set_title(2);
        }
    }
}

/// Build a document from a source tree.
pub fn build(source: &SourceDocument, options: &BuildOptions) -> Result<Document> {
    DocumentBuilder::new(source, options).build()
}
