//! Paragraph type and its structural passes.

use super::inline::{Image, Inline, ListKind};
use crate::typograf::Typograf;
use serde::{Deserialize, Serialize};

/// A paragraph: an ordered run of leaves plus heading state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Leaves in reading order
    pub parts: Vec<Inline>,

    /// Whether this paragraph is a heading
    #[serde(default)]
    pub is_title: bool,

    /// Heading level (0 = document title)
    #[serde(default)]
    pub title_level: u32,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph from leaves.
    pub fn with_parts(parts: Vec<Inline>) -> Self {
        Self {
            parts,
            ..Self::default()
        }
    }

    /// Create a paragraph with plain text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::with_parts(vec![Inline::text_span(text)])
    }

    /// Create a heading paragraph.
    pub fn heading(text: impl Into<String>, level: u32) -> Self {
        let mut p = Self::with_text(text);
        p.set_title(level);
        p
    }

    /// Mark the paragraph as a heading of the given level.
    pub fn set_title(&mut self, level: u32) {
        self.is_title = true;
        self.title_level = level;
    }

    /// Visible text of the paragraph.
    pub fn text(&self) -> String {
        self.parts.iter().map(Inline::text).collect()
    }

    /// Number of visible characters.
    pub fn char_count(&self) -> usize {
        self.parts.iter().map(|p| p.text().chars().count()).sum()
    }

    /// Check if the paragraph holds a picture.
    pub fn is_picture(&self) -> bool {
        self.parts.iter().any(Inline::is_image)
    }

    /// Check if the paragraph has no picture and no visible text.
    pub fn is_blank(&self) -> bool {
        !self.is_picture() && self.text().trim().is_empty()
    }

    /// List flavor if the paragraph is a list item.
    pub fn list_kind(&self) -> Option<ListKind> {
        self.parts.iter().find_map(|p| match p {
            Inline::ListMarker(marker) => Some(marker.kind),
            _ => None,
        })
    }

    /// Check if the paragraph is a list item.
    pub fn is_list_item(&self) -> bool {
        self.list_kind().is_some()
    }

    /// Intermediate markup.
    ///
    /// Headings render as `#` repeated `level + 1` times followed by the
    /// plain text of the leaves (images keep their tag); other paragraphs
    /// concatenate leaf markup.
    pub fn to_markup(&self) -> String {
        if self.is_title {
            let mut out = "#".repeat(self.title_level as usize + 1);
            out.push(' ');
            for part in &self.parts {
                match part {
                    Inline::Image(_) => out.push_str(&part.to_markup()),
                    other => out.push_str(other.text()),
                }
            }
            out
        } else {
            self.parts.iter().map(Inline::to_markup).collect()
        }
    }

    /// Coalesce neighbouring leaves.
    ///
    /// Two adjacent leaves of the same kind merge, and a whitespace-only
    /// leaf is absorbed by the text-bearing leaf or list marker before it.
    /// Hyperlinks are never merged here. Picture paragraphs are left untouched.
    pub fn enlarge(&mut self) {
        if self.is_picture() {
            return;
        }

        let mut merged: Vec<Inline> = Vec::with_capacity(self.parts.len());
        for part in self.parts.drain(..) {
            if let Some(last) = merged.last_mut() {
                if matches!(last, Inline::ListMarker(_))
                    && part.span().is_some()
                    && !part.is_link()
                    && part.text().trim().is_empty()
                {
                    continue;
                }
                if absorbs(last, &part) {
                    let text = format!("{}{}", last.text(), part.text());
                    last.set_text(text);
                    continue;
                }
            }
            merged.push(part);
        }
        self.parts = merged;
    }

    /// Move all non-image leaves into the first image's caption.
    ///
    /// Nothing happens when the paragraph has no image or no caption text.
    pub fn move_text_to_caption(&mut self) {
        if !self.is_picture() {
            return;
        }

        let (images, caption): (Vec<Inline>, Vec<Inline>) = self
            .parts
            .drain(..)
            .filter(|p| !matches!(p, Inline::ListMarker(_)))
            .partition(Inline::is_image);

        self.parts = images;
        if caption.iter().all(|p| p.to_markup().is_empty()) {
            return;
        }
        if let Some(image) = self.first_image_mut() {
            image.caption = caption;
        }
    }

    /// The first image leaf, if any.
    pub fn first_image_mut(&mut self) -> Option<&mut Image> {
        self.parts.iter_mut().find_map(|p| match p {
            Inline::Image(image) => Some(image),
            _ => None,
        })
    }

    /// Split the paragraph at the first embedded line break.
    ///
    /// The leaf holding the break is cut in two; leaves before it stay in
    /// `self`, leaves after it move to the returned paragraph, which keeps
    /// the heading state. Empty fragments are dropped. Returns `None` when
    /// there is no line break.
    pub fn split_first_line(&mut self) -> Option<Paragraph> {
        let index = self.parts.iter().position(|p| p.text().contains('\n'))?;

        let mut rest = self.parts.split_off(index);
        let mut head = rest.remove(0);
        let text = head.text().to_string();
        let (before, after) = text.split_once('\n').unwrap_or((text.as_str(), ""));

        let mut tail = head.clone();
        tail.set_text(after.to_string());
        head.set_text(before.to_string());

        if !before.is_empty() {
            self.parts.push(head);
        }
        if !after.is_empty() {
            rest.insert(0, tail);
        }

        Some(Paragraph {
            parts: rest,
            is_title: self.is_title,
            title_level: self.title_level,
        })
    }

    /// Run the typography engine over all text-bearing leaves.
    ///
    /// Picture paragraphs and blank paragraphs are skipped.
    pub fn typeset(&mut self, typograf: &Typograf<'_>, nobr_enabled: bool) {
        if self.is_picture() || self.text().trim().is_empty() {
            return;
        }
        for part in &mut self.parts {
            part.typeset(typograf, nobr_enabled);
        }
    }
}

fn absorbs(last: &Inline, next: &Inline) -> bool {
    if next.is_link() || last.is_link() {
        return false;
    }
    if last.span().is_none() || next.span().is_none() {
        return false;
    }
    last.same_kind(next) || next.text().trim().is_empty()
}
