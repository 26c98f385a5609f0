//! Rendering result with statistics.

use crate::model::{Inline, Paragraph};
use serde::{Deserialize, Serialize};

/// Result of rendering a document, including content and statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    /// The rendered content (markup or HTML)
    pub content: String,

    /// Text of the excluded first heading
    pub title: Option<String>,

    /// Rendering statistics
    pub stats: RenderStats,
}

impl RenderResult {
    /// Create a new render result.
    pub fn new(content: String, title: Option<String>, stats: RenderStats) -> Self {
        Self {
            content,
            title,
            stats,
        }
    }

    /// Get the content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Statistics collected while rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderStats {
    /// Number of plain paragraphs rendered
    pub paragraph_count: u32,

    /// Number of headings rendered
    pub heading_count: u32,

    /// Number of list items rendered
    pub list_item_count: u32,

    /// Number of images rendered
    pub image_count: u32,

    /// Number of annotation rows rendered
    pub pole_count: u32,

    /// Number of callouts rendered
    pub callout_count: u32,

    /// Number of generic grids rendered
    pub grid_count: u32,

    /// Number of spans flagged by the typography pass
    pub glue_warning_count: u32,

    /// Approximate word count (whitespace-separated tokens)
    pub word_count: u32,
}

impl RenderStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add word counts from text.
    pub fn count_text(&mut self, text: &str) {
        self.word_count += text.split_whitespace().count() as u32;
    }

    /// Count a rendered paragraph by its shape.
    pub fn count_paragraph(&mut self, p: &Paragraph) {
        if p.is_title {
            self.heading_count += 1;
        } else if p.is_list_item() {
            self.list_item_count += 1;
        } else if p.is_picture() {
            self.image_count += p.parts.iter().filter(|i| i.is_image()).count() as u32;
        } else {
            self.paragraph_count += 1;
        }
        self.glue_warning_count += p
            .parts
            .iter()
            .filter_map(Inline::span)
            .filter(|s| s.has_non_break_warning)
            .count() as u32;
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &RenderStats) {
        self.paragraph_count += other.paragraph_count;
        self.heading_count += other.heading_count;
        self.list_item_count += other.list_item_count;
        self.image_count += other.image_count;
        self.pole_count += other.pole_count;
        self.callout_count += other.callout_count;
        self.grid_count += other.grid_count;
        self.glue_warning_count += other.glue_warning_count;
        self.word_count += other.word_count;
    }
}
