//! Paragraph builder: source element stream to [`Paragraph`].

use super::options::{BuildOptions, ErrorMode};
use crate::error::Result;
use crate::model::{BoldSpan, Hyperlink, Image, Inline, ListKind, ListMarker, Paragraph};
use crate::source::{ParagraphElement, Relationships, SourceParagraph, SourceRun};
use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

fn heading_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"heading ([0-9]+)").expect("valid heading regex"))
}

/// Heading level from a paragraph style name.
///
/// `Title*` styles are level 0, `Heading N` styles are level N (0 when the
/// number is missing). Matching is case-insensitive.
pub fn title_level(style: &str) -> Option<u32> {
    let style = style.to_lowercase();
    if style.starts_with("title") {
        Some(0)
    } else if style.starts_with("heading ") {
        let level = heading_regex()
            .captures(&style)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        Some(level)
    } else {
        None
    }
}

/// Builds paragraphs against one document's relationship map.
#[derive(Debug, Clone, Copy)]
pub struct ParagraphBuilder<'a> {
    relationships: &'a Relationships,
    options: &'a BuildOptions,
}

impl<'a> ParagraphBuilder<'a> {
    /// Create a builder.
    pub fn new(relationships: &'a Relationships, options: &'a BuildOptions) -> Self {
        Self {
            relationships,
            options,
        }
    }

    /// The options in use.
    pub fn options(&self) -> &BuildOptions {
        self.options
    }

    /// Build a paragraph.
    ///
    /// `titles` enables heading detection for this paragraph; it is off
    /// inside table cells. Fails only on an unresolved hyperlink target in
    /// strict mode.
    pub fn build(&self, source: &SourceParagraph, titles: bool) -> Result<Paragraph> {
        let mut paragraph = Paragraph::new();

        if titles && self.options.recognize_titles {
            if let Some(level) = source.style.as_deref().and_then(title_level) {
                paragraph.set_title(level);
            }
        }

        for element in &source.elements {
            match element {
                ParagraphElement::Hyperlink { rel_id, text } => {
                    let text = self.normalize(text);
                    match self.relationships.resolve(rel_id.as_deref()) {
                        Ok(url) => {
                            let link = Hyperlink::new(text, url);
                            if !merge_last_hyperlink(&mut paragraph.parts, &link) {
                                paragraph.parts.push(Inline::Link(link));
                            }
                        }
                        Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                            log::warn!("{}; keeping link text only", e);
                            paragraph.parts.push(Inline::text_span(text));
                        }
                        Err(e) => return Err(e),
                    }
                }
                ParagraphElement::Properties {
                    numbering_level: Some(level),
                } => {
                    if paragraph.list_kind().is_none() {
                        let kind = ListKind::from_item_text(&source.text());
                        paragraph
                            .parts
                            .push(Inline::ListMarker(ListMarker::new(*level, kind)));
                    }
                }
                ParagraphElement::Properties {
                    numbering_level: None,
                } => {}
                ParagraphElement::Run(run) => {
                    if let Some(part) = self.build_run(run) {
                        if !merge_last_bold(&mut paragraph.parts, &part) {
                            paragraph.parts.push(part);
                        }
                    }
                }
                ParagraphElement::Other { text: Some(text) } => {
                    paragraph.parts.push(Inline::text_span(self.normalize(text)));
                }
                ParagraphElement::Other { text: None } => {}
            }
        }

        paragraph.move_text_to_caption();
        paragraph.enlarge();
        Ok(paragraph)
    }

    fn build_run(&self, run: &SourceRun) -> Option<Inline> {
        if run.has_drawing {
            return Some(Inline::Image(Image::new()));
        }
        let text = self.normalize(&run.text);
        match run.bold {
            Some(true) if !text.trim().is_empty() => Some(Inline::Bold(BoldSpan::new(text))),
            _ => Some(Inline::text_span(text)),
        }
    }

    fn normalize(&self, text: &str) -> String {
        if self.options.normalize_unicode {
            text.nfc().collect()
        } else {
            text.to_string()
        }
    }
}

/// Merge a new hyperlink into the last part when that part is a hyperlink.
///
/// A link whose label extends the previous label replaces it; a link to the
/// same target extends the previous label.
fn merge_last_hyperlink(parts: &mut [Inline], link: &Hyperlink) -> bool {
    let Some(Inline::Link(last)) = parts.last_mut() else {
        return false;
    };
    if link.span.text.starts_with(last.span.text.as_str()) {
        *last = link.clone();
        true
    } else if link.url == last.url {
        last.span.text.push_str(&link.span.text);
        true
    } else {
        false
    }
}

/// Merge a bold leaf into the last part when both are active bold spans.
fn merge_last_bold(parts: &mut [Inline], part: &Inline) -> bool {
    match (parts.last_mut(), part) {
        (Some(Inline::Bold(last)), Inline::Bold(next)) if last.is_bold && next.is_bold => {
            last.span.text.push_str(&next.span.text);
            true
        }
        _ => false,
    }
}
