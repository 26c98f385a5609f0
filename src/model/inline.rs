//! Leaf nodes: the text-bearing units a paragraph is made of.

use crate::typograf::Typograf;
use serde::{Deserialize, Serialize};

/// HTML class marking spans whose glue markup may be off.
pub const GLUE_WARNING_CLASS: &str = "verstak_glue_warning";

/// Placeholder source used for every image tag.
pub const IMAGE_PLACEHOLDER: &str = "placeholder1400";

/// Plain text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpan {
    /// The text content
    pub text: String,

    /// The typography pass hit crossing or colliding matches here
    #[serde(default)]
    pub has_non_break_warning: bool,
}

impl TextSpan {
    /// Create a span without warnings.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            has_non_break_warning: false,
        }
    }

    /// Run the typography engine over the span.
    pub fn typeset(&mut self, typograf: &Typograf<'_>, nobr_enabled: bool) {
        let result = typograf.typeset(&self.text, nobr_enabled);
        self.text = result.text;
        self.has_non_break_warning |= result.warning;
    }

    fn warning_attr(&self) -> String {
        if self.has_non_break_warning {
            format!(" class=\"{}\"", GLUE_WARNING_CLASS)
        } else {
            String::new()
        }
    }
}

/// Text that may carry bold formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoldSpan {
    /// Text and warning flag
    #[serde(flatten)]
    pub span: TextSpan,

    /// Whether the bold flag is active
    pub is_bold: bool,
}

impl BoldSpan {
    /// Create an active bold span.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            span: TextSpan::new(text),
            is_bold: true,
        }
    }
}

/// A hyperlink with its resolved target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hyperlink {
    /// Label and warning flag
    #[serde(flatten)]
    pub span: TextSpan,

    /// Target URL
    pub url: String,
}

impl Hyperlink {
    /// Create a hyperlink.
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            span: TextSpan::new(text),
            url: url.into(),
        }
    }

    /// Label with one trailing space split off.
    fn label(&self) -> (&str, &str) {
        match self.span.text.strip_suffix(' ') {
            Some(label) => (label, " "),
            None => (self.span.text.as_str(), ""),
        }
    }

    fn to_markup(&self) -> String {
        let (label, tail) = self.label();
        format!("[{}]( {} ){}", label, self.url, tail)
    }

    fn to_html(&self) -> String {
        let (label, tail) = self.label();
        if self.url.contains(&['(', ')'][..]) {
            format!(
                "<a href=\"{}\" target=\"_blank\"{}>{}</a>{}",
                self.url,
                self.span.warning_attr(),
                label,
                tail
            )
        } else {
            format!("{{{}}}({}){}", label, self.url, tail)
        }
    }
}

/// List flavor, decided from the item text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    /// Ordered list (items are capitalized sentences)
    Numeric,
    /// Unordered list
    Bullet,
}

impl ListKind {
    /// Decide the list flavor from the visible item text.
    pub fn from_item_text(text: &str) -> Self {
        let text = text.trim();
        let capitalized = text.chars().next().is_some_and(char::is_uppercase);
        if capitalized && text.ends_with('.') {
            ListKind::Numeric
        } else {
            ListKind::Bullet
        }
    }

    /// Opening wrapper tag.
    pub fn open_tag(self) -> &'static str {
        match self {
            ListKind::Numeric => "[ol type=milchin]",
            ListKind::Bullet => "[ul]",
        }
    }

    /// Closing wrapper tag.
    pub fn close_tag(self) -> &'static str {
        match self {
            ListKind::Numeric => "[/ol]",
            ListKind::Bullet => "[/ul]",
        }
    }
}

/// List membership of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMarker {
    /// Nesting level, 0 for top level
    pub level: u32,
    /// List flavor
    pub kind: ListKind,
}

impl ListMarker {
    /// Create a list marker.
    pub fn new(level: u32, kind: ListKind) -> Self {
        Self { level, kind }
    }
}

/// An embedded picture and its caption.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Caption leaves
    #[serde(default)]
    pub caption: Vec<Inline>,
}

impl Image {
    /// Create an image without caption.
    pub fn new() -> Self {
        Self::default()
    }

    /// Caption as visible text.
    pub fn caption_text(&self) -> String {
        self.caption.iter().map(Inline::text).collect()
    }

    fn tag(caption: String) -> String {
        format!(
            "[img src=\"{}\" prop=\"\" caption=\"{}\"]",
            IMAGE_PLACEHOLDER,
            caption.replace('\n', "")
        )
    }
}

/// A leaf node of a paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inline {
    /// Plain text
    Text(TextSpan),
    /// Bold-capable text
    Bold(BoldSpan),
    /// Hyperlink
    Link(Hyperlink),
    /// List membership marker
    ListMarker(ListMarker),
    /// Picture
    Image(Image),
}

impl Inline {
    /// Plain text leaf.
    pub fn text_span(text: impl Into<String>) -> Self {
        Inline::Text(TextSpan::new(text))
    }

    /// Active bold leaf.
    pub fn bold(text: impl Into<String>) -> Self {
        Inline::Bold(BoldSpan::new(text))
    }

    /// Hyperlink leaf.
    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Inline::Link(Hyperlink::new(text, url))
    }

    /// Visible text. List markers and images have none.
    pub fn text(&self) -> &str {
        match self {
            Inline::Text(span) => &span.text,
            Inline::Bold(bold) => &bold.span.text,
            Inline::Link(link) => &link.span.text,
            Inline::ListMarker(_) | Inline::Image(_) => "",
        }
    }

    /// Replace the visible text. No-op for list markers and images.
    pub fn set_text(&mut self, text: String) {
        if let Some(span) = self.span_mut() {
            span.text = text;
        }
    }

    /// Text span of text-bearing leaves.
    pub fn span(&self) -> Option<&TextSpan> {
        match self {
            Inline::Text(span) => Some(span),
            Inline::Bold(bold) => Some(&bold.span),
            Inline::Link(link) => Some(&link.span),
            Inline::ListMarker(_) | Inline::Image(_) => None,
        }
    }

    fn span_mut(&mut self) -> Option<&mut TextSpan> {
        match self {
            Inline::Text(span) => Some(span),
            Inline::Bold(bold) => Some(&mut bold.span),
            Inline::Link(link) => Some(&mut link.span),
            Inline::ListMarker(_) | Inline::Image(_) => None,
        }
    }

    /// Whether two leaves are the same kind for coalescing.
    ///
    /// Bold spans only match when their bold flags agree.
    pub fn same_kind(&self, other: &Inline) -> bool {
        match (self, other) {
            (Inline::Text(_), Inline::Text(_)) => true,
            (Inline::Bold(a), Inline::Bold(b)) => a.is_bold == b.is_bold,
            (Inline::Link(_), Inline::Link(_)) => true,
            (Inline::ListMarker(_), Inline::ListMarker(_)) => true,
            (Inline::Image(_), Inline::Image(_)) => true,
            _ => false,
        }
    }

    /// Check if this is an image.
    pub fn is_image(&self) -> bool {
        matches!(self, Inline::Image(_))
    }

    /// Check if this is a hyperlink.
    pub fn is_link(&self) -> bool {
        matches!(self, Inline::Link(_))
    }

    /// Intermediate markup for the leaf.
    pub fn to_markup(&self) -> String {
        match self {
            Inline::Text(span) => span.text.clone(),
            Inline::Bold(bold) if bold.is_bold => format!("**{}**", bold.span.text),
            Inline::Bold(bold) => bold.span.text.clone(),
            Inline::Link(link) => link.to_markup(),
            Inline::ListMarker(marker) => {
                let bullet = match marker.kind {
                    ListKind::Numeric => "1. ",
                    ListKind::Bullet => "- ",
                };
                format!("{}{}", "  ".repeat(marker.level as usize), bullet)
            }
            Inline::Image(image) => {
                Image::tag(image.caption.iter().map(Inline::to_markup).collect())
            }
        }
    }

    /// HTML for the leaf. List markers render nothing, the list wrapper
    /// carries their meaning.
    pub fn to_html(&self) -> String {
        match self {
            Inline::Text(span) if span.has_non_break_warning => {
                format!("<span{}>{}</span>", span.warning_attr(), span.text)
            }
            Inline::Text(span) => span.text.clone(),
            Inline::Bold(bold) if bold.is_bold => format!(
                "<strong{}>{}</strong>",
                bold.span.warning_attr(),
                bold.span.text
            ),
            Inline::Bold(bold) => bold.span.text.clone(),
            Inline::Link(link) => link.to_html(),
            Inline::ListMarker(_) => String::new(),
            Inline::Image(image) => {
                Image::tag(image.caption.iter().map(Inline::to_html).collect())
            }
        }
    }

    /// Typeset text-bearing leaves. List markers and images are left alone.
    pub fn typeset(&mut self, typograf: &Typograf<'_>, nobr_enabled: bool) {
        if let Some(span) = self.span_mut() {
            span.typeset(typograf, nobr_enabled);
        }
    }
}
