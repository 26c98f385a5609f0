//! Rendering options and configuration.

/// Titles this long (in characters) or longer degrade to warning paragraphs.
pub const DEFAULT_TITLE_LENGTH_LIMIT: usize = 90;

/// HTML class of degraded paragraphs.
pub const DEFAULT_WARNING_CLASS: &str = "verstak_warning";

/// Stub rendered in place of generic grids when tables are skipped.
pub const TABLE_STUB: &str = "## BIG TABLE";

/// Options for rendering a document.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Title length at which a heading degrades to a warning paragraph
    pub title_length_limit: usize,

    /// Keep hyperlinks inside headings in HTML
    pub allow_header_links: bool,

    /// Render a stub instead of generic grids
    pub skip_tables: bool,

    /// HTML class for degraded paragraphs
    pub warning_class: String,

    /// Collect statistics during rendering
    pub collect_stats: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title length limit.
    pub fn with_title_limit(mut self, limit: usize) -> Self {
        self.title_length_limit = limit;
        self
    }

    /// Keep or drop hyperlinks inside headings.
    pub fn with_header_links(mut self, allow: bool) -> Self {
        self.allow_header_links = allow;
        self
    }

    /// Render generic grids as a stub.
    pub fn with_skip_tables(mut self, skip: bool) -> Self {
        self.skip_tables = skip;
        self
    }

    /// Set the warning class.
    pub fn with_warning_class(mut self, class: impl Into<String>) -> Self {
        self.warning_class = class.into();
        self
    }

    /// Enable or disable statistics collection.
    pub fn with_stats(mut self, collect: bool) -> Self {
        self.collect_stats = collect;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title_length_limit: DEFAULT_TITLE_LENGTH_LIMIT,
            allow_header_links: false,
            skip_tables: false,
            warning_class: DEFAULT_WARNING_CLASS.to_string(),
            collect_stats: false,
        }
    }
}
