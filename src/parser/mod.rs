//! Building the typed tree from a source element tree.

mod document;
mod options;
mod paragraph;
mod table;

pub use document::{build, DocumentBuilder};
pub use options::{BuildOptions, ErrorMode, DEFAULT_INTERNAL_DOMAIN};
pub use paragraph::{title_level, ParagraphBuilder};
pub use table::{geometry, is_internal_url, TableBuilder};
