//! Rendering the built tree to intermediate markup, HTML and JSON.

mod html;
mod json;
mod lines;
mod markup;
mod options;
mod result;

pub use html::{to_html, to_html_with_stats, HtmlRenderer};
pub use json::{from_json, to_json, ExportSummary, JsonFormat, EXPORT_VERSION};
pub use lines::{split_lines, split_paragraph};
pub use markup::{to_markup, to_markup_with_stats, MarkupRenderer};
pub use options::{RenderOptions, DEFAULT_TITLE_LENGTH_LIMIT, DEFAULT_WARNING_CLASS, TABLE_STUB};
pub use result::{RenderResult, RenderStats};
