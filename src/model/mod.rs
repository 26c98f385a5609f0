//! Document model: the typed semantic tree.
//!
//! This module defines the intermediate representation that bridges the
//! source element tree and the renderers. Each node owns its children;
//! the tree is built once, optionally typeset, then only read.

mod document;
mod inline;
mod paragraph;
mod table;

pub use document::{Document, Part};
pub use inline::{
    BoldSpan, Hyperlink, Image, Inline, ListKind, ListMarker, TextSpan, GLUE_WARNING_CLASS,
    IMAGE_PLACEHOLDER,
};
pub use paragraph::Paragraph;
pub use table::{
    AnnotationPair, Callout, GenericGrid, GridCell, GridRow, Table, TableGeometry, TableItem,
    TableKind, LENGTH_RATIO, WIDTH_RATIO,
};
