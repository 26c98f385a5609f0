//! Line splitting pass run before rendering.

use crate::model::{Paragraph, Part};

/// Split every top-level paragraph at its embedded line breaks.
///
/// Each line becomes its own sibling paragraph, keeping leaf kinds and
/// heading state. List items are left whole. The input is not modified.
pub fn split_lines(parts: &[Part]) -> Vec<Part> {
    let mut out = Vec::with_capacity(parts.len());
    for part in parts {
        match part {
            Part::Paragraph(p) if !p.is_list_item() => {
                out.extend(split_paragraph(p.clone()).into_iter().map(Part::Paragraph));
            }
            other => out.push(other.clone()),
        }
    }
    out
}

/// Split one paragraph into line paragraphs.
pub fn split_paragraph(mut paragraph: Paragraph) -> Vec<Paragraph> {
    let mut lines = Vec::new();
    while let Some(rest) = paragraph.split_first_line() {
        if !paragraph.parts.is_empty() {
            lines.push(paragraph);
        }
        paragraph = rest;
    }
    lines.push(paragraph);
    lines
}
