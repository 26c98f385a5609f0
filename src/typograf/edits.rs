//! Offset-based text edits applied in a single pass.
//!
//! All offsets are byte offsets into the original text. Edits are sorted
//! by offset and spliced left to right, so later offsets never need manual
//! shifting after an earlier insertion.

/// A batch of insertions and replacements against one text.
#[derive(Debug, Clone, Default)]
pub struct TextEdits {
    edits: Vec<Edit>,
}

#[derive(Debug, Clone)]
struct Edit {
    start: usize,
    end: usize,
    text: String,
    seq: usize,
}

/// Outcome of applying a batch of edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    /// The edited text
    pub text: String,
    /// Edits dropped because they overlapped an earlier replacement
    pub conflicts: usize,
}

impl TextEdits {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `text` before the byte at `offset`.
    pub fn insert(&mut self, offset: usize, text: impl Into<String>) {
        self.push(offset, offset, text.into());
    }

    /// Replace the byte range `start..end` with `text`.
    pub fn replace(&mut self, start: usize, end: usize, text: impl Into<String>) {
        self.push(start, end.max(start), text.into());
    }

    /// Bracket the byte range `start..end` with `open` and `close`.
    pub fn wrap(&mut self, start: usize, end: usize, open: &str, close: &str) {
        self.insert(start, open);
        self.insert(end.max(start), close);
    }

    /// Number of queued edits.
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Check if no edits are queued.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Apply all edits to `source`.
    ///
    /// Edits at the same offset keep their queue order, with insertions
    /// placed before a replacement starting there. An edit that starts
    /// inside an already replaced range is dropped and counted as a
    /// conflict. Offsets past the end or off a char boundary are dropped
    /// the same way.
    pub fn apply(mut self, source: &str) -> Applied {
        self.edits
            .sort_by_key(|e| (e.start, e.end > e.start, e.seq));

        let mut text = String::with_capacity(source.len() + self.edits.len() * 8);
        let mut cursor = 0;
        let mut conflicts = 0;

        for edit in self.edits {
            if edit.start < cursor
                || edit.end > source.len()
                || !source.is_char_boundary(edit.start)
                || !source.is_char_boundary(edit.end)
            {
                conflicts += 1;
                continue;
            }
            text.push_str(&source[cursor..edit.start]);
            text.push_str(&edit.text);
            cursor = edit.end;
        }
        text.push_str(&source[cursor..]);

        Applied { text, conflicts }
    }

    fn push(&mut self, start: usize, end: usize, text: String) {
        let seq = self.edits.len();
        self.edits.push(Edit {
            start,
            end,
            text,
            seq,
        });
    }
}
