//! Typography engine: non-breaking joins for Russian text.
//!
//! The engine runs three passes over a text span, each on the output of
//! the previous one:
//!
//! 1. **join**: wrap matched spans in `[nobr]...[/nobr]`
//! 2. **space-replace**: replace matched spaces with `&nbsp;`
//! 3. **emphasize**: wrap word + particle pairs in `<span>...</span>`
//!
//! The emphasize pass must see the `&nbsp;` inserted by the second pass,
//! so the order is fixed. Within a pass all matches are collected against
//! the same text and spliced in one go through [`TextEdits`].
//!
//! # Example
//!
//! ```
//! use verstak::typograf::{Typograf, TypographyRuleSet};
//!
//! let rules = TypographyRuleSet::builtin();
//! let typograf = Typograf::new(&rules);
//! let result = typograf.typeset("что-нибудь я сделаю", true);
//! assert_eq!(result.text, "[nobr]что-нибудь[/nobr] я сделаю");
//! ```

mod edits;
mod rules;

pub use edits::{Applied, TextEdits};
pub use rules::{GlueKind, GlueRule, LoadMode, TypographyRuleSet, NBSP, RULES_ENV_VAR};

use std::collections::BTreeSet;

/// Result of typesetting one text span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Typeset {
    /// Text with glue markup inserted
    pub text: String,
    /// Some matches crossed each other or collided, so the glue may be off
    pub warning: bool,
}

/// Applies a rule set to text.
#[derive(Debug, Clone, Copy)]
pub struct Typograf<'a> {
    rules: &'a TypographyRuleSet,
}

impl<'a> Typograf<'a> {
    /// Create an engine over a rule set.
    pub fn new(rules: &'a TypographyRuleSet) -> Self {
        Self { rules }
    }

    /// The rule set in use.
    pub fn rules(&self) -> &TypographyRuleSet {
        self.rules
    }

    /// Run all three passes over `text`.
    ///
    /// With `nobr_enabled == false` the join pass is skipped.
    pub fn typeset(&self, text: &str, nobr_enabled: bool) -> Typeset {
        let mut warning = false;
        let mut current = text.to_string();

        if nobr_enabled {
            let (next, warn) = self.wrap_pass(&current, GlueKind::Nobr);
            current = next;
            warning |= warn;
        }

        let (next, warn) = self.space_pass(&current);
        current = next;
        warning |= warn;

        let (next, warn) = self.wrap_pass(&current, GlueKind::Span);
        current = next;
        warning |= warn;

        Typeset {
            text: current,
            warning,
        }
    }

    /// Sorted intervals matched by the rules of a wrapping kind.
    pub fn intervals(&self, text: &str, kind: GlueKind) -> Vec<(usize, usize)> {
        let mut intervals: Vec<(usize, usize)> = self
            .rules
            .of_kind(kind)
            .flat_map(|rule| rule.spans(text))
            .collect();
        intervals.sort_unstable();
        intervals
    }

    /// Distinct space ranges matched by the space-replace rules.
    pub fn space_offsets(&self, text: &str) -> Vec<(usize, usize)> {
        let offsets: BTreeSet<(usize, usize)> = self
            .rules
            .of_kind(GlueKind::Nbsp)
            .flat_map(|rule| rule.spans(text))
            .collect();
        offsets.into_iter().collect()
    }

    fn wrap_pass(&self, text: &str, kind: GlueKind) -> (String, bool) {
        let intervals = self.intervals(text, kind);
        if intervals.is_empty() {
            return (text.to_string(), false);
        }

        let mut crossing = false;
        let mut reach = 0;
        let mut edits = TextEdits::new();
        for &(start, end) in &intervals {
            if start < reach && end > reach {
                log::debug!("{} intervals cross at {}..{}", kind, start, end);
                crossing = true;
            }
            reach = reach.max(end);
            edits.wrap(start, end, kind.open_tag(), kind.close_tag());
        }

        let applied = edits.apply(text);
        (applied.text, crossing || applied.conflicts > 0)
    }

    fn space_pass(&self, text: &str) -> (String, bool) {
        let offsets = self.space_offsets(text);
        if offsets.is_empty() {
            return (text.to_string(), false);
        }

        let mut edits = TextEdits::new();
        for (start, end) in offsets {
            edits.replace(start, end, NBSP);
        }

        let applied = edits.apply(text);
        if applied.conflicts > 0 {
            log::debug!("{} space replacements collided", applied.conflicts);
        }
        (applied.text, applied.conflicts > 0)
    }
}
