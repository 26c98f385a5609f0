//! Glue rules: declarative patterns driving the typography pass.
//!
//! A rule is a regular expression, the capture group that marks the span to
//! act on, and the kind of glue to apply there. The built-in set covers
//! Russian typesetting conventions; a JSON rule file can replace it.

use crate::error::{Error, Result};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Environment variable naming a rule file that replaces the built-in set.
pub const RULES_ENV_VAR: &str = "VERSTAK_TYPOGRAF_RULES";

/// Non-breaking space entity used by space replacement.
pub const NBSP: &str = "&nbsp;";

/// Space or non-breaking space.
const SP: &str = "[ \u{a0}]";

/// What a rule does with its capture group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GlueKind {
    /// Wrap the span in a no-break bracket
    Nobr,
    /// Replace the span (a single space) with a non-breaking space
    Nbsp,
    /// Wrap the span in a soft inline-style bracket
    Span,
}

impl GlueKind {
    /// Opening bracket for wrapping kinds.
    pub fn open_tag(self) -> &'static str {
        match self {
            GlueKind::Nobr => "[nobr]",
            GlueKind::Span => "<span>",
            GlueKind::Nbsp => "",
        }
    }

    /// Closing bracket for wrapping kinds.
    pub fn close_tag(self) -> &'static str {
        match self {
            GlueKind::Nobr => "[/nobr]",
            GlueKind::Span => "</span>",
            GlueKind::Nbsp => "",
        }
    }

    /// Name used in rule files.
    pub fn as_str(self) -> &'static str {
        match self {
            GlueKind::Nobr => "nobr",
            GlueKind::Nbsp => "nbsp",
            GlueKind::Span => "span",
        }
    }
}

impl fmt::Display for GlueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GlueKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "nobr" | "join" => Ok(GlueKind::Nobr),
            "nbsp" | "space" | "space-replace" | "space_replace" => Ok(GlueKind::Nbsp),
            "span" | "emphasize" | "emphasise" => Ok(GlueKind::Span),
            _ => Err(Error::UnknownGlueKind(s.to_string())),
        }
    }
}

/// How malformed rule sections are treated while loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Fail on the first malformed section
    Strict,
    /// Log a warning and skip malformed sections
    #[default]
    Lenient,
}

/// A single configured glue rule.
#[derive(Debug, Clone)]
pub struct GlueRule {
    /// Section name
    pub name: String,
    /// Action to take on the capture group
    pub kind: GlueKind,
    /// Index of the actionable capture group
    pub group: usize,
    regex: Regex,
}

impl GlueRule {
    /// Compile a rule, checking that the capture group exists.
    pub fn new(
        name: impl Into<String>,
        kind: GlueKind,
        group: usize,
        pattern: &str,
        ignore_case: bool,
    ) -> Result<Self> {
        let name = name.into();
        let regex = RegexBuilder::new(pattern)
            .multi_line(true)
            .case_insensitive(ignore_case)
            .build()
            .map_err(|e| Error::InvalidRule {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        if group >= regex.captures_len() {
            return Err(Error::InvalidRule {
                reason: format!(
                    "group {} does not exist (pattern has {})",
                    group,
                    regex.captures_len() - 1
                ),
                name,
            });
        }
        Ok(Self {
            name,
            kind,
            group,
            regex,
        })
    }

    /// The compiled pattern.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Byte ranges of the capture group for every match in `text`.
    ///
    /// Matches where the group did not participate are skipped.
    pub fn spans(&self, text: &str) -> Vec<(usize, usize)> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| caps.get(self.group))
            .map(|m| (m.start(), m.end()))
            .collect()
    }
}

/// One section of a rule file.
#[derive(Debug, Deserialize)]
struct RuleSection {
    pattern: String,
    group: usize,
    kind: String,
    #[serde(default)]
    ignore_case: bool,
}

/// Top level of a rule file.
#[derive(Debug, Deserialize)]
struct RuleFile {
    sections: BTreeMap<String, serde_json::Value>,
}

/// An ordered set of glue rules.
#[derive(Debug, Clone, Default)]
pub struct TypographyRuleSet {
    rules: Vec<GlueRule>,
}

impl TypographyRuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in Russian rule set.
    pub fn builtin() -> Self {
        let sp = SP;
        let nbsp = NBSP;
        let word = "[A-Za-zА-Яа-я]+";
        let cyr = "А-ЯЁа-яё";
        let particles = "(ли|ль|же|ж|бы|б)";
        let pair = |left: &str, right: &str| {
            format!("(^|[^{cyr}]){left}({sp}){right}([^{cyr}]|$)")
        };

        let table: Vec<(&str, GlueKind, usize, String, bool)> = vec![
            (
                "nbsp-degrees",
                GlueKind::Nbsp,
                2,
                format!("(^|[0-9]+)({sp})°C"),
                false,
            ),
            (
                "nbsp-particle",
                GlueKind::Nbsp,
                1,
                format!("[{cyr}]({sp}){particles}[^{cyr}]"),
                false,
            ),
            (
                "nbsp-thousands",
                GlueKind::Nbsp,
                2,
                format!("(^|[^0-9—])[0-9,]+({sp})(тыс|млн|млрд|трлн)"),
                false,
            ),
            (
                "nbsp-number-word",
                GlueKind::Nbsp,
                2,
                format!("(^|[^—0-9])[0-9][0-9,]*[0-9][0-9]({sp}){word}"),
                false,
            ),
            (
                "nbsp-preposition",
                GlueKind::Nbsp,
                3,
                format!(
                    "(^|[^{cyr}—\\-])(без|при|над|под|про|для|уже)({sp})({word}|[0-9]+)"
                ),
                true,
            ),
            ("nbsp-pair-tak-i", GlueKind::Nbsp, 2, pair("[Тт]ак", "и"), false),
            ("nbsp-pair-kak-i", GlueKind::Nbsp, 2, pair("[Кк]ак", "и"), false),
            ("nbsp-pair-vse-ravno", GlueKind::Nbsp, 2, pair("[Вв]се", "равно"), false),
            ("nbsp-pair-krome-togo", GlueKind::Nbsp, 2, pair("[Кк]роме", "того"), false),
            (
                "nobr-hyphen-particle",
                GlueKind::Nobr,
                2,
                format!("(^|[^{cyr}])({word}{sp}?-{sp}?(то|либо|нибудь|ка))([^{cyr}]|$)"),
                false,
            ),
            (
                "nobr-range",
                GlueKind::Nobr,
                1,
                format!(
                    "([0-9]+[0-9, ]*{sp}?— ?[0-9, ]*[0-9]+{sp}?([A-Za-zА-Яа-я/]+\\.?|[^,.;?'|`~! )(]+))"
                ),
                false,
            ),
            (
                "nobr-fixed",
                GlueKind::Nobr,
                2,
                format!("(^|[^{cyr}])([иИ]з-за|[Вв]се-таки|т\\. ?д\\.|т\\. ?п\\.)"),
                false,
            ),
            (
                "nobr-adverb-prefix",
                GlueKind::Nobr,
                2,
                format!("(^|[^{cyr}])((По|В|Во|во|в|по){sp}?-{sp}?{word})[^{cyr}]"),
                false,
            ),
            (
                "span-particle",
                GlueKind::Span,
                2,
                format!("(^|[^{cyr}])([{cyr}]+({nbsp}|{sp}){particles})([^{cyr}]|$)"),
                false,
            ),
        ];

        let mut set = Self::new();
        for (name, kind, group, pattern, ignore_case) in table {
            match GlueRule::new(name, kind, group, &pattern, ignore_case) {
                Ok(rule) => set.push(rule),
                Err(e) => log::error!("built-in typography rule rejected: {}", e),
            }
        }
        set
    }

    /// Parse a JSON rule file.
    ///
    /// Sections are applied in name order. In lenient mode a malformed
    /// section is logged and skipped; in strict mode it fails the load.
    pub fn from_json_str(json: &str, mode: LoadMode) -> Result<Self> {
        let file: RuleFile = serde_json::from_str(json)?;
        let mut set = Self::new();

        for (name, value) in file.sections {
            match Self::parse_section(&name, value) {
                Ok(rule) => set.push(rule),
                Err(e) if mode == LoadMode::Lenient => {
                    log::warn!("skipping typography rule: {}", e);
                }
                Err(e) => return Err(e),
            }
        }

        log::debug!("loaded {} typography rules", set.len());
        Ok(set)
    }

    /// Load a JSON rule file from disk.
    pub fn from_file<P: AsRef<Path>>(path: P, mode: LoadMode) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        log::debug!("reading typography rules from {}", path.as_ref().display());
        Self::from_json_str(&json, mode)
    }

    /// Load the rule file named by [`RULES_ENV_VAR`], or the built-in set
    /// when the variable is unset or empty.
    pub fn from_env(mode: LoadMode) -> Result<Self> {
        match std::env::var(RULES_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim(), mode),
            _ => Ok(Self::builtin()),
        }
    }

    fn parse_section(name: &str, value: serde_json::Value) -> Result<GlueRule> {
        let section: RuleSection =
            serde_json::from_value(value).map_err(|e| Error::InvalidRule {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        let kind: GlueKind = section.kind.parse()?;
        GlueRule::new(
            name,
            kind,
            section.group,
            &section.pattern,
            section.ignore_case,
        )
    }

    /// Add a rule to the end of the set.
    pub fn push(&mut self, rule: GlueRule) {
        self.rules.push(rule);
    }

    /// All rules in application order.
    pub fn rules(&self) -> &[GlueRule] {
        &self.rules
    }

    /// Rules of a single kind.
    pub fn of_kind(&self, kind: GlueKind) -> impl Iterator<Item = &GlueRule> {
        self.rules.iter().filter(move |r| r.kind == kind)
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the set holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
