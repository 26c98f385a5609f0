//! Integration tests for the typography engine and rule loading.

use std::io::Write;

use verstak::typograf::{Typograf, RULES_ENV_VAR};
use verstak::{Error, GlueKind, LoadMode, TypographyRuleSet};

const RULE_FILE: &str = r#"{
    "sections": {
        "a-units": {
            "pattern": "[0-9]+( )(кг|км)",
            "group": 1,
            "kind": "space-replace"
        },
        "b-brand": {
            "pattern": "(Verstak Pro)",
            "group": 1,
            "kind": "join",
            "ignore_case": true
        },
        "c-broken": {
            "pattern": "(unclosed",
            "group": 1,
            "kind": "nobr"
        }
    }
}"#;

fn rule_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(RULE_FILE.as_bytes()).unwrap();
    file
}

#[test]
fn test_rule_file_lenient() {
    let file = rule_file();
    let rules = TypographyRuleSet::from_file(file.path(), LoadMode::Lenient).unwrap();

    assert_eq!(rules.len(), 2);
    assert_eq!(rules.rules()[0].name, "a-units");
    assert_eq!(rules.rules()[0].kind, GlueKind::Nbsp);
    assert_eq!(rules.rules()[1].kind, GlueKind::Nobr);

    let typograf = Typograf::new(&rules);
    let result = typograf.typeset("везём 20 кг в verstak pro", true);
    assert_eq!(result.text, "везём 20&nbsp;кг в [nobr]verstak pro[/nobr]");
    assert!(!result.warning);
}

#[test]
fn test_rule_file_strict() {
    let file = rule_file();
    let result = TypographyRuleSet::from_file(file.path(), LoadMode::Strict);
    assert!(matches!(result, Err(Error::InvalidRule { .. })));
}

#[test]
fn test_rules_from_env() {
    let file = rule_file();
    std::env::set_var(RULES_ENV_VAR, file.path());
    let from_file = TypographyRuleSet::from_env(LoadMode::Lenient).unwrap();
    std::env::remove_var(RULES_ENV_VAR);
    let builtin = TypographyRuleSet::from_env(LoadMode::Lenient).unwrap();

    assert_eq!(from_file.len(), 2);
    assert_eq!(builtin.len(), TypographyRuleSet::builtin().len());
}

#[test]
fn test_missing_rule_file() {
    let result = TypographyRuleSet::from_file("/nonexistent/rules.json", LoadMode::Lenient);
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_text_outside_markup_is_preserved() {
    let rules = TypographyRuleSet::builtin();
    let typograf = Typograf::new(&rules);

    let samples = [
        "много денег 12 009 — 17 877 ₽ или мало",
        "бла-бла, и т. д., и т.п.",
        "Как бы я хотел этого",
        "что-нибудь я сделаю про себя",
    ];
    for sample in samples {
        let result = typograf.typeset(sample, true);
        let stripped = result
            .text
            .replace("[nobr]", "")
            .replace("[/nobr]", "")
            .replace("<span>", "")
            .replace("</span>", "")
            .replace("&nbsp;", " ");
        assert_eq!(stripped, sample);
    }
}

#[test]
fn test_typeset_is_deterministic() {
    let rules = TypographyRuleSet::builtin();
    let typograf = Typograf::new(&rules);
    let text = "1,5—2 часа про себя, как бы то ни было";

    assert_eq!(
        typograf.typeset(text, true).text,
        typograf.typeset(text, true).text
    );
}

fn strip_glue(text: &str) -> String {
    text.replace("[nobr]", "")
        .replace("[/nobr]", "")
        .replace("<span>", "")
        .replace("</span>", "")
        .replace("&nbsp;", " ")
}

#[test]
fn test_many_matches_keep_surrounding_text() {
    let rules = TypographyRuleSet::builtin();
    let typograf = Typograf::new(&rules);
    let sentence = "Как бы то ни было, что-нибудь из-за 12 009 — 17 877 ₽ \
        про себя, кроме того 25 °C и т. д. Всё-таки 678 678 рублей.";

    let result = typograf.typeset(sentence, true);
    assert!(result.text.matches("[nobr]").count() >= 3);
    assert!(result.text.matches("&nbsp;").count() >= 4);
    assert!(result.text.contains("<span>"));
    assert_eq!(strip_glue(&result.text), sentence);

    for repeat in 1..=4 {
        let text = vec![sentence; repeat].join(" ");
        let result = typograf.typeset(&text, true);
        assert_eq!(strip_glue(&result.text), text);
        assert_eq!(
            result.text.matches("[nobr]").count(),
            result.text.matches("[/nobr]").count()
        );
    }
}
