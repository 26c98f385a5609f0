//! Integration tests for building the typed tree.

use verstak::model::Inline;
use verstak::parser::{self, BuildOptions};
use verstak::source::{SourceCell, SourceRow};
use verstak::{
    parse_files, parse_str, Error, Part, SourceDocument, SourceParagraph, SourceRun, SourceTable,
    TableItem, TableKind, TypographyRuleSet, Verstak,
};

fn plain() -> BuildOptions {
    BuildOptions::default().without_typography()
}

#[test]
fn test_json_source_tree() {
    let json = r#"{
        "relationships": { "rId7": "https://example.com/docs" },
        "body": [
            { "type": "paragraph", "style": "Title",
              "elements": [ { "type": "run", "text": "Заголовок" } ] },
            { "type": "paragraph",
              "elements": [
                { "type": "run", "text": "Читайте " },
                { "type": "hyperlink", "rel_id": "rId7", "text": "документацию" },
                { "type": "run", "text": " и", "bold": false }
              ] }
        ]
    }"#;

    let source = SourceDocument::from_json_str(json).unwrap();
    let doc = parser::build(&source, &plain()).unwrap();

    assert_eq!(doc.title().as_deref(), Some("Заголовок"));
    let paragraph = doc.paragraphs().next().unwrap();
    assert_eq!(
        paragraph.parts,
        vec![
            Inline::text_span("Читайте "),
            Inline::link("документацию", "https://example.com/docs"),
            Inline::text_span(" и"),
        ]
    );
}

#[test]
fn test_only_first_heading_excluded() {
    let mut source = SourceDocument::new();
    source.push_paragraph(SourceParagraph::styled("Heading 1").run(SourceRun::new("Один")));
    source.push_paragraph(SourceParagraph::styled("Heading 1").run(SourceRun::new("Два")));

    let doc = parser::build(&source, &plain()).unwrap();
    assert_eq!(doc.title().as_deref(), Some("Один"));
    assert_eq!(doc.len(), 1);
    assert!(doc.paragraphs().next().unwrap().is_title);
}

#[test]
fn test_titles_disabled() {
    let mut source = SourceDocument::new();
    source.push_paragraph(SourceParagraph::styled("Heading 1").run(SourceRun::new("Один")));

    let doc = parser::build(&source, &plain().with_titles(false)).unwrap();
    assert!(doc.title().is_none());
    assert_eq!(doc.len(), 1);
}

#[test]
fn test_empty_table_produces_nothing() {
    let mut source = SourceDocument::new();
    source.push_table(SourceTable::with_widths([1000.0]).row(SourceRow::from_strings(["x"])));
    source.push_table(SourceTable::with_widths([1000.0, 1000.0]));

    let doc = parser::build(&source, &plain()).unwrap();
    let table = doc.tables().next().unwrap();
    assert_eq!(table.kind, TableKind::None);
    assert!(table.is_empty());
}

#[test]
fn test_callout_with_nested_pole() {
    let nested = SourceTable::with_widths([4000.0, 2000.0]).row(SourceRow::from_strings([
        "Основной длинный текст строки",
        "сноска",
    ]));
    let cell = SourceCell {
        content: vec![
            verstak::source::CellElement::Paragraph(SourceParagraph::with_text("Плашка")),
            verstak::source::CellElement::Table(nested),
        ],
    };

    let mut source = SourceDocument::new();
    source.push_table(SourceTable::with_widths([1000.0]).row(SourceRow::from_strings(["cover"])));
    source.push_table(SourceTable::with_widths([9000.0]).row(SourceRow::new(vec![cell])));

    let doc = parser::build(&source, &plain()).unwrap();
    let table = doc.tables().next().unwrap();
    assert_eq!(table.kind, TableKind::Callout);

    match &table.items[0] {
        TableItem::Callout(callout) => {
            assert_eq!(callout.title.as_ref().map(|p| p.text()).as_deref(), Some("Плашка"));
            assert!(matches!(callout.parts[0], TableItem::Pole(_)));
        }
        other => panic!("expected callout, got {:?}", other),
    }
}

#[test]
fn test_internal_domain_option() {
    let table = SourceTable::with_widths([4000.0, 2000.0]).row(SourceRow::new(vec![
        SourceCell::text("Основной длинный текст строки"),
        SourceCell::paragraphs(vec![SourceParagraph::new().hyperlink("rId1", "сайт")]),
    ]));
    let mut source = SourceDocument::new().with_relationship("rId1", "https://docs.example.org/a");
    source.push_table(SourceTable::with_widths([1000.0]).row(SourceRow::from_strings(["cover"])));
    source.push_table(table);

    let doc = parser::build(&source, &plain()).unwrap();
    match &doc.tables().next().unwrap().items[0] {
        TableItem::Pole(pole) => assert_eq!(pole.url.as_deref(), Some("https://docs.example.org/a")),
        other => panic!("expected pole, got {:?}", other),
    }

    let options = plain().with_internal_domain("example.org");
    let doc = parser::build(&source, &options).unwrap();
    match &doc.tables().next().unwrap().items[0] {
        TableItem::Pole(pole) => {
            assert!(pole.url.is_none());
            assert!(pole.right.is_empty());
            assert_eq!(pole.removed_parts.len(), 1);
        }
        other => panic!("expected pole, got {:?}", other),
    };
}

#[test]
fn test_grid_keeps_cell_paragraphs() {
    let mut source = SourceDocument::new();
    source.push_table(SourceTable::with_widths([1000.0]).row(SourceRow::from_strings(["cover"])));
    source.push_paragraph(SourceParagraph::with_text("Таблица"));
    source.push_table(
        SourceTable::with_widths([1000.0, 1000.0, 1000.0])
            .row(SourceRow::from_strings(["a", "b", "c"]))
            .row(SourceRow::new(vec![SourceCell::paragraphs(vec![
                SourceParagraph::with_text("d"),
                SourceParagraph::with_text("e"),
            ])])),
    );

    let doc = parser::build(&source, &plain()).unwrap();
    assert!(doc.parts[0].as_paragraph().unwrap().is_title);
    assert!(doc.parts[1].is_grid());

    let Part::Table(table) = &doc.parts[1] else {
        panic!("expected table");
    };
    let TableItem::Grid(grid) = &table.items[0] else {
        panic!("expected grid");
    };
    assert!(grid.header.is_none());
    assert_eq!(grid.rows.len(), 2);
    assert_eq!(grid.column_count(), 3);
    assert_eq!(grid.rows[1].cells[0].text(), "d\ne");
}

#[test]
fn test_strict_and_lenient_relationships() {
    let mut source = SourceDocument::new();
    source.push_paragraph(SourceParagraph::new().hyperlink("rId404", "нет"));

    let result = Verstak::new()
        .with_rules(TypographyRuleSet::new())
        .build(&source);
    assert!(matches!(result, Err(Error::MissingRelationship(_))));

    let result = Verstak::new()
        .lenient()
        .with_rules(TypographyRuleSet::new())
        .build(&source)
        .unwrap();
    assert_eq!(result.to_markup().unwrap(), "нет");
}

#[test]
fn test_parse_files_in_parallel() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = Vec::new();
    for i in 0..4 {
        let path = dir.path().join(format!("doc{}.json", i));
        std::fs::write(
            &path,
            format!(
                r#"{{"body":[{{"type":"paragraph","elements":[{{"type":"run","text":"документ {}"}}]}}]}}"#,
                i
            ),
        )
        .unwrap();
        paths.push(path);
    }
    paths.push(dir.path().join("missing.json"));

    let results = parse_files(&paths, &plain(), &TypographyRuleSet::builtin());
    assert_eq!(results.len(), 5);
    for (i, result) in results.iter().take(4).enumerate() {
        let doc = result.as_ref().unwrap();
        assert_eq!(doc.paragraphs().next().unwrap().text(), format!("документ {}", i));
    }
    assert!(matches!(results[4], Err(Error::Io(_))));
}

#[test]
fn test_parse_str_bad_element() {
    let json = r#"{"body":[{"type":"chart"}]}"#;
    assert!(matches!(parse_str(json), Err(Error::Json(_))));
}
