//! HTML rendering.
//!
//! Produces `<h2>`/`<p>`/`<strong>`/`<table>` elements mixed with bracket
//! tags (`[ul]`, `[ol type=milchin]`, `[hl]`, `[aside]`) that a publishing
//! system expands later. Text is emitted as-is, without escaping.

use crate::error::Result;
use crate::model::{
    AnnotationPair, Callout, Document, GenericGrid, GridRow, Inline, ListKind, Paragraph, Part,
    Table, TableItem, TableKind,
};
use log::warn;

use super::lines::split_lines;
use super::options::TABLE_STUB;
use super::{RenderOptions, RenderResult, RenderStats};

const TABLE_HEADING_OPEN: &str = "<h3 class=\"table-heading\">";

/// Convert a document to HTML.
pub fn to_html(doc: &Document, options: &RenderOptions) -> Result<String> {
    let renderer = HtmlRenderer::new(options.clone());
    renderer.render(doc)
}

/// Convert a document to HTML with statistics.
pub fn to_html_with_stats(doc: &Document, options: &RenderOptions) -> Result<RenderResult> {
    let renderer = HtmlRenderer::new(options.clone());
    renderer.render_with_stats(doc)
}

/// Open list wrapper while walking a part sequence.
///
/// List items are appended to the block holding the opening tag; the closing
/// tag goes at the end of the last block when a non-list part shows up.
#[derive(Debug, Default)]
struct ListWrapper {
    open: Option<ListKind>,
}

impl ListWrapper {
    fn push_item(&mut self, blocks: &mut Vec<String>, kind: ListKind, html: &str) {
        if self.open != Some(kind) {
            self.close(blocks);
            blocks.push(format!("{}\n", kind.open_tag()));
            self.open = Some(kind);
        }
        if let Some(last) = blocks.last_mut() {
            last.push_str(html);
            last.push('\n');
        }
    }

    fn close(&mut self, blocks: &mut [String]) {
        if let Some(kind) = self.open.take() {
            if let Some(last) = blocks.last_mut() {
                last.push_str(kind.close_tag());
            }
        }
    }
}

/// HTML renderer.
pub struct HtmlRenderer {
    options: RenderOptions,
    stats: RenderStats,
}

impl HtmlRenderer {
    /// Create a new HTML renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            stats: RenderStats::new(),
        }
    }

    /// Render a document to HTML.
    pub fn render(mut self, doc: &Document) -> Result<String> {
        Ok(self.render_internal(doc))
    }

    /// Render a document to HTML with statistics.
    pub fn render_with_stats(mut self, doc: &Document) -> Result<RenderResult> {
        self.options.collect_stats = true;
        let content = self.render_internal(doc);
        Ok(RenderResult::new(content, doc.title(), self.stats))
    }

    fn render_internal(&mut self, doc: &Document) -> String {
        let mut blocks: Vec<String> = Vec::new();
        let mut list = ListWrapper::default();

        for part in split_lines(&doc.parts) {
            match &part {
                Part::Paragraph(p) if p.is_blank() => continue,
                Part::Paragraph(p) => {
                    self.count_paragraph(p);
                    match p.list_kind() {
                        Some(kind) => list.push_item(&mut blocks, kind, &self.paragraph(p, false)),
                        None => {
                            list.close(&mut blocks);
                            push_block(&mut blocks, self.paragraph(p, false));
                        }
                    }
                }
                Part::Table(table) => {
                    list.close(&mut blocks);
                    if table.kind == TableKind::GenericGrid {
                        if let Some(last) = blocks.last_mut() {
                            demote_heading(last);
                        }
                    }
                    let html = self.table(table);
                    push_block(&mut blocks, html);
                }
            }
        }
        list.close(&mut blocks);

        let content = blocks.join("\n\n");
        if self.options.collect_stats {
            self.stats.count_text(&content);
        }
        content
    }

    /// HTML for one paragraph.
    ///
    /// Headings shorter than the title limit render as `<h2>` with plain
    /// text; longer ones degrade to a warning paragraph. List items and
    /// pictures get no wrapper.
    fn paragraph(&self, p: &Paragraph, warning: bool) -> String {
        if p.to_markup().is_empty() {
            return String::new();
        }

        if p.is_title {
            let text = self.heading_text(p);
            if p.char_count() < self.options.title_length_limit {
                return format!("<h2>{}</h2>", text);
            }
            warn!(
                "heading of {} characters rendered as a warning paragraph",
                p.char_count()
            );
            return format!("<p class=\"{}\">{}</p>", self.options.warning_class, text);
        }

        if p.is_picture() {
            return p
                .parts
                .iter()
                .filter(|i| i.is_image())
                .map(Inline::to_html)
                .collect::<Vec<_>>()
                .join("\n");
        }

        let inner = leaves_html(p);
        if p.is_list_item() {
            inner
        } else if warning {
            format!("<p class=\"{}\">{}</p>", self.options.warning_class, inner)
        } else {
            format!("<p>{}</p>", inner)
        }
    }

    fn heading_text(&self, p: &Paragraph) -> String {
        let text: String = p
            .parts
            .iter()
            .map(|part| match part {
                Inline::Link(_) if self.options.allow_header_links => part.to_html(),
                Inline::Image(_) => part.to_html(),
                other => other.text().to_string(),
            })
            .collect();
        text.replace('\n', "")
    }

    fn table(&mut self, table: &Table) -> String {
        let blocks: Vec<String> = table
            .items
            .iter()
            .map(|item| self.item(item))
            .filter(|html| !html.is_empty())
            .collect();
        if table.kind == TableKind::GenericGrid {
            blocks.concat()
        } else {
            blocks.join("\n\n")
        }
    }

    fn item(&mut self, item: &TableItem) -> String {
        match item {
            TableItem::Paragraph(p) if p.is_blank() => String::new(),
            TableItem::Paragraph(p) => {
                self.count_paragraph(p);
                self.paragraph(p, false)
            }
            TableItem::Pole(pole) => self.pole(pole),
            TableItem::Callout(callout) => self.callout(callout),
            TableItem::Grid(grid) => self.grid(grid),
        }
    }

    fn pole(&mut self, pole: &AnnotationPair) -> String {
        if self.options.collect_stats {
            self.stats.pole_count += 1;
        }
        let mut lines: Vec<String> = pole
            .left
            .iter()
            .filter(|p| !p.is_blank())
            .map(|p| self.paragraph(p, false))
            .collect();

        let aside: String = pole
            .right
            .iter()
            .filter(|p| !p.is_blank())
            .map(|p| self.paragraph(p, false))
            .collect();
        let open = match &pole.url {
            Some(url) => format!("[aside url=\"{}\"]", url),
            None => "[aside]".to_string(),
        };
        lines.push(format!("{}{}[/aside]", open, aside));
        lines.join("\n")
    }

    fn callout(&mut self, callout: &Callout) -> String {
        if self.options.collect_stats {
            self.stats.callout_count += 1;
        }
        let mut blocks = vec!["[hl]".to_string()];
        if let Some(title) = callout.title.as_ref().filter(|t| !t.is_blank()) {
            if title.char_count() <= self.options.title_length_limit {
                blocks[0] = format!("[hl title=\"{}\"]", title.text());
            } else {
                warn!(
                    "callout title of {} characters rendered as a warning paragraph",
                    title.char_count()
                );
                blocks.push(self.paragraph(title, true));
            }
        }

        let mut list = ListWrapper::default();
        for item in &callout.parts {
            match item {
                TableItem::Paragraph(p) if p.is_blank() => continue,
                TableItem::Paragraph(p) if p.is_list_item() => {
                    self.count_paragraph(p);
                    if let Some(kind) = p.list_kind() {
                        list.push_item(&mut blocks, kind, &self.paragraph(p, false));
                    }
                }
                other => {
                    list.close(&mut blocks);
                    let html = self.item(other);
                    push_block(&mut blocks, html);
                }
            }
        }
        list.close(&mut blocks);
        blocks.push("[/hl]".to_string());
        blocks.join("\n")
    }

    fn grid(&mut self, grid: &GenericGrid) -> String {
        if self.options.collect_stats {
            self.stats.grid_count += 1;
        }
        if self.options.skip_tables {
            return format!("<p>{}</p>", TABLE_STUB);
        }

        let columns = grid.column_count();
        let mut lines = vec!["<table>".to_string()];
        if let Some(header) = &grid.header {
            lines.push("<thead>".to_string());
            lines.push(grid_row(header, columns, "th"));
            lines.push("</thead>".to_string());
        }
        lines.push("<tbody>".to_string());
        for row in &grid.rows {
            lines.push(grid_row(row, columns, "td"));
        }
        lines.push("</tbody>".to_string());
        lines.push("</table>".to_string());
        lines.join("\n")
    }

    fn count_paragraph(&mut self, p: &Paragraph) {
        if self.options.collect_stats {
            self.stats.count_paragraph(p);
        }
    }
}

fn push_block(blocks: &mut Vec<String>, html: String) {
    if !html.is_empty() {
        blocks.push(html);
    }
}

/// Turn a rendered `<h2>` heading into the table heading form.
fn demote_heading(block: &mut String) {
    if let Some(inner) = block
        .strip_prefix("<h2>")
        .and_then(|rest| rest.strip_suffix("</h2>"))
    {
        *block = format!("{}{}</h3>", TABLE_HEADING_OPEN, inner);
    }
}

fn leaves_html(p: &Paragraph) -> String {
    p.parts
        .iter()
        .map(Inline::to_html)
        .collect::<String>()
        .replace('\n', "")
}

fn grid_row(row: &GridRow, columns: usize, tag: &str) -> String {
    let mut out = String::from("<tr>");
    for index in 0..columns {
        let content = row
            .cells
            .get(index)
            .map(|cell| {
                cell.paragraphs
                    .iter()
                    .filter(|p| !p.is_blank())
                    .map(leaves_html)
                    .collect::<Vec<_>>()
                    .join("<br>")
            })
            .unwrap_or_default();
        out.push_str(&format!("<{tag}>{content}</{tag}>"));
    }
    out.push_str("</tr>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GridCell, Image, ListMarker, TextSpan};

    fn render(doc: &Document) -> String {
        to_html(doc, &RenderOptions::default()).unwrap()
    }

    fn item(kind: ListKind, text: &str) -> Paragraph {
        Paragraph::with_parts(vec![
            Inline::ListMarker(ListMarker::new(0, kind)),
            Inline::text_span(text),
        ])
    }

    #[test]
    fn test_paragraph_and_heading() {
        let mut doc = Document::new();
        doc.push_paragraph(Paragraph::heading("Раздел", 1));
        doc.push_paragraph(Paragraph::with_parts(vec![
            Inline::text_span("это "),
            Inline::bold("важно"),
        ]));
        assert_eq!(render(&doc), "<h2>Раздел</h2>\n\n<p>это <strong>важно</strong></p>");
    }

    #[test]
    fn test_long_heading_degrades() {
        let mut doc = Document::new();
        doc.push_paragraph(Paragraph::heading("а".repeat(90), 1));
        assert_eq!(
            render(&doc),
            format!("<p class=\"verstak_warning\">{}</p>", "а".repeat(90))
        );

        let mut doc = Document::new();
        doc.push_paragraph(Paragraph::heading("а".repeat(89), 1));
        assert!(render(&doc).starts_with("<h2>"));
    }

    #[test]
    fn test_header_links() {
        let mut heading = Paragraph::with_parts(vec![
            Inline::text_span("см. "),
            Inline::link("сайт", "https://example.com"),
        ]);
        heading.set_title(1);
        let mut doc = Document::new();
        doc.push_paragraph(heading);

        assert_eq!(render(&doc), "<h2>см. сайт</h2>");
        let options = RenderOptions::default().with_header_links(true);
        assert_eq!(
            to_html(&doc, &options).unwrap(),
            "<h2>см. {сайт}(https://example.com)</h2>"
        );
    }

    #[test]
    fn test_list_wrapper() {
        let mut doc = Document::new();
        doc.push_paragraph(item(ListKind::Bullet, "один"));
        doc.push_paragraph(Paragraph::new());
        doc.push_paragraph(item(ListKind::Bullet, "два"));
        doc.push_paragraph(Paragraph::with_text("после"));
        doc.push_paragraph(item(ListKind::Numeric, "Три."));

        assert_eq!(
            render(&doc),
            "[ul]\nодин\nдва\n[/ul]\n\n<p>после</p>\n\n[ol type=milchin]\nТри.\n[/ol]"
        );
    }

    #[test]
    fn test_pictures_one_per_line() {
        let mut doc = Document::new();
        doc.push_paragraph(Paragraph::with_parts(vec![
            Inline::Image(Image {
                caption: vec![Inline::text_span("Рис. 1")],
            }),
            Inline::Image(Image::new()),
        ]));
        assert_eq!(
            render(&doc),
            "[img src=\"placeholder1400\" prop=\"\" caption=\"Рис. 1\"]\n[img src=\"placeholder1400\" prop=\"\" caption=\"\"]"
        );
    }

    #[test]
    fn test_grid_heading_and_table() {
        let grid = GenericGrid {
            header: Some(GridRow::new(vec![
                GridCell::new(vec![Paragraph::with_parts(vec![Inline::bold("Год")])]),
                GridCell::new(vec![Paragraph::with_parts(vec![Inline::bold("Сумма")])]),
            ])),
            rows: vec![GridRow::new(vec![
                GridCell::new(vec![Paragraph::with_text("2020")]),
                GridCell::new(vec![
                    Paragraph::with_text("10"),
                    Paragraph::new(),
                    Paragraph::with_text("20"),
                ]),
            ])],
        };
        let mut doc = Document::new();
        doc.push_paragraph(Paragraph::heading("Итоги", 2));
        doc.push_table(Table {
            kind: TableKind::GenericGrid,
            items: vec![TableItem::Grid(grid)],
        });

        assert_eq!(
            render(&doc),
            "<h3 class=\"table-heading\">Итоги</h3>\n\n<table>\n<thead>\n<tr><th><strong>Год</strong></th><th><strong>Сумма</strong></th></tr>\n</thead>\n<tbody>\n<tr><td>2020</td><td>10<br>20</td></tr>\n</tbody>\n</table>"
        );

        let options = RenderOptions::default().with_skip_tables(true);
        assert_eq!(
            to_html(&doc, &options).unwrap(),
            "<h3 class=\"table-heading\">Итоги</h3>\n\n<p>## BIG TABLE</p>"
        );
    }

    #[test]
    fn test_callout() {
        let callout = Callout {
            title: Some(Paragraph::with_text("Важно")),
            parts: vec![
                TableItem::Paragraph(Paragraph::with_text("Текст")),
                TableItem::Paragraph(item(ListKind::Bullet, "пункт")),
            ],
        };
        let mut doc = Document::new();
        doc.push_table(Table {
            kind: TableKind::Callout,
            items: vec![TableItem::Callout(callout)],
        });
        assert_eq!(
            render(&doc),
            "[hl title=\"Важно\"]\n<p>Текст</p>\n[ul]\nпункт\n[/ul]\n[/hl]"
        );
    }

    #[test]
    fn test_callout_long_title() {
        let callout = Callout {
            title: Some(Paragraph::with_text("б".repeat(91))),
            parts: Vec::new(),
        };
        let html = HtmlRenderer::new(RenderOptions::default()).callout(&callout);
        assert_eq!(
            html,
            format!("[hl]\n<p class=\"verstak_warning\">{}</p>\n[/hl]", "б".repeat(91))
        );
    }

    #[test]
    fn test_pole() {
        let pole = AnnotationPair {
            left: vec![Paragraph::with_text("Термин"), Paragraph::new()],
            right: vec![Paragraph::with_text("Пояснение")],
            url: Some("https://example.com".to_string()),
            removed_parts: Vec::new(),
        };
        let html = HtmlRenderer::new(RenderOptions::default()).pole(&pole);
        assert_eq!(
            html,
            "<p>Термин</p>\n[aside url=\"https://example.com\"]<p>Пояснение</p>[/aside]"
        );
    }

    #[test]
    fn test_glue_warning_span() {
        let mut span = TextSpan::new("текст");
        span.has_non_break_warning = true;
        let mut doc = Document::new();
        doc.push_paragraph(Paragraph::with_parts(vec![Inline::Text(span)]));

        let result = to_html_with_stats(&doc, &RenderOptions::default()).unwrap();
        assert_eq!(
            result.content,
            "<p><span class=\"verstak_glue_warning\">текст</span></p>"
        );
        assert_eq!(result.stats.glue_warning_count, 1);
    }

    #[test]
    fn test_render_is_repeatable() {
        let mut doc = Document::new();
        doc.push_paragraph(Paragraph::with_text("раз\nдва"));
        doc.push_paragraph(item(ListKind::Bullet, "пункт"));
        assert_eq!(render(&doc), render(&doc));
        assert_eq!(render(&doc), "<p>раз</p>\n\n<p>два</p>\n\n[ul]\nпункт\n[/ul]");
    }
}
