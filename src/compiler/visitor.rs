//! Tag-dispatch walk from [`RichTextNode`] to [`DocumentElement`]s.
//!
//! The walk is a pure function of the tree and the default colour. Character
//! formatting travels down as an immutable [`Format`] value; every level
//! derives its own copy and returns what it produced, so nothing is shared
//! between siblings.

use super::image::{ImageSource, resolve_image};
use super::RichTextNode;
use crate::ir::{Cell, DocumentElement, ImageElement, Indent, Paragraph, Row, Table, TextRun};
use crate::style::{Alignment, StyleAttributes, resolve};

/// Hyperlink blue.
pub const LINK_COLOR: &str = "0563C1";

const HEADER_SHADING: &str = "D9E2F3";
const CODE_SHADING: &str = "F2F2F2";
const CODE_FONT: &str = "Courier New";
const LIST_INDENT: i32 = 720;
const BLOCKQUOTE_INDENT: i32 = 720;

/// Visited in place, as if their children were ours.
const CONTAINER_TAGS: &[&str] = &[
    "html", "body", "div", "section", "article", "header", "footer", "main", "figure", "thead",
    "tbody", "tfoot",
];

/// Gathered into the surrounding paragraph at block level.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "big", "br", "cite", "del", "dfn", "em", "font", "i", "img", "ins", "kbd",
    "label", "mark", "q", "s", "samp", "small", "span", "strike", "strong", "sub", "sup", "time",
    "tt", "u", "var",
];

/// Convert a markup tree into document elements.
///
/// `default_color` is applied to headings that neither set nor inherit a
/// colour. Never fails; unsupported content degrades to plain text, a
/// placeholder run, or nothing.
pub fn convert(tree: &RichTextNode, default_color: Option<&str>) -> Vec<DocumentElement> {
    let walker = Walker {
        default_color: default_color.map(str::to_ascii_uppercase),
    };
    walker.blocks(std::slice::from_ref(tree), &Format::default())
}

/// Inherited character formatting plus the inherited text alignment.
#[derive(Debug, Clone, Default)]
struct Format {
    bold: bool,
    italic: bool,
    underline: bool,
    color: Option<String>,
    font_size_pt: Option<f32>,
    font_family: Option<String>,
    alignment: Alignment,
}

impl Format {
    fn with_style(&self, style: &StyleAttributes) -> Format {
        Format {
            bold: style.bold.unwrap_or(self.bold),
            italic: style.italic.unwrap_or(self.italic),
            underline: style.underline.unwrap_or(self.underline),
            color: style.color.clone().or_else(|| self.color.clone()),
            font_size_pt: style.font_size_pt.or(self.font_size_pt),
            font_family: style.font_family.clone().or_else(|| self.font_family.clone()),
            alignment: style.alignment.unwrap_or(self.alignment),
        }
    }

    fn bold(&self) -> Format {
        Format {
            bold: true,
            ..self.clone()
        }
    }

    fn italic(&self) -> Format {
        Format {
            italic: true,
            ..self.clone()
        }
    }

    fn underline(&self) -> Format {
        Format {
            underline: true,
            ..self.clone()
        }
    }

    fn monospace(&self) -> Format {
        Format {
            font_family: Some(CODE_FONT.to_string()),
            ..self.clone()
        }
    }

    fn run(&self, text: &str) -> TextRun {
        TextRun {
            text: text.to_string(),
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
            color: self.color.clone(),
            font_size_pt: self.font_size_pt,
            font_family: self.font_family.clone(),
            is_link: false,
            href: None,
        }
    }
}

/// Inline content before it is cut into paragraphs.
#[derive(Debug)]
enum Inline {
    Run(TextRun),
    Break,
    Image(ImageElement),
}

/// Paragraph-level properties taken from the block's own style.
#[derive(Debug, Clone, Default)]
struct BlockProps {
    alignment: Alignment,
    indent: Indent,
    shading: Option<String>,
}

impl BlockProps {
    fn from_style(style: &StyleAttributes, fmt: &Format) -> Self {
        BlockProps {
            alignment: fmt.alignment,
            indent: Indent {
                left: style.indent_left_units.unwrap_or(0),
                first_line: style.indent_first_line_units.unwrap_or(0),
            },
            shading: style.background_color.clone(),
        }
    }
}

struct Walker {
    default_color: Option<String>,
}

impl Walker {
    fn blocks(&self, nodes: &[RichTextNode], fmt: &Format) -> Vec<DocumentElement> {
        let mut out = Vec::new();
        let mut pending = Vec::new();
        let loose = BlockProps {
            alignment: fmt.alignment,
            ..Default::default()
        };

        for node in nodes {
            if is_inline(node) {
                pending.extend(self.inline(node, fmt));
                continue;
            }
            out.extend(paragraphs(std::mem::take(&mut pending), &loose));
            out.extend(self.block(node, fmt));
        }
        out.extend(paragraphs(pending, &loose));
        out
    }

    fn block(&self, node: &RichTextNode, fmt: &Format) -> Vec<DocumentElement> {
        let RichTextNode::Element { tag, children, .. } = node else {
            return Vec::new();
        };
        let style = style_of(node);
        let fmt = fmt.with_style(&style);

        match tag.as_str() {
            t if CONTAINER_TAGS.contains(&t) => self.blocks(children, &fmt),
            "h1" | "h2" | "h3" | "h4" => {
                let level = tag[1..].parse().unwrap_or(1);
                self.heading(level, children, &fmt)
            }
            "p" => paragraphs(
                self.inline_children(children, &fmt),
                &BlockProps::from_style(&style, &fmt),
            ),
            "ul" | "ol" => {
                let indent = Indent::left(style.indent_left_units.unwrap_or(LIST_INDENT));
                self.list_items(node, indent, &fmt)
            }
            "table" => self.table(node, &fmt).into_iter().collect(),
            "blockquote" => {
                let shift = BLOCKQUOTE_INDENT + style.indent_left_units.unwrap_or(0);
                self.blocks(children, &fmt)
                    .into_iter()
                    .map(|el| shift_indent(el, shift))
                    .collect()
            }
            "pre" | "code" => preformatted(node, &fmt, &style).into_iter().collect(),
            _ => fallback(node, &fmt).into_iter().collect(),
        }
    }

    fn heading(&self, level: u8, children: &[RichTextNode], fmt: &Format) -> Vec<DocumentElement> {
        let fmt = Format {
            color: fmt.color.clone().or_else(|| self.default_color.clone()),
            ..fmt.clone()
        };
        let (runs, images) = split_images(self.inline_children(children, &fmt));
        let runs = normalize_runs(runs);

        let mut out = Vec::with_capacity(1 + images.len());
        if !runs.is_empty() {
            out.push(DocumentElement::Heading { level, runs });
        }
        out.extend(images.into_iter().map(DocumentElement::Image));
        out
    }

    /// One ListItem per `li`. Nested lists are flattened at the outer indent.
    fn list_items(&self, list: &RichTextNode, indent: Indent, fmt: &Format) -> Vec<DocumentElement> {
        let ordered = list.is_tag("ol");
        let start: u32 = list
            .attr("start")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(1);
        let mut out = Vec::new();

        let items = list.children().iter().filter(|c| c.is_tag("li"));
        for (index, li) in items.enumerate() {
            let fmt = fmt.with_style(&style_of(li));
            let (nested, content): (Vec<&RichTextNode>, Vec<&RichTextNode>) = li
                .children()
                .iter()
                .partition(|c| c.is_tag("ul") || c.is_tag("ol"));

            let inlines = content
                .into_iter()
                .flat_map(|c| self.inline(c, &fmt))
                .collect();
            let (runs, images) = split_images(inlines);
            let runs = normalize_runs(runs);

            if !runs.is_empty() {
                let prefix = if ordered {
                    let number = u32::try_from(index)
                        .map_or(u32::MAX, |i| start.saturating_add(i));
                    format!("{number}. ")
                } else {
                    "\u{2022} ".to_string()
                };
                out.push(DocumentElement::ListItem {
                    prefix,
                    runs,
                    indent,
                });
            }
            out.extend(images.into_iter().map(DocumentElement::Image));
            for sublist in nested {
                out.extend(self.list_items(sublist, indent, &fmt));
            }
        }
        out
    }

    fn table(&self, node: &RichTextNode, fmt: &Format) -> Option<DocumentElement> {
        let mut trs = Vec::new();
        collect_rows(node, &mut trs);

        let rows: Vec<Row> = trs
            .into_iter()
            .map(|tr| {
                let fmt = fmt.with_style(&style_of(tr));
                Row {
                    cells: tr
                        .children()
                        .iter()
                        .filter(|c| c.is_tag("td") || c.is_tag("th"))
                        .map(|c| self.cell(c, &fmt))
                        .collect(),
                }
            })
            .filter(|row| !row.cells.is_empty())
            .collect();

        if rows.is_empty() {
            log::debug!("dropping table without cells");
            return None;
        }
        Some(DocumentElement::Table(Table { rows }))
    }

    fn cell(&self, node: &RichTextNode, fmt: &Format) -> Cell {
        let header = node.is_tag("th");
        let style = style_of(node);
        let mut fmt = fmt.with_style(&style);
        if header && style.bold.is_none() {
            fmt = fmt.bold();
        }

        let (runs, images) = split_images(self.inline_children(node.children(), &fmt));
        if !images.is_empty() {
            log::debug!("dropping {} image(s) inside a table cell", images.len());
        }

        Cell {
            runs: normalize_runs(runs),
            header,
            alignment: fmt.alignment,
            background: style
                .background_color
                .or_else(|| header.then(|| HEADER_SHADING.to_string())),
        }
    }

    fn inline_children(&self, children: &[RichTextNode], fmt: &Format) -> Vec<Inline> {
        children.iter().flat_map(|c| self.inline(c, fmt)).collect()
    }

    fn inline(&self, node: &RichTextNode, fmt: &Format) -> Vec<Inline> {
        let (tag, children) = match node {
            RichTextNode::Text(text) => return vec![Inline::Run(fmt.run(text))],
            RichTextNode::Element { tag, children, .. } => (tag, children),
        };
        let style = style_of(node);
        let fmt = fmt.with_style(&style);

        match tag.as_str() {
            "br" => vec![Inline::Break],
            "img" => inline_image(node, fmt.alignment),
            "a" if node.attr("href").is_some() => vec![Inline::Run(link_run(node, &fmt, &style))],
            "strong" | "b" => self.inline_children(children, &fmt.bold()),
            "em" | "i" | "cite" | "dfn" | "var" => self.inline_children(children, &fmt.italic()),
            "u" | "ins" => self.inline_children(children, &fmt.underline()),
            "code" | "kbd" | "samp" | "tt" => self.inline_children(children, &fmt.monospace()),
            t if INLINE_TAGS.contains(&t) => self.inline_children(children, &fmt),
            // A block inside inline context starts a new line.
            _ => {
                let mut out = vec![Inline::Break];
                out.extend(self.inline_children(children, &fmt));
                out
            }
        }
    }
}

fn style_of(node: &RichTextNode) -> StyleAttributes {
    node.attr("style").map(resolve).unwrap_or_default()
}

fn is_inline(node: &RichTextNode) -> bool {
    match node {
        RichTextNode::Text(_) => true,
        RichTextNode::Element { tag, .. } => INLINE_TAGS.contains(&tag.as_str()),
    }
}

/// A hyperlink collapses to one run of its own text, or its href.
fn link_run(node: &RichTextNode, fmt: &Format, style: &StyleAttributes) -> TextRun {
    let href = node.attr("href").unwrap_or_default().trim().to_string();
    let collapsed = collapse_whitespace(&node.text_content());
    let text = match collapsed.trim() {
        "" => href.clone(),
        t => t.to_string(),
    };
    TextRun {
        underline: true,
        color: Some(
            style
                .color
                .clone()
                .unwrap_or_else(|| LINK_COLOR.to_string()),
        ),
        is_link: true,
        href: Some(href),
        ..fmt.run(&text)
    }
}

fn inline_image(node: &RichTextNode, alignment: Alignment) -> Vec<Inline> {
    match resolve_image(node, alignment) {
        ImageSource::Embedded(image) => vec![Inline::Image(image)],
        ImageSource::External(src) => {
            log::warn!("external image cannot be embedded: {src}");
            vec![Inline::Run(placeholder(&format!(
                "[Image not embedded: external source {src}]"
            )))]
        }
        ImageSource::Missing => match node.attr("alt").map(str::trim) {
            Some(alt) if !alt.is_empty() => {
                vec![Inline::Run(placeholder(&format!("[Image: {alt}]")))]
            }
            _ => {
                log::debug!("dropping image without usable data");
                Vec::new()
            }
        },
    }
}

fn placeholder(text: &str) -> TextRun {
    TextRun {
        italic: true,
        ..TextRun::plain(text)
    }
}

/// Cut inline content into paragraphs, hoisting images out between them.
fn paragraphs(inlines: Vec<Inline>, props: &BlockProps) -> Vec<DocumentElement> {
    let mut out = Vec::new();
    let mut segment = Vec::new();

    let flush = |segment: Vec<Inline>, out: &mut Vec<DocumentElement>| {
        let runs = normalize_runs(segment);
        if !runs.is_empty() {
            out.push(DocumentElement::Paragraph(Paragraph {
                runs,
                alignment: props.alignment,
                indent: props.indent,
                shading: props.shading.clone(),
            }));
        }
    };

    for inline in inlines {
        match inline {
            Inline::Image(image) => {
                flush(std::mem::take(&mut segment), &mut out);
                out.push(DocumentElement::Image(image));
            }
            other => segment.push(other),
        }
    }
    flush(segment, &mut out);
    out
}

fn split_images(inlines: Vec<Inline>) -> (Vec<Inline>, Vec<ImageElement>) {
    let mut rest = Vec::with_capacity(inlines.len());
    let mut images = Vec::new();
    for inline in inlines {
        match inline {
            Inline::Image(image) => images.push(image),
            other => rest.push(other),
        }
    }
    (rest, images)
}

/// Collapse whitespace, trim line edges, merge like-formatted neighbours.
fn normalize_runs(inlines: Vec<Inline>) -> Vec<TextRun> {
    let mut runs: Vec<TextRun> = Vec::new();

    for inline in inlines {
        let mut run = match inline {
            Inline::Run(run) => run,
            Inline::Break => {
                trim_line_end(&mut runs);
                runs.push(TextRun::line_break());
                continue;
            }
            Inline::Image(_) => continue,
        };

        let collapsed = collapse_whitespace(&run.text);
        let at_line_start = runs
            .last()
            .is_none_or(|r| r.is_line_break() || r.text.ends_with(' '));
        let text = if at_line_start {
            collapsed.trim_start()
        } else {
            collapsed.as_str()
        };
        if text.is_empty() {
            continue;
        }
        run.text = text.to_string();

        match runs.last_mut() {
            Some(prev) if !prev.is_line_break() && prev.same_format(&run) => {
                prev.text.push_str(&run.text);
            }
            _ => runs.push(run),
        }
    }
    trim_line_end(&mut runs);

    while runs.first().is_some_and(TextRun::is_line_break) {
        runs.remove(0);
    }
    while runs.last().is_some_and(TextRun::is_line_break) {
        runs.pop();
    }
    runs
}

fn trim_line_end(runs: &mut Vec<TextRun>) {
    while let Some(last) = runs.last_mut() {
        if last.is_line_break() {
            return;
        }
        let trimmed = last.text.trim_end().len();
        if trimmed > 0 {
            last.text.truncate(trimmed);
            return;
        }
        runs.pop();
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn shift_indent(element: DocumentElement, shift: i32) -> DocumentElement {
    match element {
        DocumentElement::Paragraph(mut p) => {
            p.indent.left += shift;
            DocumentElement::Paragraph(p)
        }
        DocumentElement::ListItem {
            prefix,
            runs,
            indent,
        } => DocumentElement::ListItem {
            prefix,
            runs,
            indent: Indent {
                left: indent.left + shift,
                ..indent
            },
        },
        other => other,
    }
}

/// `tr`s of this table, through row groups but not into nested tables.
fn collect_rows<'n>(node: &'n RichTextNode, out: &mut Vec<&'n RichTextNode>) {
    for child in node.children() {
        match child.tag() {
            Some("tr") => out.push(child),
            Some("thead" | "tbody" | "tfoot") => collect_rows(child, out),
            _ => {}
        }
    }
}

/// Whitespace-preserving block in a monospace font on a grey fill.
fn preformatted(node: &RichTextNode, fmt: &Format, style: &StyleAttributes) -> Option<DocumentElement> {
    let fmt = fmt.monospace();
    let text = node.text_content();
    let text = text.trim_end();

    let mut runs = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            runs.push(TextRun::line_break());
        }
        if !line.is_empty() {
            runs.push(fmt.run(line));
        }
    }
    while runs.first().is_some_and(TextRun::is_line_break) {
        runs.remove(0);
    }
    if runs.is_empty() {
        return None;
    }

    let props = BlockProps::from_style(style, &fmt);
    Some(DocumentElement::Paragraph(Paragraph {
        runs,
        alignment: props.alignment,
        indent: props.indent,
        shading: props.shading.or_else(|| Some(CODE_SHADING.to_string())),
    }))
}

/// Unknown tags keep their text as one plain paragraph, or vanish.
fn fallback(node: &RichTextNode, fmt: &Format) -> Option<DocumentElement> {
    let collapsed = collapse_whitespace(&node.text_content());
    let text = collapsed.trim();
    if text.is_empty() {
        log::debug!("dropping empty <{}>", node.tag().unwrap_or("?"));
        return None;
    }
    Some(DocumentElement::Paragraph(Paragraph {
        runs: vec![fmt.run(text)],
        alignment: fmt.alignment,
        ..Default::default()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::parse_markup;

    fn convert_html(html: &str) -> Vec<DocumentElement> {
        convert(&parse_markup(html), Some("1F3864"))
    }

    fn paragraph(el: &DocumentElement) -> &Paragraph {
        match el {
            DocumentElement::Paragraph(p) => p,
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn test_centered_paragraph_with_bold_run() {
        let out = convert_html(r#"<p style="text-align:center">Hi <strong>there</strong></p>"#);
        assert_eq!(out.len(), 1);
        let p = paragraph(&out[0]);
        assert_eq!(p.alignment, Alignment::Center);
        assert_eq!(p.runs.len(), 2);
        assert_eq!(p.runs[0].text, "Hi ");
        assert!(!p.runs[0].bold);
        assert_eq!(p.runs[1].text, "there");
        assert!(p.runs[1].bold);
    }

    #[test]
    fn test_heading_uses_default_color_unless_styled() {
        let out = convert_html(r#"<h1>Plain</h1><h3 style="color:#ff0000">Red</h3>"#);
        let DocumentElement::Heading { level, runs } = &out[0] else {
            panic!("expected heading");
        };
        assert_eq!(*level, 1);
        assert_eq!(runs[0].color.as_deref(), Some("1F3864"));
        let DocumentElement::Heading { level, runs } = &out[1] else {
            panic!("expected heading");
        };
        assert_eq!(*level, 3);
        assert_eq!(runs[0].color.as_deref(), Some("FF0000"));
    }

    #[test]
    fn test_h5_falls_back_to_paragraph() {
        let out = convert_html("<h5>Minor <em>note</em></h5>");
        assert_eq!(out.len(), 1);
        let p = paragraph(&out[0]);
        assert_eq!(p.runs.len(), 1);
        assert_eq!(p.runs[0].text, "Minor note");
    }

    #[test]
    fn test_lists_are_prefixed() {
        let out = convert_html("<ul><li>One</li><li>Two</li></ul><ol><li>First</li><li>Second</li></ol>");
        let texts: Vec<_> = out.iter().map(DocumentElement::plain_text).collect();
        assert_eq!(texts, vec!["\u{2022} One", "\u{2022} Two", "1. First", "2. Second"]);
        assert!(matches!(
            out[0],
            DocumentElement::ListItem {
                indent: Indent { left: 720, .. },
                ..
            }
        ));
    }

    #[test]
    fn test_ordered_list_start() {
        let out = convert_html(r#"<ol start="4"><li>Four</li><li>Five</li></ol>"#);
        let texts: Vec<_> = out.iter().map(DocumentElement::plain_text).collect();
        assert_eq!(texts, ["4. Four", "5. Five"]);
    }

    #[test]
    fn test_huge_ordered_list_start_saturates() {
        let out = convert_html(r#"<ol start="4294967295"><li>a</li><li>b</li></ol>"#);
        let texts: Vec<_> = out.iter().map(DocumentElement::plain_text).collect();
        assert_eq!(texts, ["4294967295. a", "4294967295. b"]);

        // Out of range for the counter: numbering starts over at 1.
        let out = convert_html(r#"<ol start="18446744073709551615"><li>a</li><li>b</li></ol>"#);
        let texts: Vec<_> = out.iter().map(DocumentElement::plain_text).collect();
        assert_eq!(texts, ["1. a", "2. b"]);
    }

    #[test]
    fn test_nested_list_flattens_to_list_indent() {
        let out = convert_html(
            r#"<ol style="margin-left: 20px"><li>Outer<ul><li>Inner</li></ul></li><li>Next</li></ol>"#,
        );
        let texts: Vec<_> = out.iter().map(DocumentElement::plain_text).collect();
        assert_eq!(texts, vec!["1. Outer", "\u{2022} Inner", "2. Next"]);
        for el in &out {
            let DocumentElement::ListItem { indent, .. } = el else {
                panic!("expected list item");
            };
            assert_eq!(indent.left, 300);
        }
    }

    #[test]
    fn test_table_header_cell_shaded() {
        let out = convert_html("<table><tr><th>Name</th></tr><tr><td>Value</td></tr></table>");
        assert_eq!(out.len(), 1);
        let DocumentElement::Table(table) = &out[0] else {
            panic!("expected table");
        };
        let cells: Vec<&Cell> = table.rows.iter().flat_map(|r| &r.cells).collect();
        assert_eq!(cells.len(), 2);
        assert!(cells[0].header);
        assert!(cells[0].runs[0].bold);
        assert_ne!(cells[0].background, cells[1].background);
        assert_eq!(cells[1].background, None);
    }

    #[test]
    fn test_cell_style_alignment_and_background() {
        let out = convert_html(
            r#"<table><tbody><tr><td style="text-align:right;background-color:#ffeeee">9</td></tr></tbody></table>"#,
        );
        let DocumentElement::Table(table) = &out[0] else {
            panic!("expected table");
        };
        let cell = &table.rows[0].cells[0];
        assert_eq!(cell.alignment, Alignment::Right);
        assert_eq!(cell.background.as_deref(), Some("FFEEEE"));
    }

    #[test]
    fn test_link_collapses_to_single_run() {
        let out = convert_html(r#"<p>See <a href="https://x.test">the <b>docs</b></a></p>"#);
        let p = paragraph(&out[0]);
        let link = &p.runs[1];
        assert_eq!(link.text, "the docs");
        assert!(link.is_link && link.underline);
        assert!(!link.bold);
        assert_eq!(link.color.as_deref(), Some(LINK_COLOR));
        assert_eq!(link.href.as_deref(), Some("https://x.test"));
    }

    #[test]
    fn test_empty_link_uses_href_text() {
        let out = convert_html(r#"<p><a href="https://x.test/a"></a></p>"#);
        assert_eq!(paragraph(&out[0]).runs[0].text, "https://x.test/a");
    }

    #[test]
    fn test_external_image_becomes_italic_placeholder() {
        let out = convert_html(r#"<p><img src="https://x.test/a.png"></p>"#);
        let run = &paragraph(&out[0]).runs[0];
        assert!(run.italic);
        assert!(run.text.contains("not embedded"));
    }

    #[test]
    fn test_image_is_hoisted_out_of_paragraph() {
        let out = convert_html(
            r#"<p>before <img src="data:image/png;base64,aGVsbG8=" style="width:2000px"> after</p>"#,
        );
        let kinds: Vec<_> = out.iter().map(DocumentElement::kind).collect();
        assert_eq!(kinds, vec!["paragraph", "image", "paragraph"]);
        let DocumentElement::Image(image) = &out[1] else {
            panic!("expected image");
        };
        assert_eq!(image.width, 640);
        assert_eq!(paragraph(&out[0]).runs[0].text, "before");
        assert_eq!(paragraph(&out[2]).runs[0].text, "after");
    }

    #[test]
    fn test_blockquote_and_pre() {
        let out = convert_html("<blockquote><p>Quoted</p></blockquote><pre>a  b\n  c</pre>");
        assert_eq!(paragraph(&out[0]).indent.left, BLOCKQUOTE_INDENT);
        let pre = paragraph(&out[1]);
        assert_eq!(pre.shading.as_deref(), Some(CODE_SHADING));
        assert_eq!(pre.runs[0].text, "a  b");
        assert!(pre.runs[1].is_line_break());
        assert_eq!(pre.runs[2].text, "  c");
        assert_eq!(pre.runs[0].font_family.as_deref(), Some(CODE_FONT));
    }

    #[test]
    fn test_br_and_whitespace_collapse() {
        let out = convert_html("<p>  one \n  two<br>three  </p>");
        let p = paragraph(&out[0]);
        let texts: Vec<_> = p.runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["one two", "\n", "three"]);
    }

    #[test]
    fn test_unknown_tags_fall_back_or_drop() {
        let out = convert_html("<nav>  Menu  text </nav><hr><aside></aside>");
        assert_eq!(out.len(), 1);
        assert_eq!(paragraph(&out[0]).runs[0].text, "Menu text");
    }

    #[test]
    fn test_loose_inline_content_is_one_paragraph() {
        let out = convert_html("<div>Loose <span style=\"color:red\">red</span> text<p>Own</p></div>");
        assert_eq!(out.len(), 2);
        let p = paragraph(&out[0]);
        assert_eq!(p.runs.len(), 3);
        assert_eq!(p.runs[1].color.as_deref(), Some("FF0000"));
    }

    #[test]
    fn test_style_cascades_to_leaves() {
        let out = convert_html(
            r#"<div style="font-family: Georgia; font-size: 16px"><p><em>deep</em></p></div>"#,
        );
        let run = &paragraph(&out[0]).runs[0];
        assert!(run.italic);
        assert_eq!(run.font_family.as_deref(), Some("Georgia"));
        assert_eq!(run.font_size_pt, Some(12.0));
    }

    #[test]
    fn test_conversion_is_idempotent() {
        let tree = parse_markup("<h2>A</h2><p>b <i>c</i></p><ul><li>d</li></ul>");
        assert_eq!(convert(&tree, None), convert(&tree, None));
    }
}
