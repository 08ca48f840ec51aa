//! Markup conversion tests.
//!
//! These go through the public API only: parse, convert, and inspect the
//! resulting document elements the way both exporters see them.

use folio::compiler::{CONTENT_WIDTH_PX, LINK_COLOR, convert, parse_markup};
use folio::ir::DocumentElement;
use folio::style::Alignment;
use folio::{convert_markup, resolve};

// A 1x1 transparent PNG.
const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

fn data_uri() -> String {
    format!("data:image/png;base64,{PNG_1X1}")
}

// ============================================================================
// Style resolution
// ============================================================================

#[test]
fn test_resolve_rgb_color_and_bold() {
    let attrs = resolve("color: rgb(255,0,0); font-weight: bold");
    assert_eq!(attrs.color.as_deref(), Some("FF0000"));
    assert_eq!(attrs.bold, Some(true));
}

#[test]
fn test_resolve_is_referentially_transparent() {
    let style = "font-size: 16px; text-align: justify; margin-left: 2em; font-family: 'Open Sans', serif";
    assert_eq!(resolve(style), resolve(style));
    let attrs = resolve(style);
    assert_eq!(attrs.alignment, Some(Alignment::Justify));
    assert_eq!(attrs.indent_left_units, Some(480));
    assert_eq!(attrs.font_family.as_deref(), Some("Open Sans"));
}

#[test]
fn test_resolve_ignores_garbage() {
    let attrs = resolve("color: ; font-size: huge; nonsense");
    assert!(attrs.color.is_none());
    assert!(attrs.font_size_pt.is_none());
}

// ============================================================================
// Visitor
// ============================================================================

#[test]
fn test_centered_paragraph_with_bold_run() {
    let elements = convert_markup(
        r#"<p style="text-align:center">Hi <strong>there</strong></p>"#,
        None,
    );
    assert_eq!(elements.len(), 1);
    let DocumentElement::Paragraph(p) = &elements[0] else {
        panic!("expected paragraph, got {:?}", elements[0]);
    };
    assert_eq!(p.alignment, Alignment::Center);
    assert_eq!(p.runs.len(), 2);
    assert!(!p.runs[0].bold);
    assert!(p.runs[1].bold);
    assert_eq!(p.runs[1].text, "there");
}

#[test]
fn test_table_header_shaded_differently() {
    let elements = convert_markup(
        "<table><tr><th>Name</th></tr><tr><td>Value</td></tr></table>",
        None,
    );
    assert_eq!(elements.len(), 1);
    let DocumentElement::Table(table) = &elements[0] else {
        panic!("expected table");
    };
    let cells: Vec<_> = table.rows.iter().flat_map(|r| r.cells.iter()).collect();
    assert_eq!(cells.len(), 2);
    assert!(cells[0].header);
    assert_ne!(cells[0].background, cells[1].background);
}

#[test]
fn test_oversized_image_is_clamped() {
    let markup = format!(r#"<img src="{}" style="width:2000px">"#, data_uri());
    let elements = convert_markup(&markup, None);
    let DocumentElement::Image(image) = &elements[0] else {
        panic!("expected image");
    };
    assert_eq!(image.width, CONTENT_WIDTH_PX as u32);
    assert!(image.height <= 900);
}

#[test]
fn test_headings_take_default_color() {
    let elements = convert_markup(
        r#"<h1>One</h1><h3 style="color:#00FF00">Three</h3>"#,
        Some("1F3864"),
    );
    let colors: Vec<_> = elements
        .iter()
        .map(|e| match e {
            DocumentElement::Heading { runs, .. } => runs[0].color.clone(),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(colors, [Some("1F3864".to_string()), Some("00FF00".to_string())]);
}

#[test]
fn test_lists_are_prefixed_and_flattened() {
    let elements = convert_markup(
        "<ul><li>Apple</li><li>Pear<ol><li>Inner</li></ol></li></ul><ol><li>First</li><li>Second</li></ol>",
        None,
    );
    let texts: Vec<String> = elements.iter().map(DocumentElement::plain_text).collect();
    assert!(texts.contains(&"\u{2022} Apple".to_string()));
    assert!(texts.contains(&"2. Second".to_string()));
    assert!(texts.iter().any(|t| t.ends_with("Inner")));
    assert!(elements
        .iter()
        .all(|e| matches!(e, DocumentElement::ListItem { .. })));
}

#[test]
fn test_link_collapses_to_single_run() {
    let elements = convert_markup(
        r#"<p>See <a href="https://example.com/report">the <em>full</em> report</a>. <a href="https://example.com/x"></a></p>"#,
        None,
    );
    let DocumentElement::Paragraph(p) = &elements[0] else {
        panic!("expected paragraph");
    };
    let links: Vec<_> = p.runs.iter().filter(|r| r.is_link).collect();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].text, "the full report");
    assert_eq!(links[0].color.as_deref(), Some(LINK_COLOR));
    assert_eq!(links[1].text, "https://example.com/x");
}

#[test]
fn test_external_image_placeholder() {
    let elements = convert_markup(r#"<img src="https://cdn.example.com/a.png">"#, None);
    let DocumentElement::Paragraph(p) = &elements[0] else {
        panic!("expected placeholder paragraph");
    };
    assert!(p.runs[0].italic);
    assert!(p.runs[0].text.contains("https://cdn.example.com/a.png"));
}

#[test]
fn test_unknown_tags_fall_back_to_text() {
    let elements = convert_markup("<section><custom-box>Kept text</custom-box></section><widget></widget>", None);
    let texts: Vec<String> = elements.iter().map(DocumentElement::plain_text).collect();
    assert_eq!(texts, ["Kept text"]);
}

#[test]
fn test_conversion_is_idempotent() {
    let markup = format!(
        r#"<h2>Title</h2><p style="color:red">a <u>b</u></p><blockquote>quote</blockquote><pre>code  block</pre><img src="{}" width="120" height="90">"#,
        data_uri()
    );
    let tree = parse_markup(&markup);
    assert_eq!(convert(&tree, Some("C00000")), convert(&tree, Some("C00000")));
}
