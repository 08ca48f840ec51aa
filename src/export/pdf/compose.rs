//! Single long document for the paginated target.

use std::fmt::Write as _;

use crate::config::ExportConfig;
use crate::export::ExportRequest;
use crate::render::{BODY_FONT_PX, HEADING_FONT_PX, LINE_HEIGHT, PAGE_PADDING_PX};
use crate::util::escape_xml;

/// Print rules matching the metrics the built-in surface lays out with.
pub fn print_css(config: &ExportConfig) -> String {
    let brand = escape_xml(&config.brand_color);
    let mut css = format!(
        "html, body {{ margin: 0; background: #FFFFFF; }}\n\
         body {{ width: {width}px; padding: {PAGE_PADDING_PX}px; box-sizing: border-box; \
         font-family: Calibri, Arial, sans-serif; font-size: {BODY_FONT_PX}px; \
         line-height: {LINE_HEIGHT}; color: #333333; }}\n",
        width = config.virtual_page_width_px
    );
    for (i, size) in HEADING_FONT_PX.iter().enumerate() {
        let _ = writeln!(
            css,
            "h{} {{ font-size: {size}px; color: #{brand}; margin: 18px 0 8px; }}",
            i + 1
        );
    }
    css.push_str(
        "p { margin: 0 0 8px; }\n\
         ul, ol { margin: 0 0 8px; padding-left: 48px; }\n\
         li { margin-bottom: 4px; }\n\
         table { width: 100%; border-collapse: collapse; margin-bottom: 12px; table-layout: fixed; }\n\
         th, td { border: 1px solid #BFBFBF; padding: 6px; vertical-align: top; }\n\
         th { background: #D9E2F3; font-weight: bold; }\n\
         img { max-width: 100%; }\n\
         pre, code { font-family: 'Courier New', monospace; background: #F2F2F2; }\n\
         blockquote { margin: 0 0 8px 48px; }\n\
         .toc-section { font-weight: bold; }\n",
    );
    css
}

/// Cover, table of contents and every section as one markup document.
///
/// Section headings carry their display number; duplicated title headings
/// inside bodies are removed first. Sections still pending contribute only
/// their heading.
pub fn compose_document_html(request: &ExportRequest, config: &ExportConfig) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>");
    html.push_str(&escape_xml(&request.project_name));
    html.push_str("</title><style>\n");
    html.push_str(&print_css(config));
    html.push_str("</style></head><body>\n");

    html.push_str("<div class=\"cover\">");
    match request.custom_cover_html() {
        Some(cover) => html.push_str(cover),
        None => html.push_str(&request.fallback_cover_html()),
    }
    html.push_str("</div>\n");

    let brand = escape_xml(&config.brand_color);
    let mut sections = 0;
    for section in request.body_sections() {
        let _ = write!(
            html,
            "<div class=\"section\" id=\"{}\"><h1 style=\"color: #{brand}\">{}</h1>",
            escape_xml(&section.id),
            escape_xml(&section.heading_text())
        );
        if let Some(markup) = request.section_markup(section) {
            html.push_str(&markup);
        }
        html.push_str("</div>\n");
        sections += 1;
    }
    html.push_str("</body></html>\n");

    log::debug!(
        "composed {sections} section(s) into {} bytes of markup",
        html.len()
    );
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::convert_markup;
    use crate::ir::DocumentElement;
    use crate::sections::{ContentMap, assemble};
    use std::collections::HashMap;

    fn request() -> ExportRequest {
        let sections = assemble(
            &["cover-page", "table-of-contents", "findings", "conclusion"],
            &[],
            &HashMap::new(),
        );
        let mut content = ContentMap::new();
        content.insert(
            "findings".into(),
            "<h2>3. Findings</h2><p>Three issues.</p>".into(),
        );
        ExportRequest::new("Audit <2026>", sections.ordered, content)
    }

    #[test]
    fn test_composed_order_and_dedupe() {
        let html = compose_document_html(&request(), &ExportConfig::default());
        let cover = html.find("class=\"cover\"").unwrap();
        let toc = html.find("2. Table of Contents").unwrap();
        let findings = html.find("3. Findings</h1>").unwrap();
        let conclusion = html.find("4. Conclusion").unwrap();
        assert!(cover < toc && toc < findings && findings < conclusion);
        assert!(!html.contains("<h2>3. Findings</h2>"));
        assert!(html.contains("<title>Audit &lt;2026&gt;</title>"));
    }

    #[test]
    fn test_composed_markup_converts() {
        let html = compose_document_html(&request(), &ExportConfig::default());
        let elements = convert_markup(&html, None);
        let headings = elements
            .iter()
            .filter(|e| matches!(e, DocumentElement::Heading { level: 1, .. }))
            .count();
        // Cover title plus three numbered sections.
        assert_eq!(headings, 4);
    }

    #[test]
    fn test_css_uses_virtual_width() {
        let css = print_css(&ExportConfig::default());
        assert!(css.contains("width: 794px"));
        assert!(css.contains("h1 { font-size: 26.67px; color: #1F3864"));
    }
}
