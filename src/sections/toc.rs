use super::{ContentMap, SectionDescriptor};
use crate::util::escape_xml;

pub const TOC_TITLE: &str = "Table of Contents";

/// One line of the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub number: String,
    pub title: String,
    /// 1 for sections, 2 for subsections.
    pub level: u8,
}

impl TocEntry {
    pub fn label(&self) -> String {
        format!("{} {}", self.number, self.title)
    }
}

/// Entries for every section that has a generated body, either in
/// `content` or already attached to the section.
///
/// The cover page and the table of contents itself never appear.
/// Subsection numbers are recomputed from position.
pub fn table_of_contents(ordered: &[SectionDescriptor], content: &ContentMap) -> Vec<TocEntry> {
    let mut entries = Vec::new();
    for section in ordered {
        if section.is_cover() || section.is_table_of_contents() {
            continue;
        }
        let has_body = content
            .get(&section.id)
            .is_some_and(|body| !body.trim().is_empty())
            || section.body().is_some();
        if !has_body {
            continue;
        }

        entries.push(TocEntry {
            number: format!("{}.", section.display_number),
            title: section.title.clone(),
            level: 1,
        });
        for (index, sub) in section.subsections.iter().enumerate() {
            entries.push(TocEntry {
                number: format!("{}.{}", section.display_number, index + 1),
                title: sub.title.clone(),
                level: 2,
            });
        }
    }
    entries
}

/// Table of contents as markup both export targets can consume.
pub fn generate_table_of_contents(ordered: &[SectionDescriptor], content: &ContentMap) -> String {
    let entries = table_of_contents(ordered, content);
    let mut html = String::from("<div class=\"toc\">");
    if entries.is_empty() {
        html.push_str("<p><em>No sections have been generated yet.</em></p>");
    }
    for entry in &entries {
        let (class, style) = match entry.level {
            1 => ("toc-section", "font-weight: bold"),
            _ => ("toc-subsection", "margin-left: 24px"),
        };
        html.push_str(&format!(
            "<p class=\"{class}\" style=\"{style}\">{}</p>",
            escape_xml(&entry.label())
        ));
    }
    html.push_str("</div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::{COVER_PAGE_ID, TABLE_OF_CONTENTS_ID, assemble};
    use std::collections::HashMap;

    #[test]
    fn test_excludes_cover_toc_and_pending() {
        let sections = assemble(
            &[COVER_PAGE_ID, TABLE_OF_CONTENTS_ID, "introduction", "scope"],
            &[],
            &HashMap::new(),
        );
        let mut content = ContentMap::new();
        content.insert(COVER_PAGE_ID.into(), "<p>cover</p>".into());
        content.insert("introduction".into(), "<p>intro</p>".into());
        content.insert("scope".into(), "   ".into());

        let entries = table_of_contents(&sections.ordered, &content);
        let labels: Vec<_> = entries.iter().map(TocEntry::label).collect();
        assert_eq!(labels, vec!["3. Introduction", "3.1 Background", "3.2 Objectives"]);
    }

    #[test]
    fn test_markup_escapes_titles() {
        let sections = assemble(&["findings"], &[], &HashMap::new());
        let mut ordered = sections.ordered;
        ordered[0].title = "R&D Findings".into();
        let mut content = ContentMap::new();
        content.insert("findings".into(), "<p>x</p>".into());

        let html = generate_table_of_contents(&ordered, &content);
        assert!(html.contains("1. R&amp;D Findings"));
        assert!(html.contains("toc-subsection"));
    }

    #[test]
    fn test_attached_bodies_count_as_generated() {
        let mut content = ContentMap::new();
        content.insert("scope".into(), "<p>scope</p>".into());
        let sections = assemble(&[TABLE_OF_CONTENTS_ID, "scope"], &[], &HashMap::new())
            .with_content(&content);

        let html = generate_table_of_contents(&sections.ordered, &ContentMap::new());
        assert!(html.contains("2. Scope"));
        assert!(!html.contains("No sections have been generated yet"));
    }
}
