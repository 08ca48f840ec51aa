use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{
    COVER_PAGE_ID, ContentMap, CustomSection, NumberedSubsection, SectionDescriptor, SectionKind,
    StandardSection, Subsection, TABLE_OF_CONTENTS_ID,
};

static LEADING_NUMERAL: OnceLock<Option<Regex>> = OnceLock::new();

fn leading_numeral_regex() -> Option<&'static Regex> {
    LEADING_NUMERAL
        .get_or_init(|| Regex::new(r"^\s*\d+(?:(?:\.\d+)+\.?|\.)\s+").ok())
        .as_ref()
}

/// Remove a legacy `"4. "` / `"4.2 "` numeral from the start of a title.
///
/// A title that is nothing but a numeral is returned trimmed, unchanged.
pub fn strip_leading_numeral(title: &str) -> String {
    let trimmed = title.trim();
    let Some(re) = leading_numeral_regex() else {
        return trimmed.to_string();
    };
    let stripped = re.replace(trimmed, "");
    if stripped.trim().is_empty() {
        trimmed.to_string()
    } else {
        stripped.trim().to_string()
    }
}

/// The declared standard sections, looked up by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionCatalog {
    sections: Vec<StandardSection>,
}

impl Default for SectionCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl SectionCatalog {
    pub fn new(sections: Vec<StandardSection>) -> Self {
        SectionCatalog { sections }
    }

    /// The default report template.
    pub fn standard() -> Self {
        fn section(id: &str, title: &str, subsections: &[(&str, &str)]) -> StandardSection {
            StandardSection {
                id: id.to_string(),
                title: title.to_string(),
                subsections: subsections
                    .iter()
                    .map(|(id, title)| Subsection::new(id, title))
                    .collect(),
            }
        }

        SectionCatalog::new(vec![
            section(COVER_PAGE_ID, "Cover Page", &[]),
            section(TABLE_OF_CONTENTS_ID, "Table of Contents", &[]),
            section("executive-summary", "Executive Summary", &[]),
            section(
                "introduction",
                "Introduction",
                &[("background", "Background"), ("objectives", "Objectives")],
            ),
            section("scope", "Scope", &[("in-scope", "In Scope"), ("out-of-scope", "Out of Scope")]),
            section(
                "methodology",
                "Methodology",
                &[("approach", "Approach"), ("data-sources", "Data Sources")],
            ),
            section(
                "findings",
                "Findings",
                &[("key-findings", "Key Findings"), ("analysis", "Analysis")],
            ),
            section("recommendations", "Recommendations", &[]),
            section("conclusion", "Conclusion", &[]),
            section("appendices", "Appendices", &[]),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&StandardSection> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn sections(&self) -> &[StandardSection] {
        &self.sections
    }

    /// Number the selected standard sections, then the custom ones.
    ///
    /// Unknown ids are skipped. Custom sections sort by `order`, unordered
    /// last, ties kept in insertion order. Subsection overrides are appended
    /// after a section's built-in subsections.
    pub fn assemble<S: AsRef<str>>(
        &self,
        selected: &[S],
        custom: &[CustomSection],
        overrides: &HashMap<String, Vec<Subsection>>,
    ) -> AssembledSections {
        let mut next_number = 1;

        let mut standard = Vec::with_capacity(selected.len());
        for id in selected {
            let id = id.as_ref();
            let Some(section) = self.get(id) else {
                log::debug!("skipping unknown section id {id:?}");
                continue;
            };
            standard.push(describe(
                &section.id,
                &section.title,
                &section.subsections,
                overrides,
                next_number,
                SectionKind::Standard,
            ));
            next_number += 1;
        }

        let mut sorted: Vec<&CustomSection> = custom.iter().collect();
        sorted.sort_by(|a, b| match (a.order, b.order) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        let mut customs = Vec::with_capacity(sorted.len());
        for section in sorted {
            customs.push(describe(
                &section.id,
                &section.title,
                &section.subsections,
                overrides,
                next_number,
                SectionKind::Custom,
            ));
            next_number += 1;
        }

        let mut ordered: Vec<SectionDescriptor> =
            standard.iter().chain(customs.iter()).cloned().collect();
        ordered.sort_by_key(|s| s.display_number);

        AssembledSections {
            standard,
            custom: customs,
            ordered,
        }
    }
}

fn describe(
    id: &str,
    title: &str,
    builtin: &[Subsection],
    overrides: &HashMap<String, Vec<Subsection>>,
    display_number: usize,
    kind: SectionKind,
) -> SectionDescriptor {
    let extra = overrides.get(id).map(Vec::as_slice).unwrap_or_default();
    let subsections = builtin
        .iter()
        .chain(extra)
        .enumerate()
        .map(|(index, sub)| NumberedSubsection {
            number: format!("{display_number}.{}", index + 1),
            title: strip_leading_numeral(&sub.title),
        })
        .collect();

    SectionDescriptor {
        id: id.to_string(),
        title: strip_leading_numeral(title),
        display_number,
        subsections,
        raw_content: None,
        kind,
    }
}

/// Output of [`assemble`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssembledSections {
    pub standard: Vec<SectionDescriptor>,
    pub custom: Vec<SectionDescriptor>,
    /// Standard and custom interleaved by display number.
    pub ordered: Vec<SectionDescriptor>,
}

impl AssembledSections {
    /// Attach generated bodies; sections missing from `content` stay pending.
    pub fn with_content(mut self, content: &ContentMap) -> Self {
        for section in self
            .standard
            .iter_mut()
            .chain(self.custom.iter_mut())
            .chain(self.ordered.iter_mut())
        {
            section.raw_content = content.get(&section.id).cloned();
        }
        self
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

/// [`SectionCatalog::assemble`] over the standard template.
pub fn assemble<S: AsRef<str>>(
    selected: &[S],
    custom: &[CustomSection],
    overrides: &HashMap<String, Vec<Subsection>>,
) -> AssembledSections {
    SectionCatalog::standard().assemble(selected, custom, overrides)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(id: &str, order: Option<i64>) -> CustomSection {
        CustomSection {
            id: id.into(),
            title: format!("Custom {id}"),
            order,
            subsections: vec![],
        }
    }

    #[test]
    fn test_strip_leading_numeral() {
        assert_eq!(strip_leading_numeral("4. Introduction"), "Introduction");
        assert_eq!(strip_leading_numeral("4.2 Data Sources"), "Data Sources");
        assert_eq!(strip_leading_numeral("4.2. Data"), "Data");
        assert_eq!(strip_leading_numeral("2020 Roadmap"), "2020 Roadmap");
        assert_eq!(strip_leading_numeral("  Plain  "), "Plain");
        assert_eq!(strip_leading_numeral("7. "), "7.");
    }

    #[test]
    fn test_standard_then_custom_numbering() {
        let out = assemble(
            &["introduction", "scope"],
            &[custom("b", None), custom("a", Some(2)), custom("c", Some(1))],
            &HashMap::new(),
        );
        let numbers: Vec<_> = out.ordered.iter().map(|s| (s.id.as_str(), s.display_number)).collect();
        assert_eq!(
            numbers,
            vec![("introduction", 1), ("scope", 2), ("c", 3), ("a", 4), ("b", 5)]
        );
        assert_eq!(out.standard.len(), 2);
        assert_eq!(out.custom.len(), 3);
    }

    #[test]
    fn test_unknown_ids_skipped() {
        let out = assemble(&["nope", "findings"], &[], &HashMap::new());
        assert_eq!(out.ordered.len(), 1);
        assert_eq!(out.ordered[0].display_number, 1);
    }

    #[test]
    fn test_subsections_are_flat_and_positional() {
        let mut overrides = HashMap::new();
        overrides.insert(
            "introduction".to_string(),
            vec![Subsection::new("extra", "7.9 Extra Notes")],
        );
        let out = assemble(&["scope", "introduction"], &[], &overrides);
        let intro = &out.ordered[1];
        let subs: Vec<_> = intro
            .subsections
            .iter()
            .map(|s| (s.number.as_str(), s.title.as_str()))
            .collect();
        assert_eq!(
            subs,
            vec![("2.1", "Background"), ("2.2", "Objectives"), ("2.3", "Extra Notes")]
        );
    }

    #[test]
    fn test_heading_text_and_content() {
        let mut content = ContentMap::new();
        content.insert("scope".into(), "<p>x</p>".into());
        let out = assemble(&["scope", "conclusion"], &[], &HashMap::new()).with_content(&content);
        assert_eq!(out.ordered[0].heading_text(), "1. Scope");
        assert_eq!(out.ordered[0].body(), Some("<p>x</p>"));
        assert!(out.ordered[1].is_pending());
    }
}
