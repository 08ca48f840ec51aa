//! Section numbering, table of contents and title deduplication.
//!
//! Numbering comes from position alone. Any numeral baked into a stored
//! title is stripped by [`strip_leading_numeral`] and never shown again;
//! [`SectionDescriptor::display_number`] is the only number a reader sees.

mod assemble;
mod dedupe;
mod toc;

pub use assemble::{AssembledSections, SectionCatalog, assemble, strip_leading_numeral};
pub use dedupe::remove_duplicate_title;
pub use toc::{TOC_TITLE, TocEntry, generate_table_of_contents, table_of_contents};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Section id of the cover page.
pub const COVER_PAGE_ID: &str = "cover-page";
/// Section id of the generated table of contents.
pub const TABLE_OF_CONTENTS_ID: &str = "table-of-contents";

/// Section id to generated body markup. Absent or blank means pending.
pub type ContentMap = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subsection {
    #[serde(default)]
    pub id: String,
    pub title: String,
}

impl Subsection {
    pub fn new(id: &str, title: &str) -> Self {
        Subsection {
            id: id.to_string(),
            title: title.to_string(),
        }
    }
}

/// A section of the report template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardSection {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subsections: Vec<Subsection>,
}

/// A section the user added on top of the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomSection {
    pub id: String,
    pub title: String,
    /// Sort key; unordered sections go last, in insertion order.
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default)]
    pub subsections: Vec<Subsection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Standard,
    Custom,
}

/// A subsection with its position-derived number, e.g. `4.2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedSubsection {
    pub number: String,
    pub title: String,
}

/// A section ready for export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionDescriptor {
    pub id: String,
    /// Title with any legacy numeral removed.
    pub title: String,
    pub display_number: usize,
    pub subsections: Vec<NumberedSubsection>,
    /// Generated body markup; `None` while pending.
    pub raw_content: Option<String>,
    pub kind: SectionKind,
}

impl SectionDescriptor {
    /// `"{display_number}. {title}"`.
    pub fn heading_text(&self) -> String {
        format!("{}. {}", self.display_number, self.title)
    }

    pub fn is_cover(&self) -> bool {
        self.id == COVER_PAGE_ID
    }

    pub fn is_table_of_contents(&self) -> bool {
        self.id == TABLE_OF_CONTENTS_ID
    }

    /// Body markup, if any has been generated.
    pub fn body(&self) -> Option<&str> {
        self.raw_content
            .as_deref()
            .filter(|body| !body.trim().is_empty())
    }

    pub fn is_pending(&self) -> bool {
        self.body().is_none()
    }
}
