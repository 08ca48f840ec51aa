//! Target-agnostic document elements.
//!
//! [`crate::compiler::convert`] produces a flat `Vec<DocumentElement>` from a
//! parsed markup tree. Both export targets consume the same sequence; neither
//! mutates it.

use crate::style::Alignment;
use crate::util::MediaFormat;

/// A span of text sharing one formatting set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// 6-digit uppercase hex.
    pub color: Option<String>,
    pub font_size_pt: Option<f32>,
    pub font_family: Option<String>,
    pub is_link: bool,
    pub href: Option<String>,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        TextRun {
            text: text.into(),
            ..Default::default()
        }
    }

    /// A hard line break inside a paragraph.
    pub fn line_break() -> Self {
        TextRun::plain("\n")
    }

    pub fn is_line_break(&self) -> bool {
        self.text == "\n"
    }

    /// True when both runs would serialize with identical character properties.
    pub fn same_format(&self, other: &TextRun) -> bool {
        self.bold == other.bold
            && self.italic == other.italic
            && self.underline == other.underline
            && self.color == other.color
            && self.font_size_pt == other.font_size_pt
            && self.font_family == other.font_family
            && self.is_link == other.is_link
            && self.href == other.href
    }
}

/// Paragraph geometry in indent units (twentieths of a point).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Indent {
    pub left: i32,
    pub first_line: i32,
}

impl Indent {
    pub fn left(units: i32) -> Self {
        Indent {
            left: units,
            first_line: 0,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.left == 0 && self.first_line == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub runs: Vec<TextRun>,
    pub alignment: Alignment,
    pub indent: Indent,
    /// Background fill, 6-digit hex.
    pub shading: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub runs: Vec<TextRun>,
    pub header: bool,
    pub alignment: Alignment,
    pub background: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<Row>,
}

impl Table {
    /// Widest row, in cells.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }
}

/// A decoded, embeddable image with its display size in pixels.
#[derive(Clone, PartialEq)]
pub struct ImageElement {
    pub data: Vec<u8>,
    pub format: MediaFormat,
    pub width: u32,
    pub height: u32,
    pub alignment: Alignment,
}

impl std::fmt::Debug for ImageElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageElement")
            .field("bytes", &self.data.len())
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("alignment", &self.alignment)
            .finish()
    }
}

/// One block of converted content.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentElement {
    /// Levels 1 through 4.
    Heading { level: u8, runs: Vec<TextRun> },
    Paragraph(Paragraph),
    /// A list entry; nesting is flattened, the ordinal lives in `prefix`.
    ListItem {
        prefix: String,
        runs: Vec<TextRun>,
        indent: Indent,
    },
    Table(Table),
    Image(ImageElement),
}

impl DocumentElement {
    /// Concatenated run text, for logging and assertions.
    pub fn plain_text(&self) -> String {
        fn join(runs: &[TextRun]) -> String {
            runs.iter().map(|r| r.text.as_str()).collect()
        }
        match self {
            DocumentElement::Heading { runs, .. } => join(runs),
            DocumentElement::Paragraph(p) => join(&p.runs),
            DocumentElement::ListItem { prefix, runs, .. } => format!("{prefix}{}", join(runs)),
            DocumentElement::Table(t) => t
                .rows
                .iter()
                .map(|row| {
                    row.cells
                        .iter()
                        .map(|c| join(&c.runs))
                        .collect::<Vec<_>>()
                        .join("\t")
                })
                .collect::<Vec<_>>()
                .join("\n"),
            DocumentElement::Image(_) => String::new(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DocumentElement::Heading { .. } => "heading",
            DocumentElement::Paragraph(_) => "paragraph",
            DocumentElement::ListItem { .. } => "list-item",
            DocumentElement::Table(_) => "table",
            DocumentElement::Image(_) => "image",
        }
    }
}
