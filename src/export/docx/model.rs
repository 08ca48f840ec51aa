//! Editable document object graph.
//!
//! [`DocumentModelBuilder`] turns the cover and the converted section bodies
//! into a [`DocxModel`]: a cover section followed by a body section that
//! starts on a new page. The writer serializes the model; nothing here knows
//! about XML.

use crate::ir::{DocumentElement, ImageElement, Indent, Table, TextRun};
use crate::style::Alignment;
use crate::util::MediaFormat;

/// Paragraph styles declared in the package's style part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphStyle {
    /// `Heading1` through `Heading4`.
    Heading(u8),
    ListParagraph,
}

impl ParagraphStyle {
    pub fn style_id(self) -> String {
        match self {
            ParagraphStyle::Heading(level) => format!("Heading{}", level.clamp(1, 4)),
            ParagraphStyle::ListParagraph => "ListParagraph".to_string(),
        }
    }
}

/// Inline content of a paragraph.
#[derive(Debug, Clone, PartialEq)]
pub enum Run {
    Text(TextRun),
    /// A run wrapped in an external hyperlink.
    Hyperlink { href: String, run: TextRun },
    Break,
}

impl Run {
    pub(crate) fn from_text(run: &TextRun) -> Self {
        if run.is_line_break() {
            return Run::Break;
        }
        match run.href.as_deref() {
            Some(href) if run.is_link => Run::Hyperlink {
                href: href.to_string(),
                run: run.clone(),
            },
            _ => Run::Text(run.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocxParagraph {
    pub style: Option<ParagraphStyle>,
    pub runs: Vec<Run>,
    pub alignment: Alignment,
    pub indent: Indent,
    pub shading: Option<String>,
}

impl DocxParagraph {
    fn from_runs(runs: &[TextRun]) -> Self {
        DocxParagraph {
            runs: runs.iter().map(Run::from_text).collect(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(DocxParagraph),
    Table(Table),
    Image(ImageElement),
}

/// A run of blocks sharing page setup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocxSection {
    pub blocks: Vec<Block>,
    /// Start this section on a new page.
    pub break_before: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocxModel {
    pub title: String,
    pub sections: Vec<DocxSection>,
}

impl DocxModel {
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.sections.iter().flat_map(|s| s.blocks.iter())
    }

    /// Embedded images, in document order.
    pub fn images(&self) -> impl Iterator<Item = &ImageElement> {
        self.blocks().filter_map(|b| match b {
            Block::Image(image) => Some(image),
            _ => None,
        })
    }
}

/// Composes the cover and section bodies into a [`DocxModel`].
#[derive(Debug)]
pub struct DocumentModelBuilder {
    heading_color: Option<String>,
    cover: DocxSection,
    body: DocxSection,
}

impl DocumentModelBuilder {
    /// `heading_color` is applied to section headings.
    pub fn new(heading_color: Option<&str>) -> Self {
        Self {
            heading_color: heading_color.map(str::to_string),
            cover: DocxSection::default(),
            body: DocxSection {
                blocks: Vec::new(),
                break_before: true,
            },
        }
    }

    /// A rasterized custom cover.
    pub fn cover_image(&mut self, image: ImageElement) -> &mut Self {
        self.cover.blocks.push(Block::Image(image));
        self
    }

    /// A structural cover built from converted markup.
    pub fn cover_elements(&mut self, elements: &[DocumentElement]) -> &mut Self {
        for element in elements {
            push_element(&mut self.cover.blocks, element);
        }
        self
    }

    /// A section heading followed by its converted body. `None` keeps only
    /// the heading, for sections whose content is still pending.
    pub fn section(&mut self, heading: &str, body: Option<&[DocumentElement]>) -> &mut Self {
        let run = TextRun {
            text: heading.to_string(),
            bold: true,
            color: self.heading_color.clone(),
            ..Default::default()
        };
        self.body.blocks.push(Block::Paragraph(DocxParagraph {
            style: Some(ParagraphStyle::Heading(1)),
            runs: vec![Run::Text(run)],
            ..Default::default()
        }));
        for element in body.unwrap_or_default() {
            push_element(&mut self.body.blocks, element);
        }
        self
    }

    pub fn build(self, title: impl Into<String>) -> DocxModel {
        let mut sections = Vec::with_capacity(2);
        if !self.cover.blocks.is_empty() {
            sections.push(self.cover);
        }
        if !self.body.blocks.is_empty() || sections.is_empty() {
            let mut body = self.body;
            body.break_before = !sections.is_empty();
            sections.push(body);
        }
        DocxModel {
            title: title.into(),
            sections,
        }
    }
}

fn push_element(blocks: &mut Vec<Block>, element: &DocumentElement) {
    let block = match element {
        DocumentElement::Heading { level, runs } => Block::Paragraph(DocxParagraph {
            style: Some(ParagraphStyle::Heading(*level)),
            ..DocxParagraph::from_runs(runs)
        }),
        DocumentElement::Paragraph(p) => Block::Paragraph(DocxParagraph {
            alignment: p.alignment,
            indent: p.indent,
            shading: p.shading.clone(),
            ..DocxParagraph::from_runs(&p.runs)
        }),
        DocumentElement::ListItem {
            prefix,
            runs,
            indent,
        } => {
            let mut paragraph = DocxParagraph::from_runs(runs);
            paragraph.runs.insert(0, Run::Text(TextRun::plain(prefix.as_str())));
            paragraph.style = Some(ParagraphStyle::ListParagraph);
            paragraph.indent = *indent;
            Block::Paragraph(paragraph)
        }
        DocumentElement::Table(table) => Block::Table(table.clone()),
        DocumentElement::Image(image) if image.format == MediaFormat::Unknown => {
            log::debug!("image with unrecognized format replaced by placeholder");
            Block::Paragraph(DocxParagraph {
                alignment: image.alignment,
                runs: vec![Run::Text(TextRun {
                    text: "[Image format not supported in this document]".to_string(),
                    italic: true,
                    ..Default::default()
                })],
                ..Default::default()
            })
        }
        DocumentElement::Image(image) => Block::Image(image.clone()),
    };
    blocks.push(block);
}
