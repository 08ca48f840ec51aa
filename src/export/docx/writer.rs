//! WordprocessingML package writer.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::{Seek, Write};

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::DocxConfig;
use super::model::{Block, DocxModel, DocxParagraph, Run};
use crate::error::Result;
use crate::ir::{Cell, ImageElement, Table, TextRun};
use crate::style::Alignment;
use crate::style::units::{EMU_PER_PX, MM_PER_INCH};
use crate::util::{MediaFormat, escape_xml};

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const REL_IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const REL_HYPERLINK: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

const TWIPS_PER_INCH: f64 = 1440.0;
const TABLE_BORDER_COLOR: &str = "BFBFBF";

pub(crate) fn mm_to_twips(mm: f64) -> u32 {
    (mm / MM_PER_INCH * TWIPS_PER_INCH).round() as u32
}

struct Relationship {
    id: String,
    kind: &'static str,
    target: String,
    external: bool,
}

/// Relationship and media bookkeeping for one `document.xml`.
struct Parts<'a> {
    relationships: Vec<Relationship>,
    media: Vec<(String, &'a [u8])>,
    hyperlinks: HashMap<String, String>,
    drawing_id: u32,
}

impl<'a> Parts<'a> {
    fn new() -> Self {
        Self {
            relationships: vec![Relationship {
                id: "rId1".to_string(),
                kind: REL_STYLES,
                target: "styles.xml".to_string(),
                external: false,
            }],
            media: Vec::new(),
            hyperlinks: HashMap::new(),
            drawing_id: 0,
        }
    }

    fn next_id(&self) -> String {
        format!("rId{}", self.relationships.len() + 1)
    }

    fn add_image(&mut self, image: &'a ImageElement) -> (String, u32) {
        let id = self.next_id();
        let name = format!("image{}.{}", self.media.len() + 1, image.format.extension());
        self.relationships.push(Relationship {
            id: id.clone(),
            kind: REL_IMAGE,
            target: format!("media/{name}"),
            external: false,
        });
        self.media.push((format!("word/media/{name}"), &image.data));
        self.drawing_id += 1;
        (id, self.drawing_id)
    }

    fn hyperlink(&mut self, href: &str) -> String {
        if let Some(id) = self.hyperlinks.get(href) {
            return id.clone();
        }
        let id = self.next_id();
        self.relationships.push(Relationship {
            id: id.clone(),
            kind: REL_HYPERLINK,
            target: href.to_string(),
            external: true,
        });
        self.hyperlinks.insert(href.to_string(), id.clone());
        id
    }
}

/// Page geometry in twips.
struct PageSetup {
    width: u32,
    height: u32,
    margin: u32,
}

impl PageSetup {
    fn content_width(&self) -> u32 {
        self.width.saturating_sub(2 * self.margin)
    }
}

/// Write `model` as a complete package.
pub fn write_package<W: Write + Seek>(
    model: &DocxModel,
    config: &DocxConfig,
    writer: W,
) -> Result<()> {
    let page = PageSetup {
        width: mm_to_twips(config.page_width_mm),
        height: mm_to_twips(config.page_height_mm),
        margin: config.margin_twips,
    };

    let mut parts = Parts::new();
    let document = document_xml(model, &page, &mut parts);

    let mut zip = ZipWriter::new(writer);
    let compression_level = config.compression_level.unwrap_or(6);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(compression_level as i64));

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(content_types_xml(model).as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(PACKAGE_RELS.as_bytes())?;

    zip.start_file("docProps/core.xml", options)?;
    zip.write_all(core_xml(&model.title).as_bytes())?;

    zip.start_file("word/document.xml", options)?;
    zip.write_all(document.as_bytes())?;

    zip.start_file("word/styles.xml", options)?;
    zip.write_all(styles_xml(config).as_bytes())?;

    zip.start_file("word/_rels/document.xml.rels", options)?;
    zip.write_all(document_rels_xml(&parts.relationships).as_bytes())?;

    // Already-compressed image data gains nothing from deflate.
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (path, data) in &parts.media {
        zip.start_file(path.as_str(), stored)?;
        zip.write_all(data)?;
    }

    zip.finish()?;
    log::debug!(
        "docx package: {} block(s), {} image(s), {} relationship(s)",
        model.blocks().count(),
        parts.media.len(),
        parts.relationships.len()
    );
    Ok(())
}

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
</Relationships>"#;

fn content_types_xml(model: &DocxModel) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
"#,
    );
    let mut seen: Vec<MediaFormat> = Vec::new();
    for image in model.images() {
        if !seen.contains(&image.format) {
            seen.push(image.format);
            let _ = writeln!(
                xml,
                r#"  <Default Extension="{}" ContentType="{}"/>"#,
                image.format.extension(),
                image.format.mime_type()
            );
        }
    }
    xml.push_str(
        r#"  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
  <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
</Types>"#,
    );
    xml
}

fn core_xml(title: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <dc:title>{}</dc:title>
  <dc:creator>folio</dc:creator>
</cp:coreProperties>"#,
        escape_xml(title)
    )
}

fn document_rels_xml(relationships: &[Relationship]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
"#,
    );
    for rel in relationships {
        let mode = if rel.external {
            r#" TargetMode="External""#
        } else {
            ""
        };
        let _ = writeln!(
            xml,
            r#"  <Relationship Id="{}" Type="{}" Target="{}"{mode}/>"#,
            rel.id,
            rel.kind,
            escape_xml(&rel.target)
        );
    }
    xml.push_str("</Relationships>");
    xml
}

fn styles_xml(config: &DocxConfig) -> String {
    let color = escape_xml(&config.heading_color);
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="{NS_W}">
  <w:docDefaults>
    <w:rPrDefault><w:rPr><w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:cs="{font}"/><w:sz w:val="22"/><w:szCs w:val="22"/></w:rPr></w:rPrDefault>
    <w:pPrDefault><w:pPr><w:spacing w:after="120" w:line="276" w:lineRule="auto"/></w:pPr></w:pPrDefault>
  </w:docDefaults>
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>
"#,
        font = escape_xml(&config.body_font)
    );
    for (level, half_points) in [(1, 40), (2, 32), (3, 28), (4, 24)] {
        let _ = writeln!(
            xml,
            r#"  <w:style w:type="paragraph" w:styleId="Heading{level}"><w:name w:val="heading {level}"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="120"/><w:outlineLvl w:val="{}"/></w:pPr><w:rPr><w:b/><w:color w:val="{color}"/><w:sz w:val="{half_points}"/><w:szCs w:val="{half_points}"/></w:rPr></w:style>"#,
            level - 1
        );
    }
    xml.push_str(
        r#"  <w:style w:type="paragraph" w:styleId="ListParagraph"><w:name w:val="List Paragraph"/><w:basedOn w:val="Normal"/><w:pPr><w:spacing w:after="60"/></w:pPr></w:style>
  <w:style w:type="character" w:styleId="Hyperlink"><w:name w:val="Hyperlink"/><w:rPr><w:color w:val="0563C1"/><w:u w:val="single"/></w:rPr></w:style>
</w:styles>"#,
    );
    xml
}

fn document_xml<'a>(model: &'a DocxModel, page: &PageSetup, parts: &mut Parts<'a>) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{NS_W}" xmlns:r="{NS_R}" xmlns:wp="{NS_WP}" xmlns:a="{NS_A}" xmlns:pic="{NS_PIC}"><w:body>"#
    );

    let last = model.sections.len().saturating_sub(1);
    for (i, section) in model.sections.iter().enumerate() {
        for block in &section.blocks {
            match block {
                Block::Paragraph(p) => paragraph_xml(&mut xml, p, parts),
                Block::Table(t) => table_xml(&mut xml, t, page, parts),
                Block::Image(image) => image_paragraph_xml(&mut xml, image, parts),
            }
        }
        // A section's properties close it: inside its last paragraph for
        // every section but the final one, which sits at the end of the body.
        if i == last {
            section_properties_xml(&mut xml, page, section.break_before);
        } else {
            xml.push_str("<w:p><w:pPr>");
            section_properties_xml(&mut xml, page, section.break_before);
            xml.push_str("</w:pPr></w:p>");
        }
    }
    if model.sections.is_empty() {
        section_properties_xml(&mut xml, page, false);
    }

    xml.push_str("</w:body></w:document>");
    xml
}

fn section_properties_xml(xml: &mut String, page: &PageSetup, new_page: bool) {
    xml.push_str("<w:sectPr>");
    if new_page {
        xml.push_str(r#"<w:type w:val="nextPage"/>"#);
    }
    let _ = write!(
        xml,
        r#"<w:pgSz w:w="{}" w:h="{}"/><w:pgMar w:top="{m}" w:right="{m}" w:bottom="{m}" w:left="{m}" w:header="720" w:footer="720" w:gutter="0"/>"#,
        page.width,
        page.height,
        m = page.margin
    );
    xml.push_str("</w:sectPr>");
}

fn paragraph_properties_xml(
    xml: &mut String,
    style: Option<String>,
    alignment: Alignment,
    left: i32,
    first_line: i32,
    shading: Option<&str>,
) {
    if style.is_none() && alignment == Alignment::Left && left == 0 && first_line == 0 && shading.is_none()
    {
        return;
    }
    xml.push_str("<w:pPr>");
    if let Some(style) = style {
        let _ = write!(xml, r#"<w:pStyle w:val="{style}"/>"#);
    }
    if let Some(fill) = shading {
        let _ = write!(
            xml,
            r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
            escape_xml(fill)
        );
    }
    if left != 0 || first_line != 0 {
        let _ = write!(xml, r#"<w:ind w:left="{left}""#);
        if first_line > 0 {
            let _ = write!(xml, r#" w:firstLine="{first_line}""#);
        } else if first_line < 0 {
            let _ = write!(xml, r#" w:hanging="{}""#, -first_line);
        }
        xml.push_str("/>");
    }
    if alignment != Alignment::Left {
        let _ = write!(xml, r#"<w:jc w:val="{}"/>"#, alignment.as_ooxml());
    }
    xml.push_str("</w:pPr>");
}

fn paragraph_xml(xml: &mut String, p: &DocxParagraph, parts: &mut Parts<'_>) {
    xml.push_str("<w:p>");
    paragraph_properties_xml(
        xml,
        p.style.map(|s| s.style_id()),
        p.alignment,
        p.indent.left,
        p.indent.first_line,
        p.shading.as_deref(),
    );
    for run in &p.runs {
        match run {
            Run::Text(r) => run_xml(xml, r, false),
            Run::Break => xml.push_str("<w:r><w:br/></w:r>"),
            Run::Hyperlink { href, run } => {
                let id = parts.hyperlink(href);
                let _ = write!(xml, r#"<w:hyperlink r:id="{id}">"#);
                run_xml(xml, run, true);
                xml.push_str("</w:hyperlink>");
            }
        }
    }
    xml.push_str("</w:p>");
}

fn run_xml(xml: &mut String, run: &TextRun, hyperlink: bool) {
    if run.text.is_empty() {
        return;
    }
    xml.push_str("<w:r>");
    let mut props = String::new();
    if hyperlink {
        props.push_str(r#"<w:rStyle w:val="Hyperlink"/>"#);
    }
    if let Some(font) = &run.font_family {
        let font = escape_xml(font);
        let _ = write!(props, r#"<w:rFonts w:ascii="{font}" w:hAnsi="{font}"/>"#);
    }
    if run.bold {
        props.push_str("<w:b/>");
    }
    if run.italic {
        props.push_str("<w:i/>");
    }
    if run.underline {
        props.push_str(r#"<w:u w:val="single"/>"#);
    }
    if let Some(color) = &run.color {
        let _ = write!(props, r#"<w:color w:val="{}"/>"#, escape_xml(color));
    }
    if let Some(pt) = run.font_size_pt {
        let half_points = (pt * 2.0).round().max(1.0) as u32;
        let _ = write!(props, r#"<w:sz w:val="{half_points}"/>"#);
    }
    if !props.is_empty() {
        let _ = write!(xml, "<w:rPr>{props}</w:rPr>");
    }
    let _ = write!(
        xml,
        r#"<w:t xml:space="preserve">{}</w:t></w:r>"#,
        escape_xml(&run.text)
    );
}

fn table_xml(xml: &mut String, table: &Table, page: &PageSetup, parts: &mut Parts<'_>) {
    let columns = table.column_count();
    if columns == 0 {
        return;
    }
    let col_width = page.content_width() / columns as u32;

    xml.push_str(r#"<w:tbl><w:tblPr><w:tblW w:w="5000" w:type="pct"/><w:tblBorders>"#);
    for edge in ["top", "left", "bottom", "right", "insideH", "insideV"] {
        let _ = write!(
            xml,
            r#"<w:{edge} w:val="single" w:sz="4" w:space="0" w:color="{TABLE_BORDER_COLOR}"/>"#
        );
    }
    xml.push_str(r#"</w:tblBorders><w:tblLayout w:type="fixed"/></w:tblPr><w:tblGrid>"#);
    for _ in 0..columns {
        let _ = write!(xml, r#"<w:gridCol w:w="{col_width}"/>"#);
    }
    xml.push_str("</w:tblGrid>");

    for row in &table.rows {
        xml.push_str("<w:tr>");
        let header_row = !row.cells.is_empty() && row.cells.iter().all(|c| c.header);
        if header_row {
            xml.push_str("<w:trPr><w:tblHeader/></w:trPr>");
        }
        for cell in &row.cells {
            cell_xml(xml, cell, col_width, parts);
        }
        // Short rows are padded so every row spans the grid.
        for _ in row.cells.len()..columns {
            let _ = write!(
                xml,
                r#"<w:tc><w:tcPr><w:tcW w:w="{col_width}" w:type="dxa"/></w:tcPr><w:p/></w:tc>"#
            );
        }
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
    // Word merges adjacent tables without a paragraph between them.
    xml.push_str("<w:p/>");
}

fn cell_xml(xml: &mut String, cell: &Cell, width: u32, parts: &mut Parts<'_>) {
    let _ = write!(xml, r#"<w:tc><w:tcPr><w:tcW w:w="{width}" w:type="dxa"/>"#);
    if let Some(fill) = &cell.background {
        let _ = write!(
            xml,
            r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
            escape_xml(fill)
        );
    }
    xml.push_str("</w:tcPr>");
    let paragraph = DocxParagraph {
        alignment: cell.alignment,
        runs: cell.runs.iter().map(Run::from_text).collect(),
        ..Default::default()
    };
    paragraph_xml(xml, &paragraph, parts);
    xml.push_str("</w:tc>");
}

fn image_paragraph_xml<'a>(xml: &mut String, image: &'a ImageElement, parts: &mut Parts<'a>) {
    let (id, drawing_id) = parts.add_image(image);
    let cx = i64::from(image.width) * EMU_PER_PX;
    let cy = i64::from(image.height) * EMU_PER_PX;

    xml.push_str("<w:p>");
    paragraph_properties_xml(xml, None, image.alignment, 0, 0, None);
    let _ = write!(
        xml,
        r#"<w:r><w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0"><wp:extent cx="{cx}" cy="{cy}"/><wp:effectExtent l="0" t="0" r="0" b="0"/><wp:docPr id="{drawing_id}" name="Picture {drawing_id}"/><wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect="1"/></wp:cNvGraphicFramePr><a:graphic><a:graphicData uri="{NS_PIC}"><pic:pic><pic:nvPicPr><pic:cNvPr id="{drawing_id}" name="Picture {drawing_id}"/><pic:cNvPicPr/></pic:nvPicPr><pic:blipFill><a:blip r:embed="{id}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill><pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#
    );
    xml.push_str("</w:p>");
}
