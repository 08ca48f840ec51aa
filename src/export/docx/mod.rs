//! Editable word-processing export.
//!
//! The report becomes a WordprocessingML package with two sections: the
//! cover, and the body starting on a new page. A custom cover is rasterized
//! through the render surface and embedded as one picture; when there is
//! none, or it fails to render, the cover is built from plain headings.

mod model;
mod writer;

pub use model::{
    Block, DocumentModelBuilder, DocxModel, DocxParagraph, DocxSection, ParagraphStyle, Run,
};
pub use writer::write_package;

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};

use super::{ExportArtifact, ExportRequest, ExportState, ExportTarget, ExportTracker, Exporter};
use crate::compiler::{CONTENT_WIDTH_PX, convert_markup};
use crate::config::ExportConfig;
use crate::error::{Error, Result};
use crate::ir::ImageElement;
use crate::render::{SoftwareSurfaceProvider, SurfaceProvider, render_markup};
use crate::style::Alignment;
use crate::util::MediaFormat;

const COVER_MAX_HEIGHT_PX: u32 = 900;

/// Configuration for DOCX export.
#[derive(Debug, Clone)]
pub struct DocxConfig {
    /// Compression level for deflate (0-9, default 6).
    pub compression_level: Option<u32>,
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    /// Page margin on every side, in twentieths of a point.
    pub margin_twips: u32,
    /// Colour of section and body headings, 6-digit hex.
    pub heading_color: String,
    pub body_font: String,
}

impl Default for DocxConfig {
    fn default() -> Self {
        Self {
            compression_level: Some(6),
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_twips: 1440,
            heading_color: "1F3864".to_string(),
            body_font: "Calibri".to_string(),
        }
    }
}

/// DOCX format exporter.
///
/// # Example
///
/// ```no_run
/// use folio::export::{DocxExporter, ExportRequest, Exporter};
///
/// # async fn run(request: ExportRequest) -> folio::Result<()> {
/// let artifact = DocxExporter::new().export_document(&request).await?;
/// assert!(artifact.file_name.ends_with(".docx"));
/// # Ok(())
/// # }
/// ```
pub struct DocxExporter<P = SoftwareSurfaceProvider> {
    config: DocxConfig,
    export: ExportConfig,
    provider: P,
}

impl DocxExporter {
    /// Create a new exporter with default configuration.
    pub fn new() -> Self {
        let export = ExportConfig::default();
        Self {
            config: DocxConfig::default(),
            provider: SoftwareSurfaceProvider::new().with_heading_color(&export.brand_color),
            export,
        }
    }
}

impl Default for DocxExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: SurfaceProvider> DocxExporter<P> {
    /// Configure the exporter with custom settings.
    pub fn with_config(mut self, config: DocxConfig) -> Self {
        self.config = config;
        self
    }

    /// Take page size and brand colour from the shared configuration.
    pub fn with_export_config(mut self, export: ExportConfig) -> Self {
        self.config.page_width_mm = export.page_width_mm;
        self.config.page_height_mm = export.page_height_mm;
        self.config.heading_color = export.brand_color.clone();
        self.provider.set_heading_color(&export.brand_color);
        self.export = export;
        self
    }

    /// Rasterize custom covers with another surface.
    pub fn with_provider<Q: SurfaceProvider>(self, mut provider: Q) -> DocxExporter<Q> {
        provider.set_heading_color(&self.export.brand_color);
        DocxExporter {
            config: self.config,
            export: self.export,
            provider,
        }
    }

    /// Build the document model without serializing it.
    pub async fn build_model(&self, request: &ExportRequest) -> DocxModel {
        let color = Some(self.config.heading_color.as_str());
        let mut builder = DocumentModelBuilder::new(color);

        match self.custom_cover(request).await {
            Some(image) => builder.cover_image(image),
            None => builder.cover_elements(&convert_markup(&request.fallback_cover_html(), color)),
        };

        for section in request.body_sections() {
            let body = request
                .section_markup(section)
                .map(|markup| convert_markup(&markup, color));
            if body.is_none() {
                log::debug!("section {} has no content yet; heading only", section.id);
            }
            builder.section(&section.heading_text(), body.as_deref());
        }
        builder.build(request.project_name.as_str())
    }

    async fn custom_cover(&self, request: &ExportRequest) -> Option<ImageElement> {
        let html = request.custom_cover_html()?;
        match self.rasterize_cover(html).await {
            Ok(image) => Some(image),
            Err(err) => {
                log::warn!("custom cover did not render, using the plain cover: {err}");
                None
            }
        }
    }

    async fn rasterize_cover(&self, html: &str) -> Result<ImageElement> {
        let bitmap = render_markup(&self.provider, html, &self.export).await?;
        let (bitmap_w, bitmap_h) = bitmap.dimensions();

        let mut width = CONTENT_WIDTH_PX as u32;
        let mut height = (u64::from(bitmap_h) * u64::from(width) / u64::from(bitmap_w)) as u32;
        if height > COVER_MAX_HEIGHT_PX {
            width = (u64::from(width) * u64::from(COVER_MAX_HEIGHT_PX) / u64::from(height)) as u32;
            height = COVER_MAX_HEIGHT_PX;
        }

        let mut data = Vec::new();
        DynamicImage::ImageRgba8(bitmap).write_to(&mut Cursor::new(&mut data), ImageFormat::Png)?;
        log::debug!("cover rasterized at {bitmap_w}x{bitmap_h}, embedded at {width}x{height}");
        Ok(ImageElement {
            data,
            format: MediaFormat::Png,
            width: width.max(1),
            height: height.max(1),
            alignment: Alignment::Center,
        })
    }

    async fn run(&self, request: &ExportRequest, tracker: &mut ExportTracker) -> Result<Vec<u8>> {
        tracker.advance(ExportState::Composing)?;
        let model = self.build_model(request).await;

        tracker.advance(ExportState::Assembling)?;
        let mut buffer = Cursor::new(Vec::new());
        write_package(&model, &self.config, &mut buffer)?;
        let bytes = buffer.into_inner();
        if bytes.is_empty() {
            return Err(Error::Assembly("document package is empty".to_string()));
        }

        tracker.advance(ExportState::Emitted)?;
        Ok(bytes)
    }
}

impl<P: SurfaceProvider> Exporter for DocxExporter<P> {
    fn target(&self) -> ExportTarget {
        ExportTarget::Docx
    }

    async fn export_document(&self, request: &ExportRequest) -> Result<ExportArtifact> {
        let mut tracker = ExportTracker::new(ExportTarget::Docx);
        match self.run(request, &mut tracker).await {
            Ok(bytes) => {
                let file_name = request.file_name(ExportTarget::Docx);
                log::info!("exported {file_name} ({} bytes)", bytes.len());
                Ok(ExportArtifact {
                    target: ExportTarget::Docx,
                    file_name,
                    bytes,
                    states: tracker.into_history(),
                    page_count: None,
                })
            }
            Err(err) => Err(tracker.fail(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::{ContentMap, assemble};
    use std::collections::HashMap;

    fn request(cover_html: Option<&str>) -> ExportRequest {
        let sections = assemble(&["cover-page", "introduction", "scope"], &[], &HashMap::new());
        let mut content = ContentMap::new();
        content.insert(
            "introduction".into(),
            "<h2>Introduction</h2><p>Opening text.</p>".into(),
        );
        let request = ExportRequest::new("Audit", sections.ordered, content);
        match cover_html {
            Some(html) => request.with_cover_html(html),
            None => request,
        }
    }

    #[tokio::test]
    async fn test_model_structure() {
        let model = DocxExporter::new().build_model(&request(None)).await;
        assert_eq!(model.sections.len(), 2);
        let headings: Vec<String> = model.sections[1]
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph(p) if p.style == Some(ParagraphStyle::Heading(1)) => {
                    match &p.runs[0] {
                        Run::Text(r) => Some(r.text.clone()),
                        _ => None,
                    }
                }
                _ => None,
            })
            .collect();
        // Duplicate title removed; pending scope keeps its heading.
        assert_eq!(headings, ["2. Introduction", "3. Scope"]);
    }

    #[tokio::test]
    async fn test_custom_cover_is_rasterized() {
        let exporter = DocxExporter::new().with_export_config(ExportConfig {
            settle_delay_ms: 1,
            ..Default::default()
        });
        let model = exporter
            .build_model(&request(Some("<h1>Custom cover</h1><p>Prepared for Acme</p>")))
            .await;
        let cover = &model.sections[0].blocks;
        assert_eq!(cover.len(), 1);
        let Block::Image(image) = &cover[0] else {
            panic!("expected cover image");
        };
        assert_eq!(image.format, MediaFormat::Png);
        assert_eq!(image.width, CONTENT_WIDTH_PX as u32);
    }

    #[tokio::test]
    async fn test_custom_cover_headings_use_brand_color() {
        let exporter = DocxExporter::new().with_export_config(ExportConfig {
            settle_delay_ms: 1,
            brand_color: "C00000".into(),
            ..Default::default()
        });
        let model = exporter
            .build_model(&request(Some("<h1>Custom cover</h1>")))
            .await;
        let Block::Image(image) = &model.sections[0].blocks[0] else {
            panic!("expected cover image");
        };
        let bitmap = image::load_from_memory(&image.data).unwrap().to_rgba8();
        assert!(bitmap.pixels().any(|p| p.0 == [0xC0, 0x00, 0x00, 0xFF]));
    }

    #[tokio::test]
    async fn test_blank_custom_cover_uses_fallback() {
        let model = DocxExporter::new().build_model(&request(Some("   "))).await;
        assert!(matches!(model.sections[0].blocks[0], Block::Paragraph(_)));
    }

    #[tokio::test]
    async fn test_export_pages_is_wrong_target() {
        let err = DocxExporter::new()
            .export_pages(&request(None))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::WrongTarget {
                target: ExportTarget::Docx,
                method: "export_pages"
            }
        ));
    }

    #[tokio::test]
    async fn test_states_recorded() {
        let artifact = DocxExporter::new()
            .export_document(&request(None))
            .await
            .unwrap();
        assert_eq!(
            artifact.states,
            [
                ExportState::Idle,
                ExportState::Composing,
                ExportState::Assembling,
                ExportState::Emitted
            ]
        );
        assert_eq!(artifact.file_name, "Audit.docx");
    }
}
