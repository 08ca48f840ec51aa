//! Paginated, image-based export.
//!
//! The whole report is composed as one long markup document, rendered to a
//! single bitmap on an off-screen surface, cut into page-height bands and
//! wrapped one band per page.

mod compose;
mod paginate;
mod writer;

pub use compose::{compose_document_html, print_css};
pub use paginate::{PageBand, document_height_mm, page_count, paginate};
pub use writer::PdfWriter;

use super::{ExportArtifact, ExportRequest, ExportState, ExportTarget, ExportTracker, Exporter};
use crate::config::ExportConfig;
use crate::error::{Error, Result};
use crate::render::{SoftwareSurfaceProvider, SurfaceProvider, render_markup};

/// Configuration for PDF export.
#[derive(Debug, Clone)]
pub struct PdfConfig {
    /// Compression level for page images (0-9, default 6).
    pub compression_level: Option<u32>,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            compression_level: Some(6),
        }
    }
}

/// PDF format exporter.
///
/// # Example
///
/// ```no_run
/// use folio::export::{ExportRequest, Exporter, PdfExporter};
///
/// # async fn run(request: ExportRequest) -> folio::Result<()> {
/// let artifact = PdfExporter::new().export_pages(&request).await?;
/// println!("{} pages", artifact.page_count.unwrap_or(0));
/// # Ok(())
/// # }
/// ```
pub struct PdfExporter<P = SoftwareSurfaceProvider> {
    config: PdfConfig,
    export: ExportConfig,
    provider: P,
}

impl PdfExporter {
    /// Create a new exporter with default configuration.
    pub fn new() -> Self {
        let export = ExportConfig::default();
        Self {
            config: PdfConfig::default(),
            provider: SoftwareSurfaceProvider::new().with_heading_color(&export.brand_color),
            export,
        }
    }
}

impl Default for PdfExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: SurfaceProvider> PdfExporter<P> {
    /// Configure the exporter with custom settings.
    pub fn with_config(mut self, config: PdfConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_export_config(mut self, export: ExportConfig) -> Self {
        self.provider.set_heading_color(&export.brand_color);
        self.export = export;
        self
    }

    /// Render on another surface.
    pub fn with_provider<Q: SurfaceProvider>(self, mut provider: Q) -> PdfExporter<Q> {
        provider.set_heading_color(&self.export.brand_color);
        PdfExporter {
            config: self.config,
            export: self.export,
            provider,
        }
    }

    async fn run(
        &self,
        request: &ExportRequest,
        tracker: &mut ExportTracker,
    ) -> Result<(Vec<u8>, usize)> {
        tracker.advance(ExportState::Composing)?;
        let html = compose_document_html(request, &self.export);

        tracker.advance(ExportState::Rendering)?;
        let bitmap = render_markup(&self.provider, &html, &self.export).await?;

        tracker.advance(ExportState::Assembling)?;
        let bands = paginate(
            &bitmap,
            self.export.page_width_mm,
            self.export.page_height_mm,
        )?;
        drop(bitmap);

        let mut writer = PdfWriter::new(
            self.export.page_width_mm,
            self.export.page_height_mm,
            self.config.compression_level.unwrap_or(6),
        );
        for band in &bands {
            writer.add_band(band)?;
        }
        let pages = writer.page_count();
        let mut bytes = Vec::new();
        writer.finish(&request.project_name, &mut bytes)?;
        if pages == 0 || bytes.is_empty() {
            return Err(Error::Assembly("paginated document is empty".to_string()));
        }

        tracker.advance(ExportState::Emitted)?;
        Ok((bytes, pages))
    }
}

impl<P: SurfaceProvider> Exporter for PdfExporter<P> {
    fn target(&self) -> ExportTarget {
        ExportTarget::Pdf
    }

    async fn export_pages(&self, request: &ExportRequest) -> Result<ExportArtifact> {
        let mut tracker = ExportTracker::new(ExportTarget::Pdf);
        match self.run(request, &mut tracker).await {
            Ok((bytes, pages)) => {
                let file_name = request.file_name(ExportTarget::Pdf);
                log::info!("exported {file_name}: {pages} page(s), {} bytes", bytes.len());
                Ok(ExportArtifact {
                    target: ExportTarget::Pdf,
                    file_name,
                    bytes,
                    states: tracker.into_history(),
                    page_count: Some(pages),
                })
            }
            Err(err) => Err(tracker.fail(err)),
        }
    }
}
