//! Export targets.
//!
//! Both targets share the front end (section assembly, deduplication, the
//! markup visitor) and diverge at the back end:
//!
//! - [`DocxExporter`] builds an editable WordprocessingML package.
//! - [`PdfExporter`] renders the whole report to one bitmap, slices it into
//!   page bands and wraps them in a PDF.
//!
//! # Architecture
//!
//! Exporters follow a builder pattern:
//! - `new()` creates an exporter with default configuration
//! - `with_config()` allows customization
//! - `export_document()` / `export_pages()` produce an [`ExportArtifact`]
//!
//! Calling the method that belongs to the other target fails immediately
//! with [`Error::WrongTarget`].
//!
//! # Example
//!
//! ```no_run
//! use folio::export::{DocxExporter, ExportRequest, Exporter};
//! use folio::sections::{assemble, ContentMap};
//! use std::collections::HashMap;
//!
//! # async fn run() -> folio::Result<()> {
//! let sections = assemble(&["introduction"], &[], &HashMap::new());
//! let mut content = ContentMap::new();
//! content.insert("introduction".into(), "<p>Hello</p>".into());
//!
//! let request = ExportRequest::new("Quarterly Report", sections.ordered, content);
//! let artifact = DocxExporter::new().export_document(&request).await?;
//! artifact.save(std::path::Path::new("out"))?;
//! # Ok(())
//! # }
//! ```

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::sections::{
    ContentMap, SectionDescriptor, generate_table_of_contents, remove_duplicate_title,
};
use crate::util::sanitize_file_name;

mod cover;
pub mod docx;
pub mod pdf;
mod state;

pub use cover::CoverSettings;
pub use docx::{DocxConfig, DocxExporter};
pub use pdf::{PdfConfig, PdfExporter};
pub use state::{ExportState, ExportTracker};

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportTarget {
    /// Editable word-processing document.
    Docx,
    /// Paginated, image-based document.
    Pdf,
}

impl ExportTarget {
    pub fn extension(self) -> &'static str {
        match self {
            ExportTarget::Docx => "docx",
            ExportTarget::Pdf => "pdf",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportTarget::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportTarget::Pdf => "application/pdf",
        }
    }
}

impl fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportTarget::Docx => "DOCX",
            ExportTarget::Pdf => "PDF",
        })
    }
}

/// Everything an export needs, supplied by the host application.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub project_name: String,
    /// Sections in display order.
    pub sections: Vec<SectionDescriptor>,
    /// Section id to generated body markup.
    pub content: ContentMap,
    pub cover: CoverSettings,
    /// Rich custom cover markup, rendered instead of the fallback cover.
    pub cover_html: Option<String>,
}

impl ExportRequest {
    /// Sections without a body pick it up from `content`; bodies already
    /// attached to sections are recorded in `content`, so the table of
    /// contents and the exported sections agree.
    pub fn new(
        project_name: impl Into<String>,
        mut sections: Vec<SectionDescriptor>,
        mut content: ContentMap,
    ) -> Self {
        for section in &mut sections {
            if section.body().is_none() {
                section.raw_content = content.get(&section.id).cloned();
            }
            if let Some(body) = section.body() {
                content.insert(section.id.clone(), body.to_string());
            }
        }
        Self {
            project_name: project_name.into(),
            sections,
            content,
            cover: CoverSettings::default(),
            cover_html: None,
        }
    }

    pub fn with_cover(mut self, cover: CoverSettings) -> Self {
        self.cover = cover;
        self
    }

    pub fn with_cover_html(mut self, html: impl Into<String>) -> Self {
        self.cover_html = Some(html.into());
        self
    }

    /// Sanitized project name plus the target's extension.
    pub fn file_name(&self, target: ExportTarget) -> String {
        format!(
            "{}.{}",
            sanitize_file_name(&self.project_name),
            target.extension()
        )
    }

    pub(crate) fn custom_cover_html(&self) -> Option<&str> {
        self.cover_html
            .as_deref()
            .filter(|html| !html.trim().is_empty())
    }

    pub(crate) fn fallback_cover_html(&self) -> String {
        self.cover.fallback_html(&self.project_name)
    }

    /// Sections that follow the cover, in order.
    pub(crate) fn body_sections(&self) -> impl Iterator<Item = &SectionDescriptor> {
        self.sections.iter().filter(|s| !s.is_cover())
    }

    /// Markup to embed under a section's heading, or `None` while pending.
    ///
    /// The table of contents is generated; every other body has its
    /// duplicated title heading removed.
    pub(crate) fn section_markup<'a>(
        &'a self,
        section: &'a SectionDescriptor,
    ) -> Option<Cow<'a, str>> {
        if section.is_table_of_contents() {
            return Some(Cow::Owned(generate_table_of_contents(
                &self.sections,
                &self.content,
            )));
        }
        section
            .body()
            .map(|body| remove_duplicate_title(body, &section.title))
    }
}

/// A finished export, held in memory until saved.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub target: ExportTarget,
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Lifecycle the export went through.
    pub states: Vec<ExportState>,
    /// Number of output pages, for the paginated target.
    pub page_count: Option<usize>,
}

impl ExportArtifact {
    /// Write the artifact into `dir`, returning the full path.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        if self.bytes.is_empty() {
            return Err(Error::Assembly(format!("{} output is empty", self.target))
                .in_export(self.target));
        }
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes).map_err(|source| Error::Save {
            path: path.clone(),
            source,
        })?;
        log::info!("saved {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// An export back end.
///
/// Each exporter implements the one method that matches its target; the
/// other keeps its default and rejects the call.
#[allow(async_fn_in_trait)]
pub trait Exporter {
    fn target(&self) -> ExportTarget;

    /// Produce an editable document.
    async fn export_document(&self, request: &ExportRequest) -> Result<ExportArtifact> {
        let _ = request;
        Err(Error::WrongTarget {
            target: self.target(),
            method: "export_document",
        })
    }

    /// Produce a paginated, image-based document.
    async fn export_pages(&self, request: &ExportRequest) -> Result<ExportArtifact> {
        let _ = request;
        Err(Error::WrongTarget {
            target: self.target(),
            method: "export_pages",
        })
    }

    /// Run whichever method matches this exporter's target.
    async fn export(&self, request: &ExportRequest) -> Result<ExportArtifact> {
        match self.target() {
            ExportTarget::Docx => self.export_document(request).await,
            ExportTarget::Pdf => self.export_pages(request).await,
        }
    }
}
