//! # folio
//!
//! Export pipeline for long structured reports: per-section rich-text
//! markup in, an editable DOCX document and a paginated PDF out.
//!
//! ## Pipeline
//!
//! - [`style::resolve`] turns an inline `style` attribute into a
//!   [`StyleAttributes`] bag.
//! - [`compiler::convert`] walks a parsed markup tree and emits
//!   [`DocumentElement`]s (headings, paragraphs, list items, tables, images).
//! - [`sections::assemble`] numbers the selected sections, and
//!   [`sections::generate_table_of_contents`] lists the ones with content.
//! - [`export::DocxExporter`] builds the editable document;
//!   [`export::PdfExporter`] renders one long bitmap and slices it into
//!   pages.
//!
//! ## Quick Start
//!
//! ```no_run
//! use folio::export::{DocxExporter, ExportRequest, Exporter, PdfExporter};
//! use folio::sections::{ContentMap, assemble};
//! use std::collections::HashMap;
//! use std::path::Path;
//!
//! # async fn run() -> folio::Result<()> {
//! let sections = assemble(&["cover-page", "table-of-contents", "scope"], &[], &HashMap::new());
//! let mut content = ContentMap::new();
//! content.insert("scope".into(), "<p>Everything in the <b>west</b> wing.</p>".into());
//!
//! let request = ExportRequest::new("Site Survey", sections.ordered, content);
//! DocxExporter::new().export_document(&request).await?.save(Path::new("out"))?;
//! PdfExporter::new().export_pages(&request).await?.save(Path::new("out"))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Converting markup
//!
//! ```
//! use folio::{convert_markup, DocumentElement};
//! use folio::style::Alignment;
//!
//! let elements = convert_markup(r#"<p style="text-align:center">Hi <strong>there</strong></p>"#, None);
//! let DocumentElement::Paragraph(p) = &elements[0] else { unreachable!() };
//! assert_eq!(p.alignment, Alignment::Center);
//! assert!(p.runs[1].bold);
//! ```

pub mod compiler;
pub mod config;
pub mod dom;
pub mod error;
pub mod export;
pub mod ir;
pub mod render;
pub mod sections;
pub mod style;
pub mod util;

pub use compiler::{RichTextNode, convert, convert_markup, parse_markup};
pub use config::ExportConfig;
pub use error::{Error, FailureCause, Result};
pub use export::{
    DocxExporter, ExportArtifact, ExportRequest, ExportState, ExportTarget, Exporter, PdfExporter,
};
pub use ir::{DocumentElement, TextRun};
pub use sections::{SectionDescriptor, assemble, generate_table_of_contents, remove_duplicate_title};
pub use style::{StyleAttributes, resolve};
pub use util::sanitize_file_name;
