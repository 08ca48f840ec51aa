//! Error types for folio export operations.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::export::ExportTarget;

/// Errors that can occur while exporting a report.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// The off-screen surface produced nothing usable.
    #[error("render failed: {0}")]
    Render(String),

    /// The output artifact could not be put together.
    #[error("assembly failed: {0}")]
    Assembly(String),

    #[error("could not save {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("wrong method for this target: {method} is not supported by the {target} exporter")]
    WrongTarget {
        target: ExportTarget,
        method: &'static str,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{target} export failed: {source}")]
    Export {
        target: ExportTarget,
        #[source]
        source: Box<Error>,
    },
}

/// Coarse classification of a pipeline failure, for end-user messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCause {
    /// Content failed to render (zero-size capture, surface errors).
    Render,
    /// The document could not be assembled (empty output, encoder errors).
    Assembly,
    /// Writing the artifact failed (missing directory, permissions).
    Save,
    /// The caller used the API incorrectly.
    Caller,
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureCause::Render => "the content failed to render",
            FailureCause::Assembly => "the document could not be assembled",
            FailureCause::Save => "the file could not be saved",
            FailureCause::Caller => "the export was requested incorrectly",
        };
        f.write_str(text)
    }
}

impl Error {
    /// Classify this error, looking through `Export` context wrappers.
    pub fn cause(&self) -> FailureCause {
        match self {
            Error::Export { source, .. } => source.cause(),
            Error::Render(_) | Error::Image(_) => FailureCause::Render,
            Error::Save { .. } => FailureCause::Save,
            Error::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                FailureCause::Save
            }
            Error::WrongTarget { .. } | Error::InvalidInput(_) => FailureCause::Caller,
            Error::Io(_) | Error::Zip(_) | Error::Pdf(_) | Error::Assembly(_) => {
                FailureCause::Assembly
            }
        }
    }

    /// Wrap a terminal pipeline failure with the target it happened in.
    pub(crate) fn in_export(self, target: ExportTarget) -> Self {
        match self {
            // Caller errors and already-wrapped errors pass through untouched.
            e @ (Error::WrongTarget { .. } | Error::Export { .. }) => e,
            e => Error::Export {
                target,
                source: Box::new(e),
            },
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::Pdf(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_error_keeps_cause() {
        let err = Error::Render("zero-height capture".into()).in_export(ExportTarget::Pdf);
        assert_eq!(err.cause(), FailureCause::Render);
        assert!(err.to_string().starts_with("PDF export failed"));
    }

    #[test]
    fn test_wrong_target_is_not_wrapped() {
        let err = Error::WrongTarget {
            target: ExportTarget::Docx,
            method: "export_pages",
        }
        .in_export(ExportTarget::Docx);
        assert!(matches!(err, Error::WrongTarget { .. }));
        assert_eq!(err.cause(), FailureCause::Caller);
        assert!(err.to_string().contains("wrong method for this target"));
    }

    #[test]
    fn test_save_classification() {
        let err = Error::Save {
            path: PathBuf::from("/nope/report.docx"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(err.cause(), FailureCause::Save);
    }
}
