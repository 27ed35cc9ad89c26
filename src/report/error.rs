//! Error types for report generation and export.

use thiserror::Error;

use crate::drawing::CodecError;

/// Errors that can occur while rendering or saving a report.
#[derive(Error, Debug)]
pub enum ReportError {
    /// PDF backend failure
    #[error("PDF error: {0}")]
    Pdf(String),

    /// A piece drawing couldn't be decoded
    #[error("Invalid drawing: {0}")]
    Image(#[from] CodecError),

    /// I/O error when writing the file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// There are no pieces to report on
    #[error("No pieces to export")]
    NothingToExport,

    /// Browser download couldn't be started
    #[error("Download failed: {0}")]
    Download(String),
}
