//! Client quotation and technical draft reports.
//!
//! [`generate`] lays pieces out into a [`Document`], a renderer such as
//! [`PdfRenderer`] turns it into bytes and a [`ReportSink`] stores them.

mod document;
mod error;
mod generator;
mod pdf;

#[cfg(not(target_arch = "wasm32"))]
pub use document::DirectorySink;
pub use document::{
    Document, DocumentRenderer, DrawOp, PAGE_HEIGHT_MM, PAGE_WIDTH_MM, Page, ReportSink, Rgb,
};
pub use error::ReportError;
pub use generator::{ReportVariant, format_date, generate, partition_by_group};
pub use pdf::PdfRenderer;
