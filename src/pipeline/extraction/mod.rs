pub mod pdf;
pub mod types;

pub use pdf::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Unsupported document format: expected application/pdf")]
    UnsupportedFormat,

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),
}
