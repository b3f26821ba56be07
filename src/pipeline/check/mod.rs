pub mod batch;
pub mod evaluator;
pub mod gemini;
pub mod prompt;
pub mod reply;
pub mod types;

pub use batch::*;
pub use evaluator::*;
pub use gemini::*;
pub use prompt::*;
pub use reply::*;
pub use types::*;

use thiserror::Error;

/// Failures of a single outbound generation call. Caught per rule and
/// degraded to an `Error` verdict — they never abort the batch.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Cannot reach the text-generation API at {0}")]
    Connection(String),

    #[error("Generation request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Text-generation API returned error (status {status}): {body}")]
    ServiceStatus { status: u16, body: String },

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}
