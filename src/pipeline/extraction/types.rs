use super::ExtractionError;

/// Declared media type a document must carry to be extractable.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// An uploaded document: raw bytes plus the media type the caller declared.
/// Immutable once received.
#[derive(Debug, Clone)]
pub struct Document {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

impl Document {
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            bytes,
            media_type: media_type.into(),
        }
    }

    /// Whether the declared media type is PDF. The parameter suffix
    /// (`application/pdf; charset=...`) is tolerated.
    pub fn declares_pdf(&self) -> bool {
        self.media_type
            .split(';')
            .next()
            .map(str::trim)
            .is_some_and(|t| t.eq_ignore_ascii_case(PDF_MEDIA_TYPE))
    }
}

/// Plain-text content of a document. One blob, no page or position
/// structure; lives only for the duration of a single check request.
#[derive(Debug, Clone)]
pub struct ExtractedText(pub String);

impl ExtractedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Extraction seam: anything that can turn a document into plain text.
/// `Send + Sync` so an extractor can be shared across handler tasks and
/// moved onto a blocking thread.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, document: &Document) -> Result<ExtractedText, ExtractionError>;
}
