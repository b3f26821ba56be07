use super::types::{Document, ExtractedText, TextExtractor};
use super::ExtractionError;

/// PDF text extractor using the pdf-extract crate.
/// Handles digital PDFs with embedded text layers; one blocking parse of
/// the whole byte buffer, no retry.
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, document: &Document) -> Result<ExtractedText, ExtractionError> {
        if document.bytes.is_empty() || !document.declares_pdf() {
            return Err(ExtractionError::UnsupportedFormat);
        }

        let page_texts = pdf_extract::extract_text_from_mem_by_pages(&document.bytes)
            .map_err(|e| ExtractionError::PdfParsing(e.to_string()))?;

        // Single-space run separation; no further whitespace normalization.
        let text = page_texts
            .iter()
            .flat_map(|page| page.split_whitespace())
            .collect::<Vec<_>>()
            .join(" ");

        Ok(ExtractedText(text))
    }
}
