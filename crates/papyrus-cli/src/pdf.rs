//! PDF text extraction.

use papyrus_domain::traits::TextExtractor;
use std::path::Path;
use thiserror::Error;

/// Errors from reading a PDF.
#[derive(Debug, Error)]
pub enum PdfError {
    /// The file is not a PDF
    #[error("{0} is not a PDF file")]
    NotPdf(String),

    /// The PDF could not be parsed
    #[error("Failed to extract PDF text: {0}")]
    Extract(String),
}

/// Extracts plain text from PDF files with `pdf-extract`.
///
/// Parsing is CPU-bound and synchronous; callers run it on a blocking thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    type Error = PdfError;

    fn extract_text(&self, path: &Path) -> Result<String, Self::Error> {
        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            return Err(PdfError::NotPdf(path.display().to_string()));
        }

        pdf_extract::extract_text(path).map_err(|e| PdfError::Extract(e.to_string()))
    }
}
