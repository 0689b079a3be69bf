//! PDF text extraction adapter.

use crate::errors::{AdapterError, Result};

pub trait PdfTextExtractor: Send + Sync {
    fn extract(&self, pdf: &[u8]) -> Result<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtract;

impl PdfTextExtractor for PdfExtract {
    fn extract(&self, pdf: &[u8]) -> Result<String> {
        if !pdf.starts_with(b"%PDF") {
            return Err(AdapterError::Pdf("not a PDF document".into()));
        }
        pdf_extract::extract_text_from_mem(pdf).map_err(|err| AdapterError::Pdf(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_pdf_input() {
        let err = PdfExtract.extract(b"plain text").unwrap_err();
        assert!(matches!(err, AdapterError::Pdf(_)));
    }
}
