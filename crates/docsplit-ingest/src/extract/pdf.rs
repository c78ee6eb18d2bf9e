use std::panic;

use docsplit_core::{Error, Result};

use super::FormatHandler;

/// PDF text via `pdf-extract`, pages in document order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfHandler;

impl FormatHandler for PdfHandler {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        if bytes.is_empty() {
            return Err(Error::extraction(self.name(), "empty file"));
        }

        // pdf-extract panics on some malformed cross-reference tables.
        match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(Error::extraction(self.name(), e)),
            Err(_) => Err(Error::extraction(
                self.name(),
                "parser aborted on a malformed document",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pdf_rejected() {
        let err = PdfHandler.extract(b"").unwrap_err();
        assert!(matches!(err, Error::Extraction { ref format, .. } if format == "pdf"));
    }

    #[test]
    fn test_garbage_rejected() {
        let err = PdfHandler.extract(b"%PDF-1.4\nthis is not really a pdf").unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }
}
