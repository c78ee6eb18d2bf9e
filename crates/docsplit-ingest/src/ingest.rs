//! Upload pipeline: bytes → text → chunks.

use tracing::info;

use crate::chunking::{normalize_whitespace, ChunkParams, SentenceChunker};
use crate::extract::{self, ExtractorRegistry};
use crate::sentences::{self, SentenceTokenizer};
use docsplit_core::{Error, Result};

/// Runs extraction and chunking for one uploaded document.
///
/// Holds only shared read-only collaborators, so one instance can serve
/// concurrent requests.
pub struct Ingester<'a> {
    registry: &'a ExtractorRegistry,
    chunker: SentenceChunker<'a>,
}

impl<'a> Ingester<'a> {
    pub fn new(registry: &'a ExtractorRegistry, tokenizer: &'a dyn SentenceTokenizer) -> Self {
        Self {
            registry,
            chunker: SentenceChunker::new(tokenizer),
        }
    }

    /// Extract the text of an upload, rejecting uploads with no visible text.
    pub fn extract_text(&self, bytes: &[u8], filename: &str) -> Result<String> {
        let text = self.registry.extract(bytes, filename)?;
        if text.trim().is_empty() {
            return Err(empty_input(filename));
        }
        info!("Extracted {} chars from {}", text.chars().count(), filename);
        Ok(text)
    }

    /// Extract and chunk an upload. `params` are validated by construction.
    pub fn extract_chunks(
        &self,
        bytes: &[u8],
        filename: &str,
        params: &ChunkParams,
    ) -> Result<Vec<String>> {
        let text = self.registry.extract(bytes, filename)?;
        if normalize_whitespace(&text).is_empty() {
            return Err(empty_input(filename));
        }

        let chunks = self.chunker.chunk(&text, params);
        info!(
            "Split {} into {} chunks (sentences_per_chunk={}, overlap={})",
            filename,
            chunks.len(),
            params.sentences_per_chunk(),
            params.overlap()
        );
        Ok(chunks)
    }
}

impl Ingester<'static> {
    /// Pipeline over the built-in handlers and the process-wide tokenizer.
    pub fn global() -> Self {
        Self::new(extract::default_registry(), sentences::global())
    }
}

fn empty_input(filename: &str) -> Error {
    Error::EmptyInput(format!("no text could be extracted from {filename}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_passes_through() {
        let text = Ingester::global()
            .extract_text(b"Line one.\nLine two.", "notes.txt")
            .unwrap();
        assert_eq!(text, "Line one.\nLine two.");
    }

    #[test]
    fn test_empty_upload_rejected() {
        let ingester = Ingester::global();
        for bytes in [&b""[..], &b"   \n\t "[..], &b"\r\n"[..]] {
            assert!(matches!(
                ingester.extract_text(bytes, "blank.txt"),
                Err(Error::EmptyInput(_))
            ));
            assert!(matches!(
                ingester.extract_chunks(bytes, "blank.md", &ChunkParams::default()),
                Err(Error::EmptyInput(_))
            ));
        }
    }

    #[test]
    fn test_empty_html_rejected() {
        let result = Ingester::global().extract_chunks(
            b"<html><head><title>t</title></head><body><script>x()</script></body></html>",
            "page.html",
            &ChunkParams::default(),
        );
        assert!(matches!(result, Err(Error::EmptyInput(_))));
    }

    #[test]
    fn test_extract_chunks() {
        let params = ChunkParams::new(2, 0).unwrap();
        let chunks = Ingester::global()
            .extract_chunks(b"A one.\nB two.\n\nC three.", "doc.TXT", &params)
            .unwrap();
        assert_eq!(chunks, vec!["A one. B two.", "C three."]);
    }

    #[test]
    fn test_undecodable_upload_is_extraction_error() {
        let result = Ingester::global().extract_chunks(
            &[0xff, 0xfe, 0x00, 0x41],
            "mystery.bin",
            &ChunkParams::default(),
        );
        assert!(matches!(result, Err(Error::Extraction { .. })));
    }
}
