//! Format-dispatched text extraction.
//!
//! Each supported format tag maps to a [`FormatHandler`]; tags without a
//! handler fall back to strict UTF-8 decoding of the raw bytes.

mod docx;
mod html;
mod ooxml;
mod pdf;
mod pptx;
mod rtf;
mod text;

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::file::{format_tag, FileType};
use docsplit_core::Result;

pub use docx::DocxHandler;
pub use html::HtmlHandler;
pub use pdf::PdfHandler;
pub use pptx::PptxHandler;
pub use rtf::RtfHandler;
pub use text::PlainTextHandler;

/// Converts the raw bytes of one document format into plain text.
///
/// Implementations hold no per-call state, so a single instance serves
/// concurrent requests.
pub trait FormatHandler: Send + Sync {
    /// Short format label used in logs and error messages.
    fn name(&self) -> &'static str;

    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

/// Maps format tags to handlers, with an explicit fallback.
pub struct ExtractorRegistry {
    handlers: HashMap<String, Arc<dyn FormatHandler>>,
    fallback: Arc<dyn FormatHandler>,
}

impl ExtractorRegistry {
    /// Empty registry: every tag goes to `fallback`.
    pub fn new(fallback: Arc<dyn FormatHandler>) -> Self {
        Self {
            handlers: HashMap::new(),
            fallback,
        }
    }

    /// Registry with every built-in format handler.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new(Arc::new(PlainTextHandler));
        registry
            .register(FileType::PlainText.extensions(), Arc::new(PlainTextHandler))
            .register(FileType::Pdf.extensions(), Arc::new(PdfHandler))
            .register(FileType::Docx.extensions(), Arc::new(DocxHandler))
            .register(FileType::Pptx.extensions(), Arc::new(PptxHandler))
            .register(FileType::Html.extensions(), Arc::new(HtmlHandler))
            .register(FileType::Rtf.extensions(), Arc::new(RtfHandler));
        registry
    }

    /// Route `tags` (case-insensitive) to `handler`, replacing earlier registrations.
    pub fn register(&mut self, tags: &[&str], handler: Arc<dyn FormatHandler>) -> &mut Self {
        for tag in tags {
            self.handlers.insert(tag.to_lowercase(), handler.clone());
        }
        self
    }

    /// Resolve the format tag of `filename` and the handler responsible for it.
    pub fn handler_for(&self, filename: &str) -> (Option<String>, &dyn FormatHandler) {
        let tag = format_tag(filename);
        let handler = tag
            .as_deref()
            .and_then(|t| self.handlers.get(t))
            .unwrap_or(&self.fallback);
        (tag, handler.as_ref())
    }

    /// Registered format tags, sorted.
    pub fn supported_formats(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Extract the text content of an uploaded document.
    pub fn extract(&self, bytes: &[u8], filename: &str) -> Result<String> {
        let (tag, handler) = self.handler_for(filename);
        debug!(
            "Extracting {} ({} bytes, tag={}) with {} handler",
            filename,
            bytes.len(),
            tag.as_deref().unwrap_or("<none>"),
            handler.name()
        );

        handler.extract(bytes).map_err(|e| {
            warn!("Extraction failed for {}: {}", filename, e);
            e
        })
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

static DEFAULT_REGISTRY: Lazy<ExtractorRegistry> = Lazy::new(ExtractorRegistry::with_defaults);

/// Process-wide registry with the built-in handlers.
pub fn default_registry() -> &'static ExtractorRegistry {
    &DEFAULT_REGISTRY
}

/// Extract text from `bytes` using the format implied by `filename`.
pub fn extract(bytes: &[u8], filename: &str) -> Result<String> {
    default_registry().extract(bytes, filename)
}
