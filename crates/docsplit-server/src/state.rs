//! Shared application state.

use docsplit_core::DocSplitConfig;
use docsplit_ingest::{ExtractorRegistry, Ingester, SentenceTokenizer};

/// Read-only state shared by all request handlers.
pub struct AppState {
    pub config: DocSplitConfig,
    pub registry: ExtractorRegistry,
    pub tokenizer: &'static dyn SentenceTokenizer,
}

impl AppState {
    pub fn new(
        config: DocSplitConfig,
        registry: ExtractorRegistry,
        tokenizer: &'static dyn SentenceTokenizer,
    ) -> Self {
        Self {
            config,
            registry,
            tokenizer,
        }
    }

    /// Extraction/chunking pipeline borrowing this state.
    pub fn ingester(&self) -> Ingester<'_> {
        Ingester::new(&self.registry, self.tokenizer)
    }
}
