//! DocSplit Ingest: format-dispatched text extraction and sentence-window chunking.

pub mod chunking;
pub mod extract;
pub mod file;
pub mod ingest;
pub mod sentences;

pub use chunking::{ChunkParams, SentenceChunker, SentenceWindow};
pub use extract::{ExtractorRegistry, FormatHandler};
pub use file::FileType;
pub use ingest::Ingester;
pub use sentences::{SentenceTokenizer, UnicodeSentenceTokenizer};
