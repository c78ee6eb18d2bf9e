//! Sentence-window chunking.
//!
//! Text is whitespace-normalized, split into sentences, and grouped into
//! windows of `sentences_per_chunk` sentences. Consecutive windows start
//! `sentences_per_chunk - overlap` sentences apart; every window after the
//! first is prefixed with the `overlap` sentences preceding it.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::sentences::{self, SentenceTokenizer};
use docsplit_core::{Error, Result};

/// Sentences per chunk when the caller does not specify one.
pub const DEFAULT_SENTENCES_PER_CHUNK: usize = 5;
/// Overlap when the caller does not specify one.
pub const DEFAULT_OVERLAP: usize = 0;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Validated chunking parameters: `sentences_per_chunk >= 2` and
/// `0 <= overlap < sentences_per_chunk`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkParams {
    sentences_per_chunk: usize,
    overlap: usize,
}

impl ChunkParams {
    /// Validate raw (possibly negative) request values.
    pub fn new(sentences_per_chunk: i64, overlap: i64) -> Result<Self> {
        if sentences_per_chunk < 2 {
            return Err(Error::InvalidParameters(format!(
                "sentences_per_chunk must be at least 2 (got {sentences_per_chunk})"
            )));
        }
        if overlap < 0 || overlap >= sentences_per_chunk {
            return Err(Error::InvalidParameters(format!(
                "overlap must be between 0 and sentences_per_chunk - 1 \
                 (got overlap={overlap}, sentences_per_chunk={sentences_per_chunk})"
            )));
        }

        let to_usize = |value: i64| {
            usize::try_from(value).map_err(|_| {
                Error::InvalidParameters(format!("{value} is too large for this platform"))
            })
        };
        Ok(Self {
            sentences_per_chunk: to_usize(sentences_per_chunk)?,
            overlap: to_usize(overlap)?,
        })
    }

    pub fn sentences_per_chunk(&self) -> usize {
        self.sentences_per_chunk
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Distance between the start indices of consecutive windows; always >= 1.
    pub fn stride(&self) -> usize {
        self.sentences_per_chunk - self.overlap
    }
}

impl Default for ChunkParams {
    fn default() -> Self {
        Self {
            sentences_per_chunk: DEFAULT_SENTENCES_PER_CHUNK,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

/// Collapse every whitespace run (newlines included) to one space and trim.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Sentence index ranges making up one chunk.
///
/// `overlap_start..start` is the prefix carried over from the previous
/// window (empty for the first window); `start..end` is the window itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentenceWindow {
    pub overlap_start: usize,
    pub start: usize,
    pub end: usize,
}

impl SentenceWindow {
    pub fn has_overlap(&self) -> bool {
        self.overlap_start < self.start
    }
}

/// Window layout for `total_sentences` sentences.
pub fn plan_windows(total_sentences: usize, params: &ChunkParams) -> Vec<SentenceWindow> {
    let mut windows = Vec::new();
    let mut i = 0;

    while i < total_sentences {
        let end = i.saturating_add(params.sentences_per_chunk).min(total_sentences);
        let overlap_start = if params.overlap > 0 && i > 0 {
            i.saturating_sub(params.overlap)
        } else {
            i
        };
        windows.push(SentenceWindow {
            overlap_start,
            start: i,
            end,
        });
        i += params.stride();
    }

    windows
}

/// Build chunk strings from an already tokenized sentence list.
pub fn assemble_chunks<S: AsRef<str>>(sentences: &[S], params: &ChunkParams) -> Vec<String> {
    plan_windows(sentences.len(), params)
        .into_iter()
        .map(|window| {
            let core = join_sentences(&sentences[window.start..window.end]);
            let chunk = if window.has_overlap() {
                let prefix = join_sentences(&sentences[window.overlap_start..window.start]);
                format!("{prefix} {core}")
            } else {
                core
            };
            chunk.trim().to_string()
        })
        .collect()
}

fn join_sentences<S: AsRef<str>>(sentences: &[S]) -> String {
    sentences
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits text into overlapping sentence windows.
pub struct SentenceChunker<'a> {
    tokenizer: &'a dyn SentenceTokenizer,
}

impl<'a> SentenceChunker<'a> {
    pub fn new(tokenizer: &'a dyn SentenceTokenizer) -> Self {
        Self { tokenizer }
    }

    /// Chunk `text` with already validated parameters.
    ///
    /// Text without any sentence yields no chunks; that is not an error.
    pub fn chunk(&self, text: &str, params: &ChunkParams) -> Vec<String> {
        let cleaned = normalize_whitespace(text);
        let sentences = self.tokenizer.split(&cleaned);

        if sentences.is_empty() {
            info!("No sentences found in text, returning no chunks");
            return Vec::new();
        }

        let chunks = assemble_chunks(&sentences, params);
        debug!(
            "Chunked {} sentences into {} chunks (sentences_per_chunk={}, overlap={})",
            sentences.len(),
            chunks.len(),
            params.sentences_per_chunk,
            params.overlap
        );
        chunks
    }

    /// Validate raw parameters, then chunk.
    pub fn chunk_text(
        &self,
        text: &str,
        sentences_per_chunk: i64,
        overlap: i64,
    ) -> Result<Vec<String>> {
        let params = ChunkParams::new(sentences_per_chunk, overlap)?;
        Ok(self.chunk(text, &params))
    }
}

impl SentenceChunker<'static> {
    /// Chunker backed by the process-wide sentence tokenizer.
    pub fn global() -> Self {
        Self::new(sentences::global())
    }
}

/// Chunk `text` with the process-wide sentence tokenizer.
pub fn chunk_text(text: &str, sentences_per_chunk: i64, overlap: i64) -> Result<Vec<String>> {
    SentenceChunker::global().chunk_text(text, sentences_per_chunk, overlap)
}
