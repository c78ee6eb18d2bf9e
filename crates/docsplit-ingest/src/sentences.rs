//! Sentence boundary detection.
//!
//! UAX #29 sentence boundaries break after every `. ` followed by a capital
//! letter, which splits "Dr. Smith" in two. [`UnicodeSentenceTokenizer`]
//! re-joins pieces that end in a known abbreviation or a single-letter
//! initial.
//!
//! The English tokenizer is process-wide state: call [`init`] once at startup,
//! then share [`global`] read-only.

use std::collections::HashSet;

use once_cell::sync::OnceCell;
use tracing::{debug, info};
use unicode_segmentation::UnicodeSegmentation;

/// Splits text into sentences.
///
/// Returned slices are trimmed, non-empty, in document order and do not
/// overlap.
pub trait SentenceTokenizer: Send + Sync {
    fn split<'t>(&self, text: &'t str) -> Vec<&'t str>;
}

/// Abbreviations (lower-case, without the final period) that do not end a sentence.
const ENGLISH_ABBREVIATIONS: &[&str] = &[
    // titles
    "mr", "mrs", "ms", "dr", "prof", "rev", "hon", "st", "sr", "jr", "gen", "col", "capt", "lt",
    "sgt", "gov", "sen", "rep", "messrs",
    // latin and references
    "e.g", "i.e", "cf", "vs", "viz", "al", "ca", "fig", "figs", "vol", "vols", "pp", "ch",
    "approx", "dept", "ed", "eds",
    // months
    "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
];

/// UAX #29 sentence segmentation with an abbreviation heuristic.
#[derive(Debug, Clone)]
pub struct UnicodeSentenceTokenizer {
    abbreviations: HashSet<String>,
}

impl UnicodeSentenceTokenizer {
    pub fn english() -> Self {
        Self::with_abbreviations(ENGLISH_ABBREVIATIONS.iter().copied())
    }

    /// Tokenizer with a custom abbreviation list. Entries are case-insensitive
    /// and may be written with or without the trailing period.
    pub fn with_abbreviations<I, S>(abbreviations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let abbreviations = abbreviations
            .into_iter()
            .map(|a| a.as_ref().trim().trim_end_matches('.').to_lowercase())
            .filter(|a| !a.is_empty())
            .collect();
        Self { abbreviations }
    }

    pub fn abbreviation_count(&self) -> usize {
        self.abbreviations.len()
    }

    /// Whether `sentence` ends in a period that belongs to an abbreviation.
    ///
    /// A lone capital letter counts as an initial only when it opens the
    /// sentence or follows a capitalized word (`J. K.`, `John F.`), so
    /// `plan B.` still ends a sentence.
    fn ends_with_abbreviation(&self, sentence: &str) -> bool {
        let Some(stem) = sentence.trim_end().strip_suffix('.') else {
            return false;
        };
        let mut words = stem
            .split_whitespace()
            .rev()
            .map(|w| w.trim_start_matches(|c: char| !c.is_alphanumeric()));
        let last_word = words.next().unwrap_or_default();
        if last_word.is_empty() {
            return false;
        }

        let mut chars = last_word.chars();
        if matches!((chars.next(), chars.next()), (Some(c), None) if c.is_uppercase()) {
            return match words.next() {
                None => true,
                Some(previous) => previous.chars().next().is_some_and(char::is_uppercase),
            };
        }

        self.abbreviations.contains(&last_word.to_lowercase())
    }
}

impl Default for UnicodeSentenceTokenizer {
    fn default() -> Self {
        Self::english()
    }
}

impl SentenceTokenizer for UnicodeSentenceTokenizer {
    fn split<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut sentences = Vec::new();
        let mut pending_start: Option<usize> = None;

        for (offset, piece) in text.split_sentence_bound_indices() {
            let start = *pending_start.get_or_insert(offset);
            if self.ends_with_abbreviation(&text[start..offset + piece.len()]) {
                continue;
            }
            let sentence = text[start..offset + piece.len()].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            pending_start = None;
        }

        if let Some(start) = pending_start {
            let sentence = text[start..].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
        }

        sentences
    }
}

static TOKENIZER: OnceCell<UnicodeSentenceTokenizer> = OnceCell::new();

/// Load the process-wide English tokenizer. Idempotent and thread-safe.
pub fn init() -> &'static UnicodeSentenceTokenizer {
    TOKENIZER.get_or_init(|| {
        let tokenizer = UnicodeSentenceTokenizer::english();
        info!(
            "Loaded sentence tokenizer ({} abbreviations)",
            tokenizer.abbreviation_count()
        );
        tokenizer
    })
}

/// The process-wide tokenizer, loaded on first use if [`init`] was skipped.
pub fn global() -> &'static UnicodeSentenceTokenizer {
    match TOKENIZER.get() {
        Some(tokenizer) => tokenizer,
        None => {
            debug!("Sentence tokenizer used before init(), loading now");
            init()
        }
    }
}
