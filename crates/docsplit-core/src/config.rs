//! Service configuration loaded from the environment.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Error, Result};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_SENTENCES_PER_CHUNK: i64 = 5;
pub const DEFAULT_OVERLAP: i64 = 0;
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;

/// Top-level DocSplit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocSplitConfig {
    /// Interface the HTTP server binds to.
    pub host: String,
    /// HTTP server port.
    pub port: u16,
    /// `sentences_per_chunk` used when a request omits it.
    pub default_sentences_per_chunk: i64,
    /// `overlap` used when a request omits it.
    pub default_overlap: i64,
    /// Upper bound on a request body, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for DocSplitConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            default_sentences_per_chunk: DEFAULT_SENTENCES_PER_CHUNK,
            default_overlap: DEFAULT_OVERLAP,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

impl DocSplitConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("DOCSPLIT_HOST").unwrap_or(defaults.host);
        let port = parse_var(&lookup, "PORT")?.unwrap_or(defaults.port);
        let default_sentences_per_chunk = parse_var(&lookup, "DOCSPLIT_SENTENCES_PER_CHUNK")?
            .unwrap_or(defaults.default_sentences_per_chunk);
        let default_overlap =
            parse_var(&lookup, "DOCSPLIT_OVERLAP")?.unwrap_or(defaults.default_overlap);
        let max_upload_bytes = parse_var::<usize, _>(&lookup, "DOCSPLIT_MAX_UPLOAD_MB")?
            .map(|mb| mb.saturating_mul(1024 * 1024))
            .unwrap_or(defaults.max_upload_bytes);

        let config = Self {
            host,
            port,
            default_sentences_per_chunk,
            default_overlap,
            max_upload_bytes,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject defaults that would make every chunking request fail.
    pub fn validate(&self) -> Result<()> {
        if self.default_sentences_per_chunk < 2 {
            return Err(Error::Config(format!(
                "DOCSPLIT_SENTENCES_PER_CHUNK must be at least 2, got {}",
                self.default_sentences_per_chunk
            )));
        }
        if self.default_overlap < 0 || self.default_overlap >= self.default_sentences_per_chunk {
            return Err(Error::Config(format!(
                "DOCSPLIT_OVERLAP must be in [0, {}), got {}",
                self.default_sentences_per_chunk, self.default_overlap
            )));
        }
        if self.max_upload_bytes == 0 {
            return Err(Error::Config(
                "DOCSPLIT_MAX_UPLOAD_MB must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("{key}={raw:?}: {e}"))),
    }
}
