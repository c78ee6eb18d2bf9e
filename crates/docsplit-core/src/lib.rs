//! DocSplit Core: shared error taxonomy and configuration.

pub mod config;
pub mod error;

pub use config::DocSplitConfig;
pub use error::{Error, Result};
