//! Error types
//!
//! Internal operations return [`ExplainError`]; the public explanation entry
//! points turn any of them into degraded output instead of surfacing them.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExplainError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("cannot serialize configuration: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("locale `{lang}`: {reason}")]
    Locale { lang: String, reason: String },

    #[error("analyzer `{analyzer}` failed: {reason}")]
    Analyzer { analyzer: &'static str, reason: String },

    #[error("an explanation is already in progress")]
    Reentrant,

    #[error("{0}")]
    Internal(String),
}

impl ExplainError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn analyzer(analyzer: &'static str, reason: impl Into<String>) -> Self {
        Self::Analyzer { analyzer, reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, ExplainError>;
