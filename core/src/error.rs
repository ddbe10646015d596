use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the search core.
///
/// Only `InvalidInput` and `InvalidStrategy` stop a search before it starts;
/// everything else is caught at the file or lookup that caused it and turned
/// into a diagnostic by the caller.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown search strategy `{0}` (expected 1, 2 or 3)")]
    InvalidStrategy(String),

    #[error("no text files found in {0}")]
    CorpusEmpty(PathBuf),

    #[error("cannot read corpus directory {path}: {source}")]
    CorpusUnreadable {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("cannot read document {name}: {source}")]
    DocumentRead {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("index build failed: {0}")]
    IndexBuild(String),

    #[error("index query failed: {0}")]
    IndexQuery(String),

    #[error("bad pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, SearchError>;

impl SearchError {
    /// True for the errors that are the caller's fault and must be reported
    /// before any file is touched.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, SearchError::InvalidInput(_) | SearchError::InvalidStrategy(_))
    }
}
