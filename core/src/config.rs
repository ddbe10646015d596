use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the corpus and index live, and how much parallelism to use for scans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub corpus_dir: PathBuf,
    pub index_dir: PathBuf,
    /// Worker threads for the substring and pattern scans. 0 means one per core.
    #[serde(default)]
    pub workers: usize,
    /// Open an existing index store instead of rebuilding on the first indexed query.
    #[serde(default)]
    pub reuse_existing_index: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from("./sample_text"),
            index_dir: PathBuf::from("./index"),
            workers: 0,
            reuse_existing_index: false,
        }
    }
}

impl SearchConfig {
    pub fn new<C: Into<PathBuf>, I: Into<PathBuf>>(corpus_dir: C, index_dir: I) -> Self {
        Self { corpus_dir: corpus_dir.into(), index_dir: index_dir.into(), ..Self::default() }
    }

    /// Defaults overridden by DOCSEARCH_CORPUS_DIR, DOCSEARCH_INDEX_DIR and DOCSEARCH_WORKERS.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(dir) = std::env::var("DOCSEARCH_CORPUS_DIR") {
            cfg.corpus_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("DOCSEARCH_INDEX_DIR") {
            cfg.index_dir = PathBuf::from(dir);
        }
        if let Some(n) = std::env::var("DOCSEARCH_WORKERS").ok().and_then(|v| v.trim().parse().ok()) {
            cfg.workers = n;
        }
        cfg
    }

    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    }
}
