use crate::corpus::{list_documents, read_document};
use crate::error::{Result, SearchError};
use crate::index::{PositionalIndex, PostingsSource};
use crate::persist::{write_index, IndexPaths};
use serde::Serialize;
use std::path::Path;
use std::time::{Duration, Instant};

/// Outcome of indexing a corpus directory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    /// Names of the documents that made it into the index, in doc id order.
    pub documents: Vec<String>,
    /// One line per corpus problem or skipped file.
    pub diagnostics: Vec<String>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl BuildReport {
    pub fn is_empty(&self) -> bool { self.documents.is_empty() }
}

/// Normalize and index every `.txt` file in `corpus_dir`.
///
/// Unreadable files are logged and skipped. An empty or unreadable corpus gives an
/// empty index and a diagnostic; it is not an error.
pub fn index_corpus(corpus_dir: &Path) -> (PositionalIndex, Vec<String>) {
    let mut index = PositionalIndex::new();
    let mut diagnostics = Vec::new();
    let docs = match list_documents(corpus_dir) {
        Ok(docs) => docs,
        Err(err) => {
            tracing::warn!(error = %err, "cannot list corpus");
            diagnostics.push(err.to_string());
            return (index, diagnostics);
        }
    };
    if docs.is_empty() {
        let err = SearchError::CorpusEmpty(corpus_dir.to_path_buf());
        tracing::warn!(dir = %corpus_dir.display(), "no text files to index");
        diagnostics.push(err.to_string());
        return (index, diagnostics);
    }
    for doc in &docs {
        match read_document(doc) {
            Ok(text) => {
                let doc_id = index.add_document(&doc.name, &text);
                tracing::debug!(doc_id, name = %doc.name, "indexed document");
            }
            Err(err) => {
                tracing::warn!(error = %err, "skipping document");
                diagnostics.push(err.to_string());
            }
        }
    }
    (index, diagnostics)
}

/// Index `corpus_dir` and recreate the store at `index_dir`.
///
/// Fails only when the store cannot be written. An empty corpus still replaces
/// the old store with an empty one.
pub fn build_index(corpus_dir: &Path, index_dir: &Path) -> Result<BuildReport> {
    let start = Instant::now();
    let (index, diagnostics) = index_corpus(corpus_dir);
    let documents = index.document_names();
    let paths = IndexPaths::new(index_dir);
    write_index(&paths, &index).map_err(|e| SearchError::IndexBuild(format!("{e:#}")))?;
    let elapsed = start.elapsed();
    tracing::info!(
        num_docs = documents.len(),
        num_terms = index.num_terms(),
        skipped = diagnostics.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        output = %index_dir.display(),
        "index build complete"
    );
    Ok(BuildReport { documents, diagnostics, elapsed })
}
