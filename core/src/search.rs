use crate::builder::{build_index, BuildReport};
use crate::config::SearchConfig;
use crate::corpus::{list_documents, read_document, Document};
use crate::error::{Result, SearchError};
use crate::index::PostingsSource;
use crate::matcher::{MatchCounter, PatternCounter, Strategy, SubstringCounter};
use crate::persist::IndexReader;
use crate::phrase::{try_query_phrase, Counts};
use crate::rank::{rank_descending, RankedDoc};
use crate::tokenizer::normalize;
use parking_lot::Mutex;
use serde::Serialize;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    /// Every eligible document was ranked, possibly all at zero.
    Ranked,
    /// The corpus (or the index built from it) has no documents.
    CorpusEmpty,
    /// The index could not be built or opened; no indexed results.
    IndexUnavailable,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub query: String,
    pub strategy: Strategy,
    pub status: SearchStatus,
    pub results: Vec<RankedDoc>,
    pub diagnostics: Vec<String>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl SearchOutcome {
    pub fn total_matches(&self) -> u64 {
        self.results.iter().map(|r| r.count as u64).sum()
    }
}

/// Runs searches over one corpus. Holds the positional index between indexed queries.
pub struct Searcher {
    config: SearchConfig,
    index: Option<IndexReader>,
}

impl Searcher {
    pub fn new(config: SearchConfig) -> Self {
        Self { config, index: None }
    }

    pub fn config(&self) -> &SearchConfig { &self.config }

    /// Recreate the index store from the corpus and open it for querying.
    pub fn rebuild_index(&mut self) -> Result<BuildReport> {
        self.index = None;
        let mut report = build_index(&self.config.corpus_dir, &self.config.index_dir)?;
        match IndexReader::open(&self.config.index_dir) {
            Ok(reader) => self.index = Some(reader),
            Err(err) => {
                tracing::warn!(error = %err, "index built but could not be opened");
                report.diagnostics.push(err.to_string());
            }
        }
        Ok(report)
    }

    fn ensure_index(&mut self, diagnostics: &mut Vec<String>) {
        if self.index.is_some() {
            return;
        }
        if self.config.reuse_existing_index {
            match IndexReader::open(&self.config.index_dir) {
                Ok(reader) => {
                    self.index = Some(reader);
                    return;
                }
                Err(err) => tracing::info!(error = %err, "no reusable index, rebuilding"),
            }
        }
        match self.rebuild_index() {
            Ok(report) => diagnostics.extend(report.diagnostics),
            Err(err) => {
                tracing::warn!(error = %err, "index build failed");
                diagnostics.push(err.to_string());
            }
        }
    }

    /// Count `term` in every document with `strategy` and rank the result.
    ///
    /// Only an empty or blank term is an error. Unreadable documents, index
    /// failures and bad patterns end up in `diagnostics`.
    pub fn search(&mut self, term: &str, strategy: Strategy) -> Result<SearchOutcome> {
        if term.trim().is_empty() {
            return Err(SearchError::InvalidInput("search term cannot be empty".into()));
        }
        let mut diagnostics = Vec::new();
        let (status, counts, elapsed) = match strategy {
            // Nothing to look up: zero every listed document without building.
            Strategy::Indexed if normalize(term).is_empty() => {
                let start = Instant::now();
                let (status, counts) = self.scan(term, strategy, &mut diagnostics);
                (status, counts, start.elapsed())
            }
            Strategy::Indexed => {
                self.ensure_index(&mut diagnostics);
                let start = Instant::now();
                let (status, counts) = self.query_index(term, &mut diagnostics);
                (status, counts, start.elapsed())
            }
            Strategy::Substring | Strategy::Pattern => {
                let start = Instant::now();
                let (status, counts) = self.scan(term, strategy, &mut diagnostics);
                (status, counts, start.elapsed())
            }
        };
        diagnostics.sort();
        let results = rank_descending(counts);
        tracing::info!(
            query = term,
            %strategy,
            ?status,
            num_docs = results.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "search complete"
        );
        Ok(SearchOutcome { query: term.to_string(), strategy, status, results, diagnostics, elapsed })
    }

    fn query_index(&self, term: &str, diagnostics: &mut Vec<String>) -> (SearchStatus, Counts) {
        let Some(reader) = self.index.as_ref() else {
            return (SearchStatus::IndexUnavailable, Counts::new());
        };
        if reader.documents().is_empty() {
            diagnostics.push(SearchError::CorpusEmpty(self.config.corpus_dir.clone()).to_string());
            return (SearchStatus::CorpusEmpty, Counts::new());
        }
        match try_query_phrase(term, reader) {
            Ok(counts) => (SearchStatus::Ranked, counts),
            Err(err) => {
                tracing::warn!(error = %err, "indexed lookup failed");
                diagnostics.push(err.to_string());
                let zeros = reader.document_names().into_iter().map(|n| (n, 0)).collect();
                (SearchStatus::Ranked, zeros)
            }
        }
    }

    fn scan(&self, term: &str, strategy: Strategy, diagnostics: &mut Vec<String>) -> (SearchStatus, Counts) {
        let docs = match list_documents(&self.config.corpus_dir) {
            Ok(docs) => docs,
            Err(err) => {
                tracing::warn!(error = %err, "cannot list corpus");
                diagnostics.push(err.to_string());
                Vec::new()
            }
        };
        if docs.is_empty() {
            diagnostics.push(SearchError::CorpusEmpty(self.config.corpus_dir.clone()).to_string());
            return (SearchStatus::CorpusEmpty, Counts::new());
        }
        let zeros = || docs.iter().map(|d| (d.name.clone(), 0)).collect::<Counts>();
        if normalize(term).is_empty() {
            return (SearchStatus::Ranked, zeros());
        }
        let counter: Box<dyn MatchCounter> = match strategy {
            Strategy::Pattern => match PatternCounter::new(term) {
                Ok(c) => Box::new(c),
                Err(err) => {
                    tracing::warn!(error = %err, "pattern rejected");
                    diagnostics.push(err.to_string());
                    return (SearchStatus::Ranked, zeros());
                }
            },
            _ => Box::new(SubstringCounter::new(term)),
        };
        let (counts, errors) = scan_documents(&docs, counter.as_ref(), self.config.effective_workers());
        diagnostics.extend(errors);
        (SearchStatus::Ranked, counts)
    }
}

/// Count matches in each document on up to `workers` scoped threads.
///
/// Each worker reads only its own slice of documents; results are merged once
/// per worker. Unreadable documents are left out of the counts.
pub fn scan_documents(docs: &[Document], counter: &dyn MatchCounter, workers: usize) -> (Counts, Vec<String>) {
    let merged = Mutex::new((Counts::with_capacity(docs.len()), Vec::new()));
    let chunk = docs.len().div_ceil(workers.max(1)).max(1);
    std::thread::scope(|s| {
        for slice in docs.chunks(chunk) {
            let merged = &merged;
            s.spawn(move || {
                let mut local = Vec::with_capacity(slice.len());
                let mut errors = Vec::new();
                for doc in slice {
                    match read_document(doc) {
                        Ok(text) => {
                            let n = counter.count(&normalize(&text));
                            tracing::debug!(name = %doc.name, count = n, "scanned document");
                            local.push((doc.name.clone(), n));
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, "skipping document");
                            errors.push(err.to_string());
                        }
                    }
                }
                let mut guard = merged.lock();
                guard.0.extend(local);
                guard.1.extend(errors);
            });
        }
    });
    merged.into_inner()
}
