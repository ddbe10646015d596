//! Count a term or phrase across a directory of text documents.
//!
//! Three strategies share one normalizer and one ranker: a literal substring
//! scan, a whole-word regex scan, and a phrase query against a positional
//! inverted index persisted on disk.

pub mod builder;
pub mod config;
pub mod corpus;
pub mod error;
pub mod index;
pub mod matcher;
pub mod persist;
pub mod phrase;
pub mod rank;
pub mod search;
pub mod tokenizer;

pub use builder::{build_index, BuildReport};
pub use config::SearchConfig;
pub use corpus::Document;
pub use error::{Result, SearchError};
pub use index::{DocId, DocMeta, Position, PositionalIndex, Posting, PostingsSource, TermId};
pub use matcher::{count_pattern, count_substring, MatchCounter, Strategy};
pub use persist::IndexReader;
pub use phrase::{query_phrase, try_query_phrase};
pub use rank::{rank_descending, RankedDoc};
pub use search::{SearchOutcome, SearchStatus, Searcher};
pub use tokenizer::normalize;
