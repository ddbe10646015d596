use crate::error::Result;
use crate::tokenizer::{normalize, split_normalized};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type TermId = u32;
pub type DocId = u32;
/// Zero-based token index within a document.
pub type Position = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocMeta {
    /// File name; unique within a corpus.
    pub name: String,
    pub num_tokens: u32,
}

/// All positions of one term in one document, strictly increasing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub positions: Vec<Position>,
}

/// Read access to term -> document -> positions, whatever the backing store.
pub trait PostingsSource {
    /// Every indexed document; `DocId` is the index into this slice.
    fn documents(&self) -> &[DocMeta];

    /// Postings for `term`, sorted by doc id. A missing term yields an empty vec.
    fn postings(&self, term: &str) -> Result<Vec<Posting>>;

    fn docs_for_term(&self, term: &str) -> Result<Vec<DocId>> {
        Ok(self.postings(term)?.into_iter().map(|p| p.doc_id).collect())
    }

    fn positions(&self, term: &str, doc_id: DocId) -> Result<Vec<Position>> {
        let postings = self.postings(term)?;
        Ok(postings
            .binary_search_by_key(&doc_id, |p| p.doc_id)
            .map(|i| postings[i].positions.clone())
            .unwrap_or_default())
    }

    fn document_names(&self) -> Vec<String> {
        self.documents().iter().map(|d| d.name.clone()).collect()
    }
}

/// Positional inverted index held in memory while a corpus is being indexed.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PositionalIndex {
    pub dictionary: HashMap<String, TermId>,
    /// Indexed by term id; each list sorted by doc id.
    pub postings: Vec<Vec<Posting>>,
    pub docs: Vec<DocMeta>,
}

impl PositionalIndex {
    pub fn new() -> Self { Self::default() }

    /// Normalize and tokenize `text`, then record every token position under `name`.
    pub fn add_document(&mut self, name: &str, text: &str) -> DocId {
        let doc_id = self.docs.len() as DocId;
        let normalized = normalize(text);
        let tokens = split_normalized(&normalized);
        for (pos, token) in tokens.iter().enumerate() {
            let next_id = self.postings.len() as TermId;
            let tid = *self.dictionary.entry((*token).to_string()).or_insert(next_id);
            if tid == next_id {
                self.postings.push(Vec::new());
            }
            let list = &mut self.postings[tid as usize];
            match list.last_mut() {
                Some(p) if p.doc_id == doc_id => p.positions.push(pos as Position),
                _ => list.push(Posting { doc_id, positions: vec![pos as Position] }),
            }
        }
        self.docs.push(DocMeta { name: name.to_string(), num_tokens: tokens.len() as u32 });
        doc_id
    }

    pub fn num_docs(&self) -> u32 { self.docs.len() as u32 }

    pub fn num_terms(&self) -> usize { self.dictionary.len() }

    /// Document frequency per term id.
    pub fn df(&self) -> Vec<u32> {
        self.postings.iter().map(|p| p.len() as u32).collect()
    }
}

impl PostingsSource for PositionalIndex {
    fn documents(&self) -> &[DocMeta] { &self.docs }

    fn postings(&self, term: &str) -> Result<Vec<Posting>> {
        Ok(self
            .dictionary
            .get(term)
            .map(|&tid| self.postings[tid as usize].clone())
            .unwrap_or_default())
    }
}
