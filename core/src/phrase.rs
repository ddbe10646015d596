use crate::error::Result;
use crate::index::{DocId, Position, PostingsSource};
use crate::tokenizer::tokenize;
use std::collections::HashMap;

/// Per-document match counts keyed by document name.
pub type Counts = HashMap<String, u32>;

/// Count the places where the position lists line up as p, p+1, ..., p+n-1.
///
/// Each list must be strictly increasing. Starting from the first token's
/// positions, every step keeps only the next token's positions that sit
/// directly after a surviving one. Overlapping runs all count, so `a a` occurs
/// three times in `a a a a`.
pub fn phrase_frequency(lists: &[&[Position]]) -> u32 {
    let Some((first, rest)) = lists.split_first() else { return 0 };
    let mut current: Vec<Position> = first.to_vec();
    for next in rest {
        let mut survivors = Vec::with_capacity(current.len().min(next.len()));
        let mut i = 0;
        for &p in next.iter() {
            while i < current.len() && current[i] + 1 < p {
                i += 1;
            }
            if i == current.len() {
                break;
            }
            if current[i] + 1 == p {
                survivors.push(p);
            }
        }
        if survivors.is_empty() {
            return 0;
        }
        current = survivors;
    }
    current.len() as u32
}

fn zero_counts<S: PostingsSource + ?Sized>(source: &S) -> Counts {
    source.documents().iter().map(|d| (d.name.clone(), 0)).collect()
}

/// Count occurrences of the phrase `term` in every indexed document.
///
/// Every indexed document appears in the result, with 0 when it has no match.
/// For multi-token phrases a token missing from the index zeroes every document.
pub fn try_query_phrase<S: PostingsSource + ?Sized>(term: &str, source: &S) -> Result<Counts> {
    let mut counts = zero_counts(source);
    let tokens = tokenize(term);
    if tokens.is_empty() {
        return Ok(counts);
    }

    // token -> doc -> positions, for every phrase token.
    let mut per_token: Vec<HashMap<DocId, Vec<Position>>> = Vec::with_capacity(tokens.len());
    for token in &tokens {
        let postings = source.postings(token)?;
        if postings.is_empty() {
            tracing::debug!(token = %token, "phrase token not in index");
            return Ok(counts);
        }
        per_token.push(postings.into_iter().map(|p| (p.doc_id, p.positions)).collect());
    }

    let docs = source.documents();
    let Some((first, rest)) = per_token.split_first() else { return Ok(counts) };
    for (&doc_id, first_positions) in first {
        let mut lists: Vec<&[Position]> = vec![first_positions.as_slice()];
        for token_docs in rest {
            match token_docs.get(&doc_id) {
                Some(positions) => lists.push(positions.as_slice()),
                None => break,
            }
        }
        if lists.len() < tokens.len() {
            continue;
        }
        let Some(meta) = docs.get(doc_id as usize) else {
            tracing::warn!(doc_id, "posting references unknown document");
            continue;
        };
        counts.insert(meta.name.clone(), phrase_frequency(&lists));
    }
    Ok(counts)
}

/// Like [`try_query_phrase`], but a failed lookup is logged and read as no matches.
pub fn query_phrase<S: PostingsSource + ?Sized>(term: &str, source: &S) -> Counts {
    match try_query_phrase(term, source) {
        Ok(counts) => counts,
        Err(err) => {
            tracing::warn!(error = %err, term, "phrase query failed");
            zero_counts(source)
        }
    }
}
