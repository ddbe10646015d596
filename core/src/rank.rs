use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedDoc {
    pub name: String,
    pub count: u32,
}

/// Order documents by count, highest first; equal counts by name ascending.
pub fn rank_descending(counts: HashMap<String, u32>) -> Vec<RankedDoc> {
    let mut ranked: Vec<RankedDoc> = counts.into_iter().map(|(name, count)| RankedDoc { name, count }).collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    ranked
}
