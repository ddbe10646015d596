use crate::error::{Result, SearchError};
use crate::tokenizer::normalize;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three interchangeable ways of counting a term in the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Literal substring scan of each document.
    Substring,
    /// Whole-word regex scan of each document.
    Pattern,
    /// Phrase query against the positional index.
    Indexed,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Substring, Strategy::Pattern, Strategy::Indexed];

    /// Menu number used by the interactive prompt.
    pub fn selector(self) -> u8 {
        match self {
            Strategy::Substring => 1,
            Strategy::Pattern => 2,
            Strategy::Indexed => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Strategy::Substring => "String Match",
            Strategy::Pattern => "Regular Expression",
            Strategy::Indexed => "Indexed",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strategy::Substring => "substring",
            Strategy::Pattern => "pattern",
            Strategy::Indexed => "indexed",
        };
        f.write_str(s)
    }
}

impl FromStr for Strategy {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "substring" | "string" => Ok(Strategy::Substring),
            "2" | "pattern" | "regex" => Ok(Strategy::Pattern),
            "3" | "indexed" | "index" | "phrase" => Ok(Strategy::Indexed),
            other => Err(SearchError::InvalidStrategy(other.to_string())),
        }
    }
}

/// Counts matches of a prepared term in one normalized document.
pub trait MatchCounter: Send + Sync {
    fn count(&self, normalized_text: &str) -> u32;
}

/// Non-overlapping literal substring counter. Not word-boundary aware.
#[derive(Debug, Clone)]
pub struct SubstringCounter {
    needle: String,
}

impl SubstringCounter {
    pub fn new(term: &str) -> Self {
        Self { needle: normalize(term) }
    }
}

impl MatchCounter for SubstringCounter {
    fn count(&self, normalized_text: &str) -> u32 {
        if self.needle.is_empty() {
            return 0;
        }
        // str::matches resumes after the end of each hit, never inside it.
        normalized_text.matches(self.needle.as_str()).count() as u32
    }
}

/// Whole-word counter: the normalized term wrapped in `\b` anchors.
#[derive(Debug, Clone)]
pub struct PatternCounter {
    re: Option<Regex>,
}

impl PatternCounter {
    pub fn new(term: &str) -> Result<Self> {
        let term = normalize(term);
        if term.is_empty() {
            return Ok(Self { re: None });
        }
        let re = Regex::new(&format!(r"\b{term}\b"))?;
        Ok(Self { re: Some(re) })
    }
}

impl MatchCounter for PatternCounter {
    fn count(&self, normalized_text: &str) -> u32 {
        match &self.re {
            Some(re) => re.find_iter(normalized_text).count() as u32,
            None => 0,
        }
    }
}

/// Count non-overlapping occurrences of `term` in `text`, both normalized first.
pub fn count_substring(term: &str, text: &str) -> u32 {
    SubstringCounter::new(term).count(&normalize(text))
}

/// Count whole-word occurrences of `term` in `text`, both normalized first.
pub fn count_pattern(term: &str, text: &str) -> Result<u32> {
    Ok(PatternCounter::new(term)?.count(&normalize(text)))
}
