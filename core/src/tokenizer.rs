use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_ALNUM: Regex = Regex::new(r"[^a-zA-Z0-9 ]").expect("valid regex");
    static ref SPACES: Regex = Regex::new(r" {2,}").expect("valid regex");
}

/// Normalize text for matching: every character other than an ASCII letter, digit
/// or space becomes a space, runs of spaces collapse to one, the ends are trimmed
/// and the result is lowercased.
///
/// Applied to both search terms and document contents, so every strategy is
/// case and punctuation insensitive. `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let replaced = NON_ALNUM.replace_all(text, " ");
    let collapsed = SPACES.replace_all(&replaced, " ");
    collapsed.trim_matches(' ').to_ascii_lowercase()
}

/// Split already-normalized text into tokens. Position = index in the returned vec.
pub fn split_normalized(normalized: &str) -> Vec<&str> {
    normalized.split(' ').filter(|t| !t.is_empty()).collect()
}

/// Normalize then split into tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    split_normalized(&normalize(text)).into_iter().map(str::to_owned).collect()
}
