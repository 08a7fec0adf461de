use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    // Anything that is neither ASCII alphanumeric nor whitespace is deleted, not replaced.
    static ref STRIP: Regex = Regex::new(r"[^a-z0-9\s\x1C-\x1F]").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a", "an", "the", "and", "or", "but", "if", "then", "else", "when",
            "at", "by", "for", "from", "in", "of", "on", "to", "with",
            "is", "are", "was", "were", "be", "been", "being",
            "it", "this", "that", "these", "those",
            "i", "you", "he", "she", "we", "they",
            "not", "so", "as",
        ];
        words.iter().copied().collect()
    };
}

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Unicode whitespace plus the ASCII file/group/record/unit separators (U+001C..U+001F).
fn is_separator(c: char) -> bool { c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c) }

/// Tokenize text into index terms: lowercase, delete punctuation, split on whitespace, drop stopwords.
///
/// Documents and queries both go through this function, so a query term matches
/// a document term exactly when they normalize to the same string. Duplicates are
/// kept in input order.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let stripped = STRIP.replace_all(&lowered, "");
    stripped
        .split(is_separator)
        .filter(|t| !t.is_empty() && !is_stopword(t))
        .map(str::to_string)
        .collect()
}
