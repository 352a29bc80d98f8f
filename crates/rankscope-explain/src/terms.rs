//! Query term extraction and whole-word matching.
//!
//! [`query_terms`] reduces an FTS5-style query to the bare words it searches
//! for:
//!
//! - `-term` exclusions are dropped
//! - the operators `AND`, `OR`, `NOT` and `NEAR` are dropped
//! - quotes, parentheses, `*` and other punctuation are stripped; inner
//!   hyphens, underscores and apostrophes survive
//! - column filters such as `title:rust` keep only `rust`
//! - everything is lowercased and de-duplicated in first-seen order
//!
//! # Examples
//!
//! ```
//! use rankscope_explain::query_terms;
//!
//! assert_eq!(query_terms("Rust AND async -tokio"), vec!["rust", "async"]);
//! assert_eq!(query_terms(r#"title:"borrow checker" OR rust*"#), vec!["borrow", "checker", "rust"]);
//! ```

use std::collections::HashSet;

const OPERATORS: [&str; 4] = ["AND", "OR", "NOT", "NEAR"];

/// Bare, lowercased, de-duplicated search words of `query`.
#[must_use]
pub fn query_terms(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut terms = Vec::new();

    for token in query.split_whitespace() {
        // Exclusion: `-term`. A lone `-` is just punctuation.
        if token.len() > 1 && token.starts_with('-') {
            continue;
        }
        if OPERATORS.contains(&token) {
            continue;
        }

        let token = token.rsplit_once(':').map_or(token, |(_, rest)| rest);
        let cleaned: String = token
            .chars()
            .map(|c| if is_word_char(c) { c } else { ' ' })
            .collect();

        for word in cleaned.split_whitespace() {
            let word = word.trim_matches(|c| matches!(c, '-' | '\''));
            if word.is_empty() || OPERATORS.contains(&word) {
                continue;
            }
            let word = word.to_lowercase();
            if seen.insert(word.clone()) {
                terms.push(word);
            }
        }
    }

    terms
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | '\'')
}

/// Lowercased alphanumeric words of `text`, splitting on everything else.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Whole-word, case-insensitive occurrences of `term` in pre-tokenized `words`.
///
/// A term that itself tokenizes to several words (`state-of-the-art`) counts
/// consecutive runs.
#[must_use]
pub fn count_term(words: &[String], term: &str) -> usize {
    let needle = tokenize(term);
    if needle.is_empty() || needle.len() > words.len() {
        return 0;
    }
    words
        .windows(needle.len())
        .filter(|window| *window == needle.as_slice())
        .count()
}
