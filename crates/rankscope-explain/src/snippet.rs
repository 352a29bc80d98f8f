//! Contextual excerpts around the first query-term hit.

/// Excerpt length used when the caller passes zero.
pub const DEFAULT_SNIPPET_CHARS: usize = 200;

const ELLIPSIS: &str = "...";

/// An excerpt of at most `max_chars` characters of `content`, positioned so
/// the earliest occurrence of any of `terms` sits a quarter of the way in.
///
/// Matching is case-insensitive substring search. Without a hit the excerpt
/// starts at the beginning. `...` marks truncation on either side.
#[must_use]
pub fn snippet(content: &str, terms: &[String], max_chars: usize) -> String {
    let max_chars = if max_chars == 0 {
        DEFAULT_SNIPPET_CHARS
    } else {
        max_chars
    };
    let chars: Vec<char> = content.chars().collect();
    let lowered: Vec<char> = chars
        .iter()
        .map(|c| c.to_lowercase().next().unwrap_or(*c))
        .collect();

    let earliest = terms
        .iter()
        .filter_map(|term| {
            let needle: Vec<char> = term.to_lowercase().chars().collect();
            find(&lowered, &needle)
        })
        .min()
        .unwrap_or(0);

    let mut start = earliest.saturating_sub(max_chars / 4);
    let mut end = start + max_chars;
    if end > chars.len() {
        end = chars.len();
        start = end.saturating_sub(max_chars);
    }

    let body: String = chars[start..end].iter().collect();
    let mut excerpt = String::with_capacity(body.len() + 2 * ELLIPSIS.len());
    if start > 0 {
        excerpt.push_str(ELLIPSIS);
    }
    excerpt.push_str(&body);
    if end < chars.len() {
        excerpt.push_str(ELLIPSIS);
    }
    excerpt.trim().to_owned()
}

fn find(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
