//! Approximate score explanations for rankscope.
//!
//! The retrieval engine reports one opaque score per document. This crate
//! breaks that score down into illustrative per-field and per-term estimates
//! so a reader can see *why* a document ranked where it did. The estimates
//! follow BM25's shape (saturating term frequency, length normalization,
//! field weights) but are never equal to the engine's real arithmetic.

pub mod explainer;
pub mod snippet;
pub mod terms;

pub use explainer::{idf_proxy, length_factor, ScoreExplainer, B, FIELDS, K1};
pub use snippet::{snippet, DEFAULT_SNIPPET_CHARS};
pub use terms::{count_term, query_terms, tokenize};
