//! Strategy comparison for rankscope.
//!
//! Diffs two ranked result lists for the same query: shared documents with
//! their score and rank movement, documents only one side returned, overlap,
//! and Kendall's tau over the shared documents.

pub mod comparator;
pub mod correlation;

pub use comparator::{Strategy, StrategyComparator};
pub use correlation::kendall_tau;
