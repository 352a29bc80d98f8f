//! rankscope: score statistics and strategy comparison for BM25-ranked results.
//!
//! Takes the scored result lists a full-text engine already produced and
//! explains them: how scores are distributed, which relevance tier each
//! result falls in, how categories compare, how two ranking strategies
//! disagree on the same query, and roughly where each score came from.
//!
//! Nothing here searches. Inputs are [`ScoreSet`]s, outputs are plain
//! serializable records ready for any presentation layer.
//!
//! # Crates
//!
//! - [`core`]: data model, errors, layered configuration, tracing conventions.
//! - [`stats`]: distributions, histograms, relevance tiers, category breakdowns.
//! - [`compare`]: strategy diffs and Kendall rank correlation.
//! - [`explain`]: approximate per-field and per-term score breakdowns.
//!
//! [`Analyzer`] wires all four together behind one configured value.

pub use rankscope_compare as compare;
pub use rankscope_core as core;
pub use rankscope_explain as explain;
pub use rankscope_stats as stats;

mod analyzer;

pub use analyzer::Analyzer;

pub use rankscope_compare::{kendall_tau, Strategy, StrategyComparator};
pub use rankscope_core::{
    AnalysisError, AnalysisResult, AnalysisWarning, CategoryBreakdown, ComparisonResult,
    DistributionSummary, FieldWeights, RankscopeConfig, RelevanceTier, ScoreExplanation,
    ScoreReport, ScoreSet, ScoredDocument, WarningKind,
};
pub use rankscope_explain::{query_terms, snippet, ScoreExplainer};
pub use rankscope_stats::{
    CategoryAggregator, DistributionAnalyzer, RelevanceClassifier, ScoreReporter,
};

/// Everything needed for the common analysis flows.
pub mod prelude {
    pub use crate::Analyzer;
    pub use rankscope_compare::Strategy;
    pub use rankscope_core::{
        AnalysisError, AnalysisResult, CategorySort, RankChange, RankscopeConfig,
        RelevanceTier, ScoreSet, ScoredDocument,
    };
}
