//! Core types, output records, and error types for the rankscope analysis library.
//!
//! This crate defines the input model (`ScoredDocument`, `ScoreSet`,
//! `FieldWeights`), the serializable records every analysis produces
//! (`DistributionSummary`, `CategoryBreakdown`, `ComparisonResult`,
//! `ScoreExplanation`, `ScoreReport`), the error type (`AnalysisError`),
//! layered configuration, and tracing conventions shared by all rankscope crates.
//!
//! It holds no analysis logic of its own and is depended on by every other
//! crate in the workspace.

pub mod comparison;
pub mod config;
pub mod error;
pub mod explanation;
pub mod summary;
pub mod tracing_config;
pub mod types;

pub use comparison::{
    CommonDocument, ComparisonResult, ComparisonSummary, RankChange, RankRow, RowChange,
    StrategyResult, UniqueDocument, SCORE_TOLERANCE,
};
pub use config::{
    AnalysisConfig, ConfigLoadResult, ConfigSource, ConfigWarning, ExplainConfig,
    RankscopeConfig, RelevanceConfig,
};
pub use error::{AnalysisError, AnalysisResult, AnalysisWarning, WarningKind};
pub use explanation::{
    FieldContribution, Fidelity, LengthNormalization, ScoreExplanation, TermContribution,
};
pub use summary::{
    CategoryBreakdown, CategorySort, CategoryStats, DistributionSummary, HistogramBucket,
    ScoreRange, ScoreReport, DEFAULT_BUCKET_COUNT, DEFAULT_PERCENTILES, UNCATEGORIZED_LABEL,
};
pub use types::{
    usize_to_f64, FieldWeights, RelevanceTier, ScoreSet, ScoredDocument, DEFAULT_FIELD_WEIGHT,
};
