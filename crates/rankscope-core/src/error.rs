use serde::{Deserialize, Serialize};

/// Unified error type covering the failure modes of the rankscope analysis pipeline.
///
/// Every variant carries enough context to tell the caller what to supply instead.
/// Degraded-but-valid outcomes (for example two strategies with nothing in common)
/// are not errors; they are reported as [`AnalysisWarning`]s on the result.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    // === Input errors ===
    /// An analysis was asked to summarize zero scores.
    #[error("No data to analyze in {context}: the score set is empty or has no finite scores.")]
    EmptyInput {
        /// Which operation received the empty input.
        context: &'static str,
    },

    /// A corpus-level statistic required by the explainer is missing or unusable.
    #[error(
        "Insufficient corpus statistics: {statistic} ({reason}). Supply the corpus average document length."
    )]
    InsufficientStatistics {
        /// Name of the missing statistic.
        statistic: &'static str,
        /// Why the supplied value cannot be used.
        reason: String,
    },

    // === Configuration errors ===
    /// A configuration value is invalid.
    #[error("Invalid config: {field} = \"{value}\": {reason}")]
    InvalidConfig {
        /// Which config field.
        field: String,
        /// The invalid value.
        value: String,
        /// Why it is invalid.
        reason: String,
    },

    // === I/O errors ===
    /// Wraps `std::io::Error` for config file reads.
    #[error("I/O error: {0}. Check the config file path and permissions.")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the rankscope crates.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Kind of degraded outcome attached to an otherwise valid result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Two strategies share no documents, or the baseline produced nothing.
    IncompatibleComparison,
    /// Some input scores were NaN or infinite and were left out of the statistics.
    NonFiniteScores,
}

impl std::fmt::Display for WarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IncompatibleComparison => write!(f, "incompatible_comparison"),
            Self::NonFiniteScores => write!(f, "non_finite_scores"),
        }
    }
}

/// A warning flag carried on a result instead of failing the call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisWarning {
    /// Machine-matchable warning kind.
    pub kind: WarningKind,
    /// Human-readable explanation for the presentation layer.
    pub message: String,
}

impl AnalysisWarning {
    /// Creates a new warning.
    #[must_use]
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}
