//! Score → relevance tier classification.
//!
//! Thresholds are lower bounds, inclusive:
//!
//! ```text
//! score >= excellent_min  → Excellent
//! score >= good_min       → Good
//! score >= fair_min       → Fair
//! otherwise (incl. NaN)   → Poor
//! ```

use std::collections::BTreeMap;

use rankscope_core::config::validate_thresholds;
use rankscope_core::{AnalysisResult, RelevanceConfig, RelevanceTier, ScoreSet};

/// Maps scores to [`RelevanceTier`]s using three descending thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelevanceClassifier {
    excellent_min: f64,
    good_min: f64,
    fair_min: f64,
}

impl Default for RelevanceClassifier {
    /// `-1.0 / -2.0 / -4.0`, tuned for inverted FTS5 BM25 output.
    fn default() -> Self {
        let defaults = RelevanceConfig::default();
        Self {
            excellent_min: defaults.excellent_min,
            good_min: defaults.good_min,
            fair_min: defaults.fair_min,
        }
    }
}

impl RelevanceClassifier {
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidConfig` unless all thresholds are finite
    /// and strictly descending.
    pub fn new(excellent_min: f64, good_min: f64, fair_min: f64) -> AnalysisResult<Self> {
        validate_thresholds(excellent_min, good_min, fair_min)?;
        Ok(Self {
            excellent_min,
            good_min,
            fair_min,
        })
    }

    /// # Errors
    ///
    /// Same as [`RelevanceClassifier::new`].
    pub fn from_config(config: &RelevanceConfig) -> AnalysisResult<Self> {
        Self::new(config.excellent_min, config.good_min, config.fair_min)
    }

    /// `(excellent_min, good_min, fair_min)`.
    #[must_use]
    pub const fn thresholds(&self) -> (f64, f64, f64) {
        (self.excellent_min, self.good_min, self.fair_min)
    }

    /// Total over all `f64`: NaN is `Poor`, `+inf` is `Excellent`.
    #[must_use]
    pub fn classify(&self, score: f64) -> RelevanceTier {
        if score >= self.excellent_min {
            RelevanceTier::Excellent
        } else if score >= self.good_min {
            RelevanceTier::Good
        } else if score >= self.fair_min {
            RelevanceTier::Fair
        } else {
            RelevanceTier::Poor
        }
    }

    /// A copy of `set` with every document's `relevance` filled in.
    #[must_use]
    pub fn classify_set(&self, set: &ScoreSet) -> ScoreSet {
        set.iter()
            .map(|doc| doc.clone().with_relevance(self.classify(doc.score)))
            .collect()
    }

    /// Documents per tier. Every tier is present, empty ones with zero.
    #[must_use]
    pub fn tier_counts(&self, set: &ScoreSet) -> BTreeMap<RelevanceTier, usize> {
        let mut counts: BTreeMap<RelevanceTier, usize> =
            RelevanceTier::ALL.iter().map(|tier| (*tier, 0)).collect();
        for doc in set {
            *counts.entry(self.classify(doc.score)).or_insert(0) += 1;
        }
        counts
    }
}
