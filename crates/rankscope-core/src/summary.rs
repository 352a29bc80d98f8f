//! Statistical output records: distribution summaries, histogram buckets,
//! category breakdowns and the per-query score report.
//!
//! These are plain snapshots. They are produced by `rankscope-stats` and
//! handed to a presentation layer (text, JSON, CSV, chart renderer).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisWarning;
use crate::types::RelevanceTier;

/// Percentiles reported when the caller does not ask for others.
pub const DEFAULT_PERCENTILES: [u8; 6] = [25, 50, 75, 90, 95, 99];

/// Histogram bucket count used when the caller does not ask for another.
pub const DEFAULT_BUCKET_COUNT: usize = 10;

/// Label used for documents whose category is the empty string.
pub const UNCATEGORIZED_LABEL: &str = "(uncategorized)";

/// One equal-width histogram bucket.
///
/// Covers the half-open interval `[min, max)`; the last bucket of a histogram
/// also holds values equal to its `max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    pub min: f64,
    pub max: f64,
    pub count: usize,
    pub label: String,
}

impl HistogramBucket {
    /// Whether `value` falls inside `[min, max)`.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value < self.max
    }
}

/// Location, spread and shape of one score sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    /// Number of finite scores summarized.
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation (divides by `count`).
    pub std_dev: f64,
    /// Interpolated score at each requested percentile.
    pub percentiles: BTreeMap<u8, f64>,
    /// Equal-width histogram, lowest scores first.
    pub buckets: Vec<HistogramBucket>,
    /// NaN or infinite inputs left out of every statistic above.
    #[serde(default)]
    pub skipped_non_finite: usize,
}

impl DistributionSummary {
    /// `max - min`.
    #[must_use]
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Interpolated value at `p`, if that percentile was requested.
    #[must_use]
    pub fn percentile(&self, p: u8) -> Option<f64> {
        self.percentiles.get(&p).copied()
    }

    /// (Q1, Q2, Q3) when the 25th, 50th and 75th percentiles were requested.
    #[must_use]
    pub fn quartiles(&self) -> Option<(f64, f64, f64)> {
        Some((
            self.percentile(25)?,
            self.percentile(50)?,
            self.percentile(75)?,
        ))
    }

    /// `Q3 - Q1`.
    #[must_use]
    pub fn interquartile_range(&self) -> Option<f64> {
        self.quartiles().map(|(q1, _, q3)| q3 - q1)
    }

    /// Sum of all bucket counts. Equals `count` for any histogram we build.
    #[must_use]
    pub fn bucketed_count(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.count).sum()
    }
}

/// Statistics restricted to one category label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    /// Raw label as found on the documents; may be empty.
    pub label: String,
    pub count: usize,
    pub summary: DistributionSummary,
}

impl CategoryStats {
    /// Label for display; the empty label renders as [`UNCATEGORIZED_LABEL`].
    #[must_use]
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            UNCATEGORIZED_LABEL
        } else {
            &self.label
        }
    }
}

/// Display ordering for a [`CategoryBreakdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorySort {
    /// First appearance in rank order.
    #[default]
    Insertion,
    /// Best mean score first.
    MeanDescending,
    /// Largest group first.
    CountDescending,
    /// Lexicographic by label.
    Label,
}

/// Per-category counts and distributions, in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub categories: Vec<CategoryStats>,
}

impl CategoryBreakdown {
    /// Total documents across all groups.
    #[must_use]
    pub fn total(&self) -> usize {
        self.categories.iter().map(|stats| stats.count).sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Stats for an exact label.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&CategoryStats> {
        self.categories.iter().find(|stats| stats.label == label)
    }

    /// Label → count, for compact summaries.
    #[must_use]
    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.categories
            .iter()
            .map(|stats| (stats.label.clone(), stats.count))
            .collect()
    }

    /// A copy re-ordered for display. Sorting is stable, so equal keys keep
    /// insertion order.
    #[must_use]
    pub fn sorted_by(&self, sort: CategorySort) -> Self {
        let mut categories = self.categories.clone();
        match sort {
            CategorySort::Insertion => {}
            CategorySort::MeanDescending => {
                categories.sort_by(|a, b| b.summary.mean.total_cmp(&a.summary.mean));
            }
            CategorySort::CountDescending => categories.sort_by(|a, b| b.count.cmp(&a.count)),
            CategorySort::Label => categories.sort_by(|a, b| a.label.cmp(&b.label)),
        }
        Self { categories }
    }
}

/// Best/worst/central tendency of a result list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    /// Highest (least negative) score.
    pub best: f64,
    /// Lowest (most negative) score.
    pub worst: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

impl From<&DistributionSummary> for ScoreRange {
    fn from(summary: &DistributionSummary) -> Self {
        Self {
            best: summary.max,
            worst: summary.min,
            mean: summary.mean,
            median: summary.median,
            std_dev: summary.std_dev,
        }
    }
}

/// Everything known about one query's result list.
///
/// An empty result list produces `total_results == 0` and `None` statistics
/// rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub query: String,
    pub total_results: usize,
    pub range: Option<ScoreRange>,
    pub distribution: Option<DistributionSummary>,
    pub categories: Option<CategoryBreakdown>,
    pub tier_counts: BTreeMap<RelevanceTier, usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<AnalysisWarning>,
}

impl ScoreReport {
    /// Report for a query that returned nothing. Every tier is listed with a
    /// zero count.
    #[must_use]
    pub fn empty(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            total_results: 0,
            range: None,
            distribution: None,
            categories: None,
            tier_counts: RelevanceTier::ALL.iter().map(|tier| (*tier, 0)).collect(),
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total_results == 0
    }
}
