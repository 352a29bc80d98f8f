//! Strategy comparison records.
//!
//! A [`ComparisonResult`] is the diff between two ranked result lists for the
//! same query: which documents both strategies returned, which each returned
//! alone, and how the shared documents moved.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisWarning;
use crate::summary::DistributionSummary;
use crate::types::{FieldWeights, ScoredDocument};

/// Score differences smaller than this count as "no change".
pub const SCORE_TOLERANCE: f64 = 0.001;

/// How a document present in both runs moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankChange {
    /// Score rose by at least the tie tolerance.
    Improved,
    /// Score fell by at least the tie tolerance.
    Worsened,
    /// Score moved less than the tie tolerance and relative order held.
    Unchanged,
    /// Relative order against the other shared documents changed.
    Reordered,
}

impl RankChange {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Improved => "improved",
            Self::Worsened => "worsened",
            Self::Unchanged => "unchanged",
            Self::Reordered => "reordered",
        }
    }
}

impl std::fmt::Display for RankChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One side of a comparison, as handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyResult {
    pub name: String,
    pub description: String,
    /// Weights the strategy ran with; `None` means engine defaults.
    pub field_weights: Option<FieldWeights>,
    pub result_count: usize,
    /// Score distribution of this run, `None` when it returned nothing.
    pub distribution: Option<DistributionSummary>,
    /// Full result list in rank order.
    pub documents: Vec<ScoredDocument>,
}

/// A document both strategies returned. Ranks are 0-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonDocument {
    pub doc_id: String,
    pub title: String,
    pub baseline_rank: usize,
    pub variant_rank: usize,
    pub baseline_score: f64,
    pub variant_score: f64,
    /// `variant_score - baseline_score`; positive is better.
    pub score_delta: f64,
    /// `variant_rank - baseline_rank`; negative means promoted.
    pub rank_delta: i64,
    pub change: RankChange,
}

/// A document only one strategy returned. Rank is 0-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniqueDocument {
    pub doc_id: String,
    pub title: String,
    pub rank: usize,
    pub score: f64,
}

impl UniqueDocument {
    #[must_use]
    pub fn at_rank(doc: &ScoredDocument, rank: usize) -> Self {
        Self {
            doc_id: doc.doc_id.clone(),
            title: doc.title.clone(),
            rank,
            score: doc.score,
        }
    }
}

/// Aggregate counts for a one-line summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub common_count: usize,
    pub dropped_count: usize,
    pub new_count: usize,
    pub improved: usize,
    pub worsened: usize,
    pub unchanged: usize,
    pub reordered: usize,
    /// `|common| / |baseline ∪ variant|`, 0.0 when both are empty.
    pub overlap_ratio: f64,
    /// Mean of `score_delta` over common documents.
    pub mean_score_delta: Option<f64>,
    /// Kendall tau over common documents; `None` below two.
    pub kendall_tau: Option<f64>,
}

impl ComparisonSummary {
    /// Count for one classification.
    #[must_use]
    pub const fn count(&self, change: RankChange) -> usize {
        match change {
            RankChange::Improved => self.improved,
            RankChange::Worsened => self.worsened,
            RankChange::Unchanged => self.unchanged,
            RankChange::Reordered => self.reordered,
        }
    }
}

/// What happened at one rank position, for side-by-side tables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "delta")]
pub enum RowChange {
    /// Same document at this position; score moved by the delta.
    ScoreDelta(f64),
    /// Same document, score within tolerance.
    Same,
    /// Different documents at this position.
    Reordered,
    /// Only the baseline reaches this position.
    Dropped,
    /// Only the variant reaches this position.
    New,
}

/// One row of a positional side-by-side table. Rank is 0-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankRow {
    pub rank: usize,
    pub baseline: Option<UniqueDocument>,
    pub variant: Option<UniqueDocument>,
    pub change: RowChange,
}

/// Diff between a baseline and a variant run of the same query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub query: String,
    pub baseline: StrategyResult,
    pub variant: StrategyResult,
    /// Shared documents in baseline rank order.
    pub common: Vec<CommonDocument>,
    /// Baseline-only documents in baseline rank order.
    pub dropped: Vec<UniqueDocument>,
    /// Variant-only documents in variant rank order.
    pub new: Vec<UniqueDocument>,
    pub summary: ComparisonSummary,
    /// Degraded-outcome flags; empty for a normal comparison.
    pub warnings: Vec<AnalysisWarning>,
}

impl ComparisonResult {
    /// Whether the comparison carries any warning.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Shared document by id.
    #[must_use]
    pub fn common_document(&self, doc_id: &str) -> Option<&CommonDocument> {
        self.common.iter().find(|doc| doc.doc_id == doc_id)
    }

    /// Shared documents with the given classification.
    pub fn with_change(&self, change: RankChange) -> impl Iterator<Item = &CommonDocument> {
        self.common.iter().filter(move |doc| doc.change == change)
    }

    /// Position-by-position side-by-side rows, as long as the longer list.
    #[must_use]
    pub fn rank_table(&self) -> Vec<RankRow> {
        let baseline = &self.baseline.documents;
        let variant = &self.variant.documents;
        (0..baseline.len().max(variant.len()))
            .map(|rank| {
                let left = baseline.get(rank);
                let right = variant.get(rank);
                let change = match (left, right) {
                    (Some(b), Some(v)) if b.doc_id == v.doc_id => {
                        let delta = v.score - b.score;
                        if delta.abs() < SCORE_TOLERANCE {
                            RowChange::Same
                        } else {
                            RowChange::ScoreDelta(delta)
                        }
                    }
                    (Some(_), Some(_)) => RowChange::Reordered,
                    (Some(_), None) => RowChange::Dropped,
                    (None, _) => RowChange::New,
                };
                RankRow {
                    rank,
                    baseline: left.map(|doc| UniqueDocument::at_rank(doc, rank)),
                    variant: right.map(|doc| UniqueDocument::at_rank(doc, rank)),
                    change,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_change_labels() {
        assert_eq!(RankChange::Improved.to_string(), "improved");
        assert_eq!(RankChange::Reordered.as_str(), "reordered");
    }

    #[test]
    fn summary_count_by_change() {
        let summary = ComparisonSummary {
            improved: 2,
            worsened: 1,
            unchanged: 4,
            reordered: 3,
            ..ComparisonSummary::default()
        };
        assert_eq!(summary.count(RankChange::Improved), 2);
        assert_eq!(summary.count(RankChange::Reordered), 3);
    }

    fn strategy(name: &str, docs: &[(&str, f64)]) -> StrategyResult {
        StrategyResult {
            name: name.into(),
            description: String::new(),
            field_weights: None,
            result_count: docs.len(),
            distribution: None,
            documents: docs
                .iter()
                .map(|(id, score)| ScoredDocument::new(*id, *score))
                .collect(),
        }
    }

    fn result(baseline: StrategyResult, variant: StrategyResult) -> ComparisonResult {
        ComparisonResult {
            query: "q".into(),
            baseline,
            variant,
            common: Vec::new(),
            dropped: Vec::new(),
            new: Vec::new(),
            summary: ComparisonSummary::default(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn rank_table_marks_each_position() {
        let r = result(
            strategy("baseline", &[("a", -1.0), ("b", -2.0), ("c", -3.0), ("d", -4.0)]),
            strategy("variant", &[("a", -0.5), ("b", -2.0005), ("x", -2.5)]),
        );
        let rows = r.rank_table();
        assert_eq!(rows.len(), 4);
        assert!(matches!(rows[0].change, RowChange::ScoreDelta(d) if (d - 0.5).abs() < 1e-12));
        assert_eq!(rows[1].change, RowChange::Same);
        assert_eq!(rows[2].change, RowChange::Reordered);
        assert_eq!(rows[3].change, RowChange::Dropped);
        assert!(rows[3].variant.is_none());
        assert_eq!(rows[2].variant.as_ref().map(|d| d.doc_id.as_str()), Some("x"));
    }

    #[test]
    fn rank_table_new_rows_when_variant_longer() {
        let r = result(strategy("baseline", &[]), strategy("variant", &[("a", -1.0)]));
        let rows = r.rank_table();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].change, RowChange::New);
    }

    #[test]
    fn row_change_serializes_tagged() {
        let json = serde_json::to_value(RowChange::ScoreDelta(0.5)).expect("serialize");
        assert_eq!(json["kind"], "score_delta");
        assert_eq!(json["delta"], 0.5);

        let json = serde_json::to_value(RowChange::Dropped).expect("serialize");
        assert_eq!(json["kind"], "dropped");
    }
}
