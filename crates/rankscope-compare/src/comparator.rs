//! Baseline vs. variant comparison of two ranked result lists.
//!
//! Documents are matched by identifier. For every shared document:
//!
//! ```text
//! score_delta = variant_score - baseline_score
//!
//! Reordered  if its position among the shared documents differs between runs
//! Unchanged  else if |score_delta| < 0.001
//! Improved   else if score_delta > 0
//! Worsened   otherwise
//! ```
//!
//! Two runs with nothing in common, or an empty baseline, still produce a
//! result; it carries an `IncompatibleComparison` warning instead of failing.

use std::collections::HashMap;

use rankscope_core::{
    usize_to_f64, AnalysisWarning, CommonDocument, ComparisonResult, ComparisonSummary,
    FieldWeights, RankChange, ScoreSet, ScoredDocument, StrategyResult, UniqueDocument,
    WarningKind, SCORE_TOLERANCE,
};
use rankscope_stats::DistributionAnalyzer;
use tracing::{debug, instrument, warn};

use crate::correlation::{build_rank_map, kendall_tau_from_ranks};

/// One named ranking strategy and the results it produced for a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    pub name: String,
    pub description: String,
    /// Weights the strategy ran with; `None` means engine defaults.
    pub field_weights: Option<FieldWeights>,
    pub results: ScoreSet,
}

impl Strategy {
    #[must_use]
    pub fn new(name: impl Into<String>, results: ScoreSet) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            field_weights: None,
            results,
        }
    }

    /// Strategy named `baseline`.
    #[must_use]
    pub fn baseline(results: ScoreSet) -> Self {
        Self::new("baseline", results)
    }

    /// Strategy named `variant`.
    #[must_use]
    pub fn variant(results: ScoreSet) -> Self {
        Self::new("variant", results)
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_field_weights(mut self, weights: FieldWeights) -> Self {
        self.field_weights = Some(weights);
        self
    }
}

/// Diffs two strategies' result lists for the same query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrategyComparator {
    analyzer: DistributionAnalyzer,
}

impl StrategyComparator {
    /// `analyzer` summarizes each side's score distribution.
    #[must_use]
    pub const fn new(analyzer: DistributionAnalyzer) -> Self {
        Self { analyzer }
    }

    /// Compares two unnamed result lists.
    #[must_use]
    pub fn compare_sets(
        &self,
        query: &str,
        baseline: &ScoreSet,
        variant: &ScoreSet,
    ) -> ComparisonResult {
        self.compare(
            query,
            &Strategy::baseline(baseline.clone()),
            &Strategy::variant(variant.clone()),
        )
    }

    #[must_use]
    #[instrument(
        name = "rankscope::compare",
        skip(self, query, baseline, variant),
        fields(
            query_len = query.len(),
            baseline_count = baseline.results.len(),
            variant_count = variant.results.len(),
        )
    )]
    pub fn compare(
        &self,
        query: &str,
        baseline: &Strategy,
        variant: &Strategy,
    ) -> ComparisonResult {
        let baseline_docs = first_occurrences(&baseline.results);
        let variant_docs = first_occurrences(&variant.results);
        let baseline_rank = build_rank_map(&baseline.results);
        let variant_rank = build_rank_map(&variant.results);

        // Shared documents in baseline order, then their order in the variant.
        let shared: Vec<(usize, &ScoredDocument, usize, &ScoredDocument)> = baseline_docs
            .iter()
            .filter_map(|&(b_rank, b_doc)| {
                variant_rank
                    .get(b_doc.doc_id.as_str())
                    .map(|&v_rank| (b_rank, b_doc, v_rank, &variant.results.documents()[v_rank]))
            })
            .collect();
        let mut by_variant: Vec<usize> = (0..shared.len()).collect();
        by_variant.sort_by_key(|&i| shared[i].2);
        let mut variant_position = vec![0; shared.len()];
        for (position, &i) in by_variant.iter().enumerate() {
            variant_position[i] = position;
        }

        let common: Vec<CommonDocument> = shared
            .iter()
            .enumerate()
            .map(|(position, &(b_rank, b_doc, v_rank, v_doc))| {
                let score_delta = v_doc.score - b_doc.score;
                CommonDocument {
                    doc_id: b_doc.doc_id.clone(),
                    title: b_doc.title.clone(),
                    baseline_rank: b_rank,
                    variant_rank: v_rank,
                    baseline_score: b_doc.score,
                    variant_score: v_doc.score,
                    score_delta,
                    rank_delta: signed(v_rank) - signed(b_rank),
                    change: classify(position != variant_position[position], score_delta),
                }
            })
            .collect();

        let dropped: Vec<UniqueDocument> = baseline_docs
            .iter()
            .filter(|(_, doc)| !variant_rank.contains_key(doc.doc_id.as_str()))
            .map(|&(rank, doc)| UniqueDocument::at_rank(doc, rank))
            .collect();
        let new: Vec<UniqueDocument> = variant_docs
            .iter()
            .filter(|(_, doc)| !baseline_rank.contains_key(doc.doc_id.as_str()))
            .map(|&(rank, doc)| UniqueDocument::at_rank(doc, rank))
            .collect();

        let mut ranks_in_baseline_order: Vec<usize> = shared.iter().map(|s| s.2).collect();
        let summary = summarize(
            &common,
            dropped.len(),
            new.len(),
            kendall_tau_from_ranks(&mut ranks_in_baseline_order),
        );
        let warnings = degraded_warnings(baseline, variant, common.len());
        for warning in &warnings {
            warn!(
                target: "rankscope.compare",
                kind = %warning.kind,
                baseline = %baseline.name,
                variant = %variant.name,
                "{}",
                warning.message
            );
        }

        debug!(
            target: "rankscope.compare",
            common_count = summary.common_count,
            dropped_count = summary.dropped_count,
            new_count = summary.new_count,
            overlap_ratio = summary.overlap_ratio,
            "comparison complete"
        );

        ComparisonResult {
            query: query.to_owned(),
            baseline: self.strategy_result(baseline),
            variant: self.strategy_result(variant),
            common,
            dropped,
            new,
            summary,
            warnings,
        }
    }

    fn strategy_result(&self, strategy: &Strategy) -> StrategyResult {
        StrategyResult {
            name: strategy.name.clone(),
            description: strategy.description.clone(),
            field_weights: strategy.field_weights.clone(),
            result_count: strategy.results.len(),
            distribution: self.analyzer.analyze_set(&strategy.results).ok(),
            documents: strategy.results.documents().to_vec(),
        }
    }
}

fn first_occurrences(set: &ScoreSet) -> Vec<(usize, &ScoredDocument)> {
    let ranks = build_rank_map(set);
    set.iter()
        .enumerate()
        .filter(|(rank, doc)| ranks.get(doc.doc_id.as_str()) == Some(rank))
        .collect()
}

fn classify(reordered: bool, score_delta: f64) -> RankChange {
    if reordered {
        RankChange::Reordered
    } else if score_delta.is_nan() || score_delta.abs() < SCORE_TOLERANCE {
        RankChange::Unchanged
    } else if score_delta > 0.0 {
        RankChange::Improved
    } else {
        RankChange::Worsened
    }
}

fn signed(rank: usize) -> i64 {
    i64::try_from(rank).unwrap_or(i64::MAX)
}

fn summarize(
    common: &[CommonDocument],
    dropped_count: usize,
    new_count: usize,
    kendall_tau: Option<f64>,
) -> ComparisonSummary {
    let mut counts: HashMap<RankChange, usize> = HashMap::new();
    for doc in common {
        *counts.entry(doc.change).or_insert(0) += 1;
    }
    let count = |change: RankChange| counts.get(&change).copied().unwrap_or(0);

    let union = common.len() + dropped_count + new_count;
    let overlap_ratio = if union == 0 {
        0.0
    } else {
        usize_to_f64(common.len()) / usize_to_f64(union)
    };
    let mean_score_delta = (!common.is_empty()).then(|| {
        common.iter().map(|doc| doc.score_delta).sum::<f64>() / usize_to_f64(common.len())
    });

    ComparisonSummary {
        common_count: common.len(),
        dropped_count,
        new_count,
        improved: count(RankChange::Improved),
        worsened: count(RankChange::Worsened),
        unchanged: count(RankChange::Unchanged),
        reordered: count(RankChange::Reordered),
        overlap_ratio,
        mean_score_delta,
        kendall_tau,
    }
}

fn degraded_warnings(
    baseline: &Strategy,
    variant: &Strategy,
    common_count: usize,
) -> Vec<AnalysisWarning> {
    if baseline.results.is_empty() {
        return vec![AnalysisWarning::new(
            WarningKind::IncompatibleComparison,
            format!(
                "baseline '{}' returned no results; there is nothing to compare '{}' against",
                baseline.name, variant.name
            ),
        )];
    }
    if !variant.results.is_empty() && common_count == 0 {
        return vec![AnalysisWarning::new(
            WarningKind::IncompatibleComparison,
            format!(
                "'{}' and '{}' share no documents; rank and score deltas are undefined",
                baseline.name, variant.name
            ),
        )];
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(docs: &[(&str, f64)]) -> ScoreSet {
        docs.iter()
            .map(|(id, score)| ScoredDocument::new(*id, *score).with_title(format!("Title {id}")))
            .collect()
    }

    fn compare(baseline: &[(&str, f64)], variant: &[(&str, f64)]) -> ComparisonResult {
        StrategyComparator::default().compare_sets("q", &set(baseline), &set(variant))
    }

    #[test]
    fn self_comparison_is_all_unchanged() {
        let docs = [("1", -1.0), ("2", -2.0), ("3", -3.0)];
        let result = compare(&docs, &docs);
        assert!(result.dropped.is_empty());
        assert!(result.new.is_empty());
        assert_eq!(result.summary.unchanged, 3);
        assert!(result.common.iter().all(|d| d.change == RankChange::Unchanged));
        assert!((result.summary.overlap_ratio - 1.0).abs() < 1e-12);
        assert_eq!(result.summary.kendall_tau, Some(1.0));
        assert!(!result.is_degraded());
    }

    #[test]
    fn improved_dropped_and_new() {
        let result = compare(&[("1", -1.0), ("2", -2.0)], &[("1", -0.5), ("3", -1.5)]);

        assert_eq!(result.common.len(), 1);
        let one = &result.common[0];
        assert_eq!(one.doc_id, "1");
        assert!((one.score_delta - 0.5).abs() < 1e-12);
        assert_eq!(one.change, RankChange::Improved);

        assert_eq!(result.dropped.len(), 1);
        assert_eq!(result.dropped[0].doc_id, "2");
        assert_eq!(result.dropped[0].rank, 1);
        assert_eq!(result.new.len(), 1);
        assert_eq!(result.new[0].doc_id, "3");
        assert!((result.summary.overlap_ratio - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn worsened_when_score_falls() {
        let result = compare(&[("1", -1.0)], &[("1", -1.2)]);
        assert_eq!(result.common[0].change, RankChange::Worsened);
    }

    #[test]
    fn delta_below_tolerance_is_unchanged() {
        let result = compare(&[("1", -1.0)], &[("1", -1.0005)]);
        assert_eq!(result.common[0].change, RankChange::Unchanged);
    }

    #[test]
    fn relative_order_change_is_reordered() {
        let result = compare(&[("a", -1.0), ("b", -2.0)], &[("b", -0.5), ("a", -1.0)]);
        assert!(result.common.iter().all(|d| d.change == RankChange::Reordered));
        assert_eq!(result.summary.reordered, 2);
        assert_eq!(result.summary.kendall_tau, Some(-1.0));
        let b = result.common_document("b").expect("b");
        assert_eq!(b.rank_delta, -1);
    }

    #[test]
    fn interleaved_new_document_does_not_reorder() {
        let result = compare(
            &[("a", -1.0), ("b", -2.0)],
            &[("a", -1.0), ("x", -1.5), ("b", -2.0)],
        );
        assert!(result.common.iter().all(|d| d.change == RankChange::Unchanged));
        assert_eq!(result.common_document("b").map(|d| d.rank_delta), Some(1));
    }

    #[test]
    fn common_listed_in_baseline_order() {
        let result = compare(
            &[("a", -1.0), ("b", -2.0), ("c", -3.0)],
            &[("c", -1.0), ("b", -2.0), ("a", -3.0)],
        );
        let ids: Vec<_> = result.common.iter().map(|d| d.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn duplicate_ids_first_occurrence_wins() {
        let result = compare(&[("a", -1.0), ("a", -5.0)], &[("a", -1.0)]);
        assert_eq!(result.common.len(), 1);
        assert_eq!(result.common[0].baseline_rank, 0);
        assert!(result.dropped.is_empty());
    }

    #[test]
    fn disjoint_sets_warn() {
        let result = compare(&[("a", -1.0)], &[("b", -1.0)]);
        assert!(result.is_degraded());
        assert_eq!(result.warnings[0].kind, WarningKind::IncompatibleComparison);
        assert_eq!(result.summary.common_count, 0);
        assert_eq!(result.summary.mean_score_delta, None);
    }

    #[test]
    fn empty_baseline_warns() {
        let result = compare(&[], &[("b", -1.0)]);
        assert!(result.is_degraded());
        assert_eq!(result.new.len(), 1);
        assert!(result.baseline.distribution.is_none());
    }

    #[test]
    fn empty_variant_is_not_degraded() {
        let result = compare(&[("a", -1.0)], &[]);
        assert!(!result.is_degraded());
        assert_eq!(result.dropped.len(), 1);
    }

    #[test]
    fn strategy_metadata_carried_through() {
        let weights: FieldWeights = "title:2.0".parse().expect("weights");
        let baseline = Strategy::baseline(set(&[("a", -1.0)])).with_description("default bm25");
        let variant = Strategy::new("title-boost", set(&[("a", -0.8)]))
            .with_field_weights(weights.clone());
        let result = StrategyComparator::default().compare("q", &baseline, &variant);
        assert_eq!(result.baseline.description, "default bm25");
        assert_eq!(result.variant.name, "title-boost");
        assert_eq!(result.variant.field_weights, Some(weights));
        assert_eq!(result.variant.result_count, 1);
        assert!(result.variant.distribution.is_some());
        assert_eq!(result.common[0].title, "Title a");
    }

    #[test]
    fn mean_delta_over_common() {
        let result = compare(&[("a", -1.0), ("b", -2.0)], &[("a", -0.5), ("b", -1.5)]);
        assert_eq!(result.summary.improved, 2);
        let mean = result.summary.mean_score_delta.expect("mean");
        assert!((mean - 0.5).abs() < 1e-12);
    }
}
