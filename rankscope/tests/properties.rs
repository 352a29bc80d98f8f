//! Property-based tests for score statistics and strategy comparison.
//!
//! Verifies invariants of the distribution summary, histogram, relevance
//! tiers, category breakdowns and strategy diffs across randomized result
//! lists.

use proptest::prelude::*;

use rankscope::core::RankChange;
use rankscope::stats::percentile;
use rankscope::{kendall_tau, Analyzer, RelevanceClassifier, ScoreSet, ScoredDocument};

// ── Strategies ────────────────────────────────────────────────────────

/// A BM25-style score: negative, better when closer to zero.
fn arb_score() -> impl Strategy<Value = f64> {
    -50.0_f64..0.0
}

fn arb_scores(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(arb_score(), 1..=max_len)
}

/// A result list with unique ids, ranked by descending score.
fn arb_result_list(max_len: usize) -> impl Strategy<Value = ScoreSet> {
    prop::collection::vec((arb_score(), 0_usize..4), 1..=max_len).prop_map(|mut entries| {
        entries.sort_by(|a, b| b.0.total_cmp(&a.0));
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (score, category))| {
                ScoredDocument::new(format!("doc-{i}"), score)
                    .with_category(["", "guide", "faq", "blog"][category])
            })
            .collect()
    })
}

fn tolerance(value: f64) -> f64 {
    1e-9 * value.abs().max(1.0)
}

// ── Distribution ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn median_is_fiftieth_percentile(scores in arb_scores(64)) {
        let summary = Analyzer::default().analyze_scores(&scores).expect("summary");
        prop_assert_eq!(summary.percentile(50), Some(summary.median));
    }

    #[test]
    fn percentiles_are_monotone_and_bounded(scores in arb_scores(64)) {
        let mut sorted = scores.clone();
        sorted.sort_by(f64::total_cmp);
        let min = sorted[0];
        let max = sorted[sorted.len() - 1];

        let mut previous = f64::NEG_INFINITY;
        for p in 0..=100_u8 {
            let value = percentile(&sorted, f64::from(p)).expect("non-empty");
            prop_assert!(value >= previous - tolerance(value));
            prop_assert!(value >= min - tolerance(min));
            prop_assert!(value <= max + tolerance(max));
            previous = value;
        }
    }

    #[test]
    fn histogram_accounts_for_every_score(scores in arb_scores(128), buckets in 1_usize..20) {
        let summary = rankscope::DistributionAnalyzer::new(buckets, vec![50])
            .expect("analyzer")
            .analyze(&scores)
            .expect("summary");
        prop_assert_eq!(summary.bucketed_count(), scores.len());
        prop_assert!(summary.buckets.len() <= buckets);
    }

    #[test]
    fn identical_scores_collapse(score in arb_score(), n in 1_usize..40) {
        let summary = Analyzer::default().analyze_scores(&vec![score; n]).expect("summary");
        prop_assert_eq!(summary.min, summary.max);
        prop_assert_eq!(summary.buckets.len(), 1);
        prop_assert_eq!(summary.buckets[0].count, n);
        prop_assert!((summary.mean - score).abs() <= tolerance(score));
        prop_assert!(summary.std_dev <= tolerance(score));
    }

    #[test]
    fn non_finite_scores_never_leak_into_statistics(
        scores in arb_scores(32),
        nan_count in 0_usize..4,
        inf_count in 0_usize..4,
    ) {
        let mut mixed = scores.clone();
        mixed.extend(std::iter::repeat(f64::NAN).take(nan_count));
        mixed.extend(std::iter::repeat(f64::INFINITY).take(inf_count));
        let summary = Analyzer::default().analyze_scores(&mixed).expect("summary");
        prop_assert_eq!(summary.count, scores.len());
        prop_assert_eq!(summary.skipped_non_finite, nan_count + inf_count);
        prop_assert!(summary.mean.is_finite());
        prop_assert!(summary.std_dev.is_finite());
    }
}

// ── Relevance and categories ──────────────────────────────────────────

proptest! {
    #[test]
    fn higher_score_never_ranks_lower_tier(a in -10.0_f64..1.0, b in -10.0_f64..1.0) {
        let classifier = RelevanceClassifier::default();
        let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
        prop_assert!(classifier.classify(hi) <= classifier.classify(lo));
    }

    #[test]
    fn tier_counts_cover_every_document(set in arb_result_list(40)) {
        let counts = Analyzer::default().tier_counts(&set);
        prop_assert_eq!(counts.len(), 4);
        prop_assert_eq!(counts.values().sum::<usize>(), set.len());
    }

    #[test]
    fn category_counts_cover_every_document(set in arb_result_list(40)) {
        let breakdown = Analyzer::default().aggregate(&set).expect("breakdown");
        prop_assert_eq!(breakdown.total(), set.len());
        for stats in &breakdown.categories {
            prop_assert_eq!(stats.count, stats.summary.count);
        }
    }
}

// ── Comparison ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn self_comparison_is_identity(set in arb_result_list(40)) {
        let result = Analyzer::default().compare_sets("q", &set, &set);
        prop_assert_eq!(result.summary.common_count, set.len());
        prop_assert!(result.dropped.is_empty());
        prop_assert!(result.new.is_empty());
        prop_assert!((result.summary.overlap_ratio - 1.0).abs() <= f64::EPSILON);
        prop_assert!(result.common.iter().all(|doc| doc.change == RankChange::Unchanged));
        if set.len() >= 2 {
            prop_assert_eq!(result.summary.kendall_tau, Some(1.0));
        } else {
            prop_assert_eq!(result.summary.kendall_tau, None);
        }
    }

    #[test]
    fn buckets_partition_both_lists(left in arb_result_list(30), right in arb_result_list(30)) {
        let result = Analyzer::default().compare_sets("q", &left, &right);
        prop_assert_eq!(result.common.len() + result.dropped.len(), left.len());
        prop_assert_eq!(result.common.len() + result.new.len(), right.len());
        prop_assert!((0.0..=1.0).contains(&result.summary.overlap_ratio));
    }

    #[test]
    fn tau_is_bounded(left in arb_result_list(30), right in arb_result_list(30)) {
        if let Some(tau) = kendall_tau(&left, &right) {
            prop_assert!((-1.0..=1.0).contains(&tau));
        }
    }
}
