//! Score distribution statistics.
//!
//! Summarizes a sample of scores into location, spread, percentiles and an
//! equal-width histogram. Input is copied and sorted internally; the caller's
//! slice and [`ScoreSet`] order are never touched.
//!
//! Percentiles use linear interpolation between closest ranks:
//!
//! ```text
//! index = p / 100 * (n - 1)
//! value = sorted[floor(index)] + (sorted[ceil(index)] - sorted[floor(index)]) * frac(index)
//! ```

use std::collections::BTreeMap;

use rankscope_core::{
    usize_to_f64, AnalysisConfig, AnalysisError, AnalysisResult, DistributionSummary,
    HistogramBucket, ScoreSet, DEFAULT_BUCKET_COUNT, DEFAULT_PERCENTILES,
};
use tracing::{debug, instrument, warn};

/// Computes [`DistributionSummary`] values with a fixed bucket count and
/// percentile list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionAnalyzer {
    bucket_count: usize,
    percentiles: Vec<u8>,
}

impl Default for DistributionAnalyzer {
    fn default() -> Self {
        Self {
            bucket_count: DEFAULT_BUCKET_COUNT,
            percentiles: DEFAULT_PERCENTILES.to_vec(),
        }
    }
}

impl DistributionAnalyzer {
    /// Creates an analyzer. Percentiles above 100 are clamped to 100.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidConfig` when `bucket_count` is zero.
    pub fn new(bucket_count: usize, percentiles: Vec<u8>) -> AnalysisResult<Self> {
        check_bucket_count(bucket_count)?;
        let mut percentiles: Vec<u8> = percentiles.into_iter().map(|p| p.min(100)).collect();
        percentiles.sort_unstable();
        percentiles.dedup();
        Ok(Self {
            bucket_count,
            percentiles,
        })
    }

    /// Builds an analyzer from the `[analysis]` config section.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidConfig` when `histogram_buckets` is zero.
    pub fn from_config(config: &AnalysisConfig) -> AnalysisResult<Self> {
        Self::new(config.histogram_buckets, config.percentiles.clone())
    }

    #[must_use]
    pub const fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    #[must_use]
    pub fn percentiles(&self) -> &[u8] {
        &self.percentiles
    }

    /// Summarizes `scores`. NaN and infinite values are skipped and counted
    /// in `skipped_non_finite`.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::EmptyInput` when no finite score remains.
    #[instrument(
        name = "rankscope::analyze",
        skip(self, scores),
        fields(score_count = scores.len(), bucket_count = self.bucket_count)
    )]
    pub fn analyze(&self, scores: &[f64]) -> AnalysisResult<DistributionSummary> {
        let mut sorted: Vec<f64> = scores.iter().copied().filter(|s| s.is_finite()).collect();
        let skipped_non_finite = scores.len() - sorted.len();
        if skipped_non_finite > 0 {
            warn!(
                target: "rankscope.distribution",
                skipped_non_finite,
                "non-finite scores left out of distribution"
            );
        }
        if sorted.is_empty() {
            return Err(AnalysisError::EmptyInput {
                context: "distribution",
            });
        }
        sorted.sort_by(f64::total_cmp);

        let n = usize_to_f64(sorted.len());
        let mean = sorted.iter().sum::<f64>() / n;
        let variance = sorted.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        let median = percentile(&sorted, 50.0).unwrap_or(mean);

        let percentiles: BTreeMap<u8, f64> = self
            .percentiles
            .iter()
            .filter_map(|&p| percentile(&sorted, f64::from(p)).map(|value| (p, value)))
            .collect();
        let buckets = histogram(&sorted, self.bucket_count)?;

        let summary = DistributionSummary {
            count: sorted.len(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean,
            median,
            std_dev: variance.sqrt(),
            percentiles,
            buckets,
            skipped_non_finite,
        };

        debug!(
            target: "rankscope.distribution",
            count = summary.count,
            mean = summary.mean,
            std_dev = summary.std_dev,
            buckets = summary.buckets.len(),
            "distribution computed"
        );

        Ok(summary)
    }

    /// Summarizes the scores of a result list.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::EmptyInput` when the set has no finite score.
    pub fn analyze_set(&self, set: &ScoreSet) -> AnalysisResult<DistributionSummary> {
        self.analyze(&set.scores())
    }
}

/// Interpolated value at percentile `p` of an ascending slice.
///
/// `p` is clamped to `[0, 100]`. Returns `None` for an empty slice or NaN `p`.
#[must_use]
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || p.is_nan() {
        return None;
    }
    let p = p.clamp(0.0, 100.0);
    let index = p / 100.0 * usize_to_f64(sorted.len() - 1);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (lower, upper) = (index.floor() as usize, index.ceil() as usize);
    let upper = upper.min(sorted.len() - 1);
    if lower == upper {
        return Some(sorted[lower]);
    }

    let fraction = index - usize_to_f64(lower);
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Equal-width histogram over finite `values` with `bucket_count` buckets.
///
/// Bucket `i` covers `[min + i*w, min + (i+1)*w)` with `w = (max - min) / k`;
/// the maximum lands in the last bucket. When every value is identical the
/// result is a single `[v, v]` bucket holding all of them. An empty input
/// yields no buckets.
///
/// Bounds and positions are computed on half-scaled values, so a span wider
/// than `f64::MAX` still produces finite bounds.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidConfig` when `bucket_count` is zero.
pub fn histogram(values: &[f64], bucket_count: usize) -> AnalysisResult<Vec<HistogramBucket>> {
    check_bucket_count(bucket_count)?;
    if values.is_empty() {
        return Ok(Vec::new());
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max <= min {
        return Ok(vec![HistogramBucket {
            min,
            max,
            count: values.len(),
            label: format!("{min:.2}"),
        }]);
    }

    let k = usize_to_f64(bucket_count);
    let bound = |i: usize| {
        let t = usize_to_f64(i) / k;
        min * (1.0 - t) + max * t
    };
    let mut buckets: Vec<HistogramBucket> = (0..bucket_count)
        .map(|i| {
            let lo = if i == 0 { min } else { bound(i) };
            let hi = if i + 1 == bucket_count {
                max
            } else {
                bound(i + 1)
            };
            HistogramBucket {
                min: lo,
                max: hi,
                count: 0,
                label: format!("{lo:.2} to {hi:.2}"),
            }
        })
        .collect();

    let half_span = max * 0.5 - min * 0.5;
    let last = bucket_count - 1;
    for &value in values {
        let position = (value * 0.5 - min * 0.5) / half_span * k;
        let index = if value >= max || !position.is_finite() {
            last
        } else {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let index = position.floor().max(0.0) as usize;
            index.min(last)
        };
        buckets[index].count += 1;
    }

    Ok(buckets)
}

fn check_bucket_count(bucket_count: usize) -> AnalysisResult<()> {
    if bucket_count == 0 {
        return Err(AnalysisError::InvalidConfig {
            field: "analysis.histogram_buckets".into(),
            value: "0".into(),
            reason: "must be at least 1".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // ─── Percentiles ───

    #[test]
    fn median_of_even_count_interpolates() {
        assert_eq!(percentile(&[1.0, 2.0, 3.0, 4.0], 50.0), Some(2.5));
    }

    #[test]
    fn median_of_odd_count_is_middle() {
        assert_eq!(percentile(&[1.0, 2.0, 3.0], 50.0), Some(2.0));
    }

    #[test]
    fn percentile_extremes_and_clamping() {
        let sorted = [-4.0, -3.0, -2.0, -1.0];
        assert_eq!(percentile(&sorted, 0.0), Some(-4.0));
        assert_eq!(percentile(&sorted, 100.0), Some(-1.0));
        assert_eq!(percentile(&sorted, 150.0), Some(-1.0));
        assert_eq!(percentile(&sorted, -10.0), Some(-4.0));
        assert_eq!(percentile(&sorted, f64::NAN), None);
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn percentile_interpolates_between_neighbours() {
        let sorted = [0.0, 10.0];
        let p25 = percentile(&sorted, 25.0).expect("p25");
        assert!(close(p25, 2.5));
    }

    // ─── Histogram ───

    #[test]
    fn histogram_zero_buckets_is_invalid_config() {
        let err = histogram(&[1.0], 0).expect_err("must fail");
        assert!(matches!(err, AnalysisError::InvalidConfig { .. }));
    }

    #[test]
    fn histogram_places_max_in_last_bucket() {
        let buckets = histogram(&[0.0, 1.0, 2.0, 3.0, 4.0], 4).expect("histogram");
        assert_eq!(buckets.len(), 4);
        let counts: Vec<_> = buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1, 1, 2]);
        assert!(close(buckets[3].max, 4.0));
        assert_eq!(buckets[0].label, "0.00 to 1.00");
    }

    #[test]
    fn histogram_identical_values_collapse_to_one_bucket() {
        let buckets = histogram(&[-1.5; 7], 10).expect("histogram");
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].count, 7);
        assert_eq!(buckets[0].label, "-1.50");
    }

    #[test]
    fn histogram_span_wider_than_f64_max_stays_finite() {
        let buckets = histogram(&[-1e308, 1e308], 2).expect("histogram");
        assert_eq!(buckets.len(), 2);
        for bucket in &buckets {
            assert!(bucket.min.is_finite() && bucket.max.is_finite(), "{bucket:?}");
            assert!(!bucket.label.contains("NaN") && !bucket.label.contains("inf"));
        }
        assert_eq!(buckets[0].count, 1);
        assert_eq!(buckets[1].count, 1);
        assert!(close(buckets[1].min, 0.0));
    }

    #[test]
    fn histogram_extreme_values_across_many_buckets() {
        let values = [f64::MIN, f64::MIN / 2.0, 1.0, f64::MAX];
        let buckets = histogram(&values, 4).expect("histogram");
        let counts: Vec<_> = buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1, 1, 1]);
        assert!(buckets.iter().all(|b| b.min <= b.max && b.max.is_finite()));
    }

    #[test]
    fn histogram_empty_input_has_no_buckets() {
        assert!(histogram(&[], 3).expect("histogram").is_empty());
    }

    // ─── Analyzer ───

    #[test]
    fn analyze_basic_statistics() {
        let summary = DistributionAnalyzer::default()
            .analyze(&[-4.0, -1.0, -3.0, -2.0])
            .expect("analyze");
        assert_eq!(summary.count, 4);
        assert!(close(summary.min, -4.0));
        assert!(close(summary.max, -1.0));
        assert!(close(summary.mean, -2.5));
        assert!(close(summary.median, -2.5));
        assert!(close(summary.std_dev, 1.25_f64.sqrt()));
        assert_eq!(summary.bucketed_count(), 4);
        assert_eq!(summary.percentiles.len(), 6);
    }

    #[test]
    fn analyze_identical_values() {
        let summary = DistributionAnalyzer::default()
            .analyze(&[-2.0; 5])
            .expect("analyze");
        assert!(close(summary.mean, -2.0));
        assert!(close(summary.median, -2.0));
        assert!(close(summary.std_dev, 0.0));
        assert_eq!(summary.buckets.len(), 1);
        assert_eq!(summary.buckets[0].count, 5);
    }

    #[test]
    fn analyze_empty_is_empty_input() {
        let err = DistributionAnalyzer::default()
            .analyze(&[])
            .expect_err("must fail");
        assert!(matches!(err, AnalysisError::EmptyInput { .. }));
    }

    #[test]
    fn analyze_skips_non_finite() {
        let summary = DistributionAnalyzer::default()
            .analyze(&[-1.0, f64::NAN, -3.0, f64::INFINITY])
            .expect("analyze");
        assert_eq!(summary.count, 2);
        assert_eq!(summary.skipped_non_finite, 2);
        assert!(close(summary.mean, -2.0));

        let err = DistributionAnalyzer::default()
            .analyze(&[f64::NAN])
            .expect_err("must fail");
        assert!(matches!(err, AnalysisError::EmptyInput { .. }));
    }

    #[test]
    fn analyze_does_not_mutate_input() {
        let scores = vec![-3.0, -1.0, -2.0];
        let _ = DistributionAnalyzer::default().analyze(&scores);
        assert_eq!(scores, vec![-3.0, -1.0, -2.0]);
    }

    #[test]
    fn new_rejects_zero_buckets_and_clamps_percentiles() {
        assert!(DistributionAnalyzer::new(0, vec![50]).is_err());
        let analyzer = DistributionAnalyzer::new(3, vec![200, 50, 50]).expect("analyzer");
        assert_eq!(analyzer.percentiles(), &[50, 100]);
        assert_eq!(analyzer.bucket_count(), 3);
    }

    #[test]
    fn from_config_uses_section_values() {
        let config = AnalysisConfig {
            histogram_buckets: 4,
            percentiles: vec![90],
        };
        let summary = DistributionAnalyzer::from_config(&config)
            .expect("analyzer")
            .analyze(&[1.0, 2.0, 3.0, 4.0, 5.0])
            .expect("analyze");
        assert_eq!(summary.buckets.len(), 4);
        assert_eq!(summary.percentiles.keys().copied().collect::<Vec<_>>(), vec![90]);
    }

    #[test]
    fn summary_serializes_for_presentation() {
        let summary = DistributionAnalyzer::default()
            .analyze(&[-1.0, -2.0])
            .expect("analyze");
        let json = serde_json::to_value(&summary).expect("serialize");
        assert_eq!(json["count"], 2);
        assert!(json["buckets"].is_array());
    }
}
