//! One-call statistics report for a query's result list.

use rankscope_core::{
    AnalysisWarning, CategoryBreakdown, ScoreRange, ScoreReport, ScoreSet, WarningKind,
};
use tracing::{debug, instrument};

use crate::category::CategoryAggregator;
use crate::distribution::DistributionAnalyzer;
use crate::relevance::RelevanceClassifier;

/// Combines distribution, category and tier analysis into a [`ScoreReport`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreReporter {
    analyzer: DistributionAnalyzer,
    classifier: RelevanceClassifier,
}

impl ScoreReporter {
    #[must_use]
    pub const fn new(analyzer: DistributionAnalyzer, classifier: RelevanceClassifier) -> Self {
        Self {
            analyzer,
            classifier,
        }
    }

    /// Never fails: an empty list yields [`ScoreReport::empty`], and a list
    /// without finite scores yields `None` statistics plus a warning.
    #[instrument(
        name = "rankscope::report",
        skip(self, query, set),
        fields(query_len = query.len(), doc_count = set.len())
    )]
    pub fn report(&self, query: &str, set: &ScoreSet) -> ScoreReport {
        if set.is_empty() {
            debug!(target: "rankscope.report", "empty result list");
            return ScoreReport::empty(query);
        }

        let distribution = self.analyzer.analyze_set(set).ok();
        let categories = CategoryAggregator::new(self.analyzer.clone())
            .aggregate(set)
            .ok();

        let skipped = distribution
            .as_ref()
            .map_or(set.len(), |summary| summary.skipped_non_finite);
        let mut warnings = Vec::new();
        if skipped > 0 {
            warnings.push(AnalysisWarning::new(
                WarningKind::NonFiniteScores,
                format!(
                    "{skipped} of {} scores were NaN or infinite and left out of the statistics",
                    set.len()
                ),
            ));
        }
        if distribution.is_none() {
            debug!(target: "rankscope.report", "no finite score, statistics omitted");
        }

        let report = ScoreReport {
            query: query.to_owned(),
            total_results: set.len(),
            range: distribution.as_ref().map(ScoreRange::from),
            distribution,
            categories,
            tier_counts: self.classifier.tier_counts(set),
            warnings,
        };

        debug!(
            target: "rankscope.report",
            total_results = report.total_results,
            category_count = report.categories.as_ref().map_or(0, CategoryBreakdown::len),
            "report built"
        );
        report
    }
}
