//! Per-category grouping of a result list.

use std::collections::HashMap;

use rankscope_core::{
    AnalysisError, AnalysisResult, CategoryBreakdown, CategoryStats, ScoreSet, ScoredDocument,
};
use tracing::{debug, instrument, warn};

use crate::distribution::DistributionAnalyzer;

/// Groups documents by exact category label and summarizes each group.
///
/// Groups appear in order of first appearance in rank order. The empty label
/// is a group of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryAggregator {
    analyzer: DistributionAnalyzer,
}

impl CategoryAggregator {
    #[must_use]
    pub const fn new(analyzer: DistributionAnalyzer) -> Self {
        Self { analyzer }
    }

    /// # Errors
    ///
    /// Returns `AnalysisError::EmptyInput` when the set is empty or no group
    /// has a finite score.
    #[instrument(
        name = "rankscope::aggregate",
        skip(self, set),
        fields(doc_count = set.len())
    )]
    pub fn aggregate(&self, set: &ScoreSet) -> AnalysisResult<CategoryBreakdown> {
        self.summarize(set.iter())
    }

    /// Like [`CategoryAggregator::aggregate`], keeping only documents whose
    /// label is listed in `categories`. An empty list keeps every category.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::EmptyInput` when no document survives the filter.
    #[instrument(
        name = "rankscope::aggregate",
        skip(self, set, categories),
        fields(doc_count = set.len(), filter_count = categories.len())
    )]
    pub fn aggregate_filtered(
        &self,
        set: &ScoreSet,
        categories: &[&str],
    ) -> AnalysisResult<CategoryBreakdown> {
        if categories.is_empty() {
            return self.summarize(set.iter());
        }
        self.summarize(
            set.iter()
                .filter(|doc| categories.contains(&doc.category.as_str())),
        )
    }

    fn summarize<'a>(
        &self,
        documents: impl Iterator<Item = &'a ScoredDocument>,
    ) -> AnalysisResult<CategoryBreakdown> {
        let mut order: Vec<(&str, Vec<f64>)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for doc in documents {
            let label = doc.category.as_str();
            let slot = *index.entry(label).or_insert_with(|| {
                order.push((label, Vec::new()));
                order.len() - 1
            });
            order[slot].1.push(doc.score);
        }

        if order.is_empty() {
            return Err(AnalysisError::EmptyInput {
                context: "category aggregation",
            });
        }

        let mut categories = Vec::with_capacity(order.len());
        for (label, scores) in order {
            match self.analyzer.analyze(&scores) {
                Ok(summary) => categories.push(CategoryStats {
                    label: label.to_owned(),
                    count: scores.len(),
                    summary,
                }),
                Err(AnalysisError::EmptyInput { .. }) => {
                    warn!(
                        target: "rankscope.category",
                        category = label,
                        count = scores.len(),
                        "category has no finite score, omitted"
                    );
                }
                Err(other) => return Err(other),
            }
        }

        if categories.is_empty() {
            return Err(AnalysisError::EmptyInput {
                context: "category aggregation",
            });
        }

        let breakdown = CategoryBreakdown { categories };
        debug!(
            target: "rankscope.category",
            category_count = breakdown.len(),
            total = breakdown.total(),
            "categories aggregated"
        );
        Ok(breakdown)
    }
}
