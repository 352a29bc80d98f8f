use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::path::Path;

use rankscope_compare::{Strategy, StrategyComparator};
use rankscope_core::config::{self, ConfigLoadResult};
use rankscope_core::{
    AnalysisResult, CategoryBreakdown, ComparisonResult, DistributionSummary, RankscopeConfig,
    RelevanceTier, ScoreExplanation, ScoreReport, ScoreSet,
};
use rankscope_explain::ScoreExplainer;
use rankscope_stats::{
    CategoryAggregator, DistributionAnalyzer, RelevanceClassifier, ScoreReporter,
};
use tracing::{debug, warn};

/// All analyses, configured once from a [`RankscopeConfig`].
///
/// Holds no per-query state, so one value can be shared across threads and
/// reused for any number of result lists.
///
/// ```
/// use rankscope::prelude::*;
///
/// let analyzer = Analyzer::default();
/// let results: ScoreSet = vec![
///     ScoredDocument::new("a", -0.8).with_category("guide"),
///     ScoredDocument::new("b", -2.5).with_category("faq"),
///     ScoredDocument::new("c", -6.0).with_category("guide"),
/// ]
/// .into();
///
/// let report = analyzer.report("rust async", &results);
/// assert_eq!(report.total_results, 3);
/// assert_eq!(report.tier_counts[&RelevanceTier::Excellent], 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analyzer {
    config: RankscopeConfig,
    distribution: DistributionAnalyzer,
    classifier: RelevanceClassifier,
    explainer: ScoreExplainer,
}

impl Analyzer {
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidConfig` when any section fails
    /// validation.
    pub fn from_config(config: RankscopeConfig) -> AnalysisResult<Self> {
        config::validate_config(&config)?;
        let distribution = DistributionAnalyzer::from_config(&config.analysis)?;
        let classifier = RelevanceClassifier::from_config(&config.relevance)?;
        let explainer = ScoreExplainer::new(config.explain.parsed_weights()?);
        Ok(Self {
            config,
            distribution,
            classifier,
            explainer,
        })
    }

    /// Builds from an optional TOML file overlaid with `env`.
    ///
    /// Unknown keys in the file are logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Propagates loading and validation failures.
    pub fn load<S>(
        config_file: Option<&Path>,
        env: &HashMap<String, String, S>,
    ) -> AnalysisResult<Self>
    where
        S: BuildHasher,
    {
        let loaded = config::load_from_sources(config_file, env)?;
        Self::from_load_result(loaded)
    }

    /// Builds from an already loaded configuration, logging its warnings.
    ///
    /// # Errors
    ///
    /// Same as [`Analyzer::from_config`].
    pub fn from_load_result(loaded: ConfigLoadResult) -> AnalysisResult<Self> {
        for warning in &loaded.warnings {
            warn!(
                target: "rankscope.config",
                reason_code = %warning.reason_code,
                field = %warning.field,
                "{}",
                warning.message
            );
        }
        debug!(
            target: "rankscope.config",
            file = ?loaded.config_file_used,
            env_keys = ?loaded.env_keys_used,
            "analyzer configured"
        );
        Self::from_config(loaded.config)
    }

    #[must_use]
    pub const fn config(&self) -> &RankscopeConfig {
        &self.config
    }

    #[must_use]
    pub const fn classifier(&self) -> &RelevanceClassifier {
        &self.classifier
    }

    /// Distribution of every finite score in `set`.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::EmptyInput` when no finite score exists.
    pub fn analyze(&self, set: &ScoreSet) -> AnalysisResult<DistributionSummary> {
        self.distribution.analyze_set(set)
    }

    /// Distribution of a bare score slice.
    ///
    /// # Errors
    ///
    /// Same as [`Analyzer::analyze`].
    pub fn analyze_scores(&self, scores: &[f64]) -> AnalysisResult<DistributionSummary> {
        self.distribution.analyze(scores)
    }

    /// # Errors
    ///
    /// Returns `AnalysisError::EmptyInput` when `set` has no finite score.
    pub fn aggregate(&self, set: &ScoreSet) -> AnalysisResult<CategoryBreakdown> {
        CategoryAggregator::new(self.distribution.clone()).aggregate(set)
    }

    /// An empty `categories` list keeps every category.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::EmptyInput` when nothing matches `categories`.
    pub fn aggregate_filtered(
        &self,
        set: &ScoreSet,
        categories: &[&str],
    ) -> AnalysisResult<CategoryBreakdown> {
        CategoryAggregator::new(self.distribution.clone()).aggregate_filtered(set, categories)
    }

    /// A copy of `set` with every document's tier filled in.
    #[must_use]
    pub fn classify_set(&self, set: &ScoreSet) -> ScoreSet {
        self.classifier.classify_set(set)
    }

    #[must_use]
    pub fn tier_counts(&self, set: &ScoreSet) -> BTreeMap<RelevanceTier, usize> {
        self.classifier.tier_counts(set)
    }

    #[must_use]
    pub fn report(&self, query: &str, set: &ScoreSet) -> ScoreReport {
        ScoreReporter::new(self.distribution.clone(), self.classifier).report(query, set)
    }

    #[must_use]
    pub fn compare(
        &self,
        query: &str,
        baseline: &Strategy,
        variant: &Strategy,
    ) -> ComparisonResult {
        StrategyComparator::new(self.distribution.clone()).compare(query, baseline, variant)
    }

    #[must_use]
    pub fn compare_sets(
        &self,
        query: &str,
        baseline: &ScoreSet,
        variant: &ScoreSet,
    ) -> ComparisonResult {
        StrategyComparator::new(self.distribution.clone()).compare_sets(query, baseline, variant)
    }

    /// Approximate breakdowns for every document, terms taken from `query`.
    ///
    /// `average_length` is the corpus-wide mean document length.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InsufficientStatistics` when `average_length`
    /// is missing or unusable.
    pub fn explain(
        &self,
        query: &str,
        set: &ScoreSet,
        average_length: Option<f64>,
    ) -> AnalysisResult<Vec<ScoreExplanation>> {
        self.explainer.explain_query(set, query, average_length)
    }
}
