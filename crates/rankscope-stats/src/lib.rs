//! Score distribution statistics for rankscope.
//!
//! - [`DistributionAnalyzer`]: mean, median, population standard deviation,
//!   interpolated percentiles and equal-width histograms.
//! - [`RelevanceClassifier`]: score → [`RelevanceTier`](rankscope_core::RelevanceTier).
//! - [`CategoryAggregator`]: per-category breakdowns in first-appearance order.
//! - [`ScoreReporter`]: all of the above for one query in a single call.

pub mod category;
pub mod distribution;
pub mod relevance;
pub mod report;

pub use category::CategoryAggregator;
pub use distribution::{histogram, percentile, DistributionAnalyzer};
pub use relevance::RelevanceClassifier;
pub use report::ScoreReporter;
