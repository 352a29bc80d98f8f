use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{AnalysisError, AnalysisResult};

// ---------------------------------------------------------------------------
// Document types
// ---------------------------------------------------------------------------

/// One scored hit produced by the query collaborator.
///
/// Scores follow the higher-is-better convention (SQLite FTS5 `bm25()` output
/// negated into "less negative is better"). The document is a read-only
/// snapshot: builder methods consume `self` and return a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    /// Opaque unique document identifier.
    pub doc_id: String,
    /// Document title.
    pub title: String,
    /// Main body text.
    pub body: String,
    /// Category label. An empty label is a valid group of its own.
    #[serde(default)]
    pub category: String,
    /// Document length in tokens, as recorded at indexing time.
    pub length: usize,
    /// Relevance score, higher is better.
    pub score: f64,
    /// Highlighted excerpt, if the query collaborator produced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// Coarse relevance tier, if already classified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance: Option<RelevanceTier>,
}

impl ScoredDocument {
    /// Creates a document with the required identifier and score.
    #[must_use]
    pub fn new(doc_id: impl Into<String>, score: f64) -> Self {
        Self {
            doc_id: doc_id.into(),
            title: String::new(),
            body: String::new(),
            category: String::new(),
            length: 0,
            score,
            snippet: None,
            relevance: None,
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the body text.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the category label.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the token length.
    #[must_use]
    pub const fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    /// Sets the snippet.
    #[must_use]
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    /// Sets the relevance tier.
    #[must_use]
    pub const fn with_relevance(mut self, tier: RelevanceTier) -> Self {
        self.relevance = Some(tier);
        self
    }

    /// Ordering by score descending with NaN-safe semantics.
    /// NaN sorts below all real values (treated as worst possible score).
    #[must_use]
    pub fn cmp_by_score(&self, other: &Self) -> std::cmp::Ordering {
        let a = if self.score.is_nan() {
            f64::NEG_INFINITY
        } else {
            self.score
        };
        let b = if other.score.is_nan() {
            f64::NEG_INFINITY
        } else {
            other.score
        };
        b.total_cmp(&a)
    }
}

/// Ordered result list for one query/strategy run. Position is rank, best first.
///
/// The set never re-sorts itself: engine order (including its tie-breaking)
/// is preserved unless [`ScoreSet::sorted_by_score`] is called explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreSet {
    documents: Vec<ScoredDocument>,
}

impl ScoreSet {
    /// Wraps documents already in rank order.
    #[must_use]
    pub const fn new(documents: Vec<ScoredDocument>) -> Self {
        Self { documents }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents in rank order.
    #[must_use]
    pub fn documents(&self) -> &[ScoredDocument] {
        &self.documents
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredDocument> {
        self.documents.iter()
    }

    /// Document at the 0-based rank, if present.
    #[must_use]
    pub fn get(&self, rank: usize) -> Option<&ScoredDocument> {
        self.documents.get(rank)
    }

    /// Scores in rank order.
    #[must_use]
    pub fn scores(&self) -> Vec<f64> {
        self.documents.iter().map(|doc| doc.score).collect()
    }

    /// Mean token length, or `None` for an empty set.
    ///
    /// Only a valid corpus statistic when this set *is* the corpus.
    #[must_use]
    pub fn average_length(&self) -> Option<f64> {
        if self.documents.is_empty() {
            return None;
        }
        let total: f64 = self
            .documents
            .iter()
            .map(|doc| usize_to_f64(doc.length))
            .sum();
        Some(total / usize_to_f64(self.documents.len()))
    }

    /// Whether ranks are consistent with non-increasing score order.
    #[must_use]
    pub fn is_rank_consistent(&self) -> bool {
        self.documents
            .windows(2)
            .all(|pair| pair[0].cmp_by_score(&pair[1]) != std::cmp::Ordering::Greater)
    }

    /// A copy re-sorted by score descending. The sort is stable, so ties keep
    /// engine order; NaN scores go last.
    #[must_use]
    pub fn sorted_by_score(&self) -> Self {
        let mut documents = self.documents.clone();
        documents.sort_by(ScoredDocument::cmp_by_score);
        Self { documents }
    }
}

impl FromIterator<ScoredDocument> for ScoreSet {
    fn from_iter<I: IntoIterator<Item = ScoredDocument>>(iter: I) -> Self {
        Self {
            documents: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<ScoredDocument>> for ScoreSet {
    fn from(documents: Vec<ScoredDocument>) -> Self {
        Self { documents }
    }
}

impl<'a> IntoIterator for &'a ScoreSet {
    type Item = &'a ScoredDocument;
    type IntoIter = std::slice::Iter<'a, ScoredDocument>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}

// ---------------------------------------------------------------------------
// Relevance tiers
// ---------------------------------------------------------------------------

/// Coarse qualitative label derived from a score, ordered best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelevanceTier {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl RelevanceTier {
    /// All tiers, best first.
    pub const ALL: [Self; 4] = [Self::Excellent, Self::Good, Self::Fair, Self::Poor];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }
}

impl std::fmt::Display for RelevanceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Field weights
// ---------------------------------------------------------------------------

/// Weight applied when a field is not listed.
pub const DEFAULT_FIELD_WEIGHT: f64 = 1.0;

/// Per-field weighting scheme, e.g. `title:2.0,content:1.0`.
///
/// Fields that are not listed weigh [`DEFAULT_FIELD_WEIGHT`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldWeights {
    weights: BTreeMap<String, f64>,
}

impl FieldWeights {
    /// Uniform weighting (every field 1.0).
    #[must_use]
    pub fn uniform() -> Self {
        Self::default()
    }

    /// Sets the weight for one field.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidConfig` for negative or non-finite weights.
    pub fn with_weight(mut self, field: impl Into<String>, weight: f64) -> AnalysisResult<Self> {
        let field = field.into();
        validate_weight(&field, weight)?;
        self.weights.insert(field, weight);
        Ok(self)
    }

    /// Weight for `field`, falling back to [`DEFAULT_FIELD_WEIGHT`].
    #[must_use]
    pub fn weight(&self, field: &str) -> f64 {
        self.weights
            .get(field)
            .copied()
            .unwrap_or(DEFAULT_FIELD_WEIGHT)
    }

    /// Whether no explicit weights were set.
    #[must_use]
    pub fn is_uniform(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(field, weight)| (field.as_str(), *weight))
    }
}

impl FromStr for FieldWeights {
    type Err = AnalysisError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut weights = BTreeMap::new();
        for pair in value.split(',').map(str::trim).filter(|pair| !pair.is_empty()) {
            let Some((field, raw_weight)) = pair.split_once(':') else {
                return Err(AnalysisError::InvalidConfig {
                    field: "field_weights".into(),
                    value: pair.into(),
                    reason: "expected field:weight".into(),
                });
            };
            let field = field.trim();
            if field.is_empty() {
                return Err(AnalysisError::InvalidConfig {
                    field: "field_weights".into(),
                    value: pair.into(),
                    reason: "field name must not be empty".into(),
                });
            }
            let weight =
                raw_weight
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| AnalysisError::InvalidConfig {
                        field: format!("field_weights.{field}"),
                        value: raw_weight.trim().into(),
                        reason: "expected a number".into(),
                    })?;
            validate_weight(field, weight)?;
            weights.insert(field.to_owned(), weight);
        }
        Ok(Self { weights })
    }
}

impl std::fmt::Display for FieldWeights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, weight) in &self.weights {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{field}:{weight}")?;
            first = false;
        }
        Ok(())
    }
}

fn validate_weight(field: &str, weight: f64) -> AnalysisResult<()> {
    if weight.is_finite() && weight >= 0.0 {
        return Ok(());
    }
    Err(AnalysisError::InvalidConfig {
        field: format!("field_weights.{field}"),
        value: weight.to_string(),
        reason: "must be a finite, non-negative number".into(),
    })
}

/// Lossless for counts below 2^32, saturating above.
#[inline]
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    u32::try_from(value).map_or_else(|_| f64::from(u32::MAX), f64::from)
}
