//! Approximate BM25-style score decomposition.
//!
//! The scoring engine only reports a total per document, so everything here
//! is an illustrative estimate built from visible text and the corpus average
//! length. Every explanation is stamped [`Fidelity::Approximate`].
//!
//! ```text
//! factor       = k1 * ((1 - b) + b * length / average_length)
//! idf(tf)      = max(3.0 - 0.1 * tf, 0.1)
//! term(tf)     = idf(tf) * tf * (k1 + 1) / (tf + factor)
//! field score  = weight * Σ_terms idf(tf) * field_tf * (k1 + 1) / (field_tf + factor)
//! ```
//!
//! with `k1 = 1.2`, `b = 0.75`. `tf` counts whole-word, case-insensitive
//! occurrences over title, body and category together; `field_tf` over one
//! field.

use rankscope_core::{
    usize_to_f64, AnalysisError, AnalysisResult, FieldContribution, FieldWeights, Fidelity,
    LengthNormalization, ScoreExplanation, ScoreSet, ScoredDocument, TermContribution,
};
use tracing::{debug, instrument};

use crate::terms::{count_term, query_terms, tokenize};

/// Term-frequency saturation.
pub const K1: f64 = 1.2;
/// Length-normalization strength.
pub const B: f64 = 0.75;

/// Explained fields, in output order. `content` is the document body.
pub const FIELDS: [&str; 3] = ["title", "content", "category"];

const IDF_CEILING: f64 = 3.0;
const IDF_STEP: f64 = 0.1;
const IDF_FLOOR: f64 = 0.1;

/// `k1 * ((1 - b) + b * length / average_length)`.
#[must_use]
pub fn length_factor(length: usize, average_length: f64) -> f64 {
    K1 * ((1.0 - B) + B * usize_to_f64(length) / average_length)
}

/// Frequency-damped stand-in for a corpus IDF.
#[must_use]
pub fn idf_proxy(tf: usize) -> f64 {
    IDF_STEP
        .mul_add(-usize_to_f64(tf), IDF_CEILING)
        .max(IDF_FLOOR)
}

fn saturated(idf: f64, tf: usize, factor: f64) -> f64 {
    if tf == 0 {
        return 0.0;
    }
    let tf = usize_to_f64(tf);
    idf * tf * (K1 + 1.0) / (tf + factor)
}

/// Produces [`ScoreExplanation`]s under one field-weighting scheme.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreExplainer {
    weights: FieldWeights,
}

impl ScoreExplainer {
    #[must_use]
    pub const fn new(weights: FieldWeights) -> Self {
        Self { weights }
    }

    #[must_use]
    pub const fn weights(&self) -> &FieldWeights {
        &self.weights
    }

    /// One explanation per document, in rank order.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InsufficientStatistics` when `average_length`
    /// is missing, non-finite or not positive.
    #[instrument(
        name = "rankscope::explain",
        skip(self, set, terms),
        fields(doc_count = set.len(), term_count = terms.len())
    )]
    pub fn explain(
        &self,
        set: &ScoreSet,
        terms: &[String],
        average_length: Option<f64>,
    ) -> AnalysisResult<Vec<ScoreExplanation>> {
        let average_length = check_average_length(average_length)?;
        let explanations: Vec<ScoreExplanation> = set
            .iter()
            .enumerate()
            .map(|(rank, doc)| self.explain_document(doc, rank, terms, average_length))
            .collect();

        debug!(
            target: "rankscope.explain",
            explained = explanations.len(),
            uniform_weights = self.weights.is_uniform(),
            "explanations built"
        );
        Ok(explanations)
    }

    /// [`ScoreExplainer::explain`] with terms taken from a raw query string.
    ///
    /// # Errors
    ///
    /// Same as [`ScoreExplainer::explain`].
    pub fn explain_query(
        &self,
        set: &ScoreSet,
        query: &str,
        average_length: Option<f64>,
    ) -> AnalysisResult<Vec<ScoreExplanation>> {
        self.explain(set, &query_terms(query), average_length)
    }

    fn explain_document(
        &self,
        doc: &ScoredDocument,
        rank: usize,
        terms: &[String],
        average_length: f64,
    ) -> ScoreExplanation {
        let factor = length_factor(doc.length, average_length);

        let field_words: [(&str, Vec<String>); 3] = [
            (FIELDS[0], tokenize(&doc.title)),
            (FIELDS[1], tokenize(&doc.body)),
            (FIELDS[2], tokenize(&doc.category)),
        ];

        let document_tf: Vec<usize> = terms
            .iter()
            .map(|term| {
                field_words
                    .iter()
                    .map(|(_, words)| count_term(words, term))
                    .sum::<usize>()
            })
            .collect();

        let term_contributions: Vec<TermContribution> = terms
            .iter()
            .zip(&document_tf)
            .map(|(term, &tf)| {
                let idf = idf_proxy(tf);
                TermContribution {
                    term: term.clone(),
                    tf: usize_to_f64(tf),
                    idf,
                    contribution: saturated(idf, tf, factor),
                }
            })
            .collect();

        let fields: Vec<FieldContribution> = field_words
            .iter()
            .map(|(field, words)| {
                let weight = self.weights.weight(field);
                let per_term: Vec<TermContribution> = terms
                    .iter()
                    .zip(&document_tf)
                    .map(|(term, &tf)| {
                        let idf = idf_proxy(tf);
                        let field_tf = count_term(words, term);
                        TermContribution {
                            term: term.clone(),
                            tf: usize_to_f64(field_tf),
                            idf,
                            contribution: weight * saturated(idf, field_tf, factor),
                        }
                    })
                    .collect();
                FieldContribution {
                    field: (*field).to_owned(),
                    score: per_term.iter().map(|t| t.contribution).sum(),
                    weight,
                    length: words.len(),
                    terms: per_term,
                }
            })
            .collect();

        let illustrative_total: f64 = fields.iter().map(|f| f.score).sum();

        ScoreExplanation {
            doc_id: doc.doc_id.clone(),
            rank,
            total_score: doc.score,
            fields,
            terms: term_contributions,
            length: LengthNormalization {
                length: doc.length,
                average_length,
                factor,
            },
            illustrative_total,
            fidelity: Fidelity::Approximate,
        }
    }
}

fn check_average_length(average_length: Option<f64>) -> AnalysisResult<f64> {
    match average_length {
        None => Err(AnalysisError::InsufficientStatistics {
            statistic: "average_document_length",
            reason: "not provided".into(),
        }),
        Some(avg) if !avg.is_finite() || avg <= 0.0 => {
            Err(AnalysisError::InsufficientStatistics {
                statistic: "average_document_length",
                reason: format!("{avg} is not a positive finite length"),
            })
        }
        Some(avg) => Ok(avg),
    }
}
