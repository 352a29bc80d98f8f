//! Per-document score explanations.
//!
//! A [`ScoreExplanation`] decomposes a result's total score into per-field and
//! per-term contributions. The decomposition is **approximate**: the scoring
//! engine's internal per-term arithmetic is not observable, so the numbers
//! here are illustrative BM25-style estimates built from term counts and
//! document length. They move in the same direction as the real score, but
//! they are not the real score and must never be compared to it for equality.
//!
//! # Example
//!
//! ```
//! use rankscope_core::explanation::*;
//!
//! let explanation = ScoreExplanation {
//!     doc_id: "doc-7".into(),
//!     rank: 0,
//!     total_score: -1.25,
//!     fields: vec![FieldContribution {
//!         field: "title".into(),
//!         score: 1.1,
//!         weight: 2.0,
//!         length: 4,
//!         terms: vec![],
//!     }],
//!     terms: vec![TermContribution {
//!         term: "rust".into(),
//!         tf: 2.0,
//!         idf: 2.8,
//!         contribution: 2.4,
//!     }],
//!     length: LengthNormalization {
//!         length: 120,
//!         average_length: 150.0,
//!         factor: 0.78,
//!     },
//!     illustrative_total: 1.1,
//!     fidelity: Fidelity::Approximate,
//! };
//!
//! assert_eq!(explanation.matched_terms(), vec!["rust"]);
//! assert!(explanation.fidelity.is_approximate());
//! ```

use serde::{Deserialize, Serialize};

/// How faithfully an explanation reflects the engine's real arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fidelity {
    /// Illustrative estimate; directionally consistent, numerically inexact.
    #[default]
    Approximate,
}

impl Fidelity {
    #[must_use]
    pub const fn is_approximate(self) -> bool {
        matches!(self, Self::Approximate)
    }
}

impl std::fmt::Display for Fidelity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approximate => write!(f, "approximate"),
        }
    }
}

/// One query term's estimated contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermContribution {
    pub term: String,
    /// Occurrences of the term in the document (or field).
    pub tf: f64,
    /// Inverse-document-frequency proxy. Not a corpus-derived IDF.
    pub idf: f64,
    /// Estimated share of the score.
    pub contribution: f64,
}

impl std::fmt::Display for TermContribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "\"{}\": tf={:.3} idf~{:.3} contrib~{:.4}",
            self.term, self.tf, self.idf, self.contribution
        )
    }
}

/// One field's weighted estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldContribution {
    pub field: String,
    /// Weighted estimate for this field.
    pub score: f64,
    pub weight: f64,
    /// Field length in words.
    pub length: usize,
    pub terms: Vec<TermContribution>,
}

impl std::fmt::Display for FieldContribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: score~{:.4} w={:.2} len={}",
            self.field, self.score, self.weight, self.length
        )
    }
}

/// Document length relative to the corpus average.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LengthNormalization {
    /// Document length in tokens.
    pub length: usize,
    /// Corpus average length in tokens.
    pub average_length: f64,
    /// `k1 * ((1 - b) + b * length / average_length)`.
    pub factor: f64,
}

/// Approximate breakdown of one document's score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreExplanation {
    pub doc_id: String,
    /// 0-based rank in the explained result list.
    pub rank: usize,
    /// The engine's real score, carried through unchanged.
    pub total_score: f64,
    pub fields: Vec<FieldContribution>,
    pub terms: Vec<TermContribution>,
    pub length: LengthNormalization,
    /// Sum of the field estimates. Not comparable to `total_score` in magnitude.
    pub illustrative_total: f64,
    pub fidelity: Fidelity,
}

impl ScoreExplanation {
    /// Query terms that occur at least once in the document.
    #[must_use]
    pub fn matched_terms(&self) -> Vec<&str> {
        self.terms
            .iter()
            .filter(|term| term.tf > 0.0)
            .map(|term| term.term.as_str())
            .collect()
    }

    /// Field estimate by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldContribution> {
        self.fields.iter().find(|field| field.field == name)
    }

    /// Sum of per-term contributions.
    #[must_use]
    pub fn term_total(&self) -> f64 {
        self.terms.iter().map(|term| term.contribution).sum()
    }
}

impl std::fmt::Display for ScoreExplanation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "#{} {} score={:.4} ({})",
            self.rank + 1,
            self.doc_id,
            self.total_score,
            self.fidelity
        )?;
        writeln!(
            f,
            "  length={} avg={:.1} norm={:.3}",
            self.length.length, self.length.average_length, self.length.factor
        )?;
        for field in &self.fields {
            writeln!(f, "  {field}")?;
        }
        for term in &self.terms {
            writeln!(f, "  {term}")?;
        }
        Ok(())
    }
}
