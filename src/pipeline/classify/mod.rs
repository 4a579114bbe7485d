//! Document Classifier.
//!
//! Two interchangeable modes behind one `classify` call: a keyword
//! heuristic with fixed per-bucket confidences, and a trained naive
//! Bayes model persisted as a JSON artifact and fit once against a seed
//! corpus when no artifact exists. A narrative overview generator sits
//! alongside, backed by an optional abstractive summarizer with a
//! deterministic rule-based fallback.

mod heuristic;
mod overview;
mod trained;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use overview::generate_overview;
pub use trained::{NaiveBayesModel, TrainedClassifier};

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("failed to read classifier artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("classifier artifact is corrupt: {0}")]
    Artifact(#[from] serde_json::Error),
}

/// One label with its predicted probability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub probability: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub doc_type: String,
    pub confidence: f32,
    /// Top-3 label/probability pairs, trained mode only.
    pub top_labels: Vec<LabelScore>,
}

enum Mode {
    Heuristic,
    Trained(TrainedClassifier),
}

pub struct DocumentClassifier {
    mode: Mode,
}

impl DocumentClassifier {
    pub fn heuristic() -> Self {
        Self {
            mode: Mode::Heuristic,
        }
    }

    /// Load the persisted model at `artifact`, or fit the seed corpus and
    /// persist it there first.
    pub fn trained(artifact: &Path) -> Result<Self, ClassifierError> {
        Ok(Self {
            mode: Mode::Trained(TrainedClassifier::init(artifact)?),
        })
    }

    pub fn classify(&self, text: &str) -> ClassificationResult {
        if text.trim().len() < 10 {
            return ClassificationResult {
                doc_type: "unknown".to_string(),
                confidence: 0.3,
                top_labels: Vec::new(),
            };
        }
        let result = match &self.mode {
            Mode::Heuristic => heuristic::classify(text),
            Mode::Trained(model) => model.classify(text),
        };
        tracing::debug!(
            doc_type = result.doc_type.as_str(),
            confidence = result.confidence,
            "Document classified"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_unknown() {
        let classifier = DocumentClassifier::heuristic();
        let result = classifier.classify("  hi  ");
        assert_eq!(result.doc_type, "unknown");
        assert!((result.confidence - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn classification_is_deterministic() {
        let classifier = DocumentClassifier::heuristic();
        let text = "Invoice for services rendered, amount due on receipt of this bill";
        let a = classifier.classify(text);
        let b = classifier.classify(text);
        assert_eq!(a.doc_type, b.doc_type);
        assert_eq!(a.confidence, b.confidence);
    }
}
