//! Trained classification: multinomial naive Bayes over a fixed label
//! set, persisted as a JSON artifact.
//!
//! The model is fit once against a small labeled seed corpus when no
//! artifact exists, then saved and reused. Text is normalized before
//! tokenization: lowercased, punctuation stripped except currency signs
//! and date separators.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ClassificationResult, ClassifierError, LabelScore};

/// Laplace smoothing for unseen words.
const SMOOTHING: f32 = 1.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaiveBayesModel {
    labels: Vec<String>,
    vocabulary: BTreeMap<String, usize>,
    log_priors: Vec<f32>,
    /// Per label, per vocabulary index: log P(word | label).
    log_likelihoods: Vec<Vec<f32>>,
}

impl NaiveBayesModel {
    pub fn fit(examples: &[(&str, &str)]) -> Self {
        let mut labels: Vec<String> = examples.iter().map(|(l, _)| l.to_string()).collect();
        labels.sort();
        labels.dedup();

        let mut vocabulary = BTreeMap::new();
        for (_, text) in examples {
            for word in tokenize(text) {
                let next = vocabulary.len();
                vocabulary.entry(word).or_insert(next);
            }
        }

        let vocab_size = vocabulary.len();
        let mut counts = vec![vec![0f32; vocab_size]; labels.len()];
        let mut doc_counts = vec![0f32; labels.len()];

        for (label, text) in examples {
            let li = labels.iter().position(|l| l == label).unwrap_or(0);
            doc_counts[li] += 1.0;
            for word in tokenize(text) {
                if let Some(&wi) = vocabulary.get(&word) {
                    counts[li][wi] += 1.0;
                }
            }
        }

        let total_docs: f32 = doc_counts.iter().sum();
        let log_priors = doc_counts
            .iter()
            .map(|c| (c / total_docs).ln())
            .collect();
        let log_likelihoods = counts
            .iter()
            .map(|label_counts| {
                let total: f32 =
                    label_counts.iter().sum::<f32>() + SMOOTHING * vocab_size as f32;
                label_counts
                    .iter()
                    .map(|c| ((c + SMOOTHING) / total).ln())
                    .collect()
            })
            .collect();

        Self {
            labels,
            vocabulary,
            log_priors,
            log_likelihoods,
        }
    }

    /// Labels with normalized probabilities, best first.
    pub fn predict(&self, text: &str) -> Vec<LabelScore> {
        let words: Vec<String> = tokenize(text).collect();
        let log_scores: Vec<f32> = self
            .labels
            .iter()
            .enumerate()
            .map(|(li, _)| {
                let mut score = self.log_priors[li];
                for word in &words {
                    if let Some(&wi) = self.vocabulary.get(word) {
                        score += self.log_likelihoods[li][wi];
                    }
                }
                score
            })
            .collect();

        // Normalize in probability space relative to the best score.
        let max = log_scores.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let exps: Vec<f32> = log_scores.iter().map(|s| (s - max).exp()).collect();
        let sum: f32 = exps.iter().sum();

        let mut scored: Vec<LabelScore> = self
            .labels
            .iter()
            .zip(&exps)
            .map(|(label, e)| LabelScore {
                label: label.clone(),
                probability: e / sum,
            })
            .collect();
        scored.sort_by(|a, b| {
            b.probability
                .partial_cmp(&a.probability)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored
    }

    pub fn save(&self, path: &Path) -> Result<(), ClassifierError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        Ok(serde_json::from_slice(&fs::read(path)?)?)
    }
}

pub struct TrainedClassifier {
    model: NaiveBayesModel,
}

impl TrainedClassifier {
    /// Load the artifact at `path`, or fit the seed corpus and persist it.
    pub fn init(path: &Path) -> Result<Self, ClassifierError> {
        let model = if path.exists() {
            tracing::info!(path = %path.display(), "Loading classifier artifact");
            NaiveBayesModel::load(path)?
        } else {
            tracing::info!(path = %path.display(), "Fitting classifier against seed corpus");
            let model = NaiveBayesModel::fit(&seed_corpus());
            model.save(path)?;
            model
        };
        Ok(Self { model })
    }

    pub fn classify(&self, text: &str) -> ClassificationResult {
        let mut scored = self.model.predict(text);
        scored.truncate(3);
        let top = scored.first().cloned().unwrap_or(LabelScore {
            label: "document".to_string(),
            probability: 0.0,
        });
        ClassificationResult {
            doc_type: top.label,
            confidence: top.probability,
            top_labels: scored,
        }
    }
}

/// Lowercase and strip punctuation except currency and date separators.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '$' | '%' | '/' | '-' | '.') {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect::<Vec<_>>()
        .into_iter()
}

/// Small labeled corpus used to bootstrap the model on first run.
fn seed_corpus() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "invoice",
            "invoice number total amount due payment terms net 30 bill to vendor \
             subtotal tax remit payment by due date",
        ),
        (
            "invoice",
            "invoice date billing address itemized charges unit price quantity \
             amount due grand total payable",
        ),
        (
            "receipt",
            "receipt thank you for your purchase transaction approved card paid \
             total change due cashier store",
        ),
        (
            "receipt",
            "sales receipt items purchased subtotal tax total paid visa \
             transaction id store location",
        ),
        (
            "recipe",
            "recipe ingredients servings prep time cook time directions preheat \
             oven bake mix stir cup tablespoon",
        ),
        (
            "recipe",
            "ingredients flour sugar butter eggs method combine whisk bake until \
             golden servings prep time minutes",
        ),
        (
            "contract",
            "agreement between parties whereas terms and conditions obligations \
             governing law effective date signature witness",
        ),
        (
            "contract",
            "this contract outlines the terms the party of the first part agrees \
             herein liability termination clause",
        ),
        (
            "report",
            "quarterly report executive summary analysis findings conclusion \
             recommendations data methodology results",
        ),
        (
            "report",
            "annual report overview key findings performance analysis outlook \
             conclusion appendix figures",
        ),
        (
            "id_document",
            "driver license identification card date of birth expiration issued \
             state id number photo holder",
        ),
        (
            "id_document",
            "passport nationality date of birth place of issue expiry document \
             number surname given names",
        ),
        (
            "document",
            "general correspondence letter regarding information enclosed please \
             find attached sincerely",
        ),
        (
            "document",
            "memo to all staff subject update notice effective immediately please \
             review the following",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_predicts_seed_labels() {
        let model = NaiveBayesModel::fit(&seed_corpus());
        let top = &model.predict("invoice total amount due payment")[0];
        assert_eq!(top.label, "invoice");
        assert!(top.probability > 0.5);
    }

    #[test]
    fn probabilities_sum_to_one() {
        let model = NaiveBayesModel::fit(&seed_corpus());
        let sum: f32 = model
            .predict("quarterly findings and analysis")
            .iter()
            .map(|s| s.probability)
            .sum();
        assert!((sum - 1.0).abs() < 1e-4);
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        let model = NaiveBayesModel::fit(&seed_corpus());
        model.save(&path).unwrap();
        let loaded = NaiveBayesModel::load(&path).unwrap();

        let text = "receipt purchase transaction paid total";
        assert_eq!(model.predict(text)[0].label, loaded.predict(text)[0].label);
    }

    #[test]
    fn init_fits_once_then_reuses_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        assert!(!path.exists());
        let first = TrainedClassifier::init(&path).unwrap();
        assert!(path.exists());
        let second = TrainedClassifier::init(&path).unwrap();

        let text = "agreement between parties terms and conditions";
        assert_eq!(
            first.classify(text).doc_type,
            second.classify(text).doc_type
        );
    }

    #[test]
    fn classify_reports_top_three() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = TrainedClassifier::init(&dir.path().join("m.json")).unwrap();
        let result = classifier.classify("passport number and date of birth");

        assert_eq!(result.doc_type, "id_document");
        assert_eq!(result.top_labels.len(), 3);
        assert!(result.top_labels[0].probability >= result.top_labels[1].probability);
    }

    #[test]
    fn load_rejects_corrupt_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, b"not json").unwrap();

        assert!(matches!(
            NaiveBayesModel::load(&path),
            Err(ClassifierError::Artifact(_))
        ));
    }
}
