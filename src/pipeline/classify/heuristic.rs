//! Keyword-bucket classification.
//!
//! Buckets are ordered most-specific first; the first bucket with any
//! keyword hit wins with that bucket's fixed confidence. Matching is
//! plain substring containment over the lowercased text, as the bucket
//! keywords are distinctive enough in practice.

use super::{ClassificationResult, LabelScore};

const BUCKETS: [(&str, f32, &[&str]); 6] = [
    (
        "recipe",
        0.9,
        &[
            "ingredients",
            "recipe",
            "cooking",
            "bake",
            "cook",
            "servings",
            "prep time",
            "directions",
            "method",
        ],
    ),
    (
        "invoice",
        0.8,
        &["invoice", "bill", "total", "amount due", "payment"],
    ),
    (
        "receipt",
        0.8,
        &["receipt", "purchase", "transaction", "paid"],
    ),
    (
        "contract",
        0.8,
        &["contract", "agreement", "terms", "party", "whereas"],
    ),
    (
        "id_document",
        0.7,
        &["license", "passport", "identification", "id card"],
    ),
    (
        "report",
        0.7,
        &["report", "analysis", "findings", "conclusion", "summary"],
    ),
];

pub fn classify(text: &str) -> ClassificationResult {
    let lower = text.to_lowercase();
    for (doc_type, confidence, keywords) in BUCKETS {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return result(doc_type, confidence);
        }
    }
    result("document", 0.6)
}

fn result(doc_type: &str, confidence: f32) -> ClassificationResult {
    ClassificationResult {
        doc_type: doc_type.to_string(),
        confidence,
        top_labels: vec![LabelScore {
            label: doc_type.to_string(),
            probability: confidence,
        }],
    }
}
