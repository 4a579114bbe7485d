//! Key-Value Extraction Engine.
//!
//! Three ordered passes over the extracted text and token geometry:
//! 1. Named field patterns (invoice number, totals, dates, vendor, ...).
//! 2. Spatial proximity over token bounding boxes: tokens are clustered
//!    into lines, then colon-delimited label/value substrings and
//!    key-like/value-like adjacent pairs are read off each line.
//! 3. Generic category patterns, namespaced by category.
//!
//! Later passes only fill keys the earlier passes left empty, so the
//! merge precedence is pattern > proximity > generic. Keys are
//! case-folded and whitespace-normalized before storage.

mod generic;
mod patterns;
mod proximity;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::pipeline::extraction::OcrToken;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyValueResult {
    pub pairs: BTreeMap<String, String>,
    pub pair_count: usize,
}

pub struct KeyValueEngine;

impl KeyValueEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, text: &str, tokens: &[OcrToken]) -> KeyValueResult {
        let mut pairs: BTreeMap<String, String> = BTreeMap::new();

        for (key, value) in patterns::extract(text) {
            pairs.entry(normalize_key(&key)).or_insert(value);
        }
        for (key, value) in proximity::extract(tokens) {
            pairs.entry(normalize_key(&key)).or_insert(value);
        }
        for (key, value) in generic::extract(text) {
            pairs.entry(normalize_key(&key)).or_insert(value);
        }

        tracing::debug!(pairs = pairs.len(), "Key-value extraction complete");
        let pair_count = pairs.len();
        KeyValueResult { pairs, pair_count }
    }
}

impl Default for KeyValueEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Case-fold, drop colons, and collapse whitespace runs to underscores.
fn normalize_key(key: &str) -> String {
    key.trim()
        .trim_end_matches(':')
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}
