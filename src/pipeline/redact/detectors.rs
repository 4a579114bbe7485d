//! Span detectors for sensitive data.
//!
//! Each detector scans the text it is handed and reports half-open byte
//! ranges with the original content. Patterns within one detector run in
//! order; a later pattern's match that overlaps an earlier one is
//! dropped.

use std::sync::LazyLock;

use regex::Regex;

use crate::capabilities::NerBackend;

pub type Span = (usize, usize, String);

static EMAIL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap()]
});

static PHONE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap(),
        Regex::new(r"\+\d{1,3}[-.\s]?\d{3,4}[-.\s]?\d{3,4}[-.\s]?\d{3,4}").unwrap(),
    ]
});

/// SSN-shaped identifiers: grouped or a bare nine-digit run.
static GOVERNMENT_ID_PATTERNS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| vec![Regex::new(r"\b\d{3}-\d{2}-\d{4}\b|\b\d{9}\b").unwrap()]);

static PAYMENT_CARD_PATTERNS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| vec![Regex::new(r"\b(?:\d{4}[-\s]?){3}\d{4}\b").unwrap()]);

/// Dates whose year falls in the 1900-2099 range, either endian.
static DOB_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\b(?:19|20)\d{2}[-/]\d{1,2}[-/]\d{1,2}\b").unwrap(),
        Regex::new(r"\b\d{1,2}[-/]\d{1,2}[-/](?:19|20)\d{2}\b").unwrap(),
    ]
});

/// Street addresses and ZIP codes.
static ADDRESS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\d+\s+\w+\s+(?:Street|St|Avenue|Ave|Road|Rd|Drive|Dr|Lane|Ln|Boulevard|Blvd|Court|Ct|Place|Pl)\.?\s*,?\s*\w*").unwrap(),
        Regex::new(r"\b\d{5}(?:-\d{4})?\b").unwrap(),
    ]
});

fn regex_spans(text: &str, patterns: &[Regex]) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    for re in patterns {
        for m in re.find_iter(text) {
            let overlaps = spans
                .iter()
                .any(|(s, e, _)| m.start() < *e && *s < m.end());
            if !overlaps {
                spans.push((m.start(), m.end(), m.as_str().to_string()));
            }
        }
    }
    spans
}

pub fn emails(text: &str) -> Vec<Span> {
    regex_spans(text, &EMAIL_PATTERNS)
}

pub fn phones(text: &str) -> Vec<Span> {
    regex_spans(text, &PHONE_PATTERNS)
}

pub fn government_ids(text: &str) -> Vec<Span> {
    regex_spans(text, &GOVERNMENT_ID_PATTERNS)
}

pub fn payment_cards(text: &str) -> Vec<Span> {
    regex_spans(text, &PAYMENT_CARD_PATTERNS)
}

pub fn dates_of_birth(text: &str) -> Vec<Span> {
    regex_spans(text, &DOB_PATTERNS)
}

pub fn addresses(text: &str) -> Vec<Span> {
    regex_spans(text, &ADDRESS_PATTERNS)
}

/// Person names via NER when a backend is present, otherwise a
/// capitalized-multi-word pattern with a false-positive exclusion list.
pub fn person_names(text: &str, ner: Option<&dyn NerBackend>) -> Vec<Span> {
    if let Some(ner) = ner.filter(|n| n.available()) {
        match ner.entities(text) {
            Ok(entities) => {
                return entities
                    .into_iter()
                    .filter(|e| e.label == "PERSON")
                    .map(|e| (e.start, e.end, e.text))
                    .collect();
            }
            Err(e) => {
                tracing::warn!(error = %e, "NER failed, using name pattern fallback");
            }
        }
    }
    pattern_names(text)
}

const NAME_EXCLUSIONS: [&str; 8] = [
    "United States",
    "New York",
    "Los Angeles",
    "Dear Sir",
    "Dear Madam",
    "Thank You",
    "Best Regards",
    "Invoice Number",
];

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)+\b").unwrap());

fn pattern_names(text: &str) -> Vec<Span> {
    NAME_PATTERN
        .find_iter(text)
        .filter(|m| !NAME_EXCLUSIONS.contains(&m.as_str()))
        .map(|m| (m.start(), m.end(), m.as_str().to_string()))
        .collect()
}
