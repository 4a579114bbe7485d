//! Question-Answering Cascade.
//!
//! A strict priority chain over the document text and the already
//! extracted key-value pairs. Each stage is gated by its own confidence
//! floor and the chain stops at the first stage that clears it:
//! extractive QA, structured-field lookup, category pattern extraction,
//! named-entity lookup, sentence overlap, keyword search. When nothing
//! clears, a fixed low-confidence "not found" answer is returned rather
//! than an error or an empty result.

mod categories;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use categories::QuestionCategory;

use crate::capabilities::{ExtractiveQa, NerBackend};
use crate::pipeline::keyvalue::KeyValueResult;

const EXTRACTIVE_FLOOR: f32 = 0.4;
const KV_CONFIDENCE: f32 = 0.9;
const PATTERN_CONFIDENCE: f32 = 0.8;
const ENTITY_CONFIDENCE: f32 = 0.6;
/// Minimum fraction of question words a sentence must contain.
const SENTENCE_FLOOR: f32 = 0.3;
const KEYWORD_CONFIDENCE: f32 = 0.4;
const NOT_FOUND_CONFIDENCE: f32 = 0.2;

/// Context window handed to the extractive model.
const CONTEXT_CHAR_LIMIT: usize = 2000;
/// Half-window around a pattern match used for question overlap scoring.
const MATCH_WINDOW: usize = 60;

const STOP_WORDS: [&str; 12] = [
    "what", "is", "the", "how", "when", "where", "who", "which", "a", "an", "of", "this",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStrategy {
    ExtractiveQa,
    KeyValue,
    Pattern,
    Entity,
    SentenceOverlap,
    KeywordSearch,
    NotFound,
}

impl AnswerStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerStrategy::ExtractiveQa => "extractive_qa",
            AnswerStrategy::KeyValue => "key_value",
            AnswerStrategy::Pattern => "pattern_matching",
            AnswerStrategy::Entity => "entity_lookup",
            AnswerStrategy::SentenceOverlap => "sentence_overlap",
            AnswerStrategy::KeywordSearch => "keyword_search",
            AnswerStrategy::NotFound => "not_found",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaResult {
    pub answer: String,
    pub confidence: f32,
    pub question_type: QuestionCategory,
    pub strategy: AnswerStrategy,
    pub sources: Vec<String>,
    pub question: String,
}

pub struct QaEngine {
    extractive: Option<Arc<dyn ExtractiveQa>>,
    ner: Option<Arc<dyn NerBackend>>,
}

impl QaEngine {
    pub fn new(
        extractive: Option<Arc<dyn ExtractiveQa>>,
        ner: Option<Arc<dyn NerBackend>>,
    ) -> Self {
        Self { extractive, ner }
    }

    pub fn answer(&self, question: &str, text: &str, kv: &KeyValueResult) -> QaResult {
        let question = question.trim();
        let category = QuestionCategory::classify(question);

        if text.trim().is_empty() {
            return QaResult {
                answer: "No document content available to answer questions.".to_string(),
                confidence: 0.0,
                question_type: category,
                strategy: AnswerStrategy::NotFound,
                sources: Vec::new(),
                question: question.to_string(),
            };
        }

        // A stage only runs when every earlier one failed to clear its
        // floor; backend stages below the winner are never invoked.
        let stage = self
            .extractive_stage(question, text, category)
            .or_else(|| kv_stage(category, kv))
            .or_else(|| pattern_stage(question, text, category))
            .or_else(|| self.entity_stage(text, category))
            .or_else(|| sentence_stage(question, text))
            .or_else(|| keyword_stage(question, text));
        if let Some(result) = stage {
            tracing::debug!(
                strategy = result.strategy.as_str(),
                confidence = result.confidence,
                "Question answered"
            );
            return finish(result, category, question);
        }

        finish(
            Stage {
                answer: format!(
                    "I couldn't find information about {} in this document.",
                    category.as_str()
                ),
                confidence: NOT_FOUND_CONFIDENCE,
                strategy: AnswerStrategy::NotFound,
                sources: Vec::new(),
            },
            category,
            question,
        )
    }

    fn extractive_stage(
        &self,
        question: &str,
        text: &str,
        _category: QuestionCategory,
    ) -> Option<Stage> {
        let model = self.extractive.as_deref().filter(|m| m.available())?;
        let context: String = text.chars().take(CONTEXT_CHAR_LIMIT).collect();
        match model.answer(question, &context) {
            Ok(answer) if answer.score >= EXTRACTIVE_FLOOR && !answer.text.trim().is_empty() => {
                Some(Stage {
                    answer: answer.text,
                    confidence: answer.score,
                    strategy: AnswerStrategy::ExtractiveQa,
                    sources: vec!["document_context".to_string()],
                })
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Extractive QA failed, falling through");
                None
            }
        }
    }

    fn entity_stage(&self, text: &str, category: QuestionCategory) -> Option<Stage> {
        let labels = category.entity_labels();
        if labels.is_empty() {
            return None;
        }
        let ner = self.ner.as_deref().filter(|n| n.available())?;
        let entities = match ner.entities(text) {
            Ok(entities) => entities,
            Err(e) => {
                tracing::warn!(error = %e, "NER lookup failed, falling through");
                return None;
            }
        };
        entities
            .into_iter()
            .find(|e| labels.contains(&e.label.as_str()))
            .map(|e| Stage {
                answer: category.format_answer(&e.text),
                confidence: ENTITY_CONFIDENCE,
                strategy: AnswerStrategy::Entity,
                sources: vec!["named_entities".to_string()],
            })
    }
}

struct Stage {
    answer: String,
    confidence: f32,
    strategy: AnswerStrategy,
    sources: Vec<String>,
}

fn finish(stage: Stage, category: QuestionCategory, question: &str) -> QaResult {
    QaResult {
        answer: stage.answer,
        confidence: stage.confidence,
        question_type: category,
        strategy: stage.strategy,
        sources: stage.sources,
        question: question.to_string(),
    }
}

/// Structured-field lookup: first key variant found in the extracted
/// pairs wins at near-certain confidence.
fn kv_stage(category: QuestionCategory, kv: &KeyValueResult) -> Option<Stage> {
    for variant in category.kv_keys() {
        if let Some((_, value)) = kv.pairs.iter().find(|(key, _)| key.contains(variant)) {
            return Some(Stage {
                answer: category.format_answer(value),
                confidence: KV_CONFIDENCE,
                strategy: AnswerStrategy::KeyValue,
                sources: vec!["key_value_pairs".to_string()],
            });
        }
    }
    None
}

/// Category regexes over the document. Among all matches the one whose
/// surrounding window shares the most words with the question wins,
/// rather than a naive first match.
fn pattern_stage(question: &str, text: &str, category: QuestionCategory) -> Option<Stage> {
    let question_words = content_words(question);
    let mut best: Option<(usize, String)> = None;

    for re in category.answer_patterns() {
        for caps in re.captures_iter(text) {
            let Some(m) = caps.get(1) else { continue };
            let window = context_window(text, m.start(), m.end());
            let overlap = content_words(&window)
                .iter()
                .filter(|w| question_words.contains(*w))
                .count();
            if best.as_ref().map_or(true, |(b, _)| overlap > *b) {
                best = Some((overlap, m.as_str().trim().to_string()));
            }
        }
    }

    best.map(|(_, raw)| Stage {
        answer: category.format_answer(&raw),
        confidence: PATTERN_CONFIDENCE,
        strategy: AnswerStrategy::Pattern,
        sources: vec!["pattern_matching".to_string()],
    })
}

/// Best sentence by fraction of question words contained, framed as an
/// excerpt.
fn sentence_stage(question: &str, text: &str) -> Option<Stage> {
    let question_words = content_words(question);
    if question_words.is_empty() {
        return None;
    }

    let mut best: Option<(f32, &str)> = None;
    for sentence in text.split('.').map(str::trim).filter(|s| !s.is_empty()) {
        let sentence_words = content_words(sentence);
        let hits = question_words
            .iter()
            .filter(|w| sentence_words.contains(*w))
            .count();
        let fraction = hits as f32 / question_words.len() as f32;
        if best.map_or(true, |(b, _)| fraction > b) {
            best = Some((fraction, sentence));
        }
    }

    let (fraction, sentence) = best?;
    if fraction < SENTENCE_FLOOR {
        return None;
    }
    Some(Stage {
        answer: format!("Based on the document: {sentence}"),
        confidence: (0.3 + fraction * 0.5).min(0.8),
        strategy: AnswerStrategy::SentenceOverlap,
        sources: vec!["sentence_overlap".to_string()],
    })
}

/// Last resort before giving up: any sentence sharing a single word with
/// the question, framed as loosely related information.
fn keyword_stage(question: &str, text: &str) -> Option<Stage> {
    let question_words = content_words(question);
    text.split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .find(|sentence| {
            let words = content_words(sentence);
            question_words.iter().any(|w| words.contains(w))
        })
        .map(|sentence| Stage {
            answer: format!("Related information: {sentence}"),
            confidence: KEYWORD_CONFIDENCE,
            strategy: AnswerStrategy::KeywordSearch,
            sources: vec!["keyword_search".to_string()],
        })
}

fn content_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

fn context_window(text: &str, start: usize, end: usize) -> String {
    let from = start.saturating_sub(MATCH_WINDOW);
    let to = (end + MATCH_WINDOW).min(text.len());
    // Clamp to char boundaries.
    let from = (0..=from).rev().find(|i| text.is_char_boundary(*i)).unwrap_or(0);
    let to = (to..=text.len())
        .find(|i| text.is_char_boundary(*i))
        .unwrap_or(text.len());
    text[from..to].to_string()
}

/// Starter questions for the document type, capped at six.
pub fn suggested_questions(doc_type: &str) -> Vec<String> {
    let mut suggestions: Vec<String> = [
        "What is the total amount?",
        "What is the date?",
        "Who is mentioned in this document?",
        "What is the reference number?",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let specific: &[&str] = match doc_type {
        "invoice" => &[
            "What is the invoice number?",
            "When is the payment due?",
            "What items were billed?",
        ],
        "receipt" => &[
            "What was purchased?",
            "Where was this transaction made?",
            "What is the transaction ID?",
        ],
        "contract" => &[
            "What are the terms?",
            "Who are the parties?",
            "When does this expire?",
        ],
        "id_document" => &[
            "What is the ID number?",
            "When was this issued?",
            "What is the address?",
        ],
        _ => &[],
    };
    suggestions.extend(specific.iter().map(|s| s.to_string()));
    suggestions.truncate(6);
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::mock::{MockExtractiveQa, MockNerBackend};
    use crate::pipeline::keyvalue::KeyValueEngine;

    fn engine() -> QaEngine {
        QaEngine::new(None, None)
    }

    fn kv_from(text: &str) -> KeyValueResult {
        KeyValueEngine::new().extract(text, &[])
    }

    const DOC: &str = "Invoice Number: INV-2024-001\nTotal: $450.00\n\
        Date: 03/15/2024\nPayment due within thirty days.";

    #[test]
    fn structured_field_hit_is_high_confidence() {
        let kv = kv_from(DOC);
        let result = engine().answer("What is the invoice number?", DOC, &kv);

        assert_eq!(result.strategy, AnswerStrategy::KeyValue);
        assert!(result.confidence >= 0.7);
        assert_eq!(result.answer, "The reference number is INV-2024-001");
    }

    #[test]
    fn extractive_answer_wins_when_confident() {
        let extractive = Arc::new(MockExtractiveQa {
            text: "thirty days".to_string(),
            score: 0.82,
        });
        let qa = QaEngine::new(Some(extractive), None);
        let result = qa.answer("When is payment due?", DOC, &kv_from(DOC));

        assert_eq!(result.strategy, AnswerStrategy::ExtractiveQa);
        assert_eq!(result.answer, "thirty days");
        assert!((result.confidence - 0.82).abs() < f32::EPSILON);
    }

    #[test]
    fn low_scoring_extractive_falls_through() {
        let extractive = Arc::new(MockExtractiveQa {
            text: "maybe".to_string(),
            score: 0.1,
        });
        let qa = QaEngine::new(Some(extractive), None);
        let result = qa.answer("What is the invoice number?", DOC, &kv_from(DOC));

        assert_eq!(result.strategy, AnswerStrategy::KeyValue);
    }

    #[test]
    fn pattern_match_prefers_question_context() {
        // Two dollar figures; the question mentions the shipping fee, so
        // the match inside that sentence should win over the first one.
        let text = "Repair labor price: $120.00 for the unit that came in last \
            week with a cracked housing and a worn drive gasket. \
            Shipping fee price: $35.00 was charged separately.";
        let result = engine().answer("What was the shipping fee?", text, &kv_from(""));

        assert_eq!(result.strategy, AnswerStrategy::Pattern);
        assert_eq!(result.answer, "The amount is $35.00");
    }

    #[test]
    fn later_backends_stay_idle_once_a_stage_clears() {
        let extractive = Arc::new(MockExtractiveQa {
            text: "Maria Gonzalez".to_string(),
            score: 0.95,
        });
        let ner = Arc::new(MockNerBackend::finding(&[("Maria Gonzalez", "PERSON")]));
        let qa = QaEngine::new(Some(extractive), Some(ner.clone()));
        let text = "Document prepared by Maria Gonzalez for review";
        let result = qa.answer("Who prepared this document?", text, &kv_from(""));

        assert_eq!(result.strategy, AnswerStrategy::ExtractiveQa);
        assert_eq!(ner.entity_calls(), 0);
    }

    #[test]
    fn entity_stage_answers_name_questions() {
        let ner = Arc::new(MockNerBackend::finding(&[("Maria Gonzalez", "PERSON")]));
        let qa = QaEngine::new(None, Some(ner));
        let text = "Document prepared by Maria Gonzalez for review";
        let result = qa.answer("Who is the person mentioned?", text, &kv_from(""));

        assert_eq!(result.strategy, AnswerStrategy::Entity);
        assert_eq!(result.answer, "The name is Maria Gonzalez");
        assert!((result.confidence - 0.6).abs() < f32::EPSILON);
    }

    #[test]
    fn sentence_overlap_as_fallback() {
        let text = "The warranty covers parts and labor. Returns accepted within \
            fourteen days of delivery.";
        let result = engine().answer("What does the warranty cover?", text, &kv_from(""));

        assert_eq!(result.strategy, AnswerStrategy::SentenceOverlap);
        assert!(result.answer.starts_with("Based on the document:"));
        assert!(result.answer.contains("warranty covers parts"));
    }

    #[test]
    fn not_found_is_fixed_low_confidence() {
        let result = engine().answer("What is the melting point?", "unrelated words entirely", &kv_from(""));

        assert_eq!(result.strategy, AnswerStrategy::NotFound);
        assert!((result.confidence - 0.2).abs() < f32::EPSILON);
        assert!(result.answer.contains("couldn't find"));
    }

    #[test]
    fn empty_document_is_not_an_error() {
        let result = engine().answer("What is the total?", "   ", &kv_from(""));
        assert_eq!(result.confidence, 0.0);
        assert!(result.answer.contains("No document content"));
    }

    #[test]
    fn question_is_echoed() {
        let result = engine().answer("  What is the date?  ", DOC, &kv_from(DOC));
        assert_eq!(result.question, "What is the date?");
    }

    #[test]
    fn suggested_questions_capped_at_six() {
        let suggestions = suggested_questions("invoice");
        assert_eq!(suggestions.len(), 6);
        assert!(suggestions.iter().any(|s| s.contains("invoice number")));
        assert_eq!(suggested_questions("report").len(), 4);
    }
}
