//! Narrative overview generation.
//!
//! Builds a type-specific prompt from cleaned, length-bounded text and
//! asks the summarization capability for a short abstract, then dresses
//! the reply with a type prefix, regex-extracted headline metrics, and a
//! word-count footer. When summarization is unavailable or fails, a
//! deterministic rule-based overview is built from the first qualifying
//! line instead.

use std::sync::LazyLock;

use regex::Regex;

use crate::capabilities::Summarizer;

static SERVINGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"serv(?:ing|es)?s?\s*:?\s*(\d+)").unwrap());
static PREP_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:prep|cook|total)\s*time\s*:?\s*(\d+)\s*(?:min|hour)").unwrap());
static TOTAL_FIGURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"total\s*:?\s*\$?([0-9,]+\.?\d*)").unwrap());

/// Word cap fed to the summarization prompt.
const PROMPT_WORD_LIMIT: usize = 800;
const SUMMARY_MIN_WORDS: usize = 30;
const SUMMARY_MAX_WORDS: usize = 150;

pub fn generate_overview(
    text: &str,
    doc_type: &str,
    summarizer: Option<&dyn Summarizer>,
) -> String {
    if text.trim().len() < 20 {
        return "This document appears to be empty or could not be processed properly."
            .to_string();
    }

    if let Some(summarizer) = summarizer.filter(|s| s.available()) {
        if text.trim().len() > 100 {
            let prompt = build_prompt(text, doc_type);
            match summarizer.summarize(&prompt, SUMMARY_MIN_WORDS, SUMMARY_MAX_WORDS) {
                Ok(summary) => return format_summary(&summary, doc_type, text),
                Err(e) => {
                    tracing::warn!(error = %e, "Summarization failed, using rule-based overview")
                }
            }
        }
    }

    rule_based_overview(text, doc_type)
}

fn build_prompt(text: &str, doc_type: &str) -> String {
    let cleaned: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| l.len() > 3)
        .collect();
    let joined = cleaned.join(" ");
    let mut words: Vec<&str> = joined.split_whitespace().collect();
    let truncated = words.len() > PROMPT_WORD_LIMIT;
    words.truncate(PROMPT_WORD_LIMIT);
    let mut body = words.join(" ");
    if truncated {
        body.push_str("...");
    }

    let instruction = match doc_type {
        "recipe" => "Summarize this recipe including the dish name, main ingredients, and cooking method",
        "invoice" => "Summarize this invoice including the vendor, items, and total amount",
        "receipt" => "Summarize this receipt including the store, items purchased, and total",
        "contract" => "Summarize this contract including the parties, purpose, and key terms",
        "report" => "Summarize this report including the main findings and conclusions",
        "id_document" => "Summarize this identification document including the type and key information",
        _ => "Summarize the main content and purpose of this document",
    };
    format!("{instruction}: {body}")
}

fn type_prefix(doc_type: &str) -> &'static str {
    match doc_type {
        "recipe" => "This image contains a recipe for",
        "invoice" => "This document is an invoice that",
        "receipt" => "This receipt shows",
        "contract" => "This contract outlines",
        "report" => "This report presents",
        "id_document" => "This identification document contains",
        _ => "This document contains",
    }
}

fn format_summary(summary: &str, doc_type: &str, original: &str) -> String {
    let word_count = original.split_whitespace().count();
    let metrics = headline_metrics(original, doc_type);
    format!(
        "{} {} {}The document contains approximately {} words of content.",
        type_prefix(doc_type),
        summary.trim().to_lowercase(),
        metrics,
        thousands(word_count)
    )
}

/// Regex-extracted headline figures appended after the summary body.
fn headline_metrics(text: &str, doc_type: &str) -> String {
    let lower = text.to_lowercase();
    let mut metrics = String::new();

    match doc_type {
        "recipe" => {
            if let Some(caps) = SERVINGS.captures(&lower) {
                metrics.push_str(&format!("for {} servings ", &caps[1]));
            }
            if let Some(caps) = PREP_TIME.captures(&lower) {
                metrics.push_str(&format!("with {} minutes preparation time. ", &caps[1]));
            }
        }
        "invoice" | "receipt" => {
            if let Some(caps) = TOTAL_FIGURE.captures(&lower) {
                let phrase = if doc_type == "invoice" {
                    "totaling"
                } else {
                    "with a total of"
                };
                metrics.push_str(&format!("{phrase} ${}. ", &caps[1]));
            }
        }
        _ => {}
    }
    metrics
}

fn rule_based_overview(text: &str, doc_type: &str) -> String {
    let word_count = text.split_whitespace().count();

    // First short, non-boilerplate line among the leading lines becomes
    // the subject.
    let boilerplate = ["ingredients", "step", "total", "amount", "date"];
    let subject = text
        .lines()
        .map(str::trim)
        .filter(|l| l.len() > 5)
        .take(5)
        .find(|l| {
            let lower = l.to_lowercase();
            l.len() < 100 && !boilerplate.iter().any(|w| lower.contains(w))
        })
        .map(|l| format!("**{l}**"))
        .unwrap_or_else(|| "various content".to_string());

    let description = match doc_type {
        "recipe" => format!(
            "This image contains a recipe for {subject}. The recipe includes ingredients, \
             cooking instructions, and preparation steps"
        ),
        "invoice" => format!(
            "This document is an invoice regarding {subject}. It contains billing \
             information, itemized charges, and payment details"
        ),
        "receipt" => format!(
            "This receipt shows a transaction for {subject}. It includes purchase \
             details, amounts, and payment information"
        ),
        "contract" => format!(
            "This contract pertains to {subject}. It outlines legal terms, conditions, \
             and obligations between parties"
        ),
        "report" => format!(
            "This report discusses {subject}. It presents analysis, findings, and \
             conclusions"
        ),
        "id_document" => {
            "This identification document contains personal information and verification \
             details"
                .to_string()
        }
        _ => format!("This document contains information about {subject}"),
    };

    format!(
        "{description} with approximately {} words of content.",
        thousands(word_count)
    )
}

/// Format a count with comma thousands separators.
fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::mock::MockSummarizer;

    const INVOICE_TEXT: &str = "Acme Supplies Invoice\nInvoice Number: INV-88\n\
        Widgets and fasteners delivered to the warehouse in March.\n\
        Tax: $50.00\nTotal: $450.00\nPayment due within thirty days of issue.";

    #[test]
    fn empty_text_gets_fixed_message() {
        let overview = generate_overview("  ", "invoice", None);
        assert!(overview.contains("empty"));
    }

    #[test]
    fn summarizer_reply_is_prefixed_and_footed() {
        let summarizer = MockSummarizer::replying("Acme billed for widget delivery");
        let overview = generate_overview(INVOICE_TEXT, "invoice", Some(&summarizer));

        assert!(overview.starts_with("This document is an invoice that"));
        assert!(overview.contains("acme billed for widget delivery"));
        assert!(overview.contains("totaling $450.00."));
        assert!(overview.contains("words of content."));
    }

    #[test]
    fn failed_summarizer_falls_back_to_rules() {
        let summarizer = MockSummarizer::failing();
        let overview = generate_overview(INVOICE_TEXT, "invoice", Some(&summarizer));

        assert!(overview.contains("**Acme Supplies Invoice**"));
        assert!(overview.contains("itemized charges"));
    }

    #[test]
    fn no_summarizer_uses_rules() {
        let overview = generate_overview(INVOICE_TEXT, "invoice", None);
        assert!(overview.starts_with("This document is an invoice regarding"));
    }

    #[test]
    fn prompt_caps_word_count_and_marks_truncation() {
        let long_text = "word ".repeat(PROMPT_WORD_LIMIT + 50);
        let prompt = build_prompt(&long_text, "report");

        assert!(prompt.starts_with("Summarize this report"));
        assert!(prompt.ends_with("..."));
        let body = prompt.split_once(": ").map(|(_, b)| b).unwrap_or("");
        assert_eq!(body.split_whitespace().count(), PROMPT_WORD_LIMIT);
    }

    #[test]
    fn thousands_separator() {
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1234567), "1,234,567");
    }
}
