//! Question categorization and per-category answer material.
//!
//! A question is assigned the category whose keyword table it overlaps
//! most; ties go to the earlier category and no overlap at all means
//! General. Each category also carries the regexes used for pattern
//! answers, the key fragments used for structured-field lookup, the
//! entity labels used for NER lookup, and its answer phrasing.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

fn answers(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){p}")).unwrap())
        .collect()
}

static AMOUNT_ANSWERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    answers(&[
        r"(?:amount|total|sum|cost|price|balance)\s*(?:due|paid)?\s*:?\s*\$?([0-9,]+(?:\.[0-9]{2})?)",
        r"\$([0-9,]+(?:\.[0-9]{2})?)",
    ])
});

static DATE_ANSWERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    answers(&[
        r"(?:date|dated|on)\s*:?\s*(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})",
        r"(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})",
    ])
});

static NAME_ANSWERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    answers(&[
        r"(?:name|customer|vendor|to|from)\s*:?\s*([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)",
        r"dear\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)",
    ])
});

static ID_ANSWERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    answers(&[
        r"(?:invoice|reference|transaction|account|tracking)\s*(?:number|no\.?|id|#)?\s*:?\s*([A-Z0-9\-]{3,})",
        r"(?:ref|id|#)\s*:?\s*([A-Z0-9\-]{3,})",
    ])
});

static ADDRESS_ANSWERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    answers(&[
        r"(\d+\s+\w+\s+(?:Street|St|Avenue|Ave|Road|Rd|Drive|Dr|Lane|Ln|Boulevard|Blvd)\.?(?:,\s*\w+)*)",
    ])
});

static PHONE_ANSWERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    answers(&[
        r"(\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4})",
        r"(\+\d{1,3}[-.\s]?\d{3,4}[-.\s]?\d{3,4}[-.\s]?\d{3,4})",
    ])
});

static EMAIL_ANSWERS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| answers(&[r"([\w.+-]+@[\w.-]+\.[A-Za-z]{2,})"]));

static PRODUCT_ANSWERS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| answers(&[r"(?:item|product|description)\s*:?\s*([^.,\n]+)"]));

static PERCENTAGE_ANSWERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    answers(&[
        r"([0-9]+(?:\.[0-9]+)?)\s*%",
        r"(?:rate|tax|discount|interest)\s*:?\s*([0-9]+(?:\.[0-9]+)?)",
    ])
});

static GENERAL_ANSWERS: LazyLock<Vec<Regex>> = LazyLock::new(Vec::new);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCategory {
    Amount,
    Date,
    Name,
    Id,
    Address,
    Phone,
    Email,
    Product,
    Percentage,
    General,
}

impl QuestionCategory {
    pub const ALL: [QuestionCategory; 9] = [
        QuestionCategory::Amount,
        QuestionCategory::Date,
        QuestionCategory::Name,
        QuestionCategory::Id,
        QuestionCategory::Address,
        QuestionCategory::Phone,
        QuestionCategory::Email,
        QuestionCategory::Product,
        QuestionCategory::Percentage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionCategory::Amount => "amount",
            QuestionCategory::Date => "date",
            QuestionCategory::Name => "name",
            QuestionCategory::Id => "id",
            QuestionCategory::Address => "address",
            QuestionCategory::Phone => "phone",
            QuestionCategory::Email => "email",
            QuestionCategory::Product => "product",
            QuestionCategory::Percentage => "percentage",
            QuestionCategory::General => "general",
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            QuestionCategory::Amount => &[
                "amount", "total", "cost", "price", "sum", "much", "charge", "fee", "balance",
                "due", "owed",
            ],
            QuestionCategory::Date => &[
                "date", "when", "day", "time", "due", "issued", "expire", "expires",
            ],
            QuestionCategory::Name => &[
                "name", "who", "person", "customer", "vendor", "sender", "recipient",
            ],
            QuestionCategory::Id => &[
                "id", "number", "reference", "ref", "invoice", "transaction", "account",
                "tracking",
            ],
            QuestionCategory::Address => {
                &["address", "where", "location", "street", "city", "zip"]
            }
            QuestionCategory::Phone => &["phone", "telephone", "call", "mobile", "fax"],
            QuestionCategory::Email => &["email", "e-mail", "mail", "contact"],
            QuestionCategory::Product => &[
                "product", "item", "items", "purchased", "bought", "ordered", "goods",
            ],
            QuestionCategory::Percentage => &[
                "percent", "percentage", "rate", "tax", "discount", "interest",
            ],
            QuestionCategory::General => &[],
        }
    }

    /// Categorize by keyword overlap against the question's word set.
    pub fn classify(question: &str) -> QuestionCategory {
        let lower = question.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric() && c != '-')
            .filter(|w| !w.is_empty())
            .collect();

        let mut best = QuestionCategory::General;
        let mut best_hits = 0usize;
        for category in QuestionCategory::ALL {
            let hits = category
                .keywords()
                .iter()
                .filter(|kw| words.contains(kw))
                .count();
            if hits > best_hits {
                best = category;
                best_hits = hits;
            }
        }
        best
    }

    /// Compiled case-insensitive answer-extraction regexes.
    pub fn answer_patterns(&self) -> &'static [Regex] {
        match self {
            QuestionCategory::Amount => &AMOUNT_ANSWERS,
            QuestionCategory::Date => &DATE_ANSWERS,
            QuestionCategory::Name => &NAME_ANSWERS,
            QuestionCategory::Id => &ID_ANSWERS,
            QuestionCategory::Address => &ADDRESS_ANSWERS,
            QuestionCategory::Phone => &PHONE_ANSWERS,
            QuestionCategory::Email => &EMAIL_ANSWERS,
            QuestionCategory::Product => &PRODUCT_ANSWERS,
            QuestionCategory::Percentage => &PERCENTAGE_ANSWERS,
            QuestionCategory::General => &GENERAL_ANSWERS,
        }
    }

    /// Key fragments matched against extracted key-value field names.
    pub fn kv_keys(&self) -> &'static [&'static str] {
        match self {
            QuestionCategory::Amount => &["total_amount", "amount", "total", "price", "cost"],
            QuestionCategory::Date => &["due_date", "date"],
            QuestionCategory::Name => &["vendor_name", "name", "customer", "recipient"],
            QuestionCategory::Id => &["invoice_number", "reference", "transaction", "number", "id"],
            QuestionCategory::Address => &["address"],
            QuestionCategory::Phone => &["phone"],
            QuestionCategory::Email => &["email"],
            QuestionCategory::Product => &["description", "item"],
            QuestionCategory::Percentage => &["rate", "tax"],
            QuestionCategory::General => &[],
        }
    }

    /// Entity labels consulted in the NER stage.
    pub fn entity_labels(&self) -> &'static [&'static str] {
        match self {
            QuestionCategory::Amount => &["MONEY"],
            QuestionCategory::Date => &["DATE"],
            QuestionCategory::Name => &["PERSON"],
            QuestionCategory::Address => &["GPE", "LOC", "FAC"],
            QuestionCategory::Product => &["PRODUCT"],
            _ => &[],
        }
    }

    /// Category-specific answer phrasing.
    pub fn format_answer(&self, raw: &str) -> String {
        let raw = raw.trim();
        match self {
            QuestionCategory::Amount => {
                if raw.starts_with('$') {
                    format!("The amount is {raw}")
                } else {
                    format!("The amount is ${raw}")
                }
            }
            QuestionCategory::Date => format!("The date is {raw}"),
            QuestionCategory::Name => format!("The name is {raw}"),
            QuestionCategory::Id => format!("The reference number is {raw}"),
            QuestionCategory::Address => format!("The address is {raw}"),
            QuestionCategory::Phone => format!("The phone number is {raw}"),
            QuestionCategory::Email => format!("The email address is {raw}"),
            QuestionCategory::Product => format!("The item is: {raw}"),
            QuestionCategory::Percentage => {
                if raw.ends_with('%') {
                    format!("The rate is {raw}")
                } else {
                    format!("The rate is {raw}%")
                }
            }
            QuestionCategory::General => raw.to_string(),
        }
    }
}
