//! Named-field pattern registry.
//!
//! Each field carries an ordered regex list; the first pattern that
//! matches anywhere in the text supplies that field's value.

use std::sync::LazyLock;

use regex::Regex;

fn field(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).unwrap()
}

/// Field registry in extraction order. More specific fields come first
/// so shared keywords (date vs due date) resolve predictably.
static FIELD_PATTERNS: LazyLock<Vec<(&'static str, Vec<Regex>)>> = LazyLock::new(|| {
    vec![
        (
            "invoice_number",
            vec![
                field(r"invoice\s*(?:number|#|no\.?)\s*:?\s*([A-Z0-9\-]+)"),
                field(r"invoice\s*([A-Z0-9\-]+)"),
                field(r"inv\s*(?:number|#|no\.?)\s*:?\s*([A-Z0-9\-]+)"),
            ],
        ),
        (
            "total_amount",
            vec![
                field(r"total\s*:?\s*\$?([0-9,]+\.?\d*)"),
                field(r"amount\s*due\s*:?\s*\$?([0-9,]+\.?\d*)"),
                field(r"grand\s*total\s*:?\s*\$?([0-9,]+\.?\d*)"),
            ],
        ),
        (
            "due_date",
            vec![field(r"due\s*date\s*:?\s*(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})")],
        ),
        (
            "date",
            vec![
                field(r"date\s*:?\s*(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})"),
                field(r"invoice\s*date\s*:?\s*(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})"),
            ],
        ),
        (
            "vendor_name",
            vec![
                field(r"from\s*:?\s*([A-Za-z\s&,.]+?)(?:\n|$)"),
                field(r"vendor\s*:?\s*([A-Za-z\s&,.]+?)(?:\n|$)"),
                field(r"bill\s*to\s*:?\s*([A-Za-z\s&,.]+?)(?:\n|$)"),
            ],
        ),
        (
            "email",
            vec![
                field(r"e-?mail\s*:?\s*([\w.+-]+@[\w.-]+\.\w+)"),
                field(r"([\w.+-]+@[\w.-]+\.\w+)"),
            ],
        ),
    ]
});

/// First-match-wins extraction over the whole registry.
pub fn extract(text: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for (name, patterns) in FIELD_PATTERNS.iter() {
        for re in patterns {
            if let Some(caps) = re.captures(text) {
                if let Some(value) = caps.get(1) {
                    out.push((name.to_string(), value.as_str().trim().to_string()));
                    break;
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_of<'a>(pairs: &'a [(String, String)], field: &str) -> Option<&'a str> {
        pairs
            .iter()
            .find(|(k, _)| k == field)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn invoice_number_variants() {
        for text in [
            "Invoice Number: INV-001",
            "INVOICE # INV-001",
            "Inv No. INV-001",
        ] {
            let pairs = extract(text);
            assert_eq!(value_of(&pairs, "invoice_number"), Some("INV-001"), "{text}");
        }
    }

    #[test]
    fn total_amount_strips_currency_sign() {
        let pairs = extract("Amount Due: $2,300.50");
        assert_eq!(value_of(&pairs, "total_amount"), Some("2,300.50"));
    }

    #[test]
    fn due_date_and_date_are_separate_fields() {
        let pairs = extract("Date: 01/02/2024\nDue Date: 02/02/2024");
        assert_eq!(value_of(&pairs, "date"), Some("01/02/2024"));
        assert_eq!(value_of(&pairs, "due_date"), Some("02/02/2024"));
    }

    #[test]
    fn vendor_name_stops_at_line_end() {
        let pairs = extract("From: Acme Supplies Inc\nInvoice Number: INV-9");
        assert_eq!(value_of(&pairs, "vendor_name"), Some("Acme Supplies Inc"));
    }

    #[test]
    fn bare_email_is_picked_up() {
        let pairs = extract("contact billing@acme.example for questions");
        assert_eq!(value_of(&pairs, "email"), Some("billing@acme.example"));
    }

    #[test]
    fn no_fields_in_unrelated_text() {
        assert!(extract("the quick brown fox").is_empty());
    }
}
