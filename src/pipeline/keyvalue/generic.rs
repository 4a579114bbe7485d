//! Generic fallback patterns, namespaced by category.
//!
//! Looser "<word> amount/number/date/id" shapes catch labeled values the
//! named registry has no field for. Keys are prefixed with the category
//! so a generic hit never collides with a named field.

use std::sync::LazyLock;

use regex::Regex;

static GENERIC_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(\w+\s*amount)\s*:?\s*\$?([0-9,]+\.?\d*)", "amount"),
        (r"(\w+\s*(?:number|no|#))\s*:?\s*([A-Z0-9\-]+)", "number"),
        (r"(\w+\s*date)\s*:?\s*(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})", "date"),
        (r"(\w+\s*id)\s*:?\s*([A-Z0-9\-]+)", "id"),
    ]
    .into_iter()
    .map(|(pattern, category)| (Regex::new(&format!("(?i){pattern}")).unwrap(), category))
    .collect()
});

pub fn extract(text: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for (re, category) in GENERIC_PATTERNS.iter() {
        for caps in re.captures_iter(text) {
            let (Some(key), Some(value)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let clean_key = key
                .as_str()
                .trim()
                .to_lowercase()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join("_");
            out.push((
                format!("{category}_{clean_key}"),
                value.as_str().trim().to_string(),
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_category() {
        let pairs = extract("Refund Amount: $32.50");
        assert_eq!(pairs[0], ("amount_refund_amount".into(), "32.50".into()));
    }

    #[test]
    fn number_category() {
        let pairs = extract("Tracking Number 1Z-999-AA");
        assert!(pairs.contains(&("number_tracking_number".into(), "1Z-999-AA".into())));
    }

    #[test]
    fn id_category() {
        let pairs = extract("Member ID: M-44821");
        assert!(pairs.contains(&("id_member_id".into(), "M-44821".into())));
    }

    #[test]
    fn multiple_matches_per_category() {
        let pairs = extract("Start Date: 01/01/2024 End Date: 02/01/2024");
        let dates: Vec<_> = pairs.iter().filter(|(k, _)| k.starts_with("date_")).collect();
        assert_eq!(dates.len(), 2);
    }
}
