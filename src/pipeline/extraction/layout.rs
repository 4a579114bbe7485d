//! Structural layout breakdown of extracted text.
//!
//! Line heuristics only: short upper- or title-case lines become headers,
//! bullet and numbered lines become list items, and any other line of
//! substance becomes a paragraph. Each bucket is capped so the payload
//! stays bounded on long documents.

use serde::{Deserialize, Serialize};

const MAX_HEADERS: usize = 10;
const MAX_PARAGRAPHS: usize = 20;
const MAX_LIST_ITEMS: usize = 15;

/// Header lines are shorter than this many characters.
const HEADER_CHAR_LIMIT: usize = 80;
/// Paragraph lines are longer than this many characters.
const PARAGRAPH_CHAR_FLOOR: usize = 20;

const LIST_PREFIXES: [&str; 6] = ["\u{2022}", "-", "*", "1.", "2.", "3."];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutElements {
    pub headers: Vec<String>,
    pub paragraphs: Vec<String>,
    pub lists: Vec<String>,
}

pub fn extract_layout(text: &str) -> LayoutElements {
    let mut layout = LayoutElements::default();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let chars = line.chars().count();
        if chars < HEADER_CHAR_LIMIT && (is_upper_case(line) || is_title_case(line)) {
            layout.headers.push(line.to_string());
        } else if LIST_PREFIXES.iter().any(|p| line.starts_with(p)) {
            layout.lists.push(line.to_string());
        } else if chars > PARAGRAPH_CHAR_FLOOR {
            layout.paragraphs.push(line.to_string());
        }
    }

    layout.headers.truncate(MAX_HEADERS);
    layout.paragraphs.truncate(MAX_PARAGRAPHS);
    layout.lists.truncate(MAX_LIST_ITEMS);
    layout
}

/// At least one letter and no lowercase letters.
fn is_upper_case(line: &str) -> bool {
    let mut has_alpha = false;
    for c in line.chars().filter(|c| c.is_alphabetic()) {
        has_alpha = true;
        if c.is_lowercase() {
            return false;
        }
    }
    has_alpha
}

/// Every word with letters starts uppercase and continues lowercase.
fn is_title_case(line: &str) -> bool {
    let mut has_alpha = false;
    for word in line.split_whitespace() {
        let mut letters = word.chars().filter(|c| c.is_alphabetic());
        if let Some(first) = letters.next() {
            has_alpha = true;
            if !first.is_uppercase() || letters.any(|c| c.is_uppercase()) {
                return false;
            }
        }
    }
    has_alpha
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_bucketed_by_shape() {
        let text = "INVOICE SUMMARY\n\
            Monthly Service Charges\n\
            The vendor billed four separate line items for march services.\n\
            - widget restocking\n\
            * gasket replacement\n\
            1. inspect the housing\n\
            short line";
        let layout = extract_layout(text);

        assert_eq!(
            layout.headers,
            vec!["INVOICE SUMMARY", "Monthly Service Charges"]
        );
        assert_eq!(layout.paragraphs.len(), 1);
        assert!(layout.paragraphs[0].starts_with("The vendor billed"));
        assert_eq!(layout.lists.len(), 3);
    }

    #[test]
    fn short_mixed_case_lines_are_dropped() {
        let layout = extract_layout("short line\nok\n");
        assert!(layout.headers.is_empty());
        assert!(layout.paragraphs.is_empty());
        assert!(layout.lists.is_empty());
    }

    #[test]
    fn buckets_are_capped() {
        let text = "HEADING LINE\n".repeat(30);
        let layout = extract_layout(&text);
        assert_eq!(layout.headers.len(), MAX_HEADERS);
    }

    #[test]
    fn empty_text_yields_empty_layout() {
        let layout = extract_layout("");
        assert!(layout.headers.is_empty());
    }
}
