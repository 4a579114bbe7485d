//! Spatial proximity extraction over positioned OCR tokens.

use std::sync::LazyLock;

use regex::Regex;

use crate::pipeline::extraction::OcrToken;

/// Vertical distance within which token centers count as one line.
const LINE_TOLERANCE_PX: f32 = 10.0;

pub fn extract(tokens: &[OcrToken]) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for line in group_by_lines(tokens) {
        let line_text = line
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        pairs.extend(colon_pairs(&line_text));
        pairs.extend(adjacent_pairs(&line));
    }
    pairs
}

/// Cluster tokens into lines by vertical center, each line sorted
/// left-to-right.
fn group_by_lines(tokens: &[OcrToken]) -> Vec<Vec<&OcrToken>> {
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<&OcrToken> = tokens.iter().collect();
    sorted.sort_by(|a, b| {
        a.quad
            .center_y()
            .partial_cmp(&b.quad.center_y())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut lines: Vec<Vec<&OcrToken>> = Vec::new();
    let mut line_y = f32::NEG_INFINITY;
    for token in sorted {
        let y = token.quad.center_y();
        if (y - line_y).abs() <= LINE_TOLERANCE_PX {
            if let Some(line) = lines.last_mut() {
                line.push(token);
            }
        } else {
            lines.push(vec![token]);
            line_y = y;
        }
    }
    for line in &mut lines {
        line.sort_by(|a, b| {
            a.quad
                .left()
                .partial_cmp(&b.quad.left())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }
    lines
}

static COLON_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z\s]+?):\s*([A-Za-z0-9\s\-\$\.,]+?)(?:\s|$)").unwrap());

/// "Label: value" substrings within one reconstructed line.
fn colon_pairs(line_text: &str) -> Vec<(String, String)> {
    COLON_PAIR
        .captures_iter(line_text)
        .filter_map(|caps| {
            let key = caps.get(1)?.as_str().trim();
            let value = caps.get(2)?.as_str().trim();
            (!key.is_empty() && !value.is_empty())
                .then(|| (key.to_string(), value.to_string()))
        })
        .collect()
}

/// Adjacent token pairs where the left looks like a key and the right
/// like a value.
fn adjacent_pairs(line: &[&OcrToken]) -> Vec<(String, String)> {
    line.windows(2)
        .filter_map(|w| {
            let key = w[0].text.trim();
            let value = w[1].text.trim();
            (is_potential_key(key) && is_potential_value(value))
                .then(|| (key.to_string(), value.to_string()))
        })
        .collect()
}

/// A token is key-like when at least two indicators hold: short, ends
/// with a colon, carries a field keyword, or is capitalized.
fn is_potential_key(text: &str) -> bool {
    let clean: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    let lower = text.to_lowercase();

    let indicators = [
        clean.split_whitespace().count() <= 3,
        text.ends_with(':'),
        ["number", "name", "date", "amount", "total", "id"]
            .iter()
            .any(|kw| lower.contains(kw)),
        is_capitalized(text),
    ];
    indicators.iter().filter(|&&hit| hit).count() >= 2
}

fn is_capitalized(text: &str) -> bool {
    let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.is_empty() {
        return false;
    }
    let all_upper = letters.iter().all(|c| c.is_uppercase());
    let title_case = text
        .split_whitespace()
        .all(|w| w.chars().next().map_or(false, |c| c.is_uppercase()));
    all_upper || title_case
}

/// Non-empty and not pure punctuation.
fn is_potential_value(text: &str) -> bool {
    !text.trim().is_empty() && text.chars().any(|c| c.is_alphanumeric())
}
