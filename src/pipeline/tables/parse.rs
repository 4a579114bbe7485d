//! Text-to-rows table parsing.
//!
//! Lines are split into columns by a delimiter cascade. Each splitter is
//! tried in order and the first one yielding at least two cells wins:
//! runs of two or more spaces, tabs, pipes, commas (guarded so decimal
//! commas inside numbers are not split points), then a heuristic that
//! breaks label from value at the first value-shaped token, with a plain
//! midpoint split as the last resort.

use std::sync::LazyLock;

use regex::Regex;

/// Minimum OCR output length for a region pass to count as readable.
pub const MIN_REGION_TEXT_LEN: usize = 10;

/// Parse OCR region text into a header row plus data rows, using the
/// full delimiter cascade on every line.
///
/// Returns `None` unless there are at least two parsed rows and the
/// header has at least two columns. Data rows are normalized to the
/// header's width and fully empty rows are dropped.
pub fn parse_table_text(text: &str) -> Option<(Vec<String>, Vec<Vec<String>>)> {
    let rows: Vec<Vec<String>> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(split_columns)
        .filter(|r| r.iter().any(|c| !c.is_empty()))
        .collect();
    normalize_rows(rows)
}

/// Parse a native text layer, where table lines sit among prose. Only
/// the first contiguous run of explicitly delimited lines counts; the
/// label/value heuristic would otherwise turn every paragraph into a
/// two-column row.
pub fn parse_text_block(text: &str) -> Option<(Vec<String>, Vec<Vec<String>>)> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let start = lines.iter().position(|l| split_explicit(l).is_some())?;

    let mut rows = Vec::new();
    for line in &lines[start..] {
        match split_explicit(line) {
            Some(cells) => rows.push(cells),
            None => break,
        }
    }
    normalize_rows(rows)
}

fn normalize_rows(mut rows: Vec<Vec<String>>) -> Option<(Vec<String>, Vec<Vec<String>>)> {
    if rows.len() < 2 {
        return None;
    }
    let headers = rows.remove(0);
    if headers.len() < 2 {
        return None;
    }

    let width = headers.len();
    let data: Vec<Vec<String>> = rows
        .into_iter()
        .map(|mut row| {
            row.truncate(width);
            row.resize(width, String::new());
            row
        })
        .filter(|row| row.iter().any(|c| !c.is_empty()))
        .collect();

    if data.is_empty() {
        return None;
    }
    Some((headers, data))
}

/// Split one line into column cells via the delimiter cascade.
pub fn split_columns(line: &str) -> Vec<String> {
    match split_explicit(line) {
        Some(cells) => cells,
        None => split_label_value(line),
    }
}

/// The explicit-delimiter part of the cascade only.
fn split_explicit(line: &str) -> Option<Vec<String>> {
    for splitter in [split_multi_space, split_tab, split_pipe, split_comma] {
        let cells = splitter(line);
        if cells.len() >= 2 {
            return Some(cells);
        }
    }
    None
}

fn split_multi_space(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut spaces = 0usize;
    for ch in line.chars() {
        if ch == ' ' {
            spaces += 1;
            continue;
        }
        if spaces >= 2 && !current.is_empty() {
            cells.push(current.trim().to_string());
            current.clear();
        } else if spaces > 0 {
            current.push(' ');
        }
        spaces = 0;
        current.push(ch);
    }
    if !current.trim().is_empty() {
        cells.push(current.trim().to_string());
    }
    cells.retain(|c| !c.is_empty());
    cells
}

fn split_tab(line: &str) -> Vec<String> {
    line.split('\t')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

fn split_pipe(line: &str) -> Vec<String> {
    line.split('|')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

/// Comma split, skipping commas that belong to a number so values like
/// 1,250.00 or a trailing decimal 10,50 stay intact.
fn split_comma(line: &str) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    let mut cells = Vec::new();
    let mut current = String::new();
    for (i, &ch) in chars.iter().enumerate() {
        if ch == ',' && !numeric_comma(&chars, i) {
            cells.push(current.trim().to_string());
            current.clear();
            continue;
        }
        current.push(ch);
    }
    cells.push(current.trim().to_string());
    cells.retain(|c| !c.is_empty());
    cells
}

/// A comma at `i` is part of a number when a digit precedes it and it is
/// followed by a three-digit thousands group, or by one or two digits
/// ending the cell (a decimal comma).
fn numeric_comma(chars: &[char], i: usize) -> bool {
    if i == 0 || !chars[i - 1].is_ascii_digit() {
        return false;
    }
    let run = chars[i + 1..]
        .iter()
        .take_while(|c| c.is_ascii_digit())
        .count();
    let after = chars.get(i + 1 + run);
    match run {
        3 => true,
        1 | 2 => after.map_or(true, |c| *c == ' '),
        _ => false,
    }
}

/// Break a delimiter-free line at the first value-shaped token, or at the
/// token midpoint when no token looks like a value.
fn split_label_value(line: &str) -> Vec<String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return tokens.iter().map(|t| t.to_string()).collect();
    }
    let split_at = tokens
        .iter()
        .skip(1)
        .position(|t| is_value_shaped(t))
        .map(|p| p + 1)
        .unwrap_or(tokens.len() / 2);
    vec![tokens[..split_at].join(" "), tokens[split_at..].join(" ")]
}

/// Numeric, currency, percentage, or date shaped token.
static VALUE_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\$?\d[\d,]*(\.\d+)?%?|\d{1,2}[/-]\d{1,2}[/-]\d{2,4}|\d{4}[/-]\d{1,2}[/-]\d{1,2})$",
    )
    .unwrap()
});

fn is_value_shaped(token: &str) -> bool {
    VALUE_SHAPE.is_match(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- column splitting ---

    #[test]
    fn multi_space_split_wins_first() {
        let cells = split_columns("Item  Qty  Price");
        assert_eq!(cells, vec!["Item", "Qty", "Price"]);
    }

    #[test]
    fn single_spaces_stay_inside_cells() {
        let cells = split_columns("Line Item Name  Unit Price");
        assert_eq!(cells, vec!["Line Item Name", "Unit Price"]);
    }

    #[test]
    fn tab_split() {
        let cells = split_columns("Item\tQty\tPrice");
        assert_eq!(cells, vec!["Item", "Qty", "Price"]);
    }

    #[test]
    fn pipe_split() {
        let cells = split_columns("Item | Qty | Price");
        assert_eq!(cells, vec!["Item", "Qty", "Price"]);
    }

    #[test]
    fn comma_split_guards_decimal_commas() {
        let cells = split_columns("Widget,2,1,250.00");
        assert_eq!(cells, vec!["Widget", "2", "1,250.00"]);
    }

    #[test]
    fn value_shape_split_on_currency() {
        let cells = split_columns("Total amount due $450.00");
        assert_eq!(cells, vec!["Total amount due", "$450.00"]);
    }

    #[test]
    fn value_shape_split_on_date() {
        let cells = split_columns("Delivery date 12/05/2024");
        assert_eq!(cells, vec!["Delivery date", "12/05/2024"]);
    }

    #[test]
    fn midpoint_split_when_nothing_matches() {
        let cells = split_columns("alpha beta gamma delta");
        assert_eq!(cells, vec!["alpha beta", "gamma delta"]);
    }

    // --- whole-block parsing ---

    #[test]
    fn double_space_block_parses_line_count_minus_one_rows() {
        let text = "Item  Qty  Price\nWidget  2  10.00\nGadget  1  25.50\nBolt  40  0.10";
        let (headers, rows) = parse_table_text(text).unwrap();

        assert_eq!(headers, vec!["Item", "Qty", "Price"]);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn rows_normalized_to_header_width() {
        let text = "A  B  C\nonly  two\none  two  three  four";
        let (headers, rows) = parse_table_text(text).unwrap();

        assert_eq!(headers.len(), 3);
        assert_eq!(rows[0], vec!["only", "two", ""]);
        assert_eq!(rows[1], vec!["one", "two", "three"]);
    }

    #[test]
    fn single_row_is_not_a_table() {
        assert!(parse_table_text("Item  Qty  Price").is_none());
    }

    #[test]
    fn single_column_header_is_not_a_table() {
        assert!(parse_table_text("Title\nBody").is_none());
    }

    #[test]
    fn text_block_finds_table_among_prose() {
        let text = "Acme Supplies Invoice\nInvoice Number: INV-9\n\
            Item  Qty  Price\nWidget  2  10.00\nGadget  1  25.50\n\
            Total: $35.50\nPayment due on receipt.";
        let (headers, rows) = parse_text_block(text).unwrap();

        assert_eq!(headers, vec!["Item", "Qty", "Price"]);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn text_block_without_delimited_lines_is_not_a_table() {
        assert!(parse_text_block("Just a paragraph of prose.\nAnd another line.").is_none());
    }

    #[test]
    fn blank_lines_are_skipped() {
        let text = "Item  Qty\n\n\nWidget  2\n";
        let (_, rows) = parse_table_text(text).unwrap();
        assert_eq!(rows.len(), 1);
    }
}
