use crate::correction::correct;
use regex::Regex;
use std::sync::OnceLock;

/// Shortest digit run treated as a mileage candidate.
pub const MIN_DIGIT_RUN: usize = 3;

fn digit_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"\d{{{MIN_DIGIT_RUN},}}")).expect("digit run pattern")
    })
}

/// Drop thousands separators, decimal points and whitespace, then apply
/// glyph correction.
pub fn clean_text(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !matches!(c, ',' | '.' | '\'') && !c.is_whitespace())
        .collect();
    correct(&stripped)
}

/// Extract every integer a piece of OCR text could denote.
///
/// Returns each maximal run of at least [`MIN_DIGIT_RUN`] digits in discovery
/// order, followed by a parse of the whole cleaned string when it is purely
/// numeric and yields a value not already found. Duplicates across calls are
/// left for the aggregator.
pub fn extract_numbers(text: &str) -> Vec<i64> {
    let cleaned = clean_text(text);

    let mut numbers: Vec<i64> = digit_runs()
        .find_iter(&cleaned)
        .filter_map(|m| m.as_str().parse::<i64>().ok())
        .collect();

    if !cleaned.is_empty() && cleaned.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(whole) = cleaned.parse::<i64>() {
            if !numbers.contains(&whole) {
                numbers.push(whole);
            }
        }
    }

    numbers
}
