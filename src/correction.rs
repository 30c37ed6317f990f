//! OCR glyph correction for digit strings.
//!
//! Odometer displays are read by a general-purpose text recognizer, which
//! happily returns `O` for `0` or `I` for `1`. Corrections are only applied
//! inside clusters that already contain a real digit, so words such as
//! "ODO" or "TRIP" survive untouched.

/// Digit a commonly confused glyph stands for, or `None` if `c` is not an
/// ambiguous glyph.
pub fn corrected_digit(c: char) -> Option<char> {
    match c {
        'O' | 'o' | 'Q' | 'D' => Some('0'),
        'I' | 'l' | '|' => Some('1'),
        'Z' => Some('2'),
        'S' => Some('5'),
        'G' => Some('6'),
        'B' => Some('8'),
        _ => None,
    }
}

fn is_ambiguous(c: char) -> bool {
    corrected_digit(c).is_some()
}

/// Rewrite ambiguous glyphs as digits, but only inside runs of
/// digit-or-ambiguous characters that contain at least one genuine digit.
///
/// `correct("I2345")` → `"12345"`, while `correct("ODO")` is unchanged.
pub fn correct(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cluster = String::new();
    let mut has_digit = false;

    for c in text.chars() {
        if c.is_ascii_digit() || is_ambiguous(c) {
            has_digit |= c.is_ascii_digit();
            cluster.push(c);
            continue;
        }
        flush_cluster(&mut out, &mut cluster, has_digit);
        has_digit = false;
        out.push(c);
    }
    flush_cluster(&mut out, &mut cluster, has_digit);

    out
}

fn flush_cluster(out: &mut String, cluster: &mut String, has_digit: bool) {
    if has_digit {
        out.extend(cluster.chars().map(|c| corrected_digit(c).unwrap_or(c)));
    } else {
        out.push_str(cluster);
    }
    cluster.clear();
}
