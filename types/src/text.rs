//! Small pure text helpers for a fixed-width character display.

use unicode_segmentation::UnicodeSegmentation;

/// Clip or pad `s` to exactly `width` characters.
#[must_use]
pub fn fit_to_width(s: &str, width: usize) -> String {
    let mut out: String = s.graphemes(true).take(width).collect();
    let len = out.graphemes(true).count();
    for _ in len..width {
        out.push(' ');
    }
    out
}

/// Center `s` within `width` characters, left-biased on odd padding.
#[must_use]
pub fn center(s: &str, width: usize) -> String {
    let len = s.graphemes(true).count();
    if len >= width {
        return fit_to_width(s, width);
    }
    let left = (width - len) / 2;
    let mut out = " ".repeat(left);
    out.push_str(s);
    fit_to_width(&out, width)
}

/// Word-wrap `s` to `width` columns.
///
/// Breaks at the last space at or before the column limit; a run with no
/// space is hard-broken at the limit. Never returns an empty vector.
#[must_use]
pub fn wrap_to_width(s: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![String::new()];
    }
    let mut lines = Vec::new();
    for paragraph in s.split('\n') {
        let mut rest = paragraph.trim_end();
        while rest.graphemes(true).count() > width {
            // Byte offset of the first grapheme past the column limit.
            let limit = rest
                .grapheme_indices(true)
                .nth(width)
                .map_or_else(|| rest.len(), |(idx, _)| idx);
            // A space sitting exactly on the limit is still a break point.
            let search_end = if rest.as_bytes().get(limit) == Some(&b' ') {
                limit + 1
            } else {
                limit
            };
            match rest[..search_end].rfind(' ') {
                Some(idx) if idx > 0 => {
                    lines.push(rest[..idx].trim_end().to_string());
                    rest = rest[idx..].trim_start();
                }
                _ => {
                    lines.push(rest[..limit].to_string());
                    rest = &rest[limit..];
                }
            }
        }
        lines.push(rest.to_string());
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Format a number the way the display shows it: no trailing zeros, no
/// exponent, at most three decimal places.
#[must_use]
pub fn format_number(n: f64) -> String {
    if n == n.trunc() && n.abs() < 1e12 {
        return format!("{n:.0}");
    }
    let mut s = format!("{n:.3}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}
