//! CLI output formatting.

use std::time::Duration;

use console::{measure_text_width, pad_str, Alignment};

use insucalc_core::constants::PLACEHOLDER;

/// Format a duration for display.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{secs:.2}s")
    } else {
        let mins = (secs / 60.0).floor() as u64;
        let remaining = secs - (mins as f64 * 60.0);
        format!("{mins}m{remaining:.1}s")
    }
}

/// Format a number with thousand separators.
#[must_use]
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a premium in won, or the placeholder when absent.
///
/// Zero is a real premium and renders as `0원`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_premium(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => format!("{}원", format_number(v.round() as u64)),
        Some(v) => format!("{v}"),
        None => PLACEHOLDER.to_string(),
    }
}

/// Pad `text` to `width` display columns; wide characters count double.
#[must_use]
pub fn pad(text: &str, width: usize, right: bool) -> String {
    let align = if right { Alignment::Right } else { Alignment::Left };
    pad_str(text, width, align, Some("…")).into_owned()
}

/// Widest display width among `cells`, at least `min`.
#[must_use]
pub fn column_width<'a>(cells: impl IntoIterator<Item = &'a str>, min: usize) -> usize {
    cells.into_iter().map(measure_text_width).fold(min, usize::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_ranges() {
        assert_eq!(format_duration(Duration::from_millis(42)), "42ms");
        assert_eq!(format_duration(Duration::from_millis(3140)), "3.14s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30.0s");
    }

    #[test]
    fn format_number_thousands() {
        assert_eq!(format_number(1_000_000), "1,000,000");
        assert_eq!(format_number(42), "42");
        assert_eq!(format_number(1234), "1,234");
    }

    #[test]
    fn premiums_keep_zero_and_placeholder() {
        assert_eq!(format_premium(Some(12_345.4)), "12,345원");
        assert_eq!(format_premium(Some(0.0)), "0원");
        assert_eq!(format_premium(None), "—");
    }

    #[test]
    fn padding_counts_wide_characters() {
        assert_eq!(measure_text_width(&pad("암보험", 10, false)), 10);
        assert_eq!(pad("7", 3, true), "  7");
        assert_eq!(column_width(["주계약", "a"], 2), 6);
    }
}
