#![forbid(unsafe_code)]

//! CSS value helpers shared by the DOM adapters.

/// Parse the leading number of a computed CSS length, `parseFloat` style.
///
/// `"12.5px"` gives `12.5`; anything without a leading number gives `0.0`.
#[must_use]
pub fn parse_px(value: &str) -> f64 {
    let value = value.trim_start();
    let bytes = value.as_bytes();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    if matches!(bytes.first(), Some(b'-' | b'+')) {
        end = 1;
    }
    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return 0.0;
    }
    value[..end].parse().unwrap_or(0.0)
}

/// Horizontal padding from computed `padding-left` / `padding-right`.
#[must_use]
pub fn padding_x(left: &str, right: &str) -> f64 {
    parse_px(left) + parse_px(right)
}

/// Format a px length for an inline style.
#[must_use]
pub fn format_px(px: f64) -> String {
    format!("{px}px")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_lengths() {
        assert_eq!(parse_px("12.5px"), 12.5);
        assert_eq!(parse_px("0px"), 0.0);
        assert_eq!(parse_px("  24px"), 24.0);
        assert_eq!(parse_px("-3px"), -3.0);
        assert_eq!(parse_px(".5em"), 0.5);
    }

    #[test]
    fn garbage_is_zero() {
        assert_eq!(parse_px(""), 0.0);
        assert_eq!(parse_px("auto"), 0.0);
        assert_eq!(parse_px("-"), 0.0);
        assert_eq!(parse_px("."), 0.0);
    }

    #[test]
    fn padding_sums_both_sides() {
        assert_eq!(padding_x("16px", "24px"), 40.0);
        assert_eq!(padding_x("", "8px"), 8.0);
    }

    #[test]
    fn formats_px() {
        assert_eq!(format_px(199.5), "199.5px");
        assert_eq!(format_px(48.0), "48px");
    }
}
