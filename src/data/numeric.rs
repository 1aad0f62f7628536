use std::sync::OnceLock;

use regex::Regex;

// ---------------------------------------------------------------------------
// Numeric token repair
// ---------------------------------------------------------------------------

/// Decimal number with optional sign, fraction and exponent.
fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?").expect("valid number pattern")
    })
}

/// Clean a token the way instrument exports need: drop a leading `+`, drop
/// regular and non-breaking spaces, turn a decimal comma into a point.
fn clean(token: &str) -> String {
    let trimmed = token.trim_matches(|c: char| c.is_whitespace() || c == '"');
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    unsigned
        .chars()
        .filter(|&c| c != ' ' && c != '\u{a0}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect()
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Parse a cleaned token directly, without substring recovery.
///
/// Used where a false positive is worse than a miss (header detection,
/// delimiter scoring).
pub fn parse_strict(token: &str) -> Option<f64> {
    clean(token).parse::<f64>().ok().and_then(finite)
}

/// Parse a token, falling back to the first numeric substring it contains.
/// Non-finite values count as missing.
pub fn parse_number(token: &str) -> Option<f64> {
    let cleaned = clean(token);
    if let Ok(value) = cleaned.parse::<f64>() {
        return finite(value);
    }
    number_pattern()
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .and_then(finite)
}

/// First two numeric substrings anywhere in `line`.
pub fn first_two_numbers(line: &str) -> Option<(f64, f64)> {
    let mut values = number_pattern()
        .find_iter(line)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite());
    let first = values.next()?;
    let second = values.next()?;
    Some((first, second))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_signed() {
        assert_eq!(parse_number("100"), Some(100.0));
        assert_eq!(parse_number("+1.5E+08"), Some(1.5e8));
        assert_eq!(parse_number("-30.25"), Some(-30.25));
    }

    #[test]
    fn test_decimal_comma_and_spaces() {
        assert_eq!(parse_number("-30,5"), Some(-30.5));
        assert_eq!(parse_number("1\u{a0}000"), Some(1000.0));
        assert_eq!(parse_number(" 2 400 "), Some(2400.0));
    }

    #[test]
    fn test_substring_recovery() {
        assert_eq!(parse_number("-42.1dB"), Some(-42.1));
        assert_eq!(parse_number("f=915MHz"), Some(915.0));
        assert_eq!(parse_strict("-42.1dB"), None);
    }

    #[test]
    fn test_rejects_garbage_and_non_finite() {
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
    }

    #[test]
    fn test_first_two_numbers() {
        assert_eq!(
            first_two_numbers("freq 100000000 amp -30.5 dB"),
            Some((1.0e8, -30.5))
        );
        assert_eq!(first_two_numbers("only 1 value"), None);
        assert_eq!(first_two_numbers("abc def ghi"), None);
    }
}
