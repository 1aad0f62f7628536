use log::debug;

use super::numeric::{first_two_numbers, parse_number};

/// Columns of a fixed-column instrument log line:
/// frequency, unused, amplitude, azimuth, polarization, elevation, timestamp.
const FIXED_COLUMNS: usize = 7;
const FREQ_TOKEN: usize = 0;
const AMPLITUDE_TOKEN: usize = 2;

/// Parse a fixed-column `.result` log into raw (frequency, amplitude) pairs.
///
/// Full lines are read by position. Short lines take the first two tokens
/// that parse as numbers, then the first two numbers found anywhere in the
/// line. Lines with no usable pair are skipped.
pub fn parse_fixed_column(text: &str) -> Vec<(f64, f64)> {
    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let pair = if tokens.len() >= FIXED_COLUMNS {
            parse_number(tokens[FREQ_TOKEN]).zip(parse_number(tokens[AMPLITUDE_TOKEN]))
        } else {
            short_line_pair(&tokens).or_else(|| first_two_numbers(line))
        };

        match pair {
            Some(pair) => rows.push(pair),
            None => skipped += 1,
        }
    }

    debug!(
        "fixed-column parser: {} rows kept, {skipped} lines skipped",
        rows.len()
    );
    rows
}

fn short_line_pair(tokens: &[&str]) -> Option<(f64, f64)> {
    let mut numbers = tokens.iter().filter_map(|tok| parse_number(tok));
    Some((numbers.next()?, numbers.next()?))
}
