use log::debug;

use super::numeric::{parse_number, parse_strict};

/// Number of non-empty lines inspected when sniffing the delimiter.
const SNIFF_LINES: usize = 20;

/// Highest column index considered for the amplitude role.
const MAX_AMPLITUDE_COLUMN: usize = 5;

// ---------------------------------------------------------------------------
// Delimiter sniffing
// ---------------------------------------------------------------------------

/// Field separators recognised by the generic parser, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Semicolon,
    Tab,
    Whitespace,
}

impl Delimiter {
    const PRIORITY: [Delimiter; 4] = [
        Delimiter::Comma,
        Delimiter::Semicolon,
        Delimiter::Tab,
        Delimiter::Whitespace,
    ];

    /// Single-byte separator for the table reader. Whitespace runs have none.
    fn byte(self) -> Option<u8> {
        match self {
            Delimiter::Comma => Some(b','),
            Delimiter::Semicolon => Some(b';'),
            Delimiter::Tab => Some(b'\t'),
            Delimiter::Whitespace => None,
        }
    }

    /// Non-empty trimmed fields of `line`.
    fn fields(self, line: &str) -> Vec<&str> {
        match self.byte() {
            Some(b) => line
                .split(char::from(b))
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .collect(),
            None => line.split_whitespace().collect(),
        }
    }

    /// Whether the first field of `line` is a number.
    fn starts_with_number(self, line: &str) -> bool {
        self.fields(line)
            .first()
            .is_some_and(|tok| parse_strict(tok).is_some())
    }

    /// Mean fraction of strictly numeric fields per sampled line.
    fn score(self, sample: &[&str]) -> f64 {
        if sample.is_empty() {
            return 0.0;
        }
        let total: f64 = sample
            .iter()
            .map(|line| {
                let fields = self.fields(line);
                if fields.len() < 2 {
                    return 0.0;
                }
                let numeric = fields.iter().filter(|f| parse_strict(f).is_some()).count();
                numeric as f64 / fields.len() as f64
            })
            .sum();
        total / sample.len() as f64
    }
}

/// Pick the delimiter that splits the data into the most numeric fields.
///
/// Scoring looks at up to 20 lines from the first line that starts with a
/// number under any delimiter, so a long preamble does not hide the data.
/// Returns `None` when no candidate splits any sampled line into numbers.
pub fn sniff_delimiter(lines: &[&str]) -> Option<Delimiter> {
    let start = lines
        .iter()
        .position(|line| Delimiter::PRIORITY.iter().any(|d| d.starts_with_number(line)))
        .unwrap_or(lines.len());
    let sample = &lines[start..lines.len().min(start + SNIFF_LINES)];

    let mut best: Option<(Delimiter, f64)> = None;
    for candidate in Delimiter::PRIORITY {
        let score = candidate.score(sample);
        if score > 0.0 && best.map_or(true, |(_, s)| score > s) {
            best = Some((candidate, score));
        }
    }

    match best {
        Some((delimiter, score)) => {
            debug!("sniffed delimiter {delimiter:?} (score {score:.2}) from line {start}");
            Some(delimiter)
        }
        None => {
            debug!("delimiter sniffing inconclusive");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Generic delimited parser
// ---------------------------------------------------------------------------

type Attempt = fn(&[&str], Delimiter) -> Option<Vec<(f64, f64)>>;

/// Parser attempts in order; the first non-empty result wins.
const ATTEMPTS: [(&str, Attempt); 3] = [
    ("table", parse_table),
    ("whitespace tokens", parse_whitespace_tokens),
    ("comma tokens", parse_comma_tokens),
];

/// Parse loosely structured delimited text into raw (frequency, amplitude) pairs.
///
/// The sniffed delimiter is tried first, then the remaining ones in priority
/// order; the first delimiter that yields rows wins.
pub fn parse_delimited(text: &str) -> Vec<(f64, f64)> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let sniffed = sniff_delimiter(&lines);

    let candidates = sniffed
        .into_iter()
        .chain(Delimiter::PRIORITY.into_iter().filter(|&d| Some(d) != sniffed));
    for delimiter in candidates {
        let rows = parse_with(&lines, delimiter);
        if !rows.is_empty() {
            return rows;
        }
        debug!("no rows with delimiter {delimiter:?}");
    }
    Vec::new()
}

/// Skip leading lines until one starts with a number under `delimiter`, then
/// run the parser attempts on the remaining block.
fn parse_with(lines: &[&str], delimiter: Delimiter) -> Vec<(f64, f64)> {
    let start = lines
        .iter()
        .position(|line| delimiter.starts_with_number(line))
        .unwrap_or(lines.len());
    if start > 0 {
        debug!("{delimiter:?}: skipped {start} header/metadata lines");
    }
    let block = &lines[start..];

    for (name, attempt) in ATTEMPTS {
        match attempt(block, delimiter) {
            Some(rows) if !rows.is_empty() => {
                debug!("{name} parser produced {} rows", rows.len());
                return rows;
            }
            _ => debug!("{name} parser produced nothing, trying next"),
        }
    }
    Vec::new()
}

/// Read the block as a headerless table: column 0 is frequency, the
/// amplitude column is whichever of columns 1..=5 is most often numeric.
/// Whitespace-separated blocks are split per line into records.
fn parse_table(block: &[&str], delimiter: Delimiter) -> Option<Vec<(f64, f64)>> {
    let records = match delimiter.byte() {
        Some(byte) => {
            let joined = block.join("\n");
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .delimiter(byte)
                .trim(csv::Trim::All)
                .from_reader(joined.as_bytes());

            match reader.records().collect::<Result<Vec<_>, _>>() {
                Ok(records) => records,
                Err(e) => {
                    debug!("table read failed: {e}");
                    return None;
                }
            }
        }
        None => block
            .iter()
            .map(|line| csv::StringRecord::from(line.split_whitespace().collect::<Vec<_>>()))
            .collect(),
    };
    let columns = records.iter().map(|r| r.len()).max().unwrap_or(0);
    if columns < 2 {
        return None;
    }

    let amplitude_column = amplitude_column(&records, columns);
    debug!("table has {columns} columns, amplitude in column {amplitude_column}");

    let rows = records
        .iter()
        .filter_map(|r| {
            let freq = r.get(0).and_then(parse_number)?;
            let amp = r.get(amplitude_column).and_then(parse_number)?;
            Some((freq, amp))
        })
        .collect();
    Some(rows)
}

/// Column among 1..=5 with the highest strictly numeric fraction, lowest
/// index on ties. Strict parsing keeps labels such as `ch1` out of the race.
fn amplitude_column(records: &[csv::StringRecord], columns: usize) -> usize {
    let last = (columns - 1).min(MAX_AMPLITUDE_COLUMN);
    let mut best = (1, -1.0);
    for column in 1..=last {
        let numeric = records
            .iter()
            .filter(|r| r.get(column).and_then(parse_strict).is_some())
            .count();
        let fraction = numeric as f64 / records.len().max(1) as f64;
        if fraction > best.1 {
            best = (column, fraction);
        }
    }
    best.0
}

fn parse_whitespace_tokens(block: &[&str], _: Delimiter) -> Option<Vec<(f64, f64)>> {
    Some(first_two_per_line(block, whitespace_tokens))
}

fn parse_comma_tokens(block: &[&str], _: Delimiter) -> Option<Vec<(f64, f64)>> {
    Some(first_two_per_line(block, comma_tokens))
}

fn whitespace_tokens(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

fn comma_tokens(line: &str) -> Vec<&str> {
    line.split(',').collect()
}

fn first_two_per_line(block: &[&str], tokenize: fn(&str) -> Vec<&str>) -> Vec<(f64, f64)> {
    block
        .iter()
        .filter_map(|&line| {
            let mut numbers = tokenize(line).into_iter().filter_map(parse_number);
            Some((numbers.next()?, numbers.next()?))
        })
        .collect()
}
