use std::path::Path;

use log::{debug, info};

use super::decode::decode;
use super::delimited::parse_delimited;
use super::error::LoadError;
use super::fixed::parse_fixed_column;
use super::model::{FormatHint, Trace, TracePoint, UnitPolicy};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a trace from raw bytes with an explicit parser family.
///
/// Stages: decode → parse → unit normalization → drop incomplete rows and
/// sort. Rows that fail to parse are dropped; only a file with no valid row
/// at all is an error.
pub fn load(bytes: &[u8], hint: FormatHint, unit_policy: UnitPolicy) -> Result<Trace, LoadError> {
    let (text, encoding) = decode(bytes)?;

    let raw = match hint {
        FormatHint::FixedColumn => parse_fixed_column(&text),
        FormatHint::Delimited => parse_delimited(&text),
    };

    let divisor = unit_policy.divisor(raw.iter().map(|&(freq, _)| freq));
    debug!("unit policy {unit_policy}: dividing frequencies by {divisor}");

    let points: Vec<TracePoint> = raw
        .into_iter()
        .map(|(freq, amp)| TracePoint::new(freq / divisor, amp))
        .filter(|p| p.frequency_mhz.is_finite() && p.amplitude_db.is_finite())
        .collect();

    let trace = Trace::from_points(points).ok_or(LoadError::EmptyResult)?;
    let (lo, hi) = trace.domain();
    info!(
        "loaded {} points ({hint}, {encoding:?}), {lo} to {hi} MHz",
        trace.len()
    );
    Ok(trace)
}

/// Load a trace, choosing the parser family from the file name.
pub fn load_named(bytes: &[u8], filename: &str, unit_policy: UnitPolicy) -> Result<Trace, LoadError> {
    let hint = FormatHint::from_filename(filename)
        .ok_or_else(|| LoadError::UnsupportedFormat(filename.to_string()))?;
    load(bytes, hint, unit_policy)
}

/// Read and load a file from disk. An explicit `hint` overrides the extension.
pub fn load_file(
    path: &Path,
    hint: Option<FormatHint>,
    unit_policy: UnitPolicy,
) -> Result<Trace, LoadError> {
    let bytes = std::fs::read(path)?;
    match hint {
        Some(hint) => load(&bytes, hint, unit_policy),
        None => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_else(|| path.to_string_lossy());
            load_named(&bytes, &name, unit_policy)
        }
    }
}
