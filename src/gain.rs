//! Substitution-method gain calculation.
//!
//! Both S21 traces are resampled onto a common frequency grid by linear
//! interpolation and the AUT gain follows as
//! `G_aut = G_ref + (S21_aut_ref − S21_ref_ref)` at every grid point.

use log::{debug, warn};
use serde::Serialize;

use crate::data::{Trace, TracePoint};

/// Gain of a half-wave dipole, the usual reference antenna.
pub const DEFAULT_REFERENCE_GAIN_DBI: f64 = 2.15;

/// Resolution of the uniform overlap grid.
pub const DEFAULT_OVERLAP_POINTS: usize = 1000;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Frequency grid the gain curve is evaluated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridMode {
    /// The AUT/REF trace's own sample frequencies.
    #[default]
    AutAxis,
    /// `points` uniformly spaced frequencies spanning the overlap of both traces.
    Overlap { points: usize },
    /// Only frequencies present in both traces, no interpolation.
    Matched,
}

/// One point of the gain curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GainPoint {
    pub frequency_mhz: f64,
    pub gain_dbi: f64,
}

/// The center frequency fell outside one of the traces; no value is reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, thiserror::Error)]
#[error(
    "center frequency {center_freq_mhz} MHz is outside the measured range \
     (AUT/REF {aut_domain_mhz:?} MHz, REF/REF {reference_domain_mhz:?} MHz)"
)]
pub struct OutOfRangeWarning {
    pub center_freq_mhz: f64,
    pub aut_domain_mhz: (f64, f64),
    pub reference_domain_mhz: (f64, f64),
}

/// Gain at the requested center frequency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CenterGain {
    Value(f64),
    OutOfRange(OutOfRangeWarning),
}

impl CenterGain {
    pub fn value(&self) -> Option<f64> {
        match self {
            CenterGain::Value(v) => Some(*v),
            CenterGain::OutOfRange(_) => None,
        }
    }
}

/// Output of [`compute_gain`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GainResult {
    pub reference_gain_dbi: f64,
    pub curve: Vec<GainPoint>,
    pub center: CenterGain,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GainError {
    #[error("the two traces do not overlap in frequency")]
    NoOverlap,

    #[error("the two traces share no identical frequency")]
    NoCommonFrequencies,

    #[error("overlap grid needs at least 2 points, got {0}")]
    InvalidResolution(usize),
}

// ---------------------------------------------------------------------------
// Interpolation
// ---------------------------------------------------------------------------

/// Linear interpolation of a trace's amplitude at `frequency_mhz`.
///
/// Outside the domain the nearest boundary value is returned. On an exact
/// hit of a repeated frequency the first occurrence wins; between samples
/// the blend uses the last sample below and the first sample above.
pub fn interpolate(trace: &Trace, frequency_mhz: f64) -> f64 {
    let points = trace.points();
    let idx = points.partition_point(|p| p.frequency_mhz < frequency_mhz);

    if idx == points.len() {
        let last = points[points.len() - 1].frequency_mhz;
        let first_of_last = points.partition_point(|p| p.frequency_mhz < last);
        return points[first_of_last].amplitude_db;
    }
    if idx == 0 || points[idx].frequency_mhz == frequency_mhz {
        return points[idx].amplitude_db;
    }

    lerp(&points[idx - 1], &points[idx], frequency_mhz)
}

fn lerp(lo: &TracePoint, hi: &TracePoint, x: f64) -> f64 {
    let t = (x - lo.frequency_mhz) / (hi.frequency_mhz - lo.frequency_mhz);
    lo.amplitude_db + t * (hi.amplitude_db - lo.amplitude_db)
}

// ---------------------------------------------------------------------------
// Gain
// ---------------------------------------------------------------------------

/// Compute the AUT gain curve and its value at `center_freq_mhz`.
///
/// `aut` is the S21 between the reference antenna and the AUT, `reference`
/// the S21 between two reference antennas.
pub fn compute_gain(
    aut: &Trace,
    reference: &Trace,
    reference_gain_dbi: f64,
    center_freq_mhz: f64,
    grid: GridMode,
) -> Result<GainResult, GainError> {
    let gain = |a: f64, r: f64| reference_gain_dbi + (a - r);

    let curve: Vec<GainPoint> = match grid {
        GridMode::AutAxis => aut
            .points()
            .iter()
            .map(|p| GainPoint {
                frequency_mhz: p.frequency_mhz,
                gain_dbi: gain(p.amplitude_db, interpolate(reference, p.frequency_mhz)),
            })
            .collect(),
        GridMode::Overlap { points } => overlap_grid(aut, reference, points)?
            .into_iter()
            .map(|f| GainPoint {
                frequency_mhz: f,
                gain_dbi: gain(interpolate(aut, f), interpolate(reference, f)),
            })
            .collect(),
        GridMode::Matched => {
            let curve: Vec<GainPoint> = aut
                .points()
                .iter()
                .filter_map(|p| {
                    let r = exact_match(reference, p.frequency_mhz)?;
                    Some(GainPoint {
                        frequency_mhz: p.frequency_mhz,
                        gain_dbi: gain(p.amplitude_db, r),
                    })
                })
                .collect();
            if curve.is_empty() {
                return Err(GainError::NoCommonFrequencies);
            }
            curve
        }
    };
    debug!("gain curve: {} points on {grid:?} grid", curve.len());

    let center = if aut.covers(center_freq_mhz) && reference.covers(center_freq_mhz) {
        CenterGain::Value(gain(
            interpolate(aut, center_freq_mhz),
            interpolate(reference, center_freq_mhz),
        ))
    } else {
        let warning = OutOfRangeWarning {
            center_freq_mhz,
            aut_domain_mhz: aut.domain(),
            reference_domain_mhz: reference.domain(),
        };
        warn!("{warning}");
        CenterGain::OutOfRange(warning)
    };

    Ok(GainResult {
        reference_gain_dbi,
        curve,
        center,
    })
}

/// `points` uniformly spaced frequencies over `[max(mins), min(maxes)]`.
fn overlap_grid(aut: &Trace, reference: &Trace, points: usize) -> Result<Vec<f64>, GainError> {
    if points < 2 {
        return Err(GainError::InvalidResolution(points));
    }
    let (aut_lo, aut_hi) = aut.domain();
    let (ref_lo, ref_hi) = reference.domain();
    let lo = aut_lo.max(ref_lo);
    let hi = aut_hi.min(ref_hi);
    if lo > hi {
        return Err(GainError::NoOverlap);
    }

    let step = (hi - lo) / (points - 1) as f64;
    let mut grid: Vec<f64> = (0..points).map(|i| lo + step * i as f64).collect();
    // Pin the end point against accumulated rounding.
    grid[points - 1] = hi;
    Ok(grid)
}

/// Amplitude of the first sample at exactly `frequency_mhz`.
fn exact_match(trace: &Trace, frequency_mhz: f64) -> Option<f64> {
    let points = trace.points();
    let idx = points.partition_point(|p| p.frequency_mhz < frequency_mhz);
    points
        .get(idx)
        .filter(|p| p.frequency_mhz == frequency_mhz)
        .map(|p| p.amplitude_db)
}
