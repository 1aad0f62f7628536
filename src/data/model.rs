use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// TracePoint – one (frequency, amplitude) sample
// ---------------------------------------------------------------------------

/// A single S21 sample after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TracePoint {
    /// Frequency in MHz, whatever unit the source file used.
    pub frequency_mhz: f64,
    /// Transmission amplitude in dB.
    pub amplitude_db: f64,
}

impl TracePoint {
    pub fn new(frequency_mhz: f64, amplitude_db: f64) -> Self {
        Self {
            frequency_mhz,
            amplitude_db,
        }
    }
}

// ---------------------------------------------------------------------------
// Trace – the canonical loaded series
// ---------------------------------------------------------------------------

/// A non-empty series of samples sorted ascending by frequency.
///
/// Duplicate frequencies are kept in the order they appeared in the source
/// file; nothing is de-duplicated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    points: Vec<TracePoint>,
}

impl Trace {
    /// Build a trace from unsorted points. Returns `None` when `points` is empty.
    ///
    /// The sort is stable, so equal frequencies keep their input order.
    pub fn from_points(mut points: Vec<TracePoint>) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        points.sort_by(|a, b| a.frequency_mhz.total_cmp(&b.frequency_mhz));
        Some(Trace { points })
    }

    pub fn points(&self) -> &[TracePoint] {
        &self.points
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Frequency domain `[min, max]` in MHz.
    pub fn domain(&self) -> (f64, f64) {
        // Non-empty and sorted by construction.
        let first = self.points[0].frequency_mhz;
        let last = self.points[self.points.len() - 1].frequency_mhz;
        (first, last)
    }

    /// Whether `frequency_mhz` lies inside the closed frequency domain.
    pub fn covers(&self, frequency_mhz: f64) -> bool {
        let (lo, hi) = self.domain();
        frequency_mhz >= lo && frequency_mhz <= hi
    }

    pub fn frequencies(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.frequency_mhz)
    }
}

// ---------------------------------------------------------------------------
// UnitPolicy – how raw frequency values map to MHz
// ---------------------------------------------------------------------------

/// Frequency unit interpretation, resolved once per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitPolicy {
    /// Source values are in Hz and get divided by 1e6.
    #[default]
    Hertz,
    /// Source values are already in MHz.
    Megahertz,
    /// Decide from magnitude: Hz when the largest |frequency| reaches
    /// [`AUTO_HZ_THRESHOLD`], MHz otherwise.
    Auto,
}

/// Largest frequency at or above which `UnitPolicy::Auto` assumes Hz.
pub const AUTO_HZ_THRESHOLD: f64 = 1.0e5;

impl UnitPolicy {
    /// Map the "frequency already in MHz" checkbox onto a policy.
    pub fn from_mhz_flag(already_mhz: bool) -> Self {
        if already_mhz {
            UnitPolicy::Megahertz
        } else {
            UnitPolicy::Hertz
        }
    }

    /// Divisor to apply to every raw frequency of a file.
    pub fn divisor(self, raw_frequencies: impl Iterator<Item = f64>) -> f64 {
        match self {
            UnitPolicy::Hertz => 1.0e6,
            UnitPolicy::Megahertz => 1.0,
            UnitPolicy::Auto => {
                let peak = raw_frequencies.map(f64::abs).fold(0.0, f64::max);
                if peak >= AUTO_HZ_THRESHOLD {
                    1.0e6
                } else {
                    1.0
                }
            }
        }
    }
}

impl fmt::Display for UnitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitPolicy::Hertz => write!(f, "Hz"),
            UnitPolicy::Megahertz => write!(f, "MHz"),
            UnitPolicy::Auto => write!(f, "auto"),
        }
    }
}

// ---------------------------------------------------------------------------
// FormatHint – which parser family handles a file
// ---------------------------------------------------------------------------

/// Parser family for an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatHint {
    /// Whitespace-separated 7-token instrument log (`.result`).
    FixedColumn,
    /// Loosely structured delimited text (`.csv` and friends).
    Delimited,
}

impl FormatHint {
    /// Infer the parser family from a file name. `None` if unrecognized.
    pub fn from_filename(name: &str) -> Option<Self> {
        let ext = name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "result" | "res" => Some(FormatHint::FixedColumn),
            "csv" | "txt" | "tsv" | "dat" | "s21" => Some(FormatHint::Delimited),
            _ => None,
        }
    }
}

impl fmt::Display for FormatHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatHint::FixedColumn => write!(f, "fixed-column"),
            FormatHint::Delimited => write!(f, "delimited"),
        }
    }
}
