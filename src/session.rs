use std::fmt;

use log::{error, info};
use serde::Serialize;

use crate::data::{load, load_named, FormatHint, LoadError, Trace, UnitPolicy};
use crate::gain::{compute_gain, CenterGain, GainError, GainResult, GridMode};

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// One uploaded measurement file: its name and raw bytes.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    pub bytes: Vec<u8>,
    /// Explicit parser family; `None` infers it from `name`.
    pub hint: Option<FormatHint>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: FormatHint) -> Self {
        self.hint = Some(hint);
        self
    }

    fn load(&self, unit_policy: UnitPolicy) -> Result<Trace, LoadError> {
        match self.hint {
            Some(hint) => load(&self.bytes, hint, unit_policy),
            None => load_named(&self.bytes, &self.name, unit_policy),
        }
    }
}

/// Everything a caller supplies for one gain calculation.
#[derive(Debug, Clone)]
pub struct CalculationRequest {
    /// S21 between the reference antenna and the AUT.
    pub aut_ref: InputFile,
    /// S21 between two reference antennas.
    pub ref_ref: InputFile,
    pub reference_gain_dbi: f64,
    pub center_freq_mhz: f64,
    pub unit_policy: UnitPolicy,
    pub grid: GridMode,
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// A file that failed to load, and why.
#[derive(Debug)]
pub struct FileFailure {
    pub file: String,
    pub error: LoadError,
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error processing file {}: {}", self.file, self.error)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CalculationError {
    /// One or both files could not be loaded; no gain was computed.
    #[error("{}", .failures.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Load { failures: Vec<FileFailure> },

    #[error(transparent)]
    Gain(#[from] GainError),
}

/// Result of a successful calculation: both normalized traces and the gain.
#[derive(Debug, Clone, Serialize)]
pub struct CalculationReport {
    pub aut_ref: Trace,
    pub ref_ref: Trace,
    pub gain: GainResult,
}

impl CalculationReport {
    /// One-line summary for a status bar.
    pub fn status_message(&self) -> String {
        match &self.gain.center {
            CenterGain::Value(g) => format!(
                "{} gain points, gain at center frequency: {g:.2} dBi",
                self.gain.curve.len()
            ),
            CenterGain::OutOfRange(w) => {
                format!("{} gain points, {w}", self.gain.curve.len())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Load both files independently, then compute the gain if both succeeded.
///
/// A failure in one file never hides a failure in the other: every failing
/// file is reported.
pub fn run(request: &CalculationRequest) -> Result<CalculationReport, CalculationError> {
    let aut_ref = request.aut_ref.load(request.unit_policy);
    let ref_ref = request.ref_ref.load(request.unit_policy);

    let (aut_ref, ref_ref) = match (aut_ref, ref_ref) {
        (Ok(a), Ok(r)) => (a, r),
        (a, r) => {
            let failures: Vec<FileFailure> = [(&request.aut_ref, a.err()), (&request.ref_ref, r.err())]
                .into_iter()
                .filter_map(|(input, err)| {
                    err.map(|error| FileFailure {
                        file: input.name.clone(),
                        error,
                    })
                })
                .collect();
            for failure in &failures {
                error!("{failure}");
            }
            return Err(CalculationError::Load { failures });
        }
    };

    let gain = compute_gain(
        &aut_ref,
        &ref_ref,
        request.reference_gain_dbi,
        request.center_freq_mhz,
        request.grid,
    )?;

    let report = CalculationReport {
        aut_ref,
        ref_ref,
        gain,
    };
    info!("{}", report.status_message());
    Ok(report)
}
