//! Writes a synthetic pair of S21 measurement files for trying the tool:
//!
//! * `sample_aut_ref.result` – fixed-column instrument log, frequencies in Hz
//! * `sample_ref_ref.csv`    – VNA tabular export with a 3-line preamble
//!
//! The AUT is modelled as a patch with a resonance near 915 MHz; the
//! reference pair as two dipoles with a smooth path loss.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

const START_HZ: f64 = 800.0e6;
const STOP_HZ: f64 = 1000.0e6;
const POINTS: usize = 201;

/// Free-space path loss in dB at distance `d_m` metres.
fn path_loss_db(freq_hz: f64, d_m: f64) -> f64 {
    let c = 299_792_458.0;
    20.0 * (4.0 * std::f64::consts::PI * d_m * freq_hz / c).log10()
}

/// Lorentzian-shaped realized gain of a resonant antenna, in dBi.
fn resonant_gain_dbi(freq_hz: f64, peak_dbi: f64, f0_hz: f64, bw_hz: f64) -> f64 {
    let x = (freq_hz - f0_hz) / (bw_hz / 2.0);
    peak_dbi - 10.0 * (1.0 + x * x).log10()
}

/// Small deterministic ripple standing in for measurement noise.
fn ripple_db(i: usize, phase: f64) -> f64 {
    0.15 * (i as f64 * 0.7 + phase).sin() + 0.05 * (i as f64 * 2.3).cos()
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let dipole_dbi = 2.15;
    let distance_m = 3.0;
    let step = (STOP_HZ - START_HZ) / (POINTS - 1) as f64;

    let aut_path = out_dir.join("sample_aut_ref.result");
    let mut aut = BufWriter::new(
        File::create(&aut_path).with_context(|| format!("creating {}", aut_path.display()))?,
    );
    let ref_path = out_dir.join("sample_ref_ref.csv");
    let mut reference = BufWriter::new(
        File::create(&ref_path).with_context(|| format!("creating {}", ref_path.display()))?,
    );

    writeln!(reference, "!Synthetic VNA export")?;
    writeln!(reference, "!S21 between two reference dipoles")?;
    writeln!(reference, "Freq(Hz),S21 Log Mag(dB),S21 Phase(deg)")?;

    for i in 0..POINTS {
        let f = START_HZ + step * i as f64;
        let loss = path_loss_db(f, distance_m);

        let aut_gain = resonant_gain_dbi(f, 6.5, 915.0e6, 60.0e6);
        let s21_aut_ref = dipole_dbi + aut_gain - loss + ripple_db(i, 0.0);
        let s21_ref_ref = 2.0 * dipole_dbi - loss + ripple_db(i, 1.3);

        writeln!(
            aut,
            "{f:.0} 0 {s21_aut_ref:.4} 0 V 0 2024-01-01T00:{:02}:{:02}",
            i / 60,
            i % 60
        )?;
        writeln!(reference, "{f:+.8E},{s21_ref_ref:+.8E},+0.00000000E+00")?;
    }

    aut.flush()?;
    reference.flush()?;

    println!("Wrote {} points to:", POINTS);
    println!("  {}", aut_path.display());
    println!("  {}", ref_path.display());
    println!(
        "Try: antenna-gain --aut-ref {} --ref-ref {} --center-freq 915",
        aut_path.display(),
        ref_path.display()
    );
    Ok(())
}
