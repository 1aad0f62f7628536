//! # antenna-gain
//!
//! Computes antenna gain by the substitution method from two S21 files.
//!
//! ```bash
//! # VNA exports in Hz, dipole reference, gain at 915 MHz
//! antenna-gain --aut-ref AUT_REF.result --ref-ref REF_REF.csv --center-freq 915
//!
//! # Frequencies already in MHz, uniform overlap grid, CSV export
//! antenna-gain --aut-ref a.csv --ref-ref r.csv --freq-in-mhz --center-freq 2450 \
//!     --grid overlap --output ganho_aut.csv
//! ```

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use antenna_gain::config::{Config, GridName};
use antenna_gain::data::FormatHint;
use antenna_gain::export::write_gain_csv;
use antenna_gain::gain::{
    CenterGain, GridMode, DEFAULT_OVERLAP_POINTS, DEFAULT_REFERENCE_GAIN_DBI,
};
use antenna_gain::session::{self, CalculationRequest, InputFile};

/// Antenna gain calculation by the substitution method
#[derive(Parser)]
#[command(name = "antenna-gain")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// S21 file between the reference antenna and the antenna under test
    #[arg(long, value_name = "FILE")]
    aut_ref: PathBuf,

    /// S21 file between two reference antennas
    #[arg(long, value_name = "FILE")]
    ref_ref: PathBuf,

    /// Known gain of the reference antenna in dBi [default: 2.15]
    #[arg(short = 'g', long)]
    reference_gain: Option<f64>,

    /// Center frequency for the scalar gain, in MHz
    #[arg(short = 'f', long)]
    center_freq: Option<f64>,

    /// Frequencies in the files are already in MHz (default: Hz)
    #[arg(long, conflicts_with_all = ["auto_units", "freq_in_hz"])]
    freq_in_mhz: bool,

    /// Frequencies in the files are in Hz, even if the config says MHz
    #[arg(long, conflicts_with = "auto_units")]
    freq_in_hz: bool,

    /// Guess Hz or MHz per file from the magnitude of its frequencies
    #[arg(long)]
    auto_units: bool,

    /// Evaluation grid [default: aut]
    #[arg(long, value_enum)]
    grid: Option<GridName>,

    /// Number of points of the overlap grid [default: 1000]
    #[arg(long)]
    points: Option<usize>,

    /// Parser for the AUT/REF file (default: from extension)
    #[arg(long, value_enum)]
    aut_format: Option<FormatArg>,

    /// Parser for the REF/REF file (default: from extension)
    #[arg(long, value_enum)]
    ref_format: Option<FormatArg>,

    /// Write the gain curve to this CSV file
    #[arg(short, long, value_name = "CSV")]
    output: Option<PathBuf>,

    /// Print the full report (traces and gain curve) as JSON
    #[arg(long)]
    json: bool,

    /// TOML file with default calculation settings
    #[arg(short, long, value_name = "TOML")]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Whitespace-separated 7-column instrument log
    Result,
    /// Delimited text (comma, semicolon, tab or whitespace)
    Delimited,
}

impl From<FormatArg> for FormatHint {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Result => FormatHint::FixedColumn,
            FormatArg::Delimited => FormatHint::Delimited,
        }
    }
}

fn read_input(path: &Path, format: Option<FormatArg>) -> Result<InputFile> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let input = InputFile::new(name, bytes);
    Ok(match format {
        Some(format) => input.with_hint(format.into()),
        None => input,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let defaults = &config.calculation;

    let Some(center_freq_mhz) = cli.center_freq.or(defaults.center_freq_mhz) else {
        bail!("No center frequency given (use --center-freq or center_freq_mhz in the config)");
    };
    let reference_gain_dbi = cli
        .reference_gain
        .or(defaults.reference_gain_dbi)
        .unwrap_or(DEFAULT_REFERENCE_GAIN_DBI);

    let mhz_override = match (cli.freq_in_mhz, cli.freq_in_hz) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };
    let unit_policy = defaults.unit_policy(mhz_override, cli.auto_units);

    let grid = match cli.grid.or(defaults.grid).unwrap_or(GridName::Aut) {
        GridName::Aut => GridMode::AutAxis,
        GridName::Overlap => GridMode::Overlap {
            points: cli
                .points
                .or(defaults.overlap_points)
                .unwrap_or(DEFAULT_OVERLAP_POINTS),
        },
        GridName::Matched => GridMode::Matched,
    };

    let request = CalculationRequest {
        aut_ref: read_input(&cli.aut_ref, cli.aut_format)?,
        ref_ref: read_input(&cli.ref_ref, cli.ref_format)?,
        reference_gain_dbi,
        center_freq_mhz,
        unit_policy,
        grid,
    };
    info!("frequency unit policy: {unit_policy}, grid: {grid:?}");

    let report = session::run(&request).context("Gain calculation failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serializing report")?
        );
    } else {
        println!("AUT/REF points:      {}", report.aut_ref.len());
        println!("REF/REF points:      {}", report.ref_ref.len());
        println!("Reference gain:      {reference_gain_dbi} dBi");
        println!("Gain curve points:   {}", report.gain.curve.len());
        match &report.gain.center {
            CenterGain::Value(g) => {
                println!("Gain at {center_freq_mhz} MHz: {g:.3} dBi");
            }
            CenterGain::OutOfRange(w) => {
                println!("Gain at {center_freq_mhz} MHz: n/a ({w})");
            }
        }
    }

    if let Some(path) = &cli.output {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_gain_csv(BufWriter::new(file), &report.gain.curve)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("gain curve written to {}", path.display());
    }

    Ok(())
}
