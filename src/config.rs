//! TOML defaults file for repeated measurements.
//!
//! ```toml
//! # antenna-gain.toml
//! [calculation]
//! reference_gain_dbi = 2.15
//! center_freq_mhz = 915.0
//! frequency_in_mhz = false
//! grid = "overlap"
//! overlap_points = 1000
//! ```
//!
//! Command-line flags take precedence over values from the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::data::UnitPolicy;

/// Root configuration structure.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub calculation: CalculationConfig,
}

/// Grid selection as written in the file or on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GridName {
    Aut,
    Overlap,
    Matched,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalculationConfig {
    /// Known gain of the reference antenna in dBi.
    pub reference_gain_dbi: Option<f64>,

    /// Frequency at which the scalar gain is reported, in MHz.
    pub center_freq_mhz: Option<f64>,

    /// Input frequencies are already in MHz rather than Hz.
    pub frequency_in_mhz: Option<bool>,

    pub grid: Option<GridName>,

    /// Number of points of the overlap grid.
    pub overlap_points: Option<usize>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}

impl CalculationConfig {
    /// Resolve the frequency unit policy. `mhz_override` is the command-line
    /// choice (`Some(true)` for MHz, `Some(false)` for Hz) and beats the file;
    /// `auto` beats both.
    pub fn unit_policy(&self, mhz_override: Option<bool>, auto: bool) -> UnitPolicy {
        if auto {
            return UnitPolicy::Auto;
        }
        UnitPolicy::from_mhz_flag(mhz_override.or(self.frequency_in_mhz).unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [calculation]
            reference_gain_dbi = 8.0
            center_freq_mhz = 915.0
            frequency_in_mhz = true
            grid = "overlap"
            overlap_points = 500
        "#;

        let config = Config::from_toml(toml).unwrap();
        let calc = &config.calculation;
        assert_eq!(calc.reference_gain_dbi, Some(8.0));
        assert_eq!(calc.center_freq_mhz, Some(915.0));
        assert_eq!(calc.frequency_in_mhz, Some(true));
        assert_eq!(calc.grid, Some(GridName::Overlap));
        assert_eq!(calc.overlap_points, Some(500));
    }

    #[test]
    fn test_partial_and_empty_config() {
        let config = Config::from_toml("[calculation]\ncenter_freq_mhz = 433.92\n").unwrap();
        assert_eq!(config.calculation.center_freq_mhz, Some(433.92));
        assert_eq!(config.calculation.grid, None);

        let config = Config::from_toml("").unwrap();
        assert_eq!(config.calculation.reference_gain_dbi, None);
    }

    #[test]
    fn test_unit_policy_command_line_beats_file() {
        let config = Config::from_toml("[calculation]\nfrequency_in_mhz = true\n").unwrap();
        let calc = &config.calculation;
        assert_eq!(calc.unit_policy(None, false), UnitPolicy::Megahertz);
        assert_eq!(calc.unit_policy(Some(false), false), UnitPolicy::Hertz);
        assert_eq!(calc.unit_policy(Some(true), false), UnitPolicy::Megahertz);
        assert_eq!(calc.unit_policy(Some(false), true), UnitPolicy::Auto);

        let calc = CalculationConfig::default();
        assert_eq!(calc.unit_policy(None, false), UnitPolicy::Hertz);
        assert_eq!(calc.unit_policy(Some(true), false), UnitPolicy::Megahertz);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Config::from_toml("[calculation]\nreference_gain = 2.0\n").is_err());
    }
}
