//! Integration tests for antenna-gain
//!
//! These tests exercise the full pipeline from files on disk to the exported
//! gain curve.

use std::fs;

use antenna_gain::data::{load_file, FormatHint, LoadError, TracePoint, UnitPolicy};
use antenna_gain::export::{gain_csv_bytes, write_gain_csv};
use antenna_gain::gain::{compute_gain, CenterGain, GainPoint, GridMode};
use antenna_gain::session::{self, CalculationRequest, InputFile};
use tempfile::tempdir;

const AUT_REF_RESULT: &str = "\
100000000 0 -30.0 0 H 0 2024-05-02T10:00:00
200000000 0 -32.0 0 H 0 2024-05-02T10:00:01
";

const REF_REF_CSV: &str = "\
!Agilent Technologies,E5071C,MY46100000,A.09.10
!Date: Thursday, May 02, 2024 10:00:00
Freq(Hz),S21 Log Mag(dB),S21 Phase(deg)
+1.00000000E+08,-1.00000000E+01,+0.00000000E+00
+2.00000000E+08,-1.10000000E+01,+0.00000000E+00
";

fn utf16le_with_bom(text: &str) -> Vec<u8> {
    let mut out = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

/// The worked example from measurement files of both shapes.
#[test]
fn test_end_to_end_from_files() {
    let dir = tempdir().unwrap();
    let aut_path = dir.path().join("AUT_REF.result");
    let ref_path = dir.path().join("REF_REF.csv");
    fs::write(&aut_path, AUT_REF_RESULT).unwrap();
    fs::write(&ref_path, REF_REF_CSV).unwrap();

    let aut = load_file(&aut_path, None, UnitPolicy::Hertz).unwrap();
    let reference = load_file(&ref_path, None, UnitPolicy::Hertz).unwrap();

    let result = compute_gain(&aut, &reference, 8.0, 150.0, GridMode::AutAxis).unwrap();
    assert_eq!(
        result.curve,
        vec![
            GainPoint { frequency_mhz: 100.0, gain_dbi: -12.0 },
            GainPoint { frequency_mhz: 200.0, gain_dbi: -13.0 },
        ]
    );
    assert_eq!(result.center, CenterGain::Value(-12.5));
}

/// N well-formed lines give N sorted points; the garbage line is dropped.
#[test]
fn test_fixed_column_counts_and_order() {
    let mut text = String::new();
    for i in (0..50).rev() {
        let f = 800_000_000 + i * 1_000_000;
        text.push_str(&format!("{f} 0 -{}.5 90 V 0 2024-05-02T10:00:{:02}\n", 20 + i % 7, i % 60));
        if i == 25 {
            text.push_str("abc def ghi\n");
        }
    }

    let dir = tempdir().unwrap();
    let path = dir.path().join("sweep.result");
    fs::write(&path, &text).unwrap();

    let trace = load_file(&path, None, UnitPolicy::Hertz).unwrap();
    assert_eq!(trace.len(), 50);
    let freqs: Vec<f64> = trace.frequencies().collect();
    assert!(freqs.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(trace.domain(), (800.0, 849.0));
}

/// Exported curve re-imports through the generic delimited path unchanged.
#[test]
fn test_export_round_trip() {
    let curve: Vec<GainPoint> = (0..25)
        .map(|i| GainPoint {
            frequency_mhz: 2400.0 + i as f64 * 3.7,
            gain_dbi: 5.0 - (i as f64 * 0.37).sin() * 1.123_456_789,
        })
        .collect();

    let dir = tempdir().unwrap();
    let path = dir.path().join("ganho_aut.csv");
    write_gain_csv(fs::File::create(&path).unwrap(), &curve).unwrap();

    let trace = load_file(&path, None, UnitPolicy::Megahertz).unwrap();
    assert_eq!(trace.len(), curve.len());
    for (p, g) in trace.points().iter().zip(&curve) {
        assert!((p.frequency_mhz - g.frequency_mhz).abs() <= 1e-9 * g.frequency_mhz.abs());
        assert!((p.amplitude_db - g.gain_dbi).abs() <= 1e-9 * (1.0 + g.gain_dbi.abs()));
    }
}

/// UTF-16 export with semicolons and decimal commas.
#[test]
fn test_utf16_semicolon_decimal_comma() {
    let text = "Frequência (MHz);S21 (dB)\r\n433,92;-41,5\r\n868,3;-47,25\r\n";
    let dir = tempdir().unwrap();
    let path = dir.path().join("export.txt");
    fs::write(&path, utf16le_with_bom(text)).unwrap();

    let trace = load_file(&path, None, UnitPolicy::Megahertz).unwrap();
    assert_eq!(
        trace.points(),
        &[TracePoint::new(433.92, -41.5), TracePoint::new(868.3, -47.25)]
    );
}

/// Latin-1 preamble, tab separated, amplitude in the third column.
#[test]
fn test_latin1_tab_separated_multi_column() {
    let mut bytes = b"Medi\xE7\xE3o S21\n".to_vec();
    bytes.extend_from_slice(b"915000000\tport2\t-35.5\t12.0\n");
    bytes.extend_from_slice(b"916000000\tport2\t-35.75\t12.5\n");

    let dir = tempdir().unwrap();
    let path = dir.path().join("medicao.dat");
    fs::write(&path, bytes).unwrap();

    let trace = load_file(&path, None, UnitPolicy::Hertz).unwrap();
    assert_eq!(
        trace.points(),
        &[TracePoint::new(915.0, -35.5), TracePoint::new(916.0, -35.75)]
    );
}

/// An explicit hint lets a fixed-column log with an odd extension through.
#[test]
fn test_hint_overrides_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("AUT_REF.log");
    fs::write(&path, AUT_REF_RESULT).unwrap();

    assert!(matches!(
        load_file(&path, None, UnitPolicy::Hertz),
        Err(LoadError::UnsupportedFormat(_))
    ));
    let trace = load_file(&path, Some(FormatHint::FixedColumn), UnitPolicy::Hertz).unwrap();
    assert_eq!(trace.len(), 2);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = load_file(&dir.path().join("nope.csv"), None, UnitPolicy::Hertz).unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}

/// Session over the two files with an overlap grid and CSV bytes out.
#[test]
fn test_session_overlap_grid_export() {
    let request = CalculationRequest {
        aut_ref: InputFile::new("AUT_REF.result", AUT_REF_RESULT.as_bytes().to_vec()),
        ref_ref: InputFile::new("REF_REF.csv", REF_REF_CSV.as_bytes().to_vec()),
        reference_gain_dbi: 8.0,
        center_freq_mhz: 250.0,
        unit_policy: UnitPolicy::Hertz,
        grid: GridMode::Overlap { points: 3 },
    };
    let report = session::run(&request).unwrap();

    assert_eq!(report.gain.center.value(), None);
    assert!(matches!(report.gain.center, CenterGain::OutOfRange(_)));

    let csv = String::from_utf8(gain_csv_bytes(&report.gain.curve).unwrap()).unwrap();
    assert_eq!(
        csv,
        "Frequência (MHz),Ganho da Antena sob Teste (dBi)\n100,-12\n150,-12.5\n200,-13\n"
    );
}
