//! Two-column CSV export of the gain curve.
//!
//! Downstream tools re-import this file, so the header text, column order,
//! separator and encoding (UTF-8, no BOM) must not change.

use std::io::Write;

use crate::gain::GainPoint;

pub const FREQUENCY_HEADER: &str = "Frequência (MHz)";
pub const GAIN_HEADER: &str = "Ganho da Antena sob Teste (dBi)";

/// Suggested file name for the download.
pub const DEFAULT_EXPORT_NAME: &str = "ganho_aut.csv";

/// Write the gain curve as `frequency,gain` rows under a header row.
pub fn write_gain_csv<W: Write>(writer: W, curve: &[GainPoint]) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record([FREQUENCY_HEADER, GAIN_HEADER])?;
    for point in curve {
        wtr.write_record([point.frequency_mhz.to_string(), point.gain_dbi.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// The export file as bytes, ready to hand to a download surface.
pub fn gain_csv_bytes(curve: &[GainPoint]) -> csv::Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_gain_csv(&mut buf, curve)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_layout() {
        let curve = [
            GainPoint { frequency_mhz: 100.0, gain_dbi: -12.0 },
            GainPoint { frequency_mhz: 150.5, gain_dbi: 2.15 },
        ];
        let bytes = gain_csv_bytes(&curve).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "Frequência (MHz),Ganho da Antena sob Teste (dBi)\n100,-12\n150.5,2.15\n"
        );
    }

    #[test]
    fn test_empty_curve_still_has_header() {
        let bytes = gain_csv_bytes(&[]).unwrap();
        assert_eq!(
            bytes,
            "Frequência (MHz),Ganho da Antena sob Teste (dBi)\n".as_bytes()
        );
    }
}
