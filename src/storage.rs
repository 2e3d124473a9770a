//! Spectral CSV output.
//!
//! One measurement becomes a two-row file: wavelengths on the first row,
//! intensities on the second, matching column for column.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::{Cs2000Error, Result};

/// First sampled wavelength, in nanometres.
pub const WAVELENGTH_START_NM: u16 = 380;
/// Last sampled wavelength, in nanometres.
pub const WAVELENGTH_END_NM: u16 = 780;
/// Samples per spectrum, one per integer wavelength.
pub const SPECTRAL_SAMPLES: usize = 401;

const FILE_NAME: &str = "spectral.csv";

/// The sampled wavelengths: 380 nm to 780 nm in 1 nm steps.
pub fn wavelengths() -> impl Iterator<Item = u16> {
    WAVELENGTH_START_NM..=WAVELENGTH_END_NM
}

/// Write `intensities` alongside their wavelengths to
/// `<output_dir>/spectral.csv`, creating the directory if absent.
///
/// Nothing is written unless the spectrum holds exactly
/// [`SPECTRAL_SAMPLES`] values.
pub fn save_spectrum(output_dir: &Path, intensities: &[f64]) -> Result<PathBuf> {
    if intensities.len() != SPECTRAL_SAMPLES {
        return Err(Cs2000Error::ShapeMismatch {
            expected: SPECTRAL_SAMPLES,
            actual: intensities.len(),
        });
    }

    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(FILE_NAME);

    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(wavelengths().map(|nm| nm.to_string()))?;
    writer.write_record(intensities.iter().map(|v| v.to_string()))?;
    writer.flush()?;

    info!("Spectral data saved to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_two_aligned_rows() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("capture");
        let intensities: Vec<f64> = (0..SPECTRAL_SAMPLES).map(|i| i as f64 * 0.5).collect();

        let path = save_spectrum(&out, &intensities).unwrap();

        let contents = fs::read_to_string(path).unwrap();
        let rows: Vec<&str> = contents.lines().collect();
        assert_eq!(rows.len(), 2);

        let header: Vec<&str> = rows[0].split(',').collect();
        assert_eq!(header.len(), SPECTRAL_SAMPLES);
        assert_eq!(header.first().copied(), Some("380"));
        assert_eq!(header.last().copied(), Some("780"));

        let values: Vec<f64> = rows[1].split(',').map(|v| v.parse().unwrap()).collect();
        assert_eq!(values, intensities);
    }

    #[test]
    fn rejects_short_spectrum_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("capture");
        let intensities = vec![0.0; SPECTRAL_SAMPLES - 1];

        let err = save_spectrum(&out, &intensities).unwrap_err();

        assert!(matches!(
            err,
            Cs2000Error::ShapeMismatch {
                expected: 401,
                actual: 400
            }
        ));
        assert!(!out.exists());
    }
}
