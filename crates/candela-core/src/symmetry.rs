//! Photometric symmetry classification and mirroring.
//!
//! Type C photometry is frequently published for one quadrant (C90) or one
//! half (C180) of the horizontal circle, or for a single plane when the
//! luminaire is radially symmetric (C0). This module recognises those layouts
//! and reflects the published rows so that the `full` grid always spans
//! 0–360° of phi.
//!
//! Reflection about an axis `a` maps a row published at `phi` onto
//! `2a - phi`. The sample on the axis itself is shared and written once:
//!
//! ```text
//! C180:  0 ... 180 | 180 ... 360      (mirror about 180)
//! C90:   0 ... 90 | 90 ... 180        (mirror about 90)
//!                 0 ... 180 | 180 ... 360   (then about 180)
//! ```
//!
//! Type A and B files are classified for reporting but never mirrored.

use ndarray::Axis;

use crate::diagnostics::{Checked, ValidationWarning};
use crate::types::{AngleGrid, GridError, Header, LampRecord, LampType, PhotometricType};

/// Number of integer-degree planes generated for a radially symmetric lamp.
const RADIAL_PLANES: usize = 360;

/// Determine the symmetry class of a file from its header and phi samples.
///
/// Any mismatch between the photometric type and the phi layout produces a
/// warning and [`LampType::Unknown`], which disables mirroring.
pub fn classify(header: &Header, phis: &[f64]) -> Checked<LampType> {
    let photometric_type = header.photometric_type;
    let (first_phi, last_phi) = match (phis.first(), phis.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Checked::new(LampType::Unknown),
    };
    let mismatch = ValidationWarning::SymmetryMismatch {
        photometric_type,
        first_phi,
        last_phi,
    };

    match photometric_type {
        PhotometricType::C => {
            let lamp_type = if first_phi != 0.0 {
                None
            } else if last_phi == 0.0 {
                Some(LampType::C0)
            } else if last_phi == 90.0 {
                Some(LampType::C90)
            } else if last_phi == 180.0 {
                Some(LampType::C180)
            } else if last_phi == 360.0 {
                Some(LampType::C360)
            } else {
                None
            };
            match lamp_type {
                Some(lamp_type) => Checked::new(lamp_type),
                None => Checked::new(LampType::Unknown).warn(mismatch),
            }
        }
        PhotometricType::B | PhotometricType::A => {
            let zero_start = first_phi == 0.0;
            let lamp_type = match (photometric_type, zero_start) {
                _ if last_phi != 90.0 => None,
                _ if first_phi != 0.0 && first_phi != -90.0 => None,
                (PhotometricType::B, true) => Some(LampType::B90),
                (PhotometricType::B, false) => Some(LampType::BMinus90),
                (_, true) => Some(LampType::A90),
                (_, false) => Some(LampType::AMinus90),
            };
            match lamp_type {
                Some(lamp_type) => Checked::new(lamp_type)
                    .warn(ValidationWarning::UnsupportedPhotometry { photometric_type }),
                None => Checked::new(LampType::Unknown).warn(mismatch),
            }
        }
        PhotometricType::Unknown(_) => Checked::new(LampType::Unknown)
            .warn(ValidationWarning::UnsupportedPhotometry { photometric_type }),
    }
}

/// Derive the `full` grid from an `original` grid.
///
/// `original` must hold raw file values: the header multiplier is applied
/// here, exactly once. Classes without a mirroring rule fall back to a
/// multiplied copy of `original`.
pub fn derive_full(
    header: &Header,
    original: &AngleGrid,
    lamp_type: LampType,
) -> Result<AngleGrid, GridError> {
    let mirrored = match lamp_type {
        LampType::C0 => radial(original)?,
        LampType::C90 => reflect(&reflect(original)?)?,
        LampType::C180 => reflect(original)?,
        _ => original.clone(),
    };
    let full = mirrored.scaled(header.multiplier);
    full.validate()?;
    Ok(full)
}

/// Populate `record.full` if it is not already present and return it.
///
/// Idempotent: a second call returns the grid computed by the first, so the
/// multiplier can never be applied twice.
pub fn expand(record: &mut LampRecord) -> Result<&AngleGrid, GridError> {
    let full = match record.full.take() {
        Some(full) => full,
        None => {
            let full = derive_full(&record.header, &record.original, record.lamp_type)?;
            log::debug!(
                "expanded {} ({}): {} -> {} horizontal angles",
                record.source,
                record.lamp_type,
                record.original.num_phis(),
                full.num_phis()
            );
            full
        }
    };
    Ok(record.full.insert(full))
}

impl LampRecord {
    /// See [`expand`].
    pub fn expand(&mut self) -> Result<&AngleGrid, GridError> {
        expand(self)
    }
}

/// Repeat the single published plane at every integer degree of phi.
fn radial(grid: &AngleGrid) -> Result<AngleGrid, GridError> {
    let phis = (0..RADIAL_PLANES).map(|deg| deg as f64).collect();
    let values = grid.values().select(Axis(0), &[0; RADIAL_PLANES]);
    AngleGrid::new(grid.thetas().to_vec(), phis, values)
}

/// Mirror the grid about its last phi sample, which is kept once.
fn reflect(grid: &AngleGrid) -> Result<AngleGrid, GridError> {
    let phis = grid.phis();
    let n = phis.len();
    let axis = phis[n - 1];

    let mirrored_rows: Vec<usize> = (0..n - 1).rev().collect();
    let new_phis = phis
        .iter()
        .copied()
        .chain(mirrored_rows.iter().map(|&i| 2.0 * axis - phis[i]))
        .collect();
    let rows: Vec<usize> = (0..n).chain(mirrored_rows.iter().copied()).collect();
    let values = grid.values().select(Axis(0), &rows);

    AngleGrid::new(grid.thetas().to_vec(), new_phis, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UnitsType;

    fn header(photometric_type: PhotometricType, multiplier: f64) -> Header {
        Header {
            num_lamps: 1,
            lumens_per_lamp: -1.0,
            multiplier,
            num_vertical_angles: 0,
            num_horizontal_angles: 0,
            photometric_type,
            units_type: UnitsType::Meters,
            width: 0.0,
            length: 0.0,
            height: 0.0,
            ballast_factor: 1.0,
            future_use: 1.0,
            input_watts: 10.0,
        }
    }

    fn grid(phis: Vec<f64>) -> AngleGrid {
        let thetas = vec![0.0, 45.0, 90.0];
        let values = (0..phis.len() * thetas.len()).map(|v| v as f64).collect();
        AngleGrid::from_flat(thetas, phis, values).unwrap()
    }

    #[test]
    fn test_classify_type_c_table() {
        let c = header(PhotometricType::C, 1.0);
        let cases = [
            (vec![0.0], LampType::C0),
            (vec![0.0, 45.0, 90.0], LampType::C90),
            (vec![0.0, 90.0, 180.0], LampType::C180),
            (vec![0.0, 180.0, 360.0], LampType::C360),
        ];
        for (phis, expected) in cases {
            let checked = classify(&c, &phis);
            assert_eq!(checked.value, expected, "phis {:?}", phis);
            assert!(checked.is_clean());
        }
    }

    #[test]
    fn test_classify_type_c_mismatch() {
        let c = header(PhotometricType::C, 1.0);
        for phis in [vec![0.0, 45.0], vec![10.0, 90.0]] {
            let checked = classify(&c, &phis);
            assert_eq!(checked.value, LampType::Unknown);
            assert!(matches!(
                checked.warnings.as_slice(),
                [ValidationWarning::SymmetryMismatch { .. }]
            ));
        }
    }

    #[test]
    fn test_classify_type_a_and_b_are_not_mirrorable() {
        let b = classify(&header(PhotometricType::B, 1.0), &[-90.0, 0.0, 90.0]);
        assert_eq!(b.value, LampType::BMinus90);
        assert_eq!(
            b.warnings,
            vec![ValidationWarning::UnsupportedPhotometry {
                photometric_type: PhotometricType::B
            }]
        );

        let a = classify(&header(PhotometricType::A, 1.0), &[0.0, 90.0]);
        assert_eq!(a.value, LampType::A90);
        assert!(!a.value.is_mirrorable());

        let bad = classify(&header(PhotometricType::A, 1.0), &[0.0, 45.0]);
        assert_eq!(bad.value, LampType::Unknown);
    }

    #[test]
    fn test_classify_unknown_photometry() {
        let checked = classify(&header(PhotometricType::Unknown(4), 1.0), &[0.0, 90.0]);
        assert_eq!(checked.value, LampType::Unknown);
        assert_eq!(checked.warnings.len(), 1);
    }

    #[test]
    fn test_radial_expansion() {
        let original = grid(vec![0.0]);
        let full = derive_full(&header(PhotometricType::C, 2.0), &original, LampType::C0).unwrap();
        assert_eq!(full.num_phis(), 360);
        assert_eq!(full.phis()[359], 359.0);
        for row in full.values().rows() {
            assert_eq!(row.to_vec(), vec![0.0, 2.0, 4.0]);
        }
    }

    #[test]
    fn test_bilateral_expansion_reflects_about_180() {
        let original = grid(vec![0.0, 60.0, 180.0]);
        let full =
            derive_full(&header(PhotometricType::C, 1.0), &original, LampType::C180).unwrap();
        assert_eq!(full.phis(), &[0.0, 60.0, 180.0, 300.0, 360.0]);
        let v = full.values();
        assert_eq!(v.row(3), v.row(1));
        assert_eq!(v.row(4), v.row(0));
        assert_eq!(v.row(2), original.values().row(2));
    }

    #[test]
    fn test_quadrant_expansion_covers_the_circle() {
        let original = grid(vec![0.0, 30.0, 90.0]);
        let full = derive_full(&header(PhotometricType::C, 1.0), &original, LampType::C90).unwrap();
        assert_eq!(
            full.phis(),
            &[0.0, 30.0, 90.0, 150.0, 180.0, 210.0, 270.0, 330.0, 360.0]
        );
        let v = full.values();
        // 150 mirrors 30 about 90, 210 mirrors 150 about 180, 330 mirrors 30.
        assert_eq!(v.row(3), v.row(1));
        assert_eq!(v.row(5), v.row(1));
        assert_eq!(v.row(7), v.row(1));
        assert_eq!(v.row(4), v.row(0));
        assert_eq!(v.row(6), v.row(2));
    }

    #[test]
    fn test_unmirrorable_fallback_applies_multiplier() {
        let original = grid(vec![-90.0, 0.0, 90.0]);
        let full =
            derive_full(&header(PhotometricType::B, 10.0), &original, LampType::BMinus90).unwrap();
        assert_eq!(full.phis(), original.phis());
        assert_eq!(full.values(), &(original.values() * 10.0));
    }
}
