//! Bilinear interpolation over an [`AngleGrid`].
//!
//! A query `(theta, phi)` is bracketed on each axis by the two neighbouring
//! samples. The four surrounding candela values are blended first along phi
//! (once for each bracketing theta), then the two results are blended along
//! theta. Queries outside the sampled range clamp to the boundary sample;
//! there is no extrapolation.

use thiserror::Error;

use crate::types::{AngleGrid, GridError, LampRecord};

/// Added to a query angle of exactly zero so the bracket always spans a real
/// interval. Far below any candela resolution.
const ZERO_NUDGE: f64 = f64::MIN_POSITIVE;

/// Errors from interpolation queries. They never affect the grid queried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("Theta must be within [0, 180] degrees, got {0}")]
    ThetaOutOfRange(f64),

    #[error("Phi must be a finite angle, got {0}")]
    NonFinitePhi(f64),

    #[error("Resample resolution must be at least 1x1, got {num_thetas}x{num_phis}")]
    EmptyResolution { num_thetas: usize, num_phis: usize },

    #[error("Invalid angle grid: {0}")]
    Grid(#[from] GridError),
}

/// Interpolated candela value at `(theta_deg, phi_deg)`.
///
/// `theta_deg` must lie in `[0, 180]`. `phi_deg` wraps modulo 360.
pub fn intensity_at(theta_deg: f64, phi_deg: f64, grid: &AngleGrid) -> Result<f64, DomainError> {
    if !(0.0..=180.0).contains(&theta_deg) {
        return Err(DomainError::ThetaOutOfRange(theta_deg));
    }
    if !phi_deg.is_finite() {
        return Err(DomainError::NonFinitePhi(phi_deg));
    }

    let phi = if (0.0..=360.0).contains(&phi_deg) {
        phi_deg
    } else {
        phi_deg.rem_euclid(360.0)
    };
    let phi = if phi == 0.0 { ZERO_NUDGE } else { phi };
    let theta = if theta_deg == 0.0 { ZERO_NUDGE } else { theta_deg };

    let thetas = grid.thetas();
    let phis = grid.phis();
    let values = grid.values();

    let (p1, p2) = bracket(phis, phi);
    let (t1, t2) = bracket(thetas, theta);
    let phi_weight = weight(phis, p1, p2, phi);

    let near = lerp(values[[p1, t1]], values[[p2, t1]], phi_weight);
    let far = lerp(values[[p1, t2]], values[[p2, t2]], phi_weight);
    Ok(lerp(near, far, weight(thetas, t1, t2, theta)))
}

/// Evaluate `grid` on an evenly spaced lattice of `num_thetas` angles over
/// `[0, 180]` and `num_phis` angles over `[0, 360]`.
pub fn resample(
    grid: &AngleGrid,
    num_thetas: usize,
    num_phis: usize,
) -> Result<AngleGrid, DomainError> {
    grid.validate()?;
    if num_thetas == 0 || num_phis == 0 {
        return Err(DomainError::EmptyResolution {
            num_thetas,
            num_phis,
        });
    }

    let thetas = linspace(0.0, 180.0, num_thetas);
    let phis = linspace(0.0, 360.0, num_phis);

    let values = phis
        .iter()
        .flat_map(|&phi| thetas.iter().map(move |&theta| (theta, phi)))
        .map(|(theta, phi)| intensity_at(theta, phi, grid))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AngleGrid::from_flat(thetas, phis, values)?)
}

/// Indices of the samples bracketing `value` in a sorted slice.
///
/// Uses the leftmost index `i` with `samples[i] >= value`. At or before the
/// first sample, or past the last, both indices collapse onto the boundary.
pub fn bracket(samples: &[f64], value: f64) -> (usize, usize) {
    let index = samples.partition_point(|&s| s < value);
    if index == 0 {
        (0, 0)
    } else if index == samples.len() {
        (index - 1, index - 1)
    } else {
        (index - 1, index)
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            // Pin the endpoint so rounding can never push it out of range.
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

fn weight(samples: &[f64], low: usize, high: usize, value: f64) -> f64 {
    if low == high {
        return 0.0;
    }
    let span = samples[high] - samples[low];
    let span = if span == 0.0 { f64::MIN_POSITIVE } else { span };
    (value - samples[low]) / span
}

fn lerp(a: f64, b: f64, weight: f64) -> f64 {
    a * (1.0 - weight) + b * weight
}

impl LampRecord {
    /// Interpolated value of the `full` grid, expanding the record if needed.
    pub fn intensity_at(&mut self, theta_deg: f64, phi_deg: f64) -> Result<f64, DomainError> {
        intensity_at(theta_deg, phi_deg, self.expand()?)
    }

    /// Resample the `full` grid and attach the result as the interpolated
    /// stage, replacing any earlier one.
    pub fn interpolate(
        &mut self,
        num_thetas: usize,
        num_phis: usize,
    ) -> Result<&AngleGrid, DomainError> {
        let grid = resample(self.expand()?, num_thetas, num_phis)?;
        log::debug!(
            "interpolated {} onto {} x {} angles",
            self.source,
            num_thetas,
            num_phis
        );
        Ok(self.interpolated.insert(grid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample_grid() -> AngleGrid {
        AngleGrid::from_flat(
            vec![0.0, 90.0, 180.0],
            vec![0.0, 90.0, 180.0, 270.0, 360.0],
            vec![
                100.0, 50.0, 0.0, //
                80.0, 40.0, 0.0, //
                60.0, 30.0, 0.0, //
                80.0, 40.0, 0.0, //
                100.0, 50.0, 0.0,
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_bracket() {
        let s = [0.0, 10.0, 20.0];
        assert_eq!(bracket(&s, -5.0), (0, 0));
        assert_eq!(bracket(&s, 0.0), (0, 0));
        assert_eq!(bracket(&s, 5.0), (0, 1));
        assert_eq!(bracket(&s, 10.0), (0, 1));
        assert_eq!(bracket(&s, 20.0), (1, 2));
        assert_eq!(bracket(&s, 25.0), (2, 2));
    }

    #[test]
    fn test_linspace_pins_endpoint() {
        let v = linspace(0.0, 360.0, 7);
        assert_eq!(v.len(), 7);
        assert_eq!(v[0], 0.0);
        assert_eq!(v[6], 360.0);
        assert_abs_diff_eq!(v[1], 60.0, epsilon = 1e-12);
        assert_eq!(linspace(0.0, 180.0, 1), vec![0.0]);
        assert!(linspace(0.0, 180.0, 0).is_empty());
    }

    #[test]
    fn test_samples_are_reproduced_exactly() {
        let grid = sample_grid();
        for (i, &phi) in grid.phis().iter().enumerate().skip(1) {
            for (j, &theta) in grid.thetas().iter().enumerate().skip(1) {
                assert_eq!(intensity_at(theta, phi, &grid).unwrap(), grid.values()[[i, j]]);
            }
        }
    }

    #[test]
    fn test_zero_angles_fall_back_to_the_first_sample() {
        let grid = sample_grid();
        let v = intensity_at(0.0, 0.0, &grid).unwrap();
        assert!(v.is_finite());
        assert_abs_diff_eq!(v, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_far_corner_is_finite() {
        let grid = sample_grid();
        assert_eq!(intensity_at(180.0, 360.0, &grid).unwrap(), 0.0);
    }

    #[test]
    fn test_midpoints_blend_linearly() {
        let grid = sample_grid();
        assert_abs_diff_eq!(intensity_at(45.0, 0.0, &grid).unwrap(), 75.0, epsilon = 1e-9);
        assert_abs_diff_eq!(intensity_at(0.0, 45.0, &grid).unwrap(), 90.0, epsilon = 1e-9);
        // Corners 100, 80 at theta 0 and 50, 40 at theta 90.
        assert_abs_diff_eq!(intensity_at(45.0, 45.0, &grid).unwrap(), 67.5, epsilon = 1e-9);
    }

    #[test]
    fn test_phi_wraps() {
        let grid = sample_grid();
        let base = intensity_at(30.0, 45.0, &grid).unwrap();
        assert_abs_diff_eq!(intensity_at(30.0, 405.0, &grid).unwrap(), base, epsilon = 1e-9);
        assert_abs_diff_eq!(intensity_at(30.0, -315.0, &grid).unwrap(), base, epsilon = 1e-9);
    }

    #[test]
    fn test_theta_out_of_range() {
        let grid = sample_grid();
        assert_eq!(
            intensity_at(180.5, 0.0, &grid),
            Err(DomainError::ThetaOutOfRange(180.5))
        );
        assert!(intensity_at(-1.0, 0.0, &grid).is_err());
        assert!(intensity_at(f64::NAN, 0.0, &grid).is_err());
        assert!(matches!(
            intensity_at(10.0, f64::INFINITY, &grid),
            Err(DomainError::NonFinitePhi(_))
        ));
    }

    #[test]
    fn test_queries_beyond_samples_clamp() {
        let grid = AngleGrid::from_flat(vec![0.0, 90.0], vec![0.0, 90.0], vec![4.0, 2.0, 8.0, 6.0])
            .unwrap();
        // theta past the last sample and phi past the last sample.
        assert_eq!(intensity_at(135.0, 200.0, &grid).unwrap(), 6.0);
    }

    #[test]
    fn test_resample_shape_and_values() {
        let grid = sample_grid();
        let fine = resample(&grid, 5, 9).unwrap();
        assert_eq!(fine.num_thetas(), 5);
        assert_eq!(fine.num_phis(), 9);
        assert_eq!(fine.values().dim(), (9, 5));
        assert_abs_diff_eq!(fine.values()[[2, 2]], 40.0, epsilon = 1e-9);
        assert_eq!(
            resample(&grid, 0, 9),
            Err(DomainError::EmptyResolution {
                num_thetas: 0,
                num_phis: 9,
            })
        );
    }
}
