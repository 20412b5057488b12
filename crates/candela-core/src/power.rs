//! Total luminous flux from a candela grid.
//!
//! The sphere is cut into rings, one per theta sample. Ring `i` spans from
//! the midpoint with its lower neighbour to the midpoint with its upper
//! neighbour (half a spacing beyond the ends, clamped to `[0°, 180°]`), and
//! subtends the spherical frustum solid angle
//!
//! $$\Omega_i = 2\pi(1 - \cos\theta_2) - 2\pi(1 - \cos\theta_1)$$
//!
//! The candela values of each ring are averaged over phi, so
//!
//! $$\Phi = \sum_i \bar{I}(\theta_i)\,\Omega_i \quad [\mathrm{lm} = \mathrm{cd \cdot sr}]$$
//!
//! Both ring boundaries are clamped to `[0°, 180°]`. A file sampled up to
//! 180° would otherwise get a last ring reaching past the zenith, so a uniform
//! sphere of `c` candela integrates to exactly $4\pi c$ here instead of
//! slightly more.
//!
//! The grid must cover the full horizontal circle; integrating the
//! `original` grid of a C90 or C180 file undercounts.

use std::f64::consts::PI;

use ndarray::Axis;
use thiserror::Error;

use crate::interpolate::{resample, DomainError};
use crate::types::{AngleGrid, GridError, LampRecord};

/// Resolution used by [`LampRecord::total_power_default`].
pub const DEFAULT_NUM_THETAS: usize = 181;
pub const DEFAULT_NUM_PHIS: usize = 361;

/// Phi coverage below which the integral is known to undercount.
const FULL_CIRCLE_DEG: f64 = 359.0;

/// Errors from flux integration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PowerError {
    #[error("Power integration needs at least two vertical angles, got {0}")]
    TooFewThetas(usize),

    #[error("Invalid angle grid: {0}")]
    Grid(#[from] GridError),

    #[error("Interpolation failed: {0}")]
    Domain(#[from] DomainError),
}

/// Solid angle (sr) of the spherical band between two polar angles in degrees.
pub fn frustum_area(theta1_deg: f64, theta2_deg: f64) -> f64 {
    let cap = |theta_deg: f64| 2.0 * PI * (1.0 - theta_deg.to_radians().cos());
    cap(theta2_deg) - cap(theta1_deg)
}

/// Solid angle of the ring belonging to each theta sample.
pub fn ring_solid_angles(thetas: &[f64]) -> Result<Vec<f64>, PowerError> {
    let n = thetas.len();
    if n < 2 {
        return Err(PowerError::TooFewThetas(n));
    }

    let rings = (0..n)
        .map(|i| {
            let lower = if i == 0 {
                thetas[0] - (thetas[1] - thetas[0]) / 2.0
            } else {
                (thetas[i - 1] + thetas[i]) / 2.0
            };
            let upper = if i == n - 1 {
                thetas[n - 1] + (thetas[n - 1] - thetas[n - 2]) / 2.0
            } else {
                (thetas[i] + thetas[i + 1]) / 2.0
            };
            frustum_area(lower.clamp(0.0, 180.0), upper.clamp(0.0, 180.0))
        })
        .collect();
    Ok(rings)
}

/// Total radiated luminous flux (lm) of a full-coverage grid.
pub fn total_power(grid: &AngleGrid) -> Result<f64, PowerError> {
    grid.validate()?;
    if grid.phi_span() < FULL_CIRCLE_DEG {
        log::warn!(
            "integrating a grid covering only {}° of phi; flux will be undercounted",
            grid.phi_span()
        );
    }

    let rings = ring_solid_angles(grid.thetas())?;
    let ring_means = grid.values().sum_axis(Axis(0)) / grid.num_phis() as f64;

    Ok(ring_means.iter().zip(&rings).map(|(mean, omega)| mean * omega).sum())
}

impl LampRecord {
    /// Flux of the record, integrated over its interpolated stage at the
    /// requested resolution. A cached interpolated grid of the same
    /// resolution is reused; otherwise it is recomputed from `full`.
    ///
    /// A failed query leaves the record, including any cached grid, as it was.
    pub fn total_power(&mut self, num_thetas: usize, num_phis: usize) -> Result<f64, PowerError> {
        if let Some(grid) = self.interpolated.as_ref().filter(|grid| {
            grid.num_thetas() == num_thetas && grid.num_phis() == num_phis
        }) {
            return total_power(grid);
        }

        let grid = resample(self.expand()?, num_thetas, num_phis)?;
        let flux = total_power(&grid)?;
        self.interpolated = Some(grid);
        Ok(flux)
    }

    /// [`total_power`](Self::total_power) at 181 x 361 samples (1° steps).
    pub fn total_power_default(&mut self) -> Result<f64, PowerError> {
        self.total_power(DEFAULT_NUM_THETAS, DEFAULT_NUM_PHIS)
    }
}
