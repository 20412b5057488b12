//! Coordinate conversion and luminaire dimensions.
//!
//! Plotting tools consume the candela field either as (theta, phi) pairs or
//! as points on the unit sphere. IES angles put theta = 0 at nadir, so the
//! cartesian mapping flips z: theta = 0 is `(0, 0, -1)` and theta = 180 is
//! `(0, 0, 1)`. Phi = 0 lies along +y and phi = 90 along +x.

use std::str::FromStr;

use thiserror::Error;

use crate::types::{Header, UnitsType};

const METERS_PER_FOOT: f64 = 0.3048;
const INCHES_PER_FOOT: f64 = 12.0;

/// Errors from invalid helper arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Unknown length unit '{0}'. Valid units: meters, feet, inches")]
    UnknownUnit(String),

    #[error("Unknown coordinate system '{0}'. Valid systems: polar, cartesian")]
    UnknownCoordinateSystem(String),

    #[error("Header units type {0} is neither feet (1) nor meters (2)")]
    UnknownUnitsType(i64),
}

/// Length unit for reporting luminaire dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    Meters,
    Feet,
    Inches,
}

impl LengthUnit {
    fn meters_per_unit(&self) -> f64 {
        match self {
            Self::Meters => 1.0,
            Self::Feet => METERS_PER_FOOT,
            Self::Inches => METERS_PER_FOOT / INCHES_PER_FOOT,
        }
    }
}

impl FromStr for LengthUnit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "meters" => Ok(Self::Meters),
            "feet" => Ok(Self::Feet),
            "inches" => Ok(Self::Inches),
            _ => Err(ConfigError::UnknownUnit(s.to_string())),
        }
    }
}

/// Luminous opening area (width x length) in `unit` squared.
pub fn luminous_area(header: &Header, unit: LengthUnit) -> Result<f64, ConfigError> {
    let source = match header.units_type {
        UnitsType::Feet => LengthUnit::Feet,
        UnitsType::Meters => LengthUnit::Meters,
        UnitsType::Unknown(code) => return Err(ConfigError::UnknownUnitsType(code)),
    };
    let scale = source.meters_per_unit() / unit.meters_per_unit();
    Ok(header.width * scale * header.length * scale)
}

/// Output form of [`mesh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSystem {
    Polar,
    Cartesian,
}

impl FromStr for CoordinateSystem {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "polar" => Ok(Self::Polar),
            "cartesian" => Ok(Self::Cartesian),
            _ => Err(ConfigError::UnknownCoordinateSystem(s.to_string())),
        }
    }
}

/// Every (theta, phi) combination of a grid, phi-major.
#[derive(Debug, Clone, PartialEq)]
pub enum Mesh {
    /// `[theta, phi]` in degrees.
    Polar(Vec<[f64; 2]>),
    /// `[x, y, z]` on the unit sphere.
    Cartesian(Vec<[f64; 3]>),
}

impl Mesh {
    pub fn len(&self) -> usize {
        match self {
            Self::Polar(points) => points.len(),
            Self::Cartesian(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Convert an IES direction to cartesian coordinates at `distance`.
pub fn polar_to_cartesian(theta_deg: f64, phi_deg: f64, distance: f64) -> [f64; 3] {
    let theta = (180.0 - theta_deg).to_radians();
    let phi = phi_deg.to_radians();
    [
        distance * theta.sin() * phi.sin(),
        distance * theta.sin() * phi.cos(),
        distance * theta.cos(),
    ]
}

/// Build the point mesh for a set of angles.
///
/// Points are ordered phi-major, matching the row-major order of
/// [`AngleGrid::values`](crate::types::AngleGrid::values), so the mesh zips
/// directly with the flattened candela values.
pub fn mesh(thetas: &[f64], phis: &[f64], system: CoordinateSystem) -> Mesh {
    let pairs = phis
        .iter()
        .flat_map(|&phi| thetas.iter().map(move |&theta| (theta, phi)));
    match system {
        CoordinateSystem::Polar => Mesh::Polar(pairs.map(|(t, p)| [t, p]).collect()),
        CoordinateSystem::Cartesian => Mesh::Cartesian(
            pairs.map(|(t, p)| polar_to_cartesian(t, p, 1.0)).collect(),
        ),
    }
}
