//! Core types shared across the candela pipeline.
//!
//! This module defines the fundamental data structures used throughout the
//! photometry pipeline: the fixed-schema IES header, the angular candela grid,
//! and the per-file record that owns every lifecycle stage of that grid.

use std::fmt;

use ndarray::Array2;
use serde::Serialize;
use thiserror::Error;

use crate::diagnostics::ValidationWarning;

/// Photometric type code from the IES header (field 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PhotometricType {
    /// Type C: vertical angle measured from nadir, horizontal angle around
    /// the vertical axis. The only family whose symmetry is expanded.
    C,
    /// Type B: floodlight photometry.
    B,
    /// Type A: automotive photometry.
    A,
    /// Any other code found in the file.
    Unknown(i64),
}

impl PhotometricType {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::C,
            2 => Self::B,
            3 => Self::A,
            other => Self::Unknown(other),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::C => 1,
            Self::B => 2,
            Self::A => 3,
            Self::Unknown(code) => *code,
        }
    }
}

impl fmt::Display for PhotometricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::C => write!(f, "C"),
            Self::B => write!(f, "B"),
            Self::A => write!(f, "A"),
            Self::Unknown(code) => write!(f, "unknown ({})", code),
        }
    }
}

/// Units of the luminous opening dimensions (header field 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnitsType {
    Feet,
    Meters,
    Unknown(i64),
}

impl UnitsType {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Feet,
            2 => Self::Meters,
            other => Self::Unknown(other),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::Feet => 1,
            Self::Meters => 2,
            Self::Unknown(code) => *code,
        }
    }
}

/// The 13 positional numeric fields that follow the `TILT=` section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub num_lamps: u32,
    /// Rated lumens per lamp; `-1` marks absolute photometry.
    pub lumens_per_lamp: f64,
    /// Scale factor applied once to every candela value.
    pub multiplier: f64,
    pub num_vertical_angles: usize,
    pub num_horizontal_angles: usize,
    pub photometric_type: PhotometricType,
    pub units_type: UnitsType,
    /// Luminous opening dimensions, in `units_type`.
    pub width: f64,
    pub length: f64,
    pub height: f64,
    pub ballast_factor: f64,
    /// Reserved by the format; usually `1`.
    pub future_use: f64,
    pub input_watts: f64,
}

/// Errors raised when an angle grid violates its structural invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error(
        "Candela array has shape {rows}x{cols} but the grid has {phis} horizontal and {thetas} vertical angles"
    )]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        phis: usize,
        thetas: usize,
    },

    #[error("Expected {expected} candela values for the angle grid, got {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("Grid has no {0} angles")]
    Empty(&'static str),

    #[error("{axis} angles must increase strictly: index {index} has {value} after {previous}")]
    NotIncreasing {
        axis: &'static str,
        index: usize,
        previous: f64,
        value: f64,
    },

    #[error("{axis} angle at index {index} is not finite")]
    NonFinite { axis: &'static str, index: usize },
}

/// Candela values sampled on a (phi, theta) lattice.
///
/// Row `i` of [`values`](Self::values) holds the intensities along every
/// theta for `phis[i]`, so the array shape is always
/// `(phis.len(), thetas.len())`. Both angle axes are strictly increasing.
/// The invariants are enforced at construction; there is no way to obtain an
/// `AngleGrid` that violates them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AngleGrid {
    thetas: Vec<f64>,
    phis: Vec<f64>,
    values: Array2<f64>,
}

impl AngleGrid {
    /// Build a grid, checking the shape and ordering invariants.
    pub fn new(thetas: Vec<f64>, phis: Vec<f64>, values: Array2<f64>) -> Result<Self, GridError> {
        let grid = Self {
            thetas,
            phis,
            values,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Build a grid from a row-major flat candela stream (one row per phi).
    pub fn from_flat(
        thetas: Vec<f64>,
        phis: Vec<f64>,
        values: Vec<f64>,
    ) -> Result<Self, GridError> {
        let expected = thetas.len() * phis.len();
        if values.len() != expected {
            return Err(GridError::LengthMismatch {
                expected,
                found: values.len(),
            });
        }
        let values = Array2::from_shape_vec((phis.len(), thetas.len()), values).map_err(|_| {
            GridError::LengthMismatch {
                expected,
                found: expected,
            }
        })?;
        Self::new(thetas, phis, values)
    }

    /// Re-check every structural invariant.
    pub fn validate(&self) -> Result<(), GridError> {
        check_axis("vertical", &self.thetas)?;
        check_axis("horizontal", &self.phis)?;

        let (rows, cols) = self.values.dim();
        if rows != self.phis.len() || cols != self.thetas.len() {
            return Err(GridError::ShapeMismatch {
                rows,
                cols,
                phis: self.phis.len(),
                thetas: self.thetas.len(),
            });
        }
        Ok(())
    }

    pub fn thetas(&self) -> &[f64] {
        &self.thetas
    }

    pub fn phis(&self) -> &[f64] {
        &self.phis
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn num_thetas(&self) -> usize {
        self.thetas.len()
    }

    pub fn num_phis(&self) -> usize {
        self.phis.len()
    }

    /// Candela value at the given (phi, theta) sample indices.
    pub fn value(&self, phi_index: usize, theta_index: usize) -> Option<f64> {
        self.values.get([phi_index, theta_index]).copied()
    }

    /// Azimuthal coverage in degrees (last phi minus first phi).
    pub fn phi_span(&self) -> f64 {
        match (self.phis.first(), self.phis.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }

    /// A copy of this grid with every candela value multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            thetas: self.thetas.clone(),
            phis: self.phis.clone(),
            values: &self.values * factor,
        }
    }

    /// The maximum candela value on the grid.
    pub fn peak(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

fn check_axis(axis: &'static str, samples: &[f64]) -> Result<(), GridError> {
    if samples.is_empty() {
        return Err(GridError::Empty(axis));
    }
    if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
        return Err(GridError::NonFinite { axis, index });
    }
    for (index, pair) in samples.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(GridError::NotIncreasing {
                axis,
                index: index + 1,
                previous: pair[0],
                value: pair[1],
            });
        }
    }
    Ok(())
}

/// Symmetry class derived from the photometric type and the phi layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LampType {
    /// Full radial symmetry: a single phi plane.
    C0,
    /// Quadrant symmetry: phi covers 0–90.
    C90,
    /// Bilateral symmetry: phi covers 0–180.
    C180,
    /// No symmetry: phi already covers 0–360.
    C360,
    /// Type B, horizontal angles 0–90.
    B90,
    /// Type B, horizontal angles -90–90.
    #[serde(rename = "B-90")]
    BMinus90,
    A90,
    #[serde(rename = "A-90")]
    AMinus90,
    #[serde(rename = "unknown")]
    Unknown,
}

impl LampType {
    /// Whether the expander knows how to mirror this class onto 0–360.
    pub fn is_mirrorable(&self) -> bool {
        matches!(self, Self::C0 | Self::C90 | Self::C180 | Self::C360)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::C0 => "C0",
            Self::C90 => "C90",
            Self::C180 => "C180",
            Self::C360 => "C360",
            Self::B90 => "B90",
            Self::BMinus90 => "B-90",
            Self::A90 => "A90",
            Self::AMinus90 => "A-90",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for LampType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which lifecycle stage of a record's grid to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GridStage {
    /// As read from the file, multiplier not applied.
    Original,
    /// Mirrored onto 0–360 phi with the multiplier applied.
    Full,
    /// Resampled from `Full` at a caller-chosen resolution.
    Interpolated,
}

impl fmt::Display for GridStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Original => write!(f, "original"),
            Self::Full => write!(f, "full"),
            Self::Interpolated => write!(f, "interpolated"),
        }
    }
}

/// A parsed IES file together with its derived grids.
///
/// Produced by [`crate::parser::parse`]. `full` is filled in by
/// [`crate::symmetry::expand`] and `interpolated` by
/// [`LampRecord::interpolate`]; nothing else mutates a record.
#[derive(Debug, Clone)]
pub struct LampRecord {
    pub(crate) source: String,
    pub(crate) version: Option<String>,
    pub(crate) keywords: Vec<String>,
    pub(crate) tilt_data: Vec<String>,
    pub(crate) header: Header,
    pub(crate) original: AngleGrid,
    pub(crate) full: Option<AngleGrid>,
    pub(crate) interpolated: Option<AngleGrid>,
    pub(crate) lamp_type: LampType,
    pub(crate) warnings: Vec<ValidationWarning>,
}

impl LampRecord {
    /// Path or tag identifying where the text came from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// First line of the file when it carries an `IES` version tag.
    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or("unspecified")
    }

    /// Every line up to and including `TILT=...`, verbatim.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// The four tilt lines that follow `TILT=INCLUDE`; empty otherwise.
    pub fn tilt_data(&self) -> &[String] {
        &self.tilt_data
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn lamp_type(&self) -> LampType {
        self.lamp_type
    }

    /// Whether the symmetry expander will mirror this record.
    pub fn can_mirror(&self) -> bool {
        self.lamp_type.is_mirrorable()
    }

    /// Warnings raised while parsing and classifying this file.
    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    pub fn original(&self) -> &AngleGrid {
        &self.original
    }

    /// The expanded grid, if [`expand`](crate::symmetry::expand) has run.
    pub fn full(&self) -> Option<&AngleGrid> {
        self.full.as_ref()
    }

    /// The most recent resampled grid, if any.
    pub fn interpolated(&self) -> Option<&AngleGrid> {
        self.interpolated.as_ref()
    }

    pub fn grid(&self, stage: GridStage) -> Option<&AngleGrid> {
        match stage {
            GridStage::Original => Some(&self.original),
            GridStage::Full => self.full.as_ref(),
            GridStage::Interpolated => self.interpolated.as_ref(),
        }
    }
}
