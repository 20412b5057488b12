//! IES text serializer.
//!
//! Reproduces the keyword block verbatim (plus any `TILT=INCLUDE` lines),
//! writes the 13 header numbers on two lines, then the vertical angles, the
//! horizontal angles and one candela row per horizontal angle. Numeric rows
//! are wrapped to a column budget by [`format::format_values`].

pub mod format;

use thiserror::Error;

use crate::types::{GridError, GridStage, LampRecord};

pub use format::{format_number, format_values};

/// Layout of the numeric body.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOptions {
    /// Maximum characters per numeric line.
    pub line_width: usize,
    /// Decimal places every number is rounded to.
    pub decimals: u32,
    pub line_ending: String,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            line_width: 76,
            decimals: 2,
            line_ending: "\r\n".into(),
        }
    }
}

/// Errors while serializing a record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WriteError {
    #[error("Record has no {0} grid; compute that stage before writing it")]
    MissingStage(GridStage),

    #[error("Invalid angle grid: {0}")]
    Grid(#[from] GridError),
}

/// Serialize one stage of `record` with the default layout.
pub fn serialize(record: &LampRecord, stage: GridStage) -> Result<String, WriteError> {
    serialize_with(record, stage, &WriteOptions::default())
}

/// Serialize one stage of `record`.
///
/// The `full` and `interpolated` stages already carry the multiplier, so the
/// header written for them has a multiplier of 1. Angle counts always come
/// from the grid being written.
pub fn serialize_with(
    record: &LampRecord,
    stage: GridStage,
    options: &WriteOptions,
) -> Result<String, WriteError> {
    let grid = record.grid(stage).ok_or(WriteError::MissingStage(stage))?;
    grid.validate()?;

    let eol = options.line_ending.as_str();
    let mut out = String::new();

    for line in record.keywords().iter().chain(record.tilt_data()) {
        out.push_str(line);
        out.push_str(eol);
    }

    let h = record.header();
    let multiplier = match stage {
        GridStage::Original => h.multiplier,
        GridStage::Full | GridStage::Interpolated => 1.0,
    };
    out.push_str(&format!(
        "{} {} {} {} {} {} {} {} {} {}{}",
        h.num_lamps,
        h.lumens_per_lamp,
        multiplier,
        grid.num_thetas(),
        grid.num_phis(),
        h.photometric_type.code(),
        h.units_type.code(),
        h.width,
        h.length,
        h.height,
        eol
    ));
    out.push_str(&format!(
        "{} {} {}{}",
        h.ballast_factor, h.future_use, h.input_watts, eol
    ));

    out.push_str(&format_values(grid.thetas().iter().copied(), options));
    out.push_str(&format_values(grid.phis().iter().copied(), options));
    for row in grid.values().rows() {
        out.push_str(&format_values(row.iter().copied(), options));
    }

    log::debug!(
        "serialized {} stage of {} ({} bytes)",
        stage,
        record.source(),
        out.len()
    );
    Ok(out)
}
