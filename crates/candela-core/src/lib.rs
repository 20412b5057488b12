//! # Candela Core
//!
//! The numerical backbone of the candela toolkit. This crate reads IES
//! (LM-63) photometric files and turns them into a computable candela field
//! over the full sphere of directions.
//!
//! ## Pipeline
//!
//! ```text
//! text ──parse──▶ LampRecord { original } ──expand──▶ full ──resample──▶ interpolated
//!                                                      │                      │
//!                                                      └──serialize          └──total_power
//! ```
//!
//! Each stage is an independent [`types::AngleGrid`] owned by the
//! [`types::LampRecord`] produced by the parser. Non-fatal findings (a missing
//! version tag, an unexpected symmetry layout) are returned alongside results
//! as [`diagnostics::ValidationWarning`]s rather than aborting the pipeline.
//!
//! ## Modules
//!
//! - [`types`]: Header, angle grid, lamp record.
//! - [`diagnostics`]: Validation warnings and the [`Checked`] carrier.
//! - [`parser`]: IES text parser.
//! - [`symmetry`]: Photometric symmetry classification and mirroring.
//! - [`interpolate`]: Bilinear angular interpolation and regridding.
//! - [`power`]: Solid-angle weighted luminous flux integration.
//! - [`writer`]: IES text serializer.
//! - [`geometry`]: Coordinate conversion and luminous opening area.

pub mod diagnostics;
pub mod geometry;
pub mod interpolate;
pub mod parser;
pub mod power;
pub mod symmetry;
pub mod types;
pub mod writer;

pub use diagnostics::{Checked, ValidationWarning};
pub use interpolate::{intensity_at, resample};
pub use parser::{parse, parse_file, parse_with_source, ParseError};
pub use power::total_power;
pub use symmetry::{classify, expand};
pub use types::{AngleGrid, GridStage, Header, LampRecord, LampType};
pub use writer::serialize;
