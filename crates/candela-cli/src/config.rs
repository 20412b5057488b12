//! TOML job configuration.
//!
//! Every table and key is optional:
//! ```toml
//! [interpolation]
//! num_thetas = 181
//! num_phis = 361
//!
//! [output]
//! directory = "./output"
//! line_width = 76
//! decimals = 2
//! ```

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use candela_core::power::{DEFAULT_NUM_PHIS, DEFAULT_NUM_THETAS};
use candela_core::writer::WriteOptions;

/// Top-level job configuration.
#[derive(Debug, Default, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub interpolation: InterpolationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Resolution of the interpolated grid used for power and coordinates.
#[derive(Debug, Deserialize)]
pub struct InterpolationConfig {
    #[serde(default = "default_num_thetas")]
    pub num_thetas: usize,
    #[serde(default = "default_num_phis")]
    pub num_phis: usize,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            num_thetas: default_num_thetas(),
            num_phis: default_num_phis(),
        }
    }
}

fn default_num_thetas() -> usize {
    DEFAULT_NUM_THETAS
}
fn default_num_phis() -> usize {
    DEFAULT_NUM_PHIS
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Maximum characters per numeric line in written IES files.
    #[serde(default = "default_line_width")]
    pub line_width: usize,
    /// Decimal places for written candela values and angles.
    #[serde(default = "default_decimals")]
    pub decimals: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            line_width: default_line_width(),
            decimals: default_decimals(),
        }
    }
}

impl OutputConfig {
    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            line_width: self.line_width,
            decimals: self.decimals,
            ..WriteOptions::default()
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}
fn default_line_width() -> usize {
    76
}
fn default_decimals() -> u32 {
    2
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: JobConfig = toml::from_str(&content)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    Ok(config)
}

/// The configuration at `path`, or the defaults when no path is given.
pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<JobConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(JobConfig::default()),
    }
}
