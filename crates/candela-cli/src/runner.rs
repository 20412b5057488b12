//! Command implementations: load a record, run the pipeline, write results.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use candela_core::diagnostics::ValidationWarning;
use candela_core::geometry::{mesh, CoordinateSystem, Mesh};
use candela_core::parse_file;
use candela_core::types::{AngleGrid, GridStage, Header, LampRecord, LampType};
use candela_core::writer::{serialize_with, WriteOptions};

use crate::config::InterpolationConfig;

/// Machine-readable summary printed by `candela info --json`.
#[derive(Debug, Serialize)]
pub struct Summary<'a> {
    pub source: &'a str,
    pub version: &'a str,
    pub keyword_lines: usize,
    pub tilt_lines: usize,
    pub header: &'a Header,
    pub lamp_type: LampType,
    pub can_mirror: bool,
    pub warnings: &'a [ValidationWarning],
    pub total_power_lm: f64,
}

/// Parse an IES file. Warnings are logged and kept on the record.
pub fn load_record(path: &Path) -> Result<LampRecord> {
    let checked = parse_file(path).with_context(|| format!("Failed to parse {}", path.display()))?;
    if !checked.is_clean() {
        log::info!(
            "{}: {} validation warning(s)",
            path.display(),
            checked.warnings.len()
        );
    }
    Ok(checked.value)
}

/// Total flux in lumens at the configured resolution.
pub fn total_power(record: &mut LampRecord, resolution: &InterpolationConfig) -> Result<f64> {
    record
        .total_power(resolution.num_thetas, resolution.num_phis)
        .with_context(|| format!("Power integration failed for {}", record.source()))
}

/// Print a human-readable (or JSON) description of a record.
pub fn print_info(
    record: &mut LampRecord,
    resolution: &InterpolationConfig,
    json: bool,
) -> Result<()> {
    let total_power_lm = total_power(record, resolution)?;
    let summary = Summary {
        source: record.source(),
        version: record.version(),
        keyword_lines: record.keywords().len(),
        tilt_lines: record.tilt_data().len(),
        header: record.header(),
        lamp_type: record.lamp_type(),
        can_mirror: record.can_mirror(),
        warnings: record.warnings(),
        total_power_lm,
    };

    if json {
        let text = serde_json::to_string_pretty(&summary)
            .map_err(|e| anyhow::anyhow!("JSON serialisation error: {}", e))?;
        println!("{}", text);
        return Ok(());
    }

    let h = summary.header;
    println!("File:        {}", summary.source);
    println!("Version:     {}", summary.version);
    println!("Keywords:    {} line(s)", summary.keyword_lines);
    if summary.tilt_lines > 0 {
        println!("Tilt data:   {} line(s)", summary.tilt_lines);
    }
    println!("Lamps:       {} x {} lm", h.num_lamps, h.lumens_per_lamp);
    println!("Multiplier:  {}", h.multiplier);
    println!(
        "Angles:      {} vertical x {} horizontal",
        h.num_vertical_angles, h.num_horizontal_angles
    );
    println!("Photometry:  type {}", h.photometric_type);
    println!(
        "Lamp type:   {} ({})",
        summary.lamp_type,
        if summary.can_mirror { "mirrored to 0-360" } else { "not mirrored" }
    );
    println!(
        "Opening:     {} x {} x {} ({:?})",
        h.width, h.length, h.height, h.units_type
    );
    println!("Input power: {} W", h.input_watts);
    println!("Total power: {:.2} lm", summary.total_power_lm);
    for warning in summary.warnings {
        println!("Warning:     {}", warning);
    }
    Ok(())
}

/// Serialize one stage of the record to an IES file.
///
/// The `full` stage is derived on demand; the `interpolated` stage is
/// resampled at the configured resolution.
pub fn write_ies(
    record: &mut LampRecord,
    stage: GridStage,
    path: &Path,
    resolution: &InterpolationConfig,
    options: &WriteOptions,
) -> Result<()> {
    match stage {
        GridStage::Original => {}
        GridStage::Full => {
            record.expand()?;
        }
        GridStage::Interpolated => {
            record.interpolate(resolution.num_thetas, resolution.num_phis)?;
        }
    }
    let text = serialize_with(record, stage, options)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;

    println!("{} stage written to: {}", stage, path.display());
    Ok(())
}

/// Write the interpolated grid as coordinate + candela CSV for plotting tools.
pub fn write_coords_csv(grid: &AngleGrid, system: CoordinateSystem, path: &Path) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    writeln!(file, "# candela {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(
        file,
        "# Grid: {} vertical x {} horizontal angles",
        grid.num_thetas(),
        grid.num_phis()
    )?;

    // Mesh order is phi-major, the same as the candela rows.
    let candela = grid.values().iter();
    match mesh(grid.thetas(), grid.phis(), system) {
        Mesh::Polar(points) => {
            writeln!(file, "theta_deg,phi_deg,candela")?;
            for (p, cd) in points.iter().zip(candela) {
                writeln!(file, "{},{},{:.4}", p[0], p[1], cd)?;
            }
        }
        Mesh::Cartesian(points) => {
            writeln!(file, "x,y,z,candela")?;
            for (p, cd) in points.iter().zip(candela) {
                writeln!(file, "{:.6},{:.6},{:.6},{:.4}", p[0], p[1], p[2], cd)?;
            }
        }
    }
    file.flush()?;

    println!("Coordinates written to: {}", path.display());
    Ok(())
}

/// Default output file for `path` inside `directory`, e.g. `out/lamp_full.ies`.
pub fn default_output(directory: &str, path: &Path, suffix: &str, extension: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("lamp");
    Path::new(directory).join(format!("{}_{}.{}", stem, suffix, extension))
}
