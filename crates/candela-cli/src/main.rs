//! Candela command-line interface.
//!
//! Inspect and convert IES photometric files:
//! ```sh
//! candela info lamp.ies --json
//! candela power lamp.ies --config job.toml
//! candela intensity lamp.ies 30 90
//! candela write lamp.ies --stage full -o lamp_full.ies
//! candela coords lamp.ies --system cartesian
//! candela area lamp.ies --units inches
//! ```
//!
//! Set `RUST_LOG=debug` to follow the pipeline.

mod config;
mod runner;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use candela_core::geometry::{luminous_area, CoordinateSystem, LengthUnit};
use candela_core::types::GridStage;

#[derive(Parser)]
#[command(name = "candela")]
#[command(about = "Candela: IES photometric file toolkit")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the header, symmetry class, warnings and total power of a file.
    Info {
        /// Path to the .ies file.
        file: PathBuf,
        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
        /// Optional TOML job configuration.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Compute the total optical power in lumens.
    Power {
        file: PathBuf,
        /// Vertical samples of the integration grid (overrides config).
        #[arg(long)]
        thetas: Option<usize>,
        /// Horizontal samples of the integration grid (overrides config).
        #[arg(long)]
        phis: Option<usize>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Interpolated candela value at a direction.
    Intensity {
        file: PathBuf,
        /// Vertical angle in degrees, 0 (nadir) to 180.
        theta: f64,
        /// Horizontal angle in degrees.
        #[arg(allow_hyphen_values = true)]
        phi: f64,
    },
    /// Re-serialize one stage of the candela grid as an IES file.
    Write {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = Stage::Full)]
        stage: Stage,
        /// Output file (default: <output directory>/<name>_<stage>.ies).
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Export the interpolated grid as coordinate/candela CSV.
    Coords {
        file: PathBuf,
        /// Coordinate system: polar or cartesian.
        #[arg(long, default_value = "cartesian")]
        system: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Luminous opening area.
    Area {
        file: PathBuf,
        /// Unit of the reported area: meters, feet or inches.
        #[arg(long, default_value = "meters")]
        units: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Stage {
    Original,
    Full,
    Interpolated,
}

impl From<Stage> for GridStage {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Original => GridStage::Original,
            Stage::Full => GridStage::Full,
            Stage::Interpolated => GridStage::Interpolated,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Info { file, json, config } => {
            let job = config::load_or_default(config.as_deref())?;
            let mut record = runner::load_record(&file)?;
            runner::print_info(&mut record, &job.interpolation, json)
        }
        Commands::Power {
            file,
            thetas,
            phis,
            config,
        } => {
            let mut job = config::load_or_default(config.as_deref())?;
            if let Some(n) = thetas {
                job.interpolation.num_thetas = n;
            }
            if let Some(n) = phis {
                job.interpolation.num_phis = n;
            }
            let mut record = runner::load_record(&file)?;
            let lumens = runner::total_power(&mut record, &job.interpolation)?;
            println!(
                "Total power: {:.2} lm ({} x {} samples)",
                lumens, job.interpolation.num_thetas, job.interpolation.num_phis
            );
            Ok(())
        }
        Commands::Intensity { file, theta, phi } => {
            let mut record = runner::load_record(&file)?;
            let candela = record
                .intensity_at(theta, phi)
                .with_context(|| format!("Cannot evaluate ({}, {})", theta, phi))?;
            println!("{:.4} cd at theta={} phi={}", candela, theta, phi);
            Ok(())
        }
        Commands::Write {
            file,
            stage,
            output,
            config,
        } => {
            let job = config::load_or_default(config.as_deref())?;
            let stage = GridStage::from(stage);
            let out = output.unwrap_or_else(|| {
                runner::default_output(&job.output.directory, &file, &stage.to_string(), "ies")
            });
            let mut record = runner::load_record(&file)?;
            runner::write_ies(
                &mut record,
                stage,
                &out,
                &job.interpolation,
                &job.output.write_options(),
            )
        }
        Commands::Coords {
            file,
            system,
            output,
            config,
        } => {
            let system: CoordinateSystem = system.parse()?;
            let job = config::load_or_default(config.as_deref())?;
            let out = output.unwrap_or_else(|| {
                runner::default_output(&job.output.directory, &file, "coords", "csv")
            });
            let mut record = runner::load_record(&file)?;
            let resolution = &job.interpolation;
            let grid = record.interpolate(resolution.num_thetas, resolution.num_phis)?;
            runner::write_coords_csv(grid, system, &out)
        }
        Commands::Area { file, units } => {
            let unit: LengthUnit = units.parse()?;
            let record = runner::load_record(&file)?;
            let area = luminous_area(record.header(), unit)?;
            println!("Luminous area: {} {}^2", area, units.to_ascii_lowercase());
            Ok(())
        }
    }
}
