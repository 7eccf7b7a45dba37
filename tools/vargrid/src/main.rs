//! Sizing-field driver: load a JSON configuration (or a uniform / icosahedral
//! request), synthesize the resolution field and write it for the mesher.
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use vargrid_core::icosahedral::{MAX_LEVEL, MIN_LEVEL};
use vargrid_core::{
    icosahedral_cell_count, icosahedral_field, icosahedral_resolution, save_json,
    save_sizing_function, synthesize_config, uniform_field, Configuration, FieldGrid,
    DEFAULT_GRID_DENSITY,
};

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "vargrid", about = "Build variable-resolution sizing fields for global meshes")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Synthesize the field described by a JSON configuration
    Run {
        /// Path to the configuration file
        config: PathBuf,

        /// Output file (omit to print the summary only)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "jigsaw")]
        format: Format,
    },
    /// A field with the same resolution everywhere
    Uniform {
        /// Resolution in km
        #[arg(long)]
        resolution: f64,

        /// Sample spacing in degrees
        #[arg(long, default_value_t = DEFAULT_GRID_DENSITY)]
        grid_density: f64,

        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "jigsaw")]
        format: Format,
    },
    /// A uniform field at an icosahedral subdivision level
    Icosahedral {
        #[arg(long)]
        level: u32,

        /// Sample spacing in degrees
        #[arg(long, default_value_t = DEFAULT_GRID_DENSITY)]
        grid_density: f64,

        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "jigsaw")]
        format: Format,
    },
    /// Print supported icosahedral levels
    Levels,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// JIGSAW ELLIPSOID-GRID text
    Jigsaw,
    Json,
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn finish(field: &FieldGrid, output: Option<PathBuf>, format: Format) -> Result<()> {
    println!("{}", field.summary());
    let Some(path) = output else {
        return Ok(());
    };
    let written = match format {
        Format::Jigsaw => save_sizing_function(field, &path),
        Format::Json => save_json(field, &path),
    };
    written.with_context(|| format!("Cannot write {}", path.display()))
}

fn print_levels() -> Result<()> {
    println!("{:>5}  {:>10}  {:>12}", "level", "res (km)", "cells");
    for level in MIN_LEVEL..=MAX_LEVEL {
        println!(
            "{:>5}  {:>10.1}  {:>12}",
            level,
            icosahedral_resolution(level)?,
            icosahedral_cell_count(level)?
        );
    }
    Ok(())
}

// ── Main ─────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    match args.command {
        Command::Run { config, output, format } => {
            let cfg = Configuration::load(&config)
                .with_context(|| format!("Cannot load {}", config.display()))?;
            info!(
                name = cfg.name.as_deref().unwrap_or("unnamed"),
                regions = cfg.regions.len(),
                grid_density = cfg.grid_density,
                "configuration loaded"
            );
            let field = synthesize_config(&cfg).context("Field synthesis failed")?;
            finish(&field, output, format)
        }
        Command::Uniform { resolution, grid_density, output, format } => {
            let field = uniform_field(resolution, grid_density).context("Field synthesis failed")?;
            finish(&field, output, format)
        }
        Command::Icosahedral { level, grid_density, output, format } => {
            let field = icosahedral_field(level, grid_density).context("Field synthesis failed")?;
            finish(&field, output, format)
        }
        Command::Levels => print_levels(),
    }
}
