use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{info, warn};

mod aggregate;
mod config;
mod dataset;
mod error;
mod generate;
mod hotspot;
mod models;
mod report;
mod views;

use config::{DEFAULT_SAMPLE_SIZE, DEFAULT_SEED};
use models::AccidentRecord;
use views::Analysis;

#[derive(Parser)]
#[command(name = "crossing-safety")]
#[command(about = "Highway-rail grade crossing accident analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Where the records come from: an uploaded CSV, or a synthetic sample.
#[derive(clap::Args)]
struct Source {
    /// Accident data to analyze instead of the synthetic sample
    #[arg(long, env = "CROSSING_CSV")]
    csv: Option<PathBuf>,
    /// Seed for the synthetic sample
    #[arg(long, env = "CROSSING_SEED", default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Size of the synthetic sample
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE)]
    count: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a synthetic accident dataset as CSV
    Generate {
        #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE)]
        count: usize,
        #[arg(long, env = "CROSSING_SEED", default_value_t = DEFAULT_SEED)]
        seed: u64,
        #[arg(long, default_value = "accidents.csv")]
        out: PathBuf,
    },
    /// Print one dashboard view
    Analyze {
        #[arg(long, value_enum, default_value_t = Analysis::Overview)]
        view: Analysis,
        #[command(flatten)]
        source: Source,
        /// Emit chart-ready JSON instead of tables
        #[arg(long)]
        json: bool,
        /// Write JSON to this file instead of stdout
        #[arg(long, requires = "json")]
        out: Option<PathBuf>,
    },
    /// Generate a markdown report covering every view
    Report {
        #[command(flatten)]
        source: Source,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

/// Load the uploaded file if one was given. A failed upload falls back to the
/// synthetic sample so the analysis still runs.
fn load_records(source: &Source) -> (Vec<AccidentRecord>, String) {
    if let Some(path) = source.csv.as_deref() {
        match dataset::load_csv(path) {
            Ok(records) => {
                info!("Data uploaded successfully ({} records)", records.len());
                return (records, path.display().to_string());
            }
            Err(e) => warn!("Could not load {}: {e}; using synthetic sample", path.display()),
        }
    }

    let records = generate::sample(source.count, source.seed);
    (records, format!("synthetic sample (seed {})", source.seed))
}

fn write_text(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Generate { count, seed, out } => {
            let records = generate::sample(count, seed);
            dataset::write_csv(&records, &out)
                .with_context(|| format!("failed to write dataset to {}", out.display()))?;
            println!("Wrote {} accidents to {}.", records.len(), out.display());
        }
        Commands::Analyze {
            view,
            source,
            json,
            out,
        } => {
            let (records, _) = load_records(&source);
            let dashboard = views::build(view, &records);

            if !json {
                print!("{}", views::render_text(&dashboard));
            } else if let Some(out) = out {
                views::write_json(&dashboard, &out)
                    .with_context(|| format!("failed to write {}", out.display()))?;
                println!("View written to {}.", out.display());
            } else {
                println!("{}", serde_json::to_string_pretty(&dashboard)?);
            }
        }
        Commands::Report { source, out } => {
            let (records, label) = load_records(&source);
            let report = report::build_report(&label, chrono::Utc::now(), &records);
            write_text(&out, &report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
