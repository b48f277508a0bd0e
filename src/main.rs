use anyhow::Result;
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use inspect::config::load_config;
use inspect::pipeline::{
    CheckOptions, FetchOptions, WriteOptions, check_dataset, fetch_dataset, write_report,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "inspect",
    version,
    about = "Inspection schedule scraper for inspect.rospotrebnadzor.ru"
)]
struct Cli {
    #[arg(long, default_value = "configs/inspect.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download listing pages that are not cached yet
    Fetch {
        #[arg(short, long)]
        year: Option<i32>,
        #[arg(short, long, default_value_t = 4)]
        attempts: u32,
    },
    /// Parse cached pages and write the xlsx report
    Write {
        #[arg(short, long)]
        year: Option<i32>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Parse cached pages and report the ones that fail
    Check {
        #[arg(short, long)]
        year: Option<i32>,
    },
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Fetch { year, attempts } => {
            let year = year.unwrap_or_else(current_year);
            info!(year, attempts, "fetch start");
            let report = fetch_dataset(&FetchOptions {
                config,
                year,
                attempts,
            })?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Write { year, output } => {
            let year = year.unwrap_or_else(current_year);
            let report = write_report(&WriteOptions {
                config,
                year,
                output,
            })?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Check { year } => {
            let year = year.unwrap_or_else(current_year);
            let report = check_dataset(&CheckOptions { config, year })?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn current_year() -> i32 {
    Local::now().year()
}

/// Logs go to stderr; stdout carries only the JSON report.
fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("inspect=info,warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))
}
