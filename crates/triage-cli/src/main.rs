//! `triage`: run the pipeline over a JSON inbox, calibrate, inspect the log.
//!
//! Every command prints its report as JSON on stdout. Diagnostics go to
//! stderr through `tracing` (filter from `TRIAGE_LOG`).

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

mod commands;

use commands::Command;

#[derive(Parser)]
#[command(name = "triage")]
#[command(version, about = "Personal knowledge triage and routing", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (TOML). Defaults apply when absent.
    #[arg(short, long, global = true, env = "TRIAGE_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// SQLite database holding the decision log and calibrated weights
    #[arg(long, global = true, env = "TRIAGE_DB", value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// JSON inbox of captured items
    #[arg(long, global = true, env = "TRIAGE_INBOX", value_name = "FILE")]
    pub inbox: Option<PathBuf>,

    /// Rule document (TOML)
    #[arg(long, global = true, env = "TRIAGE_RULES", value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Root directory notes are written under
    #[arg(long, global = true, env = "TRIAGE_OUT", value_name = "DIR")]
    pub out: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = commands::load_config(&cli)?;
    triage_observability::init_tracing(&config.observability);

    let output = commands::run(&cli, config).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
