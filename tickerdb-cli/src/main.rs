//! tickerdb CLI: ingest and check commands.
//!
//! Commands:
//! - `ingest`: fetch one ticker from Yahoo Finance and upsert it into SQLite
//! - `check`: print a one-line summary of the stored prices for a ticker

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tickerdb_core::{check_ticker, ingest_ticker, Config, TickerStore, YahooProvider};

#[derive(Parser)]
#[command(
    name = "tickerdb",
    about = "tickerdb: ticker metadata and price history in SQLite"
)]
struct Cli {
    /// Optional TOML config file (database path, default period, provider settings).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a ticker's metadata and history and upsert them into the database.
    Ingest {
        /// Ticker symbol (e.g., ICOLCAP.CL, SPY).
        #[arg(long)]
        ticker: String,

        /// SQLite file path. Defaults to stock_data.db.
        #[arg(long)]
        db: Option<PathBuf>,

        /// History period: 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max. Defaults to max.
        #[arg(long)]
        period: Option<String>,
    },
    /// Print row count, date range and latest close for a ticker.
    Check {
        /// Ticker symbol.
        #[arg(long)]
        ticker: String,

        /// SQLite file path. Defaults to stock_data.db.
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    init_logger();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Ingest { ticker, db, period } => {
            run_ingest(&config, &ticker, db.as_deref(), period.as_deref())
        }
        Commands::Check { ticker, db } => run_check(&config, &ticker, db.as_deref()),
    }
}

fn run_ingest(
    config: &Config,
    ticker: &str,
    db: Option<&Path>,
    period: Option<&str>,
) -> Result<ExitCode> {
    let db_path = config.db_path(db);
    let period = config.period(period)?;

    let provider = YahooProvider::new(config.provider.yahoo())?;
    let mut store = TickerStore::open(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;

    let report = ingest_ticker(&provider, &mut store, ticker, period)
        .with_context(|| format!("failed to ingest {}", ticker.trim()))?;

    println!("{report} into {}", db_path.display());
    Ok(ExitCode::SUCCESS)
}

fn run_check(config: &Config, ticker: &str, db: Option<&Path>) -> Result<ExitCode> {
    let db_path = config.db_path(db);

    match check_ticker(&db_path, ticker)? {
        Some(summary) => {
            println!("{summary}");
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!("No price rows found for {}", ticker.trim());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
