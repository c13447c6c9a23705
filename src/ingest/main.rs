//! GeoNames cities ingest job.
//!
//! Extracts administrative cities from local GeoNames dumps, validates the
//! batch and publishes it as one partition of the cities table. Run once
//! per day by the scheduler with the partition identifier as argument.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::task::JoinError;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use geonames_cities::discord::DiscordWebhook;
use geonames_cities::warehouse::{LocalWarehouse, TableRef};
use geonames_cities::{FailureReport, RunError, RunOptions, RunSummary, Sources};

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Load GeoNames administrative cities into the table store")]
struct Args {
    /// Partition identifier for this run, e.g. 2024010100 (YYYYMMDDHH)
    partition: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Unpacked GeoNames cities1000 dump (.txt or .txt.gz)
    #[arg(long)]
    cities_file: Option<PathBuf>,

    /// GeoNames countryInfo.txt
    #[arg(long)]
    country_file: Option<PathBuf>,

    /// Warehouse root directory
    #[arg(long)]
    warehouse: Option<PathBuf>,

    /// Reject the batch unless it has more rows than this
    #[arg(long)]
    min_rows: Option<usize>,

    /// Discord webhook URL for notifications (optional)
    #[arg(long)]
    discord_webhook: Option<String>,
}

impl Args {
    /// Config file values, overridden by any flags given on the command line
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from_file(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(path) = &self.cities_file {
            config.sources.cities_file = path.clone();
        }
        if let Some(path) = &self.country_file {
            config.sources.country_file = path.clone();
        }
        if let Some(root) = &self.warehouse {
            config.warehouse.root = root.clone();
        }
        if let Some(min_rows) = self.min_rows {
            config.validation.min_rows = min_rows;
        }
        if let Some(url) = &self.discord_webhook {
            config.notify.discord_webhook = Some(url.clone());
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize logging; stdout is reserved for the failure report
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    // The scheduler treats a bare invocation as a no-op
    let Some(partition) = args.partition.clone() else {
        println!("Args are not set for: ingest");
        return Ok(ExitCode::SUCCESS);
    };

    let config = match args.resolve_config() {
        Ok(config) => config,
        Err(e) => return Ok(fail(&FailureReport::load_error(format!("{:#}", e)))),
    };

    info!("Geonames Cities Ingest");
    info!("Partition: {}", partition);
    info!("Cities file: {}", config.sources.cities_file.display());
    info!("Country file: {}", config.sources.country_file.display());

    let discord = config.notify.discord_webhook.as_ref().and_then(|url| {
        DiscordWebhook::new(url.clone())
            .map_err(|e| warn!("Discord notifications disabled: {:#}", e))
            .ok()
    });

    if let Some(ref dw) = discord {
        dw.run_started(&partition).await;
    }

    let sources = Sources {
        cities: config.sources.cities_file.clone(),
        countries: config.sources.country_file.clone(),
    };
    let options = RunOptions {
        table: TableRef::new(&config.warehouse.namespace, &config.warehouse.table),
        partition: partition.clone(),
        min_rows: config.validation.min_rows,
    };
    let root = config.warehouse.root.clone();

    // Parsing and parquet encoding are blocking work
    let joined = tokio::task::spawn_blocking(move || -> Result<_, RunError> {
        let mut store = LocalWarehouse::open(root)?;
        geonames_cities::run(&sources, &mut store, &options)
    })
    .await;

    match settle(joined) {
        Ok(summary) => {
            info!(
                "Loaded {} cities from {} records into {}",
                summary.emitted.rows, summary.lines, summary.emitted.location
            );
            if let Some(ref dw) = discord {
                dw.run_succeeded(&partition, &summary).await;
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(report) => {
            if let Some(ref dw) = discord {
                dw.run_failed(&partition, &report).await;
            }
            Ok(fail(&report))
        }
    }
}

/// Outcome of the blocking ingest task; a panicked task is a load failure
fn settle(
    joined: Result<Result<RunSummary, RunError>, JoinError>,
) -> Result<RunSummary, FailureReport> {
    match joined {
        Ok(Ok(summary)) => Ok(summary),
        Ok(Err(e)) => Err(FailureReport::from(&e)),
        Err(e) => Err(FailureReport::load_error(format!("ingest task failed: {}", e))),
    }
}

/// Print the report for the scheduler and signal failure
fn fail(report: &FailureReport) -> ExitCode {
    println!("{}", report.to_json());
    error!(
        "{}: {}",
        report.kind,
        report.error.as_deref().unwrap_or("row count check failed")
    );
    ExitCode::FAILURE
}
