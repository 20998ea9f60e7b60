//! Homewatch - Alarm aggregation and console view arbitration
//!
//! Reads JSON-encoded alarms from stdin, one per line, aggregates them into
//! alerts and prints any console view suggestion as a JSON line on stdout.
//!
//! ## Usage
//!
//! ```bash
//! # Feed alarms from a producer
//! alarm-feed | homewatch
//!
//! # With verbose logging
//! homewatch -v
//!
//! # With custom config and log directory
//! homewatch --config ./homewatch.yaml --log-dir /path/to/logs/
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use homewatch_alerts::{Alarm, AlertService, HomewatchConfig, MaintenanceScheduler};
use homewatch_core::{HomewatchError, LogGuard, init_logging};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

/// Homewatch alert engine
///
/// Aggregates alarms from producers into alerts and decides which
/// console view to show.
#[derive(Parser, Debug)]
#[command(name = "homewatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging (increases log level)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory for log files (defaults to ~/.homewatch/logs/)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Config file (defaults to ~/.homewatch/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match setup_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::from(1);
        }
    };

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config: {}", e);
            eprintln!("Error: {}", e);
            if let Some(hint) = e.guidance() {
                eprintln!("{}", hint);
            }
            return ExitCode::from(1);
        }
    };

    info!("Starting homewatch alert engine");

    match run(config).await {
        Ok(()) => {
            info!("homewatch exited normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("homewatch error: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

/// Set up logging based on CLI arguments.
fn setup_logging(cli: &Cli) -> homewatch_core::Result<LogGuard> {
    init_logging(cli.log_dir.clone(), cli.verbose > 0)
}

fn load_config(cli: &Cli) -> homewatch_core::Result<HomewatchConfig> {
    match &cli.config {
        Some(path) => HomewatchConfig::load_from(path),
        None => HomewatchConfig::load(),
    }
}

/// Ingest stdin until EOF, then run a final maintenance pass.
async fn run(config: HomewatchConfig) -> homewatch_core::Result<()> {
    let service = Arc::new(AlertService::from_config(&config));
    let scheduler = MaintenanceScheduler::from_config(service.clone(), &config.alerts).start();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut line_no = 0usize;

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                scheduler.abort();
                return Err(HomewatchError::io("read alarm feed", "<stdin>", e));
            }
        };
        line_no += 1;

        if line.trim().is_empty() {
            continue;
        }

        let alarm = match Alarm::from_json_line(&line) {
            Ok(alarm) => alarm,
            Err(e) => {
                warn!(line = line_no, error = %e, "skipping malformed alarm");
                continue;
            }
        };

        if let Err(e) = service.ingest(alarm) {
            error!(line = line_no, error = %e, "failed to ingest alarm");
            continue;
        }

        if let Some(suggestion) = service.arbiter().consume() {
            match serde_json::to_string(&suggestion) {
                Ok(json) => println!("{}", json),
                Err(e) => warn!(error = %e, "failed to encode suggestion"),
            }
        }
    }

    scheduler.abort();
    service.run_periodic_maintenance().await;
    Ok(())
}
