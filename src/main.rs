//! BoxOffice: venue seat hold/confirm simulator
//!
//! Main entry point that loads configuration, builds the venue, and runs
//! simulated customers against it until the house sells out.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use boxoffice_core::config::{AppConfig, LogFormat};
use boxoffice_core::error::AppError;
use boxoffice_sim::{SimulationOutcome, Simulator};
use boxoffice_venue::Venue;

/// Simulate customers holding and confirming seats in a venue.
#[derive(Debug, Parser)]
#[command(name = "boxoffice", version, about)]
struct Args {
    /// Configuration environment overlay (`config/{env}.toml`).
    /// Falls back to `BOXOFFICE_ENV`, then `development`.
    #[arg(long)]
    env: Option<String>,

    /// Number of rows in the venue.
    #[arg(long)]
    rows: Option<u32>,

    /// Seats per row.
    #[arg(long, visible_alias = "columns")]
    seats_per_row: Option<u32>,

    /// Milliseconds an unconfirmed hold lives.
    #[arg(long, alias = "ttlInMillis")]
    ttl_millis: Option<u64>,

    /// Number of simulated customers.
    #[arg(long, alias = "numWorkers")]
    workers: Option<usize>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match load_configuration(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Simulation failed");
        std::process::exit(1);
    }
}

/// Load configuration files and apply command-line overrides.
fn load_configuration(args: &Args) -> Result<AppConfig, AppError> {
    let env = args
        .env
        .clone()
        .or_else(|| std::env::var("BOXOFFICE_ENV").ok())
        .unwrap_or_else(|| "development".to_string());

    let mut config = AppConfig::load(&env)?;

    if let Some(rows) = args.rows {
        config.venue.rows = rows;
    }
    if let Some(seats_per_row) = args.seats_per_row {
        config.venue.seats_per_row = seats_per_row;
    }
    if let Some(ttl_millis) = args.ttl_millis {
        config.holds.ttl_millis = ttl_millis;
    }
    if let Some(workers) = args.workers {
        config.simulator.workers = workers;
    }

    config.validate()?;
    Ok(config)
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the
/// configured level.
fn init_logging(config: &AppConfig) -> Result<(), AppError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.log_format()? {
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(false)
            .with_thread_names(true)
            .init(),
        LogFormat::Pretty => fmt()
            .pretty()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
    Ok(())
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        rows = config.venue.rows,
        seats_per_row = config.venue.seats_per_row,
        ttl_ms = config.holds.ttl_millis,
        workers = config.simulator.workers,
        "Starting BoxOffice v{}",
        env!("CARGO_PKG_VERSION")
    );

    let venue = Venue::from_config(&config)?;
    let simulator = Simulator::new(venue.clone(), config.simulator.clone());

    let report = simulator.run(shutdown_signal()).await;

    match report.outcome {
        SimulationOutcome::SoldOut => tracing::info!(
            reservations = report.final_stats.reservations,
            "Simulation finished: sold out"
        ),
        SimulationOutcome::Interrupted => tracing::info!(
            available = report.final_stats.available_seats,
            reservations = report.final_stats.reservations,
            "Simulation interrupted"
        ),
    }

    venue.check_partition()?;
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
