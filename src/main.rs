use anyhow::Context;
use api_client::HttpProviderClient;
use clap::{Parser, Subcommand};
use configuration::{Config, LogFormat};
use dashboard::{AdapterSettings, DashboardService};
use events::{DashboardEvent, NoticeLevel};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod render;

/// The main entry point for the StockLens dashboard.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, if present
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();
    let mut config = configuration::load_config(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }

    // The guard flushes the log file on exit.
    let _guard = init_tracing(&config);

    let client = HttpProviderClient::new(&config.provider)?;
    let service = Arc::new(DashboardService::new(
        Arc::new(client),
        AdapterSettings::from_config(&config),
    ));

    tokio::spawn(log_events(service.subscribe()));

    // Execute the appropriate command
    match cli.command {
        Commands::Serve(args) => {
            let addr = args.addr.unwrap_or(config.server.addr);
            web_server::run_server(addr, service).await?;
        }
        Commands::Report(args) => {
            if args.run_analysis {
                service.run_analysis().await?;
            } else {
                service.refresh_recommendations().await?;
            }
            let view = service.dashboard(args.sector.as_deref()).await?;
            println!("{}", render::dashboard(&view));
        }
        Commands::Stock(args) => {
            let view = service.stock_detail(&args.symbol).await?;
            println!("{}", render::stock_detail(&view));
        }
        Commands::Telemetry => {
            service.refresh_telemetry().await?;
            let view = service.telemetry_view().await?;
            println!("{}", render::telemetry(&view));
        }
    }

    Ok(())
}

/// Mirrors dashboard events into the log until the service is dropped.
async fn log_events(mut event_rx: broadcast::Receiver<DashboardEvent>) {
    loop {
        match event_rx.recv().await {
            Ok(DashboardEvent::Notice(notice)) => match notice.level {
                NoticeLevel::Error | NoticeLevel::Warn => {
                    tracing::warn!(title = %notice.title, message = %notice.message, "Notice.")
                }
                NoticeLevel::Info | NoticeLevel::Success => {
                    tracing::info!(title = %notice.title, message = %notice.message, "Notice.")
                }
            },
            Ok(event) => tracing::debug!(?event, "Dashboard event."),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(skipped = n, "Event listener lagged behind.");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A dashboard for AI stock recommendations and provider telemetry.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path of the TOML configuration file. A missing file means defaults.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Overrides the console log format from the configuration.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard views over HTTP.
    Serve(ServeArgs),
    /// Print the recommendations table and sector outlook.
    Report(ReportArgs),
    /// Print the detail view of one symbol.
    Stock(StockArgs),
    /// Print request, cost, latency and error telemetry.
    Telemetry,
}

#[derive(Parser)]
struct ServeArgs {
    /// The listen address (e.g., "127.0.0.1:3000"). Defaults to `server.addr`.
    #[arg(long)]
    addr: Option<SocketAddr>,
}

#[derive(Parser)]
struct ReportArgs {
    /// Only show recommendations of this sector (e.g., "Technology").
    #[arg(long)]
    sector: Option<String>,

    /// Ask the provider for a fresh analysis before fetching.
    #[arg(long)]
    run_analysis: bool,
}

#[derive(Parser)]
struct StockArgs {
    /// The ticker symbol (e.g., "AAPL").
    symbol: String,
}

// ==============================================================================
// Logging
// ==============================================================================

/// Console output plus a daily rolling file, both behind one `EnvFilter`.
/// `RUST_LOG` wins over `logging.filter`.
fn init_tracing(config: &Config) -> WorkerGuard {
    let logging = &config.logging;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.filter));

    let file_appender = tracing_appender::rolling::daily(&logging.directory, &logging.file_prefix);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let full = (logging.format == LogFormat::Full).then(|| fmt::layer());
    let compact = (logging.format == LogFormat::Compact).then(|| fmt::layer().compact());

    tracing_subscriber::registry()
        .with(filter)
        .with(full)
        .with(compact)
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .init();

    guard
}
