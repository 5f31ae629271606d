use api_client::HttpProviderClient;
use dashboard::{AdapterSettings, DashboardService};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// This main function is the entry point when running `cargo run -p web-server`.
// It loads the configuration and hands a service to `run_server`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = configuration::load_config("config.toml")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .init();

    let client = HttpProviderClient::new(&config.provider)?;
    let service = Arc::new(DashboardService::new(
        Arc::new(client),
        AdapterSettings::from_config(&config),
    ));
    web_server::run_server(config.server.addr, service).await
}
