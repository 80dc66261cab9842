use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use relayswitch::app::App;
use relayswitch::config::{Config, SettingsStore};
use relayswitch::mockapi::MockApi;
use relayswitch::probe::HttpTransport;

/// Channel failover playground daemon.
#[derive(Parser)]
#[command(name = "relayswitch")]
struct Cli {
    /// Path to the config file (default: the platform config directory).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_level(true))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let path = cli.config.unwrap_or_else(Config::config_path);
    let config = Config::load_from(&path).context("loading configuration")?;
    let settings = SettingsStore::new(config, path);

    let current = settings.settings();
    let (_mock_api, base_url) = match current.api_base_url.clone() {
        Some(url) => (None, url),
        None => {
            let api = MockApi::start()
                .await
                .context("starting embedded mock api")?;
            tracing::info!(addr = %api.addr(), "embedded mock api listening");
            let url = api.base_url();
            (Some(api), url)
        }
    };

    let transport = Arc::new(HttpTransport::new(
        &base_url,
        Duration::from_millis(current.connect_timeout_ms),
        Duration::from_millis(current.request_timeout_ms),
    )?);

    App::new(settings, transport).run().await
}
