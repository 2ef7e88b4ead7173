//! Talkable injector proxy.
//!
//! ```text
//!  Client ──▶ listener ──▶ request id ──▶ timeout ──▶ visitor tracking ──▶ forward ──▶ Origin
//!  Client ◀── HTML + beacon + script + UUID cookie ◀──────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use talkable_injector::config::{read_config, validate_config, ConfigError, InjectorConfig};
use talkable_injector::observability::{logging, metrics};
use talkable_injector::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "talkable-injector")]
#[command(about = "Reverse proxy injecting Talkable visitor tracking into HTML pages", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(long)]
    bind: Option<String>,

    /// Override `upstream.address`.
    #[arg(long)]
    upstream: Option<String>,

    /// Override `tracking.site_slug`.
    #[arg(long)]
    site_slug: Option<String>,

    /// Override `tracking.integration_script_url`.
    #[arg(long)]
    integration_url: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<InjectorConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => InjectorConfig::default(),
        };

        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(upstream) = self.upstream {
            config.upstream.address = upstream;
        }
        if let Some(site_slug) = self.site_slug {
            config.tracking.site_slug = site_slug;
        }
        if let Some(url) = self.integration_url {
            config.tracking.integration_script_url = url;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init_logging(config.observability.log_format);
    tracing::info!("talkable-injector v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
    shutdown.trigger();

    server_task.await??;
    tracing::info!("Shutdown complete");
    Ok(())
}
