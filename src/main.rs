//! Proxy control service.
//!
//! Interceptor callbacks running inside the proxy process POST flow summaries
//! here and apply the header modifications and block decisions answered back.
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │              CONTROL SERVICE                  │
//!   interceptor      │  ┌─────────┐   ┌──────────┐   ┌───────────┐  │
//!   callback ────────┼─▶│  http   │──▶│  proxy   │──▶│  policy   │  │
//!   (in-proxy)       │  │ server  │   │  routes  │   │  + stats  │  │
//!                    │  └─────────┘   └──────────┘   └───────────┘  │
//!                    │  ┌────────────────────────────────────────┐  │
//!                    │  │ config · observability · lifecycle ·   │  │
//!                    │  │ security · info                         │  │
//!                    │  └────────────────────────────────────────┘  │
//!                    └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use proxy_control::config::{load_config, ControlConfig};
use proxy_control::http::ControlServer;
use proxy_control::lifecycle::{spawn_signal_listener, Shutdown};
use proxy_control::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "proxy-control")]
#[command(about = "Control service for an interception proxy", long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured bind address.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ControlConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability.log_filter);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => {
                tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    "Failed to parse metrics address"
                );
            }
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    let server = ControlServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
