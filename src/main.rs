//! HTTP/1.1 server binary.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────────┐
//!                  │                       SERVER                         │
//!   Client         │  ┌──────────┐   ┌───────────┐   ┌────────────────┐   │
//!   ───────────────┼─▶│ listener │──▶│ transport │──▶│  connection    │   │
//!                  │  │ (+ TLS)  │   │ (framing) │   │  (parse, HEAD) │   │
//!                  │  └──────────┘   └───────────┘   └───────┬────────┘   │
//!                  │                                         ▼            │
//!                  │                                 ┌────────────────┐   │
//!   ◀──────────────┼─────────────── response ◀───────│ routes / static│   │
//!                  │                                 └────────────────┘   │
//!                  └──────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use clap::Parser;

use tinyhttpd::config::{load_config, ServerConfig};
use tinyhttpd::lifecycle::signals::trigger_on_ctrl_c;
use tinyhttpd::observability::{logging, metrics};
use tinyhttpd::{HttpServer, Shutdown, TlsContext};

#[derive(Parser)]
#[command(name = "httpd")]
#[command(about = "Minimal HTTP/1.1 server with static files and TLS", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the static document root
    #[arg(long)]
    static_root: Option<String>,

    /// Override the plaintext port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override the encrypted port
    #[arg(long)]
    https_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(root) = cli.static_root {
        config.static_root = root;
    }
    if let Some(port) = cli.http_port {
        config.http_port = port;
    }
    if let Some(port) = cli.https_port {
        config.https_port = port;
    }

    logging::init(&config.observability.log_level);
    tracing::info!("httpd v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        http_port = config.http_port,
        https_port = config.https_port,
        static_root = %config.static_root,
        max_connections = config.limits.max_connections,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let mut builder = HttpServer::builder(config.clone());
    if let Some(tls) = &config.tls {
        let context = TlsContext::initialize(Path::new(&tls.cert_path), Path::new(&tls.key_path)).await?;
        builder = builder.tls(context);
    }
    let server = builder.build()?;

    let shutdown = Shutdown::new();
    tokio::spawn(trigger_on_ctrl_c(shutdown.clone()));

    server.run(&shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
