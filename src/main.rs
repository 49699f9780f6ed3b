//! Syslog Forwarder Binary

use clap::{Parser, ValueEnum};
use std::net::IpAddr;
use std::sync::Arc;
use syslog_forwarder::{Config, HttpForwarder, Result, SyslogCollector};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

/// Collect syslog over UDP and TCP and forward it to an HTTP ingestion endpoint
#[derive(Debug, Parser)]
#[command(name = "syslog_forwarder", version, about)]
struct Cli {
    /// Address to bind both syslog sockets to (overrides SYSLOG_HOST)
    #[arg(long)]
    bind_address: Option<IpAddr>,

    /// Port shared by the UDP and TCP sockets (overrides SYSLOG_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Format of the collector's own log output
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    initialize_tracing(cli.log_format);

    info!("Starting syslog forwarder v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = Config::from_env();
    if let Some(bind_address) = cli.bind_address {
        config.bind_address = bind_address;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    info!(
        "Forwarder configuration - Listen: {}, Endpoint: {}, Verify TLS: {}, Device type: {}",
        config.listen_addr(),
        config.endpoint_url,
        config.verify_tls,
        config.device_type
    );

    let forwarder = Arc::new(HttpForwarder::from_config(&config)?);

    let collector = match SyslogCollector::bind(config, forwarder).await {
        Ok(collector) => collector,
        Err(e) => {
            error!("Cannot start syslog listeners: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = collector.run().await {
        error!("Collector failed: {}", e);
        std::process::exit(1);
    }

    info!("Exiting");
    Ok(())
}

/// Initialize structured logging
fn initialize_tracing(format: LogFormat) {
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter_layer);

    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_file(false)
                    .with_line_number(false)
                    .json(),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(false).pretty())
            .init(),
    }
}
