use std::path::PathBuf;

use admission_harness::config::{self, validation::validate_config, ServerConfig};
use admission_harness::lifecycle::{signals, startup, Shutdown};
use admission_harness::observability::logging;
use clap::Parser;

#[derive(Parser)]
#[command(name = "admission-harness")]
#[command(about = "HTTP admission-control and latency-injection server", long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override `observability.log_level`.
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }
    validate_config(&config).map_err(config::ConfigError::Validation)?;

    logging::init(&config.observability.log_level);
    tracing::info!("admission-harness v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        tls = config.listener.tls.is_some(),
        rate = config.rate_limit.rate,
        burst = config.rate_limit.burst,
        timeout_ms = config.time_limit.timeout_ms,
        minimum_delay_ms = config.delay.minimum_ms,
        maximum_delay_ms = config.delay.maximum_ms,
        upstream = ?config.upstream.url,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);
    startup::start(config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
