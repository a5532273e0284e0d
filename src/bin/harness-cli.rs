use std::sync::Arc;

use admission_harness::config::{validation::validate_harness, ClientConfig, HarnessConfig};
use admission_harness::harness::{build_client, LoadHarness, TracingSink};
use admission_harness::observability::logging;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "harness-cli")]
#[command(about = "Load driver and control client for the admission harness", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "https://localhost:8443")]
    url: String,

    /// Reject self-signed server certificates.
    #[arg(long)]
    strict_tls: bool,

    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive concurrent pings and print a summary
    Run {
        #[arg(short = 'n', long, default_value_t = 5)]
        requesters: usize,
        #[arg(short = 'm', long, default_value_t = 10)]
        requests: usize,
        /// Pause between requests of one requester
        #[arg(long, default_value_t = 0)]
        pause_ms: u64,
        /// Client-side timeout, 0 to disable
        #[arg(long, default_value_t = 500)]
        timeout_ms: u64,
        #[arg(long)]
        http2: bool,
    },
    /// Show the current rate limit
    GetRateLimit,
    /// Replace the rate limit
    SetRateLimit {
        #[arg(long)]
        rate: f64,
        #[arg(long, default_value_t = 1)]
        burst: i64,
    },
    /// Show the current per-request deadline
    GetTimeLimit,
    /// Replace the per-request deadline, 0 to disable
    SetTimeLimit {
        #[arg(long)]
        ms: i64,
    },
    /// Show the current delay bounds
    GetDelay,
    /// Replace the delay bounds; omit --max for a fixed delay
    SetDelay {
        #[arg(long)]
        min: i64,
        #[arg(long)]
        max: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let base = cli.url.trim_end_matches('/').to_string();
    let transport = ClientConfig {
        accept_invalid_certs: !cli.strict_tls,
        ..ClientConfig::default()
    };

    match cli.command {
        Commands::Run {
            requesters,
            requests,
            pause_ms,
            timeout_ms,
            http2,
        } => {
            let config = HarnessConfig {
                base_url: base,
                requesters,
                requests_per_requester: requests,
                pause_ms,
                client: ClientConfig {
                    timeout_ms,
                    http2_prior_knowledge: http2,
                    ..transport
                },
            };
            run(config).await
        }
        command => control(command, &base, &transport).await,
    }
}

async fn run(config: HarnessConfig) -> Result<(), Box<dyn std::error::Error>> {
    validate_harness(&config).map_err(|errors| {
        errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    })?;

    let harness = LoadHarness::new(config, Arc::new(TracingSink))?;
    let report = harness.run().await;
    println!("\n{report}\n");
    Ok(())
}

async fn control(
    command: Commands,
    base: &str,
    transport: &ClientConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client(transport)?;
    let res = match command {
        Commands::GetRateLimit => client.get(format!("{base}/rate-limit")).send().await?,
        Commands::SetRateLimit { rate, burst } => {
            put(&client, base, "rate-limit", json!({ "rate": rate, "burst": burst })).await?
        }
        Commands::GetTimeLimit => client.get(format!("{base}/time-limit")).send().await?,
        Commands::SetTimeLimit { ms } => {
            put(&client, base, "time-limit", json!({ "timeLimit": ms })).await?
        }
        Commands::GetDelay => client.get(format!("{base}/delay")).send().await?,
        Commands::SetDelay { min, max: None } => {
            put(&client, base, "delay", json!({ "delay": min })).await?
        }
        Commands::SetDelay { min, max: Some(max) } => {
            put(
                &client,
                base,
                "delay",
                json!({ "minimumDelay": min, "maximumDelay": max }),
            )
            .await?
        }
        Commands::Run { .. } => return Err("run is not a control command".into()),
    };
    print_response(res).await
}

async fn put(
    client: &reqwest::Client,
    base: &str,
    path: &str,
    body: Value,
) -> reqwest::Result<reqwest::Response> {
    client.put(format!("{base}/{path}")).json(&body).send().await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: control API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
