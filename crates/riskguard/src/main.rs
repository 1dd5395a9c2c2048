use std::io::Read;

use anyhow::{Context, Result};
use clap::Parser;
use riskguard_models::config::RiskGuardConfig;
use riskguard_models::RequestContext;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "riskguard", about = "Single-shot risk evaluation adapter")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/riskguard.toml")]
    config: String,

    /// Read RequestContext JSON from a file instead of stdin
    #[arg(short, long)]
    input: Option<String>,

    /// Pretty-print the output JSON
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load config, falling back to defaults when the file is absent.
    let config: RiskGuardConfig = match std::fs::read_to_string(&cli.config) {
        Ok(config_str) => toml::from_str(&config_str).with_context(|| "Failed to parse config")?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %cli.config, "Config file not found; using defaults");
            RiskGuardConfig::default()
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read config: {}", cli.config));
        }
    };

    // Read request
    let request_json = if let Some(input_path) = &cli.input {
        std::fs::read_to_string(input_path)
            .with_context(|| format!("Failed to read input: {input_path}"))?
    } else {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        buf
    };

    let request: RequestContext =
        serde_json::from_str(&request_json).context("Failed to parse RequestContext JSON")?;

    // Build executor and run the request
    let executor = riskguard::build_executor(&config).context("Failed to build executor")?;

    let replies = riskguard::evaluate(&executor, &request).await;

    // Output replies as JSON to stdout, one per line
    for reply in replies {
        let output = if cli.pretty {
            serde_json::to_string_pretty(&reply)?
        } else {
            serde_json::to_string(&reply)?
        };
        println!("{output}");
    }

    Ok(())
}
