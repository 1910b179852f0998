//! devnet-transfer
//!
//! Loads a secret key from the environment (or `.env`), sends one transfer
//! (a self-transfer by default) to a Solana test network, and waits for it
//! to be confirmed.
//!
//! # Architecture Overview
//!
//! ```text
//!   .env / env var ──▶ key_loader ──▶ wallet ──┐
//!                                              ▼
//!   config (TOML + CLI) ──▶ transaction builder ──▶ submitter ──▶ classifier
//!                                 ▲                  │  ▲
//!                                 │                  ▼  │
//!                                 └──────────── RPC collaborator
//!                                                     (timeouts, failover)
//!
//!   Cross-cutting: resilience (backoff/retry/deadlines), lifecycle
//!   (Ctrl-C + run deadline → cancellation), observability (tracing, metrics)
//! ```
//!
//! stdout carries the result, stderr carries logs and failures; the exit
//! code is 0 on success and category-specific otherwise.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use devnet_transfer::blockchain::{ErrorClassifier, SolanaRpcClient, TransferError};
use devnet_transfer::config::{
    load_dotenv, load_or_default, validate_config, ConfigError, TransferConfig,
};
use devnet_transfer::lifecycle::{signals, Shutdown};
use devnet_transfer::observability::logging::init_logging;
use devnet_transfer::pipeline::TransferPipeline;
use devnet_transfer::report;

#[derive(Parser)]
#[command(name = "devnet-transfer")]
#[command(about = "Send one transfer to a Solana test network and wait for confirmation")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Recipient public key (defaults to the payer itself)
    #[arg(long)]
    to: Option<String>,

    /// Amount in lamports
    #[arg(long)]
    lamports: Option<u64>,

    /// JSON-RPC endpoint URL
    #[arg(long)]
    rpc_url: Option<String>,

    /// Environment variable holding the secret key
    #[arg(long)]
    key_env: Option<String>,

    /// Emit JSON log lines
    #[arg(long)]
    json_logs: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut TransferConfig) {
        if let Some(to) = &self.to {
            config.transfer.recipient = to.clone();
        }
        if let Some(lamports) = self.lamports {
            config.transfer.lamports = lamports;
        }
        if let Some(rpc_url) = &self.rpc_url {
            config.network.rpc_url = rpc_url.clone();
        }
        if let Some(key_env) = &self.key_env {
            config.key_env_var = key_env.clone();
        }
        if self.json_logs {
            config.observability.json = true;
        }
        if self.verbose {
            config.observability.log_level = "debug".to_string();
        }
    }
}

fn build_config(cli: &Cli) -> Result<TransferConfig, ConfigError> {
    load_dotenv(Path::new(".env"))?;
    let mut config = load_or_default(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            let defaults = TransferConfig::default();
            let classified = ErrorClassifier::new(&defaults.key_env_var, &defaults.network)
                .classify(&TransferError::from(e));
            let _ = report::render_failure(&classified, &mut std::io::stderr().lock());
            return ExitCode::from(classified.category.exit_code());
        }
    };

    init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        rpc_url = %config.network.rpc_url,
        commitment = %config.network.commitment,
        max_attempts = config.retries.max_attempts,
        confirmation_timeout_secs = config.confirmation.timeout_secs,
        "devnet-transfer starting"
    );

    let shutdown = Shutdown::new();
    signals::cancel_on_ctrl_c(shutdown.clone());
    shutdown.trigger_after(Duration::from_secs(config.deadline_secs));

    let client = Arc::new(SolanaRpcClient::new(config.network.clone()));
    let pipeline = TransferPipeline::new(config, client);

    let report = pipeline.run_from_env(&shutdown.subscribe()).await;

    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    if let Err(e) = report::render(&report, &mut stdout.lock(), &mut stderr.lock()) {
        tracing::error!(error = %e, "Failed to write report");
    }

    ExitCode::from(report.exit_code())
}
