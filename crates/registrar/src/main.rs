//! MetaSense registrar - reputation scoring and on-chain publication
//!
//! This binary provides:
//! - CSV transaction feed loading and per-wallet scoring
//! - Trust tier and usage-class classification
//! - Publication to the ReputationRegistry contract
//! - An HTTP scoring API (`serve` subcommand)

use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use metasense_engine::{assemble_profile, TransactionDataset};
use metasense_registrar::config::Config;
use metasense_registrar::publisher::ChainPublisher;
use metasense_registrar::server::{self, AppState};

#[derive(Parser)]
#[command(name = "metasense-registrar")]
#[command(version, about = "MetaSense reputation scoring and registry publisher", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "registrar.toml")]
    config: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP scoring API
    Serve,

    /// Score a wallet from the feed and print the profile (no publication)
    Score {
        /// Wallet address to score
        wallet: String,
    },

    /// Score a wallet and publish the profile to the registry
    Publish {
        /// Wallet address to score and publish
        wallet: String,
    },

    /// Load and validate the configuration, then exit
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_file(&cli.config).context("Failed to load configuration")?;

    init_logging(cli.debug, &config)?;

    info!("MetaSense registrar starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(&config).await?,
        Commands::Score { wallet } => score_wallet(&config, &wallet)?,
        Commands::Publish { wallet } => publish_wallet(&config, &wallet).await?,
        Commands::CheckConfig => check_config(&config),
    }

    Ok(())
}

/// Initialize tracing subscriber for logging
fn init_logging(debug: bool, config: &Config) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = if debug {
        EnvFilter::new("metasense_registrar=debug,metasense_engine=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "metasense_registrar={level},metasense_engine={level},tower_http=info",
                level = config.logging.level
            ))
        })
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.logging.format == "json" {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }

    Ok(())
}

fn build_publisher(config: &Config) -> Result<ChainPublisher> {
    let signer = config
        .publisher_private_key_with_prefix()
        .parse::<PrivateKeySigner>()
        .context("Failed to parse publisher private key")?;

    ChainPublisher::new(
        &config.network.rpc_url,
        signer,
        config.contracts.reputation_registry,
        config.publisher.receipt_timeout_secs,
    )
    .context("Failed to create registry publisher")
}

/// Run the HTTP scoring API.
async fn run_server(config: &Config) -> Result<()> {
    info!("Configuration loaded");
    info!("  Chain ID: {}", config.network.chain_id);
    info!("  RPC URL: {}", config.network.rpc_url);
    info!("  Registry: {}", config.contracts.reputation_registry);
    info!("  Feed: {}", config.dataset.path);

    let publisher = build_publisher(config)?;
    let state = AppState {
        dataset_path: config.dataset.path.clone(),
        publisher: Arc::new(publisher),
    };

    let bind_addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .context("Invalid server bind address")?;

    server::serve(state, bind_addr).await
}

fn load_wallet_records(
    config: &Config,
    wallet: &str,
) -> Result<Vec<metasense_core::TransactionRecord>> {
    let dataset = TransactionDataset::from_csv_path(&config.dataset.path)
        .context("Failed to load transaction feed")?;

    let records = dataset.for_wallet(wallet);
    if records.is_empty() {
        anyhow::bail!("No transactions found for wallet {}", wallet);
    }
    Ok(records)
}

/// Score a wallet and print the profile without publishing.
fn score_wallet(config: &Config, wallet: &str) -> Result<()> {
    let records = load_wallet_records(config, wallet)?;
    let profile = assemble_profile(wallet, &records, chrono::Utc::now())
        .context("Failed to assemble profile")?;

    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

/// Score a wallet, publish to the registry, and print both outcomes.
async fn publish_wallet(config: &Config, wallet: &str) -> Result<()> {
    let records = load_wallet_records(config, wallet)?;
    let profile = assemble_profile(wallet, &records, chrono::Utc::now())
        .context("Failed to assemble profile")?;

    info!(
        "Publishing reputation for {} (overall: {}, tier: {}, class: {})",
        wallet, profile.scores.overall, profile.trust_tier, profile.user_class
    );

    let publisher = build_publisher(config)?;
    let publication = publisher.publish(&profile).await;

    let output = serde_json::json!({
        "user_profile": &profile,
        "publication": &publication,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    if !publication.success {
        anyhow::bail!(
            "Publication failed: {}",
            publication
                .error_message
                .unwrap_or_else(|| "unknown error".to_string())
        );
    }

    Ok(())
}

/// Print a summary of the validated configuration.
fn check_config(config: &Config) {
    println!("Configuration OK");
    println!("  Chain ID: {}", config.network.chain_id);
    println!("  RPC URL: {}", config.network.rpc_url);
    println!("  Registry: {}", config.contracts.reputation_registry);
    println!("  Feed: {}", config.dataset.path);
    println!("  Bind address: {}", config.server.bind_addr);
    println!(
        "  Receipt timeout: {}s",
        config.publisher.receipt_timeout_secs
    );
}
