//! Configuration for the registrar service.
//!
//! Loaded from a TOML file with `${VAR_NAME}` environment-variable expansion,
//! so secrets like the publisher key never need to live in the file itself.

use alloy::primitives::Address;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Top-level registrar configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Network configuration
    pub network: NetworkConfig,

    /// Contract addresses
    pub contracts: ContractsConfig,

    /// Transaction feed configuration
    pub dataset: DatasetConfig,

    /// Publisher configuration
    pub publisher: PublisherConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Ethereum RPC URL
    pub rpc_url: String,

    /// Chain ID (e.g., 11155111 for Sepolia)
    pub chain_id: u64,
}

/// Contract addresses configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractsConfig {
    /// ReputationRegistry contract address (updateUserReputation target)
    pub reputation_registry: Address,
}

/// Transaction feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Path to the CSV transaction feed
    pub path: String,
}

/// Publisher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// Private key for the publisher account (hex string, 0x prefix optional)
    pub private_key: String,

    /// Seconds to wait for a transaction receipt before giving up
    #[serde(default = "default_receipt_timeout_secs")]
    pub receipt_timeout_secs: u64,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. "0.0.0.0:8080"
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_receipt_timeout_secs() -> u64 {
    300
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Environment variables can be referenced with `${VAR_NAME}` syntax,
    /// for example `private_key = "${PUBLISHER_PRIVATE_KEY}"`. Placeholders
    /// inside comments are left alone so example lines don't break loading.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let expanded = Self::expand_env_vars(&contents)?;

        let config: Config = toml::from_str(&expanded)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml).context("Failed to parse TOML configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.network.rpc_url.is_empty() {
            anyhow::bail!("Network RPC URL cannot be empty");
        }
        if self.network.chain_id == 0 {
            anyhow::bail!("Chain ID must be non-zero");
        }

        if self.contracts.reputation_registry.is_zero() {
            anyhow::bail!("Contracts reputation_registry must be a non-zero address");
        }

        if self.dataset.path.is_empty() {
            anyhow::bail!("Dataset path cannot be empty");
        }

        if self.publisher.private_key.is_empty() {
            anyhow::bail!("Publisher private_key cannot be empty");
        }
        let key = self.publisher.private_key.trim_start_matches("0x");
        if key.len() != 64 {
            anyhow::bail!(
                "Publisher private_key must be 64 hex characters (got {})",
                key.len()
            );
        }
        if !key.chars().all(|c| c.is_ascii_hexdigit()) {
            anyhow::bail!("Publisher private_key must be a valid hex string");
        }

        if self.publisher.receipt_timeout_secs == 0 {
            anyhow::bail!("Publisher receipt_timeout_secs must be > 0");
        }

        self.server
            .bind_addr
            .parse::<SocketAddr>()
            .with_context(|| {
                format!(
                    "Server bind_addr is not a valid socket address: '{}'",
                    self.server.bind_addr
                )
            })?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!(
                "Logging level must be one of: {} (got '{}')",
                valid_levels.join(", "),
                self.logging.level
            );
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!(
                "Logging format must be one of: {} (got '{}')",
                valid_formats.join(", "),
                self.logging.format
            );
        }

        Ok(())
    }

    /// Expand `${VAR_NAME}` placeholders against the process environment.
    ///
    /// Placeholders inside TOML comments (after a `#` that is outside any
    /// string) are not expanded; placeholders inside quoted strings are.
    /// An unset variable or a malformed placeholder fails the load.
    fn expand_env_vars(input: &str) -> Result<String> {
        let mut result = String::with_capacity(input.len());
        let mut chars = input.chars().peekable();
        let mut in_double_quote = false;
        let mut in_single_quote = false;
        let mut in_comment = false;

        while let Some(ch) = chars.next() {
            match ch {
                '"' if !in_single_quote && !in_comment => {
                    in_double_quote = !in_double_quote;
                    result.push(ch);
                }
                '\'' if !in_double_quote && !in_comment => {
                    in_single_quote = !in_single_quote;
                    result.push(ch);
                }
                '#' if !in_double_quote && !in_single_quote => {
                    in_comment = true;
                    result.push(ch);
                }
                '\n' => {
                    in_comment = false;
                    result.push(ch);
                }
                '$' if !in_comment && chars.peek() == Some(&'{') => {
                    chars.next();

                    let mut var_name = String::new();
                    let mut found_close = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            found_close = true;
                            break;
                        }
                        var_name.push(c);
                    }

                    if !found_close {
                        anyhow::bail!("Unclosed environment variable placeholder");
                    }
                    if var_name.is_empty() {
                        anyhow::bail!("Empty environment variable name in placeholder");
                    }

                    match std::env::var(&var_name) {
                        Ok(value) => result.push_str(&value),
                        Err(_) => {
                            anyhow::bail!("Environment variable '{}' is not set", var_name);
                        }
                    }
                }
                _ => result.push(ch),
            }
        }

        Ok(result)
    }

    /// Publisher private key with a 0x prefix, for signer parsing.
    pub fn publisher_private_key_with_prefix(&self) -> String {
        let key = self.publisher.private_key.trim_start_matches("0x");
        format!("0x{}", key)
    }
}
