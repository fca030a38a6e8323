//! Transaction feed loading and normalization.
//!
//! The feed is a CSV table with headers `user_wallet` (or `wallet_address`),
//! `timestamp`, `amount`, and `token_symbol` (or `token`). Rows are never
//! dropped: a malformed amount is coerced to 0.0 and logged at WARN so data
//! quality problems stay visible without silently skewing counts.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{EngineError, Result};
use metasense_core::TransactionRecord;

/// Raw CSV row before normalization.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(alias = "wallet_address", alias = "wallet")]
    user_wallet: String,
    timestamp: String,
    // Deserialized as text so malformed values reach the coercion path
    // instead of failing the whole read.
    #[serde(default)]
    amount: String,
    #[serde(alias = "token")]
    token_symbol: String,
}

/// An in-memory, normalized transaction dataset.
///
/// One instance is loaded per invocation; there is no persistent storage.
#[derive(Debug, Clone)]
pub struct TransactionDataset {
    records: Vec<TransactionRecord>,
    coerced_amounts: usize,
}

impl TransactionDataset {
    /// Load and normalize a CSV feed from a file path.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| EngineError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let dataset = Self::from_csv_reader(file)?;
        info!(
            "Loaded {} transactions from {} ({} amounts coerced)",
            dataset.len(),
            path.display(),
            dataset.coerced_amounts()
        );
        Ok(dataset)
    }

    /// Load and normalize a CSV feed from any reader.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        let mut coerced_amounts = 0usize;

        for (index, row) in csv_reader.deserialize::<RawRow>().enumerate() {
            // Header occupies row 1 of the feed.
            let row_number = index + 2;
            let raw = row?;

            let timestamp =
                parse_timestamp(&raw.timestamp).ok_or_else(|| EngineError::BadTimestamp {
                    row: row_number,
                    value: raw.timestamp.clone(),
                })?;

            let amount = match raw.amount.parse::<f64>() {
                Ok(value) if value.is_finite() && value >= 0.0 => value,
                _ => {
                    warn!(
                        "Row {}: malformed amount \"{}\" coerced to 0",
                        row_number, raw.amount
                    );
                    coerced_amounts += 1;
                    0.0
                }
            };

            records.push(TransactionRecord {
                wallet: raw.user_wallet,
                timestamp,
                amount,
                token: raw.token_symbol,
            });
        }

        Ok(TransactionDataset {
            records,
            coerced_amounts,
        })
    }

    /// Total number of records in the feed.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the feed is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of amounts that were coerced to 0 during loading.
    pub fn coerced_amounts(&self) -> usize {
        self.coerced_amounts
    }

    /// Number of distinct wallets in the feed.
    pub fn wallet_count(&self) -> usize {
        let mut wallets: Vec<String> = self
            .records
            .iter()
            .map(|r| r.wallet.to_lowercase())
            .collect();
        wallets.sort_unstable();
        wallets.dedup();
        wallets.len()
    }

    /// All records for one wallet, in feed order. Address comparison is
    /// case-insensitive so checksummed and lowercase forms match.
    pub fn for_wallet(&self, wallet: &str) -> Vec<TransactionRecord> {
        self.records
            .iter()
            .filter(|r| r.wallet.eq_ignore_ascii_case(wallet))
            .cloned()
            .collect()
    }

    /// All records in the feed.
    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }
}

/// Parse the timestamp formats that appear in spending exports:
/// RFC 3339, `YYYY-MM-DD HH:MM:SS` (with optional fraction), and bare dates.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}
