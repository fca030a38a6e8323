//! On-chain reputation publisher.
//!
//! Pushes assembled profiles to the ReputationRegistry contract. A publish
//! attempt is at-most-once: a single transaction is submitted and awaited,
//! with no retry on failure. Errors never escape [`ChainPublisher::publish`];
//! every outcome is folded into a [`PublicationResult`] so a chain outage
//! can't take the scoring path down with it.

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use metasense_core::{
    PublicationResult, PublishErrorKind, UserProfile, GAS_BUFFER_DENOMINATOR, GAS_BUFFER_NUMERATOR,
    MAX_REASONING_TAGS,
};

// Type alias for the Alloy provider with wallet support
// This complex type is necessary until Alloy provides a simpler abstraction
// See: https://github.com/alloy-rs/alloy/issues/1800
type WalletProvider = alloy::providers::fillers::FillProvider<
    alloy::providers::fillers::JoinFill<
        alloy::providers::fillers::JoinFill<
            alloy::providers::Identity,
            alloy::providers::fillers::JoinFill<
                alloy::providers::fillers::GasFiller,
                alloy::providers::fillers::JoinFill<
                    alloy::providers::fillers::BlobGasFiller,
                    alloy::providers::fillers::JoinFill<
                        alloy::providers::fillers::NonceFiller,
                        alloy::providers::fillers::ChainIdFiller,
                    >,
                >,
            >,
        >,
        alloy::providers::fillers::WalletFiller<EthereumWallet>,
    >,
    alloy::providers::RootProvider<alloy::transports::http::Http<alloy::transports::http::Client>>,
    alloy::transports::http::Http<alloy::transports::http::Client>,
    alloy::network::Ethereum,
>;

// Generate ReputationRegistry contract bindings
sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract ReputationRegistry {
        function updateUserReputation(
            address user,
            uint16[5] scores,
            uint8 trustLevel,
            uint8 userClass,
            string[] reasoningTags
        ) external;
    }
}

/// Internal failure taxonomy for a publish attempt. Mapped onto
/// [`PublishErrorKind`] at the `publish` boundary.
#[derive(Error, Debug)]
enum PublishError {
    #[error("Invalid wallet address '{0}'")]
    InvalidWallet(String),

    #[error("Profile carries {0} reasoning tags, registry accepts at most {MAX_REASONING_TAGS}")]
    TooManyTags(usize),

    #[error("Gas estimation failed: {0}")]
    GasEstimation(String),

    #[error("Fee estimation failed: {0}")]
    FeeEstimation(String),

    #[error("Transaction submission failed: {0}")]
    Submit(String),

    #[error("Transaction reverted: {0}")]
    Reverted(String),

    #[error("Timed out after {0}s waiting for transaction receipt")]
    ReceiptTimeout(u64),

    #[error("Failed to fetch transaction receipt: {0}")]
    Receipt(String),
}

impl PublishError {
    fn kind(&self) -> PublishErrorKind {
        match self {
            PublishError::InvalidWallet(_) | PublishError::TooManyTags(_) => {
                PublishErrorKind::InternalError
            }
            _ => PublishErrorKind::ChainError,
        }
    }
}

/// Publisher bound to one signer and one registry contract.
pub struct ChainPublisher {
    contract: ReputationRegistry::ReputationRegistryInstance<
        alloy::transports::http::Http<alloy::transports::http::Client>,
        WalletProvider,
    >,
    provider: WalletProvider,
    receipt_timeout: Duration,
    /// Serializes submissions from this signer so concurrent publishes
    /// cannot race on the account nonce.
    submit_lock: Mutex<()>,
}

impl ChainPublisher {
    /// Create a publisher for the given RPC endpoint, signer, and registry.
    pub fn new(
        rpc_url: &str,
        signer: PrivateKeySigner,
        contract_address: Address,
        receipt_timeout_secs: u64,
    ) -> anyhow::Result<Self> {
        let wallet = EthereumWallet::from(signer);

        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_http(rpc_url.parse()?);

        let contract = ReputationRegistry::new(contract_address, provider.clone());

        Ok(Self {
            contract,
            provider,
            receipt_timeout: Duration::from_secs(receipt_timeout_secs),
            submit_lock: Mutex::new(()),
        })
    }

    /// Publish a profile to the registry.
    ///
    /// Always returns a terminal [`PublicationResult`]; failures are reported
    /// in-band with a category and message, never as an `Err`.
    pub async fn publish(&self, profile: &UserProfile) -> PublicationResult {
        match self.try_publish(profile).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Publication failed for {}: {}", profile.wallet, e);
                PublicationResult::failed(e.kind(), e.to_string())
            }
        }
    }

    async fn try_publish(&self, profile: &UserProfile) -> Result<PublicationResult, PublishError> {
        let user = Address::from_str(profile.wallet.trim())
            .map_err(|_| PublishError::InvalidWallet(profile.wallet.clone()))?;

        if profile.reasoning_tags.len() > MAX_REASONING_TAGS {
            return Err(PublishError::TooManyTags(profile.reasoning_tags.len()));
        }

        let call = self.contract.updateUserReputation(
            user,
            profile.scores.as_contract_array(),
            profile.trust_tier.code(),
            profile.user_class.code(),
            profile.reasoning_tags.clone(),
        );

        // One in-flight submission per signer at a time.
        let _guard = self.submit_lock.lock().await;

        let gas_estimate = call
            .estimate_gas()
            .await
            .map_err(|e| PublishError::GasEstimation(e.to_string()))?;
        let gas_limit = buffered_gas_limit(gas_estimate);

        let fees = self
            .provider
            .estimate_eip1559_fees(None)
            .await
            .map_err(|e| PublishError::FeeEstimation(e.to_string()))?;

        let pending = call
            .gas(gas_limit)
            .max_fee_per_gas(fees.max_fee_per_gas)
            .max_priority_fee_per_gas(fees.max_priority_fee_per_gas)
            .send()
            .await
            .map_err(|e| PublishError::Submit(e.to_string()))?;

        let tx_hash = *pending.tx_hash();
        info!(
            "Reputation update sent for {}: 0x{} (gas limit: {})",
            profile.wallet,
            hex::encode(tx_hash),
            gas_limit
        );

        let receipt = tokio::time::timeout(self.receipt_timeout, pending.get_receipt())
            .await
            .map_err(|_| PublishError::ReceiptTimeout(self.receipt_timeout.as_secs()))?
            .map_err(|e| PublishError::Receipt(e.to_string()))?;

        // status = true means success, false means reverted. A reverted
        // transaction still has a receipt, so this check must come before
        // reporting success.
        if !receipt.status() {
            return Err(PublishError::Reverted(format!(
                "0x{} in block {}",
                hex::encode(receipt.transaction_hash),
                receipt.block_number.unwrap_or_default()
            )));
        }

        let block_number = receipt.block_number.unwrap_or_default();
        let gas_used = receipt.gas_used as u64;

        info!(
            "Reputation update confirmed for {} in block {} ({} gas)",
            profile.wallet, block_number, gas_used
        );

        Ok(PublicationResult::confirmed(
            format!("0x{}", hex::encode(receipt.transaction_hash)),
            block_number,
            gas_used,
        ))
    }
}

/// Apply the safety buffer to a gas estimate: estimate * 120 / 100.
fn buffered_gas_limit(estimate: u64) -> u64 {
    estimate / GAS_BUFFER_DENOMINATOR * GAS_BUFFER_NUMERATOR
        + estimate % GAS_BUFFER_DENOMINATOR * GAS_BUFFER_NUMERATOR / GAS_BUFFER_DENOMINATOR
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use metasense_core::{BehavioralMetrics, ReputationScores, TrustTier, UserClass};

    fn test_signer() -> PrivateKeySigner {
        "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef"
            .parse()
            .unwrap()
    }

    fn test_profile(wallet: &str) -> UserProfile {
        let ts = Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap();
        UserProfile {
            wallet: wallet.to_string(),
            generated_at: ts,
            trust_tier: TrustTier::Silver,
            user_class: UserClass::Newcomer,
            scores: ReputationScores {
                consistency: 1000,
                loyalty: 150,
                sophistication: 160,
                activity: 533,
                reliability: 1000,
                overall: 549,
            },
            metrics: BehavioralMetrics {
                total_transactions: 1,
                total_volume: 100.0,
                avg_transaction: 100.0,
                median_transaction: 100.0,
                platform_tenure_days: 0,
                days_active: 1,
                transaction_frequency: 1.0,
                days_since_last_tx: 0,
                spending_cv: 0.0,
                spending_consistency: 0.5,
                large_tx_ratio: 1.0,
                unique_tokens: 1,
                token_concentration: 1.0,
                most_used_token: "USDC".to_string(),
                recent_transactions: 1,
                first_transaction: ts,
                last_transaction: ts,
            },
            reasoning_tags: vec![
                "Moderate reputation (400+ score) indicates developing trust".to_string(),
                "New user: Limited transaction history for full assessment".to_string(),
            ],
        }
    }

    #[test]
    fn test_buffered_gas_limit() {
        assert_eq!(buffered_gas_limit(100_000), 120_000);
        assert_eq!(buffered_gas_limit(21_000), 25_200);
        assert_eq!(buffered_gas_limit(0), 0);
        // Odd values round the same way integer division would after
        // multiplying first: 101 * 120 / 100 = 121.
        assert_eq!(buffered_gas_limit(101), 121);
    }

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(
            PublishError::InvalidWallet("x".into()).kind(),
            PublishErrorKind::InternalError
        );
        assert_eq!(
            PublishError::TooManyTags(9).kind(),
            PublishErrorKind::InternalError
        );
        assert_eq!(
            PublishError::Submit("boom".into()).kind(),
            PublishErrorKind::ChainError
        );
        assert_eq!(
            PublishError::ReceiptTimeout(300).kind(),
            PublishErrorKind::ChainError
        );
        assert_eq!(
            PublishError::Reverted("0xdead".into()).kind(),
            PublishErrorKind::ChainError
        );
    }

    #[tokio::test]
    async fn test_invalid_wallet_fails_in_band() {
        // Address parsing happens before any RPC traffic, so no node is
        // needed for this path.
        let publisher = ChainPublisher::new(
            "http://localhost:8545",
            test_signer(),
            Address::repeat_byte(0x22),
            300,
        )
        .unwrap();

        let result = publisher.publish(&test_profile("not-an-address")).await;
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(PublishErrorKind::InternalError));
        assert!(result.error_message.unwrap().contains("not-an-address"));
        assert!(result.tx_hash.is_none());
    }

    #[tokio::test]
    async fn test_too_many_tags_fails_in_band() {
        let publisher = ChainPublisher::new(
            "http://localhost:8545",
            test_signer(),
            Address::repeat_byte(0x22),
            300,
        )
        .unwrap();

        let mut profile = test_profile("0x1111111111111111111111111111111111111111");
        profile.reasoning_tags = vec!["tag".to_string(); 6];

        let result = publisher.publish(&profile).await;
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(PublishErrorKind::InternalError));
    }
}
