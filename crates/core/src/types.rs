//! Core types for MetaSense.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Trust tier derived from the overall reputation score.
///
/// The integer codes MUST match the `TrustLevel` enum in the reputation
/// contract. Labels are used everywhere else (profiles, API responses); the
/// codes appear only at publish time. Keeping both forms on one type removes
/// the class of "unknown label" runtime errors at the publish boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrustTier {
    /// Overall below 400.
    Bronze,
    /// Overall in [400, 600).
    Silver,
    /// Overall in [600, 800).
    Gold,
    /// Overall of 800 or more.
    Platinum,
}

impl TrustTier {
    /// Contract enum code (uint8).
    pub const fn code(&self) -> u8 {
        match self {
            TrustTier::Bronze => 0,
            TrustTier::Silver => 1,
            TrustTier::Gold => 2,
            TrustTier::Platinum => 3,
        }
    }

    /// Build from a contract enum code.
    pub fn from_code(code: u8) -> Result<Self, CoreError> {
        match code {
            0 => Ok(TrustTier::Bronze),
            1 => Ok(TrustTier::Silver),
            2 => Ok(TrustTier::Gold),
            3 => Ok(TrustTier::Platinum),
            other => Err(CoreError::UnknownTrustTier(other)),
        }
    }

    /// Canonical display label.
    pub const fn as_str(&self) -> &'static str {
        match self {
            TrustTier::Bronze => "Bronze",
            TrustTier::Silver => "Silver",
            TrustTier::Gold => "Gold",
            TrustTier::Platinum => "Platinum",
        }
    }
}

impl fmt::Display for TrustTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TrustTier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bronze" => Ok(TrustTier::Bronze),
            "silver" => Ok(TrustTier::Silver),
            "gold" => Ok(TrustTier::Gold),
            "platinum" => Ok(TrustTier::Platinum),
            _ => Err(CoreError::UnknownTrustTierLabel(s.to_string())),
        }
    }
}

impl Serialize for TrustTier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TrustTier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        label
            .parse()
            .map_err(|e| serde::de::Error::custom(format!("{}", e)))
    }
}

/// Behavioral usage-class label derived from the priority rule chain.
///
/// Codes MUST match the `UserClass` enum in the reputation contract. Parsing
/// tolerates the spaced labels ("Casual User"), the compact forms
/// ("CasualUser"), and any casing, mirroring the forms that appear in
/// exported datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserClass {
    /// Default class for wallets with too little history.
    Newcomer,
    /// At least 3 transactions over at least 7 days.
    CasualUser,
    /// Sustained moderate usage.
    RegularUser,
    /// Frequent, high-reputation usage.
    PowerUser,
    /// High-value wallet by volume or average amount.
    Whale,
    /// Long-tenured, high-count, high-reputation wallet.
    Veteran,
}

impl UserClass {
    /// Contract enum code (uint8).
    pub const fn code(&self) -> u8 {
        match self {
            UserClass::Newcomer => 0,
            UserClass::CasualUser => 1,
            UserClass::RegularUser => 2,
            UserClass::PowerUser => 3,
            UserClass::Whale => 4,
            UserClass::Veteran => 5,
        }
    }

    /// Build from a contract enum code.
    pub fn from_code(code: u8) -> Result<Self, CoreError> {
        match code {
            0 => Ok(UserClass::Newcomer),
            1 => Ok(UserClass::CasualUser),
            2 => Ok(UserClass::RegularUser),
            3 => Ok(UserClass::PowerUser),
            4 => Ok(UserClass::Whale),
            5 => Ok(UserClass::Veteran),
            other => Err(CoreError::UnknownUserClass(other)),
        }
    }

    /// Canonical display label.
    pub const fn as_str(&self) -> &'static str {
        match self {
            UserClass::Newcomer => "Newcomer",
            UserClass::CasualUser => "Casual User",
            UserClass::RegularUser => "Regular User",
            UserClass::PowerUser => "Power User",
            UserClass::Whale => "Whale",
            UserClass::Veteran => "Veteran",
        }
    }
}

impl fmt::Display for UserClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserClass {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Normalize away spacing so "Casual User", "CasualUser", and
        // "casual user" all resolve to the same class.
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "newcomer" => Ok(UserClass::Newcomer),
            "casualuser" => Ok(UserClass::CasualUser),
            "regularuser" => Ok(UserClass::RegularUser),
            "poweruser" => Ok(UserClass::PowerUser),
            "whale" => Ok(UserClass::Whale),
            "veteran" => Ok(UserClass::Veteran),
            _ => Err(CoreError::UnknownUserClassLabel(s.to_string())),
        }
    }
}

impl Serialize for UserClass {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UserClass {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        label
            .parse()
            .map_err(|e| serde::de::Error::custom(format!("{}", e)))
    }
}

/// One normalized transaction from the spending ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Wallet address string as it appears in the feed.
    pub wallet: String,
    /// Transaction instant (UTC).
    pub timestamp: DateTime<Utc>,
    /// Amount in feed units. Never negative; malformed values are coerced
    /// to 0.0 by the dataset loader.
    pub amount: f64,
    /// Token symbol.
    pub token: String,
}

impl TransactionRecord {
    /// Create a new record.
    pub fn new(
        wallet: impl Into<String>,
        timestamp: DateTime<Utc>,
        amount: f64,
        token: impl Into<String>,
    ) -> Self {
        TransactionRecord {
            wallet: wallet.into(),
            timestamp,
            amount,
            token: token.into(),
        }
    }
}

/// Behavioral statistics derived from one wallet's transactions.
///
/// Immutable once computed. Ratio fields are rounded to 3 decimal places and
/// monetary fields to 2 at computation time; scores are derived from the
/// rounded values so two runs on identical rounded input always agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralMetrics {
    /// Number of transactions.
    pub total_transactions: u64,
    /// Sum of amounts (2 dp).
    pub total_volume: f64,
    /// Mean amount (2 dp).
    pub avg_transaction: f64,
    /// Median amount (2 dp).
    pub median_transaction: f64,

    /// Days since the first transaction, floored.
    pub platform_tenure_days: u64,
    /// Number of distinct UTC dates with activity.
    pub days_active: u64,
    /// Transactions per active day (2 dp).
    pub transaction_frequency: f64,
    /// Days since the most recent transaction, floored.
    pub days_since_last_tx: u64,

    /// Coefficient of variation of amounts (3 dp, >= 0).
    pub spending_cv: f64,
    /// 1 / (stddev of daily totals + 1) when >= 2 active days, else 0.5 (3 dp).
    pub spending_consistency: f64,
    /// Share of transactions at or above the 80th-percentile amount (3 dp).
    pub large_tx_ratio: f64,

    /// Distinct token count.
    pub unique_tokens: u64,
    /// Share of transactions in the most-used token (3 dp).
    pub token_concentration: f64,
    /// Most-used token symbol (ties broken lexicographically).
    pub most_used_token: String,

    /// Transactions inside the trailing 30-day window.
    pub recent_transactions: u64,
    /// Instant of the first transaction.
    pub first_transaction: DateTime<Utc>,
    /// Instant of the last transaction.
    pub last_transaction: DateTime<Utc>,
}

/// The five weighted sub-scores plus the overall composite.
///
/// Invariant: every field is in [0, 1000]. Sub-scores are rounded to integers
/// first; `overall` is the rounded weighted sum of the rounded sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationScores {
    /// Spending pattern regularity.
    pub consistency: u16,
    /// Platform tenure and sustained usage.
    pub loyalty: u16,
    /// Token diversity and transaction size.
    pub sophistication: u16,
    /// Frequency and recent engagement.
    pub activity: u16,
    /// Consistency indicator and recency of use.
    pub reliability: u16,
    /// Weighted composite of the five sub-scores.
    pub overall: u16,
}

impl ReputationScores {
    /// Sub-scores in the fixed contract order:
    /// [consistency, loyalty, sophistication, activity, reliability].
    pub const fn as_contract_array(&self) -> [u16; 5] {
        [
            self.consistency,
            self.loyalty,
            self.sophistication,
            self.activity,
            self.reliability,
        ]
    }
}

/// An assembled reputation profile, one per scoring request.
///
/// Created fresh on every request and never mutated; after a successful
/// publication the chain is the system of record and the profile is dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Wallet address string.
    pub wallet: String,
    /// Instant the profile was generated (the metrics evaluation time).
    pub generated_at: DateTime<Utc>,
    /// Trust tier derived from the overall score.
    pub trust_tier: TrustTier,
    /// Usage-class label from the priority rule chain.
    pub user_class: UserClass,
    /// The five sub-scores plus overall.
    pub scores: ReputationScores,
    /// The behavioral statistics the scores were derived from.
    pub metrics: BehavioralMetrics,
    /// Human-readable classification reasoning, at most 5 entries.
    pub reasoning_tags: Vec<String>,
}

/// Failure category surfaced by a publication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishErrorKind {
    /// Network failure, gas-estimation revert, submission failure,
    /// on-chain revert, or receipt timeout.
    ChainError,
    /// Contract-mapping or configuration failure inside the pipeline.
    InternalError,
}

impl PublishErrorKind {
    /// Canonical snake_case string form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PublishErrorKind::ChainError => "chain_error",
            PublishErrorKind::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for PublishErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcome of one publish attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicationResult {
    /// Whether the transaction was confirmed on-chain.
    pub success: bool,
    /// Transaction hash (0x-prefixed hex), present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    /// Block number of the confirmation, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    /// Gas used by the transaction, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<u64>,
    /// Failure category, present on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<PublishErrorKind>,
    /// Failure detail, present on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl PublicationResult {
    /// A confirmed publication.
    pub fn confirmed(tx_hash: String, block_number: u64, gas_used: u64) -> Self {
        PublicationResult {
            success: true,
            tx_hash: Some(tx_hash),
            block_number: Some(block_number),
            gas_used: Some(gas_used),
            error_kind: None,
            error_message: None,
        }
    }

    /// A failed publication attempt.
    pub fn failed(kind: PublishErrorKind, message: impl Into<String>) -> Self {
        PublicationResult {
            success: false,
            tx_hash: None,
            block_number: None,
            gas_used: None,
            error_kind: Some(kind),
            error_message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_trust_tier_code_roundtrip() {
        for code in 0u8..=3 {
            let tier = TrustTier::from_code(code).unwrap();
            assert_eq!(tier.code(), code);
        }
        assert!(TrustTier::from_code(4).is_err());
    }

    #[test]
    fn test_trust_tier_parse() {
        assert_eq!("Gold".parse::<TrustTier>().unwrap(), TrustTier::Gold);
        assert_eq!("platinum".parse::<TrustTier>().unwrap(), TrustTier::Platinum);
        assert_eq!(" Bronze ".parse::<TrustTier>().unwrap(), TrustTier::Bronze);
        assert!("Diamond".parse::<TrustTier>().is_err());
    }

    #[test]
    fn test_trust_tier_ordering_matches_codes() {
        assert!(TrustTier::Bronze < TrustTier::Silver);
        assert!(TrustTier::Silver < TrustTier::Gold);
        assert!(TrustTier::Gold < TrustTier::Platinum);
    }

    #[test]
    fn test_user_class_code_roundtrip() {
        for code in 0u8..=5 {
            let class = UserClass::from_code(code).unwrap();
            assert_eq!(class.code(), code);
        }
        assert!(UserClass::from_code(6).is_err());
    }

    #[test]
    fn test_user_class_parse_tolerates_spacing_and_case() {
        assert_eq!(
            "Casual User".parse::<UserClass>().unwrap(),
            UserClass::CasualUser
        );
        assert_eq!(
            "CasualUser".parse::<UserClass>().unwrap(),
            UserClass::CasualUser
        );
        assert_eq!(
            "POWER USER".parse::<UserClass>().unwrap(),
            UserClass::PowerUser
        );
        assert_eq!("whale".parse::<UserClass>().unwrap(), UserClass::Whale);
        assert!("Shark".parse::<UserClass>().is_err());
    }

    #[test]
    fn test_enum_serde_uses_labels() {
        let json = serde_json::to_string(&UserClass::RegularUser).unwrap();
        assert_eq!(json, "\"Regular User\"");
        let back: UserClass = serde_json::from_str(&json).unwrap();
        assert_eq!(back, UserClass::RegularUser);

        let json = serde_json::to_string(&TrustTier::Silver).unwrap();
        assert_eq!(json, "\"Silver\"");
    }

    #[test]
    fn test_enum_serde_rejects_unknown_labels() {
        let result: Result<UserClass, _> = serde_json::from_str("\"Shark\"");
        assert!(result.is_err());
        let result: Result<TrustTier, _> = serde_json::from_str("\"Diamond\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_scores_contract_array_order() {
        let scores = ReputationScores {
            consistency: 1,
            loyalty: 2,
            sophistication: 3,
            activity: 4,
            reliability: 5,
            overall: 3,
        };
        assert_eq!(scores.as_contract_array(), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_publication_result_constructors() {
        let ok = PublicationResult::confirmed("0xabc".to_string(), 17, 21000);
        assert!(ok.success);
        assert_eq!(ok.block_number, Some(17));
        assert!(ok.error_kind.is_none());

        let err = PublicationResult::failed(PublishErrorKind::ChainError, "receipt timeout");
        assert!(!err.success);
        assert_eq!(err.error_kind, Some(PublishErrorKind::ChainError));
        assert!(err.tx_hash.is_none());
    }

    #[test]
    fn test_publish_error_kind_serde() {
        let json = serde_json::to_string(&PublishErrorKind::ChainError).unwrap();
        assert_eq!(json, "\"chain_error\"");
        let json = serde_json::to_string(&PublishErrorKind::InternalError).unwrap();
        assert_eq!(json, "\"internal_error\"");
    }

    #[test]
    fn test_transaction_record_new() {
        let ts = Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap();
        let tx = TransactionRecord::new("0xabc", ts, 42.5, "USDC");
        assert_eq!(tx.wallet, "0xabc");
        assert_eq!(tx.amount, 42.5);
        assert_eq!(tx.token, "USDC");
    }
}
