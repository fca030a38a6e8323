//! Canonical constants for MetaSense.
//!
//! The weights and thresholds here MUST match the values the reputation
//! contract and its consumers assume; changing any of them shifts tier
//! boundaries for every published profile.

/// Weight of the consistency sub-score in the overall reputation.
pub const WEIGHT_CONSISTENCY: f64 = 0.25;
/// Weight of the loyalty sub-score in the overall reputation.
pub const WEIGHT_LOYALTY: f64 = 0.25;
/// Weight of the sophistication sub-score in the overall reputation.
pub const WEIGHT_SOPHISTICATION: f64 = 0.20;
/// Weight of the activity sub-score in the overall reputation.
pub const WEIGHT_ACTIVITY: f64 = 0.15;
/// Weight of the reliability sub-score in the overall reputation.
pub const WEIGHT_RELIABILITY: f64 = 0.15;

/// Upper bound for every score field (inclusive).
pub const MAX_SCORE: u16 = 1000;

/// Overall score required for the Platinum tier.
pub const TIER_PLATINUM_MIN: u16 = 800;
/// Overall score required for the Gold tier.
pub const TIER_GOLD_MIN: u16 = 600;
/// Overall score required for the Silver tier.
pub const TIER_SILVER_MIN: u16 = 400;

/// Trailing window (days) used for recent-activity metrics.
pub const RECENCY_WINDOW_DAYS: i64 = 30;

/// Percentile (0-100) defining the "large transaction" threshold.
pub const LARGE_TX_PERCENTILE: f64 = 80.0;

/// Maximum number of reasoning tags carried by a profile. The contract
/// rejects longer arrays.
pub const MAX_REASONING_TAGS: usize = 5;

/// Gas limit safety buffer applied to the estimate: estimate * 120 / 100.
pub const GAS_BUFFER_NUMERATOR: u64 = 120;
/// Denominator of the gas buffer ratio.
pub const GAS_BUFFER_DENOMINATOR: u64 = 100;

// Classification thresholds (priority rule chain, first match wins).

/// Veteran: minimum tenure in days.
pub const VETERAN_MIN_TENURE_DAYS: u64 = 180;
/// Veteran: minimum transaction count.
pub const VETERAN_MIN_TX: u64 = 50;
/// Veteran: minimum overall score.
pub const VETERAN_MIN_OVERALL: u16 = 700;
/// Whale: minimum total volume.
pub const WHALE_MIN_VOLUME: f64 = 10_000.0;
/// Whale: minimum average transaction amount.
pub const WHALE_MIN_AVG: f64 = 500.0;
/// Power user: minimum transaction count.
pub const POWER_MIN_TX: u64 = 30;
/// Power user: minimum transaction frequency (tx/day).
pub const POWER_MIN_FREQUENCY: f64 = 1.0;
/// Power user: minimum overall score.
pub const POWER_MIN_OVERALL: u16 = 600;
/// Regular user: minimum transaction count.
pub const REGULAR_MIN_TX: u64 = 10;
/// Regular user: minimum tenure in days.
pub const REGULAR_MIN_TENURE_DAYS: u64 = 30;
/// Regular user: minimum overall score.
pub const REGULAR_MIN_OVERALL: u16 = 400;
/// Casual user: minimum transaction count.
pub const CASUAL_MIN_TX: u64 = 3;
/// Casual user: minimum tenure in days.
pub const CASUAL_MIN_TENURE_DAYS: u64 = 7;

/// Sub-score threshold above which a highlight reasoning tag is emitted.
pub const HIGHLIGHT_SCORE_MIN: u16 = 700;
