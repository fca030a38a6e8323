//! Trust-tier derivation and behavioral classification.
//!
//! The usage class comes from a fixed priority rule chain: the first rule
//! whose conditions all hold wins, so a wallet that qualifies as both Whale
//! and Power User is labeled Whale. Reasoning tags explain, in order, the
//! tier, the class, and up to three sub-score highlights.

use metasense_core::{
    BehavioralMetrics, ReputationScores, TrustTier, UserClass, CASUAL_MIN_TENURE_DAYS,
    CASUAL_MIN_TX, HIGHLIGHT_SCORE_MIN, MAX_REASONING_TAGS, POWER_MIN_FREQUENCY,
    POWER_MIN_OVERALL, POWER_MIN_TX, REGULAR_MIN_OVERALL, REGULAR_MIN_TENURE_DAYS, REGULAR_MIN_TX,
    TIER_GOLD_MIN, TIER_PLATINUM_MIN, TIER_SILVER_MIN, VETERAN_MIN_OVERALL,
    VETERAN_MIN_TENURE_DAYS, VETERAN_MIN_TX, WHALE_MIN_AVG, WHALE_MIN_VOLUME,
};

/// Map an overall score onto its trust tier.
pub fn trust_tier(overall: u16) -> TrustTier {
    if overall >= TIER_PLATINUM_MIN {
        TrustTier::Platinum
    } else if overall >= TIER_GOLD_MIN {
        TrustTier::Gold
    } else if overall >= TIER_SILVER_MIN {
        TrustTier::Silver
    } else {
        TrustTier::Bronze
    }
}

/// Classify a wallet's usage pattern. First matching rule wins.
pub fn classify_user(metrics: &BehavioralMetrics, scores: &ReputationScores) -> UserClass {
    if metrics.platform_tenure_days >= VETERAN_MIN_TENURE_DAYS
        && metrics.total_transactions >= VETERAN_MIN_TX
        && scores.overall >= VETERAN_MIN_OVERALL
    {
        UserClass::Veteran
    } else if metrics.total_volume >= WHALE_MIN_VOLUME || metrics.avg_transaction >= WHALE_MIN_AVG {
        UserClass::Whale
    } else if metrics.total_transactions >= POWER_MIN_TX
        && metrics.transaction_frequency >= POWER_MIN_FREQUENCY
        && scores.overall >= POWER_MIN_OVERALL
    {
        UserClass::PowerUser
    } else if metrics.total_transactions >= REGULAR_MIN_TX
        && metrics.platform_tenure_days >= REGULAR_MIN_TENURE_DAYS
        && scores.overall >= REGULAR_MIN_OVERALL
    {
        UserClass::RegularUser
    } else if metrics.total_transactions >= CASUAL_MIN_TX
        && metrics.platform_tenure_days >= CASUAL_MIN_TENURE_DAYS
    {
        UserClass::CasualUser
    } else {
        UserClass::Newcomer
    }
}

/// Build the human-readable reasoning tags for a classification.
///
/// Order is fixed: tier tag, class tag, then sub-score highlights, capped at
/// five entries (the registry contract rejects longer arrays).
pub fn reasoning_tags(
    metrics: &BehavioralMetrics,
    scores: &ReputationScores,
    tier: TrustTier,
    class: UserClass,
) -> Vec<String> {
    let mut tags = Vec::with_capacity(MAX_REASONING_TAGS);

    tags.push(
        match tier {
            TrustTier::Platinum => {
                "Exceptional reputation (800+ score) demonstrates highest reliability"
            }
            TrustTier::Gold => "Strong reputation (600+ score) shows consistent good behavior",
            TrustTier::Silver => "Moderate reputation (400+ score) indicates developing trust",
            TrustTier::Bronze => "Building reputation (<400 score) - new or inconsistent user",
        }
        .to_string(),
    );

    tags.push(match class {
        UserClass::Veteran => format!(
            "Veteran status: {} days tenure with {} transactions",
            metrics.platform_tenure_days, metrics.total_transactions
        ),
        UserClass::Whale => format!(
            "High-value user: ${:.2} total volume, ${:.2} average",
            metrics.total_volume, metrics.avg_transaction
        ),
        UserClass::PowerUser => format!(
            "Power user: {:.1} txs/day frequency with consistent patterns",
            metrics.transaction_frequency
        ),
        UserClass::RegularUser => format!(
            "Regular user: {} transactions over {} days",
            metrics.total_transactions, metrics.platform_tenure_days
        ),
        UserClass::CasualUser => format!(
            "Casual usage: {} transactions, moderate engagement",
            metrics.total_transactions
        ),
        UserClass::Newcomer => {
            "New user: Limited transaction history for full assessment".to_string()
        }
    });

    if scores.consistency >= HIGHLIGHT_SCORE_MIN {
        tags.push(format!(
            "Highly consistent spending patterns (score: {})",
            scores.consistency
        ));
    }
    if scores.loyalty >= HIGHLIGHT_SCORE_MIN {
        tags.push(format!(
            "Strong platform loyalty (score: {})",
            scores.loyalty
        ));
    }
    if scores.sophistication >= HIGHLIGHT_SCORE_MIN {
        tags.push(format!(
            "Advanced DeFi user with {} different tokens",
            metrics.unique_tokens
        ));
    }

    tags.truncate(MAX_REASONING_TAGS);
    tags
}
