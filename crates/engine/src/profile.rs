//! Profile assembly: the full pipeline for one wallet.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::classifier::{classify_user, reasoning_tags, trust_tier};
use crate::error::Result;
use crate::metrics::extract_metrics;
use crate::scorer::score_metrics;
use metasense_core::{TransactionRecord, UserProfile};

/// Run metrics extraction, scoring, and classification for one wallet and
/// assemble the resulting profile.
///
/// `records` must already be filtered to the wallet. An empty slice fails
/// with [`crate::EngineError::EmptyDataset`]; callers surface that as
/// "profile not found" rather than fabricating a zero-score profile.
pub fn assemble_profile(
    wallet: &str,
    records: &[TransactionRecord],
    evaluation_time: DateTime<Utc>,
) -> Result<UserProfile> {
    let metrics = extract_metrics(records, evaluation_time)?;
    let scores = score_metrics(&metrics);
    let tier = trust_tier(scores.overall);
    let class = classify_user(&metrics, &scores);
    let tags = reasoning_tags(&metrics, &scores, tier, class);

    debug!(
        "Scored {}: overall={} tier={} class={}",
        wallet, scores.overall, tier, class
    );

    Ok(UserProfile {
        wallet: wallet.to_string(),
        generated_at: evaluation_time,
        trust_tier: tier,
        user_class: class,
        scores,
        metrics,
        reasoning_tags: tags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use chrono::TimeZone;
    use metasense_core::{TrustTier, UserClass};

    fn tx(ts: &str, amount: f64, token: &str) -> TransactionRecord {
        TransactionRecord::new(
            "0xabc",
            DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Utc),
            amount,
            token,
        )
    }

    fn eval_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_no_transactions_is_an_error() {
        let err = assemble_profile("0xabc", &[], eval_time()).unwrap_err();
        assert!(matches!(err, EngineError::EmptyDataset));
    }

    #[test]
    fn test_single_transaction_profile() {
        let records = vec![tx("2025-07-01T12:00:00Z", 100.0, "USDC")];
        let profile = assemble_profile("0xabc", &records, eval_time()).unwrap();

        assert_eq!(profile.wallet, "0xabc");
        assert_eq!(profile.generated_at, eval_time());
        assert_eq!(profile.scores.overall, 549);
        assert_eq!(profile.trust_tier, TrustTier::Silver);
        assert_eq!(profile.user_class, UserClass::Newcomer);
        assert!(profile.reasoning_tags.len() >= 2);
        assert!(profile.reasoning_tags.len() <= 5);
    }

    #[test]
    fn test_profile_is_idempotent_at_fixed_instant() {
        let records = vec![
            tx("2025-05-01T09:00:00Z", 12.5, "USDC"),
            tx("2025-05-15T17:00:00Z", 300.0, "DAI"),
            tx("2025-06-28T10:00:00Z", 55.0, "WETH"),
        ];
        let a = assemble_profile("0xabc", &records, eval_time()).unwrap();
        let b = assemble_profile("0xabc", &records, eval_time()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_tier_matches_overall_score() {
        let records = vec![
            tx("2025-05-01T09:00:00Z", 12.5, "USDC"),
            tx("2025-05-15T17:00:00Z", 300.0, "DAI"),
            tx("2025-06-28T10:00:00Z", 55.0, "WETH"),
        ];
        let profile = assemble_profile("0xabc", &records, eval_time()).unwrap();
        assert_eq!(profile.trust_tier, trust_tier(profile.scores.overall));
    }

    #[test]
    fn test_profile_serializes_with_labels() {
        let records = vec![tx("2025-07-01T12:00:00Z", 100.0, "USDC")];
        let profile = assemble_profile("0xabc", &records, eval_time()).unwrap();
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["trust_tier"], "Silver");
        assert_eq!(json["user_class"], "Newcomer");
        assert_eq!(json["scores"]["overall"], 549);
    }
}
