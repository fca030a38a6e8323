//! Reputation scoring.
//!
//! Five weighted sub-scores on a 0-1000 scale, each a saturating linear ramp
//! over one or two metrics, plus the weighted overall composite. The formulas
//! are part of the published contract semantics; do not tune them without a
//! coordinated registry migration.

use metasense_core::{
    BehavioralMetrics, ReputationScores, MAX_SCORE, RECENCY_WINDOW_DAYS, WEIGHT_ACTIVITY,
    WEIGHT_CONSISTENCY, WEIGHT_LOYALTY, WEIGHT_RELIABILITY, WEIGHT_SOPHISTICATION,
};

/// Compute the five sub-scores and the overall composite.
///
/// Sub-scores are rounded to integers first; `overall` is the rounded
/// weighted sum of the already-rounded sub-scores. Every output is clamped
/// to [0, 1000] by construction.
pub fn score_metrics(metrics: &BehavioralMetrics) -> ReputationScores {
    let consistency = to_score(1.0 / (1.0 + metrics.spending_cv));

    let loyalty = to_score(
        0.7 * unit(metrics.platform_tenure_days as f64 / 365.0)
            + 0.3 * unit(metrics.transaction_frequency / 2.0),
    );

    let sophistication = to_score(
        0.6 * unit(metrics.unique_tokens as f64 / 5.0)
            + 0.4 * unit(metrics.avg_transaction / 1000.0),
    );

    let activity = to_score(
        0.7 * unit(metrics.transaction_frequency / 3.0)
            + 0.3 * metrics.recent_transactions as f64 / metrics.total_transactions.max(1) as f64,
    );

    let reliability = to_score(
        0.6 * unit(metrics.spending_consistency * 2.0)
            + 0.4 * (1.0 - metrics.days_since_last_tx as f64 / RECENCY_WINDOW_DAYS as f64).max(0.0),
    );

    let overall = (WEIGHT_CONSISTENCY * consistency as f64
        + WEIGHT_LOYALTY * loyalty as f64
        + WEIGHT_SOPHISTICATION * sophistication as f64
        + WEIGHT_ACTIVITY * activity as f64
        + WEIGHT_RELIABILITY * reliability as f64)
        .round() as u16;

    ReputationScores {
        consistency,
        loyalty,
        sophistication,
        activity,
        reliability,
        overall,
    }
}

/// Clamp a ratio into the unit interval from above.
fn unit(value: f64) -> f64 {
    value.min(1.0)
}

/// Map a [0, 1] fraction onto the 0-1000 integer scale.
fn to_score(fraction: f64) -> u16 {
    ((fraction.clamp(0.0, 1.0)) * MAX_SCORE as f64).round() as u16
}
