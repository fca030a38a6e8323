//! Behavioral metric extraction.
//!
//! Given one wallet's transactions and an explicit evaluation time, derive
//! the immutable [`BehavioralMetrics`] the scorer consumes. The evaluation
//! time is a parameter rather than a clock read so the whole pipeline is
//! deterministic and testable; recency metrics deliberately depend on it,
//! which rewards current activity.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::BTreeMap;

use crate::error::{EngineError, Result};
use metasense_core::{BehavioralMetrics, TransactionRecord, LARGE_TX_PERCENTILE, RECENCY_WINDOW_DAYS};

/// Extract behavioral metrics for a single wallet.
///
/// The input must be non-empty and pre-filtered to one wallet; a mixed-wallet
/// slice is a caller contract violation and is not detected here.
///
/// Rounding is applied exactly once, here: ratios to 3 decimal places, money
/// and rates to 2. Scores are computed from these rounded values, so two runs
/// over identical rounded input always reproduce identical scores.
pub fn extract_metrics(
    records: &[TransactionRecord],
    evaluation_time: DateTime<Utc>,
) -> Result<BehavioralMetrics> {
    if records.is_empty() {
        return Err(EngineError::EmptyDataset);
    }

    let total_transactions = records.len() as u64;
    let amounts: Vec<f64> = records.iter().map(|r| r.amount).collect();
    let total_volume: f64 = amounts.iter().sum();
    let avg_transaction = total_volume / total_transactions as f64;

    let mut sorted = amounts.clone();
    sorted.sort_by(f64::total_cmp);
    let median_transaction = percentile(&sorted, 50.0);

    let first_transaction = records.iter().map(|r| r.timestamp).min().expect("non-empty");
    let last_transaction = records.iter().map(|r| r.timestamp).max().expect("non-empty");

    // Distinct UTC dates with activity, plus per-day spend totals.
    let mut daily_totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in records {
        *daily_totals.entry(record.timestamp.date_naive()).or_insert(0.0) += record.amount;
    }
    let days_active = daily_totals.len() as u64;

    let platform_tenure_days = whole_days_between(first_transaction, evaluation_time);
    let days_since_last_tx = whole_days_between(last_transaction, evaluation_time);
    let transaction_frequency = total_transactions as f64 / days_active.max(1) as f64;

    let spending_std = population_stddev(&amounts);
    let spending_cv = if avg_transaction > 0.0 {
        spending_std / avg_transaction
    } else {
        0.0
    };

    let large_threshold = percentile(&sorted, LARGE_TX_PERCENTILE);
    let large_count = amounts.iter().filter(|&&a| a >= large_threshold).count() as u64;
    let large_tx_ratio = large_count as f64 / total_transactions as f64;

    // Token usage: count per symbol, most-used picked by count with
    // lexicographic tie-break (BTreeMap iteration order makes this stable).
    let mut token_counts: BTreeMap<&str, u64> = BTreeMap::new();
    for record in records {
        *token_counts.entry(record.token.as_str()).or_insert(0) += 1;
    }
    let unique_tokens = token_counts.len() as u64;
    let (most_used_token, max_token_count) = token_counts
        .iter()
        .fold(("", 0u64), |(best_token, best_count), (&token, &count)| {
            if count > best_count {
                (token, count)
            } else {
                (best_token, best_count)
            }
        });
    let token_concentration = max_token_count as f64 / total_transactions as f64;

    let recent_cutoff = evaluation_time - Duration::days(RECENCY_WINDOW_DAYS);
    let recent_transactions = records
        .iter()
        .filter(|r| r.timestamp >= recent_cutoff)
        .count() as u64;

    // Same-day spending consistency: inverse of the stddev of daily totals,
    // offset by 1 so a zero stddev cannot divide by zero. Neutral 0.5 when
    // fewer than two active days exist.
    let spending_consistency = if days_active >= 2 {
        let daily: Vec<f64> = daily_totals.values().copied().collect();
        1.0 / (population_stddev(&daily) + 1.0)
    } else {
        0.5
    };

    Ok(BehavioralMetrics {
        total_transactions,
        total_volume: round2(total_volume),
        avg_transaction: round2(avg_transaction),
        median_transaction: round2(median_transaction),
        platform_tenure_days,
        days_active,
        transaction_frequency: round2(transaction_frequency),
        days_since_last_tx,
        spending_cv: round3(spending_cv),
        spending_consistency: round3(spending_consistency),
        large_tx_ratio: round3(large_tx_ratio),
        unique_tokens,
        token_concentration: round3(token_concentration),
        most_used_token: most_used_token.to_string(),
        recent_transactions,
        first_transaction,
        last_transaction,
    })
}

/// Whole days from `earlier` to `later`, floored at zero.
fn whole_days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> u64 {
    (later - earlier).num_days().max(0) as u64
}

/// Percentile via linear interpolation between order statistics:
/// `index = p/100 * (n-1)`, `value = lower + (upper - lower) * frac(index)`.
///
/// Input must be sorted ascending and non-empty.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let index = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;
    let frac = index - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Population standard deviation (divide by n, not the n-1 sample
/// estimator).
fn population_stddev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values
        .iter()
        .map(|v| (v - mean) * (v - mean))
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tx(wallet: &str, ts: &str, amount: f64, token: &str) -> TransactionRecord {
        TransactionRecord::new(
            wallet,
            DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Utc),
            amount,
            token,
        )
    }

    fn eval_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_dataset_fails() {
        let err = extract_metrics(&[], eval_time()).unwrap_err();
        assert!(matches!(err, EngineError::EmptyDataset));
    }

    #[test]
    fn test_single_transaction_today() {
        // Scenario: one transaction of 100 USDC at the evaluation instant.
        let records = vec![tx("0xaaa", "2025-07-01T12:00:00Z", 100.0, "USDC")];
        let metrics = extract_metrics(&records, eval_time()).unwrap();

        assert_eq!(metrics.total_transactions, 1);
        assert_eq!(metrics.days_active, 1);
        assert_eq!(metrics.platform_tenure_days, 0);
        assert_eq!(metrics.days_since_last_tx, 0);
        assert_eq!(metrics.total_volume, 100.0);
        assert_eq!(metrics.avg_transaction, 100.0);
        assert_eq!(metrics.median_transaction, 100.0);
        // Single value: zero dispersion, full concentration.
        assert_eq!(metrics.spending_cv, 0.0);
        assert_eq!(metrics.large_tx_ratio, 1.0);
        assert_eq!(metrics.token_concentration, 1.0);
        assert_eq!(metrics.most_used_token, "USDC");
        assert_eq!(metrics.recent_transactions, 1);
        // Fewer than two active days: neutral consistency indicator.
        assert_eq!(metrics.spending_consistency, 0.5);
    }

    #[test]
    fn test_percentile_interpolation() {
        let sorted = [10.0, 20.0, 30.0, 40.0];
        // index = 0.8 * 3 = 2.4 -> 30 + 0.4 * 10 = 34
        assert!((percentile(&sorted, 80.0) - 34.0).abs() < 1e-9);
        // Median of even-length set interpolates the middle pair.
        assert!((percentile(&sorted, 50.0) - 25.0).abs() < 1e-9);
        assert_eq!(percentile(&[7.0], 50.0), 7.0);
    }

    #[test]
    fn test_population_stddev() {
        // Known population: mean 5, variance 8 -> std 2.828...
        let values = [1.0, 5.0, 9.0];
        let std = population_stddev(&values);
        assert!((std - (32.0f64 / 3.0).sqrt()).abs() < 1e-9);
        assert_eq!(population_stddev(&[]), 0.0);
        assert_eq!(population_stddev(&[4.0]), 0.0);
    }

    #[test]
    fn test_recency_window_is_evaluation_relative() {
        let records = vec![
            tx("0xaaa", "2025-06-25T00:00:00Z", 10.0, "USDC"),
            tx("0xaaa", "2025-04-01T00:00:00Z", 10.0, "USDC"),
        ];
        let metrics = extract_metrics(&records, eval_time()).unwrap();
        assert_eq!(metrics.recent_transactions, 1);
        assert_eq!(metrics.days_since_last_tx, 6);

        // Same dataset scored 60 days later: nothing recent any more.
        let later = eval_time() + Duration::days(60);
        let metrics = extract_metrics(&records, later).unwrap();
        assert_eq!(metrics.recent_transactions, 0);
        assert_eq!(metrics.days_since_last_tx, 66);
    }

    #[test]
    fn test_token_tallies_and_tie_break() {
        let records = vec![
            tx("0xaaa", "2025-06-01T00:00:00Z", 1.0, "USDC"),
            tx("0xaaa", "2025-06-02T00:00:00Z", 1.0, "DAI"),
            tx("0xaaa", "2025-06-03T00:00:00Z", 1.0, "USDC"),
            tx("0xaaa", "2025-06-04T00:00:00Z", 1.0, "DAI"),
        ];
        let metrics = extract_metrics(&records, eval_time()).unwrap();
        assert_eq!(metrics.unique_tokens, 2);
        // Equal counts: lexicographically smallest symbol wins.
        assert_eq!(metrics.most_used_token, "DAI");
        assert_eq!(metrics.token_concentration, 0.5);
    }

    #[test]
    fn test_zero_amounts_yield_zero_cv() {
        // All amounts coerced to zero: mean is 0, cv guards against the
        // division instead of producing NaN.
        let records = vec![
            tx("0xaaa", "2025-06-01T00:00:00Z", 0.0, "USDC"),
            tx("0xaaa", "2025-06-02T00:00:00Z", 0.0, "USDC"),
        ];
        let metrics = extract_metrics(&records, eval_time()).unwrap();
        assert_eq!(metrics.spending_cv, 0.0);
        assert_eq!(metrics.total_volume, 0.0);
    }

    #[test]
    fn test_bounds_invariants() {
        let records = vec![
            tx("0xaaa", "2025-05-01T09:00:00Z", 12.5, "USDC"),
            tx("0xaaa", "2025-05-01T17:00:00Z", 300.0, "DAI"),
            tx("0xaaa", "2025-05-20T10:00:00Z", 7.0, "USDC"),
            tx("0xaaa", "2025-06-28T10:00:00Z", 55.0, "WETH"),
        ];
        let metrics = extract_metrics(&records, eval_time()).unwrap();
        assert!(metrics.large_tx_ratio >= 0.0 && metrics.large_tx_ratio <= 1.0);
        assert!(metrics.token_concentration >= 0.0 && metrics.token_concentration <= 1.0);
        assert!(metrics.spending_cv >= 0.0);
        assert_eq!(metrics.days_active, 3);
    }

    #[test]
    fn test_idempotence_at_fixed_instant() {
        let records = vec![
            tx("0xaaa", "2025-05-01T09:00:00Z", 12.5, "USDC"),
            tx("0xaaa", "2025-06-28T10:00:00Z", 55.0, "WETH"),
        ];
        let a = extract_metrics(&records, eval_time()).unwrap();
        let b = extract_metrics(&records, eval_time()).unwrap();
        assert_eq!(a, b);
    }
}
