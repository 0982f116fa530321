//! Pure helpers over price-history series.

use std::time::Duration;

use orbwatch_store::PricePoint;

use crate::constants::TIMEFRAME_TOLERANCE;
use crate::models::TimeframeChanges;

/// The point whose timestamp is closest to `target_ms`, or `None` when
/// even the closest one sits outside `tolerance`.
///
/// Ties keep the first point encountered; callers pass series newest
/// first, so ties favor the more recent point.
pub fn nearest_to(
    points: &[PricePoint],
    target_ms: i64,
    tolerance: Duration,
) -> Option<&PricePoint> {
    let tolerance_ms = tolerance.as_millis() as i64;
    points
        .iter()
        .map(|p| (p, (p.timestamp_ms - target_ms).abs()))
        .fold(None, |best: Option<(&PricePoint, i64)>, candidate| {
            match best {
                Some((_, best_diff)) if best_diff <= candidate.1 => best,
                _ => Some(candidate),
            }
        })
        .filter(|(_, diff)| *diff <= tolerance_ms)
        .map(|(point, _)| point)
}

/// Percent change from `old` to `current`.
pub fn percent_change(current: f64, old: f64) -> f64 {
    (current - old) / old * 100.0
}

/// 12h and 24h percent changes from one shared history fetch.
///
/// A timeframe resolves only when some point lies within the tolerance
/// of its lookback target; otherwise it stays `None`.
pub fn timeframe_changes(points: &[PricePoint], now_ms: i64, current_price: f64) -> TimeframeChanges {
    const HOUR_MS: i64 = 60 * 60 * 1000;

    let change_at = |lookback_hours: i64| {
        nearest_to(points, now_ms - lookback_hours * HOUR_MS, TIMEFRAME_TOLERANCE)
            .filter(|p| p.price > 0.0)
            .map(|p| percent_change(current_price, p.price))
    };

    TimeframeChanges {
        change_12h: change_at(12),
        change_24h: change_at(24),
    }
}

/// Coefficient of variation of a price series, in percent.
///
/// Undefined for fewer than two points or a zero mean; both yield 0.
pub fn coefficient_of_variation(prices: &[f64]) -> f64 {
    if prices.len() < 2 {
        return 0.0;
    }
    let mean = prices.iter().sum::<f64>() / prices.len() as f64;
    if mean == 0.0 {
        return 0.0;
    }
    let variance =
        prices.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / prices.len() as f64;
    variance.sqrt() / mean * 100.0
}
