//! Short-term trend classification from per-delivery acceptance rates

use crate::models::Trend;
use crate::scoring::metrics::mean;

/// Number of samples in each comparison window
pub const TREND_WINDOW: usize = 3;

/// Minimum change in mean acceptance rate that counts as a trend
pub const TREND_THRESHOLD: f64 = 0.05;

/// Float slack when comparing against the threshold, so 0.55 - 0.5 is not above 0.05
const THRESHOLD_EPSILON: f64 = 1e-12;

/// Classify the trend of a chronological (oldest first) rate sequence.
///
/// The last three samples are compared against the up to three samples
/// immediately before them. The threshold is exclusive on both sides.
pub fn classify_trend(rates: &[f64]) -> Trend {
    if rates.is_empty() {
        return Trend::Stable;
    }

    let split = rates.len().saturating_sub(TREND_WINDOW);
    let (earlier, last_window) = rates.split_at(split);
    let prev_window = &earlier[earlier.len().saturating_sub(TREND_WINDOW)..];

    let delta = mean(last_window) - mean(prev_window);

    if delta - TREND_THRESHOLD > THRESHOLD_EPSILON {
        Trend::Improving
    } else if delta + TREND_THRESHOLD < -THRESHOLD_EPSILON {
        Trend::Declining
    } else {
        Trend::Stable
    }
}
