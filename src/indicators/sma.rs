// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================

/// Rolling arithmetic mean of `closes` over `period`.
///
/// Output element `i` corresponds to input index `i + period - 1`. Returns
/// an empty vec for `period == 0` or insufficient data; a non-finite window
/// ends the series.
pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }

    let period_f = period as f64;
    let mut result = Vec::with_capacity(closes.len() - period + 1);
    for window in closes.windows(period) {
        let mean = window.iter().sum::<f64>() / period_f;
        if !mean.is_finite() {
            break;
        }
        result.push(mean);
    }
    result
}
