// =============================================================================
// Rate of Change (ROC) and Momentum (MOM)
// =============================================================================
//
// Both compare each close with the close `period` bars earlier:
//   ROC = (close - close_n) / close_n * 100
//   MOM =  close - close_n
// =============================================================================

/// Apply `f(earlier, current)` to every pair of closes `period` bars apart.
/// Element `i` lines up with close `i + period`.
fn lagged(closes: &[f64], period: usize, f: impl Fn(f64, f64) -> f64) -> Vec<f64> {
    if period == 0 || closes.len() <= period {
        return Vec::new();
    }
    closes
        .iter()
        .zip(&closes[period..])
        .map(|(&earlier, &current)| f(earlier, current))
        .collect()
}

/// Percentage change over `period`. A zero reference close reads 0.
pub fn calculate_roc(closes: &[f64], period: usize) -> Vec<f64> {
    lagged(closes, period, |earlier, current| {
        if earlier == 0.0 {
            0.0
        } else {
            (current - earlier) / earlier * 100.0
        }
    })
}

/// Price difference over `period`.
pub fn calculate_momentum(closes: &[f64], period: usize) -> Vec<f64> {
    lagged(closes, period, |earlier, current| current - earlier)
}
