// =============================================================================
// Relative Strength Index (RSI)
// =============================================================================
//
// Gains and losses of consecutive closes are each smoothed with Wilder's
// average; RSI = 100 - 100 / (1 + avg_gain / avg_loss). The chart draws
// reference bands at 30 and 70.
// =============================================================================

use super::smoothing::{smooth, wilder_alpha};

pub const RSI_LOWER_BAND: f64 = 30.0;
pub const RSI_UPPER_BAND: f64 = 70.0;

/// RSI of `closes`; element `i` lines up with close `i + period`.
///
/// A window without losses reads 100, a window without any movement 50.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() <= period {
        return Vec::new();
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let change = w[1] - w[0];
            (change.max(0.0), (-change).max(0.0))
        })
        .unzip();

    let alpha = wilder_alpha(period);
    let avg_gain = smooth(&gains, period, alpha);
    let avg_loss = smooth(&losses, period, alpha);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map_while(|(&gain, &loss)| rsi_value(gain, loss))
        .collect()
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = match (avg_gain == 0.0, avg_loss == 0.0) {
        (true, true) => 50.0,
        (_, true) => 100.0,
        _ => 100.0 - 100.0 / (1.0 + avg_gain / avg_loss),
    };
    rsi.is_finite().then_some(rsi)
}
