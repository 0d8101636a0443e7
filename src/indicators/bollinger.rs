// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band
// (SMA + k_up * σ), and a lower band (SMA - k_dn * σ), with σ the population
// standard deviation of the window.

/// One Bollinger Band point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Calculate the Bollinger Band series for the given closing prices.
///
/// Output element `i` corresponds to input index `i + period - 1`.
///
/// Returns an empty vec when `period == 0` or there are fewer than `period`
/// points. A non-finite window ends the series.
pub fn calculate_bollinger(
    closes: &[f64],
    period: usize,
    nbdev_up: f64,
    nbdev_dn: f64,
) -> Vec<BollingerBands> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }

    let period_f = period as f64;
    let mut result = Vec::with_capacity(closes.len() - period + 1);

    for window in closes.windows(period) {
        let middle = window.iter().sum::<f64>() / period_f;
        let variance = window.iter().map(|x| (x - middle).powi(2)).sum::<f64>() / period_f;
        let std_dev = variance.sqrt();

        let bands = BollingerBands {
            upper: middle + nbdev_up * std_dev,
            middle,
            lower: middle - nbdev_dn * std_dev,
        };
        if !(bands.upper.is_finite() && bands.lower.is_finite()) {
            break;
        }
        result.push(bands);
    }

    result
}
