// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   MACD line   = EMA(fast) - EMA(slow)
//   Signal line = EMA(signal) of the MACD line
//   Histogram   = MACD line - Signal line
//
// The MACD line starts where the slow EMA starts (index `slow - 1`); the
// signal line and histogram start `signal - 1` bars later.
// =============================================================================

use super::ema::calculate_ema;

/// The three MACD series, each trimmed to its own warm-up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl MacdSeries {
    /// Input index of the first MACD value.
    pub fn macd_start(slow: usize) -> usize {
        slow.saturating_sub(1)
    }

    /// Input index of the first signal / histogram value.
    pub fn signal_start(slow: usize, signal: usize) -> usize {
        Self::macd_start(slow) + signal.saturating_sub(1)
    }
}

/// Compute MACD. Requires `0 < fast < slow` and `signal > 0`; anything else
/// yields empty series.
pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    if fast == 0 || signal == 0 || fast >= slow {
        return MacdSeries::default();
    }

    let fast_ema = calculate_ema(closes, fast);
    let slow_ema = calculate_ema(closes, slow);

    // fast_ema[0] is at input index fast-1, slow_ema[0] at slow-1.
    let offset = slow - fast;
    let macd: Vec<f64> = slow_ema
        .iter()
        .enumerate()
        .map_while(|(i, s)| fast_ema.get(i + offset).map(|f| f - s))
        .collect();

    let signal_line = calculate_ema(&macd, signal);
    let histogram = signal_line
        .iter()
        .zip(macd.iter().skip(signal - 1))
        .map(|(s, m)| m - s)
        .collect();

    MacdSeries {
        macd,
        signal: signal_line,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macd_lengths_follow_warmup() {
        let closes: Vec<f64> = (1..=60).map(|x| x as f64).collect();
        let series = calculate_macd(&closes, 12, 26, 9);
        assert_eq!(series.macd.len(), 60 - 25);
        assert_eq!(series.signal.len(), 60 - 25 - 8);
        assert_eq!(series.histogram.len(), series.signal.len());
        assert_eq!(MacdSeries::macd_start(26), 25);
        assert_eq!(MacdSeries::signal_start(26, 9), 33);
    }

    #[test]
    fn macd_positive_in_uptrend() {
        let closes: Vec<f64> = (1..=80).map(|x| x as f64 * 1.5).collect();
        let series = calculate_macd(&closes, 12, 26, 9);
        assert!(series.macd.iter().all(|m| *m > 0.0));
    }

    #[test]
    fn macd_flat_is_zero() {
        let closes = vec![50.0; 60];
        let series = calculate_macd(&closes, 12, 26, 9);
        assert!(series.histogram.iter().all(|h| h.abs() < 1e-10));
    }

    #[test]
    fn macd_rejects_bad_periods() {
        let closes: Vec<f64> = (1..=60).map(|x| x as f64).collect();
        assert_eq!(calculate_macd(&closes, 26, 12, 9), MacdSeries::default());
        assert_eq!(calculate_macd(&closes, 0, 26, 9), MacdSeries::default());
        assert_eq!(calculate_macd(&closes, 12, 26, 0), MacdSeries::default());
    }

    #[test]
    fn macd_insufficient_data() {
        let closes = vec![1.0; 10];
        let series = calculate_macd(&closes, 12, 26, 9);
        assert!(series.macd.is_empty());
        assert!(series.signal.is_empty());
    }
}
