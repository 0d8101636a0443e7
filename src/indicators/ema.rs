// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// Seeded with the SMA of the first `period` closes, then
//   EMA_t = EMA_{t-1} + 2 / (period + 1) * (close_t - EMA_{t-1})
// =============================================================================

use super::smoothing::{ema_alpha, smooth};

/// EMA of `closes`; element `i` lines up with close `i + period - 1`.
pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<f64> {
    smooth(closes, period, ema_alpha(period))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_value_is_the_sma() {
        let ema = calculate_ema(&[10.0, 20.0, 30.0, 40.0], 3);
        assert_eq!(ema.len(), 2);
        assert!((ema[0] - 20.0).abs() < 1e-10);
        // alpha = 0.5: 20 + 0.5 * (40 - 20)
        assert!((ema[1] - 30.0).abs() < 1e-10);
    }

    #[test]
    fn lags_a_rising_series() {
        let closes: Vec<f64> = (0..40).map(|x| 100.0 + x as f64).collect();
        let ema = calculate_ema(&closes, 10);
        let last = *ema.last().unwrap();
        assert!(last < 139.0 && last > 130.0, "got {last}");
    }

    #[test]
    fn too_short_or_zero_period() {
        assert!(calculate_ema(&[1.0, 2.0], 5).is_empty());
        assert!(calculate_ema(&[1.0, 2.0], 0).is_empty());
    }
}
