// =============================================================================
// Average True Range (ATR)
// =============================================================================
//
// True Range (TR) for each bar:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR is the Wilder-smoothed average of TR.
// =============================================================================

use super::smoothing::{smooth, wilder_alpha};
use crate::types::PriceBar;

/// True range of every bar after the first (oldest first).
pub(crate) fn true_ranges(bars: &[PriceBar]) -> Vec<f64> {
    bars.windows(2)
        .map(|w| {
            let (prev, bar) = (&w[0], &w[1]);
            let hl = bar.high - bar.low;
            let hc = (bar.high - prev.close).abs();
            let lc = (bar.low - prev.close).abs();
            hl.max(hc).max(lc)
        })
        .collect()
}

/// Wilder-smoothed average of the true range.
///
/// Output element `i` corresponds to bar index `i + period`: the first true
/// range needs a previous bar, so `period + 1` bars are required.
pub fn calculate_atr(bars: &[PriceBar], period: usize) -> Vec<f64> {
    smooth(&true_ranges(bars), period, wilder_alpha(period))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(high: f64, low: f64, close: f64) -> PriceBar {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        PriceBar::new(date, close, high, low, close, 0.0)
    }

    #[test]
    fn gap_widens_true_range() {
        let bars = [bar(105.0, 95.0, 95.0), bar(115.0, 108.0, 112.0)];
        // |115 - 95| beats the 7-point bar range.
        assert_eq!(true_ranges(&bars), vec![20.0]);
    }

    #[test]
    fn steady_range_gives_steady_atr() {
        let bars: Vec<PriceBar> = (0..25).map(|_| bar(110.0, 90.0, 100.0)).collect();
        let atr = calculate_atr(&bars, 5);
        assert_eq!(atr.len(), 25 - 5);
        assert!(atr.iter().all(|v| (v - 20.0).abs() < 1e-10));
    }

    #[test]
    fn needs_one_bar_more_than_period() {
        let bars: Vec<PriceBar> = (0..4).map(|i| bar(101.0 + i as f64, 99.0, 100.0)).collect();
        assert_eq!(calculate_atr(&bars, 3).len(), 1);
        assert!(calculate_atr(&bars[..3], 3).is_empty());
        assert!(calculate_atr(&bars, 0).is_empty());
    }

    #[test]
    fn infinite_seed_is_empty() {
        let bars = [
            bar(105.0, 95.0, 100.0),
            bar(f64::INFINITY, 95.0, 100.0),
            bar(105.0, 95.0, 100.0),
        ];
        assert!(calculate_atr(&bars, 2).is_empty());
    }
}
