// =============================================================================
// Average Directional Index (ADX)
// =============================================================================
//
// Trend strength regardless of direction:
//
//   +DM / -DM  directional movement of each bar against the previous one
//   +DI / -DI  Wilder averages of +DM / -DM over the Wilder average of TR
//   DX         |+DI - -DI| / (+DI + -DI) * 100
//   ADX        Wilder average of DX
//
// Readings above 25 usually mean a trending market, below 20 a choppy one.
// =============================================================================

use super::atr::true_ranges;
use super::smoothing::{smooth, wilder_alpha};
use crate::types::PriceBar;

/// Bar index of the first ADX value for `period`.
pub fn adx_start(period: usize) -> usize {
    period.saturating_mul(2).saturating_sub(1)
}

/// ADX of `bars`; element `i` lines up with bar `adx_start(period) + i`.
///
/// Needs at least `2 * period` bars. A bar set without any range yields an
/// empty series.
pub fn calculate_adx(bars: &[PriceBar], period: usize) -> Vec<f64> {
    if period == 0 || bars.len() < period.saturating_mul(2) {
        return Vec::new();
    }

    let alpha = wilder_alpha(period);
    let (plus_dm, minus_dm) = directional_movement(bars);
    let range = smooth(&true_ranges(bars), period, alpha);
    let plus = smooth(&plus_dm, period, alpha);
    let minus = smooth(&minus_dm, period, alpha);

    let dx: Vec<f64> = range
        .iter()
        .zip(plus.iter().zip(&minus))
        .map_while(|(&tr, (&p, &m))| directional_index(p, m, tr))
        .collect();

    smooth(&dx, period, alpha)
}

/// +DM and -DM for every bar after the first. Only the larger of the two
/// moves counts, and only when positive.
fn directional_movement(bars: &[PriceBar]) -> (Vec<f64>, Vec<f64>) {
    bars.windows(2)
        .map(|w| {
            let up = w[1].high - w[0].high;
            let down = w[0].low - w[1].low;
            let plus = if up > down && up > 0.0 { up } else { 0.0 };
            let minus = if down > up && down > 0.0 { down } else { 0.0 };
            (plus, minus)
        })
        .unzip()
}

/// DX from averaged +DM, -DM and TR. `None` when there is no range to
/// normalise by.
fn directional_index(plus_dm: f64, minus_dm: f64, tr: f64) -> Option<f64> {
    if tr == 0.0 {
        return None;
    }
    let plus_di = plus_dm / tr * 100.0;
    let minus_di = minus_dm / tr * 100.0;
    let total = plus_di + minus_di;
    if total == 0.0 {
        return Some(0.0);
    }
    let dx = (plus_di - minus_di).abs() / total * 100.0;
    dx.is_finite().then_some(dx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(high: f64, low: f64, close: f64) -> PriceBar {
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        PriceBar::new(date, close, high, low, close, 0.0)
    }

    fn trending(n: usize, step: f64) -> Vec<PriceBar> {
        (0..n)
            .map(|i| {
                let mid = 100.0 + i as f64 * step;
                bar(mid + 1.0, mid - 1.0, mid)
            })
            .collect()
    }

    #[test]
    fn length_and_minimum_history() {
        let bars = trending(40, 1.0);
        assert_eq!(calculate_adx(&bars, 7).len(), 40 - adx_start(7));
        assert_eq!(calculate_adx(&bars[..14], 7).len(), 1);
        assert!(calculate_adx(&bars[..13], 7).is_empty());
        assert!(calculate_adx(&bars, 0).is_empty());
    }

    #[test]
    fn huge_period_is_empty_not_overflow() {
        let bars = trending(40, 1.0);
        assert!(calculate_adx(&bars, usize::MAX).is_empty());
        assert_eq!(adx_start(usize::MAX), usize::MAX - 1);
    }

    #[test]
    fn steady_trend_reads_strong() {
        // Every bar's high beats the previous: only +DM, DX is 100.
        let up = calculate_adx(&trending(60, 2.0), 14);
        assert!(up.iter().all(|v| (v - 100.0).abs() < 1e-9));

        let down = calculate_adx(&trending(60, -2.0), 14);
        assert!(*down.last().unwrap() > 25.0);
    }

    #[test]
    fn sideways_bars_read_zero() {
        let bars = vec![bar(101.0, 99.0, 100.0); 40];
        assert!(calculate_adx(&bars, 14).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn rangeless_bars_are_empty() {
        let bars = vec![bar(100.0, 100.0, 100.0); 40];
        assert!(calculate_adx(&bars, 14).is_empty());
    }

    #[test]
    fn oscillating_market_stays_in_range() {
        let bars: Vec<PriceBar> = (0..100)
            .map(|i| {
                let mid = 50.0 + (i as f64 * 0.3).sin() * 10.0;
                bar(mid + 1.0, mid - 1.0, mid + 0.5)
            })
            .collect();
        for v in calculate_adx(&bars, 14) {
            assert!((0.0..=100.0).contains(&v), "ADX {v} out of range");
        }
    }
}
