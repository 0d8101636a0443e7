// =============================================================================
// Recursive smoothing shared by EMA, RSI, ATR and ADX
// =============================================================================
//
//   seed   = mean(values[..period])
//   next   = prev + alpha * (x - prev)
//
// EMA uses alpha = 2 / (period + 1); Wilder's smoothing uses 1 / period.
// =============================================================================

/// Smoothing factor of an exponential moving average.
pub(crate) fn ema_alpha(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Smoothing factor of Wilder's moving average.
pub(crate) fn wilder_alpha(period: usize) -> f64 {
    1.0 / period as f64
}

/// Seeded recursive average of `values`.
///
/// Output element `i` corresponds to input index `i + period - 1`. Empty when
/// `period == 0`, when there are fewer than `period` values, or when the seed
/// is non-finite; the first non-finite later value ends the series.
pub(crate) fn smooth(values: &[f64], period: usize, alpha: f64) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let seed = values[..period].iter().sum::<f64>() / period as f64;
    if !seed.is_finite() {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(values.len() - period + 1);
    out.push(seed);
    let mut prev = seed;
    for &x in &values[period..] {
        let next = prev + alpha * (x - prev);
        if !next.is_finite() {
            break;
        }
        out.push(next);
        prev = next;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_is_the_window_mean() {
        assert_eq!(smooth(&[2.0, 4.0, 6.0], 3, 0.5), vec![4.0]);
    }

    #[test]
    fn recursion_moves_towards_new_values() {
        // seed 1.0, then 1 + 0.5 * (3 - 1) = 2, then 2 + 0.5 * (2 - 2) = 2
        assert_eq!(smooth(&[1.0, 1.0, 3.0, 2.0], 2, 0.5), vec![1.0, 2.0, 2.0]);
    }

    #[test]
    fn degenerate_and_non_finite_inputs() {
        assert!(smooth(&[1.0], 0, 0.5).is_empty());
        assert!(smooth(&[1.0], 2, 0.5).is_empty());
        assert!(smooth(&[f64::NAN, 1.0], 1, 0.5).is_empty());
        assert_eq!(smooth(&[1.0, f64::INFINITY, 1.0], 1, 0.5), vec![1.0]);
    }

    #[test]
    fn alphas() {
        assert!((ema_alpha(9) - 0.2).abs() < 1e-12);
        assert!((wilder_alpha(14) - 1.0 / 14.0).abs() < 1e-12);
    }
}
