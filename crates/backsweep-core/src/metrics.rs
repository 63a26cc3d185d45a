//! Performance metrics computed from a strategy's equity history.

/// Number of observations used to annualize the Sharpe ratio, assuming
/// per-minute batch cadence (252 trading days * 1440 minutes/day). This is
/// a placeholder carried over from the reference implementation's
/// per-minute assumption; a production deployment should parameterize it
/// by the stream's actual observation cadence instead of hardcoding it.
pub const ANNUALIZATION_PERIODS: f64 = 252.0 * 1440.0;

/// `sqrt(ANNUALIZATION_PERIODS)`, the Sharpe annualization multiplier.
pub fn annualization_factor() -> f64 {
    ANNUALIZATION_PERIODS.sqrt()
}

/// Return on investment as a percentage: `(final - initial) / initial * 100`.
pub fn roi(final_equity: f64, initial_value: f64) -> f64 {
    (final_equity - initial_value) / initial_value * 100.0
}

/// Largest peak-to-trough percentage drop in an equity curve. Returns 0.0
/// on an empty history.
pub fn max_drawdown(equity_history: &[f64]) -> f64 {
    let Some(&first) = equity_history.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut worst = 0.0_f64;
    for &value in equity_history {
        if value > peak {
            peak = value;
        }
        let dd = (peak - value) / peak;
        if dd > worst {
            worst = dd;
        }
    }
    worst * 100.0
}

/// Mean-over-population-stdev of batch-to-batch returns, annualized by
/// [`annualization_factor`]. Returns 0.0 if fewer than two observations or
/// the return series has zero variance.
pub fn sharpe(equity_history: &[f64]) -> f64 {
    if equity_history.len() < 2 {
        return 0.0;
    }
    let returns: Vec<f64> = equity_history
        .windows(2)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();

    if std > 0.0 {
        (mean / std) * annualization_factor()
    } else {
        0.0
    }
}
