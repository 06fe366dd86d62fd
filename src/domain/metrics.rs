//! Performance metrics computed from a completed run's equity curve.
//!
//! `MetricsReport::compute` is a pure function of the daily results, the
//! initial capital and an optional benchmark return series. Every ratio
//! guards its divisions: degenerate inputs produce the documented fallback
//! (0, or infinity where no losses were observed) instead of panicking.

use serde::Serialize;

use super::simulation::DailyResult;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const RISK_FREE_RATE: f64 = 0.02;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub total_return: f64,
    pub annualized_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub max_drawdown: f64,
    pub calmar_ratio: f64,
    pub omega_ratio: f64,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub beta: f64,
    pub alpha: f64,
    pub num_trades: usize,
    pub equity_curve: Vec<f64>,
    pub drawdown_curve: Vec<f64>,
    pub daily_returns: Vec<f64>,
}

impl MetricsReport {
    pub fn compute(
        results: &[DailyResult],
        initial_capital: f64,
        benchmark_returns: &[f64],
        num_trades: usize,
    ) -> Self {
        let values: Vec<f64> = results.iter().map(|r| r.total_value).collect();
        let returns: Vec<f64> = values
            .windows(2)
            .map(|w| (w[1] - w[0]) / w[0])
            .collect();

        let total_return = match values.last() {
            Some(&last) if initial_capital > 0.0 => last / initial_capital - 1.0,
            _ => 0.0,
        };

        let days = results.len();
        let annualized_return = if days > 0 {
            (1.0 + total_return).powf(365.0 / days as f64) - 1.0
        } else {
            0.0
        };

        let volatility = if returns.is_empty() {
            0.0
        } else {
            population_std(&returns) * TRADING_DAYS_PER_YEAR.sqrt()
        };

        let sharpe_ratio = if volatility > 0.0 {
            (annualized_return - RISK_FREE_RATE) / volatility
        } else {
            0.0
        };

        // Running-peak drawdown; the peak starts at initial capital so a run
        // that opens below its funding level registers as a drawdown.
        let mut peak = initial_capital;
        let mut max_drawdown = 0.0_f64;
        let mut drawdown_curve = Vec::with_capacity(values.len());
        for &value in &values {
            if value > peak {
                peak = value;
            }
            let drawdown = if peak > 0.0 { (peak - value) / peak } else { 0.0 };
            drawdown_curve.push(drawdown);
            max_drawdown = max_drawdown.max(drawdown);
        }

        let calmar_ratio = if max_drawdown > 0.0 {
            annualized_return / max_drawdown
        } else {
            0.0
        };

        let gains: f64 = returns.iter().filter(|&&r| r > 0.0).sum();
        let losses: f64 = returns.iter().filter(|&&r| r < 0.0).map(|r| r.abs()).sum();
        let omega_ratio = if losses > 0.0 {
            gains / losses
        } else {
            f64::INFINITY
        };
        // Same formula as omega in the reference semantics; kept separate
        // rather than aliased.
        let profit_factor = if losses > 0.0 {
            gains / losses
        } else {
            f64::INFINITY
        };

        let win_rate = if returns.is_empty() {
            0.0
        } else {
            returns.iter().filter(|&&r| r > 0.0).count() as f64 / returns.len() as f64
        };

        let downside: Vec<f64> = returns.iter().copied().filter(|&r| r < 0.0).collect();
        let downside_volatility = if downside.is_empty() {
            0.0
        } else {
            population_std(&downside) * TRADING_DAYS_PER_YEAR.sqrt()
        };
        let sortino_ratio = if downside_volatility > 0.0 {
            (annualized_return - RISK_FREE_RATE) / downside_volatility
        } else {
            0.0
        };

        // Beta/alpha only when the benchmark series length matches the
        // portfolio return series exactly; any mismatch disables both.
        let mut beta = 0.0;
        let mut alpha = 0.0;
        if !benchmark_returns.is_empty() && benchmark_returns.len() == returns.len() {
            let benchmark_variance = population_var(benchmark_returns);
            if benchmark_variance > 0.0 {
                beta = sample_cov(&returns, benchmark_returns) / benchmark_variance;
            }
            alpha = annualized_return
                - (RISK_FREE_RATE
                    + beta * (mean(benchmark_returns) * TRADING_DAYS_PER_YEAR - RISK_FREE_RATE));
        }

        MetricsReport {
            total_return,
            annualized_return,
            volatility,
            sharpe_ratio,
            sortino_ratio,
            max_drawdown,
            calmar_ratio,
            omega_ratio,
            win_rate,
            profit_factor,
            beta,
            alpha,
            num_trades,
            equity_curve: values,
            drawdown_curve,
            daily_returns: returns,
        }
    }
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

fn population_var(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let m = mean(xs);
    xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / xs.len() as f64
}

fn population_std(xs: &[f64]) -> f64 {
    population_var(xs).sqrt()
}

/// Sample covariance (n−1 normalization), paired with population variance in
/// the beta computation to match the reference statistics.
fn sample_cov(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len();
    if n < 2 || n != ys.len() {
        return 0.0;
    }
    let mx = mean(xs);
    let my = mean(ys);
    xs.iter()
        .zip(ys)
        .map(|(x, y)| (x - mx) * (y - my))
        .sum::<f64>()
        / (n - 1) as f64
}
