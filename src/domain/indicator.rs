//! Technical indicators and the per-asset feature bundle fed to the
//! decision agent.
//!
//! All functions operate on a close series and return one value per input
//! bar, with `None` during the warmup prefix.
//!
//! RSI uses Wilder's smoothing: the first average is a simple mean over the
//! first `period` changes, then `avg = (prev_avg * (n-1) + current) / n`.
//! If the average loss is zero, RSI is 100.

use chrono::NaiveDate;

use super::market_data::MarketData;
use super::ohlcv::OhlcvBar;

pub const SMA_PERIOD: usize = 20;
pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_WIDTH: f64 = 2.0;

/// Minimum bars of history an asset needs before it enters the agent's view.
pub const MIN_FEATURE_BARS: usize = 20;

pub fn sma(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; closes.len()];
    }
    closes
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i + 1 < period {
                None
            } else {
                let window = &closes[i + 1 - period..=i];
                Some(window.iter().sum::<f64>() / period as f64)
            }
        })
        .collect()
}

/// EMA seeded with the SMA of the first `period` closes.
pub fn ema(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || closes.len() < period {
        return vec![None; closes.len()];
    }
    let mut out = vec![None; closes.len()];
    let alpha = 2.0 / (period as f64 + 1.0);
    let mut current = closes[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(current);
    for i in period..closes.len() {
        current = current + alpha * (closes[i] - current);
        out[i] = Some(current);
    }
    out
}

pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() <= period {
        return out;
    }

    let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let gain = |c: f64| if c > 0.0 { c } else { 0.0 };
    let loss = |c: f64| if c < 0.0 { -c } else { 0.0 };

    let mut avg_gain = changes[..period].iter().copied().map(gain).sum::<f64>() / period as f64;
    let mut avg_loss = changes[..period].iter().copied().map(loss).sum::<f64>() / period as f64;
    out[period] = Some(rsi_value(avg_gain, avg_loss));

    for i in period..changes.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gain(changes[i])) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss(changes[i])) / period as f64;
        out[i + 1] = Some(rsi_value(avg_gain, avg_loss));
    }
    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// MACD(12,26) line and its 9-period EMA signal line.
pub fn macd(closes: &[f64]) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let fast = ema(closes, MACD_FAST);
    let slow = ema(closes, MACD_SLOW);

    let line: Vec<Option<f64>> = fast
        .iter()
        .zip(&slow)
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    // Signal is an EMA over the valid span of the MACD line, re-aligned to
    // the full series.
    let valid_start = line.iter().position(Option::is_some);
    let mut signal = vec![None; closes.len()];
    if let Some(start) = valid_start {
        let compact: Vec<f64> = line[start..].iter().map(|v| v.unwrap_or(0.0)).collect();
        for (offset, value) in ema(&compact, MACD_SIGNAL).into_iter().enumerate() {
            signal[start + offset] = value;
        }
    }
    (line, signal)
}

/// Bollinger bands: SMA mid line ± `width` population standard deviations.
pub fn bollinger(
    closes: &[f64],
    period: usize,
    width: f64,
) -> (Vec<Option<f64>>, Vec<Option<f64>>, Vec<Option<f64>>) {
    let mid = sma(closes, period);
    let mut upper = vec![None; closes.len()];
    let mut lower = vec![None; closes.len()];

    for (i, mid_value) in mid.iter().enumerate() {
        let Some(m) = mid_value else { continue };
        let window = &closes[i + 1 - period..=i];
        let variance = window.iter().map(|c| (c - m).powi(2)).sum::<f64>() / period as f64;
        let sd = variance.sqrt();
        upper[i] = Some(m + width * sd);
        lower[i] = Some(m - width * sd);
    }
    (upper, mid, lower)
}

/// One bar's worth of computed features.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub close: f64,
    pub sma: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
}

/// Feature bundle for one asset: the per-bar table plus the return over the
/// available history window.
#[derive(Debug, Clone)]
pub struct AssetFeatures {
    pub ticker: String,
    pub rows: Vec<FeatureRow>,
    pub total_return: f64,
}

impl AssetFeatures {
    /// The most recent feature row. Rows are never empty: construction
    /// requires at least [`MIN_FEATURE_BARS`] bars.
    pub fn latest(&self) -> &FeatureRow {
        self.rows.last().expect("feature rows are non-empty")
    }
}

/// Everything the decision agent sees about the market on one day.
#[derive(Debug, Clone, Default)]
pub struct MarketView {
    pub assets: Vec<AssetFeatures>,
}

impl MarketView {
    pub fn get(&self, ticker: &str) -> Option<&AssetFeatures> {
        self.assets.iter().find(|a| a.ticker == ticker)
    }
}

/// Compute the feature bundle for one asset's history. Returns `None` when
/// fewer than [`MIN_FEATURE_BARS`] bars are available.
pub fn compute_features(ticker: &str, bars: &[OhlcvBar]) -> Option<AssetFeatures> {
    if bars.len() < MIN_FEATURE_BARS {
        return None;
    }
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let sma_series = sma(&closes, SMA_PERIOD);
    let rsi_series = rsi(&closes, RSI_PERIOD);
    let (macd_line, macd_signal) = macd(&closes);
    let (bb_upper, _, bb_lower) = bollinger(&closes, BOLLINGER_PERIOD, BOLLINGER_WIDTH);

    let rows = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| FeatureRow {
            date: bar.date,
            close: bar.close,
            sma: sma_series[i],
            rsi: rsi_series[i],
            macd: macd_line[i],
            macd_signal: macd_signal[i],
            bb_upper: bb_upper[i],
            bb_lower: bb_lower[i],
        })
        .collect();

    let total_return = if closes.len() > 1 {
        closes[closes.len() - 1] / closes[0] - 1.0
    } else {
        0.0
    };

    Some(AssetFeatures {
        ticker: ticker.to_string(),
        rows,
        total_return,
    })
}

/// Build the agent's market view for `date`: per-asset features over each
/// asset's history up to and including that date, skipping assets with too
/// little history.
pub fn build_market_view(market: &MarketData, date: NaiveDate) -> MarketView {
    let assets = market
        .assets()
        .iter()
        .filter_map(|series| compute_features(&series.ticker, series.bars_until(date)))
        .collect();
    MarketView { assets }
}
