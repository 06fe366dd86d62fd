//! Historical series store, trading calendar and price snapshots.
//!
//! `MarketData` keeps one [`AssetSeries`] per ticker in universe order; the
//! first series is authoritative for the trading calendar. Price snapshots
//! are strict exact-date lookups with missing tickers simply absent.

use chrono::{Duration, NaiveDate};
use log::warn;
use std::collections::HashMap;

use super::error::PapertraderError;
use super::ohlcv::OhlcvBar;
use crate::ports::market_data_port::MarketDataPort;

/// Calendar days of extra history fetched before the window start so
/// indicators have warm history on the first trading date.
pub const WARMUP_DAYS: i64 = 60;

/// Inclusive date window of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SimulationWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PapertraderError> {
        if start > end {
            return Err(PapertraderError::InvalidWindow {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// One ticker's bars, ordered by date, with a date lookup index.
#[derive(Debug, Clone)]
pub struct AssetSeries {
    pub ticker: String,
    bars: Vec<OhlcvBar>,
    date_index: HashMap<NaiveDate, usize>,
}

impl AssetSeries {
    /// Bars are sorted by date on construction; a duplicate date keeps the
    /// later bar in the index.
    pub fn new(ticker: String, mut bars: Vec<OhlcvBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        let date_index = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| (bar.date, i))
            .collect();
        Self {
            ticker,
            bars,
            date_index,
        }
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    pub fn close_on(&self, date: NaiveDate) -> Option<f64> {
        self.date_index.get(&date).map(|&i| self.bars[i].close)
    }

    /// All bars dated on or before `date`.
    pub fn bars_until(&self, date: NaiveDate) -> &[OhlcvBar] {
        let cut = self.bars.partition_point(|b| b.date <= date);
        &self.bars[..cut]
    }
}

/// Per-ticker historical series in universe order.
#[derive(Debug, Clone, Default)]
pub struct MarketData {
    assets: Vec<AssetSeries>,
}

impl MarketData {
    pub fn new(assets: Vec<AssetSeries>) -> Self {
        Self { assets }
    }

    pub fn assets(&self) -> &[AssetSeries] {
        &self.assets
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn get(&self, ticker: &str) -> Option<&AssetSeries> {
        self.assets.iter().find(|s| s.ticker == ticker)
    }

    /// Ascending trading dates within the window, taken from the first
    /// asset's series. All tickers are assumed to share one exchange
    /// calendar; gaps in other series surface as missing snapshot entries.
    pub fn trading_dates(&self, window: SimulationWindow) -> Vec<NaiveDate> {
        let Some(reference) = self.assets.first() else {
            return Vec::new();
        };
        reference
            .bars()
            .iter()
            .map(|b| b.date)
            .filter(|&d| window.contains(d))
            .collect()
    }

    /// Closing price per ticker for exactly `date`. No forward or backward
    /// fill: a ticker without a bar on that date is omitted.
    pub fn snapshot(&self, date: NaiveDate) -> HashMap<String, f64> {
        self.assets
            .iter()
            .filter_map(|s| s.close_on(date).map(|close| (s.ticker.clone(), close)))
            .collect()
    }

    /// Day-over-day returns of `ticker`'s closes within the window, for
    /// beta/alpha computation. Empty if the ticker is not in the universe.
    pub fn benchmark_returns(&self, ticker: &str, window: SimulationWindow) -> Vec<f64> {
        let Some(series) = self.get(ticker) else {
            return Vec::new();
        };
        let closes: Vec<f64> = series
            .bars()
            .iter()
            .filter(|b| window.contains(b.date))
            .map(|b| b.close)
            .collect();
        closes
            .windows(2)
            .map(|w| (w[1] - w[0]) / w[0])
            .collect()
    }
}

/// Fetch the universe through the data port, dropping tickers that fail or
/// come back empty. Errors only when every ticker was dropped.
///
/// The fetch window is widened by [`WARMUP_DAYS`] before the start so that
/// indicator history is available on the first trading date.
pub fn load_market_data(
    port: &dyn MarketDataPort,
    tickers: &[String],
    window: SimulationWindow,
) -> Result<MarketData, PapertraderError> {
    let fetch_window = SimulationWindow {
        start: window.start - Duration::days(WARMUP_DAYS),
        end: window.end,
    };

    let mut assets = Vec::new();
    for ticker in tickers {
        let bars = match port.fetch_series(ticker, fetch_window) {
            Ok(bars) => bars,
            Err(e) => {
                warn!("dropping {ticker}: {e}");
                continue;
            }
        };
        if bars.is_empty() {
            warn!("dropping {ticker}: no bars in range");
            continue;
        }
        assets.push(AssetSeries::new(ticker.clone(), bars));
    }

    if assets.is_empty() {
        return Err(PapertraderError::EmptyUniverse);
    }
    Ok(MarketData::new(assets))
}
