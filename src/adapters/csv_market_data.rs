//! CSV file market-data adapter.
//!
//! One file per ticker (`{TICKER}.csv`) with a
//! `date,open,high,low,close,volume` header, dates in ISO format.

use chrono::NaiveDate;
use csv::StringRecord;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::error::PapertraderError;
use crate::domain::market_data::SimulationWindow;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::market_data_port::MarketDataPort;

pub struct CsvMarketData {
    base_path: PathBuf,
}

impl CsvMarketData {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{ticker}.csv"))
    }
}

fn field<T: FromStr>(
    record: &StringRecord,
    index: usize,
    name: &str,
    ticker: &str,
) -> Result<T, PapertraderError>
where
    T::Err: std::fmt::Display,
{
    let raw = record
        .get(index)
        .ok_or_else(|| PapertraderError::Data {
            ticker: ticker.to_string(),
            reason: format!("missing {name} column"),
        })?;
    raw.parse().map_err(|e| PapertraderError::Data {
        ticker: ticker.to_string(),
        reason: format!("invalid {name} value {raw:?}: {e}"),
    })
}

impl MarketDataPort for CsvMarketData {
    fn fetch_series(
        &self,
        ticker: &str,
        window: SimulationWindow,
    ) -> Result<Vec<OhlcvBar>, PapertraderError> {
        let path = self.csv_path(ticker);
        if !path.exists() {
            return Err(PapertraderError::NoData {
                ticker: ticker.to_string(),
            });
        }

        let mut reader = csv::Reader::from_path(&path).map_err(|e| PapertraderError::Data {
            ticker: ticker.to_string(),
            reason: format!("failed to open {}: {e}", path.display()),
        })?;

        let mut bars = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| PapertraderError::Data {
                ticker: ticker.to_string(),
                reason: format!("CSV parse error: {e}"),
            })?;

            let date_str: String = field(&record, 0, "date", ticker)?;
            let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
                PapertraderError::Data {
                    ticker: ticker.to_string(),
                    reason: format!("invalid date {date_str:?}: {e}"),
                }
            })?;

            if !window.contains(date) {
                continue;
            }

            bars.push(OhlcvBar {
                ticker: ticker.to_string(),
                date,
                open: field(&record, 1, "open", ticker)?,
                high: field(&record, 2, "high", ticker)?,
                low: field(&record, 3, "low", ticker)?,
                close: field(&record, 4, "close", ticker)?,
                volume: field(&record, 5, "volume", ticker)?,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn list_tickers(&self) -> Result<Vec<String>, PapertraderError> {
        let entries = fs::read_dir(&self.base_path)?;

        let mut tickers = Vec::new();
        for entry in entries {
            let name = entry?.file_name();
            let name = name.to_string_lossy();
            if let Some(ticker) = name.strip_suffix(".csv") {
                tickers.push(ticker.to_string());
            }
        }

        tickers.sort();
        Ok(tickers)
    }
}
