#![allow(dead_code)]

use chrono::NaiveDate;
use papertrader::domain::error::PapertraderError;
use papertrader::domain::indicator::MarketView;
use papertrader::domain::ledger::LedgerSummary;
use papertrader::domain::market_data::SimulationWindow;
pub use papertrader::domain::ohlcv::OhlcvBar;
use papertrader::domain::simulation::SimulationConfig;
use papertrader::domain::strategy::{RebalanceFrequency, StrategyKind};
use papertrader::ports::agent_port::{AgentAction, AgentPort, Decision};
use papertrader::ports::market_data_port::MarketDataPort;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockMarketDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockMarketDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockMarketDataPort {
    fn fetch_series(
        &self,
        ticker: &str,
        window: SimulationWindow,
    ) -> Result<Vec<OhlcvBar>, PapertraderError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(PapertraderError::Data {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(ticker)
            .map(|bars| {
                bars.iter()
                    .filter(|b| window.contains(b.date))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_tickers(&self) -> Result<Vec<String>, PapertraderError> {
        let mut tickers: Vec<String> = self.data.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }
}

/// Agent returning the same scripted actions on every rebalance.
pub struct ScriptedAgent {
    pub actions: Vec<AgentAction>,
}

impl AgentPort for ScriptedAgent {
    fn decide(
        &self,
        _view: &MarketView,
        _summary: &LedgerSummary,
    ) -> Result<Decision, PapertraderError> {
        Ok(Decision {
            actions: self.actions.clone(),
        })
    }
}

/// Agent counting how often it is consulted; issues no actions.
pub struct CountingAgent {
    pub calls: RefCell<usize>,
}

impl CountingAgent {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.borrow()
    }
}

impl AgentPort for CountingAgent {
    fn decide(
        &self,
        _view: &MarketView,
        _summary: &LedgerSummary,
    ) -> Result<Decision, PapertraderError> {
        *self.calls.borrow_mut() += 1;
        Ok(Decision::default())
    }
}

pub struct FailingAgent;

impl AgentPort for FailingAgent {
    fn decide(
        &self,
        _view: &MarketView,
        _summary: &LedgerSummary,
    ) -> Result<Decision, PapertraderError> {
        Err(PapertraderError::Agent {
            reason: "inference failed".into(),
        })
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(ticker: &str, date_str: &str, close: f64) -> OhlcvBar {
    OhlcvBar {
        ticker: ticker.to_string(),
        date: NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

/// `count` consecutive calendar-day bars starting at `start`, close moving
/// by `step` per day.
pub fn generate_bars(
    ticker: &str,
    start: NaiveDate,
    count: usize,
    start_price: f64,
    step: f64,
) -> Vec<OhlcvBar> {
    (0..count)
        .map(|i| {
            let close = start_price + step * i as f64;
            OhlcvBar {
                ticker: ticker.to_string(),
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

pub fn sample_config(strategy: StrategyKind) -> SimulationConfig {
    SimulationConfig {
        start_date: date(2024, 1, 1),
        end_date: date(2024, 12, 31),
        initial_capital: 10_000.0,
        tickers: vec!["SPY".into(), "QQQ".into(), "GLD".into()],
        rebalance: RebalanceFrequency::Daily,
        strategy,
        benchmark: None,
    }
}
