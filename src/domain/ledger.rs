//! Ledger: cash, holdings and trade-event bookkeeping.
//!
//! The simulation engine mutates the ledger exclusively through
//! [`Ledger::update_prices`], [`Ledger::buy`] and [`Ledger::sell`]; everything
//! else is read-only.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// An open holding, marked to market via `update_prices`.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub ticker: String,
    pub shares: f64,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    pub last_price: f64,
}

impl Holding {
    pub fn market_value(&self) -> f64 {
        self.shares * self.last_price
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// One executed buy or sell. `num_trades` in the metrics report counts
/// these events cumulatively over a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeEvent {
    pub ticker: String,
    pub side: TradeSide,
    pub shares: f64,
    pub price: f64,
    pub value: f64,
    pub date: NaiveDate,
}

/// Snapshot of ledger state consumed by strategies and daily records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerSummary {
    pub total_value: f64,
    pub cash: f64,
    pub positions_value: f64,
    pub total_return_pct: f64,
    pub num_positions: usize,
}

#[derive(Debug, Clone)]
pub struct Ledger {
    cash: f64,
    initial_capital: f64,
    positions: HashMap<String, Holding>,
    trades: Vec<TradeEvent>,
}

impl Ledger {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            cash: initial_capital,
            initial_capital,
            positions: HashMap::new(),
            trades: Vec::new(),
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn positions(&self) -> &HashMap<String, Holding> {
        &self.positions
    }

    pub fn num_positions(&self) -> usize {
        self.positions.len()
    }

    pub fn trades(&self) -> &[TradeEvent] {
        &self.trades
    }

    /// Mark open holdings to market. Tickers absent from the snapshot keep
    /// their previous mark.
    pub fn update_prices(&mut self, prices: &HashMap<String, f64>) {
        for holding in self.positions.values_mut() {
            if let Some(&price) = prices.get(&holding.ticker) {
                holding.last_price = price;
            }
        }
    }

    pub fn positions_value(&self) -> f64 {
        self.positions.values().map(Holding::market_value).sum()
    }

    pub fn total_value(&self) -> f64 {
        self.cash + self.positions_value()
    }

    /// Buy `pct` percent of current total portfolio value of `ticker` at
    /// `price`. The notional is clamped to available cash; a buy that would
    /// size to nothing is a no-op. Buying into an existing holding averages
    /// the entry price by share count.
    pub fn buy(&mut self, ticker: &str, pct: f64, price: f64, date: NaiveDate) {
        if pct <= 0.0 || price <= 0.0 {
            return;
        }
        let notional = (self.total_value() * pct / 100.0).min(self.cash);
        if notional <= 0.0 {
            return;
        }
        let shares = notional / price;
        self.cash -= notional;

        self.positions
            .entry(ticker.to_string())
            .and_modify(|h| {
                let total_shares = h.shares + shares;
                h.entry_price = (h.entry_price * h.shares + price * shares) / total_shares;
                h.shares = total_shares;
                h.last_price = price;
            })
            .or_insert(Holding {
                ticker: ticker.to_string(),
                shares,
                entry_price: price,
                entry_date: date,
                last_price: price,
            });

        self.trades.push(TradeEvent {
            ticker: ticker.to_string(),
            side: TradeSide::Buy,
            shares,
            price,
            value: notional,
            date,
        });
    }

    /// Sell the full holding of `ticker` at `price`. A ticker with no open
    /// holding is a no-op and records no trade.
    pub fn sell(&mut self, ticker: &str, price: f64, date: NaiveDate) {
        let Some(holding) = self.positions.remove(ticker) else {
            return;
        };
        let proceeds = holding.shares * price;
        self.cash += proceeds;

        self.trades.push(TradeEvent {
            ticker: ticker.to_string(),
            side: TradeSide::Sell,
            shares: holding.shares,
            price,
            value: proceeds,
            date,
        });
    }

    pub fn get_summary(&self) -> LedgerSummary {
        let total_value = self.total_value();
        let total_return_pct = if self.initial_capital > 0.0 {
            (total_value / self.initial_capital - 1.0) * 100.0
        } else {
            0.0
        };
        LedgerSummary {
            total_value,
            cash: self.cash,
            positions_value: self.positions_value(),
            total_return_pct,
            num_positions: self.positions.len(),
        }
    }
}
