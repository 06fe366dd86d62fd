//! Strategy variants and the rebalance-day executor.

use chrono::NaiveDate;
use std::collections::HashMap;

use super::error::PapertraderError;
use super::indicator::build_market_view;
use super::ledger::Ledger;
use super::market_data::MarketData;
use crate::ports::agent_port::{ActionKind, AgentPort};

/// Fraction of capital deployed by the allocation strategies; the remaining
/// 10% stays as a cash buffer.
pub const DEPLOYABLE_PCT: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebalanceFrequency {
    Daily,
    Weekly,
}

impl RebalanceFrequency {
    /// Weekly means every 5th trading day by index (0, 5, 10, ...), not a
    /// calendar-week boundary.
    pub fn is_rebalance_day(self, day_index: usize) -> bool {
        match self {
            RebalanceFrequency::Daily => true,
            RebalanceFrequency::Weekly => day_index % 5 == 0,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "daily" => Some(RebalanceFrequency::Daily),
            "weekly" => Some(RebalanceFrequency::Weekly),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RebalanceFrequency::Daily => "daily",
            RebalanceFrequency::Weekly => "weekly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    BuyAndHold,
    EqualWeight,
    Agent,
}

impl StrategyKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "buy_and_hold" => Some(StrategyKind::BuyAndHold),
            "equal_weight" => Some(StrategyKind::EqualWeight),
            "agent" => Some(StrategyKind::Agent),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::BuyAndHold => "buy_and_hold",
            StrategyKind::EqualWeight => "equal_weight",
            StrategyKind::Agent => "agent",
        }
    }
}

/// Executes one strategy variant on rebalance days. Selected once at run
/// configuration; owns its own allocation state rather than re-deriving it
/// from ledger internals.
pub struct StrategyExecutor<'a> {
    kind: StrategyKind,
    agent: Option<&'a dyn AgentPort>,
    has_allocated: bool,
}

impl<'a> StrategyExecutor<'a> {
    pub fn new(
        kind: StrategyKind,
        agent: Option<&'a dyn AgentPort>,
    ) -> Result<Self, PapertraderError> {
        if kind == StrategyKind::Agent && agent.is_none() {
            return Err(PapertraderError::Agent {
                reason: "agent strategy configured without a decision agent".into(),
            });
        }
        Ok(Self {
            kind,
            agent,
            has_allocated: false,
        })
    }

    pub fn on_rebalance(
        &mut self,
        date: NaiveDate,
        snapshot: &HashMap<String, f64>,
        market: &MarketData,
        ledger: &mut Ledger,
    ) -> Result<(), PapertraderError> {
        match self.kind {
            StrategyKind::BuyAndHold => {
                // Allocate on the first opportunity with no open positions,
                // then hold whatever that established.
                if ledger.num_positions() == 0 {
                    allocate_equal(market, snapshot, ledger, date);
                }
                Ok(())
            }
            StrategyKind::EqualWeight => {
                if self.has_allocated {
                    return Ok(());
                }
                if allocate_equal(market, snapshot, ledger, date) {
                    self.has_allocated = true;
                }
                Ok(())
            }
            StrategyKind::Agent => {
                let agent = self.agent.expect("checked at construction");
                let view = build_market_view(market, date);
                let summary = ledger.get_summary();
                let decision = agent.decide(&view, &summary)?;

                for action in decision.actions {
                    // An instruction for a ticker without a price today is
                    // skipped, not retried at another price.
                    let Some(&price) = snapshot.get(&action.ticker) else {
                        continue;
                    };
                    match action.action {
                        ActionKind::Buy => {
                            ledger.buy(&action.ticker, action.pct.unwrap_or(0.0), price, date)
                        }
                        ActionKind::Sell => ledger.sell(&action.ticker, price, date),
                    }
                }
                Ok(())
            }
        }
    }
}

/// Split [`DEPLOYABLE_PCT`] evenly across every ticker in the snapshot,
/// iterating assets in universe order for deterministic trade ordering.
/// Returns false when the snapshot is empty and nothing was bought.
fn allocate_equal(
    market: &MarketData,
    snapshot: &HashMap<String, f64>,
    ledger: &mut Ledger,
    date: NaiveDate,
) -> bool {
    if snapshot.is_empty() {
        return false;
    }
    let pct_per_ticker = DEPLOYABLE_PCT / snapshot.len() as f64;
    for series in market.assets() {
        if let Some(&price) = snapshot.get(&series.ticker) {
            ledger.buy(&series.ticker, pct_per_ticker, price, date);
        }
    }
    true
}
