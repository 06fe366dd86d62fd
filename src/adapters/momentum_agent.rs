//! Offline RSI-threshold decision agent.
//!
//! Stands in for a remote decision service so agent-driven runs work without
//! network access: buy when an asset's RSI drops below the oversold bound,
//! sell when it rises above the overbought bound. Sells for unheld tickers
//! are ledger no-ops, so no position tracking is needed here.

use crate::domain::error::PapertraderError;
use crate::domain::indicator::MarketView;
use crate::domain::ledger::LedgerSummary;
use crate::ports::agent_port::{ActionKind, AgentAction, AgentPort, Decision};

pub struct MomentumAgent {
    pub oversold: f64,
    pub overbought: f64,
    /// Portfolio percentage deployed per buy signal.
    pub trade_pct: f64,
}

impl Default for MomentumAgent {
    fn default() -> Self {
        MomentumAgent {
            oversold: 30.0,
            overbought: 70.0,
            trade_pct: 15.0,
        }
    }
}

impl AgentPort for MomentumAgent {
    fn decide(
        &self,
        view: &MarketView,
        _summary: &LedgerSummary,
    ) -> Result<Decision, PapertraderError> {
        let mut actions = Vec::new();
        for asset in &view.assets {
            let Some(rsi) = asset.latest().rsi else {
                continue;
            };
            if rsi <= self.oversold {
                actions.push(AgentAction {
                    ticker: asset.ticker.clone(),
                    action: ActionKind::Buy,
                    pct: Some(self.trade_pct),
                });
            } else if rsi >= self.overbought {
                actions.push(AgentAction {
                    ticker: asset.ticker.clone(),
                    action: ActionKind::Sell,
                    pct: None,
                });
            }
        }
        Ok(Decision { actions })
    }
}
