//! Decision-agent port trait and its instruction types.

use crate::domain::error::PapertraderError;
use crate::domain::indicator::MarketView;
use crate::domain::ledger::LedgerSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Buy,
    Sell,
}

/// One instruction from the agent. `pct` is the portfolio percentage to
/// deploy on a buy; sells liquidate the full holding and ignore it.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentAction {
    pub ticker: String,
    pub action: ActionKind,
    pub pct: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decision {
    pub actions: Vec<AgentAction>,
}

/// A decision agent: sees the market feature view and the current portfolio
/// summary, returns an ordered action list. A failure here aborts the run.
pub trait AgentPort {
    fn decide(
        &self,
        view: &MarketView,
        summary: &LedgerSummary,
    ) -> Result<Decision, PapertraderError>;
}
