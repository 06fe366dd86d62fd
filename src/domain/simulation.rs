//! Simulation loop: advances a fresh ledger through the trading calendar
//! one day at a time and scores the realized equity curve.

use chrono::NaiveDate;
use log::info;
use serde::Serialize;

use super::error::PapertraderError;
use super::ledger::Ledger;
use super::market_data::{MarketData, SimulationWindow};
use super::metrics::MetricsReport;
use super::strategy::{RebalanceFrequency, StrategyExecutor, StrategyKind};
use crate::ports::agent_port::AgentPort;

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    pub tickers: Vec<String>,
    pub rebalance: RebalanceFrequency,
    pub strategy: StrategyKind,
    pub benchmark: Option<String>,
}

/// One trading date's portfolio state. The sequence of these is the equity
/// curve the metrics engine consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyResult {
    pub date: NaiveDate,
    pub total_value: f64,
    pub cash: f64,
    pub positions_value: f64,
    pub total_return_pct: f64,
    pub num_positions: usize,
}

/// Completed run: metadata, metrics and the full daily sequence. Plain data
/// with no internal references, safe to persist verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub strategy: String,
    pub initial_capital: f64,
    pub final_value: f64,
    pub metrics: MetricsReport,
    pub daily_results: Vec<DailyResult>,
}

/// Drive one strategy over the market data, one trading day per step:
/// snapshot prices, mark the ledger to market, rebalance when the cadence
/// allows, record the day. Metrics are computed once, after the last day.
pub fn run_simulation(
    config: &SimulationConfig,
    market: &MarketData,
    agent: Option<&dyn AgentPort>,
) -> Result<RunResult, PapertraderError> {
    let window = SimulationWindow::new(config.start_date, config.end_date)?;

    if market.is_empty() {
        return Err(PapertraderError::EmptyUniverse);
    }

    let dates = market.trading_dates(window);
    if dates.is_empty() {
        return Err(PapertraderError::NoTradingDates {
            start: config.start_date.to_string(),
            end: config.end_date.to_string(),
        });
    }

    info!(
        "replaying {} over {} trading days ({} to {})",
        config.strategy.name(),
        dates.len(),
        config.start_date,
        config.end_date
    );

    let mut ledger = Ledger::new(config.initial_capital);
    let mut executor = StrategyExecutor::new(config.strategy, agent)?;
    let mut daily_results = Vec::with_capacity(dates.len());

    for (i, &date) in dates.iter().enumerate() {
        if i % 20 == 0 {
            info!("processing day {}/{}: {date}", i + 1, dates.len());
        }

        let snapshot = market.snapshot(date);
        ledger.update_prices(&snapshot);

        if config.rebalance.is_rebalance_day(i) {
            executor.on_rebalance(date, &snapshot, market, &mut ledger)?;
        }

        let summary = ledger.get_summary();
        daily_results.push(DailyResult {
            date,
            total_value: summary.total_value,
            cash: summary.cash,
            positions_value: summary.positions_value,
            total_return_pct: summary.total_return_pct,
            num_positions: summary.num_positions,
        });
    }

    let benchmark_returns = match &config.benchmark {
        Some(ticker) => market.benchmark_returns(ticker, window),
        None => Vec::new(),
    };

    let metrics = MetricsReport::compute(
        &daily_results,
        config.initial_capital,
        &benchmark_returns,
        ledger.trades().len(),
    );

    info!(
        "{} finished: final value {:.2}, {} trades",
        config.strategy.name(),
        ledger.total_value(),
        ledger.trades().len()
    );

    Ok(RunResult {
        start_date: config.start_date,
        end_date: config.end_date,
        strategy: config.strategy.name().to_string(),
        initial_capital: config.initial_capital,
        final_value: ledger.total_value(),
        metrics,
        daily_results,
    })
}
