//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::console_report::ConsoleReportAdapter;
use crate::adapters::csv_market_data::CsvMarketData;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report::JsonReportAdapter;
use crate::adapters::momentum_agent::MomentumAgent;
use crate::domain::error::PapertraderError;
use crate::domain::market_data::{load_market_data, SimulationWindow};
use crate::domain::simulation::{run_simulation, RunResult, SimulationConfig};
use crate::domain::strategy::{RebalanceFrequency, StrategyKind};
use crate::ports::agent_port::AgentPort;
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "papertrader", about = "Historical strategy replay and scoring")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay one strategy over the configured window
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Override the configured strategy
        #[arg(short, long)]
        strategy: Option<String>,
        /// Override the configured ticker universe (comma separated)
        #[arg(long)]
        tickers: Option<String>,
        /// Write the run result as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Validate configuration and print the plan without running
        #[arg(long)]
        dry_run: bool,
    },
    /// Replay every strategy over the same data and compare results
    Compare {
        #[arg(short, long)]
        config: PathBuf,
        /// Write all results as one JSON document keyed by strategy
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Include the agent strategy in the sweep
        #[arg(long)]
        include_agent: bool,
    },
    /// List tickers available in the configured data directory
    ListTickers {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            strategy,
            tickers,
            output,
            dry_run,
        } => run_single(
            &config,
            strategy.as_deref(),
            tickers.as_deref(),
            output.as_deref(),
            dry_run,
        ),
        Command::Compare {
            config,
            output,
            include_agent,
        } => run_compare(&config, output.as_deref(), include_agent),
        Command::ListTickers { config } => run_list_tickers(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = PapertraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        fail(&err)
    })
}

fn fail(err: &PapertraderError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

/// Parse a comma-separated ticker list: trimmed, uppercased, duplicates and
/// empty tokens rejected.
pub fn parse_tickers(input: &str) -> Result<Vec<String>, PapertraderError> {
    let mut tickers: Vec<String> = Vec::new();
    for token in input.split(',') {
        let ticker = token.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(PapertraderError::ConfigInvalid {
                section: "simulation".into(),
                key: "tickers".into(),
                reason: "empty ticker in list".into(),
            });
        }
        if tickers.contains(&ticker) {
            return Err(PapertraderError::ConfigInvalid {
                section: "simulation".into(),
                key: "tickers".into(),
                reason: format!("duplicate ticker {ticker}"),
            });
        }
        tickers.push(ticker);
    }
    Ok(tickers)
}

fn parse_config_date(
    adapter: &dyn ConfigPort,
    key: &str,
) -> Result<NaiveDate, PapertraderError> {
    let raw = adapter
        .get_string("simulation", key)
        .ok_or_else(|| PapertraderError::ConfigMissing {
            section: "simulation".into(),
            key: key.into(),
        })?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| PapertraderError::ConfigInvalid {
        section: "simulation".into(),
        key: key.into(),
        reason: format!("{raw:?}: {e}"),
    })
}

pub fn build_simulation_config(
    adapter: &dyn ConfigPort,
) -> Result<SimulationConfig, PapertraderError> {
    let start_date = parse_config_date(adapter, "start_date")?;
    let end_date = parse_config_date(adapter, "end_date")?;

    let initial_capital = adapter.get_double("simulation", "initial_capital", 10_000.0);
    if initial_capital <= 0.0 {
        return Err(PapertraderError::ConfigInvalid {
            section: "simulation".into(),
            key: "initial_capital".into(),
            reason: format!("must be positive, got {initial_capital}"),
        });
    }

    let tickers = parse_tickers(
        &adapter
            .get_string("simulation", "tickers")
            .unwrap_or_else(|| "SPY,QQQ,GLD".to_string()),
    )?;

    let rebalance_raw = adapter
        .get_string("simulation", "rebalance")
        .unwrap_or_else(|| "daily".to_string());
    let rebalance = RebalanceFrequency::parse(&rebalance_raw).ok_or_else(|| {
        PapertraderError::ConfigInvalid {
            section: "simulation".into(),
            key: "rebalance".into(),
            reason: format!("expected daily or weekly, got {rebalance_raw:?}"),
        }
    })?;

    let strategy_raw = adapter
        .get_string("simulation", "strategy")
        .unwrap_or_else(|| "buy_and_hold".to_string());
    let strategy = parse_strategy(&strategy_raw)?;

    let benchmark_raw = adapter
        .get_string("simulation", "benchmark")
        .unwrap_or_else(|| "SPY".to_string());
    let benchmark = if benchmark_raw.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(benchmark_raw.to_uppercase())
    };

    Ok(SimulationConfig {
        start_date,
        end_date,
        initial_capital,
        tickers,
        rebalance,
        strategy,
        benchmark,
    })
}

pub fn parse_strategy(raw: &str) -> Result<StrategyKind, PapertraderError> {
    StrategyKind::parse(raw).ok_or_else(|| PapertraderError::ConfigInvalid {
        section: "simulation".into(),
        key: "strategy".into(),
        reason: format!("expected buy_and_hold, equal_weight or agent, got {raw:?}"),
    })
}

fn data_path(adapter: &dyn ConfigPort) -> PathBuf {
    PathBuf::from(
        adapter
            .get_string("data", "path")
            .unwrap_or_else(|| "./data".to_string()),
    )
}

fn build_agent(adapter: &dyn ConfigPort) -> MomentumAgent {
    let defaults = MomentumAgent::default();
    MomentumAgent {
        oversold: adapter.get_double("agent", "oversold", defaults.oversold),
        overbought: adapter.get_double("agent", "overbought", defaults.overbought),
        trade_pct: adapter.get_double("agent", "trade_pct", defaults.trade_pct),
    }
}

fn print_plan(config: &SimulationConfig, data_dir: &Path) {
    eprintln!("Strategy:    {}", config.strategy.name());
    eprintln!("Window:      {} to {}", config.start_date, config.end_date);
    eprintln!("Capital:     {:.2}", config.initial_capital);
    eprintln!("Universe:    {}", config.tickers.join(","));
    eprintln!("Rebalance:   {}", config.rebalance.as_str());
    eprintln!(
        "Benchmark:   {}",
        config.benchmark.as_deref().unwrap_or("none")
    );
    eprintln!("Data path:   {}", data_dir.display());
}

fn run_single(
    config_path: &Path,
    strategy_override: Option<&str>,
    tickers_override: Option<&str>,
    output_path: Option<&Path>,
    dry_run: bool,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let mut config = match build_simulation_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    if let Some(raw) = strategy_override {
        config.strategy = match parse_strategy(raw) {
            Ok(s) => s,
            Err(e) => return fail(&e),
        };
    }
    if let Some(raw) = tickers_override {
        config.tickers = match parse_tickers(raw) {
            Ok(t) => t,
            Err(e) => return fail(&e),
        };
    }

    let data_dir = data_path(&adapter);

    if dry_run {
        print_plan(&config, &data_dir);
        return ExitCode::SUCCESS;
    }

    let agent = build_agent(&adapter);
    let result = match execute(&config, &data_dir, &agent) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    if let Err(e) = ConsoleReportAdapter.write(&result, Path::new("")) {
        return fail(&e);
    }

    if let Some(path) = output_path {
        if let Err(e) = JsonReportAdapter.write(&result, path) {
            return fail(&e);
        }
        eprintln!("Results saved to {}", path.display());
    }

    ExitCode::SUCCESS
}

fn execute(
    config: &SimulationConfig,
    data_dir: &Path,
    agent: &dyn AgentPort,
) -> Result<RunResult, PapertraderError> {
    let port = CsvMarketData::new(data_dir.to_path_buf());

    eprintln!("Loading data for {} tickers...", config.tickers.len());
    let window = SimulationWindow::new(config.start_date, config.end_date)?;
    let market = load_market_data(&port, &config.tickers, window)?;
    eprintln!("Loaded {} of {} tickers", market.assets().len(), config.tickers.len());

    let agent = if config.strategy == StrategyKind::Agent {
        Some(agent)
    } else {
        None
    };
    run_simulation(config, &market, agent)
}

fn run_compare(
    config_path: &Path,
    output_path: Option<&Path>,
    include_agent: bool,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let base_config = match build_simulation_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    let data_dir = data_path(&adapter);
    let agent = build_agent(&adapter);

    let mut strategies = vec![StrategyKind::BuyAndHold, StrategyKind::EqualWeight];
    if include_agent {
        strategies.push(StrategyKind::Agent);
    }

    // Each strategy runs with its own fresh ledger; one failure is reported
    // and skipped without halting the sweep.
    let mut results = Vec::new();
    for strategy in strategies {
        eprintln!("Running {}...", strategy.name());
        let config = SimulationConfig {
            strategy,
            ..base_config.clone()
        };
        match execute(&config, &data_dir, &agent) {
            Ok(result) => {
                if let Err(e) = ConsoleReportAdapter.write(&result, Path::new("")) {
                    return fail(&e);
                }
                results.push(result);
            }
            Err(e) => eprintln!("error: {} failed: {e}", strategy.name()),
        }
    }

    if results.is_empty() {
        eprintln!("error: every strategy failed");
        return ExitCode::from(4);
    }

    if let Some(path) = output_path {
        if let Err(e) = JsonReportAdapter.write_comparison(&results, path) {
            return fail(&e);
        }
        eprintln!("Comparison saved to {}", path.display());
    }

    ExitCode::SUCCESS
}

fn run_list_tickers(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let port = CsvMarketData::new(data_path(&adapter));
    match port.list_tickers() {
        Ok(tickers) => {
            for ticker in tickers {
                println!("{ticker}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}
