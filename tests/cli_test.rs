//! CLI integration tests: config building, overrides and end-to-end runs
//! over CSV fixtures on disk.

mod common;

use chrono::NaiveDate;
use common::date;
use papertrader::adapters::file_config_adapter::FileConfigAdapter;
use papertrader::cli::{self, Cli, Command};
use papertrader::domain::error::PapertraderError;
use papertrader::domain::strategy::{RebalanceFrequency, StrategyKind};
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use tempfile::TempDir;

const VALID_INI: &str = r#"
[simulation]
start_date = 2024-01-01
end_date = 2024-01-30
initial_capital = 10000.0
tickers = SPY,QQQ
rebalance = daily
strategy = equal_weight
benchmark = SPY

[data]
path = {data_path}

[agent]
oversold = 30
overbought = 70
trade_pct = 15.0
"#;

fn assert_success(code: ExitCode) {
    assert_eq!(format!("{code:?}"), format!("{:?}", ExitCode::SUCCESS));
}

fn write_csv(dir: &Path, ticker: &str, start: NaiveDate, closes: &[f64]) {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for (i, close) in closes.iter().enumerate() {
        let d = start + chrono::Duration::days(i as i64);
        content.push_str(&format!(
            "{d},{close},{high},{low},{close},1000\n",
            high = close + 1.0,
            low = close - 1.0,
        ));
    }
    fs::write(dir.join(format!("{ticker}.csv")), content).unwrap();
}

/// Data dir + config file for a 30-day two-ticker universe.
fn setup_workspace() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().join("data");
    fs::create_dir(&data_dir).unwrap();

    let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 * 0.5).collect();
    write_csv(&data_dir, "SPY", date(2024, 1, 1), &closes);
    let closes: Vec<f64> = (0..30).map(|i| 50.0 + i as f64 * 0.2).collect();
    write_csv(&data_dir, "QQQ", date(2024, 1, 1), &closes);

    let config_path = dir.path().join("papertrader.ini");
    let ini = VALID_INI.replace("{data_path}", &data_dir.display().to_string());
    fs::write(&config_path, ini).unwrap();

    (dir, config_path)
}

mod config_building {
    use super::*;

    #[test]
    fn build_simulation_config_full() {
        let (_dir, config_path) = setup_workspace();
        let adapter = FileConfigAdapter::from_file(&config_path).unwrap();
        let config = cli::build_simulation_config(&adapter).unwrap();

        assert_eq!(config.start_date, date(2024, 1, 1));
        assert_eq!(config.end_date, date(2024, 1, 30));
        assert!((config.initial_capital - 10_000.0).abs() < f64::EPSILON);
        assert_eq!(config.tickers, vec!["SPY", "QQQ"]);
        assert_eq!(config.rebalance, RebalanceFrequency::Daily);
        assert_eq!(config.strategy, StrategyKind::EqualWeight);
        assert_eq!(config.benchmark.as_deref(), Some("SPY"));
    }

    #[test]
    fn build_simulation_config_defaults() {
        let ini = "[simulation]\nstart_date = 2024-01-01\nend_date = 2024-06-30\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let config = cli::build_simulation_config(&adapter).unwrap();

        assert!((config.initial_capital - 10_000.0).abs() < f64::EPSILON);
        assert_eq!(config.tickers, vec!["SPY", "QQQ", "GLD"]);
        assert_eq!(config.rebalance, RebalanceFrequency::Daily);
        assert_eq!(config.strategy, StrategyKind::BuyAndHold);
        assert_eq!(config.benchmark.as_deref(), Some("SPY"));
    }

    #[test]
    fn missing_start_date_is_config_missing() {
        let adapter =
            FileConfigAdapter::from_string("[simulation]\nend_date = 2024-06-30\n").unwrap();
        let err = cli::build_simulation_config(&adapter).unwrap_err();
        assert!(matches!(
            err,
            PapertraderError::ConfigMissing { key, .. } if key == "start_date"
        ));
    }

    #[test]
    fn invalid_date_format_is_config_invalid() {
        let adapter = FileConfigAdapter::from_string(
            "[simulation]\nstart_date = 01/02/2024\nend_date = 2024-06-30\n",
        )
        .unwrap();
        let err = cli::build_simulation_config(&adapter).unwrap_err();
        assert!(matches!(
            err,
            PapertraderError::ConfigInvalid { key, .. } if key == "start_date"
        ));
    }

    #[test]
    fn non_positive_capital_rejected() {
        let adapter = FileConfigAdapter::from_string(
            "[simulation]\nstart_date = 2024-01-01\nend_date = 2024-06-30\ninitial_capital = 0\n",
        )
        .unwrap();
        let err = cli::build_simulation_config(&adapter).unwrap_err();
        assert!(matches!(
            err,
            PapertraderError::ConfigInvalid { key, .. } if key == "initial_capital"
        ));
    }

    #[test]
    fn unknown_strategy_rejected() {
        let adapter = FileConfigAdapter::from_string(
            "[simulation]\nstart_date = 2024-01-01\nend_date = 2024-06-30\nstrategy = martingale\n",
        )
        .unwrap();
        let err = cli::build_simulation_config(&adapter).unwrap_err();
        assert!(matches!(
            err,
            PapertraderError::ConfigInvalid { key, .. } if key == "strategy"
        ));
    }

    #[test]
    fn unknown_rebalance_rejected() {
        let adapter = FileConfigAdapter::from_string(
            "[simulation]\nstart_date = 2024-01-01\nend_date = 2024-06-30\nrebalance = monthly\n",
        )
        .unwrap();
        let err = cli::build_simulation_config(&adapter).unwrap_err();
        assert!(matches!(
            err,
            PapertraderError::ConfigInvalid { key, .. } if key == "rebalance"
        ));
    }

    #[test]
    fn benchmark_none_disables_comparison() {
        let adapter = FileConfigAdapter::from_string(
            "[simulation]\nstart_date = 2024-01-01\nend_date = 2024-06-30\nbenchmark = none\n",
        )
        .unwrap();
        let config = cli::build_simulation_config(&adapter).unwrap();
        assert_eq!(config.benchmark, None);
    }
}

mod ticker_parsing {
    use super::*;

    #[test]
    fn parse_tickers_basic() {
        assert_eq!(
            cli::parse_tickers("SPY,QQQ,GLD").unwrap(),
            vec!["SPY", "QQQ", "GLD"]
        );
    }

    #[test]
    fn parse_tickers_trims_and_uppercases() {
        assert_eq!(
            cli::parse_tickers(" spy , qqq ").unwrap(),
            vec!["SPY", "QQQ"]
        );
    }

    #[test]
    fn parse_tickers_rejects_empty_token() {
        let err = cli::parse_tickers("SPY,,QQQ").unwrap_err();
        assert!(matches!(err, PapertraderError::ConfigInvalid { .. }));
    }

    #[test]
    fn parse_tickers_rejects_duplicates() {
        let err = cli::parse_tickers("SPY,spy").unwrap_err();
        assert!(matches!(err, PapertraderError::ConfigInvalid { .. }));
    }
}

mod end_to_end {
    use super::*;

    #[test]
    fn dry_run_validates_without_data() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("papertrader.ini");
        // Points at a data directory that does not exist; dry-run must not
        // touch it.
        let ini = VALID_INI.replace("{data_path}", "/nonexistent/data");
        fs::write(&config_path, ini).unwrap();

        let code = cli::run(Cli {
            command: Command::Run {
                config: config_path,
                strategy: None,
                tickers: None,
                output: None,
                dry_run: true,
            },
        });
        assert_success(code);
    }

    #[test]
    fn run_writes_json_result() {
        let (dir, config_path) = setup_workspace();
        let output = dir.path().join("results").join("run.json");

        let code = cli::run(Cli {
            command: Command::Run {
                config: config_path,
                strategy: None,
                tickers: None,
                output: Some(output.clone()),
                dry_run: false,
            },
        });
        assert_success(code);

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(value["strategy"], "equal_weight");
        assert_eq!(value["daily_results"].as_array().unwrap().len(), 30);
        assert_eq!(value["initial_capital"], 10000.0);
        // Benchmark aligns with the calendar here, so beta is populated.
        assert!(value["metrics"]["beta"].as_f64().unwrap() != 0.0);
    }

    #[test]
    fn run_with_strategy_override() {
        let (dir, config_path) = setup_workspace();
        let output = dir.path().join("run.json");

        let code = cli::run(Cli {
            command: Command::Run {
                config: config_path,
                strategy: Some("buy_and_hold".into()),
                tickers: None,
                output: Some(output.clone()),
                dry_run: false,
            },
        });
        assert_success(code);

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(value["strategy"], "buy_and_hold");
    }

    #[test]
    fn compare_writes_strategy_keyed_document() {
        let (dir, config_path) = setup_workspace();
        let output = dir.path().join("comparison.json");

        let code = cli::run(Cli {
            command: Command::Compare {
                config: config_path,
                output: Some(output.clone()),
                include_agent: true,
            },
        });
        assert_success(code);

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert!(value.get("buy_and_hold").is_some());
        assert!(value.get("equal_weight").is_some());
        assert!(value.get("agent").is_some());
        assert_eq!(
            value["buy_and_hold"]["daily_results"].as_array().unwrap().len(),
            30
        );
    }

    #[test]
    fn run_against_missing_data_directory_fails() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("papertrader.ini");
        let ini = VALID_INI.replace("{data_path}", "/nonexistent/data");
        fs::write(&config_path, ini).unwrap();
        let output = dir.path().join("run.json");

        let code = cli::run(Cli {
            command: Command::Run {
                config: config_path,
                strategy: None,
                tickers: None,
                output: Some(output.clone()),
                dry_run: false,
            },
        });
        // The universe comes up empty, the run fails, nothing is written.
        assert_eq!(format!("{code:?}"), format!("{:?}", ExitCode::from(4)));
        assert!(!output.exists());
    }
}
