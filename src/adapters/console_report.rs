//! Human-readable console report adapter.

use std::path::Path;

use crate::domain::error::PapertraderError;
use crate::domain::simulation::RunResult;
use crate::ports::report_port::ReportPort;

pub struct ConsoleReportAdapter;

/// Format one run as the multi-section text block printed after a backtest.
pub fn format_report(result: &RunResult) -> String {
    let m = &result.metrics;
    let rule = "=".repeat(70);
    let mut out = String::new();

    out.push_str(&format!("{rule}\n"));
    out.push_str(&format!(
        "BACKTEST RESULTS: {}\n",
        result.strategy.to_uppercase()
    ));
    out.push_str(&format!("{rule}\n"));
    out.push_str(&format!(
        "Period: {} to {}\n",
        result.start_date, result.end_date
    ));
    out.push_str(&format!("Initial Capital: ${:>12.2}\n", result.initial_capital));
    out.push_str(&format!("Final Value:     ${:>12.2}\n", result.final_value));

    out.push_str("\nRETURNS:\n");
    out.push_str(&format!(
        "  Total Return:        {:>8.2}%\n",
        m.total_return * 100.0
    ));
    out.push_str(&format!(
        "  Annualized Return:   {:>8.2}%\n",
        m.annualized_return * 100.0
    ));

    out.push_str("\nRISK METRICS:\n");
    out.push_str(&format!("  Volatility:          {:>8.2}%\n", m.volatility * 100.0));
    out.push_str(&format!(
        "  Max Drawdown:        {:>8.2}%\n",
        m.max_drawdown * 100.0
    ));
    out.push_str(&format!("  Sharpe Ratio:        {:>8.2}\n", m.sharpe_ratio));
    out.push_str(&format!("  Sortino Ratio:       {:>8.2}\n", m.sortino_ratio));
    out.push_str(&format!("  Calmar Ratio:        {:>8.2}\n", m.calmar_ratio));
    out.push_str(&format!("  Omega Ratio:         {:>8.2}\n", m.omega_ratio));

    out.push_str("\nTRADE STATISTICS:\n");
    out.push_str(&format!("  Number of Trades:    {:>8}\n", m.num_trades));
    out.push_str(&format!("  Win Rate:            {:>8.2}%\n", m.win_rate * 100.0));
    out.push_str(&format!("  Profit Factor:       {:>8.2}\n", m.profit_factor));

    out.push_str("\nBENCHMARK RELATIVE:\n");
    out.push_str(&format!("  Beta:                {:>8.3}\n", m.beta));
    out.push_str(&format!("  Alpha:               {:>8.2}%\n", m.alpha * 100.0));
    out.push_str(&format!("{rule}\n"));

    out
}

impl ReportPort for ConsoleReportAdapter {
    fn write(&self, result: &RunResult, _output_path: &Path) -> Result<(), PapertraderError> {
        println!("{}", format_report(result));
        Ok(())
    }
}
