//! JSON persistence adapter for run results.

use std::collections::BTreeMap;
use std::fs;
use std::fs::File;
use std::path::Path;

use crate::domain::error::PapertraderError;
use crate::domain::simulation::RunResult;
use crate::ports::report_port::ReportPort;

pub struct JsonReportAdapter;

fn create_with_parents(path: &Path) -> Result<File, PapertraderError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(File::create(path)?)
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, result: &RunResult, output_path: &Path) -> Result<(), PapertraderError> {
        let file = create_with_parents(output_path)?;
        serde_json::to_writer_pretty(file, result)?;
        Ok(())
    }

    /// One document keyed by strategy name, mirroring the shape produced by
    /// a comparison sweep.
    fn write_comparison(
        &self,
        results: &[RunResult],
        output_path: &Path,
    ) -> Result<(), PapertraderError> {
        let by_strategy: BTreeMap<&str, &RunResult> = results
            .iter()
            .map(|r| (r.strategy.as_str(), r))
            .collect();
        let file = create_with_parents(output_path)?;
        serde_json::to_writer_pretty(file, &by_strategy)?;
        Ok(())
    }
}
