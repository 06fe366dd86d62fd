//! Report generation port trait.

use std::path::Path;

use crate::domain::error::PapertraderError;
use crate::domain::simulation::RunResult;

/// Port for emitting completed-run reports.
pub trait ReportPort {
    fn write(&self, result: &RunResult, output_path: &Path) -> Result<(), PapertraderError>;

    /// Default implementation: emits each run through `write` in turn.
    fn write_comparison(
        &self,
        results: &[RunResult],
        output_path: &Path,
    ) -> Result<(), PapertraderError> {
        for result in results {
            self.write(result, output_path)?;
        }
        Ok(())
    }
}
