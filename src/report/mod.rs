//! @ai:module:intent Rendering of usage reports to console, JSON and charts
//! @ai:module:layer infrastructure
//! @ai:module:public_api ReportGenerator, TextReporter, JsonReporter, ChartGenerator

pub mod charts;
pub mod json_report;
pub mod text_report;

pub use charts::{ChartGenerator, ChartGeneratorTrait};
pub use json_report::{JsonReporter, JsonReporterTrait};
pub use text_report::{TextReporter, TextReporterTrait};

use crate::usage::QuestionReport;
use anyhow::Result;
use std::path::Path;

/// @ai:intent Combined report generator
pub struct ReportGenerator {
    text: TextReporter,
    json: JsonReporter,
    charts: ChartGenerator,
}

impl ReportGenerator {
    /// @ai:intent Create a new report generator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self {
            text: TextReporter::new(),
            json: JsonReporter::new(),
            charts: ChartGenerator::new(),
        }
    }

    /// @ai:intent Print the console report to stdout
    /// @ai:effects io
    pub fn print(&self, reports: &[QuestionReport]) {
        print!("{}", self.text.render(reports));
    }

    /// @ai:intent Write the structured export
    /// @ai:effects fs:write
    pub fn write_json(&self, reports: &[QuestionReport], output_path: &Path) -> Result<()> {
        self.json.generate(reports, output_path)?;
        tracing::info!("JSON report written to {}", output_path.display());
        Ok(())
    }

    /// @ai:intent Write per-question and totals charts
    /// @ai:effects fs:write
    pub fn write_charts(&self, reports: &[QuestionReport], output_dir: &Path) -> Result<()> {
        let files = self.charts.generate_all(reports, output_dir)?;
        tracing::info!("{} charts written to {}", files.len(), output_dir.display());
        Ok(())
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}
