//! @ai:module:intent JSON export of question reports
//! @ai:module:layer infrastructure
//! @ai:module:public_api JsonReporter
//! @ai:module:stateless true

use crate::usage::QuestionReport;
use anyhow::Result;
use std::path::Path;

/// @ai:intent Trait for JSON report generation
pub trait JsonReporterTrait: Send + Sync {
    /// @ai:intent Generate JSON report from question reports
    fn generate(&self, reports: &[QuestionReport], output_path: &Path) -> Result<()>;
}

/// @ai:intent Writes question reports as a pretty-printed JSON array
pub struct JsonReporter;

impl JsonReporter {
    /// @ai:intent Create a new JSON reporter
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonReporterTrait for JsonReporter {
    /// @ai:intent Generate JSON report to file
    /// @ai:effects fs:write
    fn generate(&self, reports: &[QuestionReport], output_path: &Path) -> Result<()> {
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(reports)?;
        std::fs::write(output_path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::{ClassificationStats, UsageReport};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_generate_json_report() {
        let reporter = JsonReporter::new();
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out").join("usage.json");

        let mut usage = UsageReport::new();
        usage.add("b-linux", 120.5);

        let reports = vec![QuestionReport {
            label: "release promote".to_string(),
            section: None,
            group_id: "N5fSRkSZQsOteqDPo8tOJA".to_string(),
            usage,
            stats: ClassificationStats {
                excluded: 3,
                included: 1,
                unknown: 0,
                incomplete: 0,
            },
        }];

        reporter.generate(&reports, &output).unwrap();

        let content = std::fs::read_to_string(&output).unwrap();
        assert!(content.contains("\"b-linux\": 120.5"));
        assert!(!content.contains("section"));

        let parsed: Vec<QuestionReport> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, reports);
    }
}
