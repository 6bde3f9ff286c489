//! @ai:module:intent Fixed-width console rendering of usage reports
//! @ai:module:layer presentation
//! @ai:module:public_api TextReporter
//! @ai:module:stateless true

use crate::usage::{QuestionReport, UsageReport};
use std::fmt::Write as FmtWrite;

/// @ai:intent Trait for console report rendering
pub trait TextReporterTrait: Send + Sync {
    /// @ai:intent Render all question reports as text
    fn render(&self, reports: &[QuestionReport]) -> String;
}

/// @ai:intent Renders worker totals as a fixed-width table per question
pub struct TextReporter;

impl TextReporter {
    /// @ai:intent Create a new text reporter
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Render one question: label line then one row per worker
    /// @ai:effects pure
    pub fn render_usage(label: &str, usage: &UsageReport) -> String {
        let mut output = String::new();

        writeln!(output, "Data for {} (seconds):", label).unwrap();
        for (worker, seconds) in usage.iter() {
            writeln!(output, "{:<30} {:>10.0}", worker, seconds).unwrap();
        }

        output
    }

    /// @ai:intent Section heading underlined with dashes
    /// @ai:effects pure
    fn render_heading(section: &str) -> String {
        let heading = format!("{}:", section);
        format!("{}\n{}\n", heading, "-".repeat(heading.len()))
    }
}

impl Default for TextReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TextReporterTrait for TextReporter {
    /// @ai:intent Render reports, starting a heading whenever the section changes
    /// @ai:effects pure
    fn render(&self, reports: &[QuestionReport]) -> String {
        let mut output = String::from("\n");
        let mut current_section: Option<&str> = None;

        for report in reports {
            let section = report.section.as_deref();

            if section != current_section {
                if let Some(name) = section {
                    output.push_str(&Self::render_heading(name));
                }
                current_section = section;
            }

            output.push_str(&Self::render_usage(&report.label, &report.usage));
            output.push('\n');
        }

        output
    }
}
