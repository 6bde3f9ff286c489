//! @ai:module:intent Bar charts of per-worker and per-question usage
//! @ai:module:layer infrastructure
//! @ai:module:public_api ChartGenerator
//! @ai:module:stateless true

use crate::usage::QuestionReport;
use anyhow::Result;
use plotters::prelude::*;
use std::collections::HashSet;
use std::path::Path;

const TOTALS_FILE: &str = "totals.png";

/// @ai:intent Trait for chart generation
pub trait ChartGeneratorTrait: Send + Sync {
    /// @ai:intent Generate all charts from question reports
    fn generate_all(&self, reports: &[QuestionReport], output_dir: &Path) -> Result<Vec<String>>;
}

/// @ai:intent Generates PNG bar charts from question reports
pub struct ChartGenerator;

impl ChartGenerator {
    /// @ai:intent Create a new chart generator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Draw one bar per labelled value
    /// @ai:pre bars is non-empty
    /// @ai:effects fs:write
    fn draw_bars(
        &self,
        caption: &str,
        y_desc: &str,
        bars: &[(String, f64)],
        output_path: &Path,
    ) -> Result<()> {
        let root = BitMapBackend::new(output_path, (900, 500)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(caption, ("sans-serif", 25))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(70)
            .build_cartesian_2d(0..bars.len() as i32, 0f64..axis_max(bars))?;

        chart
            .configure_mesh()
            .x_labels(bars.len())
            .y_desc(y_desc)
            .x_label_formatter(&|x| {
                bars.get(*x as usize)
                    .map(|(name, _)| name.clone())
                    .unwrap_or_default()
            })
            .draw()?;

        chart.draw_series(bars.iter().enumerate().map(|(i, (_, value))| {
            Rectangle::new(
                [(i as i32, 0.0), (i as i32 + 1, *value)],
                BLUE.mix(0.7).filled(),
            )
        }))?;

        root.present()?;
        Ok(())
    }
}

impl Default for ChartGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartGeneratorTrait for ChartGenerator {
    /// @ai:intent One chart per non-empty question plus a totals comparison
    /// @ai:effects fs:write
    fn generate_all(&self, reports: &[QuestionReport], output_dir: &Path) -> Result<Vec<String>> {
        std::fs::create_dir_all(output_dir)?;

        let mut generated = Vec::new();

        for (report, file_name) in planned_charts(reports) {
            let bars = worker_bars(report);
            self.draw_bars(
                &report.label,
                "Seconds",
                &bars,
                &output_dir.join(&file_name),
            )?;
            generated.push(file_name);
        }

        let totals = question_totals(reports);
        if !totals.is_empty() {
            self.draw_bars(
                "Total usage by question",
                "Seconds",
                &totals,
                &output_dir.join(TOTALS_FILE),
            )?;
            generated.push(TOTALS_FILE.to_string());
        }

        Ok(generated)
    }
}

/// @ai:intent Pair each question that has usage with a file name no other chart uses
/// @ai:effects pure
fn planned_charts(reports: &[QuestionReport]) -> Vec<(&QuestionReport, String)> {
    let mut taken = HashSet::from([TOTALS_FILE.to_string()]);
    let mut planned = Vec::new();

    for report in reports {
        if report.usage.is_empty() {
            tracing::debug!("No usage for {}, skipping chart", report.label);
            continue;
        }

        let file_name = claim_file_name(&report.label, &mut taken);
        planned.push((report, file_name));
    }

    planned
}

/// @ai:intent Slugged name for a label, suffixed -2, -3, ... until unused
/// @ai:effects pure
fn claim_file_name(label: &str, taken: &mut HashSet<String>) -> String {
    let base = chart_file_name(label);
    let stem = base.trim_end_matches(".png").to_string();

    let mut candidate = base;
    let mut suffix = 2;
    while !taken.insert(candidate.clone()) {
        candidate = format!("{}-{}.png", stem, suffix);
        suffix += 1;
    }

    candidate
}

/// @ai:intent Worker totals of one question as chart bars
/// @ai:effects pure
fn worker_bars(report: &QuestionReport) -> Vec<(String, f64)> {
    report
        .usage
        .iter()
        .map(|(worker, seconds)| (worker.to_string(), seconds))
        .collect()
}

/// @ai:intent Total seconds per question, in question order
/// @ai:effects pure
fn question_totals(reports: &[QuestionReport]) -> Vec<(String, f64)> {
    reports
        .iter()
        .map(|r| (r.label.clone(), r.usage.total()))
        .collect()
}

/// @ai:intent Upper bound of the value axis with headroom; never zero
/// @ai:effects pure
fn axis_max(bars: &[(String, f64)]) -> f64 {
    let max = bars.iter().map(|(_, v)| *v).fold(0.0, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

/// @ai:intent Filesystem-safe PNG name derived from a question label
/// @ai:effects pure
fn chart_file_name(label: &str) -> String {
    let slug: String = label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();

    let slug = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    format!("{}.png", if slug.is_empty() { "question" } else { &slug })
}
