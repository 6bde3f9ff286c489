//! @ai:module:intent Usage report types produced by aggregation
//! @ai:module:layer domain
//! @ai:module:public_api UsageReport, ClassificationStats, QuestionReport
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// @ai:intent Accumulated weighted seconds per worker-class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageReport {
    seconds: BTreeMap<String, f64>,
}

impl UsageReport {
    /// @ai:intent Create an empty report
    /// @ai:effects pure
    pub fn new() -> Self {
        Self::default()
    }

    /// @ai:intent Add a contribution to a worker's bucket
    /// @ai:effects state:write
    pub fn add(&mut self, worker: &str, seconds: f64) {
        *self.seconds.entry(worker.to_string()).or_insert(0.0) += seconds;
    }

    /// @ai:intent Seconds for a worker; absent workers read as zero
    /// @ai:effects pure
    pub fn get(&self, worker: &str) -> f64 {
        self.seconds.get(worker).copied().unwrap_or(0.0)
    }

    /// @ai:intent Sum across all workers
    /// @ai:effects pure
    pub fn total(&self) -> f64 {
        self.seconds.values().sum()
    }

    /// @ai:intent Workers and their totals, sorted by worker name
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.seconds.iter().map(|(w, s)| (w.as_str(), *s))
    }

    pub fn len(&self) -> usize {
        self.seconds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seconds.is_empty()
    }
}

/// @ai:intent Per-bucket task counts from one aggregation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationStats {
    pub excluded: usize,
    /// Included and completed; these are the tasks in the report
    pub included: usize,
    pub unknown: usize,
    /// Included but skipped because the last run did not complete
    pub incomplete: usize,
}

impl ClassificationStats {
    pub fn total(&self) -> usize {
        self.excluded + self.included + self.unknown + self.incomplete
    }
}

/// @ai:intent Result of answering one configured question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionReport {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub group_id: String,
    pub usage: UsageReport,
    pub stats: ClassificationStats,
}
