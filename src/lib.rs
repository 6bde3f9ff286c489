//! @ai:module:intent Attribute CI task-group compute time to worker classes
//! @ai:module:layer application
//! @ai:module:public_api config, error, graph, usage, analysis, report

pub mod analysis;
pub mod config;
pub mod error;
pub mod graph;
pub mod report;
pub mod usage;

pub use analysis::UsageAnalyzer;
pub use config::UsageConfig;
pub use error::{Error, Result};
pub use graph::{GraphCache, GraphSource, QueueClient, TaskRecord};
pub use report::ReportGenerator;
pub use usage::{ClassificationConfig, QuestionReport, UsageAggregator, UsageReport};
