//! @ai:module:intent Task classification and per-worker usage aggregation
//! @ai:module:layer application
//! @ai:module:public_api UsageAggregator, ClassificationConfig, UsageReport, QuestionReport

pub mod aggregator;
pub mod classify;
pub mod types;

pub use aggregator::{UsageAggregator, UsageAggregatorTrait};
pub use classify::{
    Classification, ClassificationConfig, MultiplierRule, MultiplierTable, PatternSet,
};
pub use types::{ClassificationStats, QuestionReport, UsageReport};
