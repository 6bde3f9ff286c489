//! @ai:module:intent Classify tasks and sum weighted elapsed time per worker-class
//! @ai:module:layer application
//! @ai:module:public_api UsageAggregator, UsageAggregatorTrait
//! @ai:module:stateless true

use crate::graph::{RunState, TaskRecord};
use crate::usage::classify::{Classification, ClassificationConfig};
use crate::usage::types::{ClassificationStats, UsageReport};

/// @ai:intent Trait for usage aggregation
pub trait UsageAggregatorTrait: Send + Sync {
    /// @ai:intent Aggregate task durations into per-worker totals
    fn aggregate(&self, tasks: &[TaskRecord], config: &ClassificationConfig) -> UsageReport;
}

/// @ai:intent Sums weighted durations of counted, completed tasks per worker-class
pub struct UsageAggregator;

impl UsageAggregator {
    /// @ai:intent Create a new usage aggregator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Aggregate and also report how many tasks landed in each bucket
    /// @ai:effects pure, log
    pub fn aggregate_with_stats(
        &self,
        tasks: &[TaskRecord],
        config: &ClassificationConfig,
    ) -> (UsageReport, ClassificationStats) {
        let mut report = UsageReport::new();
        let mut stats = ClassificationStats::default();

        for task in tasks {
            let label = task.label();
            let worker = task.worker_type();

            match config.classify(label) {
                Classification::Excluded => {
                    tracing::debug!("EXCLUDE {} {} {}", task.task_id(), label, worker);
                    stats.excluded += 1;
                }
                Classification::Unknown => {
                    tracing::debug!("UNKNOWN {} {} {}", task.task_id(), label, worker);
                    stats.unknown += 1;
                }
                Classification::Included => match completed_seconds(task) {
                    Some(elapsed) => {
                        let multiplier = config.multiplier(label);
                        report.add(worker, elapsed * multiplier);
                        stats.included += 1;
                        tracing::debug!(
                            "INCLUDE {} {} {} m={} t={}",
                            task.task_id(),
                            label,
                            worker,
                            multiplier,
                            elapsed
                        );
                    }
                    None => stats.incomplete += 1,
                },
            }
        }

        (report, stats)
    }
}

impl Default for UsageAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageAggregatorTrait for UsageAggregator {
    /// @ai:intent Aggregate task durations into per-worker totals
    /// @ai:effects pure, log
    fn aggregate(&self, tasks: &[TaskRecord], config: &ClassificationConfig) -> UsageReport {
        self.aggregate_with_stats(tasks, config).0
    }
}

/// @ai:intent Elapsed seconds of the last run, if it completed with both timestamps
/// @ai:effects log
fn completed_seconds(task: &TaskRecord) -> Option<f64> {
    let Some(run) = task.last_run() else {
        tracing::warn!("{} has no runs, ignoring", task.label());
        return None;
    };

    if run.state != RunState::Completed {
        tracing::warn!(
            "{} is in state {} instead of completed, ignoring",
            task.label(),
            run.state
        );
        return None;
    }

    let elapsed = run.elapsed_seconds();
    if elapsed.is_none() {
        tracing::warn!("{} completed without start/resolve times, ignoring", task.label());
    }
    elapsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TaskRun;
    use crate::usage::classify::MultiplierRule;
    use chrono::{DateTime, Duration, Utc};
    use pretty_assertions::assert_eq;

    fn base_time() -> DateTime<Utc> {
        "2018-07-02T10:00:00Z".parse().unwrap()
    }

    fn run(state: RunState, seconds: f64) -> TaskRun {
        let started = base_time();
        TaskRun {
            run_id: 0,
            state,
            started: Some(started),
            resolved: Some(started + Duration::milliseconds((seconds * 1000.0) as i64)),
        }
    }

    fn task(label: &str, worker: &str, state: RunState, seconds: f64) -> TaskRecord {
        TaskRecord::new(format!("id-{label}"), label, worker, vec![run(state, seconds)])
    }

    fn strings(items: &[&str]) -> Option<Vec<String>> {
        Some(items.iter().map(|s| s.to_string()).collect())
    }

    fn report_of(entries: &[(&str, f64)]) -> UsageReport {
        let mut report = UsageReport::new();
        for (worker, seconds) in entries {
            report.add(worker, *seconds);
        }
        report
    }

    #[test]
    fn test_first_matching_multiplier_prefix_applies() {
        let config = ClassificationConfig::new(
            strings(&[".*"]),
            None,
            vec![MultiplierRule::new("a", 2.0), MultiplierRule::new("ab", 5.0)],
        )
        .unwrap();
        let tasks = vec![task("abcdef", "w", RunState::Completed, 10.0)];

        let report = UsageAggregator::new().aggregate(&tasks, &config);
        assert_eq!(report.get("w"), 20.0);
    }

    #[test]
    fn test_exclude_beats_include_for_same_label() {
        let config =
            ClassificationConfig::new(strings(&["build"]), strings(&["build-foo"]), vec![])
                .unwrap();
        let tasks = vec![task("build-foo-devedition", "w1", RunState::Completed, 30.0)];

        let (report, stats) = UsageAggregator::new().aggregate_with_stats(&tasks, &config);
        assert!(report.is_empty());
        assert_eq!(stats.excluded, 1);
    }

    #[test]
    fn test_exclude_only_counts_unmatched_with_unit_multiplier() {
        let config = ClassificationConfig::new(None, strings(&["^test.*"]), vec![]).unwrap();
        let tasks = vec![
            task("build-linux", "b-linux", RunState::Completed, 42.0),
            task("test-linux", "t-linux", RunState::Completed, 99.0),
        ];

        let report = UsageAggregator::new().aggregate(&tasks, &config);
        assert_eq!(report, report_of(&[("b-linux", 42.0)]));
    }

    #[test]
    fn test_failed_last_run_contributes_nothing() {
        let config = ClassificationConfig::new(strings(&["build"]), None, vec![]).unwrap();
        let tasks = vec![
            task("build-a", "w", RunState::Failed, 500.0),
            task("build-b", "w", RunState::Completed, 5.0),
        ];

        let (report, stats) = UsageAggregator::new().aggregate_with_stats(&tasks, &config);
        assert_eq!(report.get("w"), 5.0);
        assert_eq!(stats.incomplete, 1);
        assert_eq!(stats.included, 1);
    }

    #[test]
    fn test_only_last_run_is_timed() {
        let config = ClassificationConfig::new(strings(&["build"]), None, vec![]).unwrap();
        let retried = TaskRecord::new(
            "retried",
            "build-a",
            "w",
            vec![run(RunState::Exception, 1000.0), run(RunState::Completed, 7.5)],
        );
        let failed_retry = TaskRecord::new(
            "failed-retry",
            "build-b",
            "w",
            vec![run(RunState::Completed, 1000.0), run(RunState::Failed, 3.0)],
        );

        let report = UsageAggregator::new().aggregate(&[retried, failed_retry], &config);
        assert_eq!(report.get("w"), 7.5);
    }

    #[test]
    fn test_tasks_without_usable_runs_are_skipped() {
        let config = ClassificationConfig::new(None, strings(&["nothing"]), vec![]).unwrap();
        let no_runs = TaskRecord::new("a", "build-a", "w", vec![]);
        let no_times = TaskRecord::new(
            "b",
            "build-b",
            "w",
            vec![TaskRun {
                run_id: 0,
                state: RunState::Completed,
                started: None,
                resolved: None,
            }],
        );

        let (report, stats) =
            UsageAggregator::new().aggregate_with_stats(&[no_runs, no_times], &config);
        assert!(report.is_empty());
        assert_eq!(stats.incomplete, 2);
    }

    #[test]
    fn test_fractional_seconds_are_kept() {
        let config = ClassificationConfig::new(strings(&["x"]), None, vec![]).unwrap();
        let tasks = vec![task("x1", "w", RunState::Completed, 1.25)];

        let report = UsageAggregator::new().aggregate(&tasks, &config);
        assert_eq!(report.get("w"), 1.25);
    }

    #[test]
    fn test_devedition_scenario() {
        let config = ClassificationConfig::new(
            strings(&[".*-devedition-.*"]),
            strings(&["^test.*"]),
            vec![],
        )
        .unwrap();
        let aggregator = UsageAggregator::new();

        // The include regex needs a dash after "devedition"
        let with_suffix = vec![
            task("test-foo", "w1", RunState::Completed, 100.0),
            task("build-foo-devedition-opt", "w2", RunState::Completed, 50.0),
        ];
        let (report, stats) = aggregator.aggregate_with_stats(&with_suffix, &config);
        assert_eq!(report, report_of(&[("w2", 50.0)]));
        assert_eq!(stats.excluded, 1);

        let literal = vec![
            task("test-foo", "w1", RunState::Completed, 100.0),
            task("build-foo-devedition", "w2", RunState::Completed, 50.0),
        ];
        let (report, stats) = aggregator.aggregate_with_stats(&literal, &config);
        assert!(report.is_empty());
        assert_eq!(stats.unknown, 1);
    }

    #[test]
    fn test_worker_totals_equal_sum_of_contributions() {
        let config = ClassificationConfig::new(
            None,
            strings(&["skip"]),
            vec![MultiplierRule::new("mac-", 3.0), MultiplierRule::new("win-", 1.5)],
        )
        .unwrap();
        let tasks = vec![
            task("mac-repack", "b-osx", RunState::Completed, 10.0),
            task("win-repack", "b-win", RunState::Completed, 20.0),
            task("linux-repack", "b-linux", RunState::Completed, 30.0),
            task("mac-sign", "b-osx", RunState::Completed, 2.0),
            task("skip-me", "b-linux", RunState::Completed, 1000.0),
            task("linux-broken", "b-linux", RunState::Running, 1000.0),
        ];

        let expected: f64 = 10.0 * 3.0 + 20.0 * 1.5 + 30.0 + 2.0 * 3.0;
        let (report, stats) = UsageAggregator::new().aggregate_with_stats(&tasks, &config);

        assert_eq!(report.total(), expected);
        assert_eq!(report.get("b-osx"), 36.0);
        assert_eq!(stats.total(), tasks.len());
        assert_eq!(
            stats,
            ClassificationStats {
                excluded: 1,
                included: 4,
                unknown: 0,
                incomplete: 1,
            }
        );
    }
}
