//! @ai:module:intent Answer configured questions: validate, resolve groups, aggregate
//! @ai:module:layer application
//! @ai:module:public_api UsageAnalyzer
//! @ai:module:stateless false

use crate::config::QuestionConfig;
use crate::error::Result;
use crate::graph::{GraphSource, TaskGroupClientTrait};
use crate::usage::{QuestionReport, UsageAggregator};

/// @ai:intent Runs questions sequentially against one graph source
pub struct UsageAnalyzer<C: TaskGroupClientTrait> {
    source: GraphSource<C>,
    aggregator: UsageAggregator,
}

impl<C: TaskGroupClientTrait> UsageAnalyzer<C> {
    /// @ai:intent Create a new analyzer over a graph source
    /// @ai:effects pure
    pub fn new(source: GraphSource<C>) -> Self {
        Self {
            source,
            aggregator: UsageAggregator::new(),
        }
    }

    pub fn source(&self) -> &GraphSource<C> {
        &self.source
    }

    /// @ai:intent Answer every question in order
    /// @ai:pre every question has include or exclude patterns; checked before any fetch
    /// @ai:effects fs:read, fs:write, network
    pub async fn answer_all(&self, questions: &[QuestionConfig]) -> Result<Vec<QuestionReport>> {
        let classifications = questions
            .iter()
            .map(|q| {
                q.classification().inspect_err(|e| {
                    tracing::error!("Question {:?} is invalid: {}", q.label, e);
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut reports = Vec::with_capacity(questions.len());

        for (question, classification) in questions.iter().zip(&classifications) {
            tracing::info!("Finding usage for {}", question.label);

            let tasks = self.source.resolve(&question.group_id, &question.label).await?;
            let (usage, stats) = self.aggregator.aggregate_with_stats(&tasks, classification);

            tracing::info!(
                "{}: {} counted, {} excluded, {} unknown, {} incomplete",
                question.label,
                stats.included,
                stats.excluded,
                stats.unknown,
                stats.incomplete
            );

            reports.push(QuestionReport {
                label: question.label.clone(),
                section: question.section.clone(),
                group_id: question.group_id.clone(),
                usage,
                stats,
            });
        }

        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::graph::{GraphCache, MockTaskGroupClient};
    use crate::usage::MultiplierRule;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn entry(task_id: &str, label: &str, worker: &str, state: &str, seconds: u32) -> Value {
        json!({
            "status": {
                "taskId": task_id,
                "workerType": worker,
                "runs": [{
                    "runId": 0,
                    "state": state,
                    "started": "2018-07-02T10:00:00Z",
                    "resolved": format!("2018-07-02T10:{:02}:{:02}Z", seconds / 60, seconds % 60)
                }]
            },
            "task": { "metadata": { "name": label } }
        })
    }

    fn question(
        label: &str,
        include: Option<&[&str]>,
        exclude: Option<&[&str]>,
    ) -> QuestionConfig {
        let to_vec = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        QuestionConfig {
            label: label.to_string(),
            section: None,
            group_id: "SC__1kWXR4esb499TFHyPQ".to_string(),
            include: include.map(to_vec),
            exclude: exclude.map(to_vec),
            multipliers: vec![],
        }
    }

    fn analyzer(temp: &TempDir, pages: Vec<Vec<Value>>) -> UsageAnalyzer<MockTaskGroupClient> {
        let cache = GraphCache::open(temp.path()).unwrap();
        UsageAnalyzer::new(GraphSource::new(MockTaskGroupClient::new(pages), cache))
    }

    #[tokio::test]
    async fn test_questions_share_one_fetch() {
        let temp = TempDir::new().unwrap();
        let analyzer = analyzer(
            &temp,
            vec![
                vec![
                    entry("a", "test-linux64-devedition/opt-xpcshell", "t-linux", "completed", 100),
                    entry("b", "build-linux64-devedition-opt", "b-linux", "completed", 50),
                ],
                vec![entry("c", "test-win64-devedition/opt", "t-win", "failed", 70)],
            ],
        );

        let mut repack = question("repack", None, Some(&["^test.*"]));
        repack.multipliers = vec![MultiplierRule::new("build-linux64", 3.0)];

        let questions = vec![
            question("on-push compile", Some(&[".*-devedition-.*"]), Some(&["^test.*"])),
            question("on-push all deved tests", Some(&["^test-.*devedition"]), None),
            repack,
        ];

        let reports = analyzer.answer_all(&questions).await.unwrap();

        assert_eq!(analyzer.source().client().calls(), 2);
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].usage.get("b-linux"), 50.0);
        assert_eq!(reports[0].usage.len(), 1);
        assert_eq!(reports[1].usage.get("t-linux"), 100.0);
        assert_eq!(reports[1].stats.incomplete, 1);
        assert_eq!(reports[2].usage.get("b-linux"), 150.0);
    }

    #[tokio::test]
    async fn test_invalid_question_fails_before_any_fetch() {
        let temp = TempDir::new().unwrap();
        let analyzer = analyzer(&temp, vec![vec![entry("a", "x", "w", "completed", 1)]]);

        let questions = vec![
            question("fine", Some(&["x"]), None),
            question("meaningless", None, None),
        ];

        let err = analyzer.answer_all(&questions).await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert_eq!(analyzer.source().client().calls(), 0);
    }

    #[tokio::test]
    async fn test_rerun_from_cache_gives_identical_reports() {
        let temp = TempDir::new().unwrap();
        let pages = vec![vec![
            entry("a", "release-eme-free-repack-macosx64-nightly-de", "b-osx", "completed", 20),
            entry("b", "release-eme-free-repack-linux-de", "b-linux", "completed", 20),
        ]];
        let mut eme = question("release EME-free repack", Some(&["^release-eme-free-.*"]), None);
        eme.multipliers = vec![MultiplierRule::new(
            "release-eme-free-repack-macosx64-nightly",
            3.0,
        )];
        let questions = vec![eme];

        let first = analyzer(&temp, pages.clone()).answer_all(&questions).await.unwrap();

        let offline = analyzer(&temp, vec![]);
        let second = offline.answer_all(&questions).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(offline.source().client().calls(), 0);
        assert_eq!(second[0].usage.get("b-osx"), 60.0);
        assert_eq!(second[0].usage.get("b-linux"), 20.0);
    }
}
