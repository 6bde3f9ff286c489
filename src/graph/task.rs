//! @ai:module:intent Task records as listed by the task-queue for a task group
//! @ai:module:layer domain
//! @ai:module:public_api TaskRecord, TaskRun, RunState
//! @ai:module:stateless true

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// @ai:intent State of a single run attempt
/// @ai:effects pure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Unscheduled,
    Pending,
    Running,
    Completed,
    Failed,
    Exception,
    #[serde(other)]
    Unknown,
}

impl RunState {
    /// @ai:intent Convert state to its wire representation
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Unscheduled => "unscheduled",
            RunState::Pending => "pending",
            RunState::Running => "running",
            RunState::Completed => "completed",
            RunState::Failed => "failed",
            RunState::Exception => "exception",
            RunState::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// @ai:intent One execution attempt of a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRun {
    #[serde(default)]
    pub run_id: u32,
    pub state: RunState,
    #[serde(default)]
    pub started: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resolved: Option<DateTime<Utc>>,
}

impl TaskRun {
    /// @ai:intent Wall-clock seconds between start and resolution
    /// @ai:pre run is completed; None when either timestamp is missing
    /// @ai:effects pure
    pub fn elapsed_seconds(&self) -> Option<f64> {
        let started = self.started?;
        let resolved = self.resolved?;
        let elapsed = resolved - started;
        Some(elapsed.num_milliseconds() as f64 / 1000.0)
    }
}

/// @ai:intent Status half of a task-group listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    pub task_id: String,
    pub worker_type: String,
    #[serde(default)]
    pub runs: Vec<TaskRun>,
}

/// @ai:intent Definition half of a task-group listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub metadata: TaskMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskMetadata {
    pub name: String,
}

/// @ai:intent A completed-or-not task belonging to a task group
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub status: TaskStatus,
    pub task: TaskDefinition,
}

impl TaskRecord {
    /// @ai:intent Build a record from its parts (used by tests and fixtures)
    /// @ai:effects pure
    pub fn new(
        task_id: impl Into<String>,
        label: impl Into<String>,
        worker_type: impl Into<String>,
        runs: Vec<TaskRun>,
    ) -> Self {
        Self {
            status: TaskStatus {
                task_id: task_id.into(),
                worker_type: worker_type.into(),
                runs,
            },
            task: TaskDefinition {
                metadata: TaskMetadata { name: label.into() },
            },
        }
    }

    pub fn task_id(&self) -> &str {
        &self.status.task_id
    }

    /// @ai:intent Human-readable label used for all pattern matching
    pub fn label(&self) -> &str {
        &self.task.metadata.name
    }

    pub fn worker_type(&self) -> &str {
        &self.status.worker_type
    }

    /// @ai:intent The authoritative run; earlier attempts are retries
    /// @ai:effects pure
    pub fn last_run(&self) -> Option<&TaskRun> {
        self.status.runs.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_queue_entry() {
        let entry = json!({
            "status": {
                "taskId": "abc123",
                "workerType": "b-linux",
                "provisionerId": "gecko-3",
                "runs": [{
                    "runId": 0,
                    "state": "completed",
                    "reasonCreated": "scheduled",
                    "started": "2018-07-02T10:00:00.000Z",
                    "resolved": "2018-07-02T10:01:30.500Z"
                }]
            },
            "task": { "metadata": { "name": "build-linux64-devedition/opt", "owner": "x" } }
        });

        let record: TaskRecord = serde_json::from_value(entry).unwrap();
        assert_eq!(record.task_id(), "abc123");
        assert_eq!(record.label(), "build-linux64-devedition/opt");
        assert_eq!(record.worker_type(), "b-linux");

        let run = record.last_run().unwrap();
        assert_eq!(run.state, RunState::Completed);
        assert_eq!(run.elapsed_seconds(), Some(90.5));
    }

    #[test]
    fn test_unrecognised_state_decodes_as_unknown() {
        let run: TaskRun = serde_json::from_value(json!({ "state": "deadline-exceeded" })).unwrap();
        assert_eq!(run.state, RunState::Unknown);
        assert_eq!(run.elapsed_seconds(), None);
    }

    #[test]
    fn test_last_run_is_authoritative() {
        let failed = TaskRun {
            run_id: 0,
            state: RunState::Exception,
            started: None,
            resolved: None,
        };
        let retried = TaskRun {
            run_id: 1,
            state: RunState::Completed,
            started: None,
            resolved: None,
        };
        let record = TaskRecord::new("t", "label", "w", vec![failed, retried]);
        assert_eq!(record.last_run().unwrap().run_id, 1);
        assert!(TaskRecord::new("t", "label", "w", vec![]).last_run().is_none());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(RunState::Failed.to_string(), "failed");
        assert_eq!(RunState::Completed.as_str(), "completed");
    }
}
