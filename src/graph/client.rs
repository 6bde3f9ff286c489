//! @ai:module:intent Task-queue client for paginated task-group listings
//! @ai:module:layer infrastructure
//! @ai:module:public_api TaskGroupClientTrait, QueueClient, TaskGroupPage, MockTaskGroupClient
//! @ai:module:stateless false

use crate::config::QueueConfig;
use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// @ai:intent One page of a task-group listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskGroupPage {
    /// Raw listing entries, kept verbatim for the on-disk cache
    pub tasks: Vec<Value>,
    /// Cursor for the next page; None once the listing is exhausted
    pub continuation_token: Option<String>,
}

/// @ai:intent Trait for a paginated task-group source
#[allow(async_fn_in_trait)]
pub trait TaskGroupClientTrait: Send + Sync {
    /// @ai:intent Fetch one page of the task-group listing
    async fn list_task_group(
        &self,
        group_id: &str,
        continuation_token: Option<&str>,
    ) -> Result<TaskGroupPage>;
}

/// @ai:intent Queue API response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListTaskGroupResponse {
    #[serde(default)]
    tasks: Vec<Value>,
    #[serde(default)]
    continuation_token: Option<String>,
}

/// @ai:intent HTTP client for the task-queue service
pub struct QueueClient {
    client: reqwest::Client,
    root_url: String,
    page_size: u32,
}

impl QueueClient {
    /// @ai:intent Create a new queue client
    /// @ai:effects pure
    pub fn new(config: &QueueConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("taskcost/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            root_url: config.root_url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
        })
    }

    /// @ai:intent Listing endpoint for a task group
    /// @ai:effects pure
    fn list_url(&self, group_id: &str) -> String {
        format!(
            "{}/api/queue/v1/task-group/{}/list",
            self.root_url, group_id
        )
    }
}

impl TaskGroupClientTrait for QueueClient {
    /// @ai:intent Fetch one page of the listing from the queue
    /// @ai:effects network
    async fn list_task_group(
        &self,
        group_id: &str,
        continuation_token: Option<&str>,
    ) -> Result<TaskGroupPage> {
        let mut request = self
            .client
            .get(self.list_url(group_id))
            .query(&[("limit", self.page_size.to_string())]);

        if let Some(token) = continuation_token {
            request = request.query(&[("continuationToken", token)]);
        }

        let response = request.send().await.map_err(|e| Error::Retrieval {
            group_id: group_id.to_string(),
            message: format!("request failed: {}", e),
        })?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Retrieval {
                group_id: group_id.to_string(),
                message: format!("queue returned {}: {}", status, error_text),
            });
        }

        let body: ListTaskGroupResponse =
            response.json().await.map_err(|e| Error::Retrieval {
                group_id: group_id.to_string(),
                message: format!("malformed listing page: {}", e),
            })?;

        Ok(TaskGroupPage {
            tasks: body.tasks,
            continuation_token: body.continuation_token,
        })
    }
}

/// @ai:intent Mock client serving canned pages, for testing
pub struct MockTaskGroupClient {
    pages: Vec<Vec<Value>>,
    fail_at_page: Option<usize>,
    calls: AtomicUsize,
}

impl MockTaskGroupClient {
    /// @ai:intent Create a mock that serves the given pages in order
    /// @ai:effects pure
    pub fn new(pages: Vec<Vec<Value>>) -> Self {
        Self {
            pages,
            fail_at_page: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// @ai:intent Make the request for page `index` fail with a retrieval error
    /// @ai:effects pure
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at_page = Some(index);
        self
    }

    /// @ai:intent Number of page requests served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TaskGroupClientTrait for MockTaskGroupClient {
    /// @ai:intent Return the page addressed by the continuation token
    /// @ai:effects state:write
    async fn list_task_group(
        &self,
        group_id: &str,
        continuation_token: Option<&str>,
    ) -> Result<TaskGroupPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let index = match continuation_token {
            None => 0,
            Some(token) => token
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| Error::Retrieval {
                    group_id: group_id.to_string(),
                    message: format!("unknown continuation token {}", token),
                })?,
        };

        if self.fail_at_page == Some(index) {
            return Err(Error::Retrieval {
                group_id: group_id.to_string(),
                message: "simulated outage".to_string(),
            });
        }

        let tasks = self.pages.get(index).cloned().unwrap_or_default();
        let continuation_token = if index + 1 < self.pages.len() {
            Some(format!("page-{}", index + 1))
        } else {
            None
        };

        Ok(TaskGroupPage {
            tasks,
            continuation_token,
        })
    }
}
