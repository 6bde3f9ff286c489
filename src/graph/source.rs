//! @ai:module:intent Resolve a task-group id to its task records, cache first
//! @ai:module:layer application
//! @ai:module:public_api GraphSource
//! @ai:module:stateless false

use crate::error::Result;
use crate::graph::cache::GraphCache;
use crate::graph::client::TaskGroupClientTrait;
use crate::graph::task::TaskRecord;
use serde_json::Value;

/// @ai:intent Cache-or-fetch source of task-group listings
pub struct GraphSource<C: TaskGroupClientTrait> {
    client: C,
    cache: GraphCache,
}

impl<C: TaskGroupClientTrait> GraphSource<C> {
    /// @ai:intent Create a source over a queue client and a cache
    /// @ai:effects pure
    pub fn new(client: C, cache: GraphCache) -> Self {
        Self { client, cache }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// @ai:intent Return every task in the group, reusing a cached snapshot when present
    /// @ai:pre group_id is a valid queue slug
    /// @ai:effects fs:read, fs:write, network
    pub async fn resolve(&self, group_id: &str, use_hint: &str) -> Result<Vec<TaskRecord>> {
        let raw = match self.cache.load(group_id)? {
            Some(raw) => {
                tracing::debug!("Reusing cached graph {} for {}", group_id, use_hint);
                raw
            }
            None => {
                tracing::info!("Retrieving task graph {} for {}", group_id, use_hint);
                let raw = self.fetch_all(group_id).await?;
                let path = self.cache.store(group_id, &raw)?;
                tracing::debug!("Cached {} tasks at {}", raw.len(), path.display());
                raw
            }
        };

        decode_records(raw)
    }

    /// @ai:intent Drive the listing cursor until exhausted, concatenating pages in order
    /// @ai:effects network
    async fn fetch_all(&self, group_id: &str) -> Result<Vec<Value>> {
        let mut tasks = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let page = self
                .client
                .list_task_group(group_id, token.as_deref())
                .await?;

            tracing::info!("Adding another {} tasks", page.tasks.len());
            tasks.extend(page.tasks);

            match page.continuation_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        Ok(tasks)
    }
}

/// @ai:intent Decode raw listing entries into typed records
/// @ai:effects pure
fn decode_records(raw: Vec<Value>) -> Result<Vec<TaskRecord>> {
    raw.into_iter()
        .map(|entry| serde_json::from_value(entry).map_err(Into::into))
        .collect()
}
