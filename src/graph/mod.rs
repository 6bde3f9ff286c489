//! @ai:module:intent Task-group retrieval, caching and task record models
//! @ai:module:layer infrastructure
//! @ai:module:public_api GraphSource, GraphCache, QueueClient, TaskRecord, RunState

pub mod cache;
pub mod client;
pub mod source;
pub mod task;

pub use cache::{CacheEntry, GraphCache};
pub use client::{MockTaskGroupClient, QueueClient, TaskGroupClientTrait, TaskGroupPage};
pub use source::GraphSource;
pub use task::{RunState, TaskRecord, TaskRun};
