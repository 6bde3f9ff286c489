//! @ai:module:intent Per-group JSON snapshots of task-group listings
//! @ai:module:layer infrastructure
//! @ai:module:public_api GraphCache, CacheEntry
//! @ai:module:stateless false

use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// @ai:intent A cached task-group snapshot found on disk
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub group_id: String,
    pub path: PathBuf,
    pub task_count: usize,
}

/// @ai:intent Cache directory holding one file per task-group id
#[derive(Debug, Clone)]
pub struct GraphCache {
    root: PathBuf,
}

impl GraphCache {
    /// @ai:intent Open the cache, creating its root directory if absent
    /// @ai:effects fs:write
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// @ai:intent Resolve the snapshot path for a group id
    /// @ai:pre group_id is a queue slug (ASCII letters, digits, '-' or '_')
    /// @ai:effects pure
    pub fn path_for(&self, group_id: &str) -> Result<PathBuf> {
        validate_group_id(group_id)?;
        Ok(self.root.join(group_id))
    }

    /// @ai:intent Load a snapshot; None means a fetch is needed
    /// @ai:effects fs:read
    pub fn load(&self, group_id: &str) -> Result<Option<Vec<Value>>> {
        let path = self.path_for(group_id)?;

        if !path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        let tasks: Vec<Value> = serde_json::from_str(&content)?;
        Ok(Some(tasks))
    }

    /// @ai:intent Persist a full listing with sorted keys, replacing any previous snapshot
    /// @ai:effects fs:write
    pub fn store(&self, group_id: &str, tasks: &[Value]) -> Result<PathBuf> {
        let path = self.path_for(group_id)?;
        let bytes = to_snapshot_bytes(tasks)?;

        // Temp file must live next to the target for the rename to be atomic
        let mut temp = NamedTempFile::new_in(&self.root)?;
        temp.write_all(&bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        Ok(path)
    }

    /// @ai:intent Delete a snapshot; returns whether one existed
    /// @ai:effects fs:write
    pub fn remove(&self, group_id: &str) -> Result<bool> {
        let path = self.path_for(group_id)?;

        if !path.is_file() {
            return Ok(false);
        }

        std::fs::remove_file(&path)?;
        Ok(true)
    }

    /// @ai:intent List cached snapshots sorted by group id
    /// @ai:effects fs:read
    pub fn entries(&self) -> Result<Vec<CacheEntry>> {
        let mut entries = Vec::new();

        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let Some(group_id) = entry.file_name().to_str() else {
                continue;
            };

            if validate_group_id(group_id).is_err() {
                continue;
            }

            match self.load(group_id) {
                Ok(Some(tasks)) => entries.push(CacheEntry {
                    group_id: group_id.to_string(),
                    path: entry.path().to_path_buf(),
                    task_count: tasks.len(),
                }),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        "Skipping unreadable cache file {}: {}",
                        entry.path().display(),
                        e
                    );
                }
            }
        }

        entries.sort_by(|a, b| a.group_id.cmp(&b.group_id));
        Ok(entries)
    }
}

/// @ai:intent Reject ids that could escape the cache directory
/// @ai:effects pure
fn validate_group_id(group_id: &str) -> Result<()> {
    let valid = !group_id.is_empty()
        && group_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidGroupId(group_id.to_string()))
    }
}

/// @ai:intent Deterministic serialization: sorted keys, 4-space indent, trailing newline
/// @ai:effects pure
fn to_snapshot_bytes(tasks: &[Value]) -> Result<Vec<u8>> {
    let sorted: Vec<Value> = tasks.iter().map(sort_keys).collect();

    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    sorted.serialize(&mut serializer)?;
    buf.push(b'\n');

    Ok(buf)
}

/// @ai:intent Rebuild objects with keys in sorted order at every depth
/// @ai:effects pure
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), sort_keys(&map[key.as_str()]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}
