use crate::{EngineError, StateChannels, timestamp_now};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

pub const CHECKPOINT_SCHEMA_VERSION: u32 = 1;

/// Persisted snapshot of a run, keyed by run id. `next_node` is the
/// node the driver would invoke next; `None` means the run reached the
/// terminal marker and there is nothing left to resume.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint<S> {
    pub schema_version: u32,
    pub run_id: String,
    pub completed_nodes: Vec<String>,
    pub next_node: Option<String>,
    pub state: S,
    pub timestamp: String,
}

impl<S: StateChannels> Checkpoint<S> {
    pub fn new(
        run_id: impl Into<String>,
        completed_nodes: Vec<String>,
        next_node: Option<String>,
        state: S,
    ) -> Self {
        Self {
            schema_version: CHECKPOINT_SCHEMA_VERSION,
            run_id: run_id.into(),
            completed_nodes,
            next_node,
            state,
            timestamp: timestamp_now(),
        }
    }
}

/// Keyed, isolated read/write per run id. Keys never collide across
/// runs, so no cross-run locking is required of implementations.
#[async_trait]
pub trait CheckpointStore<S: StateChannels>: Send + Sync {
    async fn save(&self, checkpoint: &Checkpoint<S>) -> Result<(), EngineError>;
    async fn load(&self, run_id: &str) -> Result<Option<Checkpoint<S>>, EngineError>;
    async fn delete(&self, run_id: &str) -> Result<(), EngineError>;
}

/// In-memory store, for tests and single-process callers.
pub struct MemoryCheckpointStore<S> {
    inner: RwLock<BTreeMap<String, Checkpoint<S>>>,
}

impl<S> Default for MemoryCheckpointStore<S> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<S> MemoryCheckpointStore<S> {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl<S: StateChannels> CheckpointStore<S> for MemoryCheckpointStore<S> {
    async fn save(&self, checkpoint: &Checkpoint<S>) -> Result<(), EngineError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| EngineError::checkpoint("store write lock poisoned"))?;
        inner.insert(checkpoint.run_id.clone(), checkpoint.clone());
        Ok(())
    }

    async fn load(&self, run_id: &str) -> Result<Option<Checkpoint<S>>, EngineError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| EngineError::checkpoint("store read lock poisoned"))?;
        Ok(inner.get(run_id).cloned())
    }

    async fn delete(&self, run_id: &str) -> Result<(), EngineError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| EngineError::checkpoint("store write lock poisoned"))?;
        inner.remove(run_id);
        Ok(())
    }
}

/// One JSON file per run id under a root directory.
pub struct FileCheckpointStore {
    root: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, run_id: &str) -> PathBuf {
        let file_stem: String = run_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        self.root.join(format!("{file_stem}.json"))
    }
}

#[async_trait]
impl<S> CheckpointStore<S> for FileCheckpointStore
where
    S: StateChannels + Serialize + DeserializeOwned,
{
    async fn save(&self, checkpoint: &Checkpoint<S>) -> Result<(), EngineError> {
        let path = self.path_for(&checkpoint.run_id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|error| {
                EngineError::checkpoint(format!(
                    "failed to create checkpoint directory '{}': {error}",
                    parent.display()
                ))
            })?;
        }
        let bytes = serde_json::to_vec_pretty(checkpoint).map_err(|error| {
            EngineError::checkpoint(format!("failed to serialize checkpoint: {error}"))
        })?;
        fs::write(&path, bytes).map_err(|error| {
            EngineError::checkpoint(format!(
                "failed writing checkpoint file '{}': {error}",
                path.display()
            ))
        })
    }

    async fn load(&self, run_id: &str) -> Result<Option<Checkpoint<S>>, EngineError> {
        let path = self.path_for(run_id);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path).map_err(|error| {
            EngineError::checkpoint(format!(
                "failed reading checkpoint file '{}': {error}",
                path.display()
            ))
        })?;
        serde_json::from_slice(&bytes).map(Some).map_err(|error| {
            EngineError::checkpoint(format!(
                "failed deserializing checkpoint file '{}': {error}",
                path.display()
            ))
        })
    }

    async fn delete(&self, run_id: &str) -> Result<(), EngineError> {
        let path = self.path_for(run_id);
        if path.exists() {
            fs::remove_file(&path).map_err(|error| {
                EngineError::checkpoint(format!(
                    "failed removing checkpoint file '{}': {error}",
                    path.display()
                ))
            })?;
        }
        Ok(())
    }
}

pub fn checkpoint_path_for(root: &Path, run_id: &str) -> PathBuf {
    FileCheckpointStore::new(root).path_for(run_id)
}
