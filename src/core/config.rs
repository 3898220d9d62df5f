/// Runtime configuration, loaded from RON.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::core::engine::{EngineError, OutlineEngine};
use crate::core::storage::{JsonFileStore, StoryStorage, DEFAULT_QUOTA_BYTES};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Where projects live and which taxonomy the engine uses.
///
/// Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryLabConfig {
    pub store_path: PathBuf,
    /// Largest collection document the store will write.
    pub quota_bytes: u64,
    /// Custom keyword taxonomy; the built-in one when absent.
    pub taxonomy_path: Option<PathBuf>,
}

impl Default for StoryLabConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("storylab_projects.json"),
            quota_bytes: DEFAULT_QUOTA_BYTES,
            taxonomy_path: None,
        }
    }
}

impl StoryLabConfig {
    pub fn load_from_ron(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::parse_ron(&contents)?;
        debug!(path = %path.display(), store = %config.store_path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse_ron(input: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(input)?)
    }

    pub fn open_storage(&self) -> StoryStorage<JsonFileStore> {
        StoryStorage::new(JsonFileStore::new(&self.store_path).with_quota(Some(self.quota_bytes)))
    }

    pub fn build_engine(&self) -> Result<OutlineEngine, ConfigError> {
        let mut builder = OutlineEngine::builder();
        if let Some(path) = &self.taxonomy_path {
            builder = builder.taxonomy_path(path);
        }
        Ok(builder.build()?)
    }
}
