/// Project persistence — the whole collection lives in one JSON document.
///
/// Every write rewrites the full collection. Backends only move the raw
/// document around and enforce a size quota, the way browser local storage
/// does.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::core::analysis::trim_space;
use crate::schema::project::Project;

/// Version tag written into every saved collection.
pub const COLLECTION_VERSION: u32 = 1;

/// The usual browser local-storage allowance.
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

pub const UNTITLED: &str = "Untitled Story";

/// Coarse classification of storage failures for callers that only need
/// to branch on "storage is full" versus everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    QuotaExceeded,
    Unknown,
}

impl StorageErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::QuotaExceeded => "quota-exceeded",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage quota exceeded: document is {size} bytes, quota is {quota} bytes")]
    QuotaExceeded { size: u64, quota: u64 },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("project not found: {0}")]
    NotFound(String),
}

impl StorageError {
    pub fn kind(&self) -> StorageErrorKind {
        match self {
            Self::QuotaExceeded { .. } => StorageErrorKind::QuotaExceeded,
            _ => StorageErrorKind::Unknown,
        }
    }
}

fn check_quota(document: &str, quota: Option<u64>) -> Result<(), StorageError> {
    let size = document.len() as u64;
    match quota {
        Some(quota) if size > quota => Err(StorageError::QuotaExceeded { size, quota }),
        _ => Ok(()),
    }
}

/// Raw document storage under a single key.
pub trait ProjectStore {
    /// The stored document, or `None` if nothing was ever written.
    fn read(&self) -> Result<Option<String>, StorageError>;
    fn write(&mut self, document: &str) -> Result<(), StorageError>;
    fn remove(&mut self) -> Result<(), StorageError>;
}

/// A JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    quota_bytes: Option<u64>,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            quota_bytes: Some(DEFAULT_QUOTA_BYTES),
        }
    }

    /// Set the size limit; `None` disables it.
    pub fn with_quota(mut self, quota_bytes: Option<u64>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProjectStore for JsonFileStore {
    fn read(&self) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, document: &str) -> Result<(), StorageError> {
        check_quota(document, self.quota_bytes)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        // Write beside the target and rename so a failed write keeps the old file.
        let tmp = self.path.with_extension("json.tmp");
        let result = std::fs::write(&tmp, document)
            .and_then(|()| std::fs::rename(&tmp, &self.path));
        if let Err(e) = result {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove(&mut self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// An in-memory document, for tests and hosts without a filesystem.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    document: Option<String>,
    quota_bytes: Option<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(mut self, quota_bytes: Option<u64>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    /// Start from an existing raw document.
    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }

    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }
}

impl ProjectStore for MemoryStore {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self.document.clone())
    }

    fn write(&mut self, document: &str) -> Result<(), StorageError> {
        check_quota(document, self.quota_bytes)?;
        self.document = Some(document.to_string());
        Ok(())
    }

    fn remove(&mut self) -> Result<(), StorageError> {
        self.document = None;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct CollectionRef<'a> {
    version: u32,
    projects: &'a [Project],
}

#[derive(Debug, Deserialize)]
struct Collection {
    version: u32,
    projects: Vec<Project>,
}

/// Accepted document layouts: versioned, or the bare array written before
/// collections carried a version.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredCollection {
    Versioned(Collection),
    Legacy(Vec<Project>),
}

/// Size summary of the stored collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageInfo {
    pub project_count: usize,
    pub total_size: u64,
    pub total_size_formatted: String,
}

/// Project CRUD on top of a [`ProjectStore`].
#[derive(Debug)]
pub struct StoryStorage<S: ProjectStore> {
    store: S,
}

impl<S: ProjectStore> StoryStorage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every stored project, newest first.
    ///
    /// A missing, unreadable or corrupt document reads as an empty list.
    pub fn list_projects(&self) -> Vec<Project> {
        let document = match self.store.read() {
            Ok(Some(document)) => document,
            Ok(None) => return Vec::new(),
            Err(e) => {
                error!("Error loading projects: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<StoredCollection>(&document) {
            Ok(StoredCollection::Versioned(collection)) => {
                if collection.version > COLLECTION_VERSION {
                    debug!(
                        version = collection.version,
                        "reading collection written by a newer version"
                    );
                }
                collection.projects
            }
            Ok(StoredCollection::Legacy(projects)) => projects,
            Err(e) => {
                error!("Error loading projects: {}", e);
                Vec::new()
            }
        }
    }

    /// Replace the whole collection.
    pub fn save_all(&mut self, projects: &[Project]) -> Result<(), StorageError> {
        let result = serde_json::to_string(&CollectionRef {
            version: COLLECTION_VERSION,
            projects,
        })
        .map_err(StorageError::from)
        .and_then(|document| self.store.write(&document));

        if let Err(ref e) = result {
            match e.kind() {
                StorageErrorKind::QuotaExceeded => {
                    warn!("Storage is full. Please delete old stories to continue.")
                }
                StorageErrorKind::Unknown => error!("Error saving projects: {}", e),
            }
        }
        result
    }

    /// Create a project for `logline` and put it at the front of the list.
    pub fn create_project(&mut self, logline: &str) -> Result<Project, StorageError> {
        let now = Utc::now();
        let project = Project {
            id: generate_id(),
            title: extract_title(logline).unwrap_or_else(|| UNTITLED.to_string()),
            logline: logline.to_string(),
            created_at: now,
            updated_at: now,
            step: Default::default(),
            outline: None,
            script: Default::default(),
            visual_scenes: None,
            cuts: Default::default(),
            skipped_steps: Vec::new(),
            global_style_locked: false,
            status: Default::default(),
        };

        let mut projects = self.list_projects();
        projects.insert(0, project.clone());
        self.save_all(&projects)?;
        info!(id = %project.id, title = %project.title, "created project");
        Ok(project)
    }

    pub fn load_project(&self, id: &str) -> Option<Project> {
        self.list_projects().into_iter().find(|p| p.id == id)
    }

    /// Stamp `updated_at` and write the project back in place.
    ///
    /// Fails with `NotFound` if the project is not in the collection.
    pub fn save_project(&mut self, project: &mut Project) -> Result<(), StorageError> {
        let mut projects = self.list_projects();
        let slot = projects
            .iter_mut()
            .find(|p| p.id == project.id)
            .ok_or_else(|| StorageError::NotFound(project.id.clone()))?;

        project.updated_at = Utc::now();
        *slot = project.clone();
        self.save_all(&projects)
    }

    /// Set a new logline and re-derive the title from it.
    pub fn update_logline(
        &mut self,
        project: &mut Project,
        logline: &str,
    ) -> Result<(), StorageError> {
        project.logline = logline.to_string();
        project.title = extract_title(logline).unwrap_or_else(|| UNTITLED.to_string());
        self.save_project(project)
    }

    /// Remove a project. Deleting an unknown id still rewrites the collection.
    pub fn delete_project(&mut self, id: &str) -> Result<(), StorageError> {
        let projects: Vec<Project> = self
            .list_projects()
            .into_iter()
            .filter(|p| p.id != id)
            .collect();
        self.save_all(&projects)?;
        info!(id, "deleted project");
        Ok(())
    }

    pub fn clear_all(&mut self) -> Result<(), StorageError> {
        self.store.remove()
    }

    pub fn storage_info(&self) -> Result<StorageInfo, StorageError> {
        let projects = self.list_projects();
        let total_size = serde_json::to_string(&projects)?.len() as u64;
        Ok(StorageInfo {
            project_count: projects.len(),
            total_size,
            total_size_formatted: format_bytes(total_size),
        })
    }

    /// Pretty-printed JSON of one project.
    pub fn export_project(&self, id: &str) -> Result<Option<String>, StorageError> {
        match self.load_project(id) {
            Some(project) => Ok(Some(serde_json::to_string_pretty(&project)?)),
            None => Ok(None),
        }
    }
}

/// `story_<millis>_<up to nine base-36 characters>`.
pub fn generate_id() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("story_{}_{}", Utc::now().timestamp_millis(), suffix)
}

/// First four space-separated words of the logline, minus one trailing
/// `.`, `,`, `!` or `?`. `None` if that leaves nothing.
pub fn extract_title(logline: &str) -> Option<String> {
    let words: Vec<&str> = trim_space(logline).split(' ').take(4).collect();
    let joined = words.join(" ");
    let title = joined
        .strip_suffix(&['.', ',', '!', '?'][..])
        .unwrap_or(joined.as_str());
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// Human-readable size: "0 Bytes", "512 Bytes", "1.5 KB", "2 MB".
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}
