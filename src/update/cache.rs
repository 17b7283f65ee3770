use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// What the last registry query found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub last_checked: DateTime<Utc>,
    #[serde(default)]
    pub latest_version: Option<String>,
}

/// Storage for the last update check.
pub trait UpdateCache: Send + Sync {
    fn read(&self) -> Result<Option<CacheRecord>>;
    fn write(&self, record: &CacheRecord) -> Result<()>;
}

/// TOML file under the user's cache directory.
#[derive(Debug, Clone)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<cache dir>/forksync/update-check.toml`.
    pub fn default_location() -> Result<Self> {
        let dir = dirs::cache_dir()
            .ok_or_else(|| AppError::UpdateCheck("No cache directory on this platform".to_string()))?;
        Ok(Self::new(dir.join("forksync").join("update-check.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UpdateCache for FileCache {
    fn read(&self) -> Result<Option<CacheRecord>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(toml::from_str(&text)?))
    }

    fn write(&self, record: &CacheRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, toml::to_string(record)?)?;
        Ok(())
    }
}

/// In-process cache; nothing touches disk.
#[derive(Debug, Default)]
pub struct MemoryCache {
    record: Mutex<Option<CacheRecord>>,
}

impl MemoryCache {
    pub fn with_record(record: CacheRecord) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }
}

impl UpdateCache for MemoryCache {
    fn read(&self) -> Result<Option<CacheRecord>> {
        Ok(self
            .record
            .lock()
            .map_err(|e| AppError::UpdateCheck(e.to_string()))?
            .clone())
    }

    fn write(&self, record: &CacheRecord) -> Result<()> {
        *self
            .record
            .lock()
            .map_err(|e| AppError::UpdateCheck(e.to_string()))? = Some(record.clone());
        Ok(())
    }
}
