use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::{debug, instrument, warn};

use super::entities::TrackerRecord;

/// Interface for abstracting storage of the tracker record.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrackerStorage: Send + Sync {
    /// Reads the stored record. `Ok(None)` means nothing was stored yet, which is different from
    /// a record that exists but can't be read or parsed.
    async fn load(&self) -> Result<Option<TrackerRecord>>;

    /// Replaces the stored record.
    async fn save(&self, record: &TrackerRecord) -> Result<()>;

    /// Moves an unreadable record out of the way so later saves don't overwrite it. Returns the
    /// new location if there was anything to move.
    async fn quarantine(&self) -> Result<Option<PathBuf>>;
}

/// The main realization of [TrackerStorage]: one pretty printed JSON file.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: PathBuf) -> Result<Self, std::io::Error> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn quarantine_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|v| v.to_os_string())
            .unwrap_or_default();
        name.push(".corrupt");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl TrackerStorage for JsonFileStorage {
    #[instrument(skip(self), fields(path = ?self.path))]
    async fn load(&self) -> Result<Option<TrackerRecord>> {
        let mut file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No record stored yet");
                return Ok(None);
            }
            Err(e) => return Err(e).with_context(|| format!("Can't open {:?}", self.path)),
        };

        file.lock_shared()?;
        let mut content = String::new();
        let read = file.read_to_string(&mut content).await;
        file.unlock_async().await?;
        read.with_context(|| format!("Can't read {:?}", self.path))?;

        let record = serde_json::from_str::<TrackerRecord>(&content)
            .with_context(|| format!("Record in {:?} is malformed", self.path))?;
        debug!("Loaded {} habits", record.habits.len());
        Ok(Some(record))
    }

    #[instrument(skip(self, record), fields(path = ?self.path, habits = record.habits.len()))]
    async fn save(&self, record: &TrackerRecord) -> Result<()> {
        let buffer = serde_json::to_vec_pretty(record)?;

        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .await
            .with_context(|| format!("Can't open {:?} for writing", self.path))?;

        // Truncate only once the lock is held so a concurrent reader never sees a half-empty file.
        file.lock_exclusive()?;
        let result = Self::write_locked(&mut file, &buffer).await;
        file.unlock_async().await?;
        result
    }

    async fn quarantine(&self) -> Result<Option<PathBuf>> {
        let target = self.quarantine_path();
        match tokio::fs::rename(&self.path, &target).await {
            Ok(()) => {
                warn!("Moved unreadable record to {target:?}");
                Ok(Some(target))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl JsonFileStorage {
    async fn write_locked(file: &mut File, buffer: &[u8]) -> Result<()> {
        file.set_len(0).await?;
        file.write_all(buffer).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;
        file.sync_data().await?;
        Ok(())
    }
}
