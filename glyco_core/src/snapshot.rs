//! Namespaced key-value snapshots with file locking.
//!
//! Each namespace (for example `auth-storage`) is one JSON document at
//! `<data_dir>/<namespace>.json`. Reads take a shared lock; writes go to a
//! locked temp file that is renamed over the original.

use crate::{Error, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Namespace holding the signed-in session
pub const AUTH_NAMESPACE: &str = "auth-storage";

/// Namespace holding the physical profile
pub const PROFILE_NAMESPACE: &str = "profile-storage";

/// One persisted namespace
#[derive(Clone, Debug)]
pub struct Snapshot {
    path: PathBuf,
}

impl Snapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot for `namespace` inside `data_dir`
    pub fn in_dir(data_dir: &Path, namespace: &str) -> Self {
        Self::new(data_dir.join(format!("{}.json", namespace)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot, if one is present and readable.
    ///
    /// Missing, unreadable, or corrupt files are logged and yield `None`.
    pub fn load<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            tracing::debug!("No snapshot at {:?}", self.path);
            return Ok(None);
        }

        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open snapshot {:?}: {}. Ignoring.", self.path, e);
                return Ok(None);
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock snapshot {:?}: {}. Ignoring.", self.path, e);
            return Ok(None);
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!("Failed to read snapshot {:?}: {}. Ignoring.", self.path, e);
            return Ok(None);
        }

        file.unlock()?;

        match serde_json::from_str::<T>(&contents) {
            Ok(value) => {
                tracing::debug!("Loaded snapshot from {:?}", self.path);
                Ok(Some(value))
            }
            Err(e) => {
                tracing::warn!("Failed to parse snapshot {:?}: {}. Ignoring.", self.path, e);
                Ok(None)
            }
        }
    }

    /// Load the snapshot or fall back to `T::default()`
    pub fn load_or_default<T: DeserializeOwned + Default>(&self) -> Result<T> {
        Ok(self.load()?.unwrap_or_default())
    }

    /// Atomically replace the snapshot
    pub fn save<T: Serialize>(&self, value: &T) -> Result<()> {
        let parent = self.path.parent().ok_or_else(|| {
            Error::State(format!("snapshot path {:?} has no parent", self.path))
        })?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string_pretty(value)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved snapshot to {:?}", self.path);
        Ok(())
    }
}
