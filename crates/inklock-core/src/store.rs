//! Persistence gateway: one JSON snapshot, whole-state, single record.
//!
//! The contract is deliberately small. `save` replaces the entire record
//! or fails; `load` returns the entire record or nothing. Only one vault
//! instance exists per profile, so the record needs no key beyond its
//! path. Saving is fire-and-forget from the host's point of view: a
//! failure is logged by the caller and the in-memory state stands.

use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::state::AppState;

pub const STATE_FILE: &str = "state.json";

/// On-disk store for the application snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Store under the platform data directory (or `INKLOCK_DATA_DIR`).
    pub fn open_default() -> anyhow::Result<Self> {
        let dir = crate::paths::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            path: dir.join(STATE_FILE),
        })
    }

    /// Store at an explicit file path.
    pub fn at<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot. A missing file is `None` (first run); on any
    /// other failure the caller recovers by falling back to a default
    /// state rather than blocking startup.
    pub async fn load(&self) -> Result<Option<AppState>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let state: AppState = serde_json::from_slice(&bytes)?;
        Ok(Some(state))
    }

    /// Replace the snapshot, all-or-nothing for this call. The volatile
    /// session flag is excluded from the serialised form by construction.
    pub async fn save(&self, state: &AppState) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(state)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}
