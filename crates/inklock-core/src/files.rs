//! File records, import conversion and the export collaborator seam.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Raw input from the import collaborator (file picker, CLI path read).
#[derive(Debug, Clone)]
pub struct FileBlob {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// One stored file. Owned by exactly one folder for its whole life; the
/// delete flag is the only mutable part. Deleted files stay in the
/// folder's collection, so storage is never reclaimed here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VaultFile {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: u64,
    /// Inline payload, base64.
    pub data: String,
    pub created_at: DateTime<Utc>,
    pub is_deleted: bool,
}

impl VaultFile {
    /// Convert one imported blob: fresh id, captured name/type/size,
    /// active from the start.
    pub fn from_blob(blob: FileBlob) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            size: blob.bytes.len() as u64,
            data: general_purpose::STANDARD.encode(&blob.bytes),
            name: blob.name,
            mime_type: blob.mime_type,
            created_at: Utc::now(),
            is_deleted: false,
        }
    }

    /// Decode the inline payload for export.
    pub fn payload(&self) -> Result<Vec<u8>, base64::DecodeError> {
        general_purpose::STANDARD.decode(&self.data)
    }
}

/// Export/download collaborator: writes a file's payload somewhere the
/// user can reach outside the vault. Fire-and-forget from the vault's
/// point of view; the core consumes no result beyond logging failures.
#[async_trait]
pub trait Exporter: Send + Sync {
    async fn export(&self, file: &VaultFile) -> anyhow::Result<()>;
}
