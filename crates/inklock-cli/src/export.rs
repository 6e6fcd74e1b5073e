//! Host-side collaborators: the download destination and the import
//! reader. The core treats both as external contracts.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;

use inklock_core::{Exporter, FileBlob, VaultFile};

/// Writes payloads into a user-visible directory; the "download" side of
/// restore-and-download.
pub struct DiskExporter {
    dir: PathBuf,
}

impl DiskExporter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

#[async_trait]
impl Exporter for DiskExporter {
    async fn export(&self, file: &VaultFile) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let payload = file.payload()?;
        let dest = self.dir.join(&file.name);
        tokio::fs::write(&dest, payload)
            .await
            .with_context(|| format!("write {}", dest.display()))?;
        Ok(())
    }
}

/// Read one file from disk into an import blob, guessing the MIME type
/// from the extension the way a front-end picker would.
pub async fn read_blob(path: &Path) -> Result<FileBlob> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_owned());
    let mime_type = mime_for(&name).to_owned();
    Ok(FileBlob {
        name,
        mime_type,
        bytes,
    })
}

fn mime_for(name: &str) -> &'static str {
    let ext = name.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "ogg" => "audio/ogg",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}
