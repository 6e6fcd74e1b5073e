//! Folders, categories and universe seeding.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::files::VaultFile;

/// Media category a folder belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Category {
    Photos,
    Videos,
    Audio,
    Documents,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Photos,
        Category::Videos,
        Category::Audio,
        Category::Documents,
    ];

    /// Advisory accept filter for the host's file picker. The core itself
    /// does not reject mismatched imports; hosts use this to warn or to
    /// pre-filter their pickers.
    pub fn accepts(self, mime_type: &str, name: &str) -> bool {
        match self {
            Category::Photos => mime_type.starts_with("image/"),
            Category::Videos => mime_type.starts_with("video/"),
            Category::Audio => mime_type.starts_with("audio/"),
            Category::Documents => {
                const EXTENSIONS: [&str; 4] = [".pdf", ".doc", ".docx", ".txt"];
                let name = name.to_ascii_lowercase();
                EXTENSIONS.iter().any(|ext| name.ends_with(ext))
            }
        }
    }

    fn default_folder_name(self) -> &'static str {
        match self {
            Category::Photos => "Gallery",
            Category::Videos => "Movies",
            Category::Audio => "Voice Notes",
            Category::Documents => "Documents",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Photos => "Photos",
            Category::Videos => "Videos",
            Category::Audio => "Audio",
            Category::Documents => "Documents",
        };
        f.pad(name)
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "photos" => Ok(Category::Photos),
            "videos" => Ok(Category::Videos),
            "audio" => Ok(Category::Audio),
            "documents" => Ok(Category::Documents),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// One folder holding files of a single category. Folders are never
/// deleted or renamed; the file list is append-only plus flag mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VaultFolder {
    pub id: String,
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub files: Vec<VaultFile>,
}

impl VaultFolder {
    pub fn new(name: String, category: Category) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            category,
            files: Vec::new(),
        }
    }

    /// Files not in the bin, in append order.
    pub fn active_files(&self) -> impl Iterator<Item = &VaultFile> {
        self.files.iter().filter(|f| !f.is_deleted)
    }

    /// Soft-deleted files, in append order.
    pub fn trashed_files(&self) -> impl Iterator<Item = &VaultFile> {
        self.files.iter().filter(|f| f.is_deleted)
    }
}

/// Seed collection for a fresh universe: one empty folder per category.
pub(crate) fn default_folders() -> Vec<VaultFolder> {
    Category::ALL
        .iter()
        .map(|&category| VaultFolder::new(category.default_folder_name().to_owned(), category))
        .collect()
}
