//! Per-folder file browsing: the active/bin views, batch selection,
//! soft-delete and restore-and-export.

use std::collections::BTreeSet;

use tracing::warn;

use crate::error::VaultError;
use crate::files::{Exporter, VaultFile};
use crate::folders::VaultFolder;

/// Which slice of a folder is on display. The two views are mutually
/// exclusive; they are never merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileView {
    Active,
    Trash,
}

impl FileView {
    fn shows(self, file: &VaultFile) -> bool {
        match self {
            FileView::Active => !file.is_deleted,
            FileView::Trash => file.is_deleted,
        }
    }
}

/// Selection state over one folder.
///
/// Scoped to a single session and a single view: switching views always
/// empties the selection, so a selection can never span views. Hosts
/// discard the browser when the session closes.
#[derive(Debug)]
pub struct Browser {
    view: FileView,
    selected: BTreeSet<String>,
}

impl Browser {
    pub fn new() -> Self {
        Self {
            view: FileView::Active,
            selected: BTreeSet::new(),
        }
    }

    pub fn view(&self) -> FileView {
        self.view
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    /// Files visible in the current view, in folder (append) order.
    pub fn visible<'f>(&self, folder: &'f VaultFolder) -> Vec<&'f VaultFile> {
        folder.files.iter().filter(|f| self.view.shows(f)).collect()
    }

    /// Switch between the vault and bin views. A change of view clears
    /// the selection.
    pub fn set_view(&mut self, view: FileView) {
        if view != self.view {
            self.view = view;
            self.selected.clear();
        }
    }

    /// Toggle one file in or out of the selection. The file must be
    /// visible in the current view. Returns whether it is now selected.
    pub fn toggle(&mut self, folder: &VaultFolder, id: &str) -> Result<bool, VaultError> {
        let visible = folder
            .files
            .iter()
            .any(|f| f.id == id && self.view.shows(f));
        if !visible {
            return Err(VaultError::NotInView(id.to_owned()));
        }
        if self.selected.remove(id) {
            Ok(false)
        } else {
            self.selected.insert(id.to_owned());
            Ok(true)
        }
    }

    /// Select every file in the current view, or clear the selection if
    /// everything visible is already selected.
    pub fn toggle_select_all(&mut self, folder: &VaultFolder) {
        let ids: BTreeSet<String> = folder
            .files
            .iter()
            .filter(|f| self.view.shows(f))
            .map(|f| f.id.clone())
            .collect();
        if self.selected.len() == ids.len() {
            self.selected.clear();
        } else {
            self.selected = ids;
        }
    }

    /// Soft-delete the selection, then clear it. Only exposed in the
    /// active view; the folder's file count is unchanged.
    pub fn delete_selected(&mut self, folder: &mut VaultFolder) -> Result<usize, VaultError> {
        if self.view != FileView::Active {
            return Err(VaultError::WrongView);
        }
        let mut flipped = 0;
        for file in folder.files.iter_mut() {
            if self.selected.contains(&file.id) {
                file.is_deleted = true;
                flipped += 1;
            }
        }
        self.selected.clear();
        Ok(flipped)
    }

    /// Export every selected file, then flip it back to active, then
    /// clear the selection. Only exposed in the bin view. The export side
    /// effect runs before the flag flips; an export failure is logged and
    /// the file is restored anyway.
    pub async fn restore_selected(
        &mut self,
        folder: &mut VaultFolder,
        exporter: &dyn Exporter,
    ) -> Result<usize, VaultError> {
        if self.view != FileView::Trash {
            return Err(VaultError::WrongView);
        }
        let mut restored = 0;
        for file in folder.files.iter_mut() {
            if !self.selected.contains(&file.id) {
                continue;
            }
            if let Err(err) = exporter.export(file).await {
                warn!(file = %file.name, %err, "export failed, restoring anyway");
            }
            file.is_deleted = false;
            restored += 1;
        }
        self.selected.clear();
        Ok(restored)
    }
}

impl Default for Browser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::files::FileBlob;
    use crate::folders::Category;

    fn folder_with(names: &[&str]) -> VaultFolder {
        let mut folder = VaultFolder::new("Gallery".to_owned(), Category::Photos);
        for name in names {
            folder.files.push(VaultFile::from_blob(FileBlob {
                name: (*name).to_owned(),
                mime_type: "image/png".to_owned(),
                bytes: vec![1, 2, 3],
            }));
        }
        folder
    }

    #[derive(Default)]
    struct RecordingExporter {
        exported: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl Exporter for RecordingExporter {
        async fn export(&self, file: &VaultFile) -> anyhow::Result<()> {
            self.exported.lock().unwrap().push(file.name.clone());
            if self.fail {
                anyhow::bail!("disk full");
            }
            Ok(())
        }
    }

    #[test]
    fn switching_views_clears_the_selection() {
        let folder = folder_with(&["a.png", "b.png"]);
        let mut browser = Browser::new();
        browser.toggle(&folder, &folder.files[0].id).unwrap();
        assert_eq!(browser.selected().len(), 1);

        browser.set_view(FileView::Trash);
        assert!(browser.selected().is_empty());

        // Re-setting the same view keeps the selection.
        browser.set_view(FileView::Active);
        browser.toggle(&folder, &folder.files[1].id).unwrap();
        browser.set_view(FileView::Active);
        assert_eq!(browser.selected().len(), 1);
    }

    #[test]
    fn selection_is_limited_to_the_current_view() {
        let mut folder = folder_with(&["a.png", "b.png"]);
        folder.files[0].is_deleted = true;
        let mut browser = Browser::new();
        let trashed_id = folder.files[0].id.clone();
        assert_eq!(
            browser.toggle(&folder, &trashed_id),
            Err(VaultError::NotInView(trashed_id.clone()))
        );
        browser.set_view(FileView::Trash);
        assert!(browser.toggle(&folder, &trashed_id).unwrap());
    }

    #[test]
    fn select_all_toggles_between_everything_and_nothing() {
        let folder = folder_with(&["a.png", "b.png", "c.png"]);
        let mut browser = Browser::new();
        browser.toggle_select_all(&folder);
        assert_eq!(browser.selected().len(), 3);
        browser.toggle_select_all(&folder);
        assert!(browser.selected().is_empty());

        // Partial selection grows to everything, not to nothing.
        browser.toggle(&folder, &folder.files[0].id).unwrap();
        browser.toggle_select_all(&folder);
        assert_eq!(browser.selected().len(), 3);
    }

    #[test]
    fn delete_flips_flags_without_shrinking_the_folder() {
        let mut folder = folder_with(&["a.png", "b.png"]);
        let mut browser = Browser::new();
        browser.toggle_select_all(&folder);
        let flipped = browser.delete_selected(&mut folder).unwrap();
        assert_eq!(flipped, 2);
        assert_eq!(folder.files.len(), 2);
        assert!(folder.files.iter().all(|f| f.is_deleted));
        assert!(browser.selected().is_empty());
    }

    #[test]
    fn delete_is_not_available_in_the_bin_view() {
        let mut folder = folder_with(&["a.png"]);
        let mut browser = Browser::new();
        browser.set_view(FileView::Trash);
        assert_eq!(
            browser.delete_selected(&mut folder),
            Err(VaultError::WrongView)
        );
    }

    #[tokio::test]
    async fn restore_exports_each_file_before_flipping() {
        let mut folder = folder_with(&["a.png", "b.png"]);
        let mut browser = Browser::new();
        browser.toggle_select_all(&folder);
        browser.delete_selected(&mut folder).unwrap();

        browser.set_view(FileView::Trash);
        browser.toggle_select_all(&folder);
        let exporter = RecordingExporter::default();
        let restored = browser
            .restore_selected(&mut folder, &exporter)
            .await
            .unwrap();
        assert_eq!(restored, 2);
        assert_eq!(folder.files.len(), 2);
        assert!(folder.files.iter().all(|f| !f.is_deleted));
        assert_eq!(exporter.exported.lock().unwrap().len(), 2);
        assert!(browser.selected().is_empty());
    }

    #[tokio::test]
    async fn failed_export_still_restores() {
        let mut folder = folder_with(&["a.png"]);
        let mut browser = Browser::new();
        browser.toggle_select_all(&folder);
        browser.delete_selected(&mut folder).unwrap();

        browser.set_view(FileView::Trash);
        browser.toggle_select_all(&folder);
        let exporter = RecordingExporter {
            fail: true,
            ..Default::default()
        };
        let restored = browser
            .restore_selected(&mut folder, &exporter)
            .await
            .unwrap();
        assert_eq!(restored, 1);
        assert!(!folder.files[0].is_deleted);
    }

    #[tokio::test]
    async fn restore_is_not_available_in_the_active_view() {
        let mut folder = folder_with(&["a.png"]);
        let mut browser = Browser::new();
        let exporter = RecordingExporter::default();
        assert_eq!(
            browser.restore_selected(&mut folder, &exporter).await,
            Err(VaultError::WrongView)
        );
        assert!(exporter.exported.lock().unwrap().is_empty());
    }
}
