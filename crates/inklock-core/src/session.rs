//! Session controller: binds an authentication outcome to the folder
//! universe it operates on, for the lifetime of one unlocked vault.

use crate::auth::{AuthMachine, SessionKind};
use crate::credentials::{ChangeAuth, CredentialSet, PinLength, SecurityQuestion};
use crate::error::VaultError;
use crate::files::{FileBlob, VaultFile};
use crate::folders::{Category, VaultFolder};
use crate::state::AppState;

/// The application-state container. All mutation flows through this type
/// (or a [`Session`] borrowed from it), keeping the single-threaded
/// read-modify-write discipline explicit and testable.
#[derive(Debug, Default)]
pub struct Vault {
    state: AppState,
}

impl Vault {
    /// Fresh state with both universes seeded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate from a loaded snapshot. The session flag is reset
    /// unconditionally: a decoy session never survives a restart.
    pub fn from_state(mut state: AppState) -> Self {
        state.is_fake_session = false;
        Self { state }
    }

    /// The current whole-state snapshot, for persistence. The volatile
    /// session flag is excluded from the serialised form by construction.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn credentials(&self) -> &CredentialSet {
        &self.state.credentials
    }

    pub fn is_set_up(&self) -> bool {
        self.state.credentials.is_password_set
    }

    pub fn show_onboarding(&self) -> bool {
        self.state.show_onboarding
    }

    /// The notes front-end calls this once its first-run notice is closed.
    pub fn dismiss_onboarding(&mut self) {
        self.state.show_onboarding = false;
    }

    /// Switch between 4 and 6 digit codes; only before the first setup.
    pub fn set_pin_length(&mut self, length: PinLength) -> Result<(), VaultError> {
        self.state.credentials.set_length(length)
    }

    /// Run the whole setup flow in one step, for hosts that collect every
    /// entry before submitting. Ends in an unlocked real session.
    pub fn complete_setup(
        &mut self,
        code: &str,
        confirm: &str,
        question: SecurityQuestion,
        answer: &str,
    ) -> Result<Session<'_>, VaultError> {
        let mut machine = AuthMachine::new(&self.state.credentials);
        machine.begin_setup(&self.state.credentials, code)?;
        machine.confirm(&self.state.credentials, confirm)?;
        let kind = machine.capture_question(&mut self.state.credentials, question, answer)?;
        Ok(self.open(kind))
    }

    /// Verify an entered code and open the universe it selects.
    pub fn unlock(&mut self, code: &str) -> Result<Session<'_>, VaultError> {
        let machine = AuthMachine::new(&self.state.credentials);
        let kind = machine.verify(&self.state.credentials, code)?;
        Ok(self.open(kind))
    }

    /// Security-question recovery. Always lands in the real universe.
    pub fn unlock_recovered(&mut self, answer: &str) -> Result<Session<'_>, VaultError> {
        let machine = AuthMachine::new(&self.state.credentials);
        let kind = machine.recover(&self.state.credentials, answer)?;
        Ok(self.open(kind))
    }

    fn open(&mut self, kind: SessionKind) -> Session<'_> {
        self.state.is_fake_session = kind.is_decoy();
        Session { vault: self, kind }
    }
}

/// One unlocked session.
///
/// The universe selector is resolved once, here, at unlock; every folder
/// operation goes through it, so the inactive universe is unreachable for
/// the session's lifetime and the two can never leak into each other.
/// Dropping (or explicitly closing) the session clears the decoy flag and
/// forces re-verification on the next open.
pub struct Session<'v> {
    vault: &'v mut Vault,
    kind: SessionKind,
}

impl Session<'_> {
    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn is_decoy(&self) -> bool {
        self.kind.is_decoy()
    }

    /// The whole-state snapshot, for hosts that persist after every
    /// mutation while the vault is open.
    pub fn state(&self) -> &AppState {
        &self.vault.state
    }

    fn shelf(&self) -> &Vec<VaultFolder> {
        match self.kind {
            SessionKind::Real => &self.vault.state.folders,
            SessionKind::Decoy => &self.vault.state.fake_folders,
        }
    }

    fn shelf_mut(&mut self) -> &mut Vec<VaultFolder> {
        match self.kind {
            SessionKind::Real => &mut self.vault.state.folders,
            SessionKind::Decoy => &mut self.vault.state.fake_folders,
        }
    }

    /// Every folder of the active universe, in append order.
    pub fn folders(&self) -> &[VaultFolder] {
        self.shelf()
    }

    /// Folders of one category, in append order.
    pub fn folders_by_category(&self, category: Category) -> Vec<&VaultFolder> {
        self.shelf()
            .iter()
            .filter(|f| f.category == category)
            .collect()
    }

    pub fn folder(&self, id: &str) -> Result<&VaultFolder, VaultError> {
        self.shelf()
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| VaultError::UnknownFolder(id.to_owned()))
    }

    pub fn folder_mut(&mut self, id: &str) -> Result<&mut VaultFolder, VaultError> {
        self.shelf_mut()
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| VaultError::UnknownFolder(id.to_owned()))
    }

    /// Append a new folder to the active universe and return its id.
    /// Duplicate names are permitted.
    pub fn create_folder(&mut self, name: &str, category: Category) -> String {
        let folder = VaultFolder::new(name.to_owned(), category);
        let id = folder.id.clone();
        self.shelf_mut().push(folder);
        id
    }

    /// Convert a batch of imported blobs and append them to the folder in
    /// one state update. Each blob converts independently; the append is
    /// whole-batch so the host never observes a partially imported list.
    pub fn import(&mut self, folder_id: &str, blobs: Vec<FileBlob>) -> Result<Vec<String>, VaultError> {
        let files: Vec<VaultFile> = blobs.into_iter().map(VaultFile::from_blob).collect();
        let ids: Vec<String> = files.iter().map(|f| f.id.clone()).collect();
        let folder = self.folder_mut(folder_id)?;
        folder.files.extend(files);
        Ok(ids)
    }

    /// Set or replace the duress code. Available from inside any unlocked
    /// session, exactly like the settings screen it models.
    pub fn set_decoy(&mut self, code: &str) -> Result<(), VaultError> {
        self.vault.state.credentials.set_decoy(code)
    }

    /// Replace the real code, gated on [`ChangeAuth`].
    pub fn change_pin(&mut self, auth: ChangeAuth<'_>, new_code: &str) -> Result<(), VaultError> {
        self.vault.state.credentials.change_password(auth, new_code)
    }

    /// Explicit vault close. Equivalent to dropping the session.
    pub fn close(self) {}
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        // Session teardown: the decoy overlay is discarded and the next
        // open starts from the lock screen again.
        self.vault.state.is_fake_session = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn armed_vault() -> Vault {
        let mut vault = Vault::new();
        let session = vault
            .complete_setup("1234", "1234", SecurityQuestion::FavoriteColor, "Blue")
            .unwrap();
        session.close();
        vault
    }

    #[test]
    fn setup_opens_a_real_session_and_flag_resets_on_close() {
        let mut vault = Vault::new();
        let session = vault
            .complete_setup("1234", "1234", SecurityQuestion::FavoriteColor, "Blue")
            .unwrap();
        assert_eq!(session.kind(), SessionKind::Real);
        session.close();
        assert!(!vault.state().is_fake_session);
        assert!(vault.is_set_up());
    }

    #[test]
    fn decoy_unlock_sets_the_session_flag_until_close() {
        let mut vault = armed_vault();
        {
            let mut session = vault.unlock("1234").unwrap();
            session.set_decoy("5678").unwrap();
        }
        let session = vault.unlock("5678").unwrap();
        assert!(session.is_decoy());
        assert!(session.state().is_fake_session);
        session.close();
        assert!(!vault.state().is_fake_session);
    }

    #[test]
    fn universes_do_not_leak_into_each_other() {
        let mut vault = armed_vault();
        {
            let mut session = vault.unlock("1234").unwrap();
            session.set_decoy("5678").unwrap();
            session.create_folder("Trips", Category::Photos);
        }
        {
            let mut session = vault.unlock("5678").unwrap();
            session.create_folder("Recipes", Category::Documents);
            assert!(session.folders().iter().all(|f| f.name != "Trips"));
        }
        let real = vault.unlock("1234").unwrap();
        assert!(real.folders().iter().any(|f| f.name == "Trips"));
        assert!(real.folders().iter().all(|f| f.name != "Recipes"));
    }

    #[test]
    fn recovery_session_is_real_and_can_change_the_pin() {
        let mut vault = armed_vault();
        {
            let mut session = vault.unlock("1234").unwrap();
            session.set_decoy("5678").unwrap();
        }
        let mut session = vault.unlock_recovered("blue").unwrap();
        assert_eq!(session.kind(), SessionKind::Real);
        session.change_pin(ChangeAuth::Recovered, "4321").unwrap();
        session.close();

        assert!(vault.unlock("1234").is_err());
        assert!(vault.unlock("4321").is_ok());
    }

    #[test]
    fn created_folders_keep_append_order_and_allow_duplicates() {
        let mut vault = armed_vault();
        let mut session = vault.unlock("1234").unwrap();
        session.create_folder("Trips", Category::Photos);
        session.create_folder("Trips", Category::Photos);
        let photos = session.folders_by_category(Category::Photos);
        let names: Vec<&str> = photos.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Gallery", "Trips", "Trips"]);
    }

    #[test]
    fn import_appends_all_blobs_in_one_update() {
        let mut vault = armed_vault();
        let mut session = vault.unlock("1234").unwrap();
        let folder_id = session.folders_by_category(Category::Photos)[0].id.clone();
        let blobs = vec![
            FileBlob {
                name: "a.png".to_owned(),
                mime_type: "image/png".to_owned(),
                bytes: vec![0xAA],
            },
            FileBlob {
                name: "b.png".to_owned(),
                mime_type: "image/png".to_owned(),
                bytes: vec![0xBB],
            },
        ];
        let ids = session.import(&folder_id, blobs).unwrap();
        assert_eq!(ids.len(), 2);
        let folder = session.folder(&folder_id).unwrap();
        assert_eq!(folder.files.len(), 2);
        assert!(folder.files.iter().all(|f| !f.is_deleted));
    }

    #[test]
    fn unknown_folder_is_an_error() {
        let mut vault = armed_vault();
        let mut session = vault.unlock("1234").unwrap();
        assert_eq!(
            session.import("missing", Vec::new()),
            Err(VaultError::UnknownFolder("missing".to_owned()))
        );
    }
}
