//! Whole-application snapshot.

use serde::{Deserialize, Serialize};

use crate::credentials::CredentialSet;
use crate::folders::{default_folders, VaultFolder};

/// Aggregate state: credentials, both folder universes, the onboarding
/// flag and the volatile session flag.
///
/// `is_fake_session` is runtime-only. `#[serde(skip)]` keeps it out of
/// every persisted snapshot and resets it to `false` on every load, so a
/// decoy session is strictly an in-memory overlay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(flatten)]
    pub credentials: CredentialSet,
    pub folders: Vec<VaultFolder>,
    pub fake_folders: Vec<VaultFolder>,
    #[serde(default = "default_show_onboarding")]
    pub show_onboarding: bool,
    #[serde(skip)]
    pub is_fake_session: bool,
}

fn default_show_onboarding() -> bool {
    true
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            credentials: CredentialSet::default(),
            folders: default_folders(),
            fake_folders: default_folders(),
            show_onboarding: true,
            is_fake_session: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_flag_never_reaches_the_wire() {
        let mut state = AppState::default();
        state.is_fake_session = true;
        let value = serde_json::to_value(&state).unwrap();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("isFakeSession"));

        let reloaded: AppState = serde_json::from_value(value).unwrap();
        assert!(!reloaded.is_fake_session);
    }

    #[test]
    fn wire_keys_match_the_persisted_record() {
        let state = AppState::default();
        let value = serde_json::to_value(&state).unwrap();
        let obj = value.as_object().unwrap();
        for key in ["isPasswordSet", "passwordLength", "folders", "fakeFolders", "showOnboarding"] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
    }

    #[test]
    fn both_universes_start_seeded_and_disjoint() {
        let state = AppState::default();
        assert_eq!(state.folders.len(), 4);
        assert_eq!(state.fake_folders.len(), 4);
        for real in &state.folders {
            assert!(state.fake_folders.iter().all(|fake| fake.id != real.id));
        }
    }

    #[test]
    fn unknown_snapshot_keys_are_tolerated() {
        // Records written by older front-ends carry extra fields (notes,
        // view flags); loading must not choke on them.
        let json = serde_json::json!({
            "isPasswordSet": false,
            "passwordLength": 4,
            "folders": [],
            "fakeFolders": [],
            "showOnboarding": false,
            "isVaultOpen": true,
            "notes": [{"id": "1", "title": "x"}]
        });
        let state: AppState = serde_json::from_value(json).unwrap();
        assert!(!state.show_onboarding);
        assert!(!state.is_fake_session);
    }
}
