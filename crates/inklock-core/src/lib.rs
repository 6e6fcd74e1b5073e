//! inklock-core: the hidden vault behind a notes front.
//!
//! # Access control
//! A digit code gates the vault. A second, decoy code opens a separate,
//! independently persisted folder universe for use under duress; which
//! universe a session sees is decided once, at unlock, and held by the
//! session for its whole lifetime. A security question recovers access to
//! the real universe when the code is forgotten.
//!
//! Codes are stored and compared as plaintext. That mirrors the
//! application this replaces and is a documented weakness, not an
//! invitation: nothing in this crate provides cryptographic protection.
//! There is also no lockout; wrong entries can be retried forever.
//!
//! # Persistence
//! The whole application state is one JSON snapshot, written and read as a
//! unit by [`store::SnapshotStore`]. The decoy-session flag never reaches
//! disk: it is skipped on save and reset on load, so a decoy session can
//! never survive a restart.

pub mod auth;
pub mod browser;
pub mod credentials;
pub mod error;
pub mod files;
pub mod folders;
pub mod paths;
pub mod session;
pub mod state;
pub mod store;

pub use auth::{AuthMachine, SessionKind};
pub use browser::{Browser, FileView};
pub use credentials::{ChangeAuth, CredentialSet, PinLength, SecurityQuestion};
pub use error::{StoreError, VaultError};
pub use files::{Exporter, FileBlob, VaultFile};
pub use folders::{Category, VaultFolder};
pub use session::{Session, Vault};
pub use state::AppState;
pub use store::SnapshotStore;
