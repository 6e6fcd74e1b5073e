use thiserror::Error;

/// Errors surfaced by the vault core.
///
/// Every credential-comparison failure here is recoverable: the caller
/// clears the entered code and re-prompts. None of them are fatal to the
/// process, and repeated failures are deliberately unthrottled.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VaultError {
    #[error("wrong credential")]
    WrongCredential,

    #[error("wrong recovery answer")]
    WrongAnswer,

    #[error("codes do not match, setup restarts from the first entry")]
    ConfirmMismatch,

    #[error("real and decoy codes must differ")]
    PasswordCollision,

    #[error("code must be exactly {expected} digits")]
    BadCode { expected: u8 },

    #[error("security answer must not be empty")]
    EmptyAnswer,

    #[error("code length is fixed once a code has been set")]
    LengthLocked,

    #[error("no code has been set up yet")]
    NotSetUp,

    #[error("a code has already been set up")]
    AlreadySetUp,

    #[error("unknown folder: {0}")]
    UnknownFolder(String),

    #[error("file is not in the current view: {0}")]
    NotInView(String),

    #[error("operation is not available in this view")]
    WrongView,
}

/// Persistence gateway failures.
///
/// A load failure is recovered by falling back to a default state; a save
/// failure is logged and otherwise ignored.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),
}
