//! Authentication state machine.
//!
//! Setup walks `Setup -> Confirm -> Question -> Verify`; once a code is
//! committed the machine starts in `Verify`, from which recovery is the
//! only side branch. The pending code captured during setup lives in a
//! [`Zeroizing`] buffer and is never persisted until the recovery question
//! commits it.

use zeroize::Zeroizing;

use crate::credentials::{CredentialSet, SecurityQuestion};
use crate::error::VaultError;

/// Outcome of a successful authentication: which folder universe the
/// session operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    /// Unlocked with the genuine code (or via recovery).
    Real,
    /// Unlocked with the duress code; the session sees the decoy universe.
    Decoy,
}

impl SessionKind {
    pub fn is_decoy(self) -> bool {
        matches!(self, SessionKind::Decoy)
    }
}

enum Stage {
    /// Awaiting the first entry of a new code.
    Setup,
    /// Awaiting the confirmation entry.
    Confirm { pending: Zeroizing<String> },
    /// Awaiting the recovery question and answer.
    Question { pending: Zeroizing<String> },
    /// A code is committed; entries are verified against it.
    Verify,
}

/// Drives the lock screen. Constructed fresh every time the vault is
/// opened; holds no durable state of its own.
pub struct AuthMachine {
    stage: Stage,
}

impl AuthMachine {
    pub fn new(creds: &CredentialSet) -> Self {
        let stage = if creds.is_password_set {
            Stage::Verify
        } else {
            Stage::Setup
        };
        Self { stage }
    }

    /// True while the machine waits for the confirmation entry.
    pub fn awaiting_confirmation(&self) -> bool {
        matches!(self.stage, Stage::Confirm { .. })
    }

    /// True while the machine waits for the recovery question.
    pub fn awaiting_question(&self) -> bool {
        matches!(self.stage, Stage::Question { .. })
    }

    /// First entry of a new code. Only legal while no code is set.
    pub fn begin_setup(&mut self, creds: &CredentialSet, code: &str) -> Result<(), VaultError> {
        if !matches!(self.stage, Stage::Setup) {
            return Err(VaultError::AlreadySetUp);
        }
        creds.check_code(code)?;
        self.stage = Stage::Confirm {
            pending: Zeroizing::new(code.to_owned()),
        };
        Ok(())
    }

    /// Confirmation entry. A mismatch discards the pending code and
    /// restarts setup from the first entry; the process itself carries on.
    pub fn confirm(&mut self, creds: &CredentialSet, code: &str) -> Result<(), VaultError> {
        let pending = match std::mem::replace(&mut self.stage, Stage::Setup) {
            Stage::Confirm { pending } => pending,
            other => {
                self.stage = other;
                return Err(VaultError::NotSetUp);
            }
        };
        if let Err(err) = creds.check_code(code) {
            self.stage = Stage::Confirm { pending };
            return Err(err);
        }
        if code != pending.as_str() {
            // Stage is already back at Setup: both codes must be re-entered.
            return Err(VaultError::ConfirmMismatch);
        }
        self.stage = Stage::Question { pending };
        Ok(())
    }

    /// Commit the pending code together with the recovery question. First
    /// setup drops straight into the vault, always as a real session.
    pub fn capture_question(
        &mut self,
        creds: &mut CredentialSet,
        question: SecurityQuestion,
        answer: &str,
    ) -> Result<SessionKind, VaultError> {
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(VaultError::EmptyAnswer);
        }
        let pending = match std::mem::replace(&mut self.stage, Stage::Verify) {
            Stage::Question { pending } => pending,
            other => {
                self.stage = other;
                return Err(VaultError::NotSetUp);
            }
        };
        creds.arm(pending.to_string(), question, answer.to_owned());
        Ok(SessionKind::Real)
    }

    /// Compare an entered code against the stored credentials. The stored
    /// set is never modified, whatever the outcome.
    pub fn verify(&self, creds: &CredentialSet, code: &str) -> Result<SessionKind, VaultError> {
        if !creds.is_password_set {
            return Err(VaultError::NotSetUp);
        }
        creds.check_code(code)?;
        if creds.password.as_deref() == Some(code) {
            return Ok(SessionKind::Real);
        }
        match creds.fake_password.as_deref() {
            Some(fake) if fake == code => Ok(SessionKind::Decoy),
            _ => Err(VaultError::WrongCredential),
        }
    }

    /// Security-question fallback: trimmed, case-insensitive comparison.
    /// A match unlocks a real session without the code; the decoy universe
    /// is unreachable on this path.
    pub fn recover(&self, creds: &CredentialSet, answer: &str) -> Result<SessionKind, VaultError> {
        let stored = creds
            .security_answer
            .as_deref()
            .ok_or(VaultError::WrongAnswer)?;
        if answer.trim().to_lowercase() == stored.trim().to_lowercase() {
            Ok(SessionKind::Real)
        } else {
            Err(VaultError::WrongAnswer)
        }
    }
}
