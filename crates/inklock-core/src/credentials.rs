//! Stored credentials and the mutations that keep them consistent.
//!
//! Comparison is plaintext equality. This mirrors the behaviour of the
//! application this crate replaces and is a known weakness, not an
//! oversight; do not reuse this store for anything that needs secrecy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VaultError;

/// Digit count for vault codes. Fixed once the first code is committed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "u8", into = "u8")]
pub enum PinLength {
    #[default]
    Four,
    Six,
}

impl PinLength {
    pub fn digits(self) -> u8 {
        match self {
            PinLength::Four => 4,
            PinLength::Six => 6,
        }
    }
}

impl From<PinLength> for u8 {
    fn from(length: PinLength) -> u8 {
        length.digits()
    }
}

impl TryFrom<u8> for PinLength {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(PinLength::Four),
            6 => Ok(PinLength::Six),
            other => Err(format!("unsupported code length: {other}")),
        }
    }
}

impl fmt::Display for PinLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.digits())
    }
}

/// Fixed set of recovery questions offered during setup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SecurityQuestion {
    #[serde(rename = "What is your favorite color?")]
    FavoriteColor,
    #[serde(rename = "What was the name of your first school?")]
    FirstSchool,
    #[serde(rename = "What is your favorite food?")]
    FavoriteFood,
    #[serde(rename = "What was your childhood nickname?")]
    ChildhoodNickname,
    #[serde(rename = "Who is your favorite player?")]
    FavoritePlayer,
}

impl SecurityQuestion {
    pub const ALL: [SecurityQuestion; 5] = [
        SecurityQuestion::FavoriteColor,
        SecurityQuestion::FirstSchool,
        SecurityQuestion::FavoriteFood,
        SecurityQuestion::ChildhoodNickname,
        SecurityQuestion::FavoritePlayer,
    ];

    pub fn prompt(self) -> &'static str {
        match self {
            SecurityQuestion::FavoriteColor => "What is your favorite color?",
            SecurityQuestion::FirstSchool => "What was the name of your first school?",
            SecurityQuestion::FavoriteFood => "What is your favorite food?",
            SecurityQuestion::ChildhoodNickname => "What was your childhood nickname?",
            SecurityQuestion::FavoritePlayer => "Who is your favorite player?",
        }
    }

    /// Stable machine-readable key, used by hosts for flags and config.
    pub fn key(self) -> &'static str {
        match self {
            SecurityQuestion::FavoriteColor => "favorite-color",
            SecurityQuestion::FirstSchool => "first-school",
            SecurityQuestion::FavoriteFood => "favorite-food",
            SecurityQuestion::ChildhoodNickname => "childhood-nickname",
            SecurityQuestion::FavoritePlayer => "favorite-player",
        }
    }
}

impl fmt::Display for SecurityQuestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prompt())
    }
}

impl FromStr for SecurityQuestion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SecurityQuestion::ALL
            .into_iter()
            .find(|q| q.key() == s)
            .ok_or_else(|| format!("unknown security question: {s}"))
    }
}

/// Proof presented when changing the real code.
#[derive(Debug, Clone, Copy)]
pub enum ChangeAuth<'a> {
    /// The current real code, entered by the user. The decoy code does not
    /// pass this gate.
    Current(&'a str),
    /// Recovery-granted bypass: the caller has already matched the
    /// security answer.
    Recovered,
}

/// The stored credential set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSet {
    pub is_password_set: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fake_password: Option<String>,
    #[serde(default)]
    pub password_length: PinLength,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_question: Option<SecurityQuestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_answer: Option<String>,
}

impl CredentialSet {
    /// Validate that `code` is exactly the configured number of ASCII
    /// digits.
    pub(crate) fn check_code(&self, code: &str) -> Result<(), VaultError> {
        let expected = self.password_length.digits();
        if code.len() != expected as usize || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(VaultError::BadCode { expected });
        }
        Ok(())
    }

    /// Commit the credentials captured by the setup flow.
    pub(crate) fn arm(&mut self, code: String, question: SecurityQuestion, answer: String) {
        self.password = Some(code);
        self.security_question = Some(question);
        self.security_answer = Some(answer);
        self.is_password_set = true;
    }

    /// Replace the real code. Requires the current code (or a recovery
    /// bypass) and rejects a collision with the decoy code; the decoy and
    /// the recovery question are untouched.
    pub fn change_password(&mut self, auth: ChangeAuth<'_>, new_code: &str) -> Result<(), VaultError> {
        if !self.is_password_set {
            return Err(VaultError::NotSetUp);
        }
        if let ChangeAuth::Current(current) = auth {
            self.check_code(current)?;
            if self.password.as_deref() != Some(current) {
                return Err(VaultError::WrongCredential);
            }
        }
        self.check_code(new_code)?;
        if self.fake_password.as_deref() == Some(new_code) {
            return Err(VaultError::PasswordCollision);
        }
        self.password = Some(new_code.to_owned());
        Ok(())
    }

    /// Set or replace the duress code that opens the decoy universe.
    /// Rejects a collision with the real code.
    pub fn set_decoy(&mut self, code: &str) -> Result<(), VaultError> {
        if !self.is_password_set {
            return Err(VaultError::NotSetUp);
        }
        self.check_code(code)?;
        if self.password.as_deref() == Some(code) {
            return Err(VaultError::PasswordCollision);
        }
        self.fake_password = Some(code.to_owned());
        Ok(())
    }

    /// Switch between 4 and 6 digit codes. Only permitted before the first
    /// code is committed.
    pub fn set_length(&mut self, length: PinLength) -> Result<(), VaultError> {
        if self.is_password_set {
            return Err(VaultError::LengthLocked);
        }
        self.password_length = length;
        Ok(())
    }
}
