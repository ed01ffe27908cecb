//! Passwords: a strength check when an account is registered and a bcrypt
//! hash once it is stored.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use zxcvbn::{Score, zxcvbn};

use crate::Error;

/// The lowest zxcvbn score a new password may have.
const MINIMUM_SCORE: Score = Score::Three;

/// Shown when zxcvbn rejects a password without giving any advice.
const GENERIC_ADVICE: &str = "Add another word or two. Uncommon words are better.";

/// A plain text password that is hard enough to guess to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Check `password` with zxcvbn.
    ///
    /// `user_inputs` are things an attacker could know about the user, such
    /// as their name and email, so reusing them makes a password weaker.
    ///
    /// # Errors
    ///
    /// Returns an [Error::TooWeak] with zxcvbn's advice for a stronger password.
    pub fn new(password: &str, user_inputs: &[&str]) -> Result<Self, Error> {
        let entropy = zxcvbn(password, user_inputs);

        if entropy.score() >= MINIMUM_SCORE {
            return Ok(Self(password.to_owned()));
        }

        let advice = entropy
            .feedback()
            .map(ToString::to_string)
            .filter(|advice| !advice.trim().is_empty())
            .unwrap_or_else(|| GENERIC_ADVICE.to_owned());

        Err(Error::TooWeak(advice))
    }

    /// Skip the strength check, e.g. for test fixtures.
    pub fn new_unchecked(password: &str) -> Self {
        Self(password.to_owned())
    }
}

impl Display for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("********")
    }
}

/// A salted bcrypt hash of a user's password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// The bcrypt work factor used outside of tests.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash `password` with the bcrypt work factor `cost`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::HashingError] if bcrypt fails.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        bcrypt::hash(password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Wrap a hash read back from the `user` table.
    pub fn new_unchecked(password_hash: &str) -> Self {
        Self(password_hash.to_owned())
    }

    /// Whether `password` is the one this hash was made from.
    ///
    /// # Errors
    ///
    /// Returns an [Error::HashingError] if the stored hash is malformed.
    pub fn verify(&self, password: &str) -> Result<bool, Error> {
        bcrypt::verify(password, &self.0).map_err(|error| Error::HashingError(error.to_string()))
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
