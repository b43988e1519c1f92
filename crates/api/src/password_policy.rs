// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Password policy validation.
//!
//! This module enforces password requirements for every account, including
//! the accounts owned by locations.

use thiserror::Error;

/// Password policy errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    /// Password is too short.
    #[error("Password must be at least {min_length} characters long")]
    TooShort { min_length: usize },

    /// Password is too long for bcrypt to hash without truncation.
    #[error("Password must be at most {max_length} bytes long")]
    TooLong { max_length: usize },

    /// Password matches the account username.
    #[error("Password must not match the username")]
    MatchesUsername,
}

/// Password policy configuration.
pub struct PasswordPolicy {
    /// Minimum password length in characters.
    pub min_length: usize,
    /// Maximum password length in bytes.
    pub max_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 72,
        }
    }
}

impl PasswordPolicy {
    /// Validates a password against the policy.
    ///
    /// # Arguments
    ///
    /// * `password` - The password to validate
    /// * `username` - The account username (password must not match)
    ///
    /// # Errors
    ///
    /// Returns a `PasswordPolicyError` if the password does not meet policy requirements.
    pub fn validate(&self, password: &str, username: &str) -> Result<(), PasswordPolicyError> {
        if password.chars().count() < self.min_length {
            return Err(PasswordPolicyError::TooShort {
                min_length: self.min_length,
            });
        }

        if password.len() > self.max_length {
            return Err(PasswordPolicyError::TooLong {
                max_length: self.max_length,
            });
        }

        if password.to_lowercase() == username.to_lowercase() {
            return Err(PasswordPolicyError::MatchesUsername);
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_password() {
        let policy: PasswordPolicy = PasswordPolicy::default();
        assert!(policy.validate("kiosk-pass", "gym-kiosk").is_ok());
        assert!(policy.validate("12345678", "alice").is_ok());
    }

    #[test]
    fn test_password_too_short() {
        let policy: PasswordPolicy = PasswordPolicy::default();
        assert_eq!(
            policy.validate("short", "alice"),
            Err(PasswordPolicyError::TooShort { min_length: 8 })
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let policy: PasswordPolicy = PasswordPolicy::default();
        // Seven characters, fourteen bytes.
        assert!(policy.validate("ééééééé", "alice").is_err());
        assert!(policy.validate("éééééééé", "alice").is_ok());
    }

    #[test]
    fn test_password_too_long() {
        let policy: PasswordPolicy = PasswordPolicy::default();
        let long: String = "x".repeat(73);
        assert_eq!(
            policy.validate(&long, "alice"),
            Err(PasswordPolicyError::TooLong { max_length: 72 })
        );
    }

    #[test]
    fn test_password_matching_username_is_rejected() {
        let policy: PasswordPolicy = PasswordPolicy::default();
        assert_eq!(
            policy.validate("Administrator", "administrator"),
            Err(PasswordPolicyError::MatchesUsername)
        );
    }
}
