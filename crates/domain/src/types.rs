// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Account roles.
///
/// Roles gate every API operation. A `Location` account belongs to exactly
/// one location and may only record check-ins there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Manages users, schools and locations.
    Admin,
    /// Reads locations, check-ins and statistics.
    Manager,
    /// The account owned by a single location (kiosk operator).
    Location,
}

impl Role {
    /// Converts this role to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Manager => "Manager",
            Self::Location => "Location",
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Self::Admin),
            "Manager" => Ok(Self::Manager),
            "Location" => Ok(Self::Location),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated login name.
///
/// Usernames are trimmed and lowercased so that uniqueness is
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    const MIN_LEN: usize = 3;
    const MAX_LEN: usize = 64;

    /// Validates and normalizes a username.
    ///
    /// # Errors
    ///
    /// Returns an error if the username is shorter than 3 or longer than 64
    /// characters, or contains characters other than `a-z`, `0-9`, `.`,
    /// `_` and `-`.
    pub fn new(raw: &str) -> Result<Self, DomainError> {
        let value: String = raw.trim().to_lowercase();
        let len: usize = value.chars().count();

        if len < Self::MIN_LEN || len > Self::MAX_LEN {
            return Err(DomainError::InvalidUsername(format!(
                "must be between {} and {} characters",
                Self::MIN_LEN,
                Self::MAX_LEN
            )));
        }

        if let Some(bad) = value
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
        {
            return Err(DomainError::InvalidUsername(format!(
                "character '{bad}' is not allowed"
            )));
        }

        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Converts a display name into its URL-safe normalized form.
///
/// The name is lowercased, every run of non-alphanumeric characters becomes
/// a single `-`, and leading and trailing separators are dropped. For
/// example `"  Zoo & Aquarium (North) "` becomes `"zoo-aquarium-north"`.
#[must_use]
pub fn normalize_location_name(name: &str) -> String {
    let mut normalized: String = String::with_capacity(name.len());
    let mut pending_separator: bool = false;

    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_separator && !normalized.is_empty() {
                normalized.push('-');
            }
            pending_separator = false;
            normalized.push(ch);
        } else {
            pending_separator = true;
        }
    }

    normalized
}

/// A validated location name together with its normalized form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationName {
    display: String,
    normalized: String,
}

impl LocationName {
    const MAX_LEN: usize = 100;

    /// Validates a location display name and derives its normalized name.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed name is empty, longer than 100
    /// characters, or contains no alphanumeric characters.
    pub fn new(raw: &str) -> Result<Self, DomainError> {
        let display: String = raw.trim().to_string();

        if display.is_empty() {
            return Err(DomainError::InvalidLocationName(String::from(
                "name cannot be empty",
            )));
        }
        if display.chars().count() > Self::MAX_LEN {
            return Err(DomainError::InvalidLocationName(format!(
                "name cannot exceed {} characters",
                Self::MAX_LEN
            )));
        }

        let normalized: String = normalize_location_name(&display);
        if normalized.is_empty() {
            return Err(DomainError::InvalidLocationName(format!(
                "'{display}' contains no letters or digits"
            )));
        }

        Ok(Self {
            display,
            normalized,
        })
    }

    #[must_use]
    pub fn display(&self) -> &str {
        &self.display
    }

    #[must_use]
    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

/// A validated school name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolName(String);

impl SchoolName {
    const MAX_LEN: usize = 100;

    /// Validates a school name.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed name is empty or longer than 100
    /// characters.
    pub fn new(raw: &str) -> Result<Self, DomainError> {
        let value: String = raw.trim().to_string();

        if value.is_empty() {
            return Err(DomainError::InvalidSchoolName(String::from(
                "name cannot be empty",
            )));
        }
        if value.chars().count() > Self::MAX_LEN {
            return Err(DomainError::InvalidSchoolName(format!(
                "name cannot exceed {} characters",
                Self::MAX_LEN
            )));
        }

        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The number of visitors a location admits per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Capacity(i32);

impl Capacity {
    /// Validates a capacity value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is negative or does not fit the stored
    /// integer width.
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value < 0 {
            return Err(DomainError::InvalidCapacity { value });
        }
        i32::try_from(value)
            .map(Self)
            .map_err(|_| DomainError::InvalidCapacity { value })
    }

    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}
