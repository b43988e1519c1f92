// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use thiserror::Error;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Username is empty, too short, too long, or has forbidden characters.
    #[error("Invalid username: {0}")]
    InvalidUsername(String),
    /// Location name is empty or normalizes to nothing.
    #[error("Invalid location name: {0}")]
    InvalidLocationName(String),
    /// School name is empty or too long.
    #[error("Invalid school name: {0}")]
    InvalidSchoolName(String),
    /// Capacity was negative or too large to store.
    #[error("Invalid capacity {value}: capacity must be between 0 and 2147483647")]
    InvalidCapacity {
        /// The rejected value.
        value: i64,
    },
    /// Role string did not match a known role.
    #[error("Invalid role '{0}'. Must be one of Admin, Manager, Location")]
    InvalidRole(String),
    /// Pagination parameters were out of range.
    #[error("Invalid page request: {0}")]
    InvalidPageRequest(String),
    /// A timestamp could not be parsed or formatted.
    #[error("Invalid timestamp '{value}': {reason}")]
    InvalidTimestamp {
        /// The offending value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
    /// A calendar date was not in `YYYY-MM-DD` layout.
    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate {
        /// The offending value.
        value: String,
    },
    /// Date arithmetic left the supported calendar range.
    #[error("Date out of range while {operation}")]
    DateOutOfRange {
        /// The operation being performed.
        operation: &'static str,
    },
}
