// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use checkin_domain::DomainError;
use checkin_persistence::PersistenceError;
use tracing::error;

use crate::password_policy::PasswordPolicyError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The actor is authenticated but its role may not perform the action.
    Forbidden {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Forbidden {
                action,
                required_role,
            } => {
                write!(f, "Forbidden: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain and persistence errors and represent the
/// API contract. Each variant maps to exactly one HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed (401).
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The actor may not perform the action (403).
    Forbidden {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// Invalid input was provided (400).
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found (404).
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The request conflicts with existing data (409).
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// Password policy violation (400).
    PasswordPolicyViolation {
        /// A human-readable description of the policy violation.
        message: String,
    },
    /// An internal error occurred (500).
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Forbidden {
                action,
                required_role,
            } => {
                write!(f, "Forbidden: '{action}' requires {required_role} role")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::PasswordPolicyViolation { message } => {
                write!(f, "Password policy violation: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Builds a not-found error for a resource identified by ID.
    #[must_use]
    pub fn not_found(resource_type: &str, id: i64) -> Self {
        Self::ResourceNotFound {
            resource_type: resource_type.to_string(),
            message: format!("{resource_type} {id} does not exist"),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Forbidden {
                action,
                required_role,
            } => Self::Forbidden {
                action,
                required_role,
            },
        }
    }
}

impl From<PasswordPolicyError> for ApiError {
    fn from(err: PasswordPolicyError) -> Self {
        Self::PasswordPolicyViolation {
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        translate_domain_error(err)
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        translate_persistence_error(err)
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let field: &str = match &err {
        DomainError::InvalidUsername(_) => "username",
        DomainError::InvalidLocationName(_) | DomainError::InvalidSchoolName(_) => "name",
        DomainError::InvalidCapacity { .. } => "capacity",
        DomainError::InvalidRole(_) => "role",
        DomainError::InvalidPageRequest(_) => "page",
        DomainError::InvalidTimestamp { .. } => "timestamp",
        DomainError::InvalidDate { .. } | DomainError::DateOutOfRange { .. } => "date",
    };
    ApiError::InvalidInput {
        field: field.to_string(),
        message: err.to_string(),
    }
}

/// Translates a persistence error into an API error.
///
/// Constraint failures become conflicts; anything unexpected is logged and
/// reported as an internal error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::NotFound(message) => ApiError::ResourceNotFound {
            resource_type: String::from("Resource"),
            message,
        },
        PersistenceError::UniqueViolation(_) => ApiError::Conflict {
            message: String::from("A record with the same unique value already exists"),
        },
        PersistenceError::ForeignKeyViolation(_) => ApiError::Conflict {
            message: String::from("The request references a record that does not exist"),
        },
        PersistenceError::Referenced {
            entity,
            id,
            referenced_by,
        } => ApiError::Conflict {
            message: format!(
                "Cannot delete {entity} {id}: it is still referenced by {referenced_by}"
            ),
        },
        other => {
            error!(error = %other, "Persistence failure");
            ApiError::Internal {
                message: other.to_string(),
            }
        }
    }
}
