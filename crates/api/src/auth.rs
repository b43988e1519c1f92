// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.
//!
//! Sessions are opaque random tokens stored server-side. A login issues a
//! pair: a short-lived access token presented on every request and a
//! longer-lived refresh token that can be exchanged once for a new pair.

use checkin_domain::{Role, Username, format_timestamp, parse_timestamp};
use checkin_persistence::{Persistence, PersistenceError, SessionData, SessionKind, UserData};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::config::ApiConfig;
use crate::error::AuthError;

/// An authenticated actor with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The user ID behind this actor.
    pub user_id: i64,
    /// The normalized username.
    pub username: String,
    /// The role assigned to this actor.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    #[must_use]
    pub const fn new(user_id: i64, username: String, role: Role) -> Self {
        Self {
            user_id,
            username,
            role,
        }
    }

    fn from_user(user: &UserData) -> Result<Self, AuthError> {
        let role: Role = user
            .role
            .parse()
            .map_err(|_| AuthError::AuthenticationFailed {
                reason: format!("Invalid role: {}", user.role),
            })?;
        Ok(Self::new(user.user_id, user.username.clone(), role))
    }
}

/// An issued access/refresh token pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub access_expires_at: String,
    pub refresh_token: String,
    pub refresh_expires_at: String,
}

/// Authorization service for enforcing role-based access control.
///
/// This service determines whether an authenticated actor has permission
/// to perform a specific action based on their role.
pub struct AuthorizationService;

impl AuthorizationService {
    fn require(
        actor: &AuthenticatedActor,
        action: &str,
        allowed: &[Role],
    ) -> Result<(), AuthError> {
        if allowed.contains(&actor.role) {
            return Ok(());
        }
        let required_role: String = allowed
            .iter()
            .map(Role::as_str)
            .collect::<Vec<&str>>()
            .join(" or ");
        warn!(
            username = %actor.username,
            role = %actor.role,
            action,
            "Authorization denied"
        );
        Err(AuthError::Forbidden {
            action: action.to_string(),
            required_role,
        })
    }

    /// Only Admin actors may manage user accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_manage_users(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, "manage_users", &[Role::Admin])
    }

    /// Only Admin actors may create, rename or delete schools.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_manage_schools(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, "manage_schools", &[Role::Admin])
    }

    /// Only Admin actors may create, update or delete locations.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_manage_locations(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, "manage_locations", &[Role::Admin])
    }

    /// Admin and Manager actors may list every location.
    ///
    /// # Errors
    ///
    /// Returns an error for Location actors.
    pub fn authorize_view_locations(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, "view_locations", &[Role::Admin, Role::Manager])
    }

    /// Admin and Manager actors may see any location; a Location actor may
    /// see only the location it owns.
    ///
    /// # Errors
    ///
    /// Returns an error if a Location actor asks for another location.
    pub fn authorize_view_location(
        actor: &AuthenticatedActor,
        owner_user_id: i64,
    ) -> Result<(), AuthError> {
        if actor.role == Role::Location && actor.user_id == owner_user_id {
            return Ok(());
        }
        Self::authorize_view_locations(actor)
    }

    /// Admin and Location actors may record check-ins.
    ///
    /// # Errors
    ///
    /// Returns an error for Manager actors.
    pub fn authorize_create_check_in(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, "create_check_in", &[Role::Admin, Role::Location])
    }

    /// Admin and Manager actors may read check-ins and statistics.
    ///
    /// # Errors
    ///
    /// Returns an error for Location actors.
    pub fn authorize_view_check_ins(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, "view_check_ins", &[Role::Admin, Role::Manager])
    }

    /// Only Admin actors may delete check-ins.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_delete_check_in(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, "delete_check_in", &[Role::Admin])
    }

    /// Only Admin actors may inspect or run migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_migrations(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, "migrations", &[Role::Admin])
    }
}

/// Authentication service for token-based sessions.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Authenticates a user by password and issues a token pair.
    ///
    /// Unknown users and wrong passwords fail identically.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails.
    pub fn login(
        persistence: &mut Persistence,
        config: &ApiConfig,
        username: &str,
        password: &str,
    ) -> Result<(TokenPair, UserData), AuthError> {
        let invalid = || AuthError::AuthenticationFailed {
            reason: String::from("Invalid username or password"),
        };

        let username: Username = Username::new(username).map_err(|_| invalid())?;
        let user: UserData = persistence
            .get_user_by_username(username.as_str())
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| {
                warn!(username = %username, "Login for unknown user");
                invalid()
            })?;

        let verified: bool = Persistence::verify_password(password, &user.password_hash)
            .map_err(Self::map_persistence_error)?;
        if !verified {
            warn!(username = %username, "Login with wrong password");
            return Err(invalid());
        }

        let now: OffsetDateTime = OffsetDateTime::now_utc();
        let now_str: String = Self::format(now)?;
        persistence
            .delete_expired_sessions(&now_str)
            .map_err(Self::map_persistence_error)?;

        let tokens: TokenPair = Self::issue_pair(persistence, config, user.user_id, now)?;
        persistence
            .record_login(user.user_id, &now_str)
            .map_err(Self::map_persistence_error)?;

        info!(user_id = user.user_id, username = %user.username, "User logged in");
        Ok((tokens, user))
    }

    /// Exchanges a refresh token for a new pair.
    ///
    /// The presented refresh session is deleted, so each refresh token works
    /// once.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is unknown, expired, or not a refresh
    /// token.
    pub fn refresh(
        persistence: &mut Persistence,
        config: &ApiConfig,
        refresh_token: &str,
    ) -> Result<(TokenPair, UserData), AuthError> {
        let session: SessionData =
            Self::live_session(persistence, refresh_token, SessionKind::Refresh)?;

        persistence
            .delete_session(refresh_token)
            .map_err(Self::map_persistence_error)?;

        let user: UserData = persistence
            .get_user_by_id(session.user_id)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("User not found"),
            })?;

        let tokens: TokenPair =
            Self::issue_pair(persistence, config, user.user_id, OffsetDateTime::now_utc())?;
        debug!(user_id = user.user_id, "Rotated refresh token");
        Ok((tokens, user))
    }

    /// Validates an access token and returns the authenticated actor.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is unknown, expired, or not an access
    /// token.
    pub fn validate_access(
        persistence: &mut Persistence,
        access_token: &str,
    ) -> Result<(AuthenticatedActor, UserData), AuthError> {
        let session: SessionData =
            Self::live_session(persistence, access_token, SessionKind::Access)?;

        let user: UserData = persistence
            .get_user_by_id(session.user_id)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("User not found"),
            })?;

        let actor: AuthenticatedActor = AuthenticatedActor::from_user(&user)?;
        Ok((actor, user))
    }

    /// Deletes whichever of the given sessions exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn logout(
        persistence: &mut Persistence,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> Result<(), AuthError> {
        for token in [access_token, refresh_token].into_iter().flatten() {
            persistence
                .delete_session(token)
                .map_err(Self::map_persistence_error)?;
        }
        Ok(())
    }

    /// Generates an opaque session token of 256 random bits.
    #[must_use]
    pub fn generate_session_token() -> String {
        format!(
            "{:032x}{:032x}",
            rand::random::<u128>(),
            rand::random::<u128>()
        )
    }

    fn issue_pair(
        persistence: &mut Persistence,
        config: &ApiConfig,
        user_id: i64,
        now: OffsetDateTime,
    ) -> Result<TokenPair, AuthError> {
        let access_token: String = Self::generate_session_token();
        let refresh_token: String = Self::generate_session_token();
        let access_expires_at: String = Self::format(now + config.access_token_ttl)?;
        let refresh_expires_at: String = Self::format(now + config.refresh_token_ttl)?;

        persistence
            .create_session(
                &access_token,
                SessionKind::Access,
                user_id,
                &access_expires_at,
            )
            .map_err(Self::map_persistence_error)?;
        persistence
            .create_session(
                &refresh_token,
                SessionKind::Refresh,
                user_id,
                &refresh_expires_at,
            )
            .map_err(Self::map_persistence_error)?;

        Ok(TokenPair {
            access_token,
            access_expires_at,
            refresh_token,
            refresh_expires_at,
        })
    }

    /// Looks up a session of the expected kind, deleting it if expired.
    fn live_session(
        persistence: &mut Persistence,
        token: &str,
        kind: SessionKind,
    ) -> Result<SessionData, AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        if SessionKind::parse(&session.kind) != Some(kind) {
            warn!(
                expected = kind.as_str(),
                found = %session.kind,
                "Token presented for the wrong purpose"
            );
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            });
        }

        let expires_at: OffsetDateTime =
            parse_timestamp(&session.expires_at).map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to parse session expiration: {e}"),
            })?;
        if OffsetDateTime::now_utc() >= expires_at {
            persistence
                .delete_session(token)
                .map_err(Self::map_persistence_error)?;
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        Ok(session)
    }

    fn format(instant: OffsetDateTime) -> Result<String, AuthError> {
        format_timestamp(instant).map_err(|e| AuthError::AuthenticationFailed {
            reason: format!("Failed to format expiration time: {e}"),
        })
    }

    /// Maps persistence errors to authentication errors.
    fn map_persistence_error(err: PersistenceError) -> AuthError {
        AuthError::AuthenticationFailed {
            reason: format!("Database error: {err}"),
        }
    }
}
