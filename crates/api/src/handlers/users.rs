// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User account handlers. Every operation here is Admin-only.

use checkin_domain::{Page, Role, Username};
use checkin_persistence::{Persistence, UserData, UserUpdate};
use tracing::info;

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::ApiError;
use crate::password_policy::PasswordPolicy;
use crate::request_response::{CreateUserRequest, ListQuery, UpdateUserRequest, UserResponse};

fn load_user(persistence: &mut Persistence, user_id: i64) -> Result<UserData, ApiError> {
    persistence
        .get_user_by_id(user_id)?
        .ok_or_else(|| ApiError::not_found("User", user_id))
}

fn parse_role(role: &str) -> Result<Role, ApiError> {
    let role: Role = role.parse()?;
    if role == Role::Location {
        return Err(ApiError::InvalidInput {
            field: String::from("role"),
            message: String::from("Location accounts are created together with their location"),
        });
    }
    Ok(role)
}

/// Lists user accounts.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the query is invalid.
pub fn list_users(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    query: &ListQuery,
) -> Result<Page<UserResponse>, ApiError> {
    AuthorizationService::authorize_manage_users(actor)?;
    let page: Page<UserData> = persistence.list_users(query.page_request()?, query.search())?;
    Ok(page.map(UserResponse::from))
}

/// Retrieves one user account.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the user does not exist.
pub fn get_user(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    user_id: i64,
) -> Result<UserResponse, ApiError> {
    AuthorizationService::authorize_manage_users(actor)?;
    Ok(UserResponse::from(load_user(persistence, user_id)?))
}

/// Creates an Admin or Manager account.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The username, role or password is invalid
/// - The username is taken
pub fn create_user(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &CreateUserRequest,
) -> Result<UserResponse, ApiError> {
    AuthorizationService::authorize_manage_users(actor)?;

    let username: Username = Username::new(&request.username)?;
    let role: Role = parse_role(&request.role)?;
    PasswordPolicy::default().validate(&request.password, username.as_str())?;

    if persistence.username_exists(username.as_str(), None)? {
        return Err(ApiError::Conflict {
            message: format!("Username '{username}' is already taken"),
        });
    }

    let user_id: i64 = persistence.create_user(username.as_str(), &request.password, role)?;
    info!(
        user_id,
        username = %username,
        role = %role,
        created_by = %actor.username,
        "Created user"
    );

    Ok(UserResponse::from(load_user(persistence, user_id)?))
}

/// Changes the username, password or role of an account.
///
/// A password change ends every session of the account.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The user does not exist
/// - A new value is invalid or the username is taken
/// - The change would move an account into or out of the Location role
/// - The change would leave no Admin
pub fn update_user(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    user_id: i64,
    request: &UpdateUserRequest,
) -> Result<UserResponse, ApiError> {
    AuthorizationService::authorize_manage_users(actor)?;
    let existing: UserData = load_user(persistence, user_id)?;

    let username: Option<Username> = request.username.as_deref().map(Username::new).transpose()?;
    if let Some(username) = &username
        && persistence.username_exists(username.as_str(), Some(user_id))?
    {
        return Err(ApiError::Conflict {
            message: format!("Username '{username}' is already taken"),
        });
    }

    let role: Option<Role> = request.role.as_deref().map(parse_role).transpose()?;
    if role.is_some() && existing.role == Role::Location.as_str() {
        return Err(ApiError::InvalidInput {
            field: String::from("role"),
            message: String::from("The role of a location account cannot change"),
        });
    }
    if let Some(role) = role
        && role != Role::Admin
        && existing.role == Role::Admin.as_str()
        && persistence.count_users_with_role(Role::Admin)? <= 1
    {
        return Err(ApiError::Conflict {
            message: String::from("At least one Admin account must remain"),
        });
    }

    if let Some(password) = &request.password {
        let effective: &str = username
            .as_ref()
            .map_or(existing.username.as_str(), Username::as_str);
        PasswordPolicy::default().validate(password, effective)?;
    }

    persistence.update_user(
        user_id,
        &UserUpdate {
            username: username.as_ref().map(Username::as_str),
            password: request.password.as_deref(),
            role: role.map(|r| r.as_str()),
        },
    )?;
    if request.password.is_some() {
        persistence.delete_sessions_for_user(user_id)?;
    }

    info!(user_id, updated_by = %actor.username, "Updated user");
    Ok(UserResponse::from(load_user(persistence, user_id)?))
}

/// Deletes an account that owns no location.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The actor targets its own account
/// - The user does not exist
/// - The user owns a location
pub fn delete_user(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    user_id: i64,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_users(actor)?;

    if user_id == actor.user_id {
        return Err(ApiError::Conflict {
            message: String::from("You cannot delete your own account"),
        });
    }
    load_user(persistence, user_id)?;

    persistence.delete_user(user_id)?;
    info!(user_id, deleted_by = %actor.username, "Deleted user");
    Ok(())
}
