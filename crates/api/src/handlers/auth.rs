// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use checkin_domain::{DayWindow, Role};
use checkin_persistence::{Persistence, UserData};

use crate::auth::{AuthenticatedActor, AuthenticationService, TokenPair};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::request_response::{
    LocationResponse, LoginRequest, LoginResponse, UserResponse, WhoAmIResponse,
};

fn login_response(tokens: TokenPair, user: UserData) -> LoginResponse {
    LoginResponse {
        user: UserResponse::from(user),
        access_token: tokens.access_token,
        access_expires_at: tokens.access_expires_at,
        refresh_token: tokens.refresh_token,
        refresh_expires_at: tokens.refresh_expires_at,
    }
}

/// Authenticates a user and issues a token pair.
///
/// # Errors
///
/// Returns an error if the credentials are wrong or the sessions cannot be
/// stored.
pub fn login(
    persistence: &mut Persistence,
    config: &ApiConfig,
    request: &LoginRequest,
) -> Result<LoginResponse, ApiError> {
    let (tokens, user): (TokenPair, UserData) =
        AuthenticationService::login(persistence, config, &request.username, &request.password)?;
    Ok(login_response(tokens, user))
}

/// Rotates a refresh token into a new token pair.
///
/// # Errors
///
/// Returns an error if the refresh token is unknown, expired, or already
/// used.
pub fn refresh(
    persistence: &mut Persistence,
    config: &ApiConfig,
    refresh_token: &str,
) -> Result<LoginResponse, ApiError> {
    let (tokens, user): (TokenPair, UserData) =
        AuthenticationService::refresh(persistence, config, refresh_token)?;
    Ok(login_response(tokens, user))
}

/// Ends the sessions behind the presented tokens.
///
/// # Errors
///
/// Returns an error if the sessions cannot be deleted.
pub fn logout(
    persistence: &mut Persistence,
    access_token: Option<&str>,
    refresh_token: Option<&str>,
) -> Result<(), ApiError> {
    AuthenticationService::logout(persistence, access_token, refresh_token)?;
    Ok(())
}

/// Describes the current actor, including the location it owns if any.
///
/// # Errors
///
/// Returns an error if the account no longer exists.
pub fn whoami(
    persistence: &mut Persistence,
    config: &ApiConfig,
    actor: &AuthenticatedActor,
) -> Result<WhoAmIResponse, ApiError> {
    let user: UserData = persistence
        .get_user_by_id(actor.user_id)?
        .ok_or_else(|| ApiError::not_found("User", actor.user_id))?;

    let location: Option<LocationResponse> = if actor.role == Role::Location {
        let today: DayWindow = config.today()?;
        persistence
            .get_location_by_user(actor.user_id, &today)?
            .map(LocationResponse::from)
    } else {
        None
    };

    Ok(WhoAmIResponse {
        user: UserResponse::from(user),
        location,
    })
}
