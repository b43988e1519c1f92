// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction and token cookies.
//!
//! Browsers carry their tokens in `HttpOnly` cookies set at login. Other
//! clients send `Authorization: Bearer <token>`; when both are present the
//! header wins.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use checkin_api::{AuthenticatedActor, AuthenticationService};
use tracing::{debug, warn};

use crate::AppState;
use crate::error::HttpError;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Extractor for authenticated actors.
///
/// # Usage
///
/// ```ignore
/// async fn my_handler(
///     SessionActor(actor): SessionActor,
/// ) -> Result<Json<Response>, HttpError> {
///     Ok(Json(Response { ... }))
/// }
/// ```
///
/// # Errors
///
/// Rejects with HTTP 401 if no token is presented, the header is
/// malformed, or the access session is unknown or expired.
pub struct SessionActor(pub AuthenticatedActor);

impl FromRequestParts<AppState> for SessionActor {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token: String = bearer_token(&parts.headers)?
            .or_else(|| cookie_value(&parts.headers, ACCESS_COOKIE))
            .ok_or_else(|| {
                debug!("Request carries no access token");
                SessionError::MissingCredentials
            })?;

        let mut persistence = state.persistence.lock().await;
        let (actor, _user) = AuthenticationService::validate_access(&mut persistence, &token)
            .map_err(|e| {
                warn!(error = %e, "Session validation failed");
                SessionError::InvalidSession(e.to_string())
            })?;

        debug!(username = %actor.username, role = %actor.role, "Session validated");
        Ok(Self(actor))
    }
}

/// Reads `Authorization: Bearer <token>`.
///
/// # Errors
///
/// Returns an error if the header is present but not a Bearer token.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, SessionError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value: &str = value.to_str().map_err(|_| {
        warn!("Invalid Authorization header encoding");
        SessionError::InvalidAuthorizationHeader
    })?;
    let token: &str = value.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("Authorization header does not start with 'Bearer '");
        SessionError::InvalidAuthorizationHeader
    })?;
    Ok(Some(token.trim().to_string()))
}

pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

fn token_cookie(
    name: &'static str,
    value: String,
    max_age: time::Duration,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build()
}

/// Adds both token cookies to `jar`.
#[must_use]
pub fn set_token_cookies(
    jar: CookieJar,
    state: &AppState,
    access_token: String,
    refresh_token: String,
) -> CookieJar {
    jar.add(token_cookie(
        ACCESS_COOKIE,
        access_token,
        state.config.access_token_ttl,
        state.secure_cookies,
    ))
    .add(token_cookie(
        REFRESH_COOKIE,
        refresh_token,
        state.config.refresh_token_ttl,
        state.secure_cookies,
    ))
}

/// Expires both token cookies.
#[must_use]
pub fn clear_token_cookies(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(ACCESS_COOKIE).path("/"))
        .remove(Cookie::build(REFRESH_COOKIE).path("/"))
}

/// Session extraction errors.
#[derive(Debug)]
pub enum SessionError {
    /// Neither a Bearer header nor an access cookie was sent.
    MissingCredentials,
    /// Authorization header format is invalid.
    InvalidAuthorizationHeader,
    /// Session validation failed.
    InvalidSession(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let message: String = match self {
            Self::MissingCredentials => String::from("Authentication required"),
            Self::InvalidAuthorizationHeader => String::from(
                "Invalid Authorization header format. Expected: 'Bearer <token>'",
            ),
            Self::InvalidSession(reason) => format!("Session validation failed: {reason}"),
        };
        HttpError {
            status: StatusCode::UNAUTHORIZED,
            message,
        }
        .into_response()
    }
}
