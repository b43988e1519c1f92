// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! REST endpoint handlers.
//!
//! Each handler locks persistence, runs one API operation, and releases
//! the lock before publishing any resulting snapshot.

use axum::{
    extract::State as AxumState,
    http::{HeaderMap, StatusCode},
};
use axum_extra::extract::cookie::CookieJar;
use checkin_api::{
    CheckInCreated, CheckInQuery, CheckInResponse, CreateCheckInRequest, CreateLocationRequest,
    CreateUserRequest, ListQuery, LocationChange, LocationResponse, LoginRequest, LoginResponse,
    MigrationsResponse, RunMigrationsResponse, SchoolRequest, SchoolResponse, StatsQuery,
    StatsResponse, UpdateLocationRequest, UpdateUserRequest, UserResponse, WhoAmIResponse,
};
use checkin_domain::{LocationSnapshot, Page};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::AppState;
use crate::error::HttpError;
use crate::extract::{Json, Path, Query};
use crate::session::{
    ACCESS_COOKIE, REFRESH_COOKIE, SessionActor, bearer_token, clear_token_cookies, cookie_value,
    set_token_cookies,
};

/// API response for the health probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Handler for GET `/health`.
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("ok"),
    })
}

/// Fallback for paths no route matches.
pub async fn handle_not_found() -> HttpError {
    HttpError::not_found("No such endpoint")
}

// ============================================================================
// Auth
// ============================================================================

/// Handler for POST `/auth/login`.
///
/// Sets both token cookies and returns the tokens in the body.
pub async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: LoginResponse = checkin_api::login(&mut persistence, &app_state.config, &req)?;
    drop(persistence);

    let jar: CookieJar = set_token_cookies(
        jar,
        &app_state,
        response.access_token.clone(),
        response.refresh_token.clone(),
    );
    Ok((jar, Json(response)))
}

/// Handler for POST `/auth/refresh`.
///
/// Accepts the refresh token from its cookie or as a Bearer header.
pub async fn handle_refresh(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Json<LoginResponse>), HttpError> {
    let token: String = bearer_token(&headers)
        .map_err(|_| HttpError::unauthorized("Invalid Authorization header"))?
        .or_else(|| cookie_value(&headers, REFRESH_COOKIE))
        .ok_or_else(|| HttpError::unauthorized("Refresh token required"))?;

    let mut persistence = app_state.persistence.lock().await;
    let response: LoginResponse =
        checkin_api::refresh(&mut persistence, &app_state.config, &token)?;
    drop(persistence);

    let jar: CookieJar = set_token_cookies(
        jar,
        &app_state,
        response.access_token.clone(),
        response.refresh_token.clone(),
    );
    Ok((jar, Json(response)))
}

/// Handler for POST `/auth/logout`.
///
/// Ends whichever sessions the request carries and clears the cookies.
pub async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), HttpError> {
    let access: Option<String> = bearer_token(&headers)
        .ok()
        .flatten()
        .or_else(|| cookie_value(&headers, ACCESS_COOKIE));
    let refresh: Option<String> = cookie_value(&headers, REFRESH_COOKIE);

    let mut persistence = app_state.persistence.lock().await;
    checkin_api::logout(&mut persistence, access.as_deref(), refresh.as_deref())?;
    drop(persistence);

    Ok((clear_token_cookies(jar), StatusCode::NO_CONTENT))
}

/// Handler for GET `/auth/me`.
pub async fn handle_whoami(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
) -> Result<Json<WhoAmIResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(checkin_api::whoami(
        &mut persistence,
        &app_state.config,
        &actor,
    )?))
}

// ============================================================================
// Users
// ============================================================================

pub async fn handle_list_users(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<UserResponse>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(checkin_api::list_users(&mut persistence, &actor, &query)?))
}

pub async fn handle_create_user(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let user: UserResponse = checkin_api::create_user(&mut persistence, &actor, &req)?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn handle_get_user(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(checkin_api::get_user(&mut persistence, &actor, user_id)?))
}

pub async fn handle_update_user(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(user_id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(checkin_api::update_user(
        &mut persistence,
        &actor,
        user_id,
        &req,
    )?))
}

pub async fn handle_delete_user(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    checkin_api::delete_user(&mut persistence, &actor, user_id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Schools
// ============================================================================

pub async fn handle_list_schools(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<SchoolResponse>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(checkin_api::list_schools(
        &mut persistence,
        &actor,
        &query,
    )?))
}

pub async fn handle_create_school(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<SchoolRequest>,
) -> Result<(StatusCode, Json<SchoolResponse>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let school: SchoolResponse = checkin_api::create_school(&mut persistence, &actor, &req)?;
    Ok((StatusCode::CREATED, Json(school)))
}

pub async fn handle_get_school(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(school_id): Path<i64>,
) -> Result<Json<SchoolResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(checkin_api::get_school(
        &mut persistence,
        &actor,
        school_id,
    )?))
}

pub async fn handle_update_school(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(school_id): Path<i64>,
    Json(req): Json<SchoolRequest>,
) -> Result<Json<SchoolResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(checkin_api::update_school(
        &mut persistence,
        &actor,
        school_id,
        &req,
    )?))
}

pub async fn handle_delete_school(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(school_id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    checkin_api::delete_school(&mut persistence, &actor, school_id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Locations
// ============================================================================

pub async fn handle_list_locations(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<LocationResponse>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(checkin_api::list_locations(
        &mut persistence,
        &app_state.config,
        &actor,
        &query,
    )?))
}

/// Handler for POST `/locations`.
///
/// Publishes the new location's snapshot.
pub async fn handle_create_location(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<CreateLocationRequest>,
) -> Result<(StatusCode, Json<LocationResponse>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let change: LocationChange =
        checkin_api::create_location(&mut persistence, &app_state.config, &actor, &req)?;
    drop(persistence);

    app_state.broadcaster.publish(change.snapshot);
    Ok((StatusCode::CREATED, Json(change.location)))
}

pub async fn handle_get_location(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(location_id): Path<i64>,
) -> Result<Json<LocationResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(checkin_api::get_location(
        &mut persistence,
        &app_state.config,
        &actor,
        location_id,
    )?))
}

/// Handler for GET `/locations/by-name/{name}`.
///
/// Public; used by kiosk displays before they subscribe.
pub async fn handle_get_location_by_name(
    AxumState(app_state): AxumState<AppState>,
    Path(name): Path<String>,
) -> Result<Json<LocationSnapshot>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(checkin_api::get_location_by_name(
        &mut persistence,
        &app_state.config,
        &name,
    )?))
}

/// Handler for PATCH `/locations/{id}`.
///
/// Publishes the updated snapshot, so a capacity change reaches kiosks
/// immediately.
pub async fn handle_update_location(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(location_id): Path<i64>,
    Json(req): Json<UpdateLocationRequest>,
) -> Result<Json<LocationResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let change: LocationChange = checkin_api::update_location(
        &mut persistence,
        &app_state.config,
        &actor,
        location_id,
        &req,
    )?;
    drop(persistence);

    app_state.broadcaster.publish(change.snapshot);
    Ok(Json(change.location))
}

pub async fn handle_delete_location(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(location_id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    checkin_api::delete_location(&mut persistence, &app_state.config, &actor, location_id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Check-ins
// ============================================================================

pub async fn handle_list_check_ins(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Query(query): Query<CheckInQuery>,
) -> Result<Json<Page<CheckInResponse>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(checkin_api::list_check_ins(
        &mut persistence,
        &app_state.config,
        &actor,
        &query,
    )?))
}

/// Handler for POST `/checkins`.
///
/// Publishes exactly one snapshot for the affected location.
pub async fn handle_create_check_in(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<CreateCheckInRequest>,
) -> Result<(StatusCode, Json<CheckInCreated>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let created: CheckInCreated =
        checkin_api::create_check_in(&mut persistence, &app_state.config, &actor, &req)?;
    drop(persistence);

    app_state.broadcaster.publish(created.snapshot.clone());
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn handle_delete_check_in(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(check_in_id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let snapshot: LocationSnapshot =
        checkin_api::delete_check_in(&mut persistence, &app_state.config, &actor, check_in_id)?;
    drop(persistence);

    app_state.broadcaster.publish(snapshot);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn handle_check_in_stats(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Query(query): Query<StatsQuery>,
) -> Result<Json<StatsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(checkin_api::check_in_stats(
        &mut persistence,
        &app_state.config,
        &actor,
        &query,
    )?))
}

// ============================================================================
// Migrations
// ============================================================================

pub async fn handle_list_migrations(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
) -> Result<Json<MigrationsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(checkin_api::list_migrations(&mut persistence, &actor)?))
}

pub async fn handle_run_migrations(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
) -> Result<Json<RunMigrationsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RunMigrationsResponse = checkin_api::run_migrations(&mut persistence, &actor)?;
    drop(persistence);

    info!(count = response.applied.len(), "Migrations run over HTTP");
    Ok(Json(response))
}
