// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use checkin_domain::{
    Capacity, DayWindow, LocationName, LocationSnapshot, Page, Username, normalize_location_name,
};
use checkin_persistence::{LocationData, LocationUpdate, NewLocation, Persistence};
use tracing::{debug, info};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::password_policy::PasswordPolicy;
use crate::request_response::{
    CreateLocationRequest, ListQuery, LocationChange, LocationResponse, UpdateLocationRequest,
};

/// Loads a location with today's derived occupancy.
///
/// # Errors
///
/// Returns an error if the location does not exist.
pub(crate) fn load_location(
    persistence: &mut Persistence,
    today: &DayWindow,
    location_id: i64,
) -> Result<LocationData, ApiError> {
    persistence
        .get_location(location_id, today)?
        .ok_or_else(|| ApiError::not_found("Location", location_id))
}

/// Computes the current snapshot of a location.
///
/// # Errors
///
/// Returns an error if the location does not exist.
pub(crate) fn location_snapshot(
    persistence: &mut Persistence,
    config: &ApiConfig,
    location_id: i64,
) -> Result<LocationSnapshot, ApiError> {
    let today: DayWindow = config.today()?;
    Ok(load_location(persistence, &today, location_id)?.snapshot())
}

fn change(location: LocationData) -> LocationChange {
    let snapshot: LocationSnapshot = location.snapshot();
    LocationChange {
        location: LocationResponse::from(location),
        snapshot,
    }
}

fn ensure_username_free(
    persistence: &mut Persistence,
    username: &Username,
    excluding_user_id: Option<i64>,
) -> Result<(), ApiError> {
    if persistence.username_exists(username.as_str(), excluding_user_id)? {
        return Err(ApiError::Conflict {
            message: format!("Username '{username}' is already taken"),
        });
    }
    Ok(())
}

fn ensure_location_name_free(
    persistence: &mut Persistence,
    name: &LocationName,
    excluding_location_id: Option<i64>,
) -> Result<(), ApiError> {
    if persistence.location_name_exists(name.normalized(), excluding_location_id)? {
        return Err(ApiError::Conflict {
            message: format!("A location named '{}' already exists", name.normalized()),
        });
    }
    Ok(())
}

/// Lists locations with today's occupancy.
///
/// # Errors
///
/// Returns an error if the actor is neither Admin nor Manager or the query
/// is invalid.
pub fn list_locations(
    persistence: &mut Persistence,
    config: &ApiConfig,
    actor: &AuthenticatedActor,
    query: &ListQuery,
) -> Result<Page<LocationResponse>, ApiError> {
    AuthorizationService::authorize_view_locations(actor)?;
    let today: DayWindow = config.today()?;
    let page: Page<LocationData> =
        persistence.list_locations(query.page_request()?, query.search(), &today)?;
    Ok(page.map(LocationResponse::from))
}

/// Retrieves one location. A Location actor may only read its own.
///
/// # Errors
///
/// Returns an error if the location does not exist or the actor may not
/// read it.
pub fn get_location(
    persistence: &mut Persistence,
    config: &ApiConfig,
    actor: &AuthenticatedActor,
    location_id: i64,
) -> Result<LocationResponse, ApiError> {
    let today: DayWindow = config.today()?;
    let location: LocationData = load_location(persistence, &today, location_id)?;
    AuthorizationService::authorize_view_location(actor, location.user_id)?;
    Ok(LocationResponse::from(location))
}

/// Public kiosk lookup by name. The name is normalized before lookup, so
/// both `Main Gym` and `main-gym` find the same location.
///
/// # Errors
///
/// Returns an error if no location has that name.
pub fn get_location_by_name(
    persistence: &mut Persistence,
    config: &ApiConfig,
    name: &str,
) -> Result<LocationSnapshot, ApiError> {
    let normalized: String = normalize_location_name(name);
    debug!(name, normalized = %normalized, "Looking up location by name");

    let today: DayWindow = config.today()?;
    persistence
        .get_location_by_name(&normalized, &today)?
        .map(|location| location.snapshot())
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Location"),
            message: format!("Location '{normalized}' not found"),
        })
}

/// Creates a location together with the Location account that operates it.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The name, capacity, username or password is invalid
/// - The location name or username is taken
pub fn create_location(
    persistence: &mut Persistence,
    config: &ApiConfig,
    actor: &AuthenticatedActor,
    request: &CreateLocationRequest,
) -> Result<LocationChange, ApiError> {
    AuthorizationService::authorize_manage_locations(actor)?;

    let name: LocationName = LocationName::new(&request.name)?;
    let capacity: Capacity = Capacity::new(request.capacity)?;
    let username: Username = Username::new(&request.username)?;
    PasswordPolicy::default().validate(&request.password, username.as_str())?;

    ensure_location_name_free(persistence, &name, None)?;
    ensure_username_free(persistence, &username, None)?;

    let location_id: i64 = persistence.create_location_with_user(&NewLocation {
        name: name.display(),
        normalized_name: name.normalized(),
        capacity: capacity.value(),
        username: username.as_str(),
        password: &request.password,
    })?;
    info!(
        location_id,
        name = %name.normalized(),
        capacity = capacity.value(),
        created_by = %actor.username,
        "Created location"
    );

    let today: DayWindow = config.today()?;
    Ok(change(load_location(persistence, &today, location_id)?))
}

/// Changes a location or its owning account.
///
/// A password change ends every session of the owning account.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The location does not exist
/// - A new value is invalid
/// - The new location name or username is taken
pub fn update_location(
    persistence: &mut Persistence,
    config: &ApiConfig,
    actor: &AuthenticatedActor,
    location_id: i64,
    request: &UpdateLocationRequest,
) -> Result<LocationChange, ApiError> {
    AuthorizationService::authorize_manage_locations(actor)?;
    let today: DayWindow = config.today()?;
    let existing: LocationData = load_location(persistence, &today, location_id)?;

    let name: Option<LocationName> = request.name.as_deref().map(LocationName::new).transpose()?;
    let capacity: Option<Capacity> = request.capacity.map(Capacity::new).transpose()?;
    let username: Option<Username> = request.username.as_deref().map(Username::new).transpose()?;

    if let Some(password) = &request.password {
        let effective: &str = username
            .as_ref()
            .map_or(existing.username.as_str(), Username::as_str);
        PasswordPolicy::default().validate(password, effective)?;
    }
    if let Some(name) = &name {
        ensure_location_name_free(persistence, name, Some(location_id))?;
    }
    if let Some(username) = &username {
        ensure_username_free(persistence, username, Some(existing.user_id))?;
    }

    persistence.update_location(
        location_id,
        &LocationUpdate {
            name: name.as_ref().map(|n| (n.display(), n.normalized())),
            capacity: capacity.map(Capacity::value),
            username: username.as_ref().map(Username::as_str),
            password: request.password.as_deref(),
        },
    )?;
    if request.password.is_some() {
        persistence.delete_sessions_for_user(existing.user_id)?;
    }
    info!(location_id, updated_by = %actor.username, "Updated location");

    Ok(change(load_location(persistence, &today, location_id)?))
}

/// Deletes a location with its check-ins and owning account.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the location does not
/// exist.
pub fn delete_location(
    persistence: &mut Persistence,
    config: &ApiConfig,
    actor: &AuthenticatedActor,
    location_id: i64,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_locations(actor)?;
    let today: DayWindow = config.today()?;
    load_location(persistence, &today, location_id)?;

    persistence.delete_location(location_id)?;
    info!(location_id, deleted_by = %actor.username, "Deleted location");
    Ok(())
}
