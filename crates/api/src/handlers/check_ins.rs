// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use checkin_domain::{
    DayWindow, DomainError, LocationSnapshot, Page, PageRequest, Role, now_timestamp, parse_date,
};
use checkin_persistence::{
    CheckInData, CheckInFilter, CheckInStats, LocationData, Persistence, SchoolData,
};
use time::{Date, Duration, UtcOffset};
use tracing::{info, warn};

use super::locations::{load_location, location_snapshot};
use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::request_response::{
    CheckInCreated, CheckInQuery, CheckInResponse, CreateCheckInRequest, StatsQuery, StatsResponse,
};

/// Days covered by statistics when no range is given, today included.
const DEFAULT_STATS_DAYS: i64 = 7;

fn parse_date_field(field: &str, value: &str) -> Result<Date, ApiError> {
    parse_date(value).map_err(|err| ApiError::InvalidInput {
        field: field.to_string(),
        message: err.to_string(),
    })
}

fn ensure_ordered(from: Date, to: Date) -> Result<(), ApiError> {
    if from > to {
        return Err(ApiError::InvalidInput {
            field: String::from("from"),
            message: format!("Start date {from} is after end date {to}"),
        });
    }
    Ok(())
}

/// Converts inclusive local dates into the UTC timestamp bounds used by the
/// store (`from` inclusive, `to` exclusive).
fn timestamp_bounds(
    from: Option<Date>,
    to: Option<Date>,
    offset: UtcOffset,
) -> Result<(Option<String>, Option<String>), ApiError> {
    let start: Option<String> = from
        .map(|date| DayWindow::for_date(date, offset))
        .transpose()?
        .map(|window| window.start().to_string());
    let end: Option<String> = to
        .map(|date| DayWindow::for_date(date, offset))
        .transpose()?
        .map(|window| window.end().to_string());
    Ok((start, end))
}

/// Resolves which location a check-in is recorded for.
fn target_location(
    persistence: &mut Persistence,
    today: &DayWindow,
    actor: &AuthenticatedActor,
    requested: Option<i64>,
) -> Result<LocationData, ApiError> {
    if actor.role == Role::Location {
        let own: LocationData = persistence
            .get_location_by_user(actor.user_id, today)?
            .ok_or_else(|| ApiError::Forbidden {
                action: String::from("create check-in"),
                required_role: String::from("Location with an assigned location"),
            })?;
        if requested.is_some_and(|id| id != own.location_id) {
            warn!(
                actor = %actor.username,
                requested = ?requested,
                own = own.location_id,
                "Location actor attempted a check-in for another location"
            );
            return Err(ApiError::Forbidden {
                action: String::from("create check-in for another location"),
                required_role: String::from("Admin"),
            });
        }
        return Ok(own);
    }

    let location_id: i64 = requested.ok_or_else(|| ApiError::InvalidInput {
        field: String::from("location_id"),
        message: String::from("location_id is required"),
    })?;
    load_location(persistence, today, location_id)
}

/// Records a check-in of a school at a location.
///
/// The check-in stores the location's capacity at this moment.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is neither Admin nor Location
/// - A Location actor names a different location
/// - An Admin omits the location
/// - The location or school does not exist
/// - The location is already full today
pub fn create_check_in(
    persistence: &mut Persistence,
    config: &ApiConfig,
    actor: &AuthenticatedActor,
    request: &CreateCheckInRequest,
) -> Result<CheckInCreated, ApiError> {
    AuthorizationService::authorize_create_check_in(actor)?;
    let today: DayWindow = config.today()?;
    let location: LocationData = target_location(persistence, &today, actor, request.location_id)?;

    let school: SchoolData = persistence
        .get_school(request.school_id)?
        .ok_or_else(|| ApiError::not_found("School", request.school_id))?;

    if location.occupancy().is_full() {
        return Err(ApiError::Conflict {
            message: format!("Location '{}' is full for today", location.name),
        });
    }

    let created_at: String = now_timestamp()?;
    let check_in_id: i64 = persistence.create_check_in(
        location.location_id,
        school.school_id,
        location.capacity,
        &created_at,
    )?;
    info!(
        check_in_id,
        location_id = location.location_id,
        school_id = school.school_id,
        actor = %actor.username,
        "Recorded check-in"
    );

    let check_in: CheckInData = persistence
        .get_check_in(check_in_id)?
        .ok_or_else(|| ApiError::not_found("Check-in", check_in_id))?;
    let updated: LocationData = load_location(persistence, &today, location.location_id)?;

    Ok(CheckInCreated {
        check_in: CheckInResponse::from(check_in),
        snapshot: updated.snapshot(),
    })
}

/// Lists check-ins, newest first.
///
/// # Errors
///
/// Returns an error if the actor is neither Admin nor Manager or a filter
/// is invalid.
pub fn list_check_ins(
    persistence: &mut Persistence,
    config: &ApiConfig,
    actor: &AuthenticatedActor,
    query: &CheckInQuery,
) -> Result<Page<CheckInResponse>, ApiError> {
    AuthorizationService::authorize_view_check_ins(actor)?;
    let request: PageRequest = PageRequest::new(query.page, query.per_page)?;

    let from: Option<Date> = query
        .from
        .as_deref()
        .map(|value| parse_date_field("from", value))
        .transpose()?;
    let to: Option<Date> = query
        .to
        .as_deref()
        .map(|value| parse_date_field("to", value))
        .transpose()?;
    if let (Some(from), Some(to)) = (from, to) {
        ensure_ordered(from, to)?;
    }

    let (start, end): (Option<String>, Option<String>) =
        timestamp_bounds(from, to, config.utc_offset)?;
    let filter: CheckInFilter = CheckInFilter {
        location_id: query.location_id,
        school_id: query.school_id,
        from: start,
        to: end,
    };

    let page: Page<CheckInData> = persistence.list_check_ins(&filter, request)?;
    Ok(page.map(CheckInResponse::from))
}

/// Deletes a check-in and returns the refreshed snapshot of its location.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the check-in does not
/// exist.
pub fn delete_check_in(
    persistence: &mut Persistence,
    config: &ApiConfig,
    actor: &AuthenticatedActor,
    check_in_id: i64,
) -> Result<LocationSnapshot, ApiError> {
    AuthorizationService::authorize_delete_check_in(actor)?;
    let check_in: CheckInData = persistence
        .get_check_in(check_in_id)?
        .ok_or_else(|| ApiError::not_found("Check-in", check_in_id))?;

    persistence.delete_check_in(check_in_id)?;
    info!(check_in_id, deleted_by = %actor.username, "Deleted check-in");

    location_snapshot(persistence, config, check_in.location_id)
}

/// Aggregates check-ins per local day and per school.
///
/// Without dates the range covers the last seven local days, today
/// included. Both bounds are inclusive.
///
/// # Errors
///
/// Returns an error if the actor is neither Admin nor Manager or the range
/// is invalid.
pub fn check_in_stats(
    persistence: &mut Persistence,
    config: &ApiConfig,
    actor: &AuthenticatedActor,
    query: &StatsQuery,
) -> Result<StatsResponse, ApiError> {
    AuthorizationService::authorize_view_check_ins(actor)?;
    let today: DayWindow = config.today()?;

    let to: Date = match query.to.as_deref() {
        Some(value) => parse_date_field("to", value)?,
        None => today.date(),
    };
    let from: Date = match query.from.as_deref() {
        Some(value) => parse_date_field("from", value)?,
        None => to
            .checked_sub(Duration::days(DEFAULT_STATS_DAYS - 1))
            .ok_or(DomainError::DateOutOfRange {
                operation: "computing the default statistics range",
            })?,
    };
    ensure_ordered(from, to)?;

    let (start, end): (Option<String>, Option<String>) =
        timestamp_bounds(Some(from), Some(to), config.utc_offset)?;
    let filter: CheckInFilter = CheckInFilter {
        location_id: query.location_id,
        school_id: query.school_id,
        from: start,
        to: end,
    };

    let stats: CheckInStats = persistence.check_in_stats(&filter, &today)?;
    Ok(StatsResponse {
        from: from.to_string(),
        to: to.to_string(),
        total: stats.total,
        days: stats.days,
        schools: stats.schools,
    })
}
