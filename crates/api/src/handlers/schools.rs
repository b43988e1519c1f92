// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use checkin_domain::{Page, SchoolName};
use checkin_persistence::{Persistence, SchoolData};
use tracing::info;

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::ApiError;
use crate::request_response::{ListQuery, SchoolRequest, SchoolResponse};

fn load_school(persistence: &mut Persistence, school_id: i64) -> Result<SchoolData, ApiError> {
    persistence
        .get_school(school_id)?
        .ok_or_else(|| ApiError::not_found("School", school_id))
}

fn ensure_name_free(
    persistence: &mut Persistence,
    name: &SchoolName,
    excluding: Option<i64>,
) -> Result<(), ApiError> {
    if persistence.school_name_exists(name.as_str(), excluding)? {
        return Err(ApiError::Conflict {
            message: format!("School '{}' already exists", name.as_str()),
        });
    }
    Ok(())
}

/// Lists schools. Any authenticated actor may read schools.
///
/// # Errors
///
/// Returns an error if the query is invalid.
pub fn list_schools(
    persistence: &mut Persistence,
    _actor: &AuthenticatedActor,
    query: &ListQuery,
) -> Result<Page<SchoolResponse>, ApiError> {
    let page: Page<SchoolData> = persistence.list_schools(query.page_request()?, query.search())?;
    Ok(page.map(SchoolResponse::from))
}

/// Retrieves one school.
///
/// # Errors
///
/// Returns an error if the school does not exist.
pub fn get_school(
    persistence: &mut Persistence,
    _actor: &AuthenticatedActor,
    school_id: i64,
) -> Result<SchoolResponse, ApiError> {
    Ok(SchoolResponse::from(load_school(persistence, school_id)?))
}

/// Creates a school.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the name is invalid, or
/// the name is taken.
pub fn create_school(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &SchoolRequest,
) -> Result<SchoolResponse, ApiError> {
    AuthorizationService::authorize_manage_schools(actor)?;
    let name: SchoolName = SchoolName::new(&request.name)?;
    ensure_name_free(persistence, &name, None)?;

    let school_id: i64 = persistence.create_school(name.as_str())?;
    info!(school_id, created_by = %actor.username, "Created school");
    Ok(SchoolResponse::from(load_school(persistence, school_id)?))
}

/// Renames a school.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the school does not exist,
/// or the new name is invalid or taken.
pub fn update_school(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    school_id: i64,
    request: &SchoolRequest,
) -> Result<SchoolResponse, ApiError> {
    AuthorizationService::authorize_manage_schools(actor)?;
    load_school(persistence, school_id)?;
    let name: SchoolName = SchoolName::new(&request.name)?;
    ensure_name_free(persistence, &name, Some(school_id))?;

    persistence.update_school(school_id, name.as_str())?;
    Ok(SchoolResponse::from(load_school(persistence, school_id)?))
}

/// Deletes a school that has no check-ins.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the school does not exist,
/// or check-ins still reference it.
pub fn delete_school(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    school_id: i64,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_schools(actor)?;
    load_school(persistence, school_id)?;
    persistence.delete_school(school_id)?;
    info!(school_id, deleted_by = %actor.username, "Deleted school");
    Ok(())
}
