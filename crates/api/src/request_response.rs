// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use checkin_domain::{LocationSnapshot, PageRequest};
use checkin_persistence::{
    CheckInData, DailyCount, LocationData, SchoolCount, SchoolData, UserData,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Pagination and search parameters accepted by every list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
}

impl ListQuery {
    /// Validated page request.
    ///
    /// # Errors
    ///
    /// Returns an error if `page` or `per_page` is out of range.
    pub fn page_request(&self) -> Result<PageRequest, ApiError> {
        Ok(PageRequest::new(self.page, self.per_page)?)
    }

    /// Trimmed search term, or `None` when blank.
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

// ============================================================================
// Auth
// ============================================================================

/// API request to log in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// API response for a login or refresh.
///
/// The tokens are also set as cookies by the HTTP layer; they appear in the
/// body for clients that send `Authorization: Bearer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub access_expires_at: String,
    pub refresh_token: String,
    pub refresh_expires_at: String,
}

/// API response describing the current actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoAmIResponse {
    pub user: UserResponse,
    /// The location owned by a Location actor.
    pub location: Option<LocationResponse>,
}

// ============================================================================
// Users
// ============================================================================

/// A user account, without credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: i64,
    pub username: String,
    pub role: String,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

impl From<UserData> for UserResponse {
    fn from(user: UserData) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            role: user.role,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

/// API request to create an Admin or Manager account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: String,
}

/// API request to change an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

// ============================================================================
// Schools
// ============================================================================

/// A school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolResponse {
    pub school_id: i64,
    pub name: String,
    pub created_at: String,
}

impl From<SchoolData> for SchoolResponse {
    fn from(school: SchoolData) -> Self {
        Self {
            school_id: school.school_id,
            name: school.name,
            created_at: school.created_at,
        }
    }
}

/// API request to create or rename a school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolRequest {
    pub name: String,
}

// ============================================================================
// Locations
// ============================================================================

/// A location with its derived occupancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationResponse {
    pub location_id: i64,
    pub name: String,
    pub normalized_name: String,
    pub capacity: i32,
    pub user_id: i64,
    pub username: String,
    pub created_at: String,
    pub checked_in_today: i64,
    pub available: i64,
    pub yesterday_full_at: Option<String>,
}

impl From<LocationData> for LocationResponse {
    fn from(location: LocationData) -> Self {
        let available: i64 = location.occupancy().available();
        Self {
            location_id: location.location_id,
            name: location.name,
            normalized_name: location.normalized_name,
            capacity: location.capacity,
            user_id: location.user_id,
            username: location.username,
            created_at: location.created_at,
            checked_in_today: location.checked_in_today,
            available,
            yesterday_full_at: location.yesterday_full_at,
        }
    }
}

/// API request to create a location and its account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLocationRequest {
    pub name: String,
    pub capacity: i64,
    pub username: String,
    pub password: String,
}

/// API request to change a location or its account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateLocationRequest {
    pub name: Option<String>,
    pub capacity: Option<i64>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Result of a location write: the stored location and the snapshot to
/// publish to live subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationChange {
    pub location: LocationResponse,
    pub snapshot: LocationSnapshot,
}

// ============================================================================
// Check-ins
// ============================================================================

/// A recorded check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInResponse {
    pub check_in_id: i64,
    pub location_id: i64,
    pub location_name: String,
    pub school_id: i64,
    pub school_name: String,
    pub capacity: i32,
    pub created_at: String,
}

impl From<CheckInData> for CheckInResponse {
    fn from(check_in: CheckInData) -> Self {
        Self {
            check_in_id: check_in.check_in_id,
            location_id: check_in.location_id,
            location_name: check_in.location_name,
            school_id: check_in.school_id,
            school_name: check_in.school_name,
            capacity: check_in.capacity,
            created_at: check_in.created_at,
        }
    }
}

/// API request to record a check-in.
///
/// Location actors may omit `location_id`; Admins must supply it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCheckInRequest {
    pub school_id: i64,
    pub location_id: Option<i64>,
}

/// Result of recording a check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInCreated {
    pub check_in: CheckInResponse,
    pub snapshot: LocationSnapshot,
}

/// Filters for listing check-ins. Dates are local `YYYY-MM-DD`, inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInQuery {
    pub location_id: Option<i64>,
    pub school_id: Option<i64>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Filters for check-in statistics. Dates are local `YYYY-MM-DD`, inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub location_id: Option<i64>,
    pub school_id: Option<i64>,
}

/// Aggregated check-in statistics for a local date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub from: String,
    pub to: String,
    pub total: i64,
    pub days: Vec<DailyCount>,
    pub schools: Vec<SchoolCount>,
}

// ============================================================================
// Migrations
// ============================================================================

/// Applied and pending schema migrations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationsResponse {
    pub applied: Vec<String>,
    pub pending: Vec<String>,
}

/// Migrations applied by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMigrationsResponse {
    pub applied: Vec<String>,
}
