// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use checkin_domain::{LocationSnapshot, Occupancy};
use serde::{Deserialize, Serialize};

/// A stored user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserData {
    pub user_id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

/// Which half of a token pair a session row represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Access,
    Refresh,
}

impl SessionKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "access" => Some(Self::Access),
            "refresh" => Some(Self::Refresh),
            _ => None,
        }
    }
}

/// A stored session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub kind: String,
    pub user_id: i64,
    pub created_at: String,
    pub expires_at: String,
}

/// A stored school.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolData {
    pub school_id: i64,
    pub name: String,
    pub created_at: String,
}

/// A stored location with its owning user and derived occupancy fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationData {
    pub location_id: i64,
    pub name: String,
    pub normalized_name: String,
    pub capacity: i32,
    pub user_id: i64,
    pub username: String,
    pub created_at: String,
    /// Check-ins recorded during the requested day window.
    pub checked_in_today: i64,
    /// Timestamp of the check-in that filled the location on the previous day.
    pub yesterday_full_at: Option<String>,
}

impl LocationData {
    #[must_use]
    pub fn occupancy(&self) -> Occupancy {
        Occupancy::new(
            self.capacity,
            self.checked_in_today,
            self.yesterday_full_at.clone(),
        )
    }

    #[must_use]
    pub fn snapshot(&self) -> LocationSnapshot {
        LocationSnapshot::new(
            self.location_id,
            self.normalized_name.clone(),
            self.name.clone(),
            &self.occupancy(),
        )
    }
}

/// Values for a new location and the account that owns it.
#[derive(Debug, Clone)]
pub struct NewLocation<'a> {
    pub name: &'a str,
    pub normalized_name: &'a str,
    pub capacity: i32,
    pub username: &'a str,
    pub password: &'a str,
}

/// Optional changes to a location and its owning account.
#[derive(Debug, Clone, Default)]
pub struct LocationUpdate<'a> {
    /// New display name and normalized name.
    pub name: Option<(&'a str, &'a str)>,
    pub capacity: Option<i32>,
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
}

/// Optional changes to a user account.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate<'a> {
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
    pub role: Option<&'a str>,
}

/// A stored check-in joined with its location and school names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInData {
    pub check_in_id: i64,
    pub location_id: i64,
    pub location_name: String,
    pub school_id: i64,
    pub school_name: String,
    pub capacity: i32,
    pub created_at: String,
}

/// Restricts check-in listings and statistics.
///
/// `from` is inclusive and `to` exclusive; both are stored UTC timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckInFilter {
    pub location_id: Option<i64>,
    pub school_id: Option<i64>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Check-ins per local day and location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    /// Local date, `YYYY-MM-DD`.
    pub date: String,
    pub location_id: i64,
    pub location_name: String,
    pub count: i64,
}

/// Check-ins per school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolCount {
    pub school_id: i64,
    pub school_name: String,
    pub count: i64,
}

/// Aggregated check-in statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInStats {
    pub days: Vec<DailyCount>,
    pub schools: Vec<SchoolCount>,
    pub total: i64,
}
