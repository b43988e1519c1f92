// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};

/// The derived occupancy of a location for the current local day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupancy {
    capacity: i32,
    checked_in_today: i64,
    yesterday_full_at: Option<String>,
}

impl Occupancy {
    #[must_use]
    pub const fn new(
        capacity: i32,
        checked_in_today: i64,
        yesterday_full_at: Option<String>,
    ) -> Self {
        Self {
            capacity,
            checked_in_today,
            yesterday_full_at,
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> i32 {
        self.capacity
    }

    #[must_use]
    pub const fn checked_in_today(&self) -> i64 {
        self.checked_in_today
    }

    /// Remaining places today.
    ///
    /// Never negative: lowering the capacity below today's count leaves the
    /// location full rather than overbooked.
    #[must_use]
    pub fn available(&self) -> i64 {
        (i64::from(self.capacity) - self.checked_in_today).max(0)
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.available() == 0
    }

    /// Timestamp of the check-in that filled the location yesterday, if it
    /// filled up at all.
    #[must_use]
    pub fn yesterday_full_at(&self) -> Option<&str> {
        self.yesterday_full_at.as_deref()
    }
}

/// The computed view of a location pushed to live subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSnapshot {
    /// Database identifier of the location.
    pub location_id: i64,
    /// Normalized name, used as the subscription key.
    pub name: String,
    /// Display name.
    pub display_name: String,
    /// Remaining places today.
    pub available: i64,
    /// Daily capacity.
    pub capacity: i32,
    /// When the location was filled yesterday, if it was.
    pub yesterday_full_at: Option<String>,
}

impl LocationSnapshot {
    #[must_use]
    pub fn new(
        location_id: i64,
        normalized_name: String,
        display_name: String,
        occupancy: &Occupancy,
    ) -> Self {
        Self {
            location_id,
            name: normalized_name,
            display_name,
            available: occupancy.available(),
            capacity: occupancy.capacity(),
            yesterday_full_at: occupancy.yesterday_full_at.clone(),
        }
    }
}
