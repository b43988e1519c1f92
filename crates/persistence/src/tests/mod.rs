// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod school_tests;

use checkin_domain::DayWindow;
use time::macros::{date, offset};

use crate::{NewLocation, Persistence};

/// The local day used throughout the tests: 2026-03-10 at UTC.
pub fn test_day() -> DayWindow {
    DayWindow::for_date(date!(2026 - 03 - 10), offset!(UTC)).unwrap()
}

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

/// Creates a location owned by `<normalized>-kiosk` and returns its ID.
pub fn create_test_location(
    persistence: &mut Persistence,
    name: &str,
    normalized: &str,
    capacity: i32,
) -> i64 {
    let username: String = format!("{normalized}-kiosk");
    persistence
        .create_location_with_user(&NewLocation {
            name,
            normalized_name: normalized,
            capacity,
            username: &username,
            password: "kiosk-password",
        })
        .expect("location created")
}
