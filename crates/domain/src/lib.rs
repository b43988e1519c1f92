// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Domain types for the Check-In attendance service.
//!
//! Everything here is free of I/O: name normalization, role parsing,
//! capacity rules, occupancy arithmetic, local-day windows and pagination.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod clock;
mod error;
mod occupancy;
mod pagination;
mod types;

#[cfg(test)]
mod tests;

pub use clock::{DayWindow, format_timestamp, now_timestamp, parse_date, parse_timestamp};
pub use error::DomainError;
pub use occupancy::{LocationSnapshot, Occupancy};
pub use pagination::{Page, PageRequest, total_pages};
pub use types::{Capacity, LocationName, Role, SchoolName, Username, normalize_location_name};
