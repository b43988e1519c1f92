// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary layer for the Check-In attendance service.
//!
//! Handlers in this crate authenticate and authorize actors, validate input
//! through the domain types, and translate persistence results into
//! response DTOs. Nothing here knows about HTTP; the server crate maps
//! [`ApiError`] onto status codes and publishes the
//! [`LocationSnapshot`](checkin_domain::LocationSnapshot) values returned by
//! write operations.
//!
//! ## Roles
//!
//! - `Admin` manages users, schools, locations, check-ins and migrations.
//! - `Manager` reads locations, check-ins and statistics.
//! - `Location` records check-ins for the single location it owns.

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

mod auth;
mod config;
mod error;
mod handlers;
mod password_policy;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService, AuthorizationService, TokenPair};
pub use checkin_domain::Role;
pub use config::ApiConfig;
pub use error::{ApiError, AuthError};
pub use handlers::{
    bootstrap_admin, check_in_stats, create_check_in, create_location, create_school, create_user,
    delete_check_in, delete_location, delete_school, delete_user, get_location,
    get_location_by_name, get_school, get_user, list_check_ins, list_locations, list_migrations,
    list_schools, list_users, login, logout, refresh, run_migrations, update_location,
    update_school, update_user, whoami,
};
pub use password_policy::{PasswordPolicy, PasswordPolicyError};
pub use request_response::{
    CheckInCreated, CheckInQuery, CheckInResponse, CreateCheckInRequest, CreateLocationRequest,
    CreateUserRequest, ListQuery, LocationChange, LocationResponse, LoginRequest, LoginResponse,
    MigrationsResponse, RunMigrationsResponse, SchoolRequest, SchoolResponse, StatsQuery,
    StatsResponse, UpdateLocationRequest, UpdateUserRequest, UserResponse, WhoAmIResponse,
};
