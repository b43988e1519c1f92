// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request handlers.
//!
//! Each handler authorizes the actor, validates input through the domain
//! types, calls persistence, and returns a response DTO. Handlers are
//! synchronous and transport-agnostic; the HTTP layer owns locking and
//! live publishing.

mod auth;
mod bootstrap;
mod check_ins;
mod locations;
mod migrations;
mod schools;
mod users;

pub use auth::{login, logout, refresh, whoami};
pub use bootstrap::bootstrap_admin;
pub use check_ins::{check_in_stats, create_check_in, delete_check_in, list_check_ins};
pub(crate) use locations::location_snapshot;
pub use locations::{
    create_location, delete_location, get_location, get_location_by_name, list_locations,
    update_location,
};
pub use migrations::{list_migrations, run_migrations};
pub use schools::{create_school, delete_school, get_school, list_schools, update_school};
pub use users::{create_user, delete_user, get_user, list_users, update_user};
