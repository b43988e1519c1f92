// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use checkin_persistence::Persistence;

use crate::{
    ApiConfig, AuthenticatedActor, CreateLocationRequest, LocationChange, Role, SchoolRequest,
    create_location, create_school,
};

pub const TEST_PASSWORD: &str = "correct-horse";

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().unwrap()
}

pub fn test_config() -> ApiConfig {
    ApiConfig::default()
}

/// Stores a user with [`TEST_PASSWORD`] and returns it as an actor.
pub fn create_actor(
    persistence: &mut Persistence,
    username: &str,
    role: Role,
) -> AuthenticatedActor {
    let user_id: i64 = persistence
        .create_user(username, TEST_PASSWORD, role)
        .unwrap();
    AuthenticatedActor::new(user_id, username.to_string(), role)
}

pub fn create_test_admin(persistence: &mut Persistence) -> AuthenticatedActor {
    create_actor(persistence, "admin", Role::Admin)
}

pub fn create_test_manager(persistence: &mut Persistence) -> AuthenticatedActor {
    create_actor(persistence, "manager", Role::Manager)
}

pub fn location_request(name: &str, capacity: i64, username: &str) -> CreateLocationRequest {
    CreateLocationRequest {
        name: name.to_string(),
        capacity,
        username: username.to_string(),
        password: String::from(TEST_PASSWORD),
    }
}

/// Creates a location through the handler and returns the change plus an
/// actor for its Location account.
pub fn create_test_location(
    persistence: &mut Persistence,
    admin: &AuthenticatedActor,
    name: &str,
    capacity: i64,
    username: &str,
) -> (LocationChange, AuthenticatedActor) {
    let change: LocationChange = create_location(
        persistence,
        &test_config(),
        admin,
        &location_request(name, capacity, username),
    )
    .unwrap();
    let actor: AuthenticatedActor = AuthenticatedActor::new(
        change.location.user_id,
        change.location.username.clone(),
        Role::Location,
    );
    (change, actor)
}

pub fn create_test_school(
    persistence: &mut Persistence,
    admin: &AuthenticatedActor,
    name: &str,
) -> i64 {
    create_school(
        persistence,
        admin,
        &SchoolRequest {
            name: name.to_string(),
        },
    )
    .unwrap()
    .school_id
}
