// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Role gate tests for the authorization service.

use crate::{AuthError, AuthenticatedActor, AuthorizationService, Role};

fn actor(role: Role) -> AuthenticatedActor {
    AuthenticatedActor::new(7, format!("{}-user", role.as_str().to_lowercase()), role)
}

#[test]
fn test_admin_passes_every_gate() {
    let admin: AuthenticatedActor = actor(Role::Admin);

    assert!(AuthorizationService::authorize_manage_users(&admin).is_ok());
    assert!(AuthorizationService::authorize_manage_schools(&admin).is_ok());
    assert!(AuthorizationService::authorize_manage_locations(&admin).is_ok());
    assert!(AuthorizationService::authorize_view_locations(&admin).is_ok());
    assert!(AuthorizationService::authorize_view_location(&admin, 99).is_ok());
    assert!(AuthorizationService::authorize_create_check_in(&admin).is_ok());
    assert!(AuthorizationService::authorize_view_check_ins(&admin).is_ok());
    assert!(AuthorizationService::authorize_delete_check_in(&admin).is_ok());
    assert!(AuthorizationService::authorize_migrations(&admin).is_ok());
}

#[test]
fn test_manager_is_read_only() {
    let manager: AuthenticatedActor = actor(Role::Manager);

    assert!(AuthorizationService::authorize_view_locations(&manager).is_ok());
    assert!(AuthorizationService::authorize_view_location(&manager, 99).is_ok());
    assert!(AuthorizationService::authorize_view_check_ins(&manager).is_ok());

    assert!(AuthorizationService::authorize_manage_users(&manager).is_err());
    assert!(AuthorizationService::authorize_manage_schools(&manager).is_err());
    assert!(AuthorizationService::authorize_manage_locations(&manager).is_err());
    assert!(AuthorizationService::authorize_create_check_in(&manager).is_err());
    assert!(AuthorizationService::authorize_delete_check_in(&manager).is_err());
    assert!(AuthorizationService::authorize_migrations(&manager).is_err());
}

#[test]
fn test_location_actor_sees_only_its_own_location() {
    let kiosk: AuthenticatedActor = actor(Role::Location);

    assert!(AuthorizationService::authorize_create_check_in(&kiosk).is_ok());
    assert!(AuthorizationService::authorize_view_location(&kiosk, kiosk.user_id).is_ok());
    assert!(AuthorizationService::authorize_view_location(&kiosk, kiosk.user_id + 1).is_err());
    assert!(AuthorizationService::authorize_view_locations(&kiosk).is_err());
    assert!(AuthorizationService::authorize_view_check_ins(&kiosk).is_err());
}

#[test]
fn test_forbidden_names_the_required_roles() {
    let kiosk: AuthenticatedActor = actor(Role::Location);

    let err: AuthError = AuthorizationService::authorize_view_check_ins(&kiosk).unwrap_err();

    match err {
        AuthError::Forbidden { required_role, .. } => {
            assert_eq!(required_role, "Admin or Manager");
        }
        AuthError::AuthenticationFailed { .. } => panic!("expected Forbidden"),
    }
}
