// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for login, refresh rotation, logout and access validation.

use time::Duration;

use crate::tests::helpers::{
    TEST_PASSWORD, create_test_admin, create_test_location, create_test_persistence, test_config,
};
use crate::{
    ApiConfig, ApiError, AuthError, AuthenticatedActor, AuthenticationService, LoginRequest,
    LoginResponse, Role, WhoAmIResponse, login, logout, refresh, whoami,
};

fn login_request(username: &str, password: &str) -> LoginRequest {
    LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    }
}

#[test]
fn test_login_issues_distinct_tokens_and_records_login() {
    let mut persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);

    let response: LoginResponse = login(
        &mut persistence,
        &test_config(),
        &login_request("admin", TEST_PASSWORD),
    )
    .unwrap();

    assert_eq!(response.user.user_id, admin.user_id);
    assert_eq!(response.user.role, "Admin");
    assert_eq!(response.access_token.len(), 64);
    assert_ne!(response.access_token, response.refresh_token);
    assert!(response.access_expires_at < response.refresh_expires_at);

    let stored = persistence.get_user_by_id(admin.user_id).unwrap().unwrap();
    assert!(stored.last_login_at.is_some());
    assert_eq!(
        persistence.count_sessions_for_user(admin.user_id).unwrap(),
        2
    );
}

#[test]
fn test_login_normalizes_username_case() {
    let mut persistence = create_test_persistence();
    create_test_admin(&mut persistence);

    let result = login(
        &mut persistence,
        &test_config(),
        &login_request("  ADMIN ", TEST_PASSWORD),
    );

    assert!(result.is_ok());
}

#[test]
fn test_login_failures_are_indistinguishable() {
    let mut persistence = create_test_persistence();
    create_test_admin(&mut persistence);
    let config: ApiConfig = test_config();

    let wrong_password = login(
        &mut persistence,
        &config,
        &login_request("admin", "nope-nope"),
    )
    .unwrap_err();
    let unknown_user = login(
        &mut persistence,
        &config,
        &login_request("nobody", TEST_PASSWORD),
    )
    .unwrap_err();

    assert_eq!(wrong_password, unknown_user);
    assert!(matches!(
        wrong_password,
        ApiError::AuthenticationFailed { .. }
    ));
}

#[test]
fn test_validate_access_returns_actor() {
    let mut persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);
    let response: LoginResponse = login(
        &mut persistence,
        &test_config(),
        &login_request("admin", TEST_PASSWORD),
    )
    .unwrap();

    let (actor, user) =
        AuthenticationService::validate_access(&mut persistence, &response.access_token).unwrap();

    assert_eq!(actor, admin);
    assert_eq!(user.username, "admin");
}

#[test]
fn test_refresh_token_is_not_an_access_token() {
    let mut persistence = create_test_persistence();
    create_test_admin(&mut persistence);
    let response: LoginResponse = login(
        &mut persistence,
        &test_config(),
        &login_request("admin", TEST_PASSWORD),
    )
    .unwrap();

    let result = AuthenticationService::validate_access(&mut persistence, &response.refresh_token);

    assert!(matches!(
        result,
        Err(AuthError::AuthenticationFailed { .. })
    ));
}

#[test]
fn test_refresh_rotates_tokens_once() {
    let mut persistence = create_test_persistence();
    create_test_admin(&mut persistence);
    let config: ApiConfig = test_config();
    let first: LoginResponse = login(
        &mut persistence,
        &config,
        &login_request("admin", TEST_PASSWORD),
    )
    .unwrap();

    let second: LoginResponse = refresh(&mut persistence, &config, &first.refresh_token).unwrap();
    assert_ne!(second.refresh_token, first.refresh_token);
    assert_ne!(second.access_token, first.access_token);

    let reused = refresh(&mut persistence, &config, &first.refresh_token);
    assert!(matches!(reused, Err(ApiError::AuthenticationFailed { .. })));

    assert!(refresh(&mut persistence, &config, &second.refresh_token).is_ok());
}

#[test]
fn test_expired_access_token_is_rejected_and_removed() {
    let mut persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);
    let config: ApiConfig = ApiConfig {
        access_token_ttl: Duration::seconds(-1),
        ..test_config()
    };
    let response: LoginResponse = login(
        &mut persistence,
        &config,
        &login_request("admin", TEST_PASSWORD),
    )
    .unwrap();

    let result = AuthenticationService::validate_access(&mut persistence, &response.access_token);

    assert!(matches!(
        result,
        Err(AuthError::AuthenticationFailed { .. })
    ));
    // Only the refresh session remains.
    assert_eq!(
        persistence.count_sessions_for_user(admin.user_id).unwrap(),
        1
    );
}

#[test]
fn test_login_purges_expired_sessions() {
    let mut persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);
    let expired: ApiConfig = ApiConfig {
        access_token_ttl: Duration::seconds(-10),
        refresh_token_ttl: Duration::seconds(-10),
        ..test_config()
    };
    login(
        &mut persistence,
        &expired,
        &login_request("admin", TEST_PASSWORD),
    )
    .unwrap();
    assert_eq!(
        persistence.count_sessions_for_user(admin.user_id).unwrap(),
        2
    );

    login(
        &mut persistence,
        &test_config(),
        &login_request("admin", TEST_PASSWORD),
    )
    .unwrap();

    assert_eq!(
        persistence.count_sessions_for_user(admin.user_id).unwrap(),
        2
    );
}

#[test]
fn test_logout_ends_both_sessions() {
    let mut persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);
    let config: ApiConfig = test_config();
    let response: LoginResponse = login(
        &mut persistence,
        &config,
        &login_request("admin", TEST_PASSWORD),
    )
    .unwrap();

    logout(
        &mut persistence,
        Some(&response.access_token),
        Some(&response.refresh_token),
    )
    .unwrap();

    assert_eq!(
        persistence.count_sessions_for_user(admin.user_id).unwrap(),
        0
    );
    assert!(
        AuthenticationService::validate_access(&mut persistence, &response.access_token).is_err()
    );
    assert!(refresh(&mut persistence, &config, &response.refresh_token).is_err());
}

#[test]
fn test_logout_without_tokens_is_a_no_op() {
    let mut persistence = create_test_persistence();

    assert!(logout(&mut persistence, None, Some("unknown-token")).is_ok());
}

#[test]
fn test_whoami_includes_owned_location() {
    let mut persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);
    let (change, kiosk) = create_test_location(&mut persistence, &admin, "Main Gym", 10, "gym");
    let config: ApiConfig = test_config();

    let kiosk_view: WhoAmIResponse = whoami(&mut persistence, &config, &kiosk).unwrap();
    let admin_view: WhoAmIResponse = whoami(&mut persistence, &config, &admin).unwrap();

    assert_eq!(kiosk_view.user.role, Role::Location.as_str());
    assert_eq!(
        kiosk_view.location.map(|l| l.location_id),
        Some(change.location.location_id)
    );
    assert!(admin_view.location.is_none());
}

#[test]
fn test_session_tokens_are_hex_and_unique() {
    let first: String = AuthenticationService::generate_session_token();
    let second: String = AuthenticationService::generate_session_token();

    assert_eq!(first.len(), 64);
    assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(first, second);
}
