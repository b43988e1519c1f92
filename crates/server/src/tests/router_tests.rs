// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Router tests: authentication transport and HTTP error mapping.

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use checkin_api::{LoginResponse, Role, SchoolResponse, WhoAmIResponse};
use checkin_domain::{LocationSnapshot, Page};
use checkin_persistence::{DEFAULT_HASH_COST, Persistence};
use serde_json::json;
use tower::ServiceExt;

use crate::{build_router, open_persistence};
use crate::error::ErrorResponse;
use crate::routes::HealthResponse;
use crate::tests::helpers::{
    Venue, body_json, create_test_app_state, create_user, create_venue, kiosk_check_in, login,
    request, send, set_cookies,
};

#[tokio::test]
async fn test_health_returns_ok() {
    let state = create_test_app_state();

    let response: Response = send(&state, request("GET", "/health", None, None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let health: HealthResponse = body_json(response).await;
    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn test_login_sets_http_only_token_cookies() {
    let state = create_test_app_state();

    let response: Response = send(
        &state,
        request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "username": "admin", "password": "correct-horse" })),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookies: Vec<String> = set_cookies(&response);
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().any(|c| c.starts_with("access_token=")));
    assert!(cookies.iter().any(|c| c.starts_with("refresh_token=")));
    assert!(cookies.iter().all(|c| c.contains("HttpOnly")));
    assert!(cookies.iter().all(|c| c.contains("SameSite=Lax")));
    assert!(cookies.iter().all(|c| !c.contains("Secure")));

    let body: LoginResponse = body_json(response).await;
    assert_eq!(body.user.username, "admin");
    assert_ne!(body.access_token, body.refresh_token);
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let state = create_test_app_state();

    let response: Response = send(
        &state,
        request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "username": "admin", "password": "wrong-password" })),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&response).is_empty());
    let body: ErrorResponse = body_json(response).await;
    assert!(body.error);
}

#[tokio::test]
async fn test_whoami_accepts_access_cookie() {
    let state = create_test_app_state();
    let tokens: LoginResponse = login(&state, "admin").await;

    let response: Response = send(
        &state,
        Request::builder()
            .uri("/auth/me")
            .header(
                header::COOKIE,
                format!("access_token={}", tokens.access_token),
            )
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let me: WhoAmIResponse = body_json(response).await;
    assert_eq!(me.user.username, "admin");
    assert!(me.location.is_none());
}

#[tokio::test]
async fn test_whoami_accepts_bearer_token() {
    let state = create_test_app_state();
    let venue: Venue = create_venue(&state, 5).await;

    let response: Response = send(
        &state,
        request("GET", "/auth/me", Some(&venue.kiosk_token), None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let me: WhoAmIResponse = body_json(response).await;
    assert_eq!(me.user.role, "Location");
    assert_eq!(
        me.location.map(|l| l.location_id),
        Some(venue.location.location_id)
    );
}

#[tokio::test]
async fn test_missing_credentials_is_unauthorized() {
    let state = create_test_app_state();

    let response: Response = send(&state, request("GET", "/auth/me", None, None)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: ErrorResponse = body_json(response).await;
    assert!(body.error);
    assert_eq!(body.message, "Authentication required");
}

#[tokio::test]
async fn test_malformed_authorization_header_is_unauthorized() {
    let state = create_test_app_state();

    let response: Response = send(
        &state,
        Request::builder()
            .uri("/auth/me")
            .header(header::AUTHORIZATION, "Basic YWRtaW46YWRtaW4=")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let state = create_test_app_state();
    let tokens: LoginResponse = login(&state, "admin").await;

    let response: Response = send(
        &state,
        request("GET", "/auth/me", Some(&tokens.refresh_token), None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_from_cookie_rotates_tokens() {
    let state = create_test_app_state();
    let tokens: LoginResponse = login(&state, "admin").await;
    let refresh_with_cookie = || {
        Request::builder()
            .method("POST")
            .uri("/auth/refresh")
            .header(
                header::COOKIE,
                format!("refresh_token={}", tokens.refresh_token),
            )
            .body(Body::empty())
            .unwrap()
    };

    let response: Response = send(&state, refresh_with_cookie()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(set_cookies(&response).len(), 2);
    let rotated: LoginResponse = body_json(response).await;
    assert_ne!(rotated.refresh_token, tokens.refresh_token);

    let me: Response = send(
        &state,
        request("GET", "/auth/me", Some(&rotated.access_token), None),
    )
    .await;
    assert_eq!(me.status(), StatusCode::OK);

    // Each refresh token works once.
    let replay: Response = send(&state, refresh_with_cookie()).await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_without_token_is_unauthorized() {
    let state = create_test_app_state();

    let response: Response = send(&state, request("POST", "/auth/refresh", None, None)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: ErrorResponse = body_json(response).await;
    assert_eq!(body.message, "Refresh token required");
}

#[tokio::test]
async fn test_logout_clears_cookies_and_ends_session() {
    let state = create_test_app_state();
    let tokens: LoginResponse = login(&state, "admin").await;

    let response: Response = send(
        &state,
        request("POST", "/auth/logout", Some(&tokens.access_token), None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookies: Vec<String> = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("access_token=;")));
    assert!(cookies.iter().any(|c| c.starts_with("refresh_token=;")));

    let me: Response = send(
        &state,
        request("GET", "/auth/me", Some(&tokens.access_token), None),
    )
    .await;
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_manager_cannot_create_users() {
    let state = create_test_app_state();
    create_user(&state, "manager", Role::Manager).await;
    let token: String = login(&state, "manager").await.access_token;

    let response: Response = send(
        &state,
        request(
            "POST",
            "/users",
            Some(&token),
            Some(json!({ "username": "someone", "password": "correct-horse", "role": "Manager" })),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: ErrorResponse = body_json(response).await;
    assert!(body.error);
}

#[tokio::test]
async fn test_unknown_role_is_bad_request() {
    let state = create_test_app_state();
    let token: String = login(&state, "admin").await.access_token;

    let response: Response = send(
        &state,
        request(
            "POST",
            "/users",
            Some(&token),
            Some(json!({
                "username": "someone",
                "password": "correct-horse",
                "role": "superuser",
            })),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_user_returns_created() {
    let state = create_test_app_state();
    let token: String = login(&state, "admin").await.access_token;

    let response: Response = send(
        &state,
        request(
            "POST",
            "/users",
            Some(&token),
            Some(json!({
                "username": "Staff.One",
                "password": "correct-horse",
                "role": "Manager",
            })),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let login_again: LoginResponse = login(&state, "staff.one").await;
    assert_eq!(login_again.user.role, "Manager");
}

#[tokio::test]
async fn test_duplicate_school_is_conflict() {
    let state = create_test_app_state();
    let venue: Venue = create_venue(&state, 5).await;

    let response: Response = send(
        &state,
        request(
            "POST",
            "/schools",
            Some(&venue.admin_token),
            Some(json!({ "name": "Lincoln Elementary" })),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_deleting_referenced_school_is_conflict() {
    let state = create_test_app_state();
    let venue: Venue = create_venue(&state, 5).await;
    assert_eq!(
        kiosk_check_in(&state, &venue).await.status(),
        StatusCode::CREATED
    );

    let response: Response = send(
        &state,
        request(
            "DELETE",
            &format!("/schools/{}", venue.school_id),
            Some(&venue.admin_token),
            None,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_list_schools_returns_page() {
    let state = create_test_app_state();
    let venue: Venue = create_venue(&state, 5).await;

    let response: Response = send(
        &state,
        request(
            "GET",
            "/schools?page=1&per_page=10&search=linc",
            Some(&venue.kiosk_token),
            None,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let page: Page<SchoolResponse> = body_json(response).await;
    assert_eq!(page.total, 1);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.items[0].name, "Lincoln Elementary");
}

#[tokio::test]
async fn test_location_by_name_is_public() {
    let state = create_test_app_state();
    let venue: Venue = create_venue(&state, 5).await;

    let response: Response = send(
        &state,
        request("GET", "/locations/by-name/Main%20Gym", None, None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let snapshot: LocationSnapshot = body_json(response).await;
    assert_eq!(snapshot.location_id, venue.location.location_id);
    assert_eq!(snapshot.name, "main-gym");
    assert_eq!(snapshot.available, 5);
}

#[tokio::test]
async fn test_unknown_location_by_name_is_not_found() {
    let state = create_test_app_state();

    let response: Response = send(
        &state,
        request("GET", "/locations/by-name/nowhere", None, None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ErrorResponse = body_json(response).await;
    assert!(body.message.contains("Location 'nowhere' not found"));
}

#[tokio::test]
async fn test_check_in_at_full_location_is_conflict() {
    let state = create_test_app_state();
    let venue: Venue = create_venue(&state, 1).await;

    assert_eq!(
        kiosk_check_in(&state, &venue).await.status(),
        StatusCode::CREATED
    );
    let response: Response = kiosk_check_in(&state, &venue).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: ErrorResponse = body_json(response).await;
    assert!(body.error);
}

#[tokio::test]
async fn test_manager_cannot_record_check_in() {
    let state = create_test_app_state();
    let venue: Venue = create_venue(&state, 5).await;
    create_user(&state, "manager", Role::Manager).await;
    let token: String = login(&state, "manager").await.access_token;

    let response: Response = send(
        &state,
        request(
            "POST",
            "/checkins",
            Some(&token),
            Some(json!({
                "school_id": venue.school_id,
                "location_id": venue.location.location_id,
            })),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_inverted_stats_range_is_bad_request() {
    let state = create_test_app_state();
    let venue: Venue = create_venue(&state, 5).await;

    let response: Response = send(
        &state,
        request(
            "GET",
            "/checkins/stats?from=2026-03-10&to=2026-03-01",
            Some(&venue.admin_token),
            None,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_static_dir_serves_unmatched_paths() {
    let state = create_test_app_state();
    let dir = std::env::temp_dir().join(format!("checkin-static-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("kiosk.html"), "<h1>kiosk</h1>").unwrap();

    let response: Response = build_router(state.clone(), Some(dir.clone()))
        .oneshot(request("GET", "/kiosk.html", None, None))
        .await
        .unwrap();
    let health: Response = build_router(state, Some(dir.clone()))
        .oneshot(request("GET", "/health", None, None))
        .await
        .unwrap();

    std::fs::remove_dir_all(&dir).unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body_bytes[..], b"<h1>kiosk</h1>");
    assert_eq!(health.status(), StatusCode::OK);
}

/// Asserts a 400 carrying the JSON error body.
async fn assert_json_bad_request(response: Response) -> ErrorResponse {
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
        "application/json"
    );
    let body: ErrorResponse = body_json(response).await;
    assert!(body.error);
    body
}

#[tokio::test]
async fn test_malformed_json_body_is_bad_request() {
    let state = create_test_app_state();
    let token: String = login(&state, "admin").await.access_token;

    let malformed: Request<Body> = Request::builder()
        .method("POST")
        .uri("/schools")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\":"))
        .unwrap();
    let response: Response = send(&state, malformed).await;

    assert_json_bad_request(response).await;
}

#[tokio::test]
async fn test_missing_body_field_is_bad_request() {
    let state = create_test_app_state();
    let token: String = login(&state, "admin").await.access_token;

    let response: Response = send(
        &state,
        request("POST", "/schools", Some(&token), Some(json!({}))),
    )
    .await;

    let body: ErrorResponse = assert_json_bad_request(response).await;
    assert!(body.message.contains("name"));
}

#[tokio::test]
async fn test_wrong_typed_body_field_is_bad_request() {
    let state = create_test_app_state();
    let token: String = login(&state, "admin").await.access_token;

    let response: Response = send(
        &state,
        request(
            "POST",
            "/locations",
            Some(&token),
            Some(json!({
                "name": "Library",
                "capacity": "ten",
                "username": "library",
                "password": "correct-horse",
            })),
        ),
    )
    .await;

    assert_json_bad_request(response).await;
}

#[tokio::test]
async fn test_login_without_content_type_is_bad_request() {
    let state = create_test_app_state();

    let untyped: Request<Body> = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .body(Body::from(json!({ "username": "admin", "password": "correct-horse" }).to_string()))
        .unwrap();
    let response: Response = send(&state, untyped).await;

    assert_json_bad_request(response).await;
}

#[tokio::test]
async fn test_non_numeric_path_id_is_bad_request() {
    let state = create_test_app_state();
    let token: String = login(&state, "admin").await.access_token;

    let response: Response = send(&state, request("GET", "/users/abc", Some(&token), None)).await;

    assert_json_bad_request(response).await;
}

#[tokio::test]
async fn test_negative_page_is_bad_request() {
    let state = create_test_app_state();
    let token: String = login(&state, "admin").await.access_token;

    let response: Response =
        send(&state, request("GET", "/schools?page=-1", Some(&token), None)).await;

    assert_json_bad_request(response).await;
}

#[tokio::test]
async fn test_unknown_endpoint_is_json_not_found() {
    let state = create_test_app_state();

    let response: Response = send(&state, request("GET", "/no-such-endpoint", None, None)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ErrorResponse = body_json(response).await;
    assert!(body.error);
}

#[test]
fn test_in_memory_server_database_uses_default_hash_cost() {
    let persistence: Persistence = open_persistence(None).unwrap();

    assert_eq!(persistence.hash_cost(), DEFAULT_HASH_COST);
}
