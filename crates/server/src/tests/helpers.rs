// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shared router fixtures.

use axum::{
    body::Body,
    http::{Request, header},
    response::Response,
};
use checkin_api::{ApiConfig, LocationResponse, LoginResponse, Role, SchoolResponse};
use checkin_persistence::Persistence;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceExt;

use crate::live::OccupancyBroadcaster;
use crate::{AppState, build_router};

pub const TEST_PASSWORD: &str = "correct-horse";

/// Helper to create test app state with in-memory persistence and an
/// `admin` account.
pub fn create_test_app_state() -> AppState {
    let mut persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    persistence
        .create_user("admin", TEST_PASSWORD, Role::Admin)
        .expect("Failed to create admin");
    AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        broadcaster: OccupancyBroadcaster::new(),
        config: ApiConfig::default(),
        secure_cookies: false,
    }
}

pub async fn create_user(state: &AppState, username: &str, role: Role) {
    state
        .persistence
        .lock()
        .await
        .create_user(username, TEST_PASSWORD, role)
        .unwrap();
}

pub async fn send(state: &AppState, request: Request<Body>) -> Response {
    build_router(state.clone(), None)
        .oneshot(request)
        .await
        .unwrap()
}

/// Builds a request with an optional Bearer token and JSON body.
pub fn request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_json<T: DeserializeOwned>(response: Response) -> T {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

/// Every `Set-Cookie` header of a response.
pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

pub async fn login(state: &AppState, username: &str) -> LoginResponse {
    let response: Response = send(
        state,
        request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "username": username, "password": TEST_PASSWORD })),
        ),
    )
    .await;
    assert_eq!(response.status(), 200);
    body_json(response).await
}

/// A location with a kiosk account and one school.
pub struct Venue {
    pub admin_token: String,
    pub kiosk_token: String,
    pub location: LocationResponse,
    pub school_id: i64,
}

/// Creates "Main Gym" with the given capacity, kiosk account `gym`, and
/// the school "Lincoln Elementary".
pub async fn create_venue(state: &AppState, capacity: i64) -> Venue {
    let admin_token: String = login(state, "admin").await.access_token;

    let response: Response = send(
        state,
        request(
            "POST",
            "/schools",
            Some(&admin_token),
            Some(json!({ "name": "Lincoln Elementary" })),
        ),
    )
    .await;
    assert_eq!(response.status(), 201);
    let school: SchoolResponse = body_json(response).await;

    let response: Response = send(
        state,
        request(
            "POST",
            "/locations",
            Some(&admin_token),
            Some(json!({
                "name": "Main Gym",
                "capacity": capacity,
                "username": "gym",
                "password": TEST_PASSWORD,
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), 201);
    let location: LocationResponse = body_json(response).await;

    let kiosk_token: String = login(state, "gym").await.access_token;

    Venue {
        admin_token,
        kiosk_token,
        location,
        school_id: school.school_id,
    }
}

pub async fn kiosk_check_in(state: &AppState, venue: &Venue) -> Response {
    send(
        state,
        request(
            "POST",
            "/checkins",
            Some(&venue.kiosk_token),
            Some(json!({ "school_id": venue.school_id })),
        ),
    )
    .await
}
