// SPDX-License-Identifier: MIT
// Copyright 2026 Focus Flow contributors

use axum::body::Body;
use axum::http::{header, Request};
use focus_flow::config::Config;
use focus_flow::db::SupabaseDb;
use focus_flow::middleware::auth::create_session_token;
use focus_flow::routes::create_router;
use focus_flow::AppState;
use std::sync::Arc;

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> SupabaseDb {
    SupabaseDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config: Config::test_default(),
        db: test_db_offline(),
    });

    (create_router(state.clone()), state)
}

/// Sign a session token valid for one day.
#[allow(dead_code)]
pub fn create_test_jwt(external_id: &str, signing_key: &[u8]) -> String {
    create_session_token(external_id, signing_key, 86_400).expect("token should sign")
}

/// Build an authenticated request with an optional JSON body.
#[allow(dead_code)]
pub fn authed_request(method: &str, uri: &str, token: &str, body: Option<&str>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
