//! Common test utilities for committee portal integration tests
//!
//! Every test gets its own application backed by a private in-memory
//! database, plus small helpers for sending JSON requests through it.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use committee_portal::{create_app, db::init_pool, run_migrations};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::Service;

/// Creates a test application with an in-memory SQLite database
///
/// The database is a named shared-cache memory database so that every
/// connection in the pool sees the same schema and data.
///
/// ### Returns
///
/// An Axum Router configured with all routes and connected to a fresh database
pub fn create_test_app() -> Router {
    let database_url = format!("file:it_{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
    let pool = Arc::new(init_pool(&database_url).unwrap());

    let conn = &mut pool.get().unwrap();
    run_migrations(conn).unwrap();

    create_app(pool)
}

/// Sends a request and returns the status together with the parsed JSON body
///
/// ### Arguments
///
/// * `app` - The test application
/// * `method` - HTTP method
/// * `uri` - Request path, including any query string
/// * `body` - Optional JSON body
/// * `user_id` - Optional id sent in the `X-User-Id` header
pub async fn send(
    app: &mut Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    user_id: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(user_id) = user_id {
        builder = builder.header("X-User-Id", user_id);
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.call(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub async fn get(app: &mut Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None, None).await
}

pub async fn post(app: &mut Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(body), None).await
}

pub async fn put(app: &mut Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "PUT", uri, Some(body), None).await
}

pub async fn delete(app: &mut Router, uri: &str) -> (StatusCode, Value) {
    send(app, "DELETE", uri, None, None).await
}

/// Creates a transaction via the API and returns its id
pub async fn create_transaction(app: &mut Router, kind: &str, amount_cents: i64, date: &str) -> String {
    let (status, body) = post(
        app,
        "/transactions",
        json!({
            "kind": kind,
            "amount_cents": amount_cents,
            "description": format!("{} of {}", kind, amount_cents),
            "date": date,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body["id"].as_str().unwrap().to_string()
}

/// Creates an inventory item via the API and returns its id
pub async fn create_item(app: &mut Router, name: &str, quantity: i32) -> String {
    let (status, body) = post(
        app,
        "/inventory",
        json!({
            "name": name,
            "quantity": quantity,
            "location": "Storage room",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body["id"].as_str().unwrap().to_string()
}

/// Creates a user with the given role via the API and returns its id
pub async fn create_user(app: &mut Router, name: &str, role: &str) -> String {
    let (status, body) = post(
        app,
        "/users",
        json!({
            "name": name,
            "email": format!("{}@example.org", name.to_lowercase()),
            "role": role,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body["id"].as_str().unwrap().to_string()
}
