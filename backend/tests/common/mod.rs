//! Common test utilities for integration tests
//!
//! Every `TestApp` gets its own in-memory SQLite database.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use meal_tracker_backend::{config::AppConfig, db, routes, state::AppState};
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub pool: SqlitePool,
}

impl TestApp {
    /// Create a new test application over a fresh, migrated database
    pub async fn new() -> Self {
        let config = AppConfig::in_memory();
        let pool = db::create_pool(&config.database.url, config.database.max_connections)
            .await
            .expect("Failed to create test database pool");

        db::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let state = AppState::new(pool.clone(), config);
        let app = routes::create_router(state);

        Self { app, pool }
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.send("GET", path, None).await
    }

    /// Make a POST request with JSON body
    pub async fn post(&self, path: &str, body: &str) -> (StatusCode, Value) {
        self.send("POST", path, Some(body)).await
    }

    /// Make a PUT request with JSON body
    pub async fn put(&self, path: &str, body: &str) -> (StatusCode, Value) {
        self.send("PUT", path, Some(body)).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> (StatusCode, Value) {
        self.send("DELETE", path, None).await
    }

    async fn send(&self, method: &str, path: &str, body: Option<&str>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(path);
        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, json)
    }
}

/// A valid create payload
pub fn meal_json(name: &str, category: &str, calories: i64) -> String {
    serde_json::json!({
        "name": name,
        "description": "test meal",
        "category": category,
        "calories": calories,
        "nutrition": { "protein": 20.0, "carbs": 30.0, "fat": 10.0 }
    })
    .to_string()
}
