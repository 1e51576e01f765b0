/// Common test utilities for integration tests
///
/// Builds the full router over an in-memory store and signs in an admin and
/// an employee through the real `/v1/auth/sign-in` endpoint.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::{ApiConfig, Config, JwtConfig, StoreBackend, StoreConfig};
use taskboard_shared::store::MemoryStore;
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// A signed-in user
pub struct Session {
    pub user_id: Uuid,
    pub access_token: String,
    pub refresh_token: String,
}

impl Session {
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: MemoryStore,
    pub app: Router,
    pub admin: Session,
    pub employee: Session,
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        store: StoreConfig {
            backend: StoreBackend::Memory,
            database_url: None,
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
        },
    }
}

impl TestContext {
    pub async fn new() -> Self {
        let store = MemoryStore::new();
        let app = build_router(AppState::new(Arc::new(store.clone()), test_config()));

        let admin = sign_in(&app, "admin@example.com", "Ada Admin", "admin").await;
        let employee = sign_in(&app, "emp@example.com", "Eve Employee", "employee").await;

        Self {
            store,
            app,
            admin,
            employee,
        }
    }

    /// Sends a request and returns the status and parsed JSON body (Null if empty)
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        session: Option<&Session>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        send(&self.app, method, uri, session.map(|s| s.auth_header()), body).await
    }

    /// Creates a task as the admin and returns its id
    pub async fn create_task(&self, title: &str, assigned_to: Uuid) -> Uuid {
        let (status, body) = self
            .send(
                "POST",
                "/v1/tasks",
                Some(&self.admin),
                Some(json!({
                    "title": title,
                    "description": "created in a test",
                    "assigned_to": assigned_to,
                    "priority": "medium"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);

        body["id"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .expect("task id in response")
    }
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    auth_header: Option<String>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(header) = auth_header {
        builder = builder.header("authorization", header);
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    (status, json)
}

pub async fn sign_in(app: &Router, email: &str, name: &str, role: &str) -> Session {
    let (status, body) = send(
        app,
        "POST",
        "/v1/auth/sign-in",
        None,
        Some(json!({ "email": email, "name": name, "role": role })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "sign-in failed: {}", body);

    Session {
        user_id: body["user_id"].as_str().unwrap().parse().unwrap(),
        access_token: body["access_token"].as_str().unwrap().to_string(),
        refresh_token: body["refresh_token"].as_str().unwrap().to_string(),
    }
}
