//! Shared helpers for integration tests: an in-memory database with the
//! schema applied, direct-seeding shortcuts, and a full-router harness.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower::ServiceExt;

use storepulse_api::config::ApiConfig;
use storepulse_api::db::users::NewUser;
use storepulse_api::db::{MIGRATOR, UserRepository};
use storepulse_api::routes;
use storepulse_api::services::auth::AuthService;
use storepulse_api::state::AppState;
use storepulse_core::{Email, Role, StoreId, UserId};

pub const TEST_SECRET: &str = "k9PzWq3v8Tb1mXc5Rf7Jh2Ln4Ds6Gy0A";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "Admin@123";

/// A fresh in-memory database with migrations applied.
///
/// A single connection keeps the `:memory:` database alive for the whole
/// test.
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("valid sqlite url")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("connect to in-memory sqlite");

    MIGRATOR.run(&pool).await.expect("run migrations");
    pool
}

/// Insert a user row directly. The stored hash is not a real credential;
/// tests that need login go through the HTTP signup flow instead.
pub async fn seed_user(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    role: Role,
    store_id: Option<StoreId>,
) -> UserId {
    let email = Email::parse(email).expect("valid email");
    let users = UserRepository::new(pool);
    let user = users
        .create(&NewUser {
            name,
            email: &email,
            password_hash: "seeded-not-a-real-hash",
            address: None,
            role,
            store_id,
        })
        .await
        .expect("seed user");
    user.id
}

/// Insert a store row directly.
pub async fn seed_store(pool: &SqlitePool, name: &str, email: &str, address: &str) -> StoreId {
    use storepulse_api::db::StoreRepository;
    use storepulse_api::db::stores::NewStore;

    let email = Email::parse(email).expect("valid email");
    let stores = StoreRepository::new(pool);
    let store = stores
        .create(
            &NewStore {
                name,
                email: &email,
                address,
            },
            None,
        )
        .await
        .expect("seed store");
    store.id
}

fn test_config() -> ApiConfig {
    ApiConfig {
        database_url: "sqlite::memory:".to_owned(),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        token_secret: SecretString::from(TEST_SECRET),
        token_ttl_secs: 3600,
        sentry_dsn: None,
    }
}

/// Router plus the pool behind it, with one admin account seeded.
pub async fn setup() -> (Router, SqlitePool) {
    let pool = test_pool().await;

    let auth = AuthService::new(&pool, TEST_SECRET.as_bytes(), 3600);
    auth.create_user(
        "Platform Administrator Account",
        ADMIN_EMAIL,
        ADMIN_PASSWORD,
        None,
        Role::Admin,
        None,
    )
    .await
    .expect("seed admin");

    let state = AppState::new(test_config(), pool.clone());
    (routes::app(state), pool)
}

/// Drive one request through the router, returning status and parsed body.
pub async fn send(
    app: &Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("build request");

    let response = app.clone().oneshot(request).await.expect("send request");
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

/// Login over HTTP, returning the issued token.
pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["data"]["token"]
        .as_str()
        .expect("token in login response")
        .to_owned()
}
