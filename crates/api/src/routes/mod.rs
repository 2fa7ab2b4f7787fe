//! HTTP route handlers for the rating API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness check (verifies database)
//!
//! # Auth
//! POST /auth/signup                - Create account (role=user), returns token
//! POST /auth/login                 - Verify credential, returns token
//! GET  /auth/me                    - Current principal's account
//! PUT  /auth/update-password       - Verify current credential, replace it
//!
//! # Stores
//! GET    /stores                   - Catalog with filter/sort (any principal)
//! GET    /stores/:id               - Single store view (any principal)
//! POST   /stores                   - Create store, optionally with owner (admin)
//! PUT    /stores/:id               - Update store fields (admin)
//! DELETE /stores/:id               - Delete store, cascade ratings (admin)
//!
//! # Users (admin)
//! GET    /users                    - User catalog with filter/sort
//! POST   /users                    - Create account with explicit role
//! GET    /users/:id                - Single user view
//! DELETE /users/:id                - Delete account
//!
//! # Ratings (role=user)
//! POST   /ratings                  - Submit or overwrite own rating
//! GET    /ratings/store/:storeId   - Own rating for a store, or null
//! DELETE /ratings/store/:storeId   - Delete own rating
//! GET    /ratings/my-store         - All ratings for own store (store_owner)
//!
//! # Dashboards
//! GET /dashboard/admin             - Platform counts + recent + top stores
//! GET /dashboard/store-owner       - Own store summary + distribution + raters
//! ```

pub mod auth;
pub mod dashboard;
pub mod ratings;
pub mod stores;
pub mod users;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/update-password", put(auth::update_password))
}

/// Create the store routes router.
pub fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(stores::list).post(stores::create))
        .route(
            "/{id}",
            get(stores::show).put(stores::update).delete(stores::remove),
        )
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list).post(users::create))
        .route("/{id}", get(users::show).delete(users::remove))
}

/// Create the rating routes router.
pub fn rating_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(ratings::submit))
        .route("/my-store", get(ratings::my_store))
        .route(
            "/store/{storeId}",
            get(ratings::show_own).delete(ratings::remove_own),
        )
}

/// Create the dashboard routes router.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/admin", get(dashboard::admin))
        .route("/store-owner", get(dashboard::store_owner))
}

/// Assemble the full application router, including health endpoints.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/auth", auth_routes())
        .nest("/stores", store_routes())
        .nest("/users", user_routes())
        .nest("/ratings", rating_routes())
        .nest("/dashboard", dashboard_routes())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
