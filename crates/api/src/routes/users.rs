//! User route handlers. The whole surface is admin-only.

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use storepulse_core::{Role, UserId};

use crate::db::users::{UserFilter, UserSortField};
use crate::db::{SortOrder, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{ApiResponse, UserView};
use crate::services::auth::AuthService;
use crate::services::catalog::CatalogService;
use crate::services::policy::{self, Action};
use crate::state::AppState;
use crate::validation;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: Option<String>,
    pub role: String,
}

/// GET /users (admin)
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Query(query): Query<UserListQuery>,
) -> Result<impl IntoResponse> {
    policy::authorize(&principal, &Action::ManageUsers)?;

    let role = query
        .role
        .as_deref()
        .map(str::parse::<Role>)
        .transpose()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let filter = UserFilter {
        name: query.name,
        email: query.email,
        address: query.address,
        role,
    };
    let sort = UserSortField::from_param(query.sort_by.as_deref());
    let order = SortOrder::from_param(query.sort_order.as_deref());

    let catalog = CatalogService::new(state.pool());
    let users = catalog.list_users(&filter, sort, order).await?;

    Ok(ApiResponse::ok(users))
}

/// GET /users/:id (admin)
///
/// Store-owner rows include the owned store's name and average rating.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    policy::authorize(&principal, &Action::ManageUsers)?;

    let catalog = CatalogService::new(state.pool());
    let user = catalog
        .get_user(UserId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;

    Ok(ApiResponse::ok(user))
}

/// POST /users (admin)
///
/// Creates an account with an explicit role. No token is issued.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse> {
    policy::authorize(&principal, &Action::ManageUsers)?;

    validation::validate_name(&req.name).map_err(AppError::Validation)?;
    validation::validate_address(req.address.as_deref()).map_err(AppError::Validation)?;
    let role = req
        .role
        .parse::<Role>()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let auth = AuthService::new(
        state.pool(),
        state.config().token_secret_bytes(),
        state.config().token_ttl_secs,
    );
    let user = auth
        .create_user(
            &req.name,
            &req.email,
            &req.password,
            req.address.as_deref(),
            role,
            None,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok_with_message(UserView::from(user), "User created successfully"),
    ))
}

/// DELETE /users/:id (admin)
///
/// The user's ratings cascade away with the account.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    policy::authorize(&principal, &Action::ManageUsers)?;

    let users = UserRepository::new(state.pool());
    users.delete(UserId::new(id)).await?;

    Ok(ApiResponse::message("User deleted successfully"))
}
