//! Auth route handlers: signup, login, current account, password change.

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{ApiResponse, UserView};
use crate::services::auth::AuthService;
use crate::services::policy::{self, Action};
use crate::state::AppState;
use crate::validation;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Token plus the account it asserts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub user: UserView,
    pub token: String,
}

/// POST /auth/signup
///
/// Public registration; the role is always `user`.
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse> {
    validation::validate_name(&req.name).map_err(AppError::Validation)?;
    validation::validate_address(req.address.as_deref()).map_err(AppError::Validation)?;

    let auth = auth_service(&state);
    let (user, token) = auth
        .signup(&req.name, &req.email, &req.password, req.address.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok_with_message(
            AuthPayload {
                user: user.into(),
                token,
            },
            "User registered successfully",
        ),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let auth = auth_service(&state);
    let (user, token) = auth.login(&req.email, &req.password).await?;

    Ok(ApiResponse::ok_with_message(
        AuthPayload {
            user: user.into(),
            token,
        },
        "Login successful",
    ))
}

/// GET /auth/me
///
/// The account behind the presented token. 404 if the account was deleted
/// after the token was issued.
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
) -> Result<impl IntoResponse> {
    let users = UserRepository::new(state.pool());
    let user = users
        .get_by_id(principal.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;

    Ok(ApiResponse::ok(UserView::from(user)))
}

/// PUT /auth/update-password
///
/// Verifies the current password before storing the new one.
pub async fn update_password(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Json(req): Json<UpdatePasswordRequest>,
) -> Result<impl IntoResponse> {
    policy::authorize(
        &principal,
        &Action::UpdateOwnCredential {
            target: principal.id,
        },
    )?;

    let auth = auth_service(&state);
    auth.update_password(principal.id, &req.current_password, &req.new_password)
        .await?;

    Ok(ApiResponse::message("Password updated successfully"))
}

fn auth_service(state: &AppState) -> AuthService<'_> {
    AuthService::new(
        state.pool(),
        state.config().token_secret_bytes(),
        state.config().token_ttl_secs,
    )
}
