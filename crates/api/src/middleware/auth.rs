//! Authentication extractor.
//!
//! Verifies the Bearer identity assertion and exposes the request's
//! [`Principal`] to handlers. A missing or invalid token is 401; role
//! decisions happen later in the policy and map to 403.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AppError;
use crate::services::auth::token;
use crate::services::policy::Principal;
use crate::state::AppState;

/// Extractor that requires a valid Bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(principal): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, user {}!", principal.id)
/// }
/// ```
pub struct RequireAuth(pub Principal);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                AppError::Unauthenticated("Not authorized to access this route".to_owned())
            })?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Unauthenticated("Not authorized to access this route".to_owned())
        })?;

        let claims = token::verify(token, state.config().token_secret_bytes())
            .map_err(|_| AppError::Unauthenticated("Invalid or expired token".to_owned()))?;

        Ok(Self(claims.principal()))
    }
}
