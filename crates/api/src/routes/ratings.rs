//! Rating route handlers.
//!
//! Submission and the own-rating reads require role `user`. The my-store
//! endpoint is the store-owner read surface; the store it reports on comes
//! from the caller's token, never from the request, so an owner cannot read
//! another store's raters by varying an ID.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use storepulse_core::StoreId;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::ApiResponse;
use crate::models::rating::Rater;
use crate::services::aggregation::AggregationEngine;
use crate::services::ledger::{RatingLedger, SubmitOutcome};
use crate::services::policy::{self, Action, Deny};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRatingRequest {
    pub store_id: i64,
    pub rating: i64,
}

/// The caller's rating for a store; `null` when none exists.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnRating {
    pub rating: Option<i64>,
}

/// The my-store payload: summary plus every rater, newest first.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyStoreRatings {
    pub average_rating: f64,
    pub total_ratings: i64,
    pub ratings: Vec<Rater>,
}

/// POST /ratings (role=user)
///
/// Creates the rating, or overwrites the caller's existing rating for the
/// store in place. 201 for a fresh rating, 200 for an overwrite.
pub async fn submit(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Json(req): Json<SubmitRatingRequest>,
) -> Result<impl IntoResponse> {
    policy::authorize(&principal, &Action::SubmitRating)?;

    if req.store_id < 1 {
        return Err(AppError::Validation("Valid store ID is required".to_owned()));
    }

    let ledger = RatingLedger::new(state.pool());
    let (rating, outcome) = ledger
        .submit(principal.id, StoreId::new(req.store_id), req.rating)
        .await?;

    let payload = OwnRating {
        rating: Some(rating.value.as_i64()),
    };
    let response = match outcome {
        SubmitOutcome::Created => (
            StatusCode::CREATED,
            ApiResponse::ok_with_message(payload, "Rating submitted successfully"),
        ),
        SubmitOutcome::Updated => (
            StatusCode::OK,
            ApiResponse::ok_with_message(payload, "Rating updated successfully"),
        ),
    };

    Ok(response)
}

/// GET /ratings/store/:storeId (role=user)
///
/// Always 200; an absent rating is `{"rating": null}`, not a 404.
pub async fn show_own(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(store_id): Path<i64>,
) -> Result<impl IntoResponse> {
    policy::authorize(&principal, &Action::ReadOwnRating)?;

    let ledger = RatingLedger::new(state.pool());
    let rating = ledger
        .get_for_user_and_store(principal.id, StoreId::new(store_id))
        .await?;

    Ok(ApiResponse::ok(OwnRating {
        rating: rating.map(|r| r.value.as_i64()),
    }))
}

/// DELETE /ratings/store/:storeId (role=user)
pub async fn remove_own(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(store_id): Path<i64>,
) -> Result<impl IntoResponse> {
    policy::authorize(&principal, &Action::DeleteOwnRating)?;

    let ledger = RatingLedger::new(state.pool());
    ledger.delete(principal.id, StoreId::new(store_id)).await?;

    Ok(ApiResponse::message("Rating deleted successfully"))
}

/// GET /ratings/my-store (role=store_owner)
///
/// The store comes from the caller's token. 404 if that store has since
/// been deleted.
pub async fn my_store(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
) -> Result<impl IntoResponse> {
    policy::authorize(&principal, &Action::ReadOwnStoreRatings)?;
    let store_id = principal.store_id.ok_or(Deny::NoStoreAssociated)?;

    let aggregation = AggregationEngine::new(state.pool());
    let summary = aggregation.store_summary(store_id).await?;
    let raters = aggregation.raters(store_id).await?;

    Ok(ApiResponse::ok(MyStoreRatings {
        average_rating: summary.average_rating,
        total_ratings: summary.total_ratings,
        ratings: raters,
    }))
}
