//! Dashboard route handlers.

use axum::extract::State;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::db::StoreRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::rating::{DistributionBucket, PlatformCounts, Rater, RecentRating, TopStore};
use crate::models::{ApiResponse, StoreInfo};
use crate::services::aggregation::AggregationEngine;
use crate::services::policy::{self, Action, Deny};
use crate::state::AppState;

const RECENT_RATINGS_LIMIT: i64 = 10;
const TOP_STORES_LIMIT: i64 = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    #[serde(flatten)]
    pub counts: PlatformCounts,
    pub recent_ratings: Vec<RecentRating>,
    pub top_stores: Vec<TopStore>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreOwnerDashboard {
    pub store: StoreInfo,
    pub average_rating: f64,
    pub total_ratings: i64,
    pub rating_distribution: Vec<DistributionBucket>,
    pub raters: Vec<Rater>,
}

/// GET /dashboard/admin (admin)
pub async fn admin(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
) -> Result<impl IntoResponse> {
    policy::authorize(&principal, &Action::ReadPlatformRollups)?;

    let aggregation = AggregationEngine::new(state.pool());
    let counts = aggregation.platform_counts().await?;
    let recent_ratings = aggregation.recent_ratings(RECENT_RATINGS_LIMIT).await?;
    let top_stores = aggregation.top_stores(TOP_STORES_LIMIT).await?;

    Ok(ApiResponse::ok(AdminDashboard {
        counts,
        recent_ratings,
        top_stores,
    }))
}

/// GET /dashboard/store-owner (role=store_owner)
///
/// Like `/ratings/my-store`, the store comes from the caller's token.
pub async fn store_owner(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
) -> Result<impl IntoResponse> {
    policy::authorize(&principal, &Action::ReadOwnStoreRatings)?;
    let store_id = principal.store_id.ok_or(Deny::NoStoreAssociated)?;

    let stores = StoreRepository::new(state.pool());
    let store = stores
        .get_by_id(store_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Store not found".to_owned()))?;

    let aggregation = AggregationEngine::new(state.pool());
    let summary = aggregation.store_summary(store_id).await?;
    let rating_distribution = aggregation.rating_distribution(store_id).await?;
    let raters = aggregation.raters(store_id).await?;

    Ok(ApiResponse::ok(StoreOwnerDashboard {
        store: StoreInfo::from(store),
        average_rating: summary.average_rating,
        total_ratings: summary.total_ratings,
        rating_distribution,
        raters,
    }))
}
