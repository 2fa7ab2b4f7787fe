//! Rating domain types and aggregate projections.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use storepulse_core::{RatingId, RatingValue, StoreId, UserId};

/// A single user's rating of a single store (domain type).
///
/// At most one of these exists per (user, store) pair; resubmission updates
/// the row in place rather than allocating a new identity.
#[derive(Debug, Clone)]
pub struct Rating {
    /// Unique rating ID.
    pub id: RatingId,
    /// The rating owner.
    pub user_id: UserId,
    /// The rated store.
    pub store_id: StoreId,
    /// Star value, 1..=5.
    pub value: RatingValue,
    /// When the rating was first submitted.
    pub created_at: DateTime<Utc>,
    /// When the value was last changed.
    pub updated_at: DateTime<Utc>,
}

/// Per-store rating rollup.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSummary {
    /// Arithmetic mean rounded to 2 decimal places; 0 when there are no
    /// ratings (never null/NaN).
    pub average_rating: f64,
    pub total_ratings: i64,
}

/// One bucket of a store's rating distribution.
///
/// Values with no ratings are omitted; consumers treat an absent value as
/// count 0.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionBucket {
    pub value: i64,
    pub count: i64,
}

/// A leaderboard entry: stores with at least one rating, best average first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopStore {
    pub store_id: StoreId,
    pub name: String,
    pub address: String,
    pub average_rating: f64,
    pub total_ratings: i64,
}

/// Platform-wide entity counts for the admin dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformCounts {
    pub total_users: i64,
    pub total_stores: i64,
    pub total_ratings: i64,
    /// Role name -> number of accounts with that role.
    pub users_by_role: BTreeMap<String, i64>,
}

/// A recently submitted rating with display names resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentRating {
    pub id: RatingId,
    pub value: i64,
    pub user_name: String,
    pub store_name: String,
    pub created_at: DateTime<Utc>,
}

/// A user who rated a store, as shown to that store's owner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rater {
    pub rating_id: RatingId,
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub value: i64,
    pub created_at: DateTime<Utc>,
}
