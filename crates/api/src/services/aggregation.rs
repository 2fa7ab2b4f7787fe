//! Aggregation engine: read-only rollups over the rating set.
//!
//! Pure read-side computation; every call reflects the database state at
//! call time. The ledger keeps no aggregate cache to invalidate, so
//! read-after-write consistency holds trivially.

use sqlx::SqlitePool;
use thiserror::Error;

use storepulse_core::StoreId;

use crate::db::{RatingRepository, RepositoryError, StoreRepository, UserRepository};
use crate::models::rating::{
    DistributionBucket, PlatformCounts, Rater, RecentRating, StoreSummary, TopStore,
};
use crate::models::round2;

/// Errors from aggregation reads.
#[derive(Debug, Error)]
pub enum AggregationError {
    /// The referenced store does not exist.
    #[error("store not found")]
    StoreNotFound,

    /// Repository/database error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Read-only component computing per-store and platform-wide rollups.
pub struct AggregationEngine<'a> {
    ratings: RatingRepository<'a>,
    stores: StoreRepository<'a>,
    users: UserRepository<'a>,
}

impl<'a> AggregationEngine<'a> {
    /// Create a new aggregation engine over the given pool.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            ratings: RatingRepository::new(pool),
            stores: StoreRepository::new(pool),
            users: UserRepository::new(pool),
        }
    }

    /// Mean and count for a store. The mean is 0 (never null/NaN) when the
    /// store has no ratings.
    ///
    /// # Errors
    ///
    /// Returns `AggregationError::StoreNotFound` for an ID that no longer
    /// references a store - a deleted store has no summary.
    pub async fn store_summary(&self, store_id: StoreId) -> Result<StoreSummary, AggregationError> {
        if !self.stores.exists(store_id).await? {
            return Err(AggregationError::StoreNotFound);
        }

        let (average, total) = self.ratings.summary(store_id).await?;

        Ok(StoreSummary {
            average_rating: round2(average),
            total_ratings: total,
        })
    }

    /// Rating-value histogram for a store, value descending.
    ///
    /// # Errors
    ///
    /// Returns `AggregationError::StoreNotFound` if the store doesn't exist.
    pub async fn rating_distribution(
        &self,
        store_id: StoreId,
    ) -> Result<Vec<DistributionBucket>, AggregationError> {
        if !self.stores.exists(store_id).await? {
            return Err(AggregationError::StoreNotFound);
        }

        let buckets = self.ratings.distribution(store_id).await?;
        Ok(buckets
            .into_iter()
            .map(|(value, count)| DistributionBucket { value, count })
            .collect())
    }

    /// The `limit` best-rated stores that have at least one rating.
    ///
    /// # Errors
    ///
    /// Returns `AggregationError::Repository` for database errors.
    pub async fn top_stores(&self, limit: i64) -> Result<Vec<TopStore>, AggregationError> {
        Ok(self.ratings.top_stores(limit).await?)
    }

    /// Everyone who rated a store, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AggregationError::Repository` for database errors.
    pub async fn raters(&self, store_id: StoreId) -> Result<Vec<Rater>, AggregationError> {
        Ok(self.ratings.raters(store_id).await?)
    }

    /// The `limit` most recent ratings across the platform.
    ///
    /// # Errors
    ///
    /// Returns `AggregationError::Repository` for database errors.
    pub async fn recent_ratings(&self, limit: i64) -> Result<Vec<RecentRating>, AggregationError> {
        Ok(self.ratings.recent(limit).await?)
    }

    /// Platform-wide entity counts plus the per-role user breakdown.
    ///
    /// # Errors
    ///
    /// Returns `AggregationError::Repository` for database errors.
    pub async fn platform_counts(&self) -> Result<PlatformCounts, AggregationError> {
        let total_users = self.users.count_all().await?;
        let total_stores = self.stores.count_all().await?;
        let total_ratings = self.ratings.count_all().await?;
        let users_by_role = self.users.count_by_role().await?.into_iter().collect();

        Ok(PlatformCounts {
            total_users,
            total_stores,
            total_ratings,
            users_by_role,
        })
    }
}
