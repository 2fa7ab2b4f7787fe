//! Rating repository: the one-row-per-(user, store) ledger and every
//! aggregate read the dashboards depend on.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use storepulse_core::{RatingId, RatingValue, StoreId, UserId};

use super::RepositoryError;
use crate::models::rating::{Rater, Rating, RecentRating, TopStore};

#[derive(sqlx::FromRow)]
struct RatingRow {
    id: i64,
    user_id: i64,
    store_id: i64,
    value: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RatingRow {
    fn into_rating(self) -> Result<Rating, RepositoryError> {
        let value = RatingValue::new(self.value).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid rating value in database: {e}"))
        })?;

        Ok(Rating {
            id: RatingId::new(self.id),
            user_id: UserId::new(self.user_id),
            store_id: StoreId::new(self.store_id),
            value,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const RATING_COLUMNS: &str = "id, user_id, store_id, value, created_at, updated_at";

/// Repository for rating database operations.
pub struct RatingRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RatingRepository<'a> {
    /// Create a new rating repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or overwrite the (user, store) rating in one atomic statement.
    ///
    /// The `UNIQUE(user_id, store_id)` constraint makes concurrent
    /// submissions collapse to a single surviving row, last writer wins.
    /// Returns the row plus `true` when a new row was created (as opposed to
    /// an existing one being overwritten). The flag is computed inside the
    /// statement: only a fresh insert stores this call's timestamp as
    /// `created_at`, an overwrite keeps the original one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store (or user) no longer
    /// exists, or `RepositoryError::Database` for other database errors.
    pub async fn upsert(
        &self,
        user_id: UserId,
        store_id: StoreId,
        value: RatingValue,
    ) -> Result<(Rating, bool), RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct UpsertRow {
            #[sqlx(flatten)]
            rating: RatingRow,
            created: bool,
        }

        let now = Utc::now();
        let row = sqlx::query_as::<_, UpsertRow>(&format!(
            "INSERT INTO ratings (user_id, store_id, value, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT (user_id, store_id) \
             DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at \
             RETURNING {RATING_COLUMNS}, (created_at = ?) AS created"
        ))
        .bind(user_id.as_i64())
        .bind(store_id.as_i64())
        .bind(value.as_i64())
        .bind(now)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        Ok((row.rating.into_rating()?, row.created))
    }

    /// Get a user's rating for a store, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user_and_store(
        &self,
        user_id: UserId,
        store_id: StoreId,
    ) -> Result<Option<Rating>, RepositoryError> {
        let row = sqlx::query_as::<_, RatingRow>(&format!(
            "SELECT {RATING_COLUMNS} FROM ratings WHERE user_id = ? AND store_id = ?"
        ))
        .bind(user_id.as_i64())
        .bind(store_id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(RatingRow::into_rating).transpose()
    }

    /// Delete a user's rating for a store.
    ///
    /// Returns `true` if a row was deleted, `false` if none existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(
        &self,
        user_id: UserId,
        store_id: StoreId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM ratings WHERE user_id = ? AND store_id = ?")
            .bind(user_id.as_i64())
            .bind(store_id.as_i64())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Raw summary for a store: (mean, count). Mean is 0.0 when unrated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summary(&self, store_id: StoreId) -> Result<(f64, i64), RepositoryError> {
        let row: (f64, i64) = sqlx::query_as(
            "SELECT COALESCE(AVG(value), 0.0), COUNT(*) FROM ratings WHERE store_id = ?",
        )
        .bind(store_id.as_i64())
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    /// Rating-value histogram for a store, highest value first.
    ///
    /// Values nobody has submitted are absent from the result.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn distribution(
        &self,
        store_id: StoreId,
    ) -> Result<Vec<(i64, i64)>, RepositoryError> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT value, COUNT(*) FROM ratings \
             WHERE store_id = ? \
             GROUP BY value \
             ORDER BY value DESC",
        )
        .bind(store_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Best-rated stores, restricted to stores with at least one rating.
    ///
    /// Ordered by average descending with store ID as a stable tiebreak,
    /// truncated to `limit`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_stores(&self, limit: i64) -> Result<Vec<TopStore>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct TopStoreRow {
            store_id: i64,
            name: String,
            address: String,
            average_rating: f64,
            total_ratings: i64,
        }

        let rows: Vec<TopStoreRow> = sqlx::query_as(
            "SELECT s.id AS store_id, s.name, s.address, \
             AVG(r.value) AS average_rating, \
             COUNT(r.id) AS total_ratings \
             FROM stores s \
             JOIN ratings r ON r.store_id = s.id \
             GROUP BY s.id, s.name, s.address \
             ORDER BY average_rating DESC, s.id ASC \
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| TopStore {
                store_id: StoreId::new(r.store_id),
                name: r.name,
                address: r.address,
                average_rating: crate::models::round2(r.average_rating),
                total_ratings: r.total_ratings,
            })
            .collect())
    }

    /// Most recent ratings across the platform with display names resolved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<RecentRating>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct RecentRow {
            id: i64,
            value: i64,
            user_name: String,
            store_name: String,
            created_at: DateTime<Utc>,
        }

        let rows: Vec<RecentRow> = sqlx::query_as(
            "SELECT r.id, r.value, u.name AS user_name, s.name AS store_name, r.created_at \
             FROM ratings r \
             JOIN users u ON u.id = r.user_id \
             JOIN stores s ON s.id = r.store_id \
             ORDER BY r.created_at DESC, r.id DESC \
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| RecentRating {
                id: RatingId::new(r.id),
                value: r.value,
                user_name: r.user_name,
                store_name: r.store_name,
                created_at: r.created_at,
            })
            .collect())
    }

    /// Everyone who rated a store, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn raters(&self, store_id: StoreId) -> Result<Vec<Rater>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct RaterRow {
            rating_id: i64,
            user_id: i64,
            name: String,
            email: String,
            value: i64,
            created_at: DateTime<Utc>,
        }

        let rows: Vec<RaterRow> = sqlx::query_as(
            "SELECT r.id AS rating_id, u.id AS user_id, u.name, u.email, r.value, r.created_at \
             FROM ratings r \
             JOIN users u ON u.id = r.user_id \
             WHERE r.store_id = ? \
             ORDER BY r.created_at DESC, r.id DESC",
        )
        .bind(store_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Rater {
                rating_id: RatingId::new(r.rating_id),
                user_id: UserId::new(r.user_id),
                name: r.name,
                email: r.email,
                value: r.value,
                created_at: r.created_at,
            })
            .collect())
    }

    /// Total number of ratings.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_all(&self) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ratings")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
