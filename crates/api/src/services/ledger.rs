//! Rating ledger: owns create/update/delete of individual ratings.

use sqlx::SqlitePool;
use thiserror::Error;

use storepulse_core::{RatingValueError, StoreId, UserId};

use crate::db::{RatingRepository, RepositoryError, StoreRepository};
use crate::models::rating::Rating;

/// Errors from ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The referenced store does not exist.
    #[error("store not found")]
    StoreNotFound,

    /// No rating exists for the (user, store) pair.
    #[error("rating not found")]
    RatingNotFound,

    /// The submitted value is outside 1..=5.
    #[error(transparent)]
    InvalidValue(#[from] RatingValueError),

    /// Repository/database error.
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for LedgerError {
    fn from(err: RepositoryError) -> Self {
        // The upsert surfaces a missing store as a foreign-key NotFound.
        match err {
            RepositoryError::NotFound => Self::StoreNotFound,
            other => Self::Repository(other),
        }
    }
}

/// Whether a submission created a new rating or overwrote an existing one.
///
/// Only caller messaging depends on this; either way exactly one row exists
/// for the pair afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created,
    Updated,
}

/// Component owning the one-rating-per-(user, store) invariant.
pub struct RatingLedger<'a> {
    ratings: RatingRepository<'a>,
    stores: StoreRepository<'a>,
}

impl<'a> RatingLedger<'a> {
    /// Create a new rating ledger over the given pool.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            ratings: RatingRepository::new(pool),
            stores: StoreRepository::new(pool),
        }
    }

    /// Submit a rating: create it, or overwrite the existing value in place.
    ///
    /// Idempotent under repeated identical submission; no new identity is
    /// allocated on overwrite.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::StoreNotFound` if the store doesn't exist,
    /// `LedgerError::InvalidValue` if the value is outside 1..=5, or
    /// `LedgerError::Repository` for database errors.
    pub async fn submit(
        &self,
        user_id: UserId,
        store_id: StoreId,
        value: i64,
    ) -> Result<(Rating, SubmitOutcome), LedgerError> {
        let value = storepulse_core::RatingValue::new(value)?;

        if !self.stores.exists(store_id).await.map_err(map_read_err)? {
            return Err(LedgerError::StoreNotFound);
        }

        // The store may vanish between the check and the write; the upsert's
        // foreign-key failure covers that race.
        let (rating, created) = self.ratings.upsert(user_id, store_id, value).await?;

        let outcome = if created {
            SubmitOutcome::Created
        } else {
            SubmitOutcome::Updated
        };

        Ok((rating, outcome))
    }

    /// Get the user's rating for a store; absence is `None`, not an error.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Repository` for database errors.
    pub async fn get_for_user_and_store(
        &self,
        user_id: UserId,
        store_id: StoreId,
    ) -> Result<Option<Rating>, LedgerError> {
        self.ratings
            .get_for_user_and_store(user_id, store_id)
            .await
            .map_err(map_read_err)
    }

    /// Delete the user's rating for a store.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::RatingNotFound` if no such rating exists, or
    /// `LedgerError::Repository` for database errors.
    pub async fn delete(&self, user_id: UserId, store_id: StoreId) -> Result<(), LedgerError> {
        let deleted = self
            .ratings
            .delete(user_id, store_id)
            .await
            .map_err(map_read_err)?;

        if deleted {
            Ok(())
        } else {
            Err(LedgerError::RatingNotFound)
        }
    }
}

/// Read-path repository errors never mean "store missing".
fn map_read_err(err: RepositoryError) -> LedgerError {
    LedgerError::Repository(err)
}
