//! Store domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use storepulse_core::{Email, StoreId};

/// A rateable store (domain type).
#[derive(Debug, Clone)]
pub struct Store {
    /// Unique store ID.
    pub id: StoreId,
    /// Store name.
    pub name: String,
    /// Contact email, unique case-insensitively.
    pub email: Email,
    /// Postal address.
    pub address: String,
    /// When the store was created.
    pub created_at: DateTime<Utc>,
    /// When the store was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Response projection of a store without aggregates.
///
/// Used where the store's own fields are the payload (create/update
/// responses, the owner dashboard header).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreInfo {
    pub id: StoreId,
    pub name: String,
    pub email: Email,
    pub address: String,
}

impl From<Store> for StoreInfo {
    fn from(store: Store) -> Self {
        Self {
            id: store.id,
            name: store.name,
            email: store.email,
            address: store.address,
        }
    }
}

/// Response projection of a store for the catalog.
///
/// Combines the base entity with its rating summary and the viewing user's
/// own rating (when they have one).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreView {
    pub id: StoreId,
    pub name: String,
    pub email: Email,
    pub address: String,
    /// Mean rating rounded to 2 decimal places; 0 when unrated.
    pub average_rating: f64,
    pub total_ratings: i64,
    /// The viewer's own rating value, if any.
    pub user_rating: Option<i64>,
}
