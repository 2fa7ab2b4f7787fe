//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use storepulse_core::{Email, Role, StoreId, UserId};

/// A platform account (domain type).
///
/// The credential hash is deliberately not part of this type; repositories
/// return it separately only where verification needs it.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email, unique case-insensitively.
    pub email: Email,
    /// Optional postal address.
    pub address: Option<String>,
    /// Account role.
    pub role: Role,
    /// Owned store, present only for store owners.
    pub store_id: Option<StoreId>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Response projection of a [`User`] without aggregates.
///
/// Used by auth endpoints (`/auth/me`, signup/login payloads).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub address: Option<String>,
    pub role: Role,
    pub store_id: Option<StoreId>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            address: user.address,
            role: user.role,
            store_id: user.store_id,
        }
    }
}

/// Response projection for the admin user catalog.
///
/// Store-owner rows carry the owned store's name and aggregate average
/// rating; other roles have neither.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListView {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub address: Option<String>,
    pub role: Role,
    pub store_id: Option<StoreId>,
    pub store_name: Option<String>,
    pub average_rating: Option<f64>,
}
