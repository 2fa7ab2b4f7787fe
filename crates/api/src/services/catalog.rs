//! Catalog service: store and user listings with filter + sort.
//!
//! A pure composition over the repositories - the rollup fields of each view
//! are computed in the same query that lists the rows, so a listing is
//! always internally consistent.

use sqlx::SqlitePool;

use storepulse_core::{StoreId, UserId};

use crate::db::stores::{StoreFilter, StoreSortField};
use crate::db::users::{UserFilter, UserSortField};
use crate::db::{RepositoryError, SortOrder, StoreRepository, UserRepository};
use crate::models::store::StoreView;
use crate::models::user::UserListView;

/// Read-side composition of stores/users with their aggregates.
pub struct CatalogService<'a> {
    stores: StoreRepository<'a>,
    users: UserRepository<'a>,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service over the given pool.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            stores: StoreRepository::new(pool),
            users: UserRepository::new(pool),
        }
    }

    /// List stores as seen by `viewer`: base fields, rating summary, and the
    /// viewer's own rating.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_stores(
        &self,
        filter: &StoreFilter,
        sort: StoreSortField,
        order: SortOrder,
        viewer: UserId,
    ) -> Result<Vec<StoreView>, RepositoryError> {
        self.stores.list_views(filter, sort, order, viewer).await
    }

    /// A single store as seen by `viewer`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_store(
        &self,
        id: StoreId,
        viewer: UserId,
    ) -> Result<Option<StoreView>, RepositoryError> {
        self.stores.get_view(id, viewer).await
    }

    /// List users for the admin catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_users(
        &self,
        filter: &UserFilter,
        sort: UserSortField,
        order: SortOrder,
    ) -> Result<Vec<UserListView>, RepositoryError> {
        self.users.list_views(filter, sort, order).await
    }

    /// A single user catalog view, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_user(&self, id: UserId) -> Result<Option<UserListView>, RepositoryError> {
        self.users.get_view(id).await
    }
}
