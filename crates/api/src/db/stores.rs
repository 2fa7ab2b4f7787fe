//! Store repository for database operations.
//!
//! The catalog view queries join ratings twice: once for the aggregate
//! summary and once for the viewing user's own rating, mirroring what the
//! store list and detail endpoints return.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use storepulse_core::{Email, Role, StoreId, UserId};

use super::{RepositoryError, SortOrder};
use crate::models::store::{Store, StoreView};

/// Filter for the store catalog; all present fields must match (AND).
///
/// Both are case-insensitive substring matches.
#[derive(Debug, Clone, Default)]
pub struct StoreFilter {
    pub name: Option<String>,
    pub address: Option<String>,
}

/// Sortable columns for the store catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreSortField {
    #[default]
    Name,
    Email,
    Address,
    AverageRating,
}

impl StoreSortField {
    /// Parse a `sortBy` query parameter, silently falling back to name.
    #[must_use]
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("email") => Self::Email,
            Some("address") => Self::Address,
            Some("average_rating" | "averageRating") => Self::AverageRating,
            _ => Self::Name,
        }
    }

    const fn as_sql(self) -> &'static str {
        match self {
            Self::Name => "s.name COLLATE NOCASE",
            Self::Email => "s.email COLLATE NOCASE",
            Self::Address => "s.address COLLATE NOCASE",
            Self::AverageRating => "average_rating",
        }
    }
}

/// Fields for inserting a new store.
#[derive(Debug, Clone)]
pub struct NewStore<'n> {
    pub name: &'n str,
    pub email: &'n Email,
    pub address: &'n str,
}

/// Owner account created atomically alongside a store.
///
/// The owner logs in with the store's email; name and credential hash come
/// from the create-store request.
#[derive(Debug, Clone)]
pub struct NewOwner<'n> {
    pub name: &'n str,
    pub password_hash: &'n str,
}

#[derive(sqlx::FromRow)]
struct StoreRow {
    id: i64,
    name: String,
    email: String,
    address: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StoreRow {
    fn into_store(self) -> Result<Store, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Store {
            id: StoreId::new(self.id),
            name: self.name,
            email,
            address: self.address,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StoreViewRow {
    id: i64,
    name: String,
    email: String,
    address: String,
    average_rating: f64,
    total_ratings: i64,
    user_rating: Option<i64>,
}

impl StoreViewRow {
    fn into_view(self) -> Result<StoreView, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(StoreView {
            id: StoreId::new(self.id),
            name: self.name,
            email,
            address: self.address,
            average_rating: crate::models::round2(self.average_rating),
            total_ratings: self.total_ratings,
            user_rating: self.user_rating,
        })
    }
}

const STORE_COLUMNS: &str = "id, name, email, address, created_at, updated_at";

/// Repository for store database operations.
pub struct StoreRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a store by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM stores WHERE id = ?"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(StoreRow::into_store).transpose()
    }

    /// Whether a store with this ID exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: StoreId) -> Result<bool, RepositoryError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM stores WHERE id = ?")
            .bind(id.as_i64())
            .fetch_optional(self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Create a store, optionally creating its owner account in the same
    /// transaction. The owner logs in with the store's email and inherits
    /// the store's address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the store email (or the owner's
    /// login email) is already taken, or `RepositoryError::Database` for
    /// other database errors.
    pub async fn create(
        &self,
        new: &NewStore<'_>,
        owner: Option<&NewOwner<'_>>,
    ) -> Result<Store, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "INSERT INTO stores (name, email, address, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) \
             RETURNING {STORE_COLUMNS}"
        ))
        .bind(new.name)
        .bind(new.email.as_str())
        .bind(new.address)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "store with this email already exists"))?;

        let store = row.into_store()?;

        if let Some(owner) = owner {
            sqlx::query(
                "INSERT INTO users (name, email, password_hash, address, role, store_id, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(owner.name)
            .bind(store.email.as_str())
            .bind(owner.password_hash)
            .bind(&store.address)
            .bind(Role::StoreOwner.as_str())
            .bind(store.id.as_i64())
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_sqlx(e, "user with this email already exists"))?;
        }

        tx.commit().await?;

        Ok(store)
    }

    /// Update a store's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store doesn't exist, or
    /// `RepositoryError::Conflict` if the new email is already taken.
    pub async fn update(
        &self,
        id: StoreId,
        name: &str,
        email: &Email,
        address: &str,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE stores SET name = ?, email = ?, address = ?, updated_at = ? WHERE id = ?")
                .bind(name)
                .bind(email.as_str())
                .bind(address)
                .bind(Utc::now())
                .bind(id.as_i64())
                .execute(self.pool)
                .await
                .map_err(|e| {
                    RepositoryError::from_sqlx(e, "store with this email already exists")
                })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a store. All its ratings cascade away in the same statement,
    /// and any owner account keeps its user row with the store link severed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store doesn't exist.
    pub async fn delete(&self, id: StoreId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM stores WHERE id = ?")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// List store catalog views for a viewing user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_views(
        &self,
        filter: &StoreFilter,
        sort: StoreSortField,
        order: SortOrder,
        viewer: UserId,
    ) -> Result<Vec<StoreView>, RepositoryError> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT s.id, s.name, s.email, s.address, \
             COALESCE(AVG(r.value), 0.0) AS average_rating, \
             COUNT(DISTINCT r.id) AS total_ratings, \
             ur.value AS user_rating \
             FROM stores s \
             LEFT JOIN ratings r ON r.store_id = s.id \
             LEFT JOIN ratings ur ON ur.store_id = s.id AND ur.user_id = ",
        );
        qb.push_bind(viewer.as_i64());
        qb.push(" WHERE 1=1");

        if let Some(name) = &filter.name {
            qb.push(" AND s.name LIKE '%' || ");
            qb.push_bind(name);
            qb.push(" || '%'");
        }
        if let Some(address) = &filter.address {
            qb.push(" AND s.address LIKE '%' || ");
            qb.push_bind(address);
            qb.push(" || '%'");
        }

        qb.push(" GROUP BY s.id, s.name, s.email, s.address, ur.value");
        qb.push(" ORDER BY ");
        qb.push(sort.as_sql());
        qb.push(" ");
        qb.push(order.as_sql());
        qb.push(", s.id ASC");

        let rows: Vec<StoreViewRow> = qb.build_query_as().fetch_all(self.pool).await?;
        rows.into_iter().map(StoreViewRow::into_view).collect()
    }

    /// Get a single store catalog view for a viewing user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_view(
        &self,
        id: StoreId,
        viewer: UserId,
    ) -> Result<Option<StoreView>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreViewRow>(
            "SELECT s.id, s.name, s.email, s.address, \
             COALESCE(AVG(r.value), 0.0) AS average_rating, \
             COUNT(DISTINCT r.id) AS total_ratings, \
             ur.value AS user_rating \
             FROM stores s \
             LEFT JOIN ratings r ON r.store_id = s.id \
             LEFT JOIN ratings ur ON ur.store_id = s.id AND ur.user_id = ? \
             WHERE s.id = ? \
             GROUP BY s.id, s.name, s.email, s.address, ur.value",
        )
        .bind(viewer.as_i64())
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(StoreViewRow::into_view).transpose()
    }

    /// Total number of stores.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_all(&self) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM stores")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
