//! User repository for database operations.
//!
//! Queries use runtime-checked sqlx with row structs; domain conversion
//! happens at the edge so invalid stored data surfaces as
//! `RepositoryError::DataCorruption` rather than a panic.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use storepulse_core::{Email, Role, StoreId, UserId};

use super::{RepositoryError, SortOrder};
use crate::models::user::{User, UserListView};

/// Filter for the admin user catalog; all present fields must match (AND).
///
/// Name/email/address are case-insensitive substring matches.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<Role>,
}

/// Sortable columns for the user catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserSortField {
    #[default]
    Name,
    Email,
    Address,
    Role,
}

impl UserSortField {
    /// Parse a `sortBy` query parameter, silently falling back to name.
    #[must_use]
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("email") => Self::Email,
            Some("address") => Self::Address,
            Some("role") => Self::Role,
            _ => Self::Name,
        }
    }

    const fn as_sql(self) -> &'static str {
        match self {
            Self::Name => "u.name COLLATE NOCASE",
            Self::Email => "u.email COLLATE NOCASE",
            Self::Address => "u.address COLLATE NOCASE",
            Self::Role => "u.role",
        }
    }
}

/// Fields for inserting a new user row.
#[derive(Debug, Clone)]
pub struct NewUser<'n> {
    pub name: &'n str,
    pub email: &'n Email,
    pub password_hash: &'n str,
    pub address: Option<&'n str>,
    pub role: Role,
    pub store_id: Option<StoreId>,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    address: Option<String>,
    role: String,
    store_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role = self.role.parse::<Role>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
        })?;

        Ok(User {
            id: UserId::new(self.id),
            name: self.name,
            email,
            address: self.address,
            role,
            store_id: self.store_id.map(StoreId::new),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserListRow {
    id: i64,
    name: String,
    email: String,
    address: Option<String>,
    role: String,
    store_id: Option<i64>,
    store_name: Option<String>,
    average_rating: Option<f64>,
}

impl UserListRow {
    fn into_view(self) -> Result<UserListView, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role = self.role.parse::<Role>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
        })?;

        // The owned-store average only makes sense for store-owner rows.
        let average_rating = match self.store_id {
            Some(_) => Some(crate::models::round2(self.average_rating.unwrap_or(0.0))),
            None => None,
        };

        Ok(UserListView {
            id: UserId::new(self.id),
            name: self.name,
            email,
            address: self.address,
            role,
            store_id: self.store_id.map(StoreId::new),
            store_name: self.store_name,
            average_rating,
        })
    }
}

const USER_COLUMNS: &str = "id, name, email, address, role, store_id, created_at, updated_at";

const USER_LIST_SELECT: &str = "SELECT u.id, u.name, u.email, u.address, u.role, u.store_id, \
     s.name AS store_name, AVG(r.value) AS average_rating \
     FROM users u \
     LEFT JOIN stores s ON s.id = u.store_id \
     LEFT JOIN ratings r ON r.store_id = s.id";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if a stored email or role is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if a stored email or role is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Get a user together with their credential hash, for login.
    ///
    /// Returns `None` if no account exists for the email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct AuthRow {
            #[sqlx(flatten)]
            user: UserRow,
            password_hash: String,
        }

        let row = sqlx::query_as::<_, AuthRow>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = ?"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| Ok((r.user.into_user()?, r.password_hash)))
            .transpose()
    }

    /// Get a user's credential hash by ID, for password updates.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn get_password_hash(&self, id: UserId) -> Result<String, RepositoryError> {
        let row = sqlx::query_as::<_, (String,)>("SELECT password_hash FROM users WHERE id = ?")
            .bind(id.as_i64())
            .fetch_optional(self.pool)
            .await?;

        row.map(|(hash,)| hash).ok_or(RepositoryError::NotFound)
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists, or
    /// `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new: &NewUser<'_>) -> Result<User, RepositoryError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (name, email, password_hash, address, role, store_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(new.name)
        .bind(new.email.as_str())
        .bind(new.password_hash)
        .bind(new.address)
        .bind(new.role.as_str())
        .bind(new.store_id.map(StoreId::as_i64))
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "user with this email already exists"))?;

        row.into_user()
    }

    /// Replace a user's credential hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
                .bind(password_hash)
                .bind(Utc::now())
                .bind(id.as_i64())
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a user. Their ratings cascade away with them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// List users for the admin catalog, with the owned store's aggregate
    /// average for store-owner rows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_views(
        &self,
        filter: &UserFilter,
        sort: UserSortField,
        order: SortOrder,
    ) -> Result<Vec<UserListView>, RepositoryError> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(USER_LIST_SELECT);
        qb.push(" WHERE 1=1");

        if let Some(name) = &filter.name {
            qb.push(" AND u.name LIKE '%' || ");
            qb.push_bind(name);
            qb.push(" || '%'");
        }
        if let Some(email) = &filter.email {
            qb.push(" AND u.email LIKE '%' || ");
            qb.push_bind(email);
            qb.push(" || '%'");
        }
        if let Some(address) = &filter.address {
            qb.push(" AND u.address LIKE '%' || ");
            qb.push_bind(address);
            qb.push(" || '%'");
        }
        if let Some(role) = filter.role {
            qb.push(" AND u.role = ");
            qb.push_bind(role.as_str());
        }

        qb.push(" GROUP BY u.id, u.name, u.email, u.address, u.role, u.store_id, s.name");
        qb.push(" ORDER BY ");
        qb.push(sort.as_sql());
        qb.push(" ");
        qb.push(order.as_sql());
        qb.push(", u.id ASC");

        let rows: Vec<UserListRow> = qb.build_query_as().fetch_all(self.pool).await?;
        rows.into_iter().map(UserListRow::into_view).collect()
    }

    /// Get a single user catalog view by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_view(&self, id: UserId) -> Result<Option<UserListView>, RepositoryError> {
        let row = sqlx::query_as::<_, UserListRow>(&format!(
            "{USER_LIST_SELECT} WHERE u.id = ? \
             GROUP BY u.id, u.name, u.email, u.address, u.role, u.store_id, s.name"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserListRow::into_view).transpose()
    }

    /// Total number of users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_all(&self) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Number of users per role. Roles with no users are absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_role(&self) -> Result<Vec<(String, i64)>, RepositoryError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT role, COUNT(*) FROM users GROUP BY role")
                .fetch_all(self.pool)
                .await?;
        Ok(rows)
    }
}
