//! Authentication service.
//!
//! Public signup (role forced to `user`), admin-driven account creation,
//! login, and credential updates. Password hashing is Argon2; issued
//! identity assertions are Bearer JWTs from [`token`].

mod error;
pub mod token;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;

use storepulse_core::{Email, Role, StoreId, UserId};

use crate::db::users::NewUser;
use crate::db::UserRepository;
use crate::models::user::User;
use crate::services::policy::Principal;
use crate::validation;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    token_secret: &'a [u8],
    token_ttl_secs: i64,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, token_secret: &'a [u8], token_ttl_secs: i64) -> Self {
        Self {
            users: UserRepository::new(pool),
            token_secret,
            token_ttl_secs,
        }
    }

    /// Public signup. The role is always `user`; privileged accounts are
    /// created by admins via [`Self::create_user`].
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` or `AuthError::WeakPassword` for
    /// bad input, `AuthError::UserAlreadyExists` for a taken email.
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
        address: Option<&str>,
    ) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;
        validation::validate_password(password).map_err(AuthError::WeakPassword)?;

        let password_hash = hash_password(password)?;
        let user = self
            .users
            .create(&NewUser {
                name,
                email: &email,
                password_hash: &password_hash,
                address,
                role: Role::User,
                store_id: None,
            })
            .await?;

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    /// Create an account with an explicit role (admin operation). No token
    /// is issued; the new user logs in themselves.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` or `AuthError::WeakPassword` for
    /// bad input, `AuthError::UserAlreadyExists` for a taken email.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        address: Option<&str>,
        role: Role,
        store_id: Option<StoreId>,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validation::validate_password(password).map_err(AuthError::WeakPassword)?;

        let password_hash = hash_password(password)?;
        let user = self
            .users
            .create(&NewUser {
                name,
                email: &email,
                password_hash: &password_hash,
                address,
                role,
                store_id,
            })
            .await?;

        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` when the email is unknown or
    /// the password wrong; the two cases are indistinguishable to callers.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users
            .get_with_password(&email)
            .await
            .map_err(auth_read_err)?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    /// Replace a user's password after verifying the current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` when the current password is
    /// wrong, `AuthError::WeakPassword` when the new one fails the rules.
    pub async fn update_password(
        &self,
        user_id: UserId,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        validation::validate_password(new_password).map_err(AuthError::WeakPassword)?;

        let current_hash = self.users.get_password_hash(user_id).await?;
        verify_password(current_password, &current_hash)?;

        let new_hash = hash_password(new_password)?;
        self.users.update_password(user_id, &new_hash).await?;

        Ok(())
    }

    /// Mint an identity assertion for a user.
    fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        let principal = Principal {
            id: user.id,
            role: user.role,
            store_id: user.store_id,
        };
        Ok(token::mint(
            &principal,
            self.token_secret,
            self.token_ttl_secs,
        )?)
    }
}

/// Hash a password with Argon2 and a fresh random salt.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AuthError::PasswordHash)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2 hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on mismatch, or
/// `AuthError::PasswordHash` if the stored hash is malformed.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| AuthError::PasswordHash)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Login reads never turn a missing row into `UserNotFound`; absence is
/// reported as `InvalidCredentials` by the caller.
fn auth_read_err(err: crate::db::RepositoryError) -> AuthError {
    AuthError::Repository(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("Valid@123").expect("hash");
        assert!(verify_password("Valid@123", &hash).is_ok());
        assert!(matches!(
            verify_password("Wrong@123", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("Valid@123", "not-a-hash"),
            Err(AuthError::PasswordHash)
        ));
    }
}
