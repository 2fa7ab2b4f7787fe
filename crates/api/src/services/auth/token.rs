//! Bearer-token identity assertion (HS256 JWT).
//!
//! A token carries the principal: user ID, role, and the owned store for
//! store owners. Verification is stateless; expiry is enforced by
//! `jsonwebtoken`'s default validation.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use storepulse_core::{Role, StoreId, UserId};

use crate::services::policy::Principal;

/// JWT claims for an issued identity assertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID.
    pub sub: i64,
    /// Account role at issue time.
    pub role: Role,
    /// Owned store at issue time (store owners only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<i64>,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

impl Claims {
    /// The principal this token asserts.
    #[must_use]
    pub fn principal(&self) -> Principal {
        Principal {
            id: UserId::new(self.sub),
            role: self.role,
            store_id: self.store_id.map(StoreId::new),
        }
    }
}

/// Mint a signed token for a principal.
///
/// # Errors
///
/// Returns `jsonwebtoken::errors::Error` if signing fails.
pub fn mint(
    principal: &Principal,
    secret: &[u8],
    ttl_secs: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: principal.id.as_i64(),
        role: principal.role,
        store_id: principal.store_id.map(StoreId::as_i64),
        iat: now,
        exp: now + ttl_secs,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
}

/// Verify a token's signature and expiry, returning its claims.
///
/// # Errors
///
/// Returns `jsonwebtoken::errors::Error` for a bad signature, malformed
/// token, or expired assertion.
pub fn verify(token: &str, secret: &[u8]) -> Result<Claims, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-signing-key-with-enough-length";

    #[test]
    fn test_mint_verify_roundtrip() {
        let principal = Principal {
            id: UserId::new(7),
            role: Role::StoreOwner,
            store_id: Some(StoreId::new(3)),
        };

        let token = mint(&principal, SECRET, 3600).expect("mint");
        let claims = verify(&token, SECRET).expect("verify");
        assert_eq!(claims.principal(), principal);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let principal = Principal {
            id: UserId::new(1),
            role: Role::User,
            store_id: None,
        };

        let token = mint(&principal, SECRET, 3600).expect("mint");
        assert!(verify(&token, b"a-completely-different-signing-key").is_err());
    }

    #[test]
    fn test_verify_rejects_expired() {
        let principal = Principal {
            id: UserId::new(1),
            role: Role::User,
            store_id: None,
        };

        // Expired an hour ago; default validation leeway is under that.
        let token = mint(&principal, SECRET, -3600).expect("mint");
        assert!(verify(&token, SECRET).is_err());
    }

    #[test]
    fn test_verify_rejects_garbage() {
        assert!(verify("not-a-token", SECRET).is_err());
    }
}
