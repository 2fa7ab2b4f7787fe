//! Account roles.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing a [`Role`] from a string.
#[derive(thiserror::Error, Debug, Clone)]
#[error("invalid role: {0}")]
pub struct RoleParseError(pub String);

/// Account role with different permission levels.
///
/// Roles form a closed set; authorization decisions match exhaustively on
/// this enum rather than comparing strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlite", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform administrator: full user/store lifecycle and platform rollups.
    Admin,
    /// Regular account: browses the catalog and owns its own ratings.
    User,
    /// Store owner: read-only view of the ratings for the associated store.
    StoreOwner,
}

impl Role {
    /// All roles, in display order.
    pub const ALL: [Self; 3] = [Self::Admin, Self::User, Self::StoreOwner];

    /// The wire/database representation of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::StoreOwner => "store_owner",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            "store_owner" => Ok(Self::StoreOwner),
            other => Err(RoleParseError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_string_roundtrip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().expect("roundtrip"), role);
        }
    }

    #[test]
    fn test_role_rejects_unknown() {
        assert!("owner".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_snake_case() {
        let json = serde_json::to_string(&Role::StoreOwner).expect("serialize");
        assert_eq!(json, "\"store_owner\"");
        let role: Role = serde_json::from_str("\"admin\"").expect("deserialize");
        assert_eq!(role, Role::Admin);
    }
}
