//! Access policy: a single decision table over (principal, action).
//!
//! Every protected route authorizes through [`authorize`] rather than
//! scattering role checks through handlers, so the whole policy is visible
//! and testable in one place. A [`Deny`] is an authenticated-but-disallowed
//! outcome and maps to 403; it is never conflated with a missing resource.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use storepulse_core::{Role, StoreId, UserId};

/// The authenticated identity attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: UserId,
    pub role: Role,
    /// Owned store, present only for store owners.
    pub store_id: Option<StoreId>,
}

/// Operations the policy decides on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Read the store catalog or a single store view.
    BrowseCatalog,
    /// Create or overwrite the caller's own rating.
    SubmitRating,
    /// Read the caller's own rating for a store.
    ReadOwnRating,
    /// Delete the caller's own rating for a store.
    DeleteOwnRating,
    /// Read the aggregation and rater list for the caller's own store.
    ReadOwnStoreRatings,
    /// Create, update, or delete stores.
    ManageStores,
    /// List, create, or delete users.
    ManageUsers,
    /// Read platform-wide rollups (admin dashboard).
    ReadPlatformRollups,
    /// Change the credential of the targeted user row.
    UpdateOwnCredential {
        /// The user row being modified.
        target: UserId,
    },
}

/// Reasons an authenticated principal is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Deny {
    /// The principal's role does not permit the action.
    #[error("requires role '{required}'")]
    RoleMismatch {
        /// The role the action requires.
        required: Role,
    },
    /// A store-owner action was attempted by an owner with no store.
    #[error("no store associated with this account")]
    NoStoreAssociated,
    /// A self-only action targeted a different user.
    #[error("may only modify your own account")]
    NotSelf,
}

/// Decide whether `principal` may perform `action`.
///
/// # Errors
///
/// Returns the matching [`Deny`] reason when the principal is refused.
pub const fn authorize(principal: &Principal, action: &Action) -> Result<(), Deny> {
    match action {
        Action::BrowseCatalog => Ok(()),

        Action::SubmitRating | Action::ReadOwnRating | Action::DeleteOwnRating => {
            match principal.role {
                Role::User => Ok(()),
                Role::Admin | Role::StoreOwner => Err(Deny::RoleMismatch {
                    required: Role::User,
                }),
            }
        }

        Action::ReadOwnStoreRatings => match principal.role {
            Role::StoreOwner => match principal.store_id {
                Some(_) => Ok(()),
                None => Err(Deny::NoStoreAssociated),
            },
            Role::Admin | Role::User => Err(Deny::RoleMismatch {
                required: Role::StoreOwner,
            }),
        },

        Action::ManageStores | Action::ManageUsers | Action::ReadPlatformRollups => {
            match principal.role {
                Role::Admin => Ok(()),
                Role::User | Role::StoreOwner => Err(Deny::RoleMismatch {
                    required: Role::Admin,
                }),
            }
        }

        Action::UpdateOwnCredential { target } => {
            if principal.id.as_i64() == target.as_i64() {
                Ok(())
            } else {
                Err(Deny::NotSelf)
            }
        }
    }
}
