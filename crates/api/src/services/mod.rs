//! Core components of the rating platform.
//!
//! - [`auth`] - signup/login, credential hashing, token issuance
//! - [`policy`] - the access-control decision table
//! - [`ledger`] - create/update/delete of individual ratings
//! - [`aggregation`] - read-only rollups over the rating set
//! - [`catalog`] - store/user listings composed from the above

pub mod aggregation;
pub mod auth;
pub mod catalog;
pub mod ledger;
pub mod policy;
