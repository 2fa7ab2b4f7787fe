//! Domain types and response projections.
//!
//! These types represent validated domain objects separate from database row
//! types, plus the response-shaped views (`StoreView`, `UserListView`, ...)
//! that the catalog and dashboards return.

pub mod rating;
pub mod store;
pub mod user;

pub use rating::{
    DistributionBucket, PlatformCounts, Rater, Rating, RecentRating, StoreSummary, TopStore,
};
pub use store::{Store, StoreInfo, StoreView};
pub use user::{User, UserListView, UserView};

use serde::{Deserialize, Serialize};

/// JSON response envelope used by every endpoint.
///
/// Success responses carry `data` and optionally a human-readable `message`;
/// error responses carry `success: false` and a `message` only.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// A successful response with data.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// A successful response with data and a message.
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    /// A successful response with a message only.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }

    /// A failed response with a message only.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        axum::Json(self).into_response()
    }
}

/// Round to two decimal places for display (averages).
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert!((round2(3.333_333) - 3.33).abs() < f64::EPSILON);
        assert!((round2(3.5) - 3.5).abs() < f64::EPSILON);
        assert!((round2(0.0) - 0.0).abs() < f64::EPSILON);
        assert!((round2(4.005) - 4.01).abs() < 0.011);
    }

    #[test]
    fn test_envelope_omits_empty_fields() {
        let json = serde_json::to_string(&ApiResponse::<()>::message("done")).expect("serialize");
        assert_eq!(json, r#"{"success":true,"message":"done"}"#);

        let json = serde_json::to_string(&ApiResponse::ok(5)).expect("serialize");
        assert_eq!(json, r#"{"success":true,"data":5}"#);
    }
}
