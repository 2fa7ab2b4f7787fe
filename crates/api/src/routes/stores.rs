//! Store route handlers: catalog reads for everyone, writes for admins.

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use storepulse_core::{Email, StoreId};

use crate::db::stores::{NewOwner, NewStore, StoreFilter, StoreSortField};
use crate::db::{SortOrder, StoreRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{ApiResponse, StoreInfo};
use crate::services::auth;
use crate::services::catalog::CatalogService;
use crate::services::policy::{self, Action};
use crate::state::AppState;
use crate::validation;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreListQuery {
    pub name: Option<String>,
    pub address: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreRequest {
    pub name: String,
    pub email: String,
    pub address: String,
    /// When both owner fields are present, a store-owner account is created
    /// in the same transaction. It logs in with the store's email.
    pub owner_name: Option<String>,
    pub owner_password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStoreRequest {
    pub name: String,
    pub email: String,
    pub address: String,
}

/// GET /stores
///
/// The catalog as seen by the caller: every row carries the aggregate
/// summary plus the caller's own rating.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Query(query): Query<StoreListQuery>,
) -> Result<impl IntoResponse> {
    policy::authorize(&principal, &Action::BrowseCatalog)?;

    let filter = StoreFilter {
        name: query.name,
        address: query.address,
    };
    let sort = StoreSortField::from_param(query.sort_by.as_deref());
    let order = SortOrder::from_param(query.sort_order.as_deref());

    let catalog = CatalogService::new(state.pool());
    let stores = catalog.list_stores(&filter, sort, order, principal.id).await?;

    Ok(ApiResponse::ok(stores))
}

/// GET /stores/:id
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    policy::authorize(&principal, &Action::BrowseCatalog)?;

    let catalog = CatalogService::new(state.pool());
    let store = catalog
        .get_store(StoreId::new(id), principal.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Store not found".to_owned()))?;

    Ok(ApiResponse::ok(store))
}

/// POST /stores (admin)
///
/// Optionally creates the owner account in the same transaction when
/// `ownerName` and `ownerPassword` are both given.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Json(req): Json<CreateStoreRequest>,
) -> Result<impl IntoResponse> {
    policy::authorize(&principal, &Action::ManageStores)?;

    validation::validate_name(&req.name).map_err(AppError::Validation)?;
    validation::validate_address(Some(&req.address)).map_err(AppError::Validation)?;
    let email = Email::parse(&req.email).map_err(|e| AppError::Validation(e.to_string()))?;

    let owner_hash = match (&req.owner_name, &req.owner_password) {
        (Some(name), Some(password)) => {
            validation::validate_name(name).map_err(AppError::Validation)?;
            validation::validate_password(password).map_err(AppError::Validation)?;
            Some(auth::hash_password(password)?)
        }
        _ => None,
    };
    let owner = match (&req.owner_name, &owner_hash) {
        (Some(name), Some(hash)) => Some(NewOwner {
            name: name.as_str(),
            password_hash: hash.as_str(),
        }),
        _ => None,
    };

    let stores = StoreRepository::new(state.pool());
    let store = stores
        .create(
            &NewStore {
                name: &req.name,
                email: &email,
                address: &req.address,
            },
            owner.as_ref(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok_with_message(StoreInfo::from(store), "Store created successfully"),
    ))
}

/// PUT /stores/:id (admin)
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStoreRequest>,
) -> Result<impl IntoResponse> {
    policy::authorize(&principal, &Action::ManageStores)?;

    validation::validate_name(&req.name).map_err(AppError::Validation)?;
    validation::validate_address(Some(&req.address)).map_err(AppError::Validation)?;
    let email = Email::parse(&req.email).map_err(|e| AppError::Validation(e.to_string()))?;

    let stores = StoreRepository::new(state.pool());
    stores
        .update(StoreId::new(id), &req.name, &email, &req.address)
        .await?;

    Ok(ApiResponse::message("Store updated successfully"))
}

/// DELETE /stores/:id (admin)
///
/// All the store's ratings go with it; an owner account stays, unlinked.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    policy::authorize(&principal, &Action::ManageStores)?;

    let stores = StoreRepository::new(state.pool());
    stores.delete(StoreId::new(id)).await?;

    Ok(ApiResponse::message("Store deleted successfully"))
}
