use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::db::DbPool;
use crate::dto::{
    CreatePurchaseDto, CreateReceiptDto, PurchaseDetails, PurchaseQueryDto, ReceiptQueryDto,
    UpdatePurchaseDto, UpdatePurchaseStatusDto,
};
use crate::errors::ApiError;
use crate::models::{Purchase, Receipt};
use crate::repo;

/// Handler for uploading the metadata of a receipt
///
/// This function handles POST requests to `/receipts`. The file itself is
/// stored elsewhere; only its name and URL are recorded.
#[instrument(skip(pool, payload), fields(name = %payload.name))]
pub async fn create_receipt_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    Json(payload): Json<CreateReceiptDto>,
) -> Result<Json<Receipt>, ApiError> {
    info!("Creating receipt");

    let receipt = repo::create_receipt(&pool, payload).await?;

    Ok(Json(receipt))
}

/// Handler for listing receipts
///
/// This function handles GET requests to `/receipts`; `unattached=true`
/// limits the list to receipts not yet part of a purchase.
#[instrument(skip(pool))]
pub async fn list_receipts_handler(
    State(pool): State<Arc<DbPool>>,
    Query(query): Query<ReceiptQueryDto>,
) -> Result<Json<Vec<Receipt>>, ApiError> {
    let receipts = repo::list_receipts(&pool, query.unattached)?;

    debug!("Retrieved {} receipts", receipts.len());

    Ok(Json(receipts))
}

/// Handler for deleting a receipt
///
/// This function handles DELETE requests to `/receipts/{id}`.
#[instrument(skip(pool), fields(receipt_id = %receipt_id))]
pub async fn delete_receipt_handler(
    State(pool): State<Arc<DbPool>>,
    Path(receipt_id): Path<String>,
) -> Result<Json<()>, ApiError> {
    repo::delete_receipt(&pool, &receipt_id).await?;
    Ok(Json(()))
}

/// Handler for filing a reimbursement request
///
/// This function handles POST requests to `/purchases`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `payload` - The purchase details and the receipts to attach
///
/// ### Returns
///
/// The purchase with its pending expense transaction and receipts as JSON
#[instrument(skip(pool, payload), fields(amount_cents = payload.amount_cents, receipts = payload.receipt_ids.len()))]
pub async fn create_purchase_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Extract and deserialize the JSON request body
    Json(payload): Json<CreatePurchaseDto>,
) -> Result<Json<PurchaseDetails>, ApiError> {
    info!("Creating reimbursement request");

    let details = repo::create_purchase(&pool, payload).await?;

    info!("Successfully created purchase with id: {}", details.purchase.get_id());

    Ok(Json(details))
}

/// Handler for retrieving a purchase with its transaction and receipts
///
/// This function handles GET requests to `/purchases/{id}`.
#[instrument(skip(pool), fields(purchase_id = %purchase_id))]
pub async fn get_purchase_handler(
    State(pool): State<Arc<DbPool>>,
    // Extract the purchase ID from the URL path
    Path(purchase_id): Path<String>,
) -> Result<Json<PurchaseDetails>, ApiError> {
    let details = repo::get_purchase(&pool, &purchase_id)?
        .ok_or(ApiError::NotFound("Purchase"))?;

    Ok(Json(details))
}

/// Handler for listing purchases
///
/// This function handles GET requests to `/purchases`.
#[instrument(skip(pool))]
pub async fn list_purchases_handler(
    State(pool): State<Arc<DbPool>>,
    Query(query): Query<PurchaseQueryDto>,
) -> Result<Json<Vec<Purchase>>, ApiError> {
    let purchases = repo::list_purchases(&pool, query.status)?;

    debug!("Retrieved {} purchases", purchases.len());

    Ok(Json(purchases))
}

/// Handler for editing the details of a purchase
///
/// This function handles PUT requests to `/purchases/{id}`.
#[instrument(skip(pool, payload), fields(purchase_id = %purchase_id))]
pub async fn update_purchase_handler(
    State(pool): State<Arc<DbPool>>,
    Path(purchase_id): Path<String>,
    Json(payload): Json<UpdatePurchaseDto>,
) -> Result<Json<Purchase>, ApiError> {
    let purchase = repo::update_purchase(&pool, &purchase_id, payload).await?;
    Ok(Json(purchase))
}

/// Handler for moving a purchase through its workflow
///
/// This function handles PUT requests to `/purchases/{id}/status`.
///
/// ### Returns
///
/// The updated purchase details, or a 400 for a transition the workflow
/// does not allow
#[instrument(skip(pool, payload), fields(purchase_id = %purchase_id, status = %payload.status))]
pub async fn set_purchase_status_handler(
    State(pool): State<Arc<DbPool>>,
    Path(purchase_id): Path<String>,
    Json(payload): Json<UpdatePurchaseStatusDto>,
) -> Result<Json<PurchaseDetails>, ApiError> {
    info!("Changing purchase status");

    let details = repo::set_purchase_status(&pool, &purchase_id, payload.status).await?;

    Ok(Json(details))
}

/// Handler for deleting a purchase
///
/// This function handles DELETE requests to `/purchases/{id}`.
#[instrument(skip(pool), fields(purchase_id = %purchase_id))]
pub async fn delete_purchase_handler(
    State(pool): State<Arc<DbPool>>,
    Path(purchase_id): Path<String>,
) -> Result<Json<()>, ApiError> {
    info!("Deleting purchase");

    repo::delete_purchase(&pool, &purchase_id).await?;

    Ok(Json(()))
}
