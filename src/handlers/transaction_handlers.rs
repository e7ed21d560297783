use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::db::DbPool;
use crate::dto::{
    CreateTransactionDto, SummaryQueryDto, TransactionQueryDto, TreasurySummary, UpdateTransactionDto,
};
use crate::errors::ApiError;
use crate::models::Transaction;
use crate::repo;

/// Handler for recording a treasury transaction
///
/// This function handles POST requests to `/transactions`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `payload` - The request payload containing the transaction fields
///
/// ### Returns
///
/// The newly created transaction as JSON
#[instrument(skip(pool, payload), fields(kind = %payload.kind, amount_cents = payload.amount_cents))]
pub async fn create_transaction_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Extract and deserialize the JSON request body
    Json(payload): Json<CreateTransactionDto>,
) -> Result<Json<Transaction>, ApiError> {
    info!("Creating new transaction");

    let transaction = repo::create_transaction(&pool, payload).await?;

    info!("Successfully created transaction with id: {}", transaction.get_id());

    Ok(Json(transaction))
}

/// Handler for retrieving a transaction
///
/// This function handles GET requests to `/transactions/{id}`.
///
/// ### Returns
///
/// The requested transaction as JSON, or a 404 if it does not exist
#[instrument(skip(pool), fields(transaction_id = %transaction_id))]
pub async fn get_transaction_handler(
    State(pool): State<Arc<DbPool>>,
    // Extract the transaction ID from the URL path
    Path(transaction_id): Path<String>,
) -> Result<Json<Transaction>, ApiError> {
    debug!("Getting transaction");

    let transaction = repo::get_transaction(&pool, &transaction_id)?
        .ok_or(ApiError::NotFound("Transaction"))?;

    Ok(Json(transaction))
}

/// Handler for listing transactions
///
/// This function handles GET requests to `/transactions`, filtered by
/// `year`, `kind`, `status` and `category`.
#[instrument(skip(pool))]
pub async fn list_transactions_handler(
    State(pool): State<Arc<DbPool>>,
    Query(query): Query<TransactionQueryDto>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    debug!("Listing transactions with filters: {:?}", query);

    let transactions = repo::list_transactions(&pool, &query)?;

    Ok(Json(transactions))
}

/// Handler for updating a transaction
///
/// This function handles PUT requests to `/transactions/{id}`.
#[instrument(skip(pool, payload), fields(transaction_id = %transaction_id))]
pub async fn update_transaction_handler(
    State(pool): State<Arc<DbPool>>,
    Path(transaction_id): Path<String>,
    Json(payload): Json<UpdateTransactionDto>,
) -> Result<Json<Transaction>, ApiError> {
    info!("Updating transaction");

    let transaction = repo::update_transaction(&pool, &transaction_id, payload).await?;

    Ok(Json(transaction))
}

/// Handler for deleting a transaction
///
/// This function handles DELETE requests to `/transactions/{id}`.
#[instrument(skip(pool), fields(transaction_id = %transaction_id))]
pub async fn delete_transaction_handler(
    State(pool): State<Arc<DbPool>>,
    Path(transaction_id): Path<String>,
) -> Result<Json<()>, ApiError> {
    info!("Deleting transaction");

    repo::delete_transaction(&pool, &transaction_id).await?;

    Ok(Json(()))
}

/// Handler for the yearly treasury summary
///
/// This function handles GET requests to `/transactions/summary?year=`.
#[instrument(skip(pool), fields(year = query.year))]
pub async fn get_treasury_summary_handler(
    State(pool): State<Arc<DbPool>>,
    Query(query): Query<SummaryQueryDto>,
) -> Result<Json<TreasurySummary>, ApiError> {
    let summary = repo::get_treasury_summary(&pool, query.year)?;

    info!(
        "Summarised {} categories, balance {}",
        summary.categories.len(),
        summary.balance_cents
    );

    Ok(Json(summary))
}

/// Handler for the years that have transactions
///
/// This function handles GET requests to `/transactions/years`.
#[instrument(skip(pool))]
pub async fn list_transaction_years_handler(
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<Vec<i32>>, ApiError> {
    Ok(Json(repo::list_transaction_years(&pool)?))
}
