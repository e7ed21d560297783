use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::db::DbPool;
use crate::dto::{CreateFaqDto, UpdateFaqDto};
use crate::errors::ApiError;
use crate::models::Faq;
use crate::repo;

/// Handler for adding an FAQ entry
///
/// This function handles POST requests to `/faqs`. Without a sort order the
/// entry is placed last.
#[instrument(skip(pool, payload))]
pub async fn create_faq_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    Json(payload): Json<CreateFaqDto>,
) -> Result<Json<Faq>, ApiError> {
    info!("Creating FAQ entry");

    let faq = repo::create_faq(&pool, payload).await?;

    Ok(Json(faq))
}

/// This function handles GET requests to `/faqs/{id}`.
#[instrument(skip(pool), fields(faq_id = %faq_id))]
pub async fn get_faq_handler(
    State(pool): State<Arc<DbPool>>,
    Path(faq_id): Path<String>,
) -> Result<Json<Faq>, ApiError> {
    let faq = repo::get_faq(&pool, &faq_id)?.ok_or(ApiError::NotFound("FAQ entry"))?;
    Ok(Json(faq))
}

/// This function handles GET requests to `/faqs`.
#[instrument(skip(pool))]
pub async fn list_faqs_handler(State(pool): State<Arc<DbPool>>) -> Result<Json<Vec<Faq>>, ApiError> {
    Ok(Json(repo::list_faqs(&pool)?))
}

/// This function handles PUT requests to `/faqs/{id}`.
#[instrument(skip(pool, payload), fields(faq_id = %faq_id))]
pub async fn update_faq_handler(
    State(pool): State<Arc<DbPool>>,
    Path(faq_id): Path<String>,
    Json(payload): Json<UpdateFaqDto>,
) -> Result<Json<Faq>, ApiError> {
    let faq = repo::update_faq(&pool, &faq_id, payload).await?;
    Ok(Json(faq))
}

/// This function handles DELETE requests to `/faqs/{id}`.
#[instrument(skip(pool), fields(faq_id = %faq_id))]
pub async fn delete_faq_handler(
    State(pool): State<Arc<DbPool>>,
    Path(faq_id): Path<String>,
) -> Result<Json<()>, ApiError> {
    repo::delete_faq(&pool, &faq_id).await?;
    Ok(Json(()))
}
