use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::db::DbPool;
use crate::dto::{CreatePollDto, PollDetails, PollQueryDto, PollResults, VoteDto};
use crate::errors::ApiError;
use crate::models::{Permission, Poll, PollVote};
use crate::repo;

use super::CurrentUser;

/// Handler for creating a poll
///
/// This function handles POST requests to `/polls`. New polls start as
/// drafts and take no votes until opened.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `payload` - Title, settings and at least two option labels
///
/// ### Returns
///
/// The poll with its options as JSON
#[instrument(skip(pool, payload), fields(title = %payload.title))]
pub async fn create_poll_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Extract and deserialize the JSON request body
    Json(payload): Json<CreatePollDto>,
) -> Result<Json<PollDetails>, ApiError> {
    info!("Creating poll");

    let details = repo::create_poll(&pool, payload).await?;

    Ok(Json(details))
}

/// This function handles GET requests to `/polls/{id}`.
#[instrument(skip(pool), fields(poll_id = %poll_id))]
pub async fn get_poll_handler(
    State(pool): State<Arc<DbPool>>,
    Path(poll_id): Path<String>,
) -> Result<Json<PollDetails>, ApiError> {
    let details = repo::get_poll(&pool, &poll_id)?.ok_or(ApiError::NotFound("Poll"))?;
    Ok(Json(details))
}

/// This function handles GET requests to `/polls`, optionally filtered by
/// `status`.
#[instrument(skip(pool))]
pub async fn list_polls_handler(
    State(pool): State<Arc<DbPool>>,
    Query(query): Query<PollQueryDto>,
) -> Result<Json<Vec<Poll>>, ApiError> {
    Ok(Json(repo::list_polls(&pool, query.status)?))
}

/// This function handles POST requests to `/polls/{id}/open`.
#[instrument(skip(pool), fields(poll_id = %poll_id))]
pub async fn open_poll_handler(
    State(pool): State<Arc<DbPool>>,
    Path(poll_id): Path<String>,
) -> Result<Json<Poll>, ApiError> {
    Ok(Json(repo::open_poll(&pool, &poll_id).await?))
}

/// This function handles POST requests to `/polls/{id}/close`.
#[instrument(skip(pool), fields(poll_id = %poll_id))]
pub async fn close_poll_handler(
    State(pool): State<Arc<DbPool>>,
    Path(poll_id): Path<String>,
) -> Result<Json<Poll>, ApiError> {
    Ok(Json(repo::close_poll(&pool, &poll_id).await?))
}

/// This function handles DELETE requests to `/polls/{id}`.
#[instrument(skip(pool), fields(poll_id = %poll_id))]
pub async fn delete_poll_handler(
    State(pool): State<Arc<DbPool>>,
    Path(poll_id): Path<String>,
) -> Result<Json<()>, ApiError> {
    repo::delete_poll(&pool, &poll_id).await?;
    Ok(Json(()))
}

/// Handler for casting a ballot
///
/// This function handles POST requests to `/polls/{id}/votes`. The voter is
/// the user named by the `X-User-Id` header and needs the `polls:vote`
/// permission. A second ballot replaces the first.
///
/// ### Returns
///
/// The stored votes, 401 without a known user, 403 without the permission
#[instrument(skip(pool, user, payload), fields(poll_id = %poll_id))]
pub async fn cast_vote_handler(
    State(pool): State<Arc<DbPool>>,
    // Resolve the acting user from the request headers
    user: CurrentUser,
    Path(poll_id): Path<String>,
    Json(payload): Json<VoteDto>,
) -> Result<Json<Vec<PollVote>>, ApiError> {
    user.require(Permission::PollsVote)?;

    let votes = repo::cast_vote(&pool, &poll_id, &user.0, payload.option_ids).await?;

    info!("User {} voted in poll", user.0.get_id());

    Ok(Json(votes))
}

/// This function handles GET requests to `/polls/{id}/results`.
#[instrument(skip(pool), fields(poll_id = %poll_id))]
pub async fn get_poll_results_handler(
    State(pool): State<Arc<DbPool>>,
    Path(poll_id): Path<String>,
) -> Result<Json<PollResults>, ApiError> {
    Ok(Json(repo::get_poll_results(&pool, &poll_id)?))
}
