use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::db::DbPool;
use crate::dto::{
    CreateDraftDto, IngestMessageDto, MarkReadDto, SendDraftDto, ThreadSummary, UpdateDraftDto,
};
use crate::errors::ApiError;
use crate::models::{MailDraft, MailMessage};
use crate::repo;
use crate::AppState;

/// Handler for storing a message fetched from the committee mailbox
///
/// This function handles POST requests to `/mail/messages`. Posting a
/// message whose Message-ID is already stored returns the stored message.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `payload` - The parsed headers and body of the message
///
/// ### Returns
///
/// The stored message, including the thread it was filed under
#[instrument(skip(pool, payload), fields(message_id = %payload.message_id))]
pub async fn ingest_message_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Extract and deserialize the JSON request body
    Json(payload): Json<IngestMessageDto>,
) -> Result<Json<MailMessage>, ApiError> {
    info!("Ingesting message");

    let message = repo::ingest_message(&pool, payload).await?;

    info!("Message filed under thread {}", message.get_thread_id());

    Ok(Json(message))
}

/// Handler for retrieving a single message
///
/// This function handles GET requests to `/mail/messages/{id}`.
#[instrument(skip(pool), fields(id = %id))]
pub async fn get_message_handler(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<String>,
) -> Result<Json<MailMessage>, ApiError> {
    let message = repo::get_message(&pool, &id)?.ok_or(ApiError::NotFound("Mail message"))?;
    Ok(Json(message))
}

/// Handler for marking a message read or unread
///
/// This function handles PUT requests to `/mail/messages/{id}/read`.
#[instrument(skip(pool, payload), fields(id = %id, is_read = payload.is_read))]
pub async fn set_message_read_handler(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<String>,
    Json(payload): Json<MarkReadDto>,
) -> Result<Json<MailMessage>, ApiError> {
    let message = repo::set_message_read(&pool, &id, payload.is_read).await?;
    Ok(Json(message))
}

/// Handler for the thread overview of the mailbox
///
/// This function handles GET requests to `/mail/threads`.
#[instrument(skip(pool))]
pub async fn list_threads_handler(
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<Vec<ThreadSummary>>, ApiError> {
    let threads = repo::list_threads(&pool)?;

    debug!("Retrieved {} threads", threads.len());

    Ok(Json(threads))
}

/// Handler for the messages of one thread, oldest first
///
/// This function handles GET requests to `/mail/threads/{thread_id}`.
#[instrument(skip(pool), fields(thread_id = %thread_id))]
pub async fn get_thread_handler(
    State(pool): State<Arc<DbPool>>,
    // Extract the thread ID from the URL path
    Path(thread_id): Path<String>,
) -> Result<Json<Vec<MailMessage>>, ApiError> {
    let messages = repo::get_thread(&pool, &thread_id)?;
    Ok(Json(messages))
}

/// Handler for starting a draft
///
/// This function handles POST requests to `/mail/drafts`. When
/// `reply_to_message_id` is given, recipients, subject and thread are
/// prefilled from that message.
#[instrument(skip(pool, payload))]
pub async fn create_draft_handler(
    State(pool): State<Arc<DbPool>>,
    Json(payload): Json<CreateDraftDto>,
) -> Result<Json<MailDraft>, ApiError> {
    info!("Creating draft");

    let draft = repo::create_draft(&pool, payload).await?;

    Ok(Json(draft))
}

/// Handler for listing drafts
///
/// This function handles GET requests to `/mail/drafts`.
#[instrument(skip(pool))]
pub async fn list_drafts_handler(
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<Vec<MailDraft>>, ApiError> {
    Ok(Json(repo::list_drafts(&pool)?))
}

/// Handler for retrieving a draft
///
/// This function handles GET requests to `/mail/drafts/{id}`.
#[instrument(skip(pool), fields(id = %id))]
pub async fn get_draft_handler(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<String>,
) -> Result<Json<MailDraft>, ApiError> {
    let draft = repo::get_draft(&pool, &id)?.ok_or(ApiError::NotFound("Draft"))?;
    Ok(Json(draft))
}

/// Handler for editing a draft
///
/// This function handles PUT requests to `/mail/drafts/{id}`.
#[instrument(skip(pool, payload), fields(id = %id))]
pub async fn update_draft_handler(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateDraftDto>,
) -> Result<Json<MailDraft>, ApiError> {
    let draft = repo::update_draft(&pool, &id, payload).await?;
    Ok(Json(draft))
}

/// Handler for discarding a draft
///
/// This function handles DELETE requests to `/mail/drafts/{id}`.
#[instrument(skip(pool), fields(id = %id))]
pub async fn delete_draft_handler(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<String>,
) -> Result<Json<()>, ApiError> {
    repo::delete_draft(&pool, &id).await?;
    Ok(Json(()))
}

/// Handler for sending a draft
///
/// This function handles POST requests to `/mail/drafts/{id}/send`. The
/// draft becomes an outbound message in its thread and is removed. The
/// generated Message-ID uses the configured mail domain.
///
/// ### Returns
///
/// The stored outbound message
#[instrument(skip(state, payload), fields(id = %id, from = %payload.from))]
pub async fn send_draft_handler(
    // The mail domain lives next to the pool in the application state
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<SendDraftDto>,
) -> Result<Json<MailMessage>, ApiError> {
    info!("Sending draft");

    let message = repo::send_draft(&state.pool, &id, &payload.from, &state.mail_domain).await?;

    info!("Sent message {}", message.get_message_id());

    Ok(Json(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MailDirection;
    use crate::test_utils::setup_test_db;
    use chrono::{TimeZone, Utc};

    fn inbound(message_id: &str, in_reply_to: Option<&str>) -> IngestMessageDto {
        IngestMessageDto {
            message_id: message_id.to_string(),
            in_reply_to: in_reply_to.map(str::to_string),
            references: in_reply_to.map(str::to_string),
            from: "resident@example.org".to_string(),
            to: vec!["committee@example.org".to_string()],
            cc: Vec::new(),
            subject: "Broken heater".to_string(),
            body_text: "The heater in room 4 is broken.".to_string(),
            body_html: None,
            sent_at: Utc.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).unwrap(),
            direction: None,
        }
    }

    #[tokio::test]
    async fn test_ingest_reply_joins_thread() {
        let pool = setup_test_db();

        let root = ingest_message_handler(State(pool.clone()), Json(inbound("<root@example.org>", None)))
            .await
            .unwrap();
        let reply = ingest_message_handler(
            State(pool.clone()),
            Json(inbound("<reply@example.org>", Some("<root@example.org>"))),
        )
        .await
        .unwrap();

        assert_eq!(reply.0.get_thread_id(), root.0.get_thread_id());

        let thread = get_thread_handler(State(pool.clone()), Path(root.0.get_thread_id()))
            .await
            .unwrap();
        assert_eq!(thread.0.len(), 2);
    }

    #[tokio::test]
    async fn test_send_draft_handler() {
        let pool = setup_test_db();
        let state = AppState {
            pool: pool.clone(),
            mail_domain: "committee.example.org".to_string(),
        };
        let root = ingest_message_handler(State(pool.clone()), Json(inbound("<root@example.org>", None)))
            .await
            .unwrap();
        let draft = create_draft_handler(
            State(pool.clone()),
            Json(CreateDraftDto {
                body_text: "We will send someone.".to_string(),
                reply_to_message_id: Some(root.0.get_id()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        let sent = send_draft_handler(
            State(state),
            Path(draft.0.get_id()),
            Json(SendDraftDto { from: "committee@example.org".to_string() }),
        )
        .await
        .unwrap();

        assert_eq!(sent.0.get_direction(), MailDirection::Outbound);
        assert_eq!(sent.0.get_thread_id(), root.0.get_thread_id());
        assert!(sent.0.get_message_id().ends_with("@committee.example.org"));

        let result = get_draft_handler(State(pool.clone()), Path(draft.0.get_id())).await;
        assert!(matches!(result, Err(ApiError::NotFound("Draft"))));
    }

    #[tokio::test]
    async fn test_get_message_handler_not_found() {
        let pool = setup_test_db();

        let result = get_message_handler(State(pool.clone()), Path("missing".to_string())).await;

        assert!(matches!(result, Err(ApiError::NotFound("Mail message"))));
    }
}
