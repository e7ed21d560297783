use crate::db::{DbPool, ExecuteWithRetry};
use crate::dto::{CreateDraftDto, IngestMessageDto, ThreadSummary, UpdateDraftDto};
use crate::errors::DomainError;
use crate::models::{MailDirection, MailDraft, MailMessage, NewMailMessage, StringList};
use crate::schema::{mail_drafts, mail_messages};
use crate::threading::{self, ThreadParent};
use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

use super::require_text;

#[derive(AsChangeset, Debug)]
#[diesel(table_name = mail_drafts)]
struct DraftChanges {
    to_addresses: Option<StringList>,
    cc_addresses: Option<StringList>,
    subject: Option<String>,
    body_text: Option<String>,
    updated_at: NaiveDateTime,
}

fn find_message(conn: &mut SqliteConnection, id: &str) -> Result<MailMessage> {
    let message = mail_messages::table
        .find(id)
        .select(MailMessage::as_select())
        .first(conn)
        .optional()?
        .ok_or(DomainError::NotFound("Mail message"))?;
    Ok(message)
}

fn find_draft(conn: &mut SqliteConnection, id: &str) -> Result<MailDraft> {
    let draft = mail_drafts::table
        .find(id)
        .select(MailDraft::as_select())
        .first(conn)
        .optional()?
        .ok_or(DomainError::NotFound("Draft"))?;
    Ok(draft)
}

/// Stores a message handed over by the mail fetcher
///
/// Header ids are normalized and the message is placed in the thread of
/// its nearest known ancestor. Ingesting a Message-ID that is already
/// stored returns the stored message unchanged.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `dto` - The message headers and bodies
///
/// ### Returns
///
/// The stored message
///
/// ### Errors
///
/// Returns an error if the Message-ID or sender is missing, or the
/// database write fails
#[instrument(skip(pool, dto), fields(message_id = %dto.message_id))]
pub async fn ingest_message(pool: &DbPool, dto: IngestMessageDto) -> Result<MailMessage> {
    debug!("Ingesting mail message");

    let message_id = threading::normalize_message_id(&dto.message_id)
        .ok_or_else(|| DomainError::Invalid("Message-ID must not be empty".to_string()))?;
    require_text("Sender", &dto.from)?;

    let in_reply_to = dto.in_reply_to.as_deref().and_then(threading::normalize_message_id);
    let references = dto
        .references
        .as_deref()
        .map(threading::parse_references)
        .unwrap_or_default();

    let mut conn = pool.get()?;
    let message = conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let existing = mail_messages::table
            .filter(mail_messages::message_id.eq(&message_id))
            .select(MailMessage::as_select())
            .first(conn)
            .optional()?;
        if let Some(existing) = existing {
            info!("Message already stored as {}", existing.get_id());
            return Ok(existing);
        }

        let candidates: Vec<&String> = in_reply_to.iter().chain(references.iter()).collect();
        let known: HashMap<String, String> = mail_messages::table
            .filter(mail_messages::message_id.eq_any(candidates))
            .select((mail_messages::message_id, mail_messages::thread_id))
            .load::<(String, String)>(conn)?
            .into_iter()
            .collect();

        let thread_id = threading::resolve_thread_id(
            &message_id,
            in_reply_to.as_deref(),
            &references,
            |candidate| known.get(candidate).cloned(),
        );

        let message = MailMessage::new(NewMailMessage {
            direction: dto.direction.unwrap_or(MailDirection::Inbound),
            message_id: message_id.clone(),
            in_reply_to: in_reply_to.clone(),
            references: references.clone(),
            thread_id,
            from_address: dto.from.trim().to_string(),
            to_addresses: dto.to.clone(),
            cc_addresses: dto.cc.clone(),
            subject: dto.subject.clone(),
            body_text: dto.body_text.clone(),
            body_html: dto.body_html.clone(),
            sent_at: dto.sent_at,
        });
        diesel::insert_into(mail_messages::table).values(&message).execute(conn)?;

        info!("Stored message in thread {}", message.get_thread_id());
        Ok(message)
    })?;

    Ok(message)
}

/// Retrieves a stored message by its row id
#[instrument(skip(pool), fields(id = %id))]
pub fn get_message(pool: &DbPool, id: &str) -> Result<Option<MailMessage>> {
    let mut conn = pool.get()?;
    let message = mail_messages::table
        .find(id)
        .select(MailMessage::as_select())
        .first(&mut conn)
        .optional()?;
    Ok(message)
}

/// Marks a message as read or unread
#[instrument(skip(pool), fields(id = %id, is_read = is_read))]
pub async fn set_message_read(pool: &DbPool, id: &str, is_read: bool) -> Result<MailMessage> {
    let mut conn = pool.get()?;
    let updated = diesel::update(mail_messages::table.find(id))
        .set(mail_messages::is_read.eq(is_read))
        .execute_with_retry(&mut conn).await?;
    if updated == 0 {
        return Err(DomainError::NotFound("Mail message").into());
    }
    find_message(&mut conn, id)
}

/// Lists every thread, most recent activity first
#[instrument(skip(pool))]
pub fn list_threads(pool: &DbPool) -> Result<Vec<ThreadSummary>> {
    debug!("Listing mail threads");

    let mut conn = pool.get()?;
    let rows = mail_messages::table
        .select((
            mail_messages::thread_id,
            mail_messages::subject,
            mail_messages::sent_at,
            mail_messages::is_read,
        ))
        .order((mail_messages::sent_at.asc(), mail_messages::created_at.asc()))
        .load::<(String, String, NaiveDateTime, bool)>(&mut conn)?;

    let mut threads: HashMap<String, ThreadSummary> = HashMap::new();
    for (thread_id, subject, sent_at, is_read) in rows {
        let sent_at = DateTime::from_naive_utc_and_offset(sent_at, Utc);
        let summary = threads.entry(thread_id.clone()).or_insert_with(|| ThreadSummary {
            thread_id,
            subject,
            message_count: 0,
            unread_count: 0,
            last_message_at: sent_at,
        });
        summary.message_count += 1;
        if !is_read {
            summary.unread_count += 1;
        }
        summary.last_message_at = summary.last_message_at.max(sent_at);
    }

    let mut threads: Vec<ThreadSummary> = threads.into_values().collect();
    threads.sort_by(|a, b| {
        b.last_message_at
            .cmp(&a.last_message_at)
            .then_with(|| a.thread_id.cmp(&b.thread_id))
    });

    info!("Retrieved {} threads", threads.len());

    Ok(threads)
}

/// Returns the messages of a thread, oldest first
#[instrument(skip(pool), fields(thread_id = %thread_id))]
pub fn get_thread(pool: &DbPool, thread_id: &str) -> Result<Vec<MailMessage>> {
    let mut conn = pool.get()?;
    let messages = mail_messages::table
        .filter(mail_messages::thread_id.eq(thread_id))
        .select(MailMessage::as_select())
        .order((mail_messages::sent_at.asc(), mail_messages::created_at.asc()))
        .load(&mut conn)?;

    if messages.is_empty() {
        return Err(DomainError::NotFound("Thread").into());
    }
    Ok(messages)
}

// ── Drafts ───────────────────────────────────────────────────────────

/// Creates a draft, optionally as a reply to a stored message
///
/// A reply is addressed to the parent's sender when no recipients are
/// given, gets the parent's subject prefixed with `Re:` when no subject is
/// given, and joins the parent's thread.
#[instrument(skip(pool, dto))]
pub async fn create_draft(pool: &DbPool, dto: CreateDraftDto) -> Result<MailDraft> {
    debug!("Creating draft");

    let mut conn = pool.get()?;

    let draft = match &dto.reply_to_message_id {
        Some(parent_id) => {
            let parent = find_message(&mut conn, parent_id)?;
            let to = if dto.to.is_empty() { vec![parent.get_from_address()] } else { dto.to };
            let subject = if dto.subject.trim().is_empty() {
                threading::reply_subject(&parent.get_subject())
            } else {
                dto.subject
            };
            MailDraft::new(to, dto.cc, subject, dto.body_text)
                .replying_to(parent.get_id(), parent.get_thread_id())
        }
        None => MailDraft::new(dto.to, dto.cc, dto.subject, dto.body_text),
    };

    // Insert the new draft into the database
    diesel::insert_into(mail_drafts::table)
        .values(&draft)
        .execute_with_retry(&mut conn).await?;

    info!("Successfully created draft with id: {}", draft.get_id());

    Ok(draft)
}

/// Lists drafts, most recently edited first
#[instrument(skip(pool))]
pub fn list_drafts(pool: &DbPool) -> Result<Vec<MailDraft>> {
    let mut conn = pool.get()?;
    let drafts = mail_drafts::table
        .select(MailDraft::as_select())
        .order(mail_drafts::updated_at.desc())
        .load(&mut conn)?;
    Ok(drafts)
}

#[instrument(skip(pool), fields(id = %id))]
pub fn get_draft(pool: &DbPool, id: &str) -> Result<Option<MailDraft>> {
    let mut conn = pool.get()?;
    let draft = mail_drafts::table
        .find(id)
        .select(MailDraft::as_select())
        .first(&mut conn)
        .optional()?;
    Ok(draft)
}

#[instrument(skip(pool, dto), fields(id = %id))]
pub async fn update_draft(pool: &DbPool, id: &str, dto: UpdateDraftDto) -> Result<MailDraft> {
    debug!("Updating draft");

    let changes = DraftChanges {
        to_addresses: dto.to.map(StringList),
        cc_addresses: dto.cc.map(StringList),
        subject: dto.subject,
        body_text: dto.body_text,
        updated_at: Utc::now().naive_utc(),
    };

    let mut conn = pool.get()?;
    let updated = diesel::update(mail_drafts::table.find(id))
        .set(&changes)
        .execute_with_retry(&mut conn).await?;
    if updated == 0 {
        return Err(DomainError::NotFound("Draft").into());
    }
    find_draft(&mut conn, id)
}

#[instrument(skip(pool), fields(id = %id))]
pub async fn delete_draft(pool: &DbPool, id: &str) -> Result<()> {
    let mut conn = pool.get()?;
    let deleted = diesel::delete(mail_drafts::table.find(id))
        .execute_with_retry(&mut conn).await?;
    if deleted == 0 {
        return Err(DomainError::NotFound("Draft").into());
    }
    Ok(())
}

/// Turns a draft into a stored outbound message
///
/// The message gets a fresh Message-ID under `mail_domain`. A reply
/// carries `In-Reply-To` and `References` pointing at its parent and stays
/// in the parent's thread; a new message starts its own thread. The draft
/// is removed in the same database transaction. Handing the message to a
/// mail server is left to the outbound relay.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `id` - The draft's id
/// * `from` - The committee address the message is sent from
/// * `mail_domain` - Domain used for the generated Message-ID
///
/// ### Errors
///
/// Returns a validation error when the draft has no recipient or an empty
/// subject
#[instrument(skip(pool), fields(id = %id, from = %from))]
pub async fn send_draft(pool: &DbPool, id: &str, from: &str, mail_domain: &str) -> Result<MailMessage> {
    debug!("Sending draft");

    require_text("Sender", from)?;

    let mut conn = pool.get()?;
    let message = conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let draft = find_draft(conn, id)?;
        if draft.get_to_addresses().iter().all(|to| to.trim().is_empty()) {
            return Err(DomainError::Invalid("A draft needs at least one recipient".to_string()).into());
        }
        require_text("Subject", &draft.get_subject())?;

        let message_id = threading::generate_message_id(mail_domain);
        let parent = match draft.get_reply_to_message_id() {
            Some(parent_id) => mail_messages::table
                .find(&parent_id)
                .select(MailMessage::as_select())
                .first(conn)
                .optional()?,
            None => None,
        };

        let (in_reply_to, references, thread_id) = match &parent {
            Some(parent) => {
                let headers = threading::reply_headers(ThreadParent {
                    message_id: &parent.get_message_id(),
                    references: parent.get_references(),
                    thread_id: &parent.get_thread_id(),
                });
                (Some(headers.in_reply_to), headers.references, headers.thread_id)
            }
            None => {
                if draft.get_reply_to_message_id().is_some() {
                    warn!("Parent message of draft is gone, sending as a new thread");
                }
                (None, Vec::new(), draft.get_thread_id().unwrap_or_else(|| message_id.clone()))
            }
        };

        let message = MailMessage::new(NewMailMessage {
            direction: MailDirection::Outbound,
            message_id,
            in_reply_to,
            references,
            thread_id,
            from_address: from.trim().to_string(),
            to_addresses: draft.get_to_addresses().to_vec(),
            cc_addresses: draft.get_cc_addresses().to_vec(),
            subject: draft.get_subject(),
            body_text: draft.get_body_text(),
            body_html: None,
            sent_at: Utc::now(),
        });

        diesel::insert_into(mail_messages::table).values(&message).execute(conn)?;
        diesel::delete(mail_drafts::table.find(id)).execute(conn)?;
        Ok(message)
    })?;

    info!("Sent message {} in thread {}", message.get_message_id(), message.get_thread_id());

    Ok(message)
}

#[cfg(test)]
mod tests;
