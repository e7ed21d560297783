use crate::db::{DbPool, ExecuteWithRetry};
use crate::dto::{CreatePollDto, OptionResult, PollDetails, PollResults};
use crate::errors::DomainError;
use crate::models::{Poll, PollOption, PollStatus, PollVote, User};
use crate::schema::{poll_options, poll_votes, polls};
use anyhow::Result;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument};

use super::require_text;

fn find_poll(conn: &mut SqliteConnection, poll_id: &str) -> Result<Poll> {
    let poll = polls::table
        .find(poll_id)
        .select(Poll::as_select())
        .first(conn)
        .optional()?
        .ok_or(DomainError::NotFound("Poll"))?;
    Ok(poll)
}

fn load_options(conn: &mut SqliteConnection, poll_id: &str) -> QueryResult<Vec<PollOption>> {
    poll_options::table
        .filter(poll_options::poll_id.eq(poll_id))
        .select(PollOption::as_select())
        .order(poll_options::sort_order.asc())
        .load(conn)
}

/// Creates a poll in the draft state
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `dto` - The poll fields and its option labels in display order
///
/// ### Errors
///
/// Returns an error if the title or an option label is blank, or fewer than
/// two options are given
#[instrument(skip(pool, dto), fields(title = %dto.title, options = dto.options.len()))]
pub async fn create_poll(pool: &DbPool, dto: CreatePollDto) -> Result<PollDetails> {
    debug!("Creating poll");

    require_text("Title", &dto.title)?;
    if dto.options.len() < 2 {
        return Err(DomainError::Invalid("A poll needs at least two options".to_string()).into());
    }
    for label in &dto.options {
        require_text("Option label", label)?;
    }

    let poll = Poll::new(dto.title, dto.description, dto.allow_multiple, dto.deadline);
    let options: Vec<PollOption> = dto
        .options
        .into_iter()
        .zip(0..)
        .map(|(label, sort_order)| PollOption::new(&poll.get_id(), label.trim().to_string(), sort_order))
        .collect();

    let mut conn = pool.get()?;
    conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        diesel::insert_into(polls::table).values(&poll).execute(conn)?;
        diesel::insert_into(poll_options::table).values(&options).execute(conn)?;
        Ok(())
    })?;

    info!("Successfully created poll with id: {}", poll.get_id());

    Ok(PollDetails { poll, options })
}

/// Retrieves a poll with its options
#[instrument(skip(pool), fields(poll_id = %poll_id))]
pub fn get_poll(pool: &DbPool, poll_id: &str) -> Result<Option<PollDetails>> {
    let mut conn = pool.get()?;
    let poll = polls::table
        .find(poll_id)
        .select(Poll::as_select())
        .first(&mut conn)
        .optional()?;

    match poll {
        Some(poll) => {
            let options = load_options(&mut conn, poll_id)?;
            Ok(Some(PollDetails { poll, options }))
        }
        None => Ok(None),
    }
}

/// Lists polls, newest first, optionally filtered by status
#[instrument(skip(pool))]
pub fn list_polls(pool: &DbPool, status: Option<PollStatus>) -> Result<Vec<Poll>> {
    let mut conn = pool.get()?;
    let mut query = polls::table
        .select(Poll::as_select())
        .order(polls::created_at.desc())
        .into_boxed();
    if let Some(status) = status {
        query = query.filter(polls::status.eq(status));
    }
    Ok(query.load(&mut conn)?)
}

async fn change_status(pool: &DbPool, poll_id: &str, from: PollStatus, to: PollStatus) -> Result<Poll> {
    let mut conn = pool.get()?;
    let updated = diesel::update(polls::table.filter(polls::id.eq(poll_id)).filter(polls::status.eq(from)))
        .set((polls::status.eq(to), polls::updated_at.eq(Utc::now().naive_utc())))
        .execute_with_retry(&mut conn).await?;

    let poll = find_poll(&mut conn, poll_id)?;
    if updated == 0 {
        return Err(DomainError::Invalid(format!(
            "Only {} polls can be made {}, this one is {}",
            from,
            to,
            poll.get_status()
        ))
        .into());
    }

    info!("Poll is now {}", to);

    Ok(poll)
}

/// Opens a draft poll for voting
#[instrument(skip(pool), fields(poll_id = %poll_id))]
pub async fn open_poll(pool: &DbPool, poll_id: &str) -> Result<Poll> {
    change_status(pool, poll_id, PollStatus::Draft, PollStatus::Open).await
}

/// Closes an open poll
#[instrument(skip(pool), fields(poll_id = %poll_id))]
pub async fn close_poll(pool: &DbPool, poll_id: &str) -> Result<Poll> {
    change_status(pool, poll_id, PollStatus::Open, PollStatus::Closed).await
}

/// Deletes a poll with its options and votes
#[instrument(skip(pool), fields(poll_id = %poll_id))]
pub async fn delete_poll(pool: &DbPool, poll_id: &str) -> Result<()> {
    let mut conn = pool.get()?;
    let deleted = diesel::delete(polls::table.find(poll_id))
        .execute_with_retry(&mut conn).await?;
    if deleted == 0 {
        return Err(DomainError::NotFound("Poll").into());
    }
    Ok(())
}

/// Records a voter's ballot, replacing any earlier ballot in the same poll
///
/// The poll must be open and its deadline not yet reached. The selected
/// options must be distinct and belong to the poll; a single-choice poll
/// takes exactly one.
///
/// ### Returns
///
/// The stored votes of the ballot
#[instrument(skip(pool, voter, option_ids), fields(poll_id = %poll_id, voter_id = %voter.get_id()))]
pub async fn cast_vote(pool: &DbPool, poll_id: &str, voter: &User, option_ids: Vec<String>) -> Result<Vec<PollVote>> {
    debug!("Casting vote");

    let unique: HashSet<&String> = option_ids.iter().collect();
    if option_ids.is_empty() {
        return Err(DomainError::Invalid("A ballot needs at least one option".to_string()).into());
    }
    if unique.len() != option_ids.len() {
        return Err(DomainError::Invalid("A ballot cannot select an option twice".to_string()).into());
    }

    let voter_id = voter.get_id();
    let mut conn = pool.get()?;
    let votes = conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let poll = find_poll(conn, poll_id)?;
        if !poll.accepts_votes_at(Utc::now()) {
            return Err(DomainError::Invalid("This poll is not accepting votes".to_string()).into());
        }
        if !poll.get_allow_multiple() && option_ids.len() != 1 {
            return Err(DomainError::Invalid("This poll accepts exactly one option".to_string()).into());
        }

        let valid: HashSet<String> = load_options(conn, poll_id)?
            .into_iter()
            .map(|option| option.get_id())
            .collect();
        if let Some(foreign) = option_ids.iter().find(|id| !valid.contains(*id)) {
            return Err(DomainError::Invalid(format!("Option {} does not belong to this poll", foreign)).into());
        }

        diesel::delete(
            poll_votes::table
                .filter(poll_votes::poll_id.eq(poll_id))
                .filter(poll_votes::voter_id.eq(&voter_id)),
        )
        .execute(conn)?;

        let votes: Vec<PollVote> = option_ids
            .iter()
            .map(|option_id| PollVote::new(poll_id, option_id, &voter_id))
            .collect();
        diesel::insert_into(poll_votes::table).values(&votes).execute(conn)?;
        Ok(votes)
    })?;

    info!("Recorded ballot with {} options", votes.len());

    Ok(votes)
}

/// Counts the votes of a poll
///
/// Options are reported in display order; `total_voters` counts distinct
/// voters, which differs from the vote total in multiple-choice polls.
#[instrument(skip(pool), fields(poll_id = %poll_id))]
pub fn get_poll_results(pool: &DbPool, poll_id: &str) -> Result<PollResults> {
    let mut conn = pool.get()?;
    find_poll(&mut conn, poll_id)?;

    let options = load_options(&mut conn, poll_id)?;
    let votes = poll_votes::table
        .filter(poll_votes::poll_id.eq(poll_id))
        .select((poll_votes::option_id, poll_votes::voter_id))
        .load::<(String, String)>(&mut conn)?;

    let mut counts: HashMap<&str, i64> = HashMap::new();
    let mut voters: HashSet<&str> = HashSet::new();
    for (option_id, voter_id) in &votes {
        *counts.entry(option_id.as_str()).or_default() += 1;
        voters.insert(voter_id.as_str());
    }

    let options = options
        .into_iter()
        .map(|option| OptionResult {
            votes: counts.get(option.get_id().as_str()).copied().unwrap_or(0),
            option_id: option.get_id(),
            label: option.get_label(),
        })
        .collect();

    Ok(PollResults {
        poll_id: poll_id.to_string(),
        total_voters: voters.len() as i64,
        options,
    })
}

#[cfg(test)]
mod tests;
