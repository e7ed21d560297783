use crate::db::{DbPool, ExecuteWithRetry};
use crate::dto::{CreateFaqDto, UpdateFaqDto};
use crate::errors::DomainError;
use crate::models::Faq;
use crate::schema::faqs;
use anyhow::Result;
use chrono::{NaiveDateTime, Utc};
use diesel::dsl::max;
use diesel::prelude::*;
use tracing::{debug, info, instrument};

use super::require_text;

#[derive(AsChangeset, Debug)]
#[diesel(table_name = faqs)]
struct FaqChanges {
    question: Option<String>,
    answer: Option<String>,
    sort_order: Option<i32>,
    updated_at: NaiveDateTime,
}

/// Creates a new FAQ entry
///
/// Without an explicit sort order the entry is appended after the last one.
#[instrument(skip(pool, dto))]
pub async fn create_faq(pool: &DbPool, dto: CreateFaqDto) -> Result<Faq> {
    debug!("Creating FAQ entry");

    require_text("Question", &dto.question)?;
    require_text("Answer", &dto.answer)?;

    // Get a connection from the pool
    let mut conn = pool.get()?;

    // Place the entry after the current last one unless told otherwise
    let sort_order = match dto.sort_order {
        Some(sort_order) => sort_order,
        None => match faqs::table
            .select(max(faqs::sort_order))
            .first::<Option<i32>>(&mut conn)?
        {
            Some(last) => last.checked_add(1).ok_or_else(|| {
                DomainError::Invalid("No sort order is left after the last FAQ entry".to_string())
            })?,
            None => 0,
        },
    };

    // Insert the new entry into the database
    let faq = Faq::new(dto.question, dto.answer, sort_order);
    diesel::insert_into(faqs::table)
        .values(&faq)
        .execute_with_retry(&mut conn).await?;

    info!("Successfully created FAQ entry with id: {}", faq.get_id());

    // Return the newly created entry
    Ok(faq)
}

#[instrument(skip(pool), fields(faq_id = %faq_id))]
pub fn get_faq(pool: &DbPool, faq_id: &str) -> Result<Option<Faq>> {
    let mut conn = pool.get()?;
    let faq = faqs::table
        .find(faq_id)
        .select(Faq::as_select())
        .first(&mut conn)
        .optional()?;
    Ok(faq)
}

/// Lists FAQ entries by sort order, then by creation time
#[instrument(skip(pool))]
pub fn list_faqs(pool: &DbPool) -> Result<Vec<Faq>> {
    let mut conn = pool.get()?;
    let result = faqs::table
        .select(Faq::as_select())
        .order((faqs::sort_order.asc(), faqs::created_at.asc()))
        .load(&mut conn)?;
    Ok(result)
}

#[instrument(skip(pool, dto), fields(faq_id = %faq_id))]
pub async fn update_faq(pool: &DbPool, faq_id: &str, dto: UpdateFaqDto) -> Result<Faq> {
    debug!("Updating FAQ entry");

    if let Some(question) = &dto.question {
        require_text("Question", question)?;
    }
    if let Some(answer) = &dto.answer {
        require_text("Answer", answer)?;
    }

    let changes = FaqChanges {
        question: dto.question,
        answer: dto.answer,
        sort_order: dto.sort_order,
        updated_at: Utc::now().naive_utc(),
    };

    let mut conn = pool.get()?;

    // Update the entry in the database
    let updated = diesel::update(faqs::table.find(faq_id))
        .set(&changes)
        .execute_with_retry(&mut conn).await?;
    if updated == 0 {
        return Err(DomainError::NotFound("FAQ entry").into());
    }

    let faq = faqs::table
        .find(faq_id)
        .select(Faq::as_select())
        .first(&mut conn)?;
    Ok(faq)
}

#[instrument(skip(pool), fields(faq_id = %faq_id))]
pub async fn delete_faq(pool: &DbPool, faq_id: &str) -> Result<()> {
    let mut conn = pool.get()?;
    let deleted = diesel::delete(faqs::table.find(faq_id))
        .execute_with_retry(&mut conn).await?;
    if deleted == 0 {
        return Err(DomainError::NotFound("FAQ entry").into());
    }
    info!("Deleted FAQ entry");
    Ok(())
}

#[cfg(test)]
mod tests;
