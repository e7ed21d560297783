use crate::db::{DbPool, ExecuteWithRetry};
use crate::dto::{
    CategorySummary, CreateTransactionDto, TransactionQueryDto, TreasurySummary, UpdateTransactionDto,
};
use crate::errors::DomainError;
use crate::models::{Transaction, TransactionKind, TransactionStatus};
use crate::schema::{purchases, transactions};
use anyhow::Result;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

use super::require_text;

#[derive(AsChangeset, Debug)]
#[diesel(table_name = transactions)]
struct TransactionChanges {
    kind: Option<TransactionKind>,
    amount_cents: Option<i64>,
    description: Option<String>,
    category: Option<Option<String>>,
    date: Option<NaiveDate>,
    year: Option<i32>,
    status: Option<TransactionStatus>,
    updated_at: NaiveDateTime,
}

fn check_amount(amount_cents: i64) -> Result<(), DomainError> {
    if amount_cents <= 0 {
        return Err(DomainError::Invalid("Amount must be positive".to_string()));
    }
    Ok(())
}

/// Creates a new treasury transaction
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `dto` - The transaction fields; status defaults to complete
///
/// ### Returns
///
/// A Result containing the newly created transaction
///
/// ### Errors
///
/// Returns an error if:
/// - The amount is not positive or the description is blank
/// - The database insert fails
#[instrument(skip(pool, dto), fields(kind = %dto.kind, amount_cents = dto.amount_cents))]
pub async fn create_transaction(pool: &DbPool, dto: CreateTransactionDto) -> Result<Transaction> {
    debug!("Creating new transaction");

    check_amount(dto.amount_cents)?;
    require_text("Description", &dto.description)?;

    let transaction = Transaction::new(
        dto.kind,
        dto.amount_cents,
        dto.description,
        dto.date,
        dto.status.unwrap_or(TransactionStatus::Complete),
    )
    .with_category(dto.category);

    // Get a connection from the pool
    let mut conn = pool.get()?;

    // Insert the new transaction into the database
    diesel::insert_into(transactions::table)
        .values(&transaction)
        .execute_with_retry(&mut conn).await?;

    info!("Successfully created transaction with id: {}", transaction.get_id());

    // Return the newly created transaction
    Ok(transaction)
}

/// Retrieves a transaction by its ID
#[instrument(skip(pool), fields(transaction_id = %transaction_id))]
pub fn get_transaction(pool: &DbPool, transaction_id: &str) -> Result<Option<Transaction>> {
    debug!("Retrieving transaction by id");

    let mut conn = pool.get()?;
    let transaction = transactions::table
        .find(transaction_id)
        .select(Transaction::as_select())
        .first(&mut conn)
        .optional()?;

    Ok(transaction)
}

/// Lists transactions matching the query, newest first
#[instrument(skip(pool))]
pub fn list_transactions(pool: &DbPool, query: &TransactionQueryDto) -> Result<Vec<Transaction>> {
    debug!("Listing transactions");

    let mut conn = pool.get()?;
    let mut db_query = transactions::table
        .select(Transaction::as_select())
        .order((transactions::date.desc(), transactions::created_at.desc()))
        .into_boxed();

    if let Some(year) = query.year {
        db_query = db_query.filter(transactions::year.eq(year));
    }
    if let Some(kind) = query.kind {
        db_query = db_query.filter(transactions::kind.eq(kind));
    }
    if let Some(status) = query.status {
        db_query = db_query.filter(transactions::status.eq(status));
    }
    if let Some(category) = &query.category {
        db_query = db_query.filter(transactions::category.eq(category));
    }

    let result = db_query.load(&mut conn)?;

    info!("Retrieved {} transactions", result.len());

    Ok(result)
}

/// Updates the fields of a transaction
///
/// Changing the date moves the transaction to the date's year.
#[instrument(skip(pool, dto), fields(transaction_id = %transaction_id))]
pub async fn update_transaction(pool: &DbPool, transaction_id: &str, dto: UpdateTransactionDto) -> Result<Transaction> {
    debug!("Updating transaction");

    if let Some(amount_cents) = dto.amount_cents {
        check_amount(amount_cents)?;
    }
    if let Some(description) = &dto.description {
        require_text("Description", description)?;
    }

    let changes = TransactionChanges {
        kind: dto.kind,
        amount_cents: dto.amount_cents,
        description: dto.description,
        category: dto.category,
        year: dto.date.map(|date| date.year()),
        date: dto.date,
        status: dto.status,
        updated_at: Utc::now().naive_utc(),
    };

    let mut conn = pool.get()?;

    // Update the transaction in the database
    let updated = diesel::update(transactions::table.find(transaction_id))
        .set(&changes)
        .execute_with_retry(&mut conn).await?;

    if updated == 0 {
        return Err(DomainError::NotFound("Transaction").into());
    }

    // Read back the stored transaction
    let transaction = transactions::table
        .find(transaction_id)
        .select(Transaction::as_select())
        .first(&mut conn)?;

    info!("Successfully updated transaction");

    Ok(transaction)
}

/// Deletes a transaction and its inventory links
///
/// ### Errors
///
/// Returns a conflict while a reimbursement request still references the
/// transaction; the request has to be deleted instead.
#[instrument(skip(pool), fields(transaction_id = %transaction_id))]
pub async fn delete_transaction(pool: &DbPool, transaction_id: &str) -> Result<()> {
    debug!("Deleting transaction");

    let mut conn = pool.get()?;
    conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let referenced = purchases::table
            .filter(purchases::transaction_id.eq(transaction_id))
            .select(purchases::id)
            .first::<String>(conn)
            .optional()?;
        if let Some(purchase_id) = referenced {
            return Err(DomainError::Conflict(format!(
                "Transaction belongs to reimbursement request {}",
                purchase_id
            ))
            .into());
        }

        let deleted = diesel::delete(transactions::table.find(transaction_id)).execute(conn)?;
        if deleted == 0 {
            return Err(DomainError::NotFound("Transaction").into());
        }
        Ok(())
    })?;

    info!("Successfully deleted transaction");

    Ok(())
}

fn checked_total(total: Option<i64>) -> Result<i64, DomainError> {
    total.ok_or_else(|| DomainError::Invalid("Treasury totals exceed the supported range".to_string()))
}

/// Sums one year's transactions, overall and per category
///
/// Pending transactions are included. Categories are sorted by name with
/// uncategorised transactions first.
#[instrument(skip(pool), fields(year = year))]
pub fn get_treasury_summary(pool: &DbPool, year: i32) -> Result<TreasurySummary> {
    debug!("Summarising treasury year");

    let mut conn = pool.get()?;
    let rows = transactions::table
        .filter(transactions::year.eq(year))
        .select((transactions::kind, transactions::category, transactions::amount_cents))
        .load::<(TransactionKind, Option<String>, i64)>(&mut conn)?;

    let mut by_category: BTreeMap<Option<String>, (i64, i64)> = BTreeMap::new();
    for (kind, category, amount_cents) in rows {
        let totals = by_category.entry(category).or_default();
        match kind {
            TransactionKind::Income => totals.0 = checked_total(totals.0.checked_add(amount_cents))?,
            TransactionKind::Expense => totals.1 = checked_total(totals.1.checked_add(amount_cents))?,
        }
    }

    let mut categories = Vec::with_capacity(by_category.len());
    let mut income_cents = 0i64;
    let mut expense_cents = 0i64;
    for (category, (category_income, category_expense)) in by_category {
        income_cents = checked_total(income_cents.checked_add(category_income))?;
        expense_cents = checked_total(expense_cents.checked_add(category_expense))?;
        categories.push(CategorySummary {
            category,
            income_cents: category_income,
            expense_cents: category_expense,
            balance_cents: checked_total(category_income.checked_sub(category_expense))?,
        });
    }

    Ok(TreasurySummary {
        year,
        income_cents,
        expense_cents,
        balance_cents: checked_total(income_cents.checked_sub(expense_cents))?,
        categories,
    })
}

/// Lists every year that has transactions, most recent first
#[instrument(skip(pool))]
pub fn list_transaction_years(pool: &DbPool) -> Result<Vec<i32>> {
    let mut conn = pool.get()?;
    let years = transactions::table
        .select(transactions::year)
        .distinct()
        .order(transactions::year.desc())
        .load::<i32>(&mut conn)?;

    Ok(years)
}

#[cfg(test)]
mod tests;
