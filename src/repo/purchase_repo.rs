use crate::db::{DbPool, ExecuteWithRetry};
use crate::dto::{CreatePurchaseDto, CreateReceiptDto, PurchaseDetails, UpdatePurchaseDto};
use crate::errors::DomainError;
use crate::models::{Purchase, PurchaseStatus, Receipt, Transaction, TransactionKind, TransactionStatus};
use crate::schema::{purchases, receipts, transactions};
use anyhow::Result;
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::collections::HashSet;
use tracing::{debug, info, instrument};

use super::require_text;

#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = purchases)]
struct PurchaseChanges {
    purchaser_name: Option<String>,
    bank_account: Option<String>,
    description: Option<String>,
    minutes_ref: Option<Option<String>>,
    notes: Option<Option<String>>,
    status: Option<PurchaseStatus>,
    updated_at: Option<NaiveDateTime>,
}

// ── Receipts ─────────────────────────────────────────────────────────

/// Stores a receipt reference
///
/// The file itself lives in external storage; only its name and URL are kept.
#[instrument(skip(pool, dto), fields(name = %dto.name))]
pub async fn create_receipt(pool: &DbPool, dto: CreateReceiptDto) -> Result<Receipt> {
    debug!("Creating receipt");

    require_text("Name", &dto.name)?;
    require_text("URL", &dto.url)?;

    let receipt = Receipt::new(dto.name, dto.url, dto.description);

    // Get a connection from the pool
    let mut conn = pool.get()?;

    // Insert the new receipt into the database
    diesel::insert_into(receipts::table)
        .values(&receipt)
        .execute_with_retry(&mut conn).await?;

    info!("Successfully created receipt with id: {}", receipt.get_id());

    Ok(receipt)
}

/// Lists receipts, newest first, optionally only those not attached to a purchase
#[instrument(skip(pool))]
pub fn list_receipts(pool: &DbPool, unattached_only: bool) -> Result<Vec<Receipt>> {
    let mut conn = pool.get()?;
    let mut query = receipts::table
        .select(Receipt::as_select())
        .order(receipts::created_at.desc())
        .into_boxed();
    if unattached_only {
        query = query.filter(receipts::purchase_id.is_null());
    }
    Ok(query.load(&mut conn)?)
}

/// Deletes a receipt that is not attached to a purchase
#[instrument(skip(pool), fields(receipt_id = %receipt_id))]
pub async fn delete_receipt(pool: &DbPool, receipt_id: &str) -> Result<()> {
    debug!("Deleting receipt");

    let mut conn = pool.get()?;
    conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let receipt = receipts::table
            .find(receipt_id)
            .select(Receipt::as_select())
            .first(conn)
            .optional()?
            .ok_or(DomainError::NotFound("Receipt"))?;
        if receipt.get_purchase_id().is_some() {
            return Err(DomainError::Conflict("Receipt is attached to a reimbursement request".to_string()).into());
        }
        diesel::delete(receipts::table.find(receipt_id)).execute(conn)?;
        Ok(())
    })?;

    info!("Successfully deleted receipt");

    Ok(())
}

// ── Purchases ────────────────────────────────────────────────────────

fn find_purchase(conn: &mut SqliteConnection, purchase_id: &str) -> Result<Purchase> {
    let purchase = purchases::table
        .find(purchase_id)
        .select(Purchase::as_select())
        .first(conn)
        .optional()?
        .ok_or(DomainError::NotFound("Purchase"))?;
    Ok(purchase)
}

fn load_details(conn: &mut SqliteConnection, purchase: Purchase) -> QueryResult<PurchaseDetails> {
    let transaction = transactions::table
        .find(purchase.get_transaction_id())
        .select(Transaction::as_select())
        .first(conn)?;
    let receipts = receipts::table
        .filter(receipts::purchase_id.eq(purchase.get_id()))
        .select(Receipt::as_select())
        .order(receipts::created_at.asc())
        .load(conn)?;
    Ok(PurchaseDetails { purchase, transaction, receipts })
}

/// Creates a reimbursement request
///
/// In one database transaction this stores a pending expense transaction
/// for the amount, the purchase itself, and attaches the listed receipts.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `dto` - The purchase fields and the ids of receipts to attach
///
/// ### Returns
///
/// The purchase with its transaction and receipts
///
/// ### Errors
///
/// Returns an error if:
/// - A required field is blank or the amount is not positive
/// - A receipt does not exist (404) or is already attached elsewhere (409)
#[instrument(skip(pool, dto), fields(purchaser = %dto.purchaser_name, amount_cents = dto.amount_cents))]
pub async fn create_purchase(pool: &DbPool, dto: CreatePurchaseDto) -> Result<PurchaseDetails> {
    debug!("Creating reimbursement request");

    require_text("Purchaser name", &dto.purchaser_name)?;
    require_text("Bank account", &dto.bank_account)?;
    require_text("Description", &dto.description)?;
    if dto.amount_cents <= 0 {
        return Err(DomainError::Invalid("Amount must be positive".to_string()).into());
    }

    let transaction = Transaction::new(
        TransactionKind::Expense,
        dto.amount_cents,
        dto.description.clone(),
        dto.date,
        TransactionStatus::Pending,
    )
    .with_category(dto.category);
    let purchase = Purchase::new(
        &transaction.get_id(),
        dto.purchaser_name,
        dto.bank_account,
        dto.description,
        dto.amount_cents,
    )
    .with_minutes(dto.minutes_ref, dto.notes);

    let mut seen = HashSet::new();
    let receipt_ids: Vec<String> = dto.receipt_ids.into_iter().filter(|id| seen.insert(id.clone())).collect();

    let mut conn = pool.get()?;
    let details = conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        diesel::insert_into(transactions::table).values(&transaction).execute(conn)?;
        diesel::insert_into(purchases::table).values(&purchase).execute(conn)?;

        for receipt_id in &receipt_ids {
            let attached_to = receipts::table
                .find(receipt_id)
                .select(receipts::purchase_id)
                .first::<Option<String>>(conn)
                .optional()?
                .ok_or(DomainError::NotFound("Receipt"))?;
            if attached_to.is_some() {
                return Err(DomainError::Conflict(format!(
                    "Receipt {} is already attached to a reimbursement request",
                    receipt_id
                ))
                .into());
            }
            diesel::update(receipts::table.find(receipt_id))
                .set(receipts::purchase_id.eq(purchase.get_id()))
                .execute(conn)?;
        }

        Ok(load_details(conn, purchase.clone())?)
    })?;

    info!("Successfully created purchase with id: {}", details.purchase.get_id());

    Ok(details)
}

/// Retrieves a purchase with its transaction and receipts
#[instrument(skip(pool), fields(purchase_id = %purchase_id))]
pub fn get_purchase(pool: &DbPool, purchase_id: &str) -> Result<Option<PurchaseDetails>> {
    debug!("Retrieving purchase by id");

    let mut conn = pool.get()?;
    let purchase = purchases::table
        .find(purchase_id)
        .select(Purchase::as_select())
        .first(&mut conn)
        .optional()?;

    match purchase {
        Some(purchase) => Ok(Some(load_details(&mut conn, purchase)?)),
        None => Ok(None),
    }
}

/// Lists purchases, newest first, optionally filtered by status
#[instrument(skip(pool))]
pub fn list_purchases(pool: &DbPool, status: Option<PurchaseStatus>) -> Result<Vec<Purchase>> {
    let mut conn = pool.get()?;
    let mut query = purchases::table
        .select(Purchase::as_select())
        .order(purchases::created_at.desc())
        .into_boxed();
    if let Some(status) = status {
        query = query.filter(purchases::status.eq(status));
    }

    let result = query.load(&mut conn)?;

    info!("Retrieved {} purchases", result.len());

    Ok(result)
}

/// Updates the descriptive fields of a purchase
#[instrument(skip(pool, dto), fields(purchase_id = %purchase_id))]
pub async fn update_purchase(pool: &DbPool, purchase_id: &str, dto: UpdatePurchaseDto) -> Result<Purchase> {
    debug!("Updating purchase");

    for (field, value) in [
        ("Purchaser name", &dto.purchaser_name),
        ("Bank account", &dto.bank_account),
        ("Description", &dto.description),
    ] {
        if let Some(value) = value {
            require_text(field, value)?;
        }
    }

    // Get a connection from the pool
    let mut conn = pool.get()?;

    // A submitted request keeps the minutes reference it was approved with
    if matches!(dto.minutes_ref, Some(None)) {
        let status = find_purchase(&mut conn, purchase_id)?.get_status();
        if matches!(status, PurchaseStatus::Requested | PurchaseStatus::Reimbursed) {
            return Err(DomainError::Invalid(format!(
                "The minutes reference of a {} purchase cannot be cleared",
                status
            ))
            .into());
        }
    }

    let changes = PurchaseChanges {
        purchaser_name: dto.purchaser_name,
        bank_account: dto.bank_account,
        description: dto.description,
        minutes_ref: dto.minutes_ref,
        notes: dto.notes,
        status: None,
        updated_at: Some(Utc::now().naive_utc()),
    };

    // Update the purchase in the database
    let updated = diesel::update(purchases::table.find(purchase_id))
        .set(&changes)
        .execute_with_retry(&mut conn).await?;
    if updated == 0 {
        return Err(DomainError::NotFound("Purchase").into());
    }

    let purchase = find_purchase(&mut conn, purchase_id)?;

    info!("Successfully updated purchase");

    Ok(purchase)
}

/// Moves a purchase to a new status
///
/// Requesting reimbursement needs at least one receipt and a reference to
/// the meeting minutes that approved the purchase. Marking it reimbursed
/// completes its transaction.
///
/// ### Errors
///
/// Returns a validation error for transitions the lifecycle does not allow
/// and when the requirements of the target status are not met.
#[instrument(skip(pool), fields(purchase_id = %purchase_id, status = %status))]
pub async fn set_purchase_status(pool: &DbPool, purchase_id: &str, status: PurchaseStatus) -> Result<PurchaseDetails> {
    debug!("Changing purchase status");

    let mut conn = pool.get()?;
    let details = conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let purchase = find_purchase(conn, purchase_id)?;
        let current = purchase.get_status();
        if !current.can_transition_to(status) {
            return Err(DomainError::Invalid(format!(
                "Cannot move a purchase from {} to {}",
                current, status
            ))
            .into());
        }

        match status {
            PurchaseStatus::Requested => {
                let receipt_count: i64 = receipts::table
                    .filter(receipts::purchase_id.eq(purchase_id))
                    .count()
                    .get_result(conn)?;
                if receipt_count == 0 {
                    return Err(DomainError::Invalid("A reimbursement request needs at least one receipt".to_string()).into());
                }
                if purchase.get_minutes_ref().is_none_or(|minutes| minutes.trim().is_empty()) {
                    return Err(DomainError::Invalid("A reimbursement request needs a minutes reference".to_string()).into());
                }
            }
            PurchaseStatus::Reimbursed => {
                diesel::update(transactions::table.find(purchase.get_transaction_id()))
                    .set((
                        transactions::status.eq(TransactionStatus::Complete),
                        transactions::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .execute(conn)?;
            }
            PurchaseStatus::Pending | PurchaseStatus::Rejected => {}
        }

        let changes = PurchaseChanges {
            status: Some(status),
            updated_at: Some(Utc::now().naive_utc()),
            ..Default::default()
        };
        diesel::update(purchases::table.find(purchase_id)).set(&changes).execute(conn)?;

        let purchase = find_purchase(conn, purchase_id)?;
        Ok(load_details(conn, purchase)?)
    })?;

    info!("Purchase is now {}", status);

    Ok(details)
}

/// Deletes a pending or rejected purchase together with its transaction
///
/// Its receipts are kept and become unattached.
#[instrument(skip(pool), fields(purchase_id = %purchase_id))]
pub async fn delete_purchase(pool: &DbPool, purchase_id: &str) -> Result<()> {
    debug!("Deleting purchase");

    let mut conn = pool.get()?;
    conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let purchase = find_purchase(conn, purchase_id)?;
        if !purchase.get_status().is_deletable() {
            return Err(DomainError::Conflict(format!(
                "A {} purchase cannot be deleted",
                purchase.get_status()
            ))
            .into());
        }

        diesel::update(receipts::table.filter(receipts::purchase_id.eq(purchase_id)))
            .set(receipts::purchase_id.eq(None::<String>))
            .execute(conn)?;
        diesel::delete(purchases::table.find(purchase_id)).execute(conn)?;
        diesel::delete(transactions::table.find(purchase.get_transaction_id())).execute(conn)?;
        Ok(())
    })?;

    info!("Successfully deleted purchase");

    Ok(())
}
