use crate::db::{DbPool, ExecuteWithRetry};
use crate::dto::{
    CreateInventoryItemDto, InventoryItemView, InventoryQueryDto, ItemLedger, LinkedItem,
    LinkedTransaction, UpdateInventoryItemDto,
};
use crate::errors::DomainError;
use crate::ledger::{self, LedgerError, QuantityBreakdown};
use crate::models::{InventoryItem, InventoryLink, ItemStatus, Transaction};
use crate::schema::{inventory_item_transactions, inventory_items, transactions};
use anyhow::Result;
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

use super::require_text;

/// Partial update of an inventory row; `None` fields are left untouched
#[derive(AsChangeset, Debug)]
#[diesel(table_name = inventory_items)]
struct ItemChanges {
    name: Option<String>,
    quantity: Option<i32>,
    manual_count: Option<i32>,
    location: Option<String>,
    category: Option<Option<String>>,
    description: Option<Option<String>>,
    unit_value_cents: Option<Option<i64>>,
    status: Option<ItemStatus>,
    updated_at: NaiveDateTime,
}

impl ItemChanges {
    fn touch() -> Self {
        Self {
            name: None,
            quantity: None,
            manual_count: None,
            location: None,
            category: None,
            description: None,
            unit_value_cents: None,
            status: None,
            updated_at: Utc::now().naive_utc(),
        }
    }
}

fn find_item(conn: &mut SqliteConnection, item_id: &str) -> Result<InventoryItem> {
    let item = inventory_items::table
        .find(item_id)
        .select(InventoryItem::as_select())
        .first(conn)
        .optional()?
        .ok_or(DomainError::NotFound("Inventory item"))?;
    Ok(item)
}

fn ensure_transaction_exists(conn: &mut SqliteConnection, transaction_id: &str) -> Result<()> {
    let found = transactions::table
        .find(transaction_id)
        .select(transactions::id)
        .first::<String>(conn)
        .optional()?;
    if found.is_none() {
        return Err(DomainError::NotFound("Transaction").into());
    }
    Ok(())
}

/// Loads the link quantities of an item and reconciles them with its total
fn load_breakdown(conn: &mut SqliteConnection, item: &InventoryItem) -> QueryResult<QuantityBreakdown> {
    let linked = inventory_item_transactions::table
        .filter(inventory_item_transactions::inventory_item_id.eq(item.get_id()))
        .select(inventory_item_transactions::quantity)
        .load::<i32>(conn)?;
    Ok(ledger::reconcile(item.get_quantity(), &linked, item.get_manual_count()))
}

fn load_view(conn: &mut SqliteConnection, item_id: &str) -> Result<InventoryItemView> {
    let item = find_item(conn, item_id)?;
    let ledger = load_breakdown(conn, &item)?;
    Ok(InventoryItemView { item, ledger })
}

fn validate_details(name: Option<&str>, location: Option<&str>, unit_value_cents: Option<i64>) -> Result<(), DomainError> {
    if let Some(name) = name {
        require_text("Name", name)?;
    }
    if let Some(location) = location {
        require_text("Location", location)?;
    }
    if unit_value_cents.is_some_and(|value| value < 0) {
        return Err(DomainError::Invalid("Unit value cannot be negative".to_string()));
    }
    Ok(())
}

/// Creates a new inventory item
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `dto` - The item fields; `transaction_id` links the whole quantity to
///   that transaction, `mark_manual` marks the whole quantity as manual
///
/// ### Returns
///
/// A Result containing the newly created item
///
/// ### Errors
///
/// Returns an error if:
/// - A required field is blank, or the quantity or unit value is negative
/// - Both `transaction_id` and `mark_manual` are given
/// - The referenced transaction does not exist
/// - The database insert fails
#[instrument(skip(pool, dto), fields(name = %dto.name, quantity = dto.quantity))]
pub async fn create_inventory_item(pool: &DbPool, dto: CreateInventoryItemDto) -> Result<InventoryItem> {
    debug!("Creating new inventory item");

    validate_details(Some(&dto.name), Some(&dto.location), dto.unit_value_cents)?;
    if dto.quantity < 0 {
        return Err(LedgerError::NegativeQuantity(dto.quantity).into());
    }
    if dto.transaction_id.is_some() && dto.mark_manual {
        return Err(DomainError::Invalid(
            "An item cannot be linked to a transaction and marked manual at once".to_string(),
        )
        .into());
    }

    let mut item = InventoryItem::new(dto.name, dto.quantity, dto.location)
        .with_details(dto.category, dto.description, dto.unit_value_cents);
    if dto.mark_manual {
        item.set_manual_count(dto.quantity);
    }

    let mut conn = pool.get()?;

    match dto.transaction_id {
        Some(transaction_id) => {
            let fresh = ledger::reconcile(item.get_quantity(), &[], 0);
            ledger::check_link(&fresh, 0, item.get_quantity())?;
            let link = InventoryLink::new(&item.get_id(), &transaction_id, item.get_quantity());

            conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
                ensure_transaction_exists(conn, &transaction_id)?;
                diesel::insert_into(inventory_items::table).values(&item).execute(conn)?;
                diesel::insert_into(inventory_item_transactions::table).values(&link).execute(conn)?;
                Ok(())
            })?;
        }
        None => {
            diesel::insert_into(inventory_items::table)
                .values(&item)
                .execute_with_retry(&mut conn).await?;
        }
    }

    info!("Successfully created inventory item with id: {}", item.get_id());

    Ok(item)
}

/// Retrieves an inventory item by its ID
///
/// ### Returns
///
/// A Result containing an Option with the item if found, or None if not found
#[instrument(skip(pool), fields(item_id = %item_id))]
pub fn get_inventory_item(pool: &DbPool, item_id: &str) -> Result<Option<InventoryItem>> {
    debug!("Retrieving inventory item by id");

    let mut conn = pool.get()?;
    let item = inventory_items::table
        .find(item_id)
        .select(InventoryItem::as_select())
        .first(&mut conn)
        .optional()?;

    Ok(item)
}

/// Retrieves an inventory item together with its reconciled quantities
#[instrument(skip(pool), fields(item_id = %item_id))]
pub fn get_inventory_item_view(pool: &DbPool, item_id: &str) -> Result<InventoryItemView> {
    let mut conn = pool.get()?;
    load_view(&mut conn, item_id)
}

/// Lists inventory items matching the query, with their reconciled quantities
///
/// Removed items are skipped unless `include_removed` is set. Results are
/// ordered by name.
#[instrument(skip(pool))]
pub fn list_inventory_items(pool: &DbPool, query: &InventoryQueryDto) -> Result<Vec<InventoryItemView>> {
    debug!("Listing inventory items");

    let mut conn = pool.get()?;

    let mut items_query = inventory_items::table
        .select(InventoryItem::as_select())
        .order((inventory_items::name.asc(), inventory_items::created_at.asc()))
        .into_boxed();

    if !query.category.is_empty() {
        items_query = items_query.filter(inventory_items::category.eq_any(&query.category));
    }
    if let Some(location) = &query.location {
        items_query = items_query.filter(inventory_items::location.eq(location));
    }
    if !query.include_removed {
        items_query = items_query.filter(inventory_items::status.eq(ItemStatus::Active));
    }

    let items = items_query.load(&mut conn)?;
    let ids: Vec<String> = items.iter().map(InventoryItem::get_id).collect();

    let mut links: HashMap<String, Vec<i32>> = HashMap::new();
    for (item_id, quantity) in inventory_item_transactions::table
        .filter(inventory_item_transactions::inventory_item_id.eq_any(&ids))
        .select((inventory_item_transactions::inventory_item_id, inventory_item_transactions::quantity))
        .load::<(String, i32)>(&mut conn)?
    {
        links.entry(item_id).or_default().push(quantity);
    }

    let views: Vec<InventoryItemView> = items
        .into_iter()
        .map(|item| {
            let linked = links.get(&item.get_id()).map(Vec::as_slice).unwrap_or(&[]);
            let ledger = ledger::reconcile(item.get_quantity(), linked, item.get_manual_count());
            InventoryItemView { item, ledger }
        })
        .filter(|view| !query.unknown_only || view.ledger.unknown > 0)
        .collect();

    info!("Retrieved {} inventory items", views.len());

    Ok(views)
}

/// Updates the fields of an inventory item
///
/// A new quantity must still cover every linked and manual unit.
///
/// ### Errors
///
/// Returns an error if:
/// - The item does not exist
/// - A given text field is blank or the unit value is negative
/// - The new quantity is below the accounted units
#[instrument(skip(pool, dto), fields(item_id = %item_id))]
pub async fn update_inventory_item(pool: &DbPool, item_id: &str, dto: UpdateInventoryItemDto) -> Result<InventoryItem> {
    debug!("Updating inventory item");

    validate_details(dto.name.as_deref(), dto.location.as_deref(), dto.unit_value_cents.flatten())?;

    let mut conn = pool.get()?;
    let item = conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let item = find_item(conn, item_id)?;
        if let Some(quantity) = dto.quantity {
            let breakdown = load_breakdown(conn, &item)?;
            ledger::check_total(&breakdown, quantity)?;
        }

        let changes = ItemChanges {
            name: dto.name,
            quantity: dto.quantity,
            location: dto.location,
            category: dto.category,
            description: dto.description,
            unit_value_cents: dto.unit_value_cents,
            status: dto.status,
            ..ItemChanges::touch()
        };
        diesel::update(inventory_items::table.find(item_id))
            .set(&changes)
            .execute(conn)?;

        find_item(conn, item_id)
    })?;

    info!("Successfully updated inventory item");

    Ok(item)
}

/// Deletes an inventory item and its transaction links
#[instrument(skip(pool), fields(item_id = %item_id))]
pub async fn delete_inventory_item(pool: &DbPool, item_id: &str) -> Result<()> {
    debug!("Deleting inventory item");

    // Get a connection from the pool
    let mut conn = pool.get()?;

    // Delete the item; its links go with it
    let deleted = diesel::delete(inventory_items::table.find(item_id))
        .execute_with_retry(&mut conn).await?;

    if deleted == 0 {
        return Err(DomainError::NotFound("Inventory item").into());
    }

    info!("Successfully deleted inventory item");

    Ok(())
}

/// Returns an item's ledger: its breakdown and every linked transaction
#[instrument(skip(pool), fields(item_id = %item_id))]
pub fn get_item_ledger(pool: &DbPool, item_id: &str) -> Result<ItemLedger> {
    let mut conn = pool.get()?;
    let InventoryItemView { item, ledger } = load_view(&mut conn, item_id)?;
    let transactions = load_linked_transactions(&mut conn, item_id)?;
    Ok(ItemLedger { item, ledger, transactions })
}

fn load_linked_transactions(conn: &mut SqliteConnection, item_id: &str) -> QueryResult<Vec<LinkedTransaction>> {
    let rows = inventory_item_transactions::table
        .inner_join(transactions::table)
        .filter(inventory_item_transactions::inventory_item_id.eq(item_id))
        .select((Transaction::as_select(), inventory_item_transactions::quantity))
        .order((transactions::date.asc(), transactions::created_at.asc()))
        .load::<(Transaction, i32)>(conn)?;

    Ok(rows
        .into_iter()
        .map(|(transaction, quantity)| LinkedTransaction { transaction, quantity })
        .collect())
}

/// Lists the transactions linked to an item
#[instrument(skip(pool), fields(item_id = %item_id))]
pub fn list_item_transactions(pool: &DbPool, item_id: &str) -> Result<Vec<LinkedTransaction>> {
    let mut conn = pool.get()?;
    find_item(&mut conn, item_id)?;
    Ok(load_linked_transactions(&mut conn, item_id)?)
}

/// Lists the inventory items linked to a transaction
#[instrument(skip(pool), fields(transaction_id = %transaction_id))]
pub fn list_transaction_items(pool: &DbPool, transaction_id: &str) -> Result<Vec<LinkedItem>> {
    let mut conn = pool.get()?;
    ensure_transaction_exists(&mut conn, transaction_id)?;

    let rows = inventory_item_transactions::table
        .inner_join(inventory_items::table)
        .filter(inventory_item_transactions::transaction_id.eq(transaction_id))
        .select((InventoryItem::as_select(), inventory_item_transactions::quantity))
        .order(inventory_items::name.asc())
        .load::<(InventoryItem, i32)>(&mut conn)?;

    Ok(rows.into_iter().map(|(item, quantity)| LinkedItem { item, quantity }).collect())
}

/// Links `quantity` units of an item to a transaction
///
/// Linking a pair that is already linked replaces its quantity. The units
/// must come out of the item's unknown bucket.
///
/// ### Returns
///
/// The item with its updated breakdown
#[instrument(skip(pool), fields(item_id = %item_id, transaction_id = %transaction_id, quantity = quantity))]
pub async fn link_transaction(pool: &DbPool, item_id: &str, transaction_id: &str, quantity: i32) -> Result<InventoryItemView> {
    debug!("Linking inventory item to transaction");

    let mut conn = pool.get()?;
    let view = conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let item = find_item(conn, item_id)?;
        ensure_transaction_exists(conn, transaction_id)?;

        let existing = inventory_item_transactions::table
            .find((item_id, transaction_id))
            .select(inventory_item_transactions::quantity)
            .first::<i32>(conn)
            .optional()?
            .unwrap_or(0);
        let breakdown = load_breakdown(conn, &item)?;
        ledger::check_link(&breakdown, existing, quantity)?;

        let link = InventoryLink::new(item_id, transaction_id, quantity);
        diesel::insert_into(inventory_item_transactions::table)
            .values(&link)
            .on_conflict((
                inventory_item_transactions::inventory_item_id,
                inventory_item_transactions::transaction_id,
            ))
            .do_update()
            .set(inventory_item_transactions::quantity.eq(quantity))
            .execute(conn)?;
        diesel::update(inventory_items::table.find(item_id))
            .set(&ItemChanges::touch())
            .execute(conn)?;

        load_view(conn, item_id)
    })?;

    info!("Linked {} units, {} left unknown", quantity, view.ledger.unknown);

    Ok(view)
}

/// Removes the link between an item and a transaction
#[instrument(skip(pool), fields(item_id = %item_id, transaction_id = %transaction_id))]
pub async fn unlink_transaction(pool: &DbPool, item_id: &str, transaction_id: &str) -> Result<InventoryItemView> {
    debug!("Unlinking inventory item from transaction");

    let mut conn = pool.get()?;
    let view = conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        find_item(conn, item_id)?;
        let deleted = diesel::delete(inventory_item_transactions::table.find((item_id, transaction_id)))
            .execute(conn)?;
        if deleted == 0 {
            return Err(DomainError::NotFound("Inventory link").into());
        }
        diesel::update(inventory_items::table.find(item_id))
            .set(&ItemChanges::touch())
            .execute(conn)?;
        load_view(conn, item_id)
    })?;

    info!("Successfully unlinked inventory item");

    Ok(view)
}

/// Sets how many units of an item have no transaction
#[instrument(skip(pool), fields(item_id = %item_id, manual_count = manual_count))]
pub async fn set_manual_count(pool: &DbPool, item_id: &str, manual_count: i32) -> Result<InventoryItemView> {
    debug!("Setting manual count");

    let mut conn = pool.get()?;
    let view = conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let item = find_item(conn, item_id)?;
        let breakdown = load_breakdown(conn, &item)?;
        ledger::check_manual(&breakdown, manual_count)?;
        write_manual_count(conn, item_id, manual_count)?;
        load_view(conn, item_id)
    })?;

    Ok(view)
}

/// Marks every unknown unit of an item as having no transaction
#[instrument(skip(pool), fields(item_id = %item_id))]
pub async fn absorb_unknown(pool: &DbPool, item_id: &str) -> Result<InventoryItemView> {
    debug!("Marking unknown units as manual");

    let mut conn = pool.get()?;
    let view = conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let item = find_item(conn, item_id)?;
        let breakdown = load_breakdown(conn, &item)?;
        write_manual_count(conn, item_id, ledger::absorb_unknown(&breakdown))?;
        load_view(conn, item_id)
    })?;

    info!("Item now has {} manual units", view.ledger.manual);

    Ok(view)
}

fn write_manual_count(conn: &mut SqliteConnection, item_id: &str, manual_count: i32) -> QueryResult<usize> {
    let changes = ItemChanges {
        manual_count: Some(manual_count),
        ..ItemChanges::touch()
    };
    diesel::update(inventory_items::table.find(item_id))
        .set(&changes)
        .execute(conn)
}

/// Lists the distinct categories in use, sorted
#[instrument(skip(pool))]
pub fn list_inventory_categories(pool: &DbPool) -> Result<Vec<String>> {
    let mut conn = pool.get()?;
    let categories = inventory_items::table
        .filter(inventory_items::category.is_not_null())
        .select(inventory_items::category)
        .distinct()
        .order(inventory_items::category.asc())
        .load::<Option<String>>(&mut conn)?;

    Ok(categories.into_iter().flatten().collect())
}

/// Lists the distinct storage locations in use, sorted
#[instrument(skip(pool))]
pub fn list_inventory_locations(pool: &DbPool) -> Result<Vec<String>> {
    let mut conn = pool.get()?;
    let locations = inventory_items::table
        .select(inventory_items::location)
        .distinct()
        .order(inventory_items::location.asc())
        .load::<String>(&mut conn)?;

    Ok(locations)
}
