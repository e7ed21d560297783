use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::Query;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::db::DbPool;
use crate::dto::{
    CreateInventoryItemDto, InventoryItemView, InventoryQueryDto, ItemLedger, LinkQuantityDto,
    LinkedItem, LinkedTransaction, ManualCountDto, UpdateInventoryItemDto,
};
use crate::errors::ApiError;
use crate::models::InventoryItem;
use crate::repo;

/// Handler for creating a new inventory item
///
/// This function handles POST requests to `/inventory`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `payload` - The item fields, optionally linking the whole quantity to a
///   transaction or marking it manual
///
/// ### Returns
///
/// The newly created item as JSON
#[instrument(skip(pool, payload), fields(name = %payload.name, quantity = payload.quantity))]
pub async fn create_inventory_item_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Extract and deserialize the JSON request body
    Json(payload): Json<CreateInventoryItemDto>,
) -> Result<Json<InventoryItem>, ApiError> {
    info!("Creating new inventory item");

    let item = repo::create_inventory_item(&pool, payload).await?;

    info!("Successfully created inventory item with id: {}", item.get_id());

    Ok(Json(item))
}

/// Handler for retrieving an inventory item with its quantity breakdown
///
/// This function handles GET requests to `/inventory/{id}`.
#[instrument(skip(pool), fields(item_id = %item_id))]
pub async fn get_inventory_item_handler(
    State(pool): State<Arc<DbPool>>,
    // Extract the item ID from the URL path
    Path(item_id): Path<String>,
) -> Result<Json<InventoryItemView>, ApiError> {
    debug!("Getting inventory item");

    let view = repo::get_inventory_item_view(&pool, &item_id)?;

    Ok(Json(view))
}

/// Handler for listing inventory items
///
/// This function handles GET requests to `/inventory`. The `category`
/// parameter may be repeated.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `query` - Filters for category, location, removed and unknown items
///
/// ### Returns
///
/// The matching items with their breakdowns as JSON
#[instrument(skip(pool))]
pub async fn list_inventory_items_handler(
    State(pool): State<Arc<DbPool>>,
    // Extract the query parameters from the URL
    Query(query): Query<InventoryQueryDto>,
) -> Result<Json<Vec<InventoryItemView>>, ApiError> {
    debug!("Listing inventory items with filters: {:?}", query);

    let items = repo::list_inventory_items(&pool, &query)?;

    info!("Retrieved {} inventory items", items.len());

    Ok(Json(items))
}

/// Handler for updating an inventory item
///
/// This function handles PUT requests to `/inventory/{id}`.
#[instrument(skip(pool, payload), fields(item_id = %item_id))]
pub async fn update_inventory_item_handler(
    State(pool): State<Arc<DbPool>>,
    Path(item_id): Path<String>,
    Json(payload): Json<UpdateInventoryItemDto>,
) -> Result<Json<InventoryItem>, ApiError> {
    info!("Updating inventory item");

    let item = repo::update_inventory_item(&pool, &item_id, payload).await?;

    Ok(Json(item))
}

/// Handler for deleting an inventory item
///
/// This function handles DELETE requests to `/inventory/{id}`.
#[instrument(skip(pool), fields(item_id = %item_id))]
pub async fn delete_inventory_item_handler(
    State(pool): State<Arc<DbPool>>,
    Path(item_id): Path<String>,
) -> Result<Json<()>, ApiError> {
    info!("Deleting inventory item");

    repo::delete_inventory_item(&pool, &item_id).await?;

    info!("Successfully deleted inventory item with id: {}", item_id);

    Ok(Json(()))
}

/// Handler for the ledger of an item
///
/// This function handles GET requests to `/inventory/{id}/ledger`.
#[instrument(skip(pool), fields(item_id = %item_id))]
pub async fn get_item_ledger_handler(
    State(pool): State<Arc<DbPool>>,
    Path(item_id): Path<String>,
) -> Result<Json<ItemLedger>, ApiError> {
    let ledger = repo::get_item_ledger(&pool, &item_id)?;
    Ok(Json(ledger))
}

/// Handler for listing the transactions linked to an item
///
/// This function handles GET requests to `/inventory/{id}/transactions`.
#[instrument(skip(pool), fields(item_id = %item_id))]
pub async fn list_item_transactions_handler(
    State(pool): State<Arc<DbPool>>,
    Path(item_id): Path<String>,
) -> Result<Json<Vec<LinkedTransaction>>, ApiError> {
    let transactions = repo::list_item_transactions(&pool, &item_id)?;
    Ok(Json(transactions))
}

/// Handler for linking part of an item's quantity to a transaction
///
/// This function handles PUT requests to
/// `/inventory/{id}/transactions/{transaction_id}`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `item_id` - The ID of the item, extracted from the URL path
/// * `transaction_id` - The ID of the transaction, extracted from the URL path
/// * `payload` - The number of units to link
///
/// ### Returns
///
/// The item with its updated breakdown as JSON
#[instrument(skip(pool, payload), fields(item_id = %item_id, transaction_id = %transaction_id))]
pub async fn link_transaction_handler(
    State(pool): State<Arc<DbPool>>,
    Path((item_id, transaction_id)): Path<(String, String)>,
    Json(payload): Json<LinkQuantityDto>,
) -> Result<Json<InventoryItemView>, ApiError> {
    info!("Linking {} units", payload.quantity);

    let view = repo::link_transaction(&pool, &item_id, &transaction_id, payload.quantity).await?;

    Ok(Json(view))
}

/// Handler for removing the link between an item and a transaction
///
/// This function handles DELETE requests to
/// `/inventory/{id}/transactions/{transaction_id}`.
#[instrument(skip(pool), fields(item_id = %item_id, transaction_id = %transaction_id))]
pub async fn unlink_transaction_handler(
    State(pool): State<Arc<DbPool>>,
    Path((item_id, transaction_id)): Path<(String, String)>,
) -> Result<Json<InventoryItemView>, ApiError> {
    info!("Unlinking transaction");

    let view = repo::unlink_transaction(&pool, &item_id, &transaction_id).await?;

    Ok(Json(view))
}

/// Handler for setting an item's manual count
///
/// This function handles PUT requests to `/inventory/{id}/manual`.
#[instrument(skip(pool, payload), fields(item_id = %item_id, manual_count = payload.manual_count))]
pub async fn set_manual_count_handler(
    State(pool): State<Arc<DbPool>>,
    Path(item_id): Path<String>,
    Json(payload): Json<ManualCountDto>,
) -> Result<Json<InventoryItemView>, ApiError> {
    let view = repo::set_manual_count(&pool, &item_id, payload.manual_count).await?;
    Ok(Json(view))
}

/// Handler for marking every unknown unit of an item as manual
///
/// This function handles POST requests to `/inventory/{id}/manual/absorb`.
#[instrument(skip(pool), fields(item_id = %item_id))]
pub async fn absorb_unknown_handler(
    State(pool): State<Arc<DbPool>>,
    Path(item_id): Path<String>,
) -> Result<Json<InventoryItemView>, ApiError> {
    let view = repo::absorb_unknown(&pool, &item_id).await?;
    Ok(Json(view))
}

/// Handler for listing the items linked to a transaction
///
/// This function handles GET requests to `/transactions/{id}/inventory`.
#[instrument(skip(pool), fields(transaction_id = %transaction_id))]
pub async fn list_transaction_items_handler(
    State(pool): State<Arc<DbPool>>,
    Path(transaction_id): Path<String>,
) -> Result<Json<Vec<LinkedItem>>, ApiError> {
    let items = repo::list_transaction_items(&pool, &transaction_id)?;
    Ok(Json(items))
}

/// Handler for the categories in use
///
/// This function handles GET requests to `/inventory/categories`.
#[instrument(skip(pool))]
pub async fn list_inventory_categories_handler(
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(repo::list_inventory_categories(&pool)?))
}

/// Handler for the storage locations in use
///
/// This function handles GET requests to `/inventory/locations`.
#[instrument(skip(pool))]
pub async fn list_inventory_locations_handler(
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(repo::list_inventory_locations(&pool)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    fn create_dto(name: &str, quantity: i32) -> CreateInventoryItemDto {
        CreateInventoryItemDto {
            name: name.to_string(),
            quantity,
            location: "Shed".to_string(),
            category: None,
            description: None,
            unit_value_cents: Some(250),
            transaction_id: None,
            mark_manual: false,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_inventory_item_handler() {
        let pool = setup_test_db();

        let created = create_inventory_item_handler(State(pool.clone()), Json(create_dto("Rake", 2)))
            .await
            .unwrap();
        assert_eq!(created.0.total_value_cents(), Some(500));

        let fetched = get_inventory_item_handler(State(pool.clone()), Path(created.0.get_id()))
            .await
            .unwrap();
        assert_eq!(fetched.0.item.get_name(), "Rake");
        assert_eq!(fetched.0.ledger.unknown, 2);
    }

    #[tokio::test]
    async fn test_get_missing_inventory_item_handler() {
        let pool = setup_test_db();

        let result = get_inventory_item_handler(State(pool.clone()), Path("nonexistent".to_string())).await;

        assert!(matches!(result, Err(ApiError::NotFound("Inventory item"))));
    }

    #[tokio::test]
    async fn test_list_inventory_items_handler() {
        let pool = setup_test_db();
        create_inventory_item_handler(State(pool.clone()), Json(create_dto("Rake", 2))).await.unwrap();
        create_inventory_item_handler(State(pool.clone()), Json(create_dto("Shovel", 1))).await.unwrap();

        let result = list_inventory_items_handler(State(pool.clone()), Query(InventoryQueryDto::default()))
            .await
            .unwrap();

        assert_eq!(result.0.len(), 2);
    }

    #[tokio::test]
    async fn test_absorb_unknown_handler() {
        let pool = setup_test_db();
        let created = create_inventory_item_handler(State(pool.clone()), Json(create_dto("Rake", 4)))
            .await
            .unwrap();

        let view = absorb_unknown_handler(State(pool.clone()), Path(created.0.get_id())).await.unwrap();

        assert_eq!(view.0.ledger.manual, 4);
        assert!(view.0.ledger.is_fully_accounted());
    }
}
