use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Quantity of an inventory item tied to one treasury transaction
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::inventory_item_transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InventoryLink {
    inventory_item_id: String,
    transaction_id: String,
    quantity: i32,
    created_at: NaiveDateTime,
}

impl InventoryLink {
    pub fn new(inventory_item_id: &str, transaction_id: &str, quantity: i32) -> Self {
        Self {
            inventory_item_id: inventory_item_id.to_string(),
            transaction_id: transaction_id.to_string(),
            quantity,
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_inventory_item_id(&self) -> String {
        self.inventory_item_id.clone()
    }

    pub fn get_transaction_id(&self) -> String {
        self.transaction_id.clone()
    }

    pub fn get_quantity(&self) -> i32 {
        self.quantity
    }
}
