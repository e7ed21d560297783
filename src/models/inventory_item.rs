use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::text_enum::text_enum;

text_enum! {
    /// Whether an inventory item is still held
    pub enum ItemStatus {
        Active => "active",
        /// Disposed of or lost; kept for treasury history
        Removed => "removed",
    }
}

/// A stocked object tracked by the committee
///
/// This struct maps directly to the `inventory_items` table. The quantity
/// split between linked, manual and unknown units is derived by
/// [`crate::ledger`]; only the manual count is stored here.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::inventory_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InventoryItem {
    /// Unique identifier for the item (UUID v4 as string)
    id: String,

    /// Display name
    name: String,

    /// Quantity on hand
    quantity: i32,

    /// Units explicitly marked as having no transaction
    manual_count: i32,

    /// Where the item is kept
    location: String,

    category: Option<String>,

    description: Option<String>,

    /// Value of a single unit in cents
    unit_value_cents: Option<i64>,

    status: ItemStatus,

    /// When this item was created
    created_at: NaiveDateTime,

    /// When this item was last updated
    updated_at: NaiveDateTime,
}

impl InventoryItem {
    /// Creates a new active item with no manual count
    ///
    /// ### Arguments
    ///
    /// * `name` - The item's name
    /// * `quantity` - Quantity on hand
    /// * `location` - Where the item is kept
    ///
    /// ### Returns
    ///
    /// A new `InventoryItem` with a fresh UUID and current timestamps
    pub fn new(name: String, quantity: i32, location: String) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            quantity,
            manual_count: 0,
            location,
            category: None,
            description: None,
            unit_value_cents: None,
            status: ItemStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the optional descriptive fields in one go
    pub fn with_details(
        mut self,
        category: Option<String>,
        description: Option<String>,
        unit_value_cents: Option<i64>,
    ) -> Self {
        self.category = category;
        self.description = description;
        self.unit_value_cents = unit_value_cents;
        self
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_name(&self) -> String {
        self.name.clone()
    }

    pub fn get_quantity(&self) -> i32 {
        self.quantity
    }

    pub fn get_manual_count(&self) -> i32 {
        self.manual_count
    }

    pub fn set_manual_count(&mut self, manual_count: i32) {
        self.manual_count = manual_count;
    }

    pub fn get_location(&self) -> String {
        self.location.clone()
    }

    pub fn get_category(&self) -> Option<String> {
        self.category.clone()
    }

    pub fn get_description(&self) -> Option<String> {
        self.description.clone()
    }

    pub fn get_unit_value_cents(&self) -> Option<i64> {
        self.unit_value_cents
    }

    /// Total value of the stock on hand, when a unit value is known
    pub fn total_value_cents(&self) -> Option<i64> {
        self.unit_value_cents.map(|v| v * i64::from(self.quantity))
    }

    pub fn get_status(&self) -> ItemStatus {
        self.status
    }

    /// Gets the item's creation timestamp as a DateTime<Utc>
    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    /// Gets the item's last update timestamp as a DateTime<Utc>
    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }
}
