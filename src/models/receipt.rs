use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata of an uploaded receipt
///
/// The file itself lives in external storage; `url` points at it.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::receipts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Receipt {
    id: String,
    name: String,
    url: String,
    description: Option<String>,
    /// The purchase this receipt is attached to, if any
    purchase_id: Option<String>,
    created_at: NaiveDateTime,
}

impl Receipt {
    pub fn new(name: String, url: String, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            url,
            description,
            purchase_id: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_name(&self) -> String {
        self.name.clone()
    }

    pub fn get_url(&self) -> String {
        self.url.clone()
    }

    pub fn get_purchase_id(&self) -> Option<String> {
        self.purchase_id.clone()
    }
}
