use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::text_enum::text_enum;

text_enum! {
    /// Lifecycle of a reimbursement request
    pub enum PurchaseStatus {
        /// Created, still being completed by the purchaser
        Pending => "pending",
        /// Submitted to the treasurer for payment
        Requested => "requested",
        /// Paid back to the purchaser
        Reimbursed => "reimbursed",
        Rejected => "rejected",
    }
}

impl PurchaseStatus {
    /// Whether a purchase in this status may move to `next`
    ///
    /// `pending → requested → reimbursed`, `pending|requested → rejected`
    /// and `rejected → pending` are the only moves.
    pub fn can_transition_to(&self, next: PurchaseStatus) -> bool {
        use PurchaseStatus::*;
        matches!(
            (self, next),
            (Pending, Requested)
                | (Requested, Reimbursed)
                | (Pending, Rejected)
                | (Requested, Rejected)
                | (Rejected, Pending)
        )
    }

    /// Whether a purchase in this status may still be deleted
    pub fn is_deletable(&self) -> bool {
        matches!(self, PurchaseStatus::Pending | PurchaseStatus::Rejected)
    }
}

/// An expense reimbursement request
///
/// Each purchase owns exactly one expense transaction. Receipts point back
/// at the purchase through `receipts.purchase_id`.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::purchases)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Purchase {
    id: String,
    transaction_id: String,
    purchaser_name: String,
    /// Account the reimbursement is paid to
    bank_account: String,
    description: String,
    amount_cents: i64,
    /// Reference to the meeting minutes approving the purchase
    minutes_ref: Option<String>,
    notes: Option<String>,
    status: PurchaseStatus,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl Purchase {
    pub fn new(
        transaction_id: &str,
        purchaser_name: String,
        bank_account: String,
        description: String,
        amount_cents: i64,
    ) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            transaction_id: transaction_id.to_string(),
            purchaser_name,
            bank_account,
            description,
            amount_cents,
            minutes_ref: None,
            notes: None,
            status: PurchaseStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_minutes(mut self, minutes_ref: Option<String>, notes: Option<String>) -> Self {
        self.minutes_ref = minutes_ref;
        self.notes = notes;
        self
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_transaction_id(&self) -> String {
        self.transaction_id.clone()
    }

    pub fn get_purchaser_name(&self) -> String {
        self.purchaser_name.clone()
    }

    pub fn get_bank_account(&self) -> String {
        self.bank_account.clone()
    }

    pub fn get_description(&self) -> String {
        self.description.clone()
    }

    pub fn get_amount_cents(&self) -> i64 {
        self.amount_cents
    }

    pub fn get_minutes_ref(&self) -> Option<String> {
        self.minutes_ref.clone()
    }

    pub fn get_notes(&self) -> Option<String> {
        self.notes.clone()
    }

    pub fn get_status(&self) -> PurchaseStatus {
        self.status
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}
