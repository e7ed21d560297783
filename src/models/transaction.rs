use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::text_enum::text_enum;

text_enum! {
    /// Direction of money in a treasury transaction
    pub enum TransactionKind {
        Income => "income",
        Expense => "expense",
    }
}

text_enum! {
    /// Settlement state of a transaction
    pub enum TransactionStatus {
        /// Recorded but not yet paid out or received
        Pending => "pending",
        Complete => "complete",
    }
}

/// A treasury ledger entry
///
/// Amounts are always positive; `kind` gives the direction. `year` is
/// derived from `date` and kept as its own column for yearly reports.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Transaction {
    /// Unique identifier for the transaction (UUID v4 as string)
    id: String,

    kind: TransactionKind,

    /// Amount in cents, always positive
    amount_cents: i64,

    description: String,

    category: Option<String>,

    /// Booking date
    date: NaiveDate,

    /// Year of `date`
    year: i32,

    status: TransactionStatus,

    created_at: NaiveDateTime,

    updated_at: NaiveDateTime,
}

impl Transaction {
    /// Creates a new transaction dated `date`
    ///
    /// ### Arguments
    ///
    /// * `kind` - Income or expense
    /// * `amount_cents` - Positive amount in cents
    /// * `description` - What the money was for
    /// * `date` - Booking date; also determines the transaction's year
    ///
    /// ### Returns
    ///
    /// A new `Transaction` with no category and the given status
    pub fn new(
        kind: TransactionKind,
        amount_cents: i64,
        description: String,
        date: NaiveDate,
        status: TransactionStatus,
    ) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            amount_cents,
            description,
            category: None,
            date,
            year: date.year(),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn get_amount_cents(&self) -> i64 {
        self.amount_cents
    }

    /// The amount with its sign: positive for income, negative for expenses
    pub fn signed_amount_cents(&self) -> i64 {
        match self.kind {
            TransactionKind::Income => self.amount_cents,
            TransactionKind::Expense => -self.amount_cents,
        }
    }

    pub fn get_description(&self) -> String {
        self.description.clone()
    }

    pub fn get_category(&self) -> Option<String> {
        self.category.clone()
    }

    pub fn get_date(&self) -> NaiveDate {
        self.date
    }

    pub fn get_year(&self) -> i32 {
        self.year
    }

    pub fn get_status(&self) -> TransactionStatus {
        self.status
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_new_derives_year() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        let tx = Transaction::new(
            TransactionKind::Expense,
            4599,
            "Cleaning supplies".to_string(),
            date,
            TransactionStatus::Pending,
        );

        assert_eq!(tx.get_year(), 2025);
        assert_eq!(tx.get_date(), date);
        assert_eq!(tx.get_category(), None);
        assert!(Uuid::parse_str(&tx.get_id()).is_ok());
    }

    #[test]
    fn test_signed_amount() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let income = Transaction::new(TransactionKind::Income, 100, "Fee".to_string(), date, TransactionStatus::Complete);
        let expense = Transaction::new(TransactionKind::Expense, 100, "Soap".to_string(), date, TransactionStatus::Complete);

        assert_eq!(income.signed_amount_cents(), 100);
        assert_eq!(expense.signed_amount_cents(), -100);
    }
}
