use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::ledger::QuantityBreakdown;
use crate::models::{
    InventoryItem, ItemStatus, MailDirection, PollOption, PollStatus, Poll, Purchase,
    PurchaseStatus, Receipt, Role, Transaction, TransactionKind, TransactionStatus,
};

/// Reads a nullable field so that an explicit `null` becomes `Some(None)`
/// while an absent field stays `None`
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ── Inventory ────────────────────────────────────────────────────────

/// Data transfer object for creating a new inventory item
///
/// `transaction_id` links the whole quantity to an existing transaction;
/// `mark_manual` marks the whole quantity as having no transaction. At most
/// one of the two may be given.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateInventoryItemDto {
    pub name: String,
    pub quantity: i32,
    pub location: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub unit_value_cents: Option<i64>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub mark_manual: bool,
}

/// Data transfer object for updating an inventory item
///
/// Only the fields that are present are changed; `null` clears a nullable
/// field.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct UpdateInventoryItemDto {
    pub name: Option<String>,
    pub quantity: Option<i32>,
    pub location: Option<String>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub category: Option<Option<String>>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub unit_value_cents: Option<Option<i64>>,
    pub status: Option<ItemStatus>,
}

/// Filters for listing inventory items
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct InventoryQueryDto {
    /// Only items in one of these categories
    pub category: Vec<String>,
    pub location: Option<String>,
    /// Include items marked as removed
    pub include_removed: bool,
    /// Only items with unaccounted units
    pub unknown_only: bool,
}

/// Body for linking a quantity of an item to a transaction
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct LinkQuantityDto {
    pub quantity: i32,
}

/// Body for setting an item's manual ("no transaction") count
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct ManualCountDto {
    pub manual_count: i32,
}

/// An inventory item together with its reconciled quantities
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct InventoryItemView {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub ledger: QuantityBreakdown,
}

/// A transaction linked to an item, with the linked quantity
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LinkedTransaction {
    pub transaction: Transaction,
    pub quantity: i32,
}

/// An item linked to a transaction, with the linked quantity
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LinkedItem {
    pub item: InventoryItem,
    pub quantity: i32,
}

/// Full ledger of one inventory item
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ItemLedger {
    pub item: InventoryItem,
    pub ledger: QuantityBreakdown,
    pub transactions: Vec<LinkedTransaction>,
}

// ── Treasury ─────────────────────────────────────────────────────────

/// Data transfer object for creating a treasury transaction
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateTransactionDto {
    pub kind: TransactionKind,
    pub amount_cents: i64,
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    pub date: NaiveDate,
    /// Defaults to complete for directly entered transactions
    #[serde(default)]
    pub status: Option<TransactionStatus>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct UpdateTransactionDto {
    pub kind: Option<TransactionKind>,
    pub amount_cents: Option<i64>,
    pub description: Option<String>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub category: Option<Option<String>>,
    pub date: Option<NaiveDate>,
    pub status: Option<TransactionStatus>,
}

/// Filters for listing transactions
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct TransactionQueryDto {
    pub year: Option<i32>,
    pub kind: Option<TransactionKind>,
    pub status: Option<TransactionStatus>,
    pub category: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct SummaryQueryDto {
    pub year: i32,
}

/// Income and expense totals for one category
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    /// `None` groups uncategorised transactions
    pub category: Option<String>,
    pub income_cents: i64,
    pub expense_cents: i64,
    pub balance_cents: i64,
}

/// Yearly treasury totals
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TreasurySummary {
    pub year: i32,
    pub income_cents: i64,
    pub expense_cents: i64,
    pub balance_cents: i64,
    pub categories: Vec<CategorySummary>,
}

// ── Reimbursements ───────────────────────────────────────────────────

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateReceiptDto {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy)]
#[serde(default)]
pub struct ReceiptQueryDto {
    /// Only receipts not attached to any purchase
    pub unattached: bool,
}

/// Data transfer object for creating a reimbursement request
///
/// Creates the underlying pending expense transaction as well.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreatePurchaseDto {
    pub purchaser_name: String,
    pub bank_account: String,
    pub description: String,
    pub amount_cents: i64,
    pub date: NaiveDate,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub minutes_ref: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub receipt_ids: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct UpdatePurchaseDto {
    pub purchaser_name: Option<String>,
    pub bank_account: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub minutes_ref: Option<Option<String>>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct UpdatePurchaseStatusDto {
    pub status: PurchaseStatus,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy)]
#[serde(default)]
pub struct PurchaseQueryDto {
    pub status: Option<PurchaseStatus>,
}

/// A purchase with its transaction and receipts
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PurchaseDetails {
    #[serde(flatten)]
    pub purchase: Purchase,
    pub transaction: Transaction,
    pub receipts: Vec<Receipt>,
}

// ── Mail ─────────────────────────────────────────────────────────────

/// A message handed over by the mail fetcher
///
/// Header values may be given with or without angle brackets;
/// `references` is the raw `References` header.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct IngestMessageDto {
    pub message_id: String,
    #[serde(default)]
    pub in_reply_to: Option<String>,
    #[serde(default)]
    pub references: Option<String>,
    pub from: String,
    #[serde(default)]
    pub to: Vec<String>,
    #[serde(default)]
    pub cc: Vec<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body_text: String,
    #[serde(default)]
    pub body_html: Option<String>,
    pub sent_at: DateTime<Utc>,
    /// Defaults to inbound
    #[serde(default)]
    pub direction: Option<MailDirection>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct MarkReadDto {
    pub is_read: bool,
}

/// One row of the thread list
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ThreadSummary {
    pub thread_id: String,
    /// Subject of the earliest message in the thread
    pub subject: String,
    pub message_count: usize,
    pub unread_count: usize,
    pub last_message_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct CreateDraftDto {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    /// Ignored when replying and left empty; the reply subject is used
    pub subject: String,
    pub body_text: String,
    /// Row id of the stored message being answered
    pub reply_to_message_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct UpdateDraftDto {
    pub to: Option<Vec<String>>,
    pub cc: Option<Vec<String>>,
    pub subject: Option<String>,
    pub body_text: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SendDraftDto {
    /// Committee mailbox the message is sent from
    pub from: String,
}

// ── FAQ ──────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateFaqDto {
    pub question: String,
    pub answer: String,
    /// Defaults to the end of the list
    #[serde(default)]
    pub sort_order: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct UpdateFaqDto {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub sort_order: Option<i32>,
}

// ── Users ────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateUserDto {
    pub name: String,
    pub email: String,
    pub role: Role,
}

// ── Polls ────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreatePollDto {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub allow_multiple: bool,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    /// Option labels in display order
    pub options: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy)]
#[serde(default)]
pub struct PollQueryDto {
    pub status: Option<PollStatus>,
}

/// A ballot: the options the voter selects
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VoteDto {
    pub option_ids: Vec<String>,
}

/// A poll with its options in display order
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PollDetails {
    #[serde(flatten)]
    pub poll: Poll,
    pub options: Vec<PollOption>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OptionResult {
    pub option_id: String,
    pub label: String,
    pub votes: i64,
}

/// Vote counts of a poll
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PollResults {
    pub poll_id: String,
    pub total_voters: i64,
    pub options: Vec<OptionResult>,
}
