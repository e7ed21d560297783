/// Repository module
///
/// This module provides the data access layer for the application.
/// Each submodule owns the tables of one area of the portal. Functions
/// return `anyhow::Result`; broken domain rules are reported as
/// [`crate::errors::DomainError`] or [`crate::ledger::LedgerError`] inside
/// the error so the HTTP layer can pick a status code.
///
/// Single-row writes go through [`crate::db::ExecuteWithRetry`]; writes
/// spanning several rows run inside one immediate SQLite transaction.

mod inventory_repo;
mod transaction_repo;
mod purchase_repo;
mod mail_repo;
mod faq_repo;
mod user_repo;
mod poll_repo;

// Re-export all repository functions
pub use inventory_repo::*;
pub use transaction_repo::*;
pub use purchase_repo::*;
pub use mail_repo::*;
pub use faq_repo::*;
pub use user_repo::*;
pub use poll_repo::*;

use crate::errors::DomainError;

/// Rejects empty or whitespace-only text fields
pub(crate) fn require_text(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Invalid(format!("{} must not be empty", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests;
