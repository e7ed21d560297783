//! Inventory quantity ledger
//!
//! An inventory item's quantity is split into three buckets:
//!
//! - **linked**: units tied to specific treasury transactions
//! - **manual**: units explicitly marked as having no transaction
//!   (donations, legacy stock)
//! - **unknown**: whatever remains, i.e. units nobody has accounted for
//!
//! Every function here is pure. The repository layer loads the stored
//! numbers, asks the ledger whether a change is allowed, and writes the
//! result.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a quantity change would break the ledger
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Quantity cannot be negative, got {0}")]
    NegativeQuantity(i32),
    #[error("Linked quantity must be positive, got {0}")]
    NonPositiveLink(i32),
    #[error("Requested {requested} units but only {available} are unaccounted for")]
    ExceedsUnaccounted { requested: i32, available: i32 },
    #[error("Quantity {requested} is below the {accounted} units already accounted for")]
    BelowAccounted { requested: i32, accounted: i32 },
}

/// The reconciled view of one inventory item's quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityBreakdown {
    /// Total quantity on hand
    pub total: i32,
    /// Units linked to transactions
    pub linked: i32,
    /// Units marked as having no transaction
    pub manual: i32,
    /// Units neither linked nor marked
    pub unknown: i32,
}

impl QuantityBreakdown {
    /// Units that are linked or manually marked
    pub fn accounted(&self) -> i32 {
        self.linked + self.manual
    }

    /// True when every unit is either linked or manually marked
    pub fn is_fully_accounted(&self) -> bool {
        self.unknown == 0
    }
}

/// Reconciles an item's total against its linked and manual quantities
///
/// ### Arguments
///
/// * `total` - The item's quantity on hand
/// * `linked_quantities` - Quantities of every transaction link of the item
/// * `manual` - The item's manual ("no transaction") count
///
/// ### Returns
///
/// The breakdown; `unknown` is clamped at zero for rows stored before the
/// ledger checks were enforced
pub fn reconcile(total: i32, linked_quantities: &[i32], manual: i32) -> QuantityBreakdown {
    let linked: i32 = linked_quantities.iter().sum();
    QuantityBreakdown {
        total,
        linked,
        manual,
        unknown: (total - linked - manual).max(0),
    }
}

/// Checks that `requested` units may be linked to a transaction
///
/// `existing_for_pair` is the quantity already linked between the same item
/// and transaction; re-linking replaces it, so those units count as
/// available again.
pub fn check_link(breakdown: &QuantityBreakdown, existing_for_pair: i32, requested: i32) -> Result<(), LedgerError> {
    if requested <= 0 {
        return Err(LedgerError::NonPositiveLink(requested));
    }
    let available = breakdown.unknown + existing_for_pair;
    if requested > available {
        return Err(LedgerError::ExceedsUnaccounted { requested, available });
    }
    Ok(())
}

/// Checks that the manual count may be set to `requested`
pub fn check_manual(breakdown: &QuantityBreakdown, requested: i32) -> Result<(), LedgerError> {
    if requested < 0 {
        return Err(LedgerError::NegativeQuantity(requested));
    }
    let available = breakdown.total - breakdown.linked;
    if requested > available {
        return Err(LedgerError::ExceedsUnaccounted { requested, available: available.max(0) });
    }
    Ok(())
}

/// Checks that the item's total quantity may be changed to `requested`
pub fn check_total(breakdown: &QuantityBreakdown, requested: i32) -> Result<(), LedgerError> {
    if requested < 0 {
        return Err(LedgerError::NegativeQuantity(requested));
    }
    if requested < breakdown.accounted() {
        return Err(LedgerError::BelowAccounted { requested, accounted: breakdown.accounted() });
    }
    Ok(())
}

/// The manual count after marking every unknown unit as "no transaction"
pub fn absorb_unknown(breakdown: &QuantityBreakdown) -> i32 {
    breakdown.manual + breakdown.unknown
}

#[cfg(test)]
mod tests;
