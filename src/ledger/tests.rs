use super::*;

#[test]
fn test_reconcile_splits_buckets() {
    let breakdown = reconcile(10, &[3, 2], 1);

    assert_eq!(breakdown.total, 10);
    assert_eq!(breakdown.linked, 5);
    assert_eq!(breakdown.manual, 1);
    assert_eq!(breakdown.unknown, 4);
    assert_eq!(breakdown.accounted(), 6);
    assert!(!breakdown.is_fully_accounted());
}

#[test]
fn test_reconcile_without_links() {
    let breakdown = reconcile(4, &[], 0);
    assert_eq!(breakdown.linked, 0);
    assert_eq!(breakdown.unknown, 4);
}

#[test]
fn test_reconcile_clamps_overaccounted_rows() {
    // Rows written before the checks existed can claim more than the total
    let breakdown = reconcile(2, &[3], 1);
    assert_eq!(breakdown.unknown, 0);
    assert!(breakdown.is_fully_accounted());
}

#[test]
fn test_check_link_within_unknown() {
    let breakdown = reconcile(10, &[4], 2);
    assert!(check_link(&breakdown, 0, 4).is_ok());
    assert_eq!(
        check_link(&breakdown, 0, 5),
        Err(LedgerError::ExceedsUnaccounted { requested: 5, available: 4 })
    );
}

#[test]
fn test_check_link_relink_counts_existing_pair() {
    // 4 units already linked to this very transaction can be re-linked
    let breakdown = reconcile(10, &[4], 2);
    assert!(check_link(&breakdown, 4, 8).is_ok());
    assert!(check_link(&breakdown, 4, 9).is_err());
}

#[test]
fn test_check_link_rejects_non_positive() {
    let breakdown = reconcile(10, &[], 0);
    assert_eq!(check_link(&breakdown, 0, 0), Err(LedgerError::NonPositiveLink(0)));
    assert_eq!(check_link(&breakdown, 0, -3), Err(LedgerError::NonPositiveLink(-3)));
}

#[test]
fn test_check_manual_bounds() {
    let breakdown = reconcile(10, &[6], 1);
    assert!(check_manual(&breakdown, 0).is_ok());
    assert!(check_manual(&breakdown, 4).is_ok());
    assert!(check_manual(&breakdown, 5).is_err());
    assert_eq!(check_manual(&breakdown, -1), Err(LedgerError::NegativeQuantity(-1)));
}

#[test]
fn test_check_total_cannot_drop_below_accounted() {
    let breakdown = reconcile(10, &[3], 2);
    assert!(check_total(&breakdown, 5).is_ok());
    assert!(check_total(&breakdown, 50).is_ok());
    assert_eq!(
        check_total(&breakdown, 4),
        Err(LedgerError::BelowAccounted { requested: 4, accounted: 5 })
    );
    assert_eq!(check_total(&breakdown, -1), Err(LedgerError::NegativeQuantity(-1)));
}

#[test]
fn test_absorb_unknown() {
    let breakdown = reconcile(10, &[3], 2);
    let manual = absorb_unknown(&breakdown);
    assert_eq!(manual, 7);

    let after = reconcile(10, &[3], manual);
    assert!(after.is_fully_accounted());
}
