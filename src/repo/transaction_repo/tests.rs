use super::*;
use crate::errors::ApiError;

fn tx_dto(kind: TransactionKind, amount_cents: i64, category: Option<&str>, date: (i32, u32, u32)) -> CreateTransactionDto {
    CreateTransactionDto {
        kind,
        amount_cents,
        description: "Committee expense".to_string(),
        category: category.map(str::to_string),
        date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        status: None,
    }
}

#[tokio::test]
async fn test_create_transaction_derives_year() {
    let pool = crate::test_utils::setup_test_db();

    let tx = create_transaction(&pool, tx_dto(TransactionKind::Income, 2500, None, (2025, 12, 31)))
        .await
        .unwrap();

    assert_eq!(tx.get_year(), 2025);
    assert_eq!(tx.get_status(), TransactionStatus::Complete);

    let stored = get_transaction(&pool, &tx.get_id()).unwrap().unwrap();
    assert_eq!(stored.get_id(), tx.get_id());
    assert_eq!(stored.get_amount_cents(), 2500);
}

#[tokio::test]
async fn test_create_rejects_non_positive_amount() {
    let pool = crate::test_utils::setup_test_db();

    for amount in [0, -100] {
        let err = create_transaction(&pool, tx_dto(TransactionKind::Expense, amount, None, (2026, 1, 1)))
            .await
            .unwrap_err();
        assert!(matches!(ApiError::from(err), ApiError::Validation(_)));
    }
}

#[tokio::test]
async fn test_list_transactions_filters() {
    let pool = crate::test_utils::setup_test_db();

    create_transaction(&pool, tx_dto(TransactionKind::Income, 1000, Some("Fees"), (2025, 3, 1))).await.unwrap();
    create_transaction(&pool, tx_dto(TransactionKind::Expense, 400, Some("Party"), (2026, 2, 1))).await.unwrap();
    let mut pending = tx_dto(TransactionKind::Expense, 900, Some("Party"), (2026, 4, 1));
    pending.status = Some(TransactionStatus::Pending);
    create_transaction(&pool, pending).await.unwrap();

    let all = list_transactions(&pool, &TransactionQueryDto::default()).unwrap();
    assert_eq!(all.len(), 3);
    // Newest first
    assert_eq!(all[0].get_date(), NaiveDate::from_ymd_opt(2026, 4, 1).unwrap());

    let query = TransactionQueryDto { year: Some(2026), ..Default::default() };
    assert_eq!(list_transactions(&pool, &query).unwrap().len(), 2);

    let query = TransactionQueryDto { kind: Some(TransactionKind::Income), ..Default::default() };
    assert_eq!(list_transactions(&pool, &query).unwrap().len(), 1);

    let query = TransactionQueryDto { status: Some(TransactionStatus::Pending), ..Default::default() };
    assert_eq!(list_transactions(&pool, &query).unwrap().len(), 1);

    let query = TransactionQueryDto { category: Some("Party".to_string()), ..Default::default() };
    assert_eq!(list_transactions(&pool, &query).unwrap().len(), 2);
}

#[tokio::test]
async fn test_update_transaction_moves_year() {
    let pool = crate::test_utils::setup_test_db();
    let tx = create_transaction(&pool, tx_dto(TransactionKind::Expense, 700, None, (2025, 6, 1))).await.unwrap();

    let dto = UpdateTransactionDto {
        date: NaiveDate::from_ymd_opt(2026, 1, 15),
        amount_cents: Some(750),
        ..Default::default()
    };
    let updated = update_transaction(&pool, &tx.get_id(), dto).await.unwrap();

    assert_eq!(updated.get_year(), 2026);
    assert_eq!(updated.get_amount_cents(), 750);
    assert_eq!(updated.get_kind(), TransactionKind::Expense);
}

#[tokio::test]
async fn test_update_transaction_clears_category() {
    let pool = crate::test_utils::setup_test_db();
    let tx = create_transaction(&pool, tx_dto(TransactionKind::Expense, 700, Some("Party"), (2026, 6, 1))).await.unwrap();

    let dto = UpdateTransactionDto { description: Some("Balloons".to_string()), ..Default::default() };
    let kept = update_transaction(&pool, &tx.get_id(), dto).await.unwrap();
    assert_eq!(kept.get_category().as_deref(), Some("Party"));

    let dto = UpdateTransactionDto { category: Some(None), ..Default::default() };
    let cleared = update_transaction(&pool, &tx.get_id(), dto).await.unwrap();
    assert_eq!(cleared.get_category(), None);
    assert_eq!(cleared.get_description(), "Balloons");
}

#[tokio::test]
async fn test_update_missing_transaction() {
    let pool = crate::test_utils::setup_test_db();
    let err = update_transaction(&pool, "missing", UpdateTransactionDto::default()).await.unwrap_err();
    assert!(matches!(ApiError::from(err), ApiError::NotFound("Transaction")));
}

#[tokio::test]
async fn test_delete_transaction() {
    let pool = crate::test_utils::setup_test_db();
    let tx = create_transaction(&pool, tx_dto(TransactionKind::Income, 100, None, (2026, 1, 1))).await.unwrap();

    delete_transaction(&pool, &tx.get_id()).await.unwrap();
    assert!(get_transaction(&pool, &tx.get_id()).unwrap().is_none());

    let err = delete_transaction(&pool, &tx.get_id()).await.unwrap_err();
    assert!(matches!(ApiError::from(err), ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_treasury_summary() {
    let pool = crate::test_utils::setup_test_db();

    create_transaction(&pool, tx_dto(TransactionKind::Income, 10_000, Some("Fees"), (2026, 1, 10))).await.unwrap();
    create_transaction(&pool, tx_dto(TransactionKind::Expense, 2_500, Some("Party"), (2026, 2, 10))).await.unwrap();
    create_transaction(&pool, tx_dto(TransactionKind::Income, 500, Some("Party"), (2026, 2, 11))).await.unwrap();
    create_transaction(&pool, tx_dto(TransactionKind::Expense, 300, None, (2026, 3, 1))).await.unwrap();
    // Other years are ignored
    create_transaction(&pool, tx_dto(TransactionKind::Income, 99_999, Some("Fees"), (2025, 1, 1))).await.unwrap();

    let summary = get_treasury_summary(&pool, 2026).unwrap();

    assert_eq!(summary.income_cents, 10_500);
    assert_eq!(summary.expense_cents, 2_800);
    assert_eq!(summary.balance_cents, 7_700);

    let names: Vec<Option<&str>> = summary.categories.iter().map(|c| c.category.as_deref()).collect();
    assert_eq!(names, vec![None, Some("Fees"), Some("Party")]);

    let party = &summary.categories[2];
    assert_eq!(party.income_cents, 500);
    assert_eq!(party.expense_cents, 2_500);
    assert_eq!(party.balance_cents, -2_000);
}

#[tokio::test]
async fn test_summary_beyond_range_is_rejected() {
    let pool = crate::test_utils::setup_test_db();
    create_transaction(&pool, tx_dto(TransactionKind::Income, i64::MAX, None, (2025, 5, 1))).await.unwrap();
    create_transaction(&pool, tx_dto(TransactionKind::Income, 1, None, (2025, 5, 2))).await.unwrap();

    let err = get_treasury_summary(&pool, 2025).unwrap_err();

    assert!(matches!(ApiError::from(err), ApiError::Validation(_)));
}

#[tokio::test]
async fn test_empty_summary() {
    let pool = crate::test_utils::setup_test_db();
    let summary = get_treasury_summary(&pool, 1999).unwrap();
    assert_eq!(summary.balance_cents, 0);
    assert!(summary.categories.is_empty());
}

#[tokio::test]
async fn test_list_transaction_years() {
    let pool = crate::test_utils::setup_test_db();

    for year in [2024, 2026, 2025, 2026] {
        create_transaction(&pool, tx_dto(TransactionKind::Income, 1, None, (year, 5, 5))).await.unwrap();
    }

    assert_eq!(list_transaction_years(&pool).unwrap(), vec![2026, 2025, 2024]);
}
