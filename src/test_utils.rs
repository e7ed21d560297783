use crate::*;
use proptest::prelude::*;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::RunQueryDsl;
use std::sync::Arc;
use tower::ServiceExt;

/// Sets up a test database with migrations applied
///
/// This function:
/// 1. Creates a uniquely named shared in-memory SQLite database
/// 2. Runs all migrations to set up the schema
///
/// ### Returns
///
/// An Arc-wrapped database connection pool connected to the in-memory database
pub fn setup_test_db() -> Arc<db::DbPool> {
    // Plain ":memory:" gives each pooled connection its own database, so a
    // shared-cache URI keeps every connection of this pool on the same one
    let database_url = format!("file:test_{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
    let pool = db::init_pool(&database_url).expect("Failed to create pool");

    let mut conn = pool.get().expect("Failed to get connection");
    run_migrations(&mut conn).expect("Failed to run migrations");
    drop(conn);

    Arc::new(pool)
}

/// Creates a transaction directly through the repository
pub async fn create_test_transaction(pool: &db::DbPool, kind: models::TransactionKind, amount_cents: i64) -> models::Transaction {
    let dto = dto::CreateTransactionDto {
        kind,
        amount_cents,
        description: "Test transaction".to_string(),
        category: None,
        date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
        status: None,
    };
    repo::create_transaction(pool, dto).await.unwrap()
}

/// Creates an inventory item with no links and no manual count
pub async fn create_test_item(pool: &db::DbPool, name: &str, quantity: i32) -> models::InventoryItem {
    let dto = dto::CreateInventoryItemDto {
        name: name.to_string(),
        quantity,
        location: "Storage room".to_string(),
        category: None,
        description: None,
        unit_value_cents: None,
        transaction_id: None,
        mark_manual: false,
    };
    repo::create_inventory_item(pool, dto).await.unwrap()
}

/// Creates a user with the given role
pub async fn create_test_user(pool: &db::DbPool, role: models::Role) -> models::User {
    let dto = dto::CreateUserDto {
        name: format!("{} user", role),
        email: format!("{}@example.org", uuid::Uuid::new_v4()),
        role,
    };
    repo::create_user(pool, dto).await.unwrap()
}

#[derive(diesel::QueryableByName, Debug)]
struct TableName {
    #[diesel(sql_type = diesel::sql_types::Text)]
    name: String,
}

/// Tests the setup_test_db function
///
/// This test verifies that:
/// 1. The test database can be created and connected to
/// 2. Every table of the schema exists and can be queried
/// 3. An app built on the pool answers requests
#[tokio::test]
async fn test_setup_test_db() {
    let pool = setup_test_db();
    let mut conn = pool.get().unwrap();

    let table_names: Vec<TableName> = diesel::sql_query("SELECT name FROM sqlite_master WHERE type='table'")
        .load(&mut conn)
        .expect("Failed to load table names");

    let expected_tables = vec![
        "users", "transactions", "inventory_items", "inventory_item_transactions",
        "purchases", "receipts", "mail_messages", "mail_drafts", "faqs",
        "polls", "poll_options", "poll_votes",
        "__diesel_schema_migrations",
    ];

    for table in expected_tables {
        assert!(table_names.iter().any(|t| t.name == table), "Table '{}' not found in database", table);

        let query = format!("SELECT COUNT(*) FROM {}", table);
        let result = diesel::sql_query(&query).execute(&mut conn);
        assert!(result.is_ok(), "Failed to query table '{}': {:?}", table, result.err());
    }

    drop(conn);

    let app = create_app(pool.clone());
    let request = Request::builder()
        .uri("/inventory")
        .method("GET")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// Generates an arbitrary DateTime<Utc> within 2020-01-01 to 2030-01-01
pub fn arb_datetime_utc() -> impl Strategy<Value = DateTime<Utc>> {
    (1_577_836_800i64..1_893_456_000i64)
        .prop_map(|ts| DateTime::from_timestamp(ts, 0).unwrap())
}

/// Generates strings with whitespace, unicode and quoting characters mixed in
pub fn arb_messy_string() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9_./:-]{0,40}",
        "\\PC{0,40}",
        "[ \t\"'\\\\]{0,5}[a-z]{1,10}[ \t\"'\\\\]{0,5}",
    ]
}

/// Generates a positive amount of money in cents
pub fn arb_amount_cents() -> impl Strategy<Value = i64> {
    1i64..10_000_000
}
