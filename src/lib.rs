/// Committee Portal: back office for a residents' committee
///
/// This library provides the inventory, treasury, reimbursement, mailbox,
/// FAQ and poll features of the portal, including data models, database
/// access, and a web API.
///
/// ### Modules
///
/// - `db`: Database connection management
/// - `models`: Data structures stored in the database
/// - `repo`: Repository layer for database operations
/// - `ledger`: Quantity accounting of inventory items
/// - `threading`: Mail header parsing and thread resolution
/// - `handlers`: HTTP handlers
/// - `backup`: Periodic database backups
///
/// ### Web API
///
/// The library exposes a RESTful API using Axum. The main groups are:
///
/// - `/inventory`: Items, their quantity breakdown and transaction links
/// - `/transactions`: Treasury bookkeeping and yearly summaries
/// - `/receipts`, `/purchases`: Reimbursement requests
/// - `/mail`: Stored messages, threads and drafts
/// - `/faqs`: Frequently asked questions
/// - `/users`: Members and their permissions
/// - `/polls`: Polls and voting

/// Database backups
pub mod backup;

/// Configuration loading
pub mod config;

/// Database connection module
pub mod db;

/// Request and response bodies
pub mod dto;

/// Error types shared by the repository and HTTP layers
pub mod errors;

/// HTTP handlers
pub mod handlers;

/// Inventory quantity accounting
pub mod ledger;

/// Data models module
pub mod models;

/// Repository module for database operations
pub mod repo;

/// Database schema module
pub mod schema;

/// Mail threading
pub mod threading;

#[cfg(test)]
mod test_utils;

use axum::{
    extract::FromRef,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use handlers::*;

/// Mail domain used when none is configured
pub const DEFAULT_MAIL_DOMAIN: &str = "localhost";

/// State shared by all handlers
///
/// Most handlers only need the pool and extract `State<Arc<DbPool>>`
/// through the `FromRef` implementation below.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<db::DbPool>,
    /// Domain used in the Message-IDs of sent mail
    pub mail_domain: String,
}

impl FromRef<AppState> for Arc<db::DbPool> {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

/// Creates the application router with the default mail domain
///
/// ### Arguments
///
/// * `pool` - The database connection pool to be shared with all handlers
///
/// ### Returns
///
/// An Axum Router configured with all routes
pub fn create_app(pool: Arc<db::DbPool>) -> Router {
    create_app_with_state(AppState {
        pool,
        mail_domain: DEFAULT_MAIL_DOMAIN.to_string(),
    })
}

/// Creates the application router with all routes
///
/// This function sets up the Axum router with all the API endpoints.
///
/// ### Arguments
///
/// * `state` - The pool and settings shared with all handlers
///
/// ### Returns
///
/// An Axum Router configured with all routes and the state attached
pub fn create_app_with_state(state: AppState) -> Router {
    Router::new()
        // Routes for creating and listing inventory items
        .route("/inventory", post(create_inventory_item_handler).get(list_inventory_items_handler))
        // Routes for the distinct categories and locations in use
        .route("/inventory/categories", get(list_inventory_categories_handler))
        .route("/inventory/locations", get(list_inventory_locations_handler))
        // Routes for a specific inventory item
        .route(
            "/inventory/{id}",
            get(get_inventory_item_handler)
                .put(update_inventory_item_handler)
                .delete(delete_inventory_item_handler),
        )
        .route("/inventory/{id}/ledger", get(get_item_ledger_handler))
        .route("/inventory/{id}/transactions", get(list_item_transactions_handler))
        // Route for linking and unlinking a transaction
        .route(
            "/inventory/{id}/transactions/{transaction_id}",
            put(link_transaction_handler).delete(unlink_transaction_handler),
        )
        // Routes for the manual count
        .route("/inventory/{id}/manual", put(set_manual_count_handler))
        .route("/inventory/{id}/manual/absorb", post(absorb_unknown_handler))
        // Routes for treasury transactions
        .route("/transactions", post(create_transaction_handler).get(list_transactions_handler))
        .route("/transactions/summary", get(get_treasury_summary_handler))
        .route("/transactions/years", get(list_transaction_years_handler))
        .route(
            "/transactions/{id}",
            get(get_transaction_handler)
                .put(update_transaction_handler)
                .delete(delete_transaction_handler),
        )
        .route("/transactions/{id}/inventory", get(list_transaction_items_handler))
        // Routes for receipts and reimbursement requests
        .route("/receipts", post(create_receipt_handler).get(list_receipts_handler))
        .route("/receipts/{id}", axum::routing::delete(delete_receipt_handler))
        .route("/purchases", post(create_purchase_handler).get(list_purchases_handler))
        .route(
            "/purchases/{id}",
            get(get_purchase_handler)
                .put(update_purchase_handler)
                .delete(delete_purchase_handler),
        )
        .route("/purchases/{id}/status", put(set_purchase_status_handler))
        // Routes for the mailbox
        .route("/mail/messages", post(ingest_message_handler))
        .route("/mail/messages/{id}", get(get_message_handler))
        .route("/mail/messages/{id}/read", put(set_message_read_handler))
        .route("/mail/threads", get(list_threads_handler))
        .route("/mail/threads/{thread_id}", get(get_thread_handler))
        .route("/mail/drafts", post(create_draft_handler).get(list_drafts_handler))
        .route(
            "/mail/drafts/{id}",
            get(get_draft_handler)
                .put(update_draft_handler)
                .delete(delete_draft_handler),
        )
        .route("/mail/drafts/{id}/send", post(send_draft_handler))
        // Routes for the FAQ
        .route("/faqs", post(create_faq_handler).get(list_faqs_handler))
        .route(
            "/faqs/{id}",
            get(get_faq_handler).put(update_faq_handler).delete(delete_faq_handler),
        )
        // Routes for users
        .route("/users", post(create_user_handler).get(list_users_handler))
        .route("/users/{id}", get(get_user_handler))
        .route("/users/{id}/permissions", get(get_user_permissions_handler))
        // Routes for polls
        .route("/polls", post(create_poll_handler).get(list_polls_handler))
        .route("/polls/{id}", get(get_poll_handler).delete(delete_poll_handler))
        .route("/polls/{id}/open", post(open_poll_handler))
        .route("/polls/{id}/close", post(close_poll_handler))
        .route("/polls/{id}/votes", post(cast_vote_handler))
        .route("/polls/{id}/results", get(get_poll_results_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        // Add the pool and settings to the application state
        .with_state(state)
}

/// Runs the embedded migrations
///
/// ### Arguments
///
/// * `conn` - A mutable reference to a SQLite connection
///
/// ### Errors
///
/// Returns an error if a migration fails to apply
pub fn run_migrations(conn: &mut diesel::SqliteConnection) -> anyhow::Result<()> {
    use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

    // Define the embedded migrations
    const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

    // Run all pending migrations
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;

    tracing::info!("Applied {} pending migrations", applied.len());

    Ok(())
}
