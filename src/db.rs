use std::time::Duration;

use anyhow::{Context, Result};
use diesel::connection::SimpleConnection;
use diesel::query_dsl::methods::ExecuteDsl;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::result::{Error as DieselError, QueryResult};
use diesel::sqlite::SqliteConnection;
use rand::Rng;
use tracing::warn;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Number of times a write is attempted before a busy error is returned
const MAX_WRITE_ATTEMPTS: u32 = 5;

/// Base delay between write attempts, doubled on every retry
const RETRY_BASE_DELAY_MS: u64 = 20;

/// Applies the per-connection SQLite settings every pooled connection needs
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Creates a connection pool for the given SQLite database URL
///
/// Every connection handed out by the pool has foreign key enforcement
/// enabled, so cascading deletes declared in the migrations take effect.
pub fn init_pool(database_url: &str) -> Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)
        .with_context(|| format!("Failed to create pool for {}", database_url))
}

/// Returns true when SQLite rejected the statement because another
/// connection holds the write lock
fn is_busy(err: &DieselError) -> bool {
    match err {
        DieselError::DatabaseError(_, info) => {
            let message = info.message();
            message.contains("database is locked") || message.contains("database table is locked")
                || message.contains("busy")
        }
        _ => false,
    }
}

/// Delay before retry `attempt`, doubled per attempt plus random jitter
fn backoff_delay(attempt: u32) -> u64 {
    let jitter = rand::rng().random_range(0..RETRY_BASE_DELAY_MS);
    RETRY_BASE_DELAY_MS * 2u64.pow(attempt - 1) + jitter
}

/// Runs a write operation, retrying with jittered backoff while SQLite
/// reports the database as busy
///
/// ### Arguments
///
/// * `op` - The operation to run; it is called again on every retry
///
/// ### Returns
///
/// The operation's result, or the last busy error once attempts run out
async fn retry_on_busy<T, F>(mut op: F) -> Result<T, DieselError>
where
    F: FnMut() -> Result<T, DieselError>,
{
    let mut attempt = 1;
    loop {
        match op() {
            Err(err) if is_busy(&err) && attempt < MAX_WRITE_ATTEMPTS => {
                let delay = backoff_delay(attempt);
                warn!("Database busy (attempt {}), retrying in {}ms", attempt, delay);
                tokio::time::sleep(Duration::from_millis(delay)).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}

/// Executes write statements, retrying while SQLite reports the database as busy
pub trait ExecuteWithRetry: Sized {
    /// Executes the statement, retrying while the database is busy
    ///
    /// ### Arguments
    ///
    /// * `conn` - The connection to execute the statement on
    ///
    /// ### Returns
    ///
    /// The number of affected rows
    fn execute_with_retry(
        self,
        conn: &mut SqliteConnection,
    ) -> impl Future<Output = QueryResult<usize>> + Send;
}

impl<Q> ExecuteWithRetry for Q
where
    Q: ExecuteDsl<SqliteConnection> + Clone + Send,
{
    fn execute_with_retry(
        self,
        conn: &mut SqliteConnection,
    ) -> impl Future<Output = QueryResult<usize>> + Send {
        retry_on_busy(move || ExecuteDsl::execute(self.clone(), &mut *conn))
    }
}
