//! Periodic copies of the SQLite database
//!
//! Backups are written with `VACUUM INTO`, which produces a consistent copy
//! while other connections keep working. Files are named after the moment
//! they were taken so that sorting by name sorts by age.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use diesel::RunQueryDsl;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use crate::config::Config;
use crate::db::DbPool;

const BACKUP_PREFIX: &str = "portal-";
const BACKUP_SUFFIX: &str = ".db";

/// File name of a backup taken at `taken_at`
pub fn backup_file_name(taken_at: DateTime<Utc>) -> String {
    format!("{}{}{}", BACKUP_PREFIX, taken_at.format("%Y%m%dT%H%M%SZ"), BACKUP_SUFFIX)
}

/// Whether the database URL points at an in-memory database
pub fn is_in_memory(database_url: &str) -> bool {
    database_url == ":memory:" || database_url.contains("mode=memory")
}

/// Writes a copy of the database into `dir`
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `dir` - Directory the backup goes to; created when missing
/// * `taken_at` - Timestamp used in the file name
///
/// ### Returns
///
/// The path of the new backup file
///
/// ### Errors
///
/// Returns an error if the directory cannot be created or SQLite fails to
/// write the copy, for instance because the file already exists
#[instrument(skip(pool), fields(dir = %dir.display()))]
pub fn create_backup(pool: &DbPool, dir: &Path, taken_at: DateTime<Utc>) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create backup directory {}", dir.display()))?;

    let target = dir.join(backup_file_name(taken_at));
    let escaped = target.to_string_lossy().replace('\'', "''");

    let mut conn = pool.get()?;
    diesel::sql_query(format!("VACUUM INTO '{}'", escaped))
        .execute(&mut conn)
        .with_context(|| format!("Failed to write backup {}", target.display()))?;

    info!("Wrote backup {}", target.display());

    Ok(target)
}

/// Deletes the oldest backups in `dir` so that at most `keep` remain
///
/// Only files following the backup naming scheme are considered.
///
/// ### Returns
///
/// The paths that were removed, oldest first
pub fn prune_backups(dir: &Path, keep: usize) -> Result<Vec<PathBuf>> {
    let mut backups: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read backup directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(BACKUP_PREFIX) && name.ends_with(BACKUP_SUFFIX))
        })
        .collect();
    backups.sort();

    let excess = backups.len().saturating_sub(keep);
    let removed: Vec<PathBuf> = backups.into_iter().take(excess).collect();
    for path in &removed {
        fs::remove_file(path).with_context(|| format!("Failed to remove old backup {}", path.display()))?;
        debug!("Removed old backup {}", path.display());
    }

    Ok(removed)
}

/// Starts the periodic backup task
///
/// Returns `None` when backups are disabled by a zero interval or the
/// database lives in memory. The first backup is taken one interval after
/// start.
pub fn spawn_backup_task(pool: Arc<DbPool>, config: &Config) -> Option<JoinHandle<()>> {
    if config.backup_interval_minutes == 0 {
        info!("Periodic backups disabled");
        return None;
    }
    if is_in_memory(&config.database_url) {
        info!("In-memory database, skipping periodic backups");
        return None;
    }

    let period = config.backup_interval();
    let dir = config.resolved_backup_dir();
    let keep = config.backup_count as usize;

    info!(
        "Backing up every {} minutes to {}, keeping {}",
        config.backup_interval_minutes,
        dir.display(),
        keep
    );

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;

            let pool = pool.clone();
            let dir = dir.clone();
            let result = tokio::task::spawn_blocking(move || -> Result<()> {
                create_backup(&pool, &dir, Utc::now())?;
                prune_backups(&dir, keep)?;
                Ok(())
            })
            .await;

            match result {
                Ok(Ok(())) => {}
                Ok(Err(err)) => error!("Backup failed: {:#}", err),
                Err(err) => error!("Backup task panicked: {}", err),
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::base_config;
    use crate::db::init_pool;
    use crate::run_migrations;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn file_pool(dir: &TempDir) -> DbPool {
        let path = dir.path().join("portal.db");
        let pool = init_pool(&path.to_string_lossy()).unwrap();
        run_migrations(&mut pool.get().unwrap()).unwrap();
        pool
    }

    #[test]
    fn test_backup_file_name_sorts_by_time() {
        let earlier = backup_file_name(Utc.with_ymd_and_hms(2026, 1, 9, 23, 59, 59).unwrap());
        let later = backup_file_name(Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap());

        assert_eq!(earlier, "portal-20260109T235959Z.db");
        assert!(earlier < later);
    }

    #[test]
    fn test_is_in_memory() {
        assert!(is_in_memory(":memory:"));
        assert!(is_in_memory("file:test?mode=memory&cache=shared"));
        assert!(!is_in_memory("/var/lib/portal/portal.db"));
    }

    #[test]
    fn test_create_backup_writes_a_usable_copy() {
        let data_dir = TempDir::new().unwrap();
        let backup_dir = data_dir.path().join("backups");
        let pool = file_pool(&data_dir);

        let path = create_backup(&pool, &backup_dir, Utc::now()).unwrap();

        assert!(path.exists());
        let copy = init_pool(&path.to_string_lossy()).unwrap();
        let mut conn = copy.get().unwrap();
        let count = diesel::sql_query("SELECT COUNT(*) FROM inventory_items").execute(&mut conn);
        assert!(count.is_ok());
    }

    #[test]
    fn test_prune_backups_keeps_newest() {
        let dir = TempDir::new().unwrap();
        for day in 1..=4 {
            let name = backup_file_name(Utc.with_ymd_and_hms(2026, 2, day, 12, 0, 0).unwrap());
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::write(dir.path().join("notes.txt"), b"keep me").unwrap();

        let removed = prune_backups(dir.path(), 2).unwrap();

        assert_eq!(removed.len(), 2);
        assert!(removed[0].ends_with("portal-20260201T120000Z.db"));
        assert!(dir.path().join("portal-20260204T120000Z.db").exists());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[tokio::test]
    async fn test_no_task_for_in_memory_database() {
        let mut config = base_config(None);
        config.database_url = ":memory:".to_string();
        let pool = Arc::new(init_pool(&config.database_url).unwrap());

        assert!(spawn_backup_task(pool, &config).is_none());
    }
}
