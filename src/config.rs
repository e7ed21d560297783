use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use directories::ProjectDirs;
use clap::Parser;
use std::fs;
use thiserror::Error;
use tracing::{info, warn};

/// Name of the database file created in the config directory
const DEFAULT_DATABASE_FILE: &str = "portal.db";

/// Errors raised while loading the configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration for the portal server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// URL for the database connection
    pub database_url: String,
    /// Port the HTTP server listens on
    pub port: u16,
    /// Domain used in generated Message-IDs
    pub mail_domain: String,
    /// Directory for JSON log files; stdout only when unset
    pub log_dir: Option<PathBuf>,
    /// Duration between periodic backups in minutes, 0 disables backups
    pub backup_interval_minutes: u64,
    /// Number of periodic backups to keep
    pub backup_count: u32,
    /// Directory backups are written to
    pub backup_dir: Option<PathBuf>,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfigUpdate {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub mail_domain: Option<String>,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default)]
    pub backup_interval_minutes: Option<u64>,
    #[serde(default)]
    pub backup_count: Option<u32>,
    #[serde(default)]
    pub backup_dir: Option<PathBuf>,
    /// Server URL used by the CLI; ignored by the server
    #[serde(default)]
    pub server_url: Option<String>,
}

/// Command line arguments for the server
#[derive(Parser, Debug)]
#[clap(name = "committee-portal", about = "Committee portal API server")]
pub struct CliArgs {
    /// Database URL
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Port to listen on
    #[clap(long, env = "PORTAL_PORT")]
    pub port: Option<u16>,

    /// Domain used in generated Message-IDs
    #[clap(long, env = "PORTAL_MAIL_DOMAIN")]
    pub mail_domain: Option<String>,

    /// Directory for JSON log files
    #[clap(long, env = "PORTAL_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Backup interval in minutes
    #[clap(long, env = "BACKUP_INTERVAL_MINUTES")]
    pub backup_interval_minutes: Option<u64>,

    /// Number of backups to keep
    #[clap(long, env = "BACKUP_COUNT")]
    pub backup_count: Option<u32>,

    /// Directory backups are written to
    #[clap(long, env = "BACKUP_DIR")]
    pub backup_dir: Option<PathBuf>,

    /// Debug mode
    #[clap(long, env = "PORTAL_DEBUG", default_value_t = false)]
    pub debug: bool,
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        Self {
            database_url: update.database_url.unwrap_or(self.database_url),
            port: update.port.unwrap_or(self.port),
            mail_domain: update.mail_domain.unwrap_or(self.mail_domain),
            log_dir: update.log_dir.or(self.log_dir),
            backup_interval_minutes: update.backup_interval_minutes.unwrap_or(self.backup_interval_minutes),
            backup_count: update.backup_count.unwrap_or(self.backup_count),
            backup_dir: update.backup_dir.or(self.backup_dir),
        }
    }

    /// Returns the backup interval as a Duration
    pub fn backup_interval(&self) -> Duration {
        Duration::from_secs(self.backup_interval_minutes.saturating_mul(60))
    }

    /// Directory backups go to: the configured one, else `backups/` next to
    /// the database file
    pub fn resolved_backup_dir(&self) -> PathBuf {
        if let Some(dir) = &self.backup_dir {
            return dir.clone();
        }
        Path::new(&self.database_url)
            .parent()
            .map(|parent| parent.join("backups"))
            .unwrap_or_else(|| PathBuf::from("backups"))
    }
}

/// Returns the base (default) configuration
pub fn base_config(config_path: Option<PathBuf>) -> Config {
    let database_url = config_path.map_or(DEFAULT_DATABASE_FILE.to_string(), |path| {
        path.join(DEFAULT_DATABASE_FILE).to_string_lossy().to_string()
    });

    Config {
        database_url,
        port: 3000,
        mail_domain: "localhost".to_string(),
        log_dir: None,
        backup_interval_minutes: 60,
        backup_count: 10,
        backup_dir: None,
    }
}

/// Loads configuration from a TOML file
///
/// A missing path or file yields an empty update.
pub fn config_from_file(config_path: Option<PathBuf>) -> Result<ConfigUpdate, ConfigError> {
    let Some(config_path) = config_path else {
        return Ok(ConfigUpdate::default());
    };

    if !config_path.exists() {
        info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(ConfigUpdate::default());
    }

    let content = fs::read_to_string(&config_path).inspect_err(|e| {
        warn!("Failed to read config file: {}", e);
    })?;
    let update = toml::from_str::<ConfigUpdate>(&content).inspect_err(|e| {
        warn!("Failed to parse config file: {}", e);
    })?;
    info!("Loaded configuration from {:?}", config_path);
    Ok(update)
}

/// Loads configuration from command line arguments
pub fn config_from_args(args: CliArgs) -> ConfigUpdate {
    ConfigUpdate {
        database_url: args.database_url,
        port: args.port,
        mail_domain: args.mail_domain,
        log_dir: args.log_dir,
        backup_interval_minutes: args.backup_interval_minutes,
        backup_count: args.backup_count,
        backup_dir: args.backup_dir,
        server_url: None,
    }
}

/// Returns the platform config directory, if one can be determined
pub fn get_config_dir_path() -> Option<PathBuf> {
    match ProjectDirs::from("org", "committee-portal", "committee-portal") {
        Some(proj_dirs) => Some(proj_dirs.config_dir().to_path_buf()),
        None => {
            warn!("Could not determine XDG config directory, skipping config file");
            None
        }
    }
}

/// Gets the complete configuration by combining defaults with
/// values from config file, environment variables, and command line arguments
/// in order of increasing precedence
pub fn get_config(args: CliArgs) -> Config {
    let config_path = get_config_dir_path().and_then(|path| {
        if !path.exists() {
            info!("Config path not found at {:?}, using defaults", path);
            None
        } else {
            Some(path)
        }
    });

    let base = base_config(config_path.clone());
    let file_update = config_from_file(config_path.map(|dir| dir.join("config.toml")))
        .unwrap_or_default();

    // Apply updates in order of increasing precedence
    let config = base
        .apply_update(file_update)
        .apply_update(config_from_args(args));

    info!("Final configuration: database_url={}, port={}, backup_interval={}min, backup_count={}",
          config.database_url, config.port, config.backup_interval_minutes, config.backup_count);

    config
}

#[cfg(test)]
mod tests;
