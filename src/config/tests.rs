use super::*;
use tempfile::{tempdir, TempDir};
use std::fs::File;
use std::io::Write;

/// Helper function to create a test configuration file
fn create_test_config_file(dir: &TempDir, content: &str) -> PathBuf {
    let config_path = dir.path().join("config.toml");
    let mut file = File::create(&config_path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    config_path
}

fn empty_args() -> CliArgs {
    CliArgs {
        database_url: None,
        port: None,
        mail_domain: None,
        log_dir: None,
        backup_interval_minutes: None,
        backup_count: None,
        backup_dir: None,
        debug: false,
    }
}

fn sample_config() -> Config {
    Config {
        database_url: "original.db".to_string(),
        port: 3000,
        mail_domain: "example.org".to_string(),
        log_dir: None,
        backup_interval_minutes: 30,
        backup_count: 5,
        backup_dir: None,
    }
}

#[test]
fn test_apply_update_with_all_values() {
    let update = ConfigUpdate {
        database_url: Some("updated.db".to_string()),
        port: Some(8080),
        mail_domain: Some("hallitus.example.org".to_string()),
        log_dir: Some(PathBuf::from("/var/log/portal")),
        backup_interval_minutes: Some(60),
        backup_count: Some(10),
        backup_dir: Some(PathBuf::from("/var/backups")),
        server_url: Some("http://ignored".to_string()),
    };

    let updated = sample_config().apply_update(update);

    assert_eq!(updated.database_url, "updated.db");
    assert_eq!(updated.port, 8080);
    assert_eq!(updated.mail_domain, "hallitus.example.org");
    assert_eq!(updated.log_dir, Some(PathBuf::from("/var/log/portal")));
    assert_eq!(updated.backup_interval_minutes, 60);
    assert_eq!(updated.backup_count, 10);
    assert_eq!(updated.backup_dir, Some(PathBuf::from("/var/backups")));
}

#[test]
fn test_apply_update_with_partial_values() {
    let update = ConfigUpdate {
        database_url: Some("updated.db".to_string()),
        ..ConfigUpdate::default()
    };

    let updated = sample_config().apply_update(update);

    assert_eq!(updated.database_url, "updated.db");
    assert_eq!(updated.port, 3000); // Unchanged
    assert_eq!(updated.backup_interval_minutes, 30); // Unchanged
    assert_eq!(updated.backup_count, 5); // Unchanged
}

#[test]
fn test_apply_update_with_no_values() {
    let updated = sample_config().apply_update(ConfigUpdate::default());
    assert_eq!(updated, sample_config());
}

#[test]
fn test_backup_interval_conversion() {
    let config = sample_config();
    assert_eq!(config.backup_interval(), Duration::from_secs(30 * 60));
}

#[test]
fn test_resolved_backup_dir() {
    let mut config = sample_config();
    config.database_url = "/srv/portal/portal.db".to_string();
    assert_eq!(config.resolved_backup_dir(), PathBuf::from("/srv/portal/backups"));

    config.backup_dir = Some(PathBuf::from("/mnt/backups"));
    assert_eq!(config.resolved_backup_dir(), PathBuf::from("/mnt/backups"));
}

#[test]
fn test_base_config_defaults() {
    let config = base_config(None);

    assert_eq!(config.database_url, "portal.db");
    assert_eq!(config.port, 3000);
    assert_eq!(config.mail_domain, "localhost");
    assert_eq!(config.backup_interval_minutes, 60);
    assert_eq!(config.backup_count, 10);
    assert!(config.log_dir.is_none());
}

#[test]
fn test_base_config_with_path() {
    let temp_dir = tempdir().unwrap();
    let config = base_config(Some(temp_dir.path().to_path_buf()));

    let expected_db_path = temp_dir.path().join("portal.db").to_string_lossy().to_string();
    assert_eq!(config.database_url, expected_db_path);
}

#[test]
fn test_config_from_args_with_all_values() {
    let args = CliArgs {
        database_url: Some("args.db".to_string()),
        port: Some(4000),
        mail_domain: Some("args.example.org".to_string()),
        log_dir: Some(PathBuf::from("logs")),
        backup_interval_minutes: Some(45),
        backup_count: Some(15),
        backup_dir: Some(PathBuf::from("bk")),
        debug: true,
    };

    let update = config_from_args(args);

    assert_eq!(update.database_url, Some("args.db".to_string()));
    assert_eq!(update.port, Some(4000));
    assert_eq!(update.mail_domain, Some("args.example.org".to_string()));
    assert_eq!(update.log_dir, Some(PathBuf::from("logs")));
    assert_eq!(update.backup_interval_minutes, Some(45));
    assert_eq!(update.backup_count, Some(15));
    assert_eq!(update.backup_dir, Some(PathBuf::from("bk")));
    assert_eq!(update.server_url, None);
}

#[test]
fn test_config_from_args_with_no_values() {
    assert_eq!(config_from_args(empty_args()), ConfigUpdate::default());
}

#[test]
fn test_config_from_file_with_no_path() {
    let update = config_from_file(None).unwrap();
    assert_eq!(update, ConfigUpdate::default());
}

#[test]
fn test_config_from_file_with_valid_toml() {
    let temp_dir = tempdir().unwrap();
    let config_content = r#"
        database_url = "file.db"
        port = 3100
        mail_domain = "board.example.org"
        backup_interval_minutes = 40
        backup_count = 20
        server_url = "http://portal.local:3100"
    "#;

    let config_path = create_test_config_file(&temp_dir, config_content);

    let result = config_from_file(Some(config_path));

    assert!(result.is_ok(), "Failed to parse config file: {}", result.err().unwrap());
    let update = result.unwrap();
    assert_eq!(update.database_url, Some("file.db".to_string()));
    assert_eq!(update.port, Some(3100));
    assert_eq!(update.mail_domain, Some("board.example.org".to_string()));
    assert_eq!(update.backup_interval_minutes, Some(40));
    assert_eq!(update.backup_count, Some(20));
    assert_eq!(update.server_url, Some("http://portal.local:3100".to_string()));
}

#[test]
fn test_config_from_file_with_partial_values() {
    let temp_dir = tempdir().unwrap();
    let config_content = r#"
        database_url = "file.db"
        # Intentionally missing other fields
    "#;

    let config_path = create_test_config_file(&temp_dir, config_content);
    let update = config_from_file(Some(config_path)).unwrap();

    assert_eq!(update.database_url, Some("file.db".to_string()));
    assert_eq!(update.port, None);
    assert_eq!(update.backup_count, None);
}

#[test]
fn test_config_from_file_with_invalid_toml() {
    let temp_dir = tempdir().unwrap();
    let config_content = r#"
        database_url = "file.db"
        backup_interval_minutes = "not a number" # Type error
    "#;

    let config_path = create_test_config_file(&temp_dir, config_content);
    let result = config_from_file(Some(config_path));

    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_config_from_file_with_nonexistent_file() {
    let temp_dir = tempdir().unwrap();
    let nonexistent_path = temp_dir.path().join("nonexistent_config.toml");

    let update = config_from_file(Some(nonexistent_path)).unwrap();
    assert_eq!(update, ConfigUpdate::default());
}

#[test]
fn test_config_precedence() {
    // CLI args override the file, which overrides the base
    let args = CliArgs {
        database_url: Some("args.db".to_string()),
        ..empty_args()
    };

    let file_update = ConfigUpdate {
        database_url: Some("file.db".to_string()),
        backup_interval_minutes: Some(50),
        ..ConfigUpdate::default()
    };

    let config = base_config(None)
        .apply_update(file_update)
        .apply_update(config_from_args(args));

    assert_eq!(config.database_url, "args.db");
    assert_eq!(config.backup_interval_minutes, 50); // From file
    assert_eq!(config.backup_count, 10); // From base
}
