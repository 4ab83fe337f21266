// Property-based tests for layered configuration loading

use common::config::Settings;
use proptest::prelude::*;
use std::fs;
use tempfile::TempDir;

fn database_section(url: &str, max_connections: u32, min_connections: u32) -> String {
    format!(
        r#"
[database]
url = "{}"
max_connections = {}
min_connections = {}
connect_timeout_seconds = 30
"#,
        url, max_connections, min_connections
    )
}

/// Values written to default.toml are what load_from_path returns
#[test]
fn property_file_config_is_loaded() {
    proptest!(|(
        db_name in "[a-z]{1,12}",
        max_connections in 1u32..100u32,
        work_factor in 4u32..=31u32,
    )| {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path();

        let config = format!(
            "{}\n[security]\nbcrypt_work_factor = {}\n",
            database_section(
                &format!("postgresql://localhost/{}", db_name),
                max_connections,
                1
            ),
            work_factor
        );
        fs::write(config_path.join("default.toml"), config).unwrap();

        let settings = Settings::load_from_path(config_path).unwrap();
        prop_assert!(settings.validate().is_ok());
        prop_assert_eq!(
            settings.database.url,
            format!("postgresql://localhost/{}", db_name)
        );
        prop_assert_eq!(settings.database.max_connections, max_connections);
        prop_assert_eq!(settings.security.bcrypt_work_factor, work_factor);
    });
}

/// local.toml wins over default.toml
#[test]
fn property_local_file_overrides_default() {
    proptest!(|(
        default_max in 1u32..50u32,
        local_max in 50u32..100u32,
    )| {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path();

        fs::write(
            config_path.join("default.toml"),
            database_section("postgresql://localhost/jobly", default_max, 1),
        )
        .unwrap();
        fs::write(
            config_path.join("local.toml"),
            database_section("postgresql://localhost/jobly_local", local_max, 1),
        )
        .unwrap();

        let settings = Settings::load_from_path(config_path).unwrap();
        prop_assert_eq!(settings.database.url, "postgresql://localhost/jobly_local");
        prop_assert_eq!(settings.database.max_connections, local_max);
    });
}

/// Missing sections fall back to defaults and still validate
#[test]
fn test_missing_files_use_defaults() {
    let temp_dir = TempDir::new().unwrap();

    let settings = Settings::load_from_path(temp_dir.path()).unwrap();
    let defaults = Settings::default();

    assert!(settings.validate().is_ok());
    assert_eq!(settings.database.max_connections, defaults.database.max_connections);
    assert_eq!(
        settings.security.bcrypt_work_factor,
        defaults.security.bcrypt_work_factor
    );
}

/// APP__ environment variables win over every file
#[test]
fn property_env_overrides_file_config() {
    proptest!(|(log_level in prop::sample::select(vec!["trace", "debug", "info", "warn", "error"]))| {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path();

        fs::write(
            config_path.join("default.toml"),
            "[observability]\nlog_level = \"info\"\n",
        )
        .unwrap();

        std::env::set_var("APP__OBSERVABILITY__LOG_LEVEL", log_level);
        let settings = Settings::load_from_path(config_path);
        std::env::remove_var("APP__OBSERVABILITY__LOG_LEVEL");

        prop_assert_eq!(settings.unwrap().observability.log_level, log_level);
    });
}

/// Out-of-range values load fine but fail validation
#[test]
fn property_invalid_work_factor_fails_validation() {
    proptest!(|(work_factor in prop_oneof![0u32..4u32, 32u32..100u32])| {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("default.toml"),
            format!("[security]\nbcrypt_work_factor = {}\n", work_factor),
        )
        .unwrap();

        let settings = Settings::load_from_path(temp_dir.path()).unwrap();
        prop_assert!(settings.validate().is_err());
    });
}
