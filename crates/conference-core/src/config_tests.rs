//! Config module tests

use crate::config::{ApiConfig, Config, UnknownIdStatus};
use std::path::PathBuf;

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.database.max_connections, 5);
    assert_eq!(config.api.application_name, "conferenceApp");
    assert_eq!(config.api.unknown_id_status, UnknownIdStatus::BadRequest);
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_toml_falls_back_to_defaults() {
    let config = Config::from_toml(
        r#"
        [api]
        unknown_id_status = "not_found"
        "#,
    )
    .unwrap();

    assert_eq!(config.api.unknown_id_status, UnknownIdStatus::NotFound);
    assert_eq!(config.api.application_name, "conferenceApp");
    assert_eq!(config.search.max_connections, 5);
}

#[test]
fn test_toml_round_trip() {
    let mut config = Config::default();
    config.database.path = Some(PathBuf::from("/var/lib/conf/primary.db"));
    config.search.path = Some(PathBuf::from("/var/lib/conf/search.db"));
    config.api = ApiConfig {
        application_name: "testmsApp".to_string(),
        unknown_id_status: UnknownIdStatus::NotFound,
    };

    let text = toml::to_string_pretty(&config).unwrap();
    assert_eq!(Config::from_toml(&text).unwrap(), config);
}

#[test]
fn test_set_and_get() {
    let mut config = Config::default();
    config.set("api.unknown_id_status", "not_found").unwrap();
    assert_eq!(config.get("api.unknown_id_status").unwrap(), "not_found");

    config.set("database.max_connections", "8").unwrap();
    assert_eq!(config.get("database.max_connections").unwrap(), "8");

    config.set("search.path", "/tmp/index.db").unwrap();
    assert_eq!(config.get("search.path").unwrap(), "/tmp/index.db");
}

#[test]
fn test_set_rejects_bad_values() {
    let mut config = Config::default();
    assert!(config.set("api.unknown_id_status", "teapot").is_err());
    assert!(config.set("database.max_connections", "many").is_err());
    assert!(config.set("database.max_connections", "0").is_err());
    assert!(config.set("no.such.key", "1").is_err());
    assert!(config.get("no.such.key").is_err());
}

#[test]
fn test_shared_database_file_is_rejected() {
    let mut config = Config::default();
    config.set("database.path", "/tmp/same.db").unwrap();
    assert!(config.set("search.path", "/tmp/same.db").is_err());
}

#[test]
fn test_every_key_is_readable() {
    let config = Config::default();
    for key in Config::keys() {
        assert!(config.get(key).is_ok(), "key {} should be readable", key);
    }
}
