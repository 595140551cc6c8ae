//! Environment overrides for the server configuration
//!
//! These tests mutate process environment variables, so each one runs under
//! `#[serial]` and restores the previous values on drop.

use serial_test::serial;
use shelf_api::config::{ConfigSource, LogFormat, ShelfConfig};
use std::env;

struct TempEnv {
    key: &'static str,
    prev: Option<String>,
}

impl TempEnv {
    fn set(key: &'static str, value: Option<&str>) -> Self {
        let prev = env::var(key).ok();
        // SAFETY: callers hold the `serial` lock, so no other test thread
        // reads the environment concurrently.
        unsafe {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
        Self { key, prev }
    }
}

impl Drop for TempEnv {
    fn drop(&mut self) {
        // SAFETY: see `TempEnv::set`.
        unsafe {
            match &self.prev {
                Some(value) => env::set_var(self.key, value),
                None => env::remove_var(self.key),
            }
        }
    }
}

#[test]
#[serial]
fn test_env_overrides_server_settings() {
    let _host = TempEnv::set("SHELF_HOST", Some("127.0.0.1"));
    let _port = TempEnv::set("SHELF_PORT", Some("8081"));
    let _format = TempEnv::set("SHELF_LOG_FORMAT", Some("pretty"));

    let config = ShelfConfig::default().apply_profile().unwrap();
    assert_eq!(config.server.bind_address(), "127.0.0.1:8081");
    assert_eq!(config.logging.format, LogFormat::Pretty);
}

#[test]
#[serial]
fn test_defaults_without_env() {
    let _host = TempEnv::set("SHELF_HOST", None);
    let _port = TempEnv::set("SHELF_PORT", None);
    let _format = TempEnv::set("SHELF_LOG_FORMAT", None);

    let config = ShelfConfig::default().apply_profile().unwrap();
    assert_eq!(config.server.bind_address(), "0.0.0.0:5000");
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
#[serial]
fn test_invalid_port_is_rejected() {
    let _port = TempEnv::set("SHELF_PORT", Some("eighty"));
    let err = ShelfConfig::default().apply_profile().unwrap_err();
    assert!(err.to_string().contains("SHELF_PORT"));
}

#[test]
#[serial]
fn test_config_path_from_env() {
    let path = env::temp_dir().join(format!("shelf-config-{}.toml", std::process::id()));
    std::fs::write(
        &path,
        "[server]\nport = 9090\n\n[[resources]]\nname = \"notes\"\n",
    )
    .unwrap();
    let _path = TempEnv::set("SHELF_CONFIG_PATH", path.to_str());

    let (config, source) = ShelfConfig::load().unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(source, ConfigSource::File(path.clone()));
    assert_eq!(config.server.port, 9090);
    let names: Vec<_> = config.resources.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["notes"]);
}

#[test]
#[serial]
fn test_malformed_config_file_fails() {
    let path = env::temp_dir().join(format!("shelf-bad-{}.toml", std::process::id()));
    std::fs::write(&path, "[server\nport = ").unwrap();

    let result = ShelfConfig::load_from(&path);
    std::fs::remove_file(&path).unwrap();
    assert!(result.is_err());
}
