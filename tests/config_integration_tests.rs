//! Integration tests for AppConfig loading
//!
//! These tests verify:
//! - A full YAML file maps onto every section
//! - Environment variables override file values

use avatar_config_sync::AppConfig;
use camino::Utf8PathBuf;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn write_config(contents: &str) -> (TempDir, Utf8PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().join("avatar-config-sync.yaml")).unwrap();
    fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn test_full_file() {
    let (_dir, path) = write_config(
        r#"
ipc:
  renderer_addr: "127.0.0.1:6000"
  listen_addr: "127.0.0.1:6001"
polling:
  camera_interval_ms: 750
storage:
  save_dir: "/var/lib/avatar"
logging:
  dir: "/var/log/avatar"
  prefix: "sync"
  debug: true
  console: false
"#,
    );

    let config = AppConfig::load(Some(&path)).unwrap();

    assert_eq!(config.ipc.renderer_addr.port(), 6000);
    assert_eq!(config.ipc.listen_addr.port(), 6001);
    assert_eq!(config.polling.camera_interval(), Duration::from_millis(750));
    assert_eq!(config.storage.save_dir, Utf8PathBuf::from("/var/lib/avatar"));
    assert_eq!(config.logging.prefix, "sync");
    assert!(config.logging.debug);
    assert!(!config.logging.console);
}

#[test]
fn test_invalid_value_is_reported() {
    let (_dir, path) = write_config("ipc:\n  renderer_addr: \"not an address\"\n");
    assert!(AppConfig::load(Some(&path)).is_err());
}

#[test]
fn test_environment_overrides_file() {
    let (_dir, path) = write_config("ipc:\n  query_timeout_ms: 750\n");

    // SAFETY: no other test in this binary reads this variable
    unsafe {
        std::env::set_var("AVATAR_SYNC__IPC__QUERY_TIMEOUT_MS", "250");
    }
    let config = AppConfig::load(Some(&path));
    unsafe {
        std::env::remove_var("AVATAR_SYNC__IPC__QUERY_TIMEOUT_MS");
    }

    assert_eq!(config.unwrap().ipc.query_timeout(), Some(Duration::from_millis(250)));
}
