//! Loading configuration from disk

use std::time::Duration;

use wedtest_common::{classify_environment, HarnessConfig, Poller};

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();

    let loaded = HarnessConfig::load(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(loaded.server.control_path, "/build/ajax/control");
    assert_eq!(HarnessConfig::from_toml("").unwrap(), HarnessConfig::default());
}

#[test]
fn test_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("wedtest.toml");

    let mut config = HarnessConfig::default();
    config.environment.browser = "INTERNETEXPLORER".to_string();
    config.environment.version = "10".to_string();
    config.environment.platform = "WINDOWS 7".to_string();
    config.poll.timeout_ms = 1500;
    config.save(&path).unwrap();

    let reloaded = HarnessConfig::from_toml(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(reloaded, config);

    let poller = Poller::from_config(&reloaded.poll);
    assert_eq!(poller.timeout(), Duration::from_millis(1500));

    let caps = classify_environment(&reloaded.environment).unwrap();
    assert_eq!(
        caps.enabled().collect::<Vec<_>>(),
        vec!["MSIE", "MSIE_TO_10", "WINDOWS"]
    );
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wedtest.toml");
    std::fs::write(&path, "[poll\ntimeout_ms = ").unwrap();

    assert!(HarnessConfig::load(&path).is_err());
}
