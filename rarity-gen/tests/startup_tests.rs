//! Startup ordering tests
//!
//! The tracing subscriber is process-global, so this file holds a single
//! test and runs in its own test binary.

use rarity_common::config::ConfigOverrides;
use rarity_gen::logging::init_tracing;
use rarity_gen::startup::start;
use tempfile::TempDir;

#[test]
fn test_config_warnings_are_logged() {
    std::env::remove_var("RUST_LOG");
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("startup.log");

    let logging = init_tracing("info").unwrap();
    logging.apply("info", Some(&log_path)).unwrap();

    let overrides = ConfigOverrides {
        input: Some(dir.path().join("nfts.json")),
        ..Default::default()
    };
    let missing = dir.path().join("missing.toml");
    let (config, again) = start(&overrides, Some(&missing)).unwrap();

    assert_eq!(config.input, dir.path().join("nfts.json"));
    assert_eq!(config.log_level, "info");

    // Warning from the TOML loader landed in the log before start returned
    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("Config file not found"), "log was: {}", log);
    assert!(log.contains("missing.toml"));

    // A second init hands back the installed subscriber
    again.apply("debug", None).unwrap();
    assert!(init_tracing("warn").is_ok());
}
