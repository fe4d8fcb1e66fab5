use serial_test::serial;
use tracing::info;
use vdb_common::types::BreakpointId;
use vdb_store::{BreakpointConfig, Config, EngineConfig, LoggingConfig};

#[test]
fn test_default_config() {
    vdb_common::logging::ensure_test_logging(None);
    info!("Running test");
    let config = Config::default();

    assert_eq!(config.breakpoints.first_id, 11000);
    assert!(config.engine.replay_on_link);
    assert!(!config.logging.file_logging);
    assert_eq!(config.id_generator().peek(), BreakpointId::new(11000));
}

#[test]
fn test_config_round_trips_through_file() {
    vdb_common::logging::ensure_test_logging(None);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vdb.toml");

    let config = Config {
        breakpoints: BreakpointConfig { first_id: 1 },
        engine: EngineConfig { replay_on_link: false },
        logging: LoggingConfig { file_logging: true },
    };
    config.save_to_path(&path).unwrap();

    assert_eq!(Config::load_from_path(&path).unwrap(), config);
}

#[test]
fn test_partial_config_uses_defaults() {
    vdb_common::logging::ensure_test_logging(None);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vdb.toml");
    std::fs::write(&path, "[breakpoints]\nfirst_id = 500\n").unwrap();

    let config = Config::load_from_path(&path).unwrap();
    assert_eq!(config.breakpoints.first_id, 500);
    assert!(config.engine.replay_on_link);
}

#[test]
fn test_invalid_config_is_an_error() {
    vdb_common::logging::ensure_test_logging(None);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vdb.toml");
    std::fs::write(&path, "[breakpoints]\nfirst_id = \"soon\"\n").unwrap();

    let err = Config::load_from_path(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
    assert!(Config::load_from_path(dir.path().join("missing.toml")).is_err());
}

#[test]
#[serial]
fn test_load_creates_default_file_in_home() {
    vdb_common::logging::ensure_test_logging(None);
    let home = tempfile::tempdir().unwrap();
    let previous = std::env::var_os("HOME");
    std::env::set_var("HOME", home.path());

    let config = Config::load().unwrap();
    let path = Config::config_path().unwrap();

    match previous {
        Some(value) => std::env::set_var("HOME", value),
        None => std::env::remove_var("HOME"),
    }

    assert_eq!(config, Config::default());
    assert_eq!(path, home.path().join(".vdb.toml"));
    assert!(path.exists());
}

#[test]
#[serial]
fn test_save_writes_to_home() {
    vdb_common::logging::ensure_test_logging(None);
    let home = tempfile::tempdir().unwrap();
    let previous = std::env::var_os("HOME");
    std::env::set_var("HOME", home.path());

    let config = Config { breakpoints: BreakpointConfig { first_id: 42 }, ..Default::default() };
    config.save().unwrap();
    let loaded = Config::load().unwrap();

    match previous {
        Some(value) => std::env::set_var("HOME", value),
        None => std::env::remove_var("HOME"),
    }

    assert_eq!(loaded, config);
    assert_eq!(
        Config::load_from_path(home.path().join(".vdb.toml")).unwrap().breakpoints.first_id,
        42
    );
}
