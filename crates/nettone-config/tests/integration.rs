//! File round-trips for nettone-config.

use nettone_config::{ConfigError, SynthConfig};
use tempfile::tempdir;

#[test]
fn save_then_load_preserves_every_field() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = SynthConfig::default();
    config.sample_rate = 48000;
    config.control.bind_address = "127.0.0.1".to_string();
    config.control.port = 7001;
    config.output.device = Some("USB".to_string());
    config.output.buffer_blocks = 4;
    config.fm.velocity = 90;

    config.save(&path).unwrap();
    assert!(path.exists());
    assert_eq!(SynthConfig::load(&path).unwrap(), config);
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = SynthConfig::load_or_default(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
}

#[test]
fn load_or_default_validates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "sample_rate = 0\n").unwrap();

    assert!(SynthConfig::load(&path).is_ok());
    let err = SynthConfig::load_or_default(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field: "sample_rate", .. }));
}

#[test]
fn malformed_file_reports_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[control\nport = 1").unwrap();
    assert!(matches!(
        SynthConfig::load(&path),
        Err(ConfigError::TomlParse(_))
    ));
}
