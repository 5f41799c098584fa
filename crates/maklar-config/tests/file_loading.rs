//! Loading configuration files from disk.

use maklar_config::{ConfigError, ConfigLoader};
use maklar_middleware::SanitizationProfile;
use maklar_schema::EnergyClass;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_complete_toml_file() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "maklar.toml",
        r#"
            [validation]
            form_mode = "on_blur"
            include_params = true

            [messages]
            default_locale = "en"
            supported_locales = ["en", "sv"]
            catalog_dir = "/etc/maklar/catalogs"

            [messages.cache]
            max_entries = 250
            ttl_secs = 30

            [policy]
            accepted_price_tolerance = 0.1

            [policy.price_ratio]
            min = 0.6
            max = 1.4

            [policy.energy_bands]
            A = 40
            B = 70
            C = 100
            D = 150
            E = 200
            F = 300
            G = 500

            [http]
            expose_internal_errors = false
            trust_request_id = true
            sanitization = "strict"

            [logging]
            level = "maklar_messages=debug,info"
            format = "pretty"

            [metrics]
            enabled = true
            listen_addr = "127.0.0.1:9091"
        "#,
    );

    let config = ConfigLoader::new().with_file(&path).unwrap().load().unwrap();

    assert!(config.validation.include_params);
    assert_eq!(config.messages.default_locale, "en");
    assert_eq!(config.messages.catalog_dir, Some(PathBuf::from("/etc/maklar/catalogs")));
    assert_eq!(config.messages.cache.max_entries, 250);
    assert!((config.policy.price_ratio.min - 0.6).abs() < f64::EPSILON);
    assert_eq!(config.policy.energy_bands.range(EnergyClass::B), Some((40.0, 70.0)));
    assert_eq!(config.http.sanitization, SanitizationProfile::Strict);
    assert_eq!(config.metrics.listen_addr.as_deref(), Some("127.0.0.1:9091"));
}

#[test]
fn test_json_file_over_toml_file() {
    let dir = TempDir::new().unwrap();
    let base = write(
        &dir,
        "base.toml",
        "[messages.cache]\nmax_entries = 50\nttl_secs = 10\n",
    );
    let site = write(&dir, "site.JSON", r#"{"messages": {"cache": {"ttl_secs": 99}}}"#);

    let loader = ConfigLoader::new()
        .with_file(&base)
        .unwrap()
        .with_file(&site)
        .unwrap();
    assert_eq!(loader.files_loaded(), &[base, site]);

    let config = loader.load().unwrap();
    assert_eq!(config.messages.cache.max_entries, 50);
    assert_eq!(config.messages.cache.ttl_secs, 99);
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "maklar.yaml", "messages: {}");

    let err = ConfigLoader::new().with_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
    assert!(err.to_string().contains("maklar.yaml"));
}

#[test]
fn test_malformed_toml() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "maklar.toml", "[messages\ndefault_locale = ");

    let err = ConfigLoader::new().with_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::TomlError(_)));
}

#[test]
fn test_file_values_are_validated_on_load() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "maklar.toml", "[policy.price_ratio]\nmin = 2.0\nmax = 1.0\n");

    let err = ConfigLoader::new().with_file(&path).unwrap().load().unwrap_err();
    match err {
        ConfigError::InvalidValue { field, .. } => assert_eq!(field, "policy.price_ratio"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_optional_file_present() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "maklar.toml", "[http]\ntrust_request_id = true\n");

    let config = ConfigLoader::new()
        .with_optional_file(&path)
        .unwrap()
        .load()
        .unwrap();
    assert!(config.http.trust_request_id);
}
