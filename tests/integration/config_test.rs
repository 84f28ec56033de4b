//! Configuration tests

use stock_pulse::config::{Config, LogFormatConfig};

#[test]
fn test_config_example_loads() {
    let config = Config::load(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml.example")).unwrap();

    assert_eq!(config.server.bind, "127.0.0.1:8000");
    assert_eq!(config.refresh.interval_secs, 10);
    assert_eq!(config.hub.subscriber_capacity, 64);
    assert_eq!(config.telemetry.log_format, LogFormatConfig::Pretty);
}

#[test]
fn test_minimal_config_uses_defaults() {
    let toml = r#"
        [server]
        bind = "0.0.0.0:9000"

        [storage]
        database_url = "sqlite::memory:"

        [quote]
        base_url = "http://localhost:1234"

        [telemetry]
        log_level = "debug"
        log_format = "json"
    "#;

    let config: Config = toml::from_str(toml).unwrap();
    assert_eq!(config.storage.max_connections, 5);
    assert!(config.refresh.enabled);
    assert_eq!(config.refresh.max_concurrent_fetches, 4);
    assert_eq!(config.telemetry.log_format, LogFormatConfig::Json);
    assert!(config.telemetry.metrics_port.is_none());
}
