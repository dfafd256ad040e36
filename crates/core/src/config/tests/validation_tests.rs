use crate::config::models::{DistributedConfig, LoadBalancingStrategy, ObservabilityConfig};
use dtest_errors::CoordinatorError;

#[test]
fn test_distributed_config_default_is_valid() {
    let config = DistributedConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(
        config.load_balancing_strategy().unwrap(),
        LoadBalancingStrategy::RoundRobin
    );
    assert_eq!(config.coordinator_bind_address(), "127.0.0.1:8080");
}

#[test]
fn test_distributed_config_validation() {
    let mut config = DistributedConfig::default();

    config.heartbeat_interval_seconds = 0;
    assert!(config.validate().is_err());
    config.heartbeat_interval_seconds = 30;

    config.worker_timeout_seconds = 0;
    assert!(config.validate().is_err());

    // 超时时间必须大于心跳间隔
    config.worker_timeout_seconds = 30;
    assert!(config.validate().is_err());
    config.worker_timeout_seconds = 31;
    assert!(config.validate().is_ok());

    config.max_workers = 0;
    assert!(config.validate().is_err());
    config.max_workers = 1;

    config.bind_address = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_unknown_strategy_is_configuration_error() {
    let config = DistributedConfig {
        load_balancing: "random".to_string(),
        ..Default::default()
    };

    match config.validate() {
        Err(CoordinatorError::Configuration(msg)) => assert!(msg.contains("random")),
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn test_strategy_round_trip_names() {
    for name in LoadBalancingStrategy::ALL {
        let strategy: LoadBalancingStrategy = name.parse().unwrap();
        assert_eq!(strategy.to_string(), name);
    }
    assert_eq!(
        "least_loaded".parse::<LoadBalancingStrategy>().unwrap(),
        LoadBalancingStrategy::LeastLoaded
    );
}

#[test]
fn test_duration_helpers() {
    let config = DistributedConfig {
        heartbeat_interval_seconds: 5,
        worker_timeout_seconds: 120,
        ..Default::default()
    };
    assert_eq!(config.worker_timeout(), chrono::Duration::minutes(2));
    assert_eq!(config.heartbeat_interval(), std::time::Duration::from_secs(5));
}

#[test]
fn test_observability_validation() {
    let mut config = ObservabilityConfig::default();
    assert!(config.validate().is_ok());

    config.log_level = "verbose".to_string();
    assert!(config.validate().is_err());
    config.log_level = "debug".to_string();

    config.log_format = "xml".to_string();
    assert!(config.validate().is_err());
    config.log_format = "json".to_string();

    config.metrics_enabled = true;
    config.metrics_bind_address = "not-an-address".to_string();
    assert!(config.validate().is_err());
    config.metrics_bind_address = "0.0.0.0:9100".to_string();
    assert!(config.validate().is_ok());
}
