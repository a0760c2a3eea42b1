//! Integration Test: 設定からのリゾルバー構築

use healthlb::config::load_resolver_config;
use healthlb::{HealthStatus, HealthzResolver, ResolverError, Resolver, Update, Watcher};
use healthlb_common::config::{EndpointConfig, ResolverConfig};
use healthlb_common::CommonError;
use serial_test::serial;
use std::io::Write;
use std::time::Duration;

use crate::support::healthz_server;

fn endpoint_config(address: &str, check_url: String) -> EndpointConfig {
    EndpointConfig {
        address: address.to_string(),
        check_url,
    }
}

#[tokio::test]
async fn test_from_config_without_endpoints_fails() {
    let result = HealthzResolver::from_config(&ResolverConfig::default()).await;
    assert!(matches!(result, Err(ResolverError::NoEndpoints)));
}

#[tokio::test]
async fn test_from_config_rejects_zero_interval() {
    let config = ResolverConfig {
        endpoints: vec![endpoint_config("a:1", "http://a:1/healthz".into())],
        update_interval_ms: 0,
        ..Default::default()
    };

    let result = HealthzResolver::from_config(&config).await;
    assert!(matches!(
        result,
        Err(ResolverError::Common(CommonError::Validation(_)))
    ));
}

#[tokio::test]
async fn test_from_config_applies_durations() {
    let srv = healthz_server(200).await;
    let config = ResolverConfig {
        endpoints: vec![endpoint_config(
            "10.0.0.1:9000",
            format!("{}/healthz", srv.uri()),
        )],
        check_timeout_ms: 1_500,
        update_interval_ms: 200,
        probe_timeout_ms: None,
    };

    let resolver = HealthzResolver::from_config(&config).await.unwrap();
    assert_eq!(resolver.options().check_timeout, Duration::from_millis(1_500));
    assert_eq!(resolver.options().update_interval, Duration::from_millis(200));
    assert_eq!(
        resolver.options().effective_probe_timeout(),
        Duration::from_millis(1_200)
    );

    let watcher = resolver.resolve("").unwrap();
    assert_eq!(
        watcher.next().await.unwrap(),
        vec![Update::add("10.0.0.1:9000")]
    );
    assert_eq!(resolver.statuses().await[0].status, HealthStatus::Healthy);

    resolver.close();
}

#[tokio::test]
#[serial]
async fn test_config_file_to_running_resolver() {
    let srv = healthz_server(200).await;
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
update_interval_ms = 100

[[endpoints]]
address = "10.0.0.1:9000"
check_target = "{}/healthz"
"#,
        srv.uri()
    )
    .unwrap();

    let config = load_resolver_config(Some(file.path())).unwrap();
    assert_eq!(config.endpoints[0].check_url, format!("{}/healthz", srv.uri()));

    let resolver = HealthzResolver::from_config(&config).await.unwrap();
    let watcher = resolver.resolve("").unwrap();
    assert_eq!(
        watcher.next().await.unwrap(),
        vec![Update::add("10.0.0.1:9000")]
    );
    watcher.close();
}
