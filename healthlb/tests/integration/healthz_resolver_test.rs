//! Integration Test: HealthzResolver
//!
//! 実HTTPサーバー（wiremock）に対するヘルスチェックと、
//! Watcher経由の更新通知を検証する。

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use healthlb::{
    EndpointSpec, HealthStatus, HealthzResolver, Resolver, ResolverOptions, Update, UpdateOp,
    WatchError, Watcher,
};

use crate::support::{endpoint, fast_options, healthz_server, set_delay, set_status, sorted};

/// 変化がない間は次のバッチが届かないことを確認する待ち時間
const QUIET_PERIOD: Duration = Duration::from_millis(500);

/// 2台とも正常 → E1がHTTP 502 → E1が復旧
#[tokio::test]
async fn test_two_endpoint_failover_scenario() {
    let srv1 = healthz_server(200).await;
    let srv2 = healthz_server(200).await;

    let resolver = HealthzResolver::new(
        vec![
            endpoint("10.0.0.1:9000", &srv1),
            endpoint("10.0.0.2:9000", &srv2),
        ],
        fast_options(),
    )
    .await
    .unwrap();
    let watcher = resolver.resolve("").unwrap();

    let updates = watcher.next().await.unwrap();
    assert_eq!(
        sorted(updates),
        vec![Update::add("10.0.0.1:9000"), Update::add("10.0.0.2:9000")]
    );

    // E1を停止するとDeleteが届く
    set_status(&srv1, 502).await;
    let updates = watcher.next().await.unwrap();
    assert_eq!(updates, vec![Update::delete("10.0.0.1:9000")]);

    // E1を復旧するとAddが届く
    set_status(&srv1, 200).await;
    let updates = watcher.next().await.unwrap();
    assert_eq!(updates, vec![Update::add("10.0.0.1:9000")]);

    watcher.close();
}

/// 全台正常なら最初のnext()で全アドレスのAddが1回ずつ届く
#[tokio::test]
async fn test_initial_baseline_contains_every_endpoint_once() {
    let mut servers = Vec::new();
    let mut endpoints = Vec::new();
    for i in 0..5 {
        let server = healthz_server(200).await;
        endpoints.push(endpoint(&format!("10.0.1.{i}:9000"), &server));
        servers.push(server);
    }

    let resolver = HealthzResolver::new(endpoints.clone(), fast_options())
        .await
        .unwrap();
    let watcher = resolver.resolve("ignored-service-name").unwrap();

    let updates = watcher.next().await.unwrap();
    assert_eq!(updates.len(), endpoints.len());
    assert!(updates.iter().all(|u| u.op == UpdateOp::Add));

    let addrs: HashSet<_> = updates.iter().map(|u| u.addr.as_str()).collect();
    let expected: HashSet<_> = endpoints.iter().map(|e| e.address.as_str()).collect();
    assert_eq!(addrs, expected);

    resolver.close();
}

/// 状態が変わらない間はnext()がブロックし続ける
#[tokio::test]
async fn test_steady_state_produces_no_batches() {
    let srv = healthz_server(200).await;

    let resolver = HealthzResolver::new(vec![endpoint("10.0.0.1:9000", &srv)], fast_options())
        .await
        .unwrap();
    let watcher = resolver.resolve("").unwrap();
    assert_eq!(watcher.next().await.unwrap().len(), 1);

    // 何ラウンドも経過するが通知はない
    let result = tokio::time::timeout(QUIET_PERIOD, watcher.next()).await;
    assert!(result.is_err(), "no batch expected while nothing changes");
    assert!(srv.received_requests().await.unwrap().len() >= 3);

    resolver.close();
}

/// 異常になったエンドポイントのDeleteは1回だけ
#[tokio::test]
async fn test_delete_is_edge_triggered() {
    let srv1 = healthz_server(200).await;
    let srv2 = healthz_server(200).await;

    let resolver = HealthzResolver::new(
        vec![
            endpoint("10.0.0.1:9000", &srv1),
            endpoint("10.0.0.2:9000", &srv2),
        ],
        fast_options(),
    )
    .await
    .unwrap();
    let watcher = resolver.resolve("").unwrap();
    assert_eq!(watcher.next().await.unwrap().len(), 2);

    set_status(&srv2, 503).await;
    assert_eq!(
        watcher.next().await.unwrap(),
        vec![Update::delete("10.0.0.2:9000")]
    );

    // 異常のままなら以降のラウンドでは何も届かない
    let result = tokio::time::timeout(QUIET_PERIOD, watcher.next()).await;
    assert!(result.is_err());

    resolver.close();
}

/// 最初から異常なエンドポイントは通知されず、正常になった時点でAddされる
#[tokio::test]
async fn test_initially_unhealthy_endpoint_joins_on_recovery() {
    let srv1 = healthz_server(200).await;
    let srv2 = healthz_server(500).await;

    let resolver = HealthzResolver::new(
        vec![
            endpoint("10.0.0.1:9000", &srv1),
            endpoint("10.0.0.2:9000", &srv2),
        ],
        fast_options(),
    )
    .await
    .unwrap();
    let watcher = resolver.resolve("").unwrap();

    assert_eq!(
        watcher.next().await.unwrap(),
        vec![Update::add("10.0.0.1:9000")]
    );

    set_status(&srv2, 204).await;
    assert_eq!(
        watcher.next().await.unwrap(),
        vec![Update::add("10.0.0.2:9000")]
    );

    resolver.close();
}

/// 接続できないエンドポイントがあっても他のエンドポイントは正しく判定される
#[tokio::test]
async fn test_unreachable_endpoint_does_not_affect_others() {
    let srv1 = healthz_server(200).await;
    let srv2 = healthz_server(200).await;
    let unreachable = EndpointSpec::new("10.0.0.3:9000", "http://127.0.0.1:1/healthz");

    let resolver = HealthzResolver::new(
        vec![
            endpoint("10.0.0.1:9000", &srv1),
            endpoint("10.0.0.2:9000", &srv2),
            unreachable,
        ],
        fast_options(),
    )
    .await
    .unwrap();
    let watcher = resolver.resolve("").unwrap();

    assert_eq!(
        sorted(watcher.next().await.unwrap()),
        vec![Update::add("10.0.0.1:9000"), Update::add("10.0.0.2:9000")]
    );

    let statuses = resolver.statuses().await;
    assert_eq!(statuses[2].address, "10.0.0.3:9000");
    assert_eq!(statuses[2].status, HealthStatus::Unhealthy);

    // 同じラウンドで他のエンドポイントの変化も反映される
    set_status(&srv1, 502).await;
    assert_eq!(
        watcher.next().await.unwrap(),
        vec![Update::delete("10.0.0.1:9000")]
    );

    resolver.close();
}

/// 応答の遅いエンドポイントはプローブ単位のタイムアウトで異常と判定され、
/// ラウンド自体は中断されない
#[tokio::test]
async fn test_slow_endpoint_is_marked_unhealthy() {
    let fast = healthz_server(200).await;
    let slow = healthz_server(200).await;
    set_delay(&slow, Duration::from_secs(3)).await;

    let options = ResolverOptions::default()
        .with_check_timeout(Duration::from_secs(1))
        .with_probe_timeout(Duration::from_millis(200))
        .with_update_interval(Duration::from_millis(100));
    let resolver = HealthzResolver::new(
        vec![
            endpoint("10.0.0.1:9000", &fast),
            endpoint("10.0.0.2:9000", &slow),
        ],
        options,
    )
    .await
    .unwrap();
    let watcher = resolver.resolve("").unwrap();

    assert_eq!(
        watcher.next().await.unwrap(),
        vec![Update::add("10.0.0.1:9000")]
    );
    assert_eq!(
        resolver.statuses().await[1].status,
        HealthStatus::Unhealthy
    );

    resolver.close();
}

/// close()は冪等で、待機中・以降のnext()を終端エラーで返す
#[tokio::test]
async fn test_close_unblocks_waiting_consumer() {
    let srv = healthz_server(200).await;

    let resolver = HealthzResolver::new(vec![endpoint("10.0.0.1:9000", &srv)], fast_options())
        .await
        .unwrap();
    let watcher = Arc::new(resolver.resolve("").unwrap());
    assert_eq!(watcher.next().await.unwrap().len(), 1);

    let pending = {
        let watcher = Arc::clone(&watcher);
        tokio::spawn(async move { watcher.next().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    resolver.close();
    resolver.close();

    let result = tokio::time::timeout(Duration::from_secs(1), pending)
        .await
        .expect("pending next() must be unblocked by close()")
        .unwrap();
    assert_eq!(result, Err(WatchError::Closed));
    assert_eq!(watcher.next().await, Err(WatchError::Closed));

    // スケジューラーも停止する
    tokio::time::sleep(Duration::from_millis(150)).await;
    let requests = srv.received_requests().await.unwrap().len();
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(srv.received_requests().await.unwrap().len(), requests);
}

/// 空のエンドポイント一覧では構築できない
#[tokio::test]
async fn test_empty_endpoint_list_is_rejected() {
    let result = HealthzResolver::new(Vec::new(), fast_options()).await;
    assert!(matches!(result, Err(healthlb::ResolverError::NoEndpoints)));
}
