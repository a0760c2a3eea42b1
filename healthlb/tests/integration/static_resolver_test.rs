//! Integration Test: StaticResolver
//!
//! ヘルスチェックを行わない固定アドレスリゾルバーの通知順序と終了処理。

use std::sync::Arc;
use std::time::Duration;

use healthlb::{Resolver, StaticResolver, Update, WatchError, Watcher};

#[tokio::test]
async fn test_static_resolver_emits_addresses_once_in_order() {
    let resolver = StaticResolver::new(["127.0.0.1:10000", "127.0.0.1:10001"]);
    let watcher = Arc::new(resolver.resolve("").unwrap());

    let updates = watcher.next().await.unwrap();
    assert_eq!(
        updates,
        vec![
            Update::add("127.0.0.1:10000"),
            Update::add("127.0.0.1:10001"),
        ]
    );

    // 2回目以降は何も届かない
    let result = tokio::time::timeout(Duration::from_millis(250), watcher.next()).await;
    assert!(result.is_err());

    let pending = {
        let watcher = Arc::clone(&watcher);
        tokio::spawn(async move { watcher.next().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    watcher.close();

    let result = tokio::time::timeout(Duration::from_secs(1), pending)
        .await
        .expect("close() must unblock a pending next()")
        .unwrap();
    assert_eq!(result, Err(WatchError::Closed));
}

#[tokio::test]
async fn test_static_resolver_watchers_are_independent() {
    let resolver = StaticResolver::new(vec!["a:1".to_string()]);

    let first = resolver.resolve("svc").unwrap();
    let second = resolver.resolve("svc").unwrap();
    first.close();

    assert_eq!(first.next().await, Err(WatchError::Closed));
    assert_eq!(second.next().await.unwrap(), vec![Update::add("a:1")]);
    second.close();
}
