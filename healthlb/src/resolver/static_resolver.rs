//! 固定アドレスリゾルバー
//!
//! ヘルスチェックを行わず、指定されたアドレス一覧を一度だけ通知する。

use super::{Resolver, Watcher};
use crate::error::{ResolverError, WatchError};
use crate::lifecycle::Lifecycle;
use async_trait::async_trait;
use healthlb_common::{Update, UpdateBatch};
use tokio::sync::Mutex;

/// 固定アドレスリゾルバー
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    addrs: Vec<String>,
}

impl StaticResolver {
    /// 新しい固定アドレスリゾルバーを作成
    pub fn new<I, S>(addrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            addrs: addrs.into_iter().map(Into::into).collect(),
        }
    }
}

impl Resolver for StaticResolver {
    type Watcher = StaticWatcher;

    fn resolve(&self, _target: &str) -> Result<StaticWatcher, ResolverError> {
        let initial: UpdateBatch = self.addrs.iter().map(Update::add).collect();
        Ok(StaticWatcher {
            initial: Mutex::new((!initial.is_empty()).then_some(initial)),
            lifecycle: Lifecycle::new(),
        })
    }
}

/// 固定アドレスリゾルバーのWatcher
///
/// 最初の `next()` で全アドレスの `Add` を指定順に返し、以降は `close()` まで待つ。
#[derive(Debug)]
pub struct StaticWatcher {
    initial: Mutex<Option<UpdateBatch>>,
    lifecycle: Lifecycle,
}

#[async_trait]
impl Watcher for StaticWatcher {
    async fn next(&self) -> Result<UpdateBatch, WatchError> {
        if self.lifecycle.is_closed() {
            return Err(WatchError::Closed);
        }
        if let Some(batch) = self.initial.lock().await.take() {
            return Ok(batch);
        }
        self.lifecycle.closed().await;
        Err(WatchError::Closed)
    }

    fn close(&self) {
        self.lifecycle.close();
    }
}
