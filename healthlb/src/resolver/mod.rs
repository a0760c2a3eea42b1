//! アドレスリゾルバー
//!
//! サービス名をエンドポイント集合に解決し、その変化を
//! [`Watcher`] 経由で更新バッチとして通知する。

pub mod channel;
pub mod diff;
pub mod endpoints;
pub mod healthz;
pub mod lookup;
pub mod static_resolver;

use crate::error::{ResolverError, WatchError};
use async_trait::async_trait;
use healthlb_common::UpdateBatch;

pub use endpoints::{EndpointSet, EndpointSnapshot};
pub use healthz::{HealthzResolver, HealthzWatcher, ResolverOptions};
pub use lookup::{EndpointLookup, StaticLookup};
pub use static_resolver::{StaticResolver, StaticWatcher};

/// 更新バッチのプル型ストリーム
///
/// 利用者は1つを想定する。
#[async_trait]
pub trait Watcher: Send + Sync {
    /// 次の更新バッチを待つ
    ///
    /// 最初の呼び出しは初期メンバーシップを返す。エラーは `close()` 後の
    /// [`WatchError::Closed`] のみ。
    async fn next(&self) -> Result<UpdateBatch, WatchError>;

    /// Watcherを閉じる（冪等）
    fn close(&self);
}

/// サービス名から [`Watcher`] を作成する
pub trait Resolver {
    /// このリゾルバーが返すWatcher
    type Watcher: Watcher;

    /// `target` の更新を監視するWatcherを作成
    fn resolve(&self, target: &str) -> Result<Self::Watcher, ResolverError>;
}
