//! ヘルスチェック付きリゾルバー
//!
//! 固定のエンドポイント集合に対して定期的にヘルスチェックを行い、
//! トラフィック対象になった/外れたアドレスを更新バッチとして通知する。
//!
//! - 構築時に1ラウンドを同期的に実行し、正常なエンドポイントの `Add` を
//!   最初の `next()` で返す
//! - 以降は `update_interval` ごとに1ラウンド実行する（ラウンドは重ならない）
//! - ラウンドが `check_timeout` 内に完了しない場合は結果を破棄し、次の周期で再試行する
//! - `close()` でスケジューラーを停止し、待機中の `next()` を解除する

use super::channel::{update_channel, UpdateReceiver, UpdateSender};
use super::endpoints::{EndpointSet, EndpointSnapshot};
use super::lookup::EndpointLookup;
use super::{Resolver, Watcher};
use crate::error::{ResolverError, RoundError, WatchError};
use crate::health::{probe_all, HttpProber, Prober};
use crate::lifecycle::Lifecycle;
use async_trait::async_trait;
use healthlb_common::config::ResolverConfig;
use healthlb_common::CommonError;
use healthlb_common::{EndpointSpec, UpdateBatch, UpdateOp};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// デフォルトのラウンドタイムアウト（秒）
const DEFAULT_CHECK_TIMEOUT_SECS: u64 = 5;

/// デフォルトのラウンド間隔（秒）
const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 30;

/// リゾルバーの実行オプション
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverOptions {
    /// 1ラウンド全体の期限
    pub check_timeout: Duration,
    /// ラウンド間隔
    pub update_interval: Duration,
    /// プローブ単位のタイムアウト（未指定なら `check_timeout` の4/5）
    pub probe_timeout: Option<Duration>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            check_timeout: Duration::from_secs(DEFAULT_CHECK_TIMEOUT_SECS),
            update_interval: Duration::from_secs(DEFAULT_UPDATE_INTERVAL_SECS),
            probe_timeout: None,
        }
    }
}

impl ResolverOptions {
    /// ラウンドタイムアウトを設定
    pub fn with_check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = timeout;
        self
    }

    /// ラウンド間隔を設定
    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    /// プローブ単位のタイムアウトを設定
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = Some(timeout);
        self
    }

    /// 実際に使うプローブ単位のタイムアウト
    ///
    /// ラウンド期限より短くしておくことで、応答しないエンドポイントは
    /// ラウンド中断ではなく `Unhealthy` として扱われる。
    pub fn effective_probe_timeout(&self) -> Duration {
        self.probe_timeout
            .unwrap_or_else(|| self.check_timeout - self.check_timeout / 5)
    }

    /// 設定値を検証（ゼロの期間は不可）
    pub fn validate(&self) -> Result<(), CommonError> {
        if self.check_timeout.is_zero() {
            return Err(CommonError::Validation(
                "check_timeout must be greater than 0".into(),
            ));
        }
        if self.update_interval.is_zero() {
            return Err(CommonError::Validation(
                "update_interval must be greater than 0".into(),
            ));
        }
        if self.probe_timeout.is_some_and(|t| t.is_zero()) {
            return Err(CommonError::Validation(
                "probe_timeout must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

impl From<&ResolverConfig> for ResolverOptions {
    fn from(config: &ResolverConfig) -> Self {
        Self {
            check_timeout: config.check_timeout(),
            update_interval: config.update_interval(),
            probe_timeout: config.probe_timeout(),
        }
    }
}

/// スケジューラーとリゾルバーで共有する状態
struct Shared {
    endpoints: EndpointSet,
    prober: Arc<dyn Prober>,
    options: ResolverOptions,
    lifecycle: Lifecycle,
    sender: UpdateSender,
    /// ラウンドを直列化する
    round: Mutex<()>,
}

impl Shared {
    /// 1ラウンド実行し、差分を返す（呼び出し側でラウンドロックを保持すること）
    async fn run_round(&self) -> Result<UpdateBatch, RoundError> {
        if self.lifecycle.is_closed() {
            return Err(RoundError::Closed);
        }

        let statuses = probe_all(
            Arc::clone(&self.prober),
            self.endpoints.specs(),
            self.options.check_timeout,
        )
        .await?;

        // close() 後に完了したラウンドの結果は反映しない
        if self.lifecycle.is_closed() {
            return Err(RoundError::Closed);
        }
        Ok(self.endpoints.apply_statuses(statuses).await)
    }

    /// ラウンドを実行し、変化があれば通知する
    ///
    /// ラウンドの失敗はログに記録するだけで呼び出し元には返さない。
    /// 送信が終わるまでラウンドロックを保持し、バッチをラウンドの完了順に並べる。
    async fn run_and_publish(&self) -> Result<(), WatchError> {
        let _round = self.round.lock().await;
        match self.run_round().await {
            Ok(updates) => {
                if updates.is_empty() {
                    debug!("No membership changes");
                    return Ok(());
                }
                let added = updates.iter().filter(|u| u.op == UpdateOp::Add).count();
                info!(
                    added = added,
                    deleted = updates.len() - added,
                    "Endpoint membership changed"
                );
                self.sender.send(updates).await
            }
            Err(RoundError::Closed) => Err(WatchError::Closed),
            Err(e) => {
                warn!(error = %e, "Discarding health check round");
                Ok(())
            }
        }
    }
}

/// バックグラウンドのスケジューラー
struct Scheduler {
    shared: Arc<Shared>,
}

impl Scheduler {
    /// 監視ループ
    async fn run(self) {
        let period = self.shared.options.update_interval;
        // 初回ラウンドは構築時に実行済みなので、1周期後から開始する
        let Some(start) = Instant::now().checked_add(period) else {
            // 周期が表現できないほど長い場合は定期ラウンドなし
            debug!("Update interval out of range, scheduler idle until close");
            self.shared.lifecycle.closed().await;
            return;
        };
        let mut timer = interval_at(start, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            endpoints = self.shared.endpoints.len(),
            interval_ms = period.as_millis() as u64,
            "Health check scheduler started"
        );

        loop {
            tokio::select! {
                biased;
                _ = self.shared.lifecycle.closed() => break,
                _ = self.shared.sender.receiver_dropped() => break,
                _ = timer.tick() => {}
            }

            let round = tokio::select! {
                biased;
                _ = self.shared.lifecycle.closed() => break,
                result = self.shared.run_and_publish() => result,
            };
            if round.is_err() {
                break;
            }
        }

        info!("Health check scheduler stopped");
    }
}

/// ヘルスチェック付きリゾルバー
///
/// `resolve()` が返す [`HealthzWatcher`] は全て同じ更新ストリームを共有する。
/// リゾルバーとWatcherが全て破棄されるとスケジューラーも停止する。
pub struct HealthzResolver {
    shared: Arc<Shared>,
    updates: Arc<UpdateReceiver>,
}

impl std::fmt::Debug for HealthzResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthzResolver")
            .field("endpoints", &self.shared.endpoints.specs())
            .field("options", &self.shared.options)
            .field("closed", &self.shared.lifecycle.is_closed())
            .finish()
    }
}

impl HealthzResolver {
    /// HTTPプローバーでリゾルバーを作成
    ///
    /// 初回ラウンドを実行してからバックグラウンドのスケジューラーを起動する。
    /// 初回ラウンドで正常なエンドポイントが無くてもエラーにはならない。
    pub async fn new(
        endpoints: Vec<EndpointSpec>,
        options: ResolverOptions,
    ) -> Result<Self, ResolverError> {
        let prober = HttpProber::new(options.effective_probe_timeout())?;
        Self::with_prober(endpoints, options, Arc::new(prober)).await
    }

    /// 宣言的な設定からリゾルバーを作成
    pub async fn from_config(config: &ResolverConfig) -> Result<Self, ResolverError> {
        if config.endpoints.is_empty() {
            return Err(ResolverError::NoEndpoints);
        }
        config.validate()?;
        Self::new(config.endpoint_specs(), ResolverOptions::from(config)).await
    }

    /// サービスディレクトリから取得したエンドポイントでリゾルバーを作成
    pub async fn from_lookup(
        lookup: &dyn EndpointLookup,
        service: &str,
        options: ResolverOptions,
    ) -> Result<Self, ResolverError> {
        let endpoints = lookup
            .lookup(service)
            .await
            .map_err(|message| ResolverError::Lookup {
                service: service.to_string(),
                message,
            })?;
        Self::new(endpoints, options).await
    }

    /// 任意のプローバーでリゾルバーを作成
    pub async fn with_prober(
        endpoints: Vec<EndpointSpec>,
        options: ResolverOptions,
        prober: Arc<dyn Prober>,
    ) -> Result<Self, ResolverError> {
        options.validate()?;
        let endpoints = EndpointSet::new(endpoints)?;
        let lifecycle = Lifecycle::new();
        let (sender, receiver) = update_channel(endpoints.len(), lifecycle.clone());

        let shared = Arc::new(Shared {
            endpoints,
            prober,
            options,
            lifecycle,
            sender,
            round: Mutex::new(()),
        });

        // Initial membership must be queued before the first next() call.
        if let Err(e) = shared.run_and_publish().await {
            warn!(error = %e, "Initial health check could not be published");
        }

        tokio::spawn(
            Scheduler {
                shared: Arc::clone(&shared),
            }
            .run(),
        );

        Ok(Self {
            shared,
            updates: Arc::new(receiver),
        })
    }

    /// 即座に1ラウンド実行する（手動チェック用）
    ///
    /// 変化があれば通常のラウンドと同様に通知される。定期ラウンドとは重ならない。
    pub async fn check_now(&self) -> Result<(), WatchError> {
        if self.shared.lifecycle.is_closed() {
            return Err(WatchError::Closed);
        }
        self.shared.run_and_publish().await
    }

    /// 全エンドポイントの現在の状態
    pub async fn statuses(&self) -> Vec<EndpointSnapshot> {
        self.shared.endpoints.snapshots().await
    }

    /// 実行オプション
    pub fn options(&self) -> &ResolverOptions {
        &self.shared.options
    }

    /// リゾルバーを閉じる（冪等）
    ///
    /// スケジューラーを停止し、全Watcherの `next()` を `Closed` で解除する。
    pub fn close(&self) {
        if self.shared.lifecycle.close() {
            info!("Resolver closed");
        }
    }

    /// `close()` 済みか
    pub fn is_closed(&self) -> bool {
        self.shared.lifecycle.is_closed()
    }
}

impl Resolver for HealthzResolver {
    type Watcher = HealthzWatcher;

    /// `target` は使用しない（リゾルバーごとに単一のエンドポイント集合）
    fn resolve(&self, _target: &str) -> Result<HealthzWatcher, ResolverError> {
        Ok(HealthzWatcher {
            updates: Arc::clone(&self.updates),
        })
    }
}

/// [`HealthzResolver`] のWatcher
#[derive(Debug, Clone)]
pub struct HealthzWatcher {
    updates: Arc<UpdateReceiver>,
}

#[async_trait]
impl Watcher for HealthzWatcher {
    async fn next(&self) -> Result<UpdateBatch, WatchError> {
        self.updates.next().await
    }

    fn close(&self) {
        self.updates.close();
    }
}
