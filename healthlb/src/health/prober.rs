//! エンドポイントプローバー
//!
//! チェックURLへのGETリクエストで稼働状況を判定する。
//! 2xx応答のみ正常、それ以外の応答・接続失敗・タイムアウトは異常。

use crate::error::{ProbeError, RoundError};
use async_trait::async_trait;
use healthlb_common::{EndpointSpec, HealthStatus};
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

/// 単一エンドポイントのヘルスチェック手段
///
/// 外部から差し替え可能にしておき、テストではHTTP以外の実装も使う。
#[async_trait]
pub trait Prober: Send + Sync {
    /// `check_url` に1回だけプローブする（リトライなし）
    async fn probe(&self, check_url: &str) -> Result<(), ProbeError>;
}

/// HTTPによるプローバー
#[derive(Clone, Debug)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    /// プローブ単位のタイムアウトを指定して作成
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, check_url: &str) -> Result<(), ProbeError> {
        let response = self.client.get(check_url).send().await?;
        let code = response.status().as_u16();
        if HealthStatus::from_status_code(code).is_ok() {
            Ok(())
        } else {
            Err(ProbeError::Status(code))
        }
    }
}

/// 単一エンドポイントをプローブし、結果をヘルス状態に分類する
async fn probe_endpoint(prober: &dyn Prober, endpoint: &EndpointSpec) -> HealthStatus {
    let start = Instant::now();
    let result = prober.probe(&endpoint.check_url).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(()) => {
            debug!(
                address = %endpoint.address,
                latency_ms = latency_ms,
                "Health check succeeded"
            );
            HealthStatus::Healthy
        }
        Err(e) => {
            warn!(
                address = %endpoint.address,
                latency_ms = latency_ms,
                error = %e,
                "Health check failed"
            );
            HealthStatus::Unhealthy
        }
    }
}

/// 全エンドポイントを並列チェック
///
/// 戻り値は `endpoints` と同じ順序のヘルス状態。個々のプローブ失敗は
/// `Unhealthy` として記録されるだけでラウンドは失敗しない。`timeout` 内に
/// 全プローブが完了しなかった場合のみ [`RoundError::DeadlineExceeded`] を返し、
/// 実行中のプローブは中断される。
pub async fn probe_all(
    prober: Arc<dyn Prober>,
    endpoints: &[EndpointSpec],
    timeout: Duration,
) -> Result<Vec<HealthStatus>, RoundError> {
    let mut tasks = JoinSet::new();
    for (index, endpoint) in endpoints.iter().enumerate() {
        let prober = Arc::clone(&prober);
        let endpoint = endpoint.clone();
        tasks.spawn(async move { (index, probe_endpoint(prober.as_ref(), &endpoint).await) });
    }

    // Join errors (a panicking prober) leave the endpoint unhealthy.
    let mut statuses = vec![HealthStatus::Unhealthy; endpoints.len()];
    let collected = tokio::time::timeout(timeout, async {
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, status)) => statuses[index] = status,
                Err(e) => error!("Probe task join error: {}", e),
            }
        }
    })
    .await;

    if collected.is_err() {
        tasks.abort_all();
        return Err(RoundError::DeadlineExceeded(timeout));
    }

    let healthy = statuses.iter().filter(|s| s.is_ok()).count();
    debug!(
        healthy = healthy,
        unhealthy = statuses.len() - healthy,
        "Health check round completed"
    );

    Ok(statuses)
}
