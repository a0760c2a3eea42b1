//! エンドポイント集合
//!
//! 構築時に固定される候補エンドポイントと、その最新ヘルス状態を保持する。
//! ヘルス状態は集合全体で1つのロックで保護し、差分計算と状態更新を
//! 同じクリティカルセクションで行うことで一貫したスナップショットを保証する。

use super::diff::diff;
use crate::error::ResolverError;
use chrono::{DateTime, Utc};
use healthlb_common::{EndpointSpec, HealthStatus, UpdateBatch};
use serde::Serialize;
use tokio::sync::Mutex;

/// エンドポイントの状態スナップショット（チェックURLは含まない）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointSnapshot {
    /// 接続先アドレス
    pub address: String,
    /// 最新のヘルス状態
    pub status: HealthStatus,
    /// 最後にラウンド結果が反映された時刻
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
struct HealthState {
    statuses: Vec<HealthStatus>,
    checked_at: Option<DateTime<Utc>>,
}

/// 候補エンドポイント集合
///
/// エンドポイントの追加・削除はできない。インデックスがエンドポイントの識別子。
#[derive(Debug)]
pub struct EndpointSet {
    endpoints: Vec<EndpointSpec>,
    state: Mutex<HealthState>,
}

impl EndpointSet {
    /// 新しいエンドポイント集合を作成
    ///
    /// 全エンドポイントは `Unknown` から開始する。空の場合は
    /// [`ResolverError::NoEndpoints`]。
    pub fn new(endpoints: Vec<EndpointSpec>) -> Result<Self, ResolverError> {
        if endpoints.is_empty() {
            return Err(ResolverError::NoEndpoints);
        }
        let statuses = vec![HealthStatus::Unknown; endpoints.len()];
        Ok(Self {
            endpoints,
            state: Mutex::new(HealthState {
                statuses,
                checked_at: None,
            }),
        })
    }

    /// エンドポイント定義一覧
    pub fn specs(&self) -> &[EndpointSpec] {
        &self.endpoints
    }

    /// エンドポイント数
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// 常に false（空の集合は構築できない）
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// ラウンド結果を反映し、前回との差分を返す
    ///
    /// 前回状態の読み出し・差分計算・書き込みは1つのロック内で行う。
    pub async fn apply_statuses(&self, statuses: Vec<HealthStatus>) -> UpdateBatch {
        debug_assert_eq!(statuses.len(), self.endpoints.len());

        let mut state = self.state.lock().await;
        let updates = diff(&self.endpoints, &state.statuses, &statuses);
        state.statuses = statuses;
        state.checked_at = Some(Utc::now());
        updates
    }

    /// 全エンドポイントのスナップショット
    pub async fn snapshots(&self) -> Vec<EndpointSnapshot> {
        let state = self.state.lock().await;
        self.endpoints
            .iter()
            .zip(state.statuses.iter())
            .map(|(endpoint, status)| EndpointSnapshot {
                address: endpoint.address.clone(),
                status: *status,
                checked_at: state.checked_at,
            })
            .collect()
    }
}
