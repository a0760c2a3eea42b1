//! ヘルス状態の差分計算
//!
//! 前回と今回のヘルス状態を比較し、OK/非OKの境界をまたいだ
//! エンドポイントについてのみ更新イベントを生成する（エッジトリガー）。

use healthlb_common::{EndpointSpec, HealthStatus, Update, UpdateBatch, UpdateOp};

/// 1エンドポイント分の状態遷移から更新種別を決定
///
/// `Unknown` と `Unhealthy` はどちらも非OKとして扱うため、
/// その間の遷移ではイベントは発生しない。
pub fn transition(previous: HealthStatus, current: HealthStatus) -> Option<UpdateOp> {
    match (previous.is_ok(), current.is_ok()) {
        (true, false) => Some(UpdateOp::Delete),
        (false, true) => Some(UpdateOp::Add),
        _ => None,
    }
}

/// 全エンドポイントの差分から更新バッチを生成
///
/// `previous` と `current` は `endpoints` と同じ順序・同じ長さであること。
pub fn diff(
    endpoints: &[EndpointSpec],
    previous: &[HealthStatus],
    current: &[HealthStatus],
) -> UpdateBatch {
    debug_assert_eq!(endpoints.len(), previous.len());
    debug_assert_eq!(endpoints.len(), current.len());

    endpoints
        .iter()
        .zip(previous.iter().zip(current.iter()))
        .filter_map(|(endpoint, (&before, &after))| {
            transition(before, after).map(|op| Update {
                op,
                addr: endpoint.address.clone(),
            })
        })
        .collect()
}
