//! 設定管理
//!
//! ResolverConfig, EndpointConfig等の設定構造体

use crate::error::CommonError;
use crate::types::EndpointSpec;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// リゾルバー設定
///
/// 設定ファイル・環境変数から読み込む宣言的な設定。
/// 省略されたフィールドにはデフォルト値が適用される。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolverConfig {
    /// ヘルスチェック対象のエンドポイント一覧（必須・1件以上）
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,

    /// 1ラウンドのヘルスチェック全体に許す時間（ミリ秒）(デフォルト: 5000)
    #[serde(default = "default_check_timeout_ms")]
    pub check_timeout_ms: u64,

    /// ラウンド間隔（ミリ秒）(デフォルト: 30000)
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,

    /// 個々のプローブのタイムアウト（ミリ秒）
    ///
    /// 未指定の場合は `check_timeout_ms` の4/5。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_timeout_ms: Option<u64>,
}

/// エンドポイント設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndpointConfig {
    /// 接続先アドレス（host:port）
    pub address: String,
    /// ヘルスチェックURL
    #[serde(alias = "check_target")]
    pub check_url: String,
}

fn default_check_timeout_ms() -> u64 {
    5_000
}

fn default_update_interval_ms() -> u64 {
    30_000
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            check_timeout_ms: default_check_timeout_ms(),
            update_interval_ms: default_update_interval_ms(),
            probe_timeout_ms: None,
        }
    }
}

impl ResolverConfig {
    /// ラウンドのタイムアウト
    pub fn check_timeout(&self) -> Duration {
        Duration::from_millis(self.check_timeout_ms)
    }

    /// ラウンド間隔
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    /// プローブ単位のタイムアウト（明示指定がある場合のみ）
    pub fn probe_timeout(&self) -> Option<Duration> {
        self.probe_timeout_ms.map(Duration::from_millis)
    }

    /// エンドポイント定義に変換
    pub fn endpoint_specs(&self) -> Vec<EndpointSpec> {
        self.endpoints
            .iter()
            .map(|e| EndpointSpec::new(e.address.clone(), e.check_url.clone()))
            .collect()
    }

    /// 設定値を検証
    pub fn validate(&self) -> Result<(), CommonError> {
        if self.endpoints.is_empty() {
            return Err(CommonError::Validation("no endpoints specified".into()));
        }
        if let Some(ep) = self.endpoints.iter().find(|e| e.address.trim().is_empty()) {
            return Err(CommonError::Validation(format!(
                "endpoint with check_url '{}' has an empty address",
                ep.check_url
            )));
        }
        if self.check_timeout_ms == 0 {
            return Err(CommonError::Validation(
                "check_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.update_interval_ms == 0 {
            return Err(CommonError::Validation(
                "update_interval_ms must be greater than 0".into(),
            ));
        }
        if self.probe_timeout_ms == Some(0) {
            return Err(CommonError::Validation(
                "probe_timeout_ms must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
