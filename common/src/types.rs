//! 共通型定義
//!
//! エンドポイント、ヘルス状態、メンバーシップ更新イベント等のコアデータ型

use serde::{Deserialize, Serialize};

/// ヘルスチェック対象のエンドポイント定義
///
/// `address` はロードバランサーに公開される値、`check_url` はヘルスチェック専用で
/// 利用者には公開されない。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EndpointSpec {
    /// 接続先アドレス（例: "127.0.0.1:10000"）
    pub address: String,
    /// ヘルスチェックURL（例: "http://127.0.0.1:10000/healthz"）
    pub check_url: String,
}

impl EndpointSpec {
    /// 新しいエンドポイント定義を作成
    pub fn new(address: impl Into<String>, check_url: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            check_url: check_url.into(),
        }
    }
}

/// エンドポイントのヘルス状態
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// 初期状態（未確認）
    #[default]
    Unknown,
    /// 正常
    Healthy,
    /// 異常
    Unhealthy,
}

impl HealthStatus {
    /// HTTPステータスコードから分類する（200..=299のみ正常）
    pub fn from_status_code(code: u16) -> Self {
        if (200..300).contains(&code) {
            Self::Healthy
        } else {
            Self::Unhealthy
        }
    }

    /// トラフィック対象として扱える状態か
    ///
    /// `Unknown` と `Unhealthy` はどちらも対象外。
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Healthy)
    }

    /// HealthStatusを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// メンバーシップ更新の種別
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOp {
    /// トラフィック対象に追加
    Add,
    /// トラフィック対象から削除
    Delete,
}

impl UpdateOp {
    /// UpdateOpを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for UpdateOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 単一アドレスのメンバーシップ更新
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Update {
    /// 操作種別
    pub op: UpdateOp,
    /// 対象アドレス
    pub addr: String,
}

impl Update {
    /// Add更新を作成
    pub fn add(addr: impl Into<String>) -> Self {
        Self {
            op: UpdateOp::Add,
            addr: addr.into(),
        }
    }

    /// Delete更新を作成
    pub fn delete(addr: impl Into<String>) -> Self {
        Self {
            op: UpdateOp::Delete,
            addr: addr.into(),
        }
    }
}

/// 1ラウンド分の更新（バッチ内の順序は保証しない）
pub type UpdateBatch = Vec<Update>;
