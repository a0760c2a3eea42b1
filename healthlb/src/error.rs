//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! 利用者から見えるエラーは構築時の [`ResolverError`] と、`close()` 後の
//! [`WatchError::Closed`] のみ。プローブ失敗・ラウンド中断はリゾルバー内部で
//! 回復され、ログに記録される。

use healthlb_common::CommonError;
use std::time::Duration;
use thiserror::Error;

/// リゾルバー構築時のエラー
#[derive(Debug, Error)]
pub enum ResolverError {
    /// Common layer error
    #[error(transparent)]
    Common(#[from] CommonError),

    /// エンドポイントが1件も指定されていない
    #[error("no endpoints specified")]
    NoEndpoints,

    /// エンドポイント列挙（外部ディレクトリ）の失敗
    #[error("endpoint lookup for '{service}' failed: {message}")]
    Lookup {
        /// 対象サービス名
        service: String,
        /// エラー内容
        message: String,
    },

    /// HTTPクライアントの初期化失敗
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Watcherのエラー
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum WatchError {
    /// `close()` 済み（終端シグナル）
    #[error("watcher is closed")]
    Closed,
}

/// 単一プローブのエラー（常に `Unhealthy` として回復される）
#[derive(Debug, Error)]
pub enum ProbeError {
    /// 接続失敗・タイムアウト等
    #[error("transport error: {0}")]
    Transport(String),

    /// 2xx以外のステータスコード
    #[error("HTTP {0}")]
    Status(u16),

    /// 不正なチェックURL
    #[error("invalid check url '{0}'")]
    InvalidTarget(String),
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            let target = err.url().map(|u| u.to_string()).unwrap_or_default();
            return Self::InvalidTarget(target);
        }
        Self::Transport(err.to_string())
    }
}

/// ラウンド全体のエラー（ラウンドは破棄され、次の周期で再試行される）
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum RoundError {
    /// 全プローブの完了前にラウンドの期限を超過
    #[error("health check round exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),

    /// ラウンド実行中にリゾルバーが閉じられた
    #[error("resolver closed during health check round")]
    Closed,
}
