//! healthlb
//!
//! ヘルスチェック付きエンドポイントリゾルバー。
//! 固定のエンドポイント集合を定期的にヘルスチェックし、ロードバランサーが
//! 使うアドレス集合の変化（Add/Delete）をプル型のストリームとして提供する。

#![warn(missing_docs)]

/// エラー型
pub mod error;

/// リゾルバーのライフサイクル管理（停止シグナル）
pub mod lifecycle;

/// ヘルスチェック
pub mod health;

/// アドレスリゾルバー
pub mod resolver;

/// 設定管理（設定ファイル・環境変数）
pub mod config;

/// ロギング初期化ユーティリティ
pub mod logging;

/// CLIインターフェース
pub mod cli;

pub use error::{ProbeError, ResolverError, RoundError, WatchError};
pub use healthlb_common::{EndpointSpec, HealthStatus, Update, UpdateBatch, UpdateOp};
pub use resolver::{
    HealthzResolver, HealthzWatcher, Resolver, ResolverOptions, StaticResolver, Watcher,
};
