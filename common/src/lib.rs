//! healthlb 共通クレート
//!
//! リゾルバー実装間で共有する値型・設定・エラー型

#![warn(missing_docs)]

/// 設定構造体
pub mod config;

/// エラー型
pub mod error;

/// コアデータ型
pub mod types;

pub use error::CommonError;
pub use types::{EndpointSpec, HealthStatus, Update, UpdateBatch, UpdateOp};
