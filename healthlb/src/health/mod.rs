//! ヘルスチェック
//!
//! 各エンドポイントのチェックURLへ1回ずつ並列にプローブし、
//! ラウンド全体を共通の期限で打ち切る。

pub mod prober;

pub use prober::{probe_all, HttpProber, Prober};
