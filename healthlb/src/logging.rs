//! ロギング初期化ユーティリティ
//!
//! stderrへの出力（text/json）と、`HEALTHLB_LOG_DIR` 指定時の日次ローテーション
//! ファイル出力を設定する。stdoutは更新バッチの出力に使うためログは出さない。

use crate::config::get_env_with_fallback;
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// デフォルトのログレベル
const DEFAULT_LOG_LEVEL: &str = "info";

/// ログファイル名のプレフィックス
const LOG_FILE_NAME: &str = "healthlb.log";

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 人間向けテキスト
    #[default]
    Text,
    /// JSON Lines
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: '{}'", other)),
        }
    }
}

/// ログレベルのフィルターを決定
///
/// `HEALTHLB_LOG_LEVEL`（旧: `LOG_LEVEL`）、次に `RUST_LOG`、どちらも無ければ `info`。
fn env_filter() -> EnvFilter {
    let directive = get_env_with_fallback("HEALTHLB_LOG_LEVEL", "LOG_LEVEL")
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// グローバルなtracing subscriberを初期化
///
/// ファイル出力を有効にした場合、戻り値のガードを保持している間だけ書き込まれる。
pub fn init(
    format: LogFormat,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
    let (file_layer, guard) = match get_env_with_fallback("HEALTHLB_LOG_DIR", "LOG_DIR") {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter())
        .with(file_layer);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()?,
    }

    Ok(guard)
}
