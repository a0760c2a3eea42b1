//! CLI module for healthlb
//!
//! Provides command-line access to the health-checked resolver.

pub mod check;
pub mod watch;

use crate::config::load_resolver_config;
use crate::logging::LogFormat;
use clap::{Args, Parser, Subcommand};
use healthlb_common::config::{EndpointConfig, ResolverConfig};
use std::path::PathBuf;

/// healthlb - Health-checked endpoint resolver for client-side load balancing
#[derive(Parser, Debug)]
#[command(name = "healthlb")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    HEALTHLB_LOG_LEVEL               Log level (default: info)
    HEALTHLB_LOG_DIR                 Also write daily-rotated logs to this directory
    HEALTHLB__CHECK_TIMEOUT_MS       Round deadline in milliseconds (default: 5000)
    HEALTHLB__UPDATE_INTERVAL_MS     Interval between rounds in milliseconds (default: 30000)
    HEALTHLB__PROBE_TIMEOUT_MS       Per-probe timeout in milliseconds
"#)]
pub struct Cli {
    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text", env = "HEALTHLB_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch endpoints and print membership updates as JSON lines
    Watch(watch::WatchArgs),
    /// Run a single health check round and print endpoint statuses
    Check(check::CheckArgs),
}

/// エンドポイント指定の共通引数
#[derive(Args, Debug, Clone, Default)]
pub struct EndpointArgs {
    /// Configuration file (toml, json or yaml)
    #[arg(short, long, env = "HEALTHLB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Endpoint as ADDRESS=CHECK_URL (repeatable, appended to the config file's list)
    #[arg(short, long = "endpoint", value_parser = parse_endpoint)]
    pub endpoints: Vec<EndpointConfig>,

    /// Round deadline in milliseconds
    #[arg(long)]
    pub check_timeout_ms: Option<u64>,

    /// Interval between rounds in milliseconds
    #[arg(long)]
    pub update_interval_ms: Option<u64>,

    /// Per-probe timeout in milliseconds
    #[arg(long)]
    pub probe_timeout_ms: Option<u64>,
}

impl EndpointArgs {
    /// 設定ファイル・環境変数・コマンドライン引数を合成する
    ///
    /// 優先順位はコマンドライン引数 > 環境変数 > 設定ファイル > デフォルト値。
    pub fn resolver_config(&self) -> anyhow::Result<ResolverConfig> {
        let mut config = load_resolver_config(self.config.as_deref())?;
        config.endpoints.extend(self.endpoints.iter().cloned());
        if let Some(ms) = self.check_timeout_ms {
            config.check_timeout_ms = ms;
        }
        if let Some(ms) = self.update_interval_ms {
            config.update_interval_ms = ms;
        }
        if let Some(ms) = self.probe_timeout_ms {
            config.probe_timeout_ms = Some(ms);
        }
        Ok(config)
    }
}

/// `ADDRESS=CHECK_URL` 形式のエンドポイント指定をパース
fn parse_endpoint(value: &str) -> Result<EndpointConfig, String> {
    let (address, check_url) = value
        .split_once('=')
        .ok_or_else(|| format!("expected ADDRESS=CHECK_URL, got '{}'", value))?;
    if address.is_empty() || check_url.is_empty() {
        return Err(format!("expected ADDRESS=CHECK_URL, got '{}'", value));
    }
    Ok(EndpointConfig {
        address: address.to_string(),
        check_url: check_url.to_string(),
    })
}
