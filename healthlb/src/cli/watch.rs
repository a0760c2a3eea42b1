//! watch サブコマンド
//!
//! リゾルバーを起動し、更新バッチを1行1JSONで標準出力に書き出す。
//! Ctrl-Cでリゾルバーを閉じて終了する。

use super::EndpointArgs;
use crate::resolver::{HealthzResolver, Resolver, Watcher};
use clap::Args;
use std::io::Write;
use tracing::info;

/// watch サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    /// Endpoint selection
    #[command(flatten)]
    pub endpoints: EndpointArgs,

    /// Exit after printing this many batches
    #[arg(long)]
    pub max_batches: Option<usize>,
}

/// watch サブコマンドを実行
pub async fn execute(args: &WatchArgs) -> anyhow::Result<()> {
    let config = args.endpoints.resolver_config()?;
    let resolver = HealthzResolver::from_config(&config).await?;
    let watcher = resolver.resolve("")?;

    let interrupt = {
        let watcher = watcher.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, closing resolver");
                watcher.close();
            }
        })
    };

    let mut printed = 0usize;
    let stdout = std::io::stdout();
    while let Ok(batch) = watcher.next().await {
        let line = serde_json::to_string(&batch)?;
        let mut out = stdout.lock();
        writeln!(out, "{}", line)?;
        out.flush()?;

        printed += 1;
        if args.max_batches.is_some_and(|max| printed >= max) {
            break;
        }
    }

    resolver.close();
    interrupt.abort();
    Ok(())
}
