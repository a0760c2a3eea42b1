//! check サブコマンド
//!
//! 1ラウンドだけヘルスチェックを実行し、各エンドポイントの状態をJSONで出力する。

use super::EndpointArgs;
use crate::resolver::HealthzResolver;
use clap::Args;

/// check サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Endpoint selection
    #[command(flatten)]
    pub endpoints: EndpointArgs,
}

/// check サブコマンドを実行
///
/// 正常なエンドポイント数を返す。
pub async fn execute(args: &CheckArgs) -> anyhow::Result<usize> {
    let config = args.endpoints.resolver_config()?;
    // 構築時の初回ラウンドの結果をそのまま使う
    let resolver = HealthzResolver::from_config(&config).await?;
    resolver.close();

    let statuses = resolver.statuses().await;
    println!("{}", serde_json::to_string_pretty(&statuses)?);

    Ok(statuses.iter().filter(|s| s.status.is_ok()).count())
}
