//! エンドポイント列挙
//!
//! サービスディレクトリ（Consul等）からエンドポイントを取得するための
//! インターフェース。ディレクトリクライアント自体はこのクレートの外側で実装する。

use async_trait::async_trait;
use healthlb_common::EndpointSpec;

/// サービス名からエンドポイント一覧を取得する
#[async_trait]
pub trait EndpointLookup: Send + Sync {
    /// `service` に属するエンドポイント一覧を返す
    ///
    /// 取得に失敗した場合はエラーメッセージを返す。
    async fn lookup(&self, service: &str) -> Result<Vec<EndpointSpec>, String>;
}

/// 固定のエンドポイント一覧を返す実装
#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
    endpoints: Vec<EndpointSpec>,
}

impl StaticLookup {
    /// 新しい固定ルックアップを作成
    pub fn new(endpoints: Vec<EndpointSpec>) -> Self {
        Self { endpoints }
    }
}

#[async_trait]
impl EndpointLookup for StaticLookup {
    async fn lookup(&self, _service: &str) -> Result<Vec<EndpointSpec>, String> {
        Ok(self.endpoints.clone())
    }
}
