//! Configuration loading
//!
//! Reads [`ResolverConfig`] from an optional file overlaid by `HEALTHLB__*`
//! environment variables, plus a lookup for single environment variables with
//! fallback to a deprecated name.

use healthlb_common::config::ResolverConfig;
use healthlb_common::CommonError;
use std::path::Path;

/// 設定用環境変数のプレフィックス（例: `HEALTHLB__CHECK_TIMEOUT_MS`）
pub const ENV_PREFIX: &str = "HEALTHLB";

/// Get an environment variable with fallback to a deprecated name
///
/// If the new variable name is set, returns its value.
/// If only the old (deprecated) variable name is set, returns its value
/// and logs a deprecation warning.
///
/// # Example
/// ```
/// use healthlb::config::get_env_with_fallback;
///
/// let level = get_env_with_fallback("HEALTHLB_LOG_LEVEL", "LOG_LEVEL");
/// ```
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// リゾルバー設定を読み込む
///
/// `path` が指定されていればファイル（拡張子で形式判定: toml/json/yaml）を読み、
/// その上に `HEALTHLB__*` 環境変数を重ねる。検証は呼び出し側で行う。
pub fn load_resolver_config(path: Option<&Path>) -> Result<ResolverConfig, CommonError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(true));
    }
    builder = builder.add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    );

    builder
        .build()
        .and_then(|c| c.try_deserialize::<ResolverConfig>())
        .map_err(|e| CommonError::Config(e.to_string()))
}
