//! Provider 公共工具函数

use std::time::Duration;

use reqwest::Client;

use crate::error::{ProviderError, Result};

/// 默认连接超时（秒）
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// 默认请求超时（秒）
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// 创建带超时配置的 HTTP Client
pub fn create_http_client(provider: &str, request_timeout: Duration) -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(request_timeout)
        .build()
        .map_err(|e| ProviderError::NetworkError {
            provider: provider.to_string(),
            detail: format!("Failed to create HTTP client: {e}"),
        })
}

/// 去掉末尾的点并转为小写
pub fn normalize_domain_name(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// 子域名 + 根域名 -> 完整域名
/// 如: "i" + "sharify.me" -> "i.sharify.me"
/// 如: "" + "sharify.me" -> "sharify.me"
pub fn relative_to_full_name(sub: &str, root: &str) -> String {
    let root = normalize_domain_name(root);
    if sub.is_empty() || sub == "@" {
        root
    } else {
        format!("{}.{root}", sub.to_ascii_lowercase())
    }
}
