//! Cloudflare HTTP 请求方法

use reqwest::RequestBuilder;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::{CF_API_BASE, CloudflareProvider, CloudflareResponse, READ_RETRIES};

impl CloudflareProvider {
    /// 发送请求并解开 Cloudflare 响应信封
    ///
    /// 非 2xx 响应同样携带信封（`success: false` + `errors`），优先按信封映射；
    /// 无法解析时退回 `Unknown`，错误码为 HTTP 状态码。
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        method: &str,
        path: &str,
        max_retries: u32,
        context: ErrorContext,
    ) -> Result<CloudflareResponse<T>> {
        let request = request.bearer_auth(&self.api_token);
        let (status, body) = HttpUtils::execute_request_with_retry(
            request,
            self.provider_name(),
            method,
            path,
            max_retries,
        )
        .await?;

        let envelope: CloudflareResponse<T> =
            match HttpUtils::parse_json(&body, self.provider_name()) {
                Ok(envelope) => envelope,
                Err(_) if !(200..300).contains(&status) => {
                    return Err(self.unknown_error(RawApiError::with_code(
                        status.to_string(),
                        format!("HTTP {status}"),
                    )));
                }
                Err(e) => return Err(e),
            };

        if !envelope.success {
            let (code, message) = envelope.first_error();
            let err = self.map_error(RawApiError::with_code(code, message), context);
            if err.is_expected() {
                log::warn!("[{}] {method} {path}: {err}", self.provider_name());
            } else {
                log::error!("[{}] {method} {path}: {err}", self.provider_name());
            }
            return Err(err);
        }

        Ok(envelope)
    }

    fn url(path: &str) -> String {
        format!("{CF_API_BASE}{path}")
    }

    /// 执行 GET 请求（只读，可重试）
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        context: ErrorContext,
    ) -> Result<T> {
        let envelope: CloudflareResponse<T> = self
            .send(
                self.client.get(Self::url(path)),
                "GET",
                path,
                READ_RETRIES,
                context,
            )
            .await?;
        envelope
            .result
            .ok_or_else(|| self.parse_error("响应中缺少 result 字段"))
    }

    /// 执行分页 GET 请求，返回 (items, 是否还有下一页)
    pub(crate) async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        context: ErrorContext,
    ) -> Result<(Vec<T>, bool)> {
        let envelope: CloudflareResponse<Vec<T>> = self
            .send(
                self.client.get(Self::url(path)),
                "GET",
                path,
                READ_RETRIES,
                context,
            )
            .await?;
        let has_more = envelope
            .result_info
            .as_ref()
            .is_some_and(|info| info.page < info.total_pages);
        Ok((envelope.result.unwrap_or_default(), has_more))
    }

    /// 执行 POST 请求（不重试，结果可能未知）
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        context: ErrorContext,
    ) -> Result<T> {
        let envelope: CloudflareResponse<T> = self
            .send(
                self.client.post(Self::url(path)).json(body),
                "POST",
                path,
                0,
                context,
            )
            .await?;
        envelope
            .result
            .ok_or_else(|| self.parse_error("响应中缺少 result 字段"))
    }

    /// 执行 DELETE 请求（不重试）
    pub(crate) async fn delete(&self, path: &str, context: ErrorContext) -> Result<()> {
        self.send::<serde_json::Value>(
            self.client.delete(Self::url(path)),
            "DELETE",
            path,
            0,
            context,
        )
        .await
        .map(|_| ())
    }
}
