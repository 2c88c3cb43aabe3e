//! 聚合器 HTTP API 访问层
//!
//! 提供方只依赖 `HttpClient` trait，生产环境使用 reqwest 实现，测试中使用
//! `MockHttpClient` 注入固定响应。

use crate::common::errors::SdkError;
use async_trait::async_trait;
use reqwest::{Client, Proxy};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{env, time::Duration};

/// 查询参数（已展开为字符串键值对）
pub type QueryParams = Vec<(String, String)>;

/// 请求头
pub type Headers = Vec<(String, String)>;

#[async_trait]
pub trait HttpClient: Send + Sync {
    /// 发起 GET 请求并解析 JSON 响应；非 2xx 状态返回 `SdkError::ExternalApi`
    async fn get_json(&self, url: &str, query: &QueryParams, headers: &Headers) -> Result<Value, SdkError>;
}

/// GET + 反序列化为具体类型
pub async fn get_typed<T: DeserializeOwned>(
    http: &dyn HttpClient,
    url: &str,
    query: &QueryParams,
    headers: &Headers,
) -> Result<T, SdkError> {
    let value = http.get_json(url, query, headers).await?;
    serde_json::from_value(value)
        .map_err(|e| SdkError::external(format!("unexpected response body from {url}"), e))
}

/// 将可序列化的请求结构展开为查询参数，`None` 字段会被跳过
pub fn to_query<T: Serialize>(params: &T) -> Result<QueryParams, SdkError> {
    let value = serde_json::to_value(params)
        .map_err(|e| SdkError::Encoding(format!("cannot serialize query: {e}")))?;
    let Value::Object(map) = value else {
        return Err(SdkError::Encoding("query must serialize to an object".to_string()));
    };
    Ok(map
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect())
}

/// 拼接基础地址与路径
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// 从错误响应体中提取可读信息（`description` / `message` / `error` / `errorMsg`）
pub fn api_error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        for key in ["description", "message", "error", "errorMsg"] {
            if let Some(text) = json.get(key).and_then(Value::as_str) {
                return text.to_string();
            }
        }
        if let Some(text) = json.pointer("/data/description").and_then(Value::as_str) {
            return text.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "empty response body".to_string()
    } else {
        trimmed.chars().take(256).collect()
    }
}

/// HTTP 客户端配置
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// 请求超时时间（毫秒）
    pub timeout_millis: u64,
    /// 显式代理；为空时读取 HTTPS_PROXY / HTTP_PROXY
    pub proxy_url: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self { timeout_millis: 10_000, proxy_url: None }
    }
}

/// 基于 reqwest 的实现
#[derive(Clone)]
pub struct ReqwestHttpClient {
    http: Client,
    pub config: HttpClientConfig,
}

impl ReqwestHttpClient {
    pub fn new(config: HttpClientConfig) -> Result<Self, SdkError> {
        let http = build_client(config.timeout_millis, config.proxy_url.as_deref())?;
        Ok(Self { http, config })
    }
}

/// 共享的 reqwest Client 构建逻辑（HTTP API 与 JSON-RPC 共用）
pub(crate) fn build_client(timeout_millis: u64, proxy_url: Option<&str>) -> Result<Client, SdkError> {
    let mut builder = Client::builder()
        .pool_idle_timeout(Duration::from_secs(60))
        .pool_max_idle_per_host(64)
        .tcp_nodelay(true)
        .timeout(Duration::from_millis(timeout_millis))
        .connect_timeout(Duration::from_secs(5));

    let proxy = match proxy_url {
        Some(url) => Some(Proxy::all(url)),
        // 优先使用 HTTPS_PROXY，其次 HTTP_PROXY
        None => match env::var("HTTPS_PROXY").or_else(|_| env::var("https_proxy")) {
            Ok(https_proxy) => Some(Proxy::https(&https_proxy)),
            Err(_) => env::var("HTTP_PROXY")
                .or_else(|_| env::var("http_proxy"))
                .ok()
                .map(|http_proxy| Proxy::http(&http_proxy)),
        },
    };
    if let Some(proxy) = proxy {
        let proxy = proxy.map_err(|e| SdkError::Config(format!("invalid proxy: {e}")))?;
        builder = builder.proxy(proxy);
    }

    builder.build().map_err(|e| SdkError::Config(format!("cannot build http client: {e}")))
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get_json(&self, url: &str, query: &QueryParams, headers: &Headers) -> Result<Value, SdkError> {
        let mut request = self.http.get(url).query(query);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| SdkError::external(format!("GET {url}"), e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SdkError::external(format!("GET {url}: reading body"), e))?;

        if !status.is_success() {
            return Err(SdkError::external(
                format!("GET {url} returned {status}"),
                api_error_message(&body),
            ));
        }

        serde_json::from_str(&body).map_err(|e| SdkError::external(format!("GET {url}: invalid json"), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Params {
        src_chain_id: u64,
        token: String,
        receiver: Option<String>,
    }

    #[test]
    fn test_to_query_flattens_and_skips_none() {
        let query = to_query(&Params { src_chain_id: 56, token: "0xabc".to_string(), receiver: None }).unwrap();
        assert!(query.contains(&("srcChainId".to_string(), "56".to_string())));
        assert!(query.contains(&("token".to_string(), "0xabc".to_string())));
        assert_eq!(query.len(), 2);
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("https://api.example.com/v1/", "/quote"), "https://api.example.com/v1/quote");
        assert_eq!(join_url("https://api.example.com/v1", "quote"), "https://api.example.com/v1/quote");
    }

    #[test]
    fn test_api_error_message_prefers_description() {
        assert_eq!(api_error_message(r#"{"description":"insufficient liquidity","statusCode":400}"#), "insufficient liquidity");
        assert_eq!(api_error_message(r#"{"success":false,"errorMsg":"unsupported chain"}"#), "unsupported chain");
        assert_eq!(api_error_message("  "), "empty response body");
        assert_eq!(api_error_message("bad gateway"), "bad gateway");
    }
}
