//! Mock HTTP 客户端，借鉴 httpmock 设计
//!
//! 支持三种模式：
//! - Record: 调用真实 API 并把响应保存到 `MOCK_DIR`
//! - Replay: 从 `MOCK_DIR` 读取录制的响应
//! - Live: 直接调用真实 API
//!
//! 任何模式下，通过 `on_get` 注册的固定响应都优先匹配，测试据此模拟报价变化和网络失败。
//!
//! ```bash
//! # 录制模式：从真实 API 获取数据并保存
//! MOCK_MODE=record cargo test --test xy_dex_tests
//!
//! # 重放模式：从本地文件读取数据
//! MOCK_MODE=replay cargo test --test xy_dex_tests
//! ```

use crate::common::errors::SdkError;
use crate::common::http_client::{Headers, HttpClient, QueryParams};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use alloy_primitives::keccak256;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Mock 模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockMode {
    /// 录制模式：调用真实 API 并保存响应
    Record,
    /// 重放模式：从本地文件读取响应
    Replay,
    /// 直播模式：直接调用真实 API
    Live,
}

impl MockMode {
    /// 从环境变量 `MOCK_MODE` 读取模式（默认: Live）
    pub fn from_env() -> Self {
        match std::env::var("MOCK_MODE").as_deref() {
            Ok("record") => MockMode::Record,
            Ok("replay") => MockMode::Replay,
            _ => MockMode::Live,
        }
    }
}

/// 已发出的请求，用于断言
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub query: QueryParams,
    pub headers: Headers,
}

impl RecordedRequest {
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
enum MockResponse {
    Json(Value),
    Failure(String),
}

#[derive(Debug, Clone)]
struct MockRoute {
    url_suffix: String,
    query: QueryParams,
    response: MockResponse,
}

impl MockRoute {
    fn matches(&self, url: &str, query: &QueryParams) -> bool {
        url.ends_with(&self.url_suffix) && self.query.iter().all(|pair| query.contains(pair))
    }
}

pub struct MockHttpClient {
    routes: Mutex<Vec<MockRoute>>,
    requests: Mutex<Vec<RecordedRequest>>,
    inner: Option<Arc<dyn HttpClient>>,
    pub mode: MockMode,
    pub mock_dir: PathBuf,
}

impl Default for MockHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHttpClient {
    /// 仅使用固定响应；未匹配的请求返回错误
    pub fn new() -> Self {
        Self {
            routes: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            inner: None,
            mode: MockMode::Live,
            mock_dir: PathBuf::from("tests/mock_data"),
        }
    }

    /// 从环境变量 `MOCK_MODE` / `MOCK_DIR` 读取配置，`inner` 用于 Record / Live
    pub fn from_env(inner: Option<Arc<dyn HttpClient>>) -> Self {
        let mock_dir = std::env::var("MOCK_DIR").unwrap_or_else(|_| "tests/mock_data".to_string());
        Self::with_mode(MockMode::from_env(), mock_dir, inner)
    }

    pub fn with_mode(mode: MockMode, mock_dir: impl Into<PathBuf>, inner: Option<Arc<dyn HttpClient>>) -> Self {
        Self { mode, mock_dir: mock_dir.into(), inner, ..Self::new() }
    }

    /// 注册固定响应：URL 以 `url_suffix` 结尾即匹配，后注册的优先
    pub fn on_get(&self, url_suffix: &str, response: Value) -> &Self {
        self.push_route(url_suffix, Vec::new(), MockResponse::Json(response))
    }

    /// 同 `on_get`，但还要求查询参数包含给定键值对
    pub fn on_get_with_query(&self, url_suffix: &str, query: &[(&str, &str)], response: Value) -> &Self {
        let query = query.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        self.push_route(url_suffix, query, MockResponse::Json(response))
    }

    /// 注入网络失败
    pub fn fail_get(&self, url_suffix: &str, message: &str) -> &Self {
        self.push_route(url_suffix, Vec::new(), MockResponse::Failure(message.to_string()))
    }

    fn push_route(&self, url_suffix: &str, query: QueryParams, response: MockResponse) -> &Self {
        self.routes.lock().push(MockRoute { url_suffix: url_suffix.to_string(), query, response });
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// 以 `url_suffix` 结尾的请求次数
    pub fn request_count(&self, url_suffix: &str) -> usize {
        self.requests.lock().iter().filter(|r| r.url.ends_with(url_suffix)).count()
    }

    pub fn last_request(&self, url_suffix: &str) -> Option<RecordedRequest> {
        self.requests.lock().iter().rev().find(|r| r.url.ends_with(url_suffix)).cloned()
    }

    /// 生成文件名
    ///
    /// 格式: {endpoint}_{query_hash}.json，endpoint 取 URL 最后一段路径，
    /// query_hash 为 `url?k=v&...`（参数排序后）keccak256 的前 8 字节，跨 Rust 版本稳定
    pub fn generate_file_name(&self, url: &str, query: &QueryParams) -> String {
        let endpoint: String = url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or("root")
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();

        let mut sorted: Vec<String> = query.iter().map(|(key, value)| format!("{key}={value}")).collect();
        sorted.sort();
        let hash = keccak256(format!("{url}?{}", sorted.join("&")));

        format!("{}_{}.json", endpoint, hex::encode(&hash[..8]))
    }

    /// 保存录制到文件
    pub fn save_recording(&self, url: &str, query: &QueryParams, response: &Value) -> Result<(), SdkError> {
        fs::create_dir_all(&self.mock_dir)
            .map_err(|e| SdkError::external(format!("creating {:?}", self.mock_dir), e))?;
        let file_path = self.mock_dir.join(self.generate_file_name(url, query));
        let mock_data = serde_json::json!({
            "url": url,
            "query": query,
            "response": response,
        });
        let json = serde_json::to_string_pretty(&mock_data)
            .map_err(|e| SdkError::external("serializing recording", e))?;
        fs::write(&file_path, json).map_err(|e| SdkError::external(format!("writing {file_path:?}"), e))
    }

    /// 从文件加载录制
    pub fn load_recording(&self, url: &str, query: &QueryParams) -> Result<Value, SdkError> {
        let file_path = self.mock_dir.join(self.generate_file_name(url, query));
        let content = fs::read_to_string(&file_path)
            .map_err(|e| SdkError::external(format!("mock data file {file_path:?} is missing"), e))?;
        let mock_data: Value = serde_json::from_str(&content)
            .map_err(|e| SdkError::external(format!("parsing mock data {file_path:?}"), e))?;
        mock_data
            .get("response")
            .cloned()
            .ok_or_else(|| SdkError::external(format!("{file_path:?}"), "mock data has no response field"))
    }

    pub fn has_mock_data(&self, url: &str, query: &QueryParams) -> bool {
        Path::new(&self.mock_dir).join(self.generate_file_name(url, query)).exists()
    }

    fn canned(&self, url: &str, query: &QueryParams) -> Option<MockResponse> {
        self.routes
            .lock()
            .iter()
            .rev()
            .find(|route| route.matches(url, query))
            .map(|route| route.response.clone())
    }

    async fn passthrough(&self, url: &str, query: &QueryParams, headers: &Headers) -> Result<Value, SdkError> {
        match &self.inner {
            Some(inner) => inner.get_json(url, query, headers).await,
            None => Err(SdkError::external(format!("GET {url}"), "no mock response registered")),
        }
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get_json(&self, url: &str, query: &QueryParams, headers: &Headers) -> Result<Value, SdkError> {
        self.requests.lock().push(RecordedRequest {
            url: url.to_string(),
            query: query.clone(),
            headers: headers.clone(),
        });

        if let Some(response) = self.canned(url, query) {
            return match response {
                MockResponse::Json(value) => Ok(value),
                MockResponse::Failure(message) => Err(SdkError::external(format!("GET {url}"), message)),
            };
        }

        match self.mode {
            MockMode::Replay => self.load_recording(url, query),
            MockMode::Record => {
                let response = self.passthrough(url, query, headers).await?;
                self.save_recording(url, query, &response)?;
                Ok(response)
            }
            MockMode::Live => self.passthrough(url, query, headers).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query(pairs: &[(&str, &str)]) -> QueryParams {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_generate_file_name() {
        let mock = MockHttpClient::new();
        let url = "https://aggregator-api.xy.finance/v1/quote";
        let params = query(&[("srcChainId", "56"), ("slippage", "1")]);

        let file_name = mock.generate_file_name(url, &params);
        // 已录制的文件名必须保持不变
        assert_eq!(file_name, "quote_e05c3575808ab598.json");

        // 参数顺序不影响文件名
        let reordered = query(&[("slippage", "1"), ("srcChainId", "56")]);
        assert_eq!(file_name, mock.generate_file_name(url, &reordered));

        let other = query(&[("srcChainId", "1")]);
        assert_ne!(file_name, mock.generate_file_name(url, &other));
    }

    #[test]
    fn test_save_and_load_recording() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mock = MockHttpClient::with_mode(MockMode::Replay, temp_dir.path(), None);

        let url = "https://api.example.com/v1/buildTx";
        let params = query(&[("receiver", "0x01")]);
        let response = json!({"success": true});

        assert!(!mock.has_mock_data(url, &params));
        mock.save_recording(url, &params, &response).unwrap();
        assert!(mock.has_mock_data(url, &params));
        assert_eq!(mock.load_recording(url, &params).unwrap(), response);
    }

    #[tokio::test]
    async fn test_replay_reads_fixture() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let recorder = MockHttpClient::with_mode(MockMode::Record, temp_dir.path(), None);
        let url = "https://api.example.com/v1/quote";
        let params = query(&[("amount", "10")]);
        recorder.save_recording(url, &params, &json!({"amount": "11"})).unwrap();

        let replay = MockHttpClient::with_mode(MockMode::Replay, temp_dir.path(), None);
        let value = replay.get_json(url, &params, &Vec::new()).await.unwrap();
        assert_eq!(value["amount"], "11");

        let missing = replay.get_json(url, &query(&[("amount", "12")]), &Vec::new()).await;
        assert!(matches!(missing, Err(SdkError::ExternalApi { .. })));
    }

    #[tokio::test]
    async fn test_canned_routes_and_request_log() {
        let mock = MockHttpClient::new();
        mock.on_get("/quote", json!({"v": 1}));
        mock.on_get_with_query("/quote", &[("chain", "56")], json!({"v": 2}));
        mock.fail_get("/swap", "connection reset");

        let first = mock.get_json("https://x/quote", &query(&[("chain", "1")]), &Vec::new()).await.unwrap();
        assert_eq!(first["v"], 1);
        let second = mock.get_json("https://x/quote", &query(&[("chain", "56")]), &Vec::new()).await.unwrap();
        assert_eq!(second["v"], 2);
        assert!(mock.get_json("https://x/swap", &Vec::new(), &Vec::new()).await.is_err());
        assert!(mock.get_json("https://x/unknown", &Vec::new(), &Vec::new()).await.is_err());

        assert_eq!(mock.request_count("/quote"), 2);
        assert_eq!(mock.last_request("/quote").unwrap().query_value("chain"), Some("56"));
    }
}
