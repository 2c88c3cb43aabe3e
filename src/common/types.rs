use crate::common::errors::SdkError;
use crate::constants::{BlockchainName, OnChainTradeType};
use crate::trading::core::rate_validator::RateTolerance;
use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::str::FromStr;

pub const DEFAULT_XY_API_URL: &str = "https://aggregator-api.xy.finance/v1";
pub const DEFAULT_ONEINCH_API_URL: &str = "https://api.1inch.dev/swap/v5.2";
pub const DEFAULT_HTTP_TIMEOUT_MILLIS: u64 = 10_000;

/// 回调执行模式
///
/// 控制交易生命周期回调的执行方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallbackExecutionMode {
    /// 异步模式：不阻塞编码结果返回（默认）
    ///
    /// - 回调失败只记录日志
    /// - 使用 `tokio::spawn` 异步执行
    #[default]
    Async,

    /// 同步模式：等待回调完成后再返回编码结果
    ///
    /// - 回调失败会使 `encode` 返回 `SdkError::Callback`
    /// - 适合：入库、审计等关键业务
    Sync,
}

/// 编码后的 EVM 交易
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvmEncodeConfig {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
}

impl EvmEncodeConfig {
    pub fn new(to: Address, data: impl Into<Bytes>, value: U256) -> Self {
        Self { to, data: data.into(), value, gas: None, gas_price: None }
    }
}

/// SDK 配置
///
/// 进程内的所有提供方共享同一份只读配置
#[derive(Debug, Clone)]
pub struct SdkConfig {
    /// 每条链的 JSON-RPC 地址
    pub rpc_urls: HashMap<BlockchainName, String>,
    /// HTTP 请求超时时间（毫秒）
    pub http_timeout_millis: u64,
    /// 代理地址；为空时按 HTTPS_PROXY / HTTP_PROXY 读取
    pub proxy_url: Option<String>,
    pub xy_api_url: String,
    pub oneinch_api_url: String,
    pub oneinch_api_key: Option<String>,
    /// 默认钱包地址（用于授权检查和 gas 估算）
    pub wallet_address: Option<Address>,
    /// 推荐人 / 集成方地址
    pub provider_address: Option<Address>,
    /// 按提供方覆盖默认的报价容差
    pub tolerance_overrides: HashMap<OnChainTradeType, RateTolerance>,
    /// 回调执行模式（默认：异步）
    pub callback_execution_mode: CallbackExecutionMode,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            rpc_urls: HashMap::new(),
            http_timeout_millis: DEFAULT_HTTP_TIMEOUT_MILLIS,
            proxy_url: None,
            xy_api_url: DEFAULT_XY_API_URL.to_string(),
            oneinch_api_url: DEFAULT_ONEINCH_API_URL.to_string(),
            oneinch_api_key: None,
            wallet_address: None,
            provider_address: None,
            tolerance_overrides: HashMap::new(),
            callback_execution_mode: CallbackExecutionMode::default(),
        }
    }
}

impl SdkConfig {
    pub fn new(rpc_urls: HashMap<BlockchainName, String>) -> Self {
        Self { rpc_urls, ..Default::default() }
    }

    /// 从环境变量读取配置
    ///
    /// - `RPC_URL_<CHAIN>`：例如 `RPC_URL_ETH`、`RPC_URL_AVALANCHE`
    /// - `HTTPS_PROXY` / `HTTP_PROXY`
    /// - `ONEINCH_API_KEY`
    /// - `WALLET_ADDRESS`
    pub fn from_env() -> Result<Self, SdkError> {
        let mut config = Self::default();

        for blockchain in BlockchainName::ALL {
            if let Ok(url) = env::var(format!("RPC_URL_{}", blockchain.as_str())) {
                if !url.trim().is_empty() {
                    config.rpc_urls.insert(blockchain, url.trim().to_string());
                }
            }
        }

        config.proxy_url = env::var("HTTPS_PROXY")
            .or_else(|_| env::var("https_proxy"))
            .or_else(|_| env::var("HTTP_PROXY"))
            .or_else(|_| env::var("http_proxy"))
            .ok()
            .filter(|p| !p.is_empty());

        config.oneinch_api_key = env::var("ONEINCH_API_KEY").ok().filter(|k| !k.is_empty());

        if let Ok(wallet) = env::var("WALLET_ADDRESS") {
            let address = Address::from_str(wallet.trim())
                .map_err(|e| SdkError::Config(format!("WALLET_ADDRESS is not an address: {e}")))?;
            config.wallet_address = Some(address);
        }

        Ok(config)
    }

    pub fn with_rpc_url(mut self, blockchain: BlockchainName, url: impl Into<String>) -> Self {
        self.rpc_urls.insert(blockchain, url.into());
        self
    }

    pub fn with_http_timeout_millis(mut self, timeout_millis: u64) -> Self {
        self.http_timeout_millis = timeout_millis;
        self
    }

    pub fn with_proxy_url(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy_url.into());
        self
    }

    pub fn with_xy_api_url(mut self, url: impl Into<String>) -> Self {
        self.xy_api_url = url.into();
        self
    }

    pub fn with_oneinch_api(mut self, url: impl Into<String>, api_key: Option<String>) -> Self {
        self.oneinch_api_url = url.into();
        self.oneinch_api_key = api_key;
        self
    }

    pub fn with_wallet_address(mut self, wallet: Address) -> Self {
        self.wallet_address = Some(wallet);
        self
    }

    pub fn with_provider_address(mut self, provider: Address) -> Self {
        self.provider_address = Some(provider);
        self
    }

    pub fn with_tolerance(mut self, trade_type: OnChainTradeType, tolerance: RateTolerance) -> Self {
        self.tolerance_overrides.insert(trade_type, tolerance);
        self
    }

    /// 设置回调执行模式
    pub fn with_callback_execution_mode(mut self, mode: CallbackExecutionMode) -> Self {
        self.callback_execution_mode = mode;
        self
    }

    pub fn rpc_url(&self, blockchain: BlockchainName) -> Option<&str> {
        self.rpc_urls.get(&blockchain).map(String::as_str)
    }
}
