//! 提供方 trait 与计算结果

use crate::common::chain_reader::ChainReader;
use crate::common::errors::SdkError;
use crate::common::http_client::HttpClient;
use crate::common::tokens::{PriceToken, PriceTokenAmount};
use crate::common::types::{CallbackExecutionMode, EvmEncodeConfig};
use crate::constants::{BlockchainName, CrossChainTradeType, OnChainTradeType};
use crate::trading::core::params::{
    CrossChainCalculationOptions, EncodeTransactionOptions, OnChainCalculationOptions,
};
use crate::trading::core::trade::{CrossChainTrade, CrossChainTradeData, OnChainTrade, OnChainTradeData};
use crate::trading::registry::ProviderConfig;
use alloy_primitives::Address;
use async_trait::async_trait;
use std::sync::Arc;

/// 提供方共享的外部依赖
#[derive(Clone)]
pub struct ProviderDeps {
    pub http: Arc<dyn HttpClient>,
    pub chain: Arc<dyn ChainReader>,
    /// 默认钱包地址
    pub wallet_address: Option<Address>,
    /// 推荐人 / 集成方地址
    pub provider_address: Option<Address>,
    pub callback_execution_mode: CallbackExecutionMode,
}

impl ProviderDeps {
    pub fn new(http: Arc<dyn HttpClient>, chain: Arc<dyn ChainReader>) -> Self {
        Self {
            http,
            chain,
            wallet_address: None,
            provider_address: None,
            callback_execution_mode: CallbackExecutionMode::default(),
        }
    }
}

/// 提供方单次查询的结果：找到路径，或者明确表示没有路径
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteLookup<T> {
    Found(T),
    NoRoute(String),
}

/// 对外的计算结果
#[derive(Debug)]
pub enum CalculationResult<T> {
    Found(T),
    /// 不支持的链或代币对，不是错误
    NoRoute { reason: String },
    Failed(SdkError),
}

impl<T> CalculationResult<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, CalculationResult::Found(_))
    }

    pub fn trade(&self) -> Option<&T> {
        match self {
            CalculationResult::Found(trade) => Some(trade),
            _ => None,
        }
    }

    pub fn into_trade(self) -> Option<T> {
        match self {
            CalculationResult::Found(trade) => Some(trade),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&SdkError> {
        match self {
            CalculationResult::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn into_result(self) -> Result<Option<T>, SdkError> {
        match self {
            CalculationResult::Found(trade) => Ok(Some(trade)),
            CalculationResult::NoRoute { .. } => Ok(None),
            CalculationResult::Failed(err) => Err(err),
        }
    }
}

/// 同链交易提供方
#[async_trait]
pub trait OnChainProvider: Send + Sync {
    fn trade_type(&self) -> OnChainTradeType;

    fn config(&self) -> &ProviderConfig;

    fn deps(&self) -> &ProviderDeps;

    fn is_supported_blockchain(&self, blockchain: BlockchainName) -> bool {
        self.config().supports(blockchain)
    }

    async fn calculate(
        &self,
        from: &PriceTokenAmount,
        to: &PriceToken,
        options: &OnChainCalculationOptions,
    ) -> Result<RouteLookup<OnChainTradeData>, SdkError>;

    /// 重新报价、校验并构建交易；地址检查与回调由 `OnChainTrade::encode` 负责
    async fn encode(
        &self,
        trade: &OnChainTrade,
        options: &EncodeTransactionOptions,
    ) -> Result<EvmEncodeConfig, SdkError>;
}

/// 跨链交易提供方
#[async_trait]
pub trait CrossChainProvider: Send + Sync {
    fn trade_type(&self) -> CrossChainTradeType;

    fn deps(&self) -> &ProviderDeps;

    fn is_supported_blockchain(&self, blockchain: BlockchainName) -> bool;

    async fn calculate(
        &self,
        from: &PriceTokenAmount,
        to: &PriceToken,
        options: &CrossChainCalculationOptions,
    ) -> Result<RouteLookup<CrossChainTradeData>, SdkError>;

    async fn encode(
        &self,
        trade: &CrossChainTrade,
        options: &EncodeTransactionOptions,
    ) -> Result<EvmEncodeConfig, SdkError>;
}
