//! SDK 统一错误类型

use crate::trading::core::trade::OnChainTrade;
use alloy_primitives::Address;

/// 外部错误的装箱类型
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// 区块链或代币对不被该提供方支持
    #[error("{provider} does not support this pair: {reason}")]
    UnsupportedPair { provider: String, reason: String },

    /// HTTP / RPC / 解码失败
    #[error("{context}: {source}")]
    ExternalApi {
        context: String,
        #[source]
        source: BoxError,
    },

    /// 报价已过期：携带按最新报价重建的交易，调用方需重新确认
    #[error("rates updated on chain, the new trade must be confirmed")]
    UpdatedRates(Box<OnChainTrade>),

    /// 合约调用 revert（节点返回了 JSON-RPC `error` 对象），与网络故障区分
    #[error("{context}: execution reverted: {reason}")]
    ContractReverted { context: String, reason: String },

    #[error("failed to encode transaction: {0}")]
    Encoding(String),

    #[error("wallet is not connected")]
    WalletNotConnected,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("approve is needed for spender {spender}")]
    ApproveNeeded { spender: Address },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid rate tolerance: {0}")]
    InvalidTolerance(String),

    #[error("lifecycle callback failed: {0}")]
    Callback(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl SdkError {
    pub fn external(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        SdkError::ExternalApi { context: context.into(), source: source.into() }
    }

    pub fn reverted(context: impl Into<String>, reason: impl Into<String>) -> Self {
        SdkError::ContractReverted { context: context.into(), reason: reason.into() }
    }

    /// 合约本身拒绝了调用，而不是请求没有到达节点
    pub fn is_revert(&self) -> bool {
        matches!(self, SdkError::ContractReverted { .. })
    }

    pub fn unsupported(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        SdkError::UnsupportedPair { provider: provider.into(), reason: reason.into() }
    }

    /// 报价过期时返回的新交易
    pub fn updated_trade(&self) -> Option<&OnChainTrade> {
        match self {
            SdkError::UpdatedRates(trade) => Some(&**trade),
            _ => None,
        }
    }
}
