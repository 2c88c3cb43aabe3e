//! 交易生命周期回调模块
//!
//! 交易编码完成、返回给调用方之前触发，允许上游应用入库、审计或记录日志

use crate::common::errors::SdkError;
use crate::common::types::{CallbackExecutionMode, EvmEncodeConfig};
use crate::constants::BlockchainName;
use anyhow::Result;
use std::sync::Arc;
use tracing::warn;

/// 交易生命周期回调 Trait
pub trait TransactionLifecycleCallback: Send + Sync {
    /// 交易编码后、返回前的回调
    ///
    /// # 返回
    /// * `Ok(())` - 回调成功
    /// * `Err(e)` - 异步模式下仅记录日志；同步模式下 `encode` 返回 `SdkError::Callback`
    fn on_transaction_encoded(&self, context: CallbackContext) -> futures::future::BoxFuture<'static, Result<()>>;
}

/// 回调上下文
#[derive(Debug, Clone)]
pub struct CallbackContext {
    /// 编码后的交易
    pub transaction: EvmEncodeConfig,

    /// 源链
    pub blockchain: BlockchainName,

    /// 提供方名称，例如 `XY_DEX`、`STARGATE`
    pub trade_type: String,

    /// 发送钱包
    pub from_address: alloy_primitives::Address,

    /// 卖出数量（wei）
    pub from_amount_wei: String,

    /// 预期买入数量（wei）
    pub to_amount_wei: String,

    /// 时间戳（纳秒）
    pub timestamp_ns: u64,
}

impl CallbackContext {
    pub fn new(
        transaction: EvmEncodeConfig,
        blockchain: BlockchainName,
        trade_type: impl Into<String>,
        from_address: alloy_primitives::Address,
        from_amount_wei: String,
        to_amount_wei: String,
    ) -> Self {
        let timestamp_ns = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_else(|e| {
                warn!("获取系统时间失败: {}，使用 0 作为默认时间戳", e);
                std::time::Duration::from_secs(0)
            })
            .as_nanos() as u64;

        Self {
            transaction,
            blockchain,
            trade_type: trade_type.into(),
            from_address,
            from_amount_wei,
            to_amount_wei,
            timestamp_ns,
        }
    }

    /// 获取交易的 JSON 表示（用于日志）
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "blockchain": self.blockchain.as_str(),
            "trade_type": self.trade_type,
            "from_address": self.from_address.to_string(),
            "from_amount_wei": self.from_amount_wei,
            "to_amount_wei": self.to_amount_wei,
            "timestamp_ns": self.timestamp_ns,
            "transaction": self.transaction,
        })
    }
}

/// 空回调实现（不做任何操作）
#[derive(Clone)]
pub struct NoopCallback;

impl TransactionLifecycleCallback for NoopCallback {
    fn on_transaction_encoded(&self, _context: CallbackContext) -> futures::future::BoxFuture<'static, Result<()>> {
        Box::pin(async { Ok(()) })
    }
}

/// Arc 包装的回调（便于共享）
pub type CallbackRef = Arc<dyn TransactionLifecycleCallback>;

/// 按执行模式触发回调
pub(crate) async fn dispatch(
    callback: Option<&CallbackRef>,
    mode: CallbackExecutionMode,
    context: CallbackContext,
) -> Result<(), SdkError> {
    let Some(callback) = callback else {
        return Ok(());
    };
    let future = callback.on_transaction_encoded(context);
    match mode {
        CallbackExecutionMode::Async => {
            tokio::spawn(async move {
                if let Err(e) = future.await {
                    warn!("交易回调执行失败: {:?}", e);
                }
            });
            Ok(())
        }
        CallbackExecutionMode::Sync => future.await.map_err(|e| SdkError::Callback(e.to_string())),
    }
}
