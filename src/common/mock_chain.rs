//! 测试用的链上读取器：按 (链, 合约, calldata) 返回预置结果

use crate::common::chain_reader::ChainReader;
use crate::common::errors::SdkError;
use crate::common::types::EvmEncodeConfig;
use crate::constants::BlockchainName;
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

type CallKey = (BlockchainName, Address, Vec<u8>);
type SelectorKey = (BlockchainName, Address, [u8; 4]);

/// 预置的调用结果
#[derive(Debug, Clone)]
enum CallOutcome {
    Output(Bytes),
    /// 合约 revert
    Revert(String),
    /// 请求没有到达节点
    Unreachable(String),
}

pub struct MockChainReader {
    exact: DashMap<CallKey, CallOutcome>,
    by_selector: DashMap<SelectorKey, CallOutcome>,
    /// 设置后所有 `eth_call` 都以网络错误失败
    offline: Mutex<Option<String>>,
    gas_price: Mutex<Result<U256, String>>,
    gas_limit: Mutex<Result<U256, String>>,
    calls: AtomicUsize,
}

impl Default for MockChainReader {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChainReader {
    pub fn new() -> Self {
        Self {
            exact: DashMap::new(),
            by_selector: DashMap::new(),
            offline: Mutex::new(None),
            gas_price: Mutex::new(Ok(U256::from(1_000_000_000u64))),
            gas_limit: Mutex::new(Ok(U256::from(200_000u64))),
            calls: AtomicUsize::new(0),
        }
    }

    /// 完全匹配 calldata 的返回值（`output` 为 ABI 编码的返回数据）
    pub fn on_call<C: SolCall>(&self, blockchain: BlockchainName, contract: Address, call: &C, output: Vec<u8>) {
        self.exact.insert((blockchain, contract, call.abi_encode()), CallOutcome::Output(Bytes::from(output)));
    }

    /// 只匹配函数选择器的返回值，优先级低于 `on_call`
    pub fn on_selector<C: SolCall>(&self, blockchain: BlockchainName, contract: Address, output: Vec<u8>) {
        self.by_selector.insert((blockchain, contract, C::SELECTOR), CallOutcome::Output(Bytes::from(output)));
    }

    /// 让某个函数调用 revert
    pub fn revert_selector<C: SolCall>(&self, blockchain: BlockchainName, contract: Address, reason: &str) {
        self.by_selector.insert((blockchain, contract, C::SELECTOR), CallOutcome::Revert(reason.to_string()));
    }

    /// 让某个函数调用以网络错误失败
    pub fn fail_selector<C: SolCall>(&self, blockchain: BlockchainName, contract: Address, reason: &str) {
        self.by_selector.insert((blockchain, contract, C::SELECTOR), CallOutcome::Unreachable(reason.to_string()));
    }

    /// 节点不可达：之后的所有 `eth_call` 都返回网络错误
    pub fn set_offline(&self, reason: &str) {
        *self.offline.lock() = Some(reason.to_string());
    }

    pub fn set_gas_price(&self, gas_price: U256) {
        *self.gas_price.lock() = Ok(gas_price);
    }

    pub fn set_gas_limit(&self, gas_limit: Result<U256, String>) {
        *self.gas_limit.lock() = gas_limit;
    }

    /// 已执行的 `eth_call` 次数
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ChainReader for MockChainReader {
    async fn call(&self, blockchain: BlockchainName, to: Address, data: Bytes) -> Result<Bytes, SdkError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let context = format!("eth_call to {to} on {blockchain}");
        if let Some(reason) = self.offline.lock().clone() {
            return Err(SdkError::external(context, reason));
        }

        let exact = self.exact.get(&(blockchain, to, data.to_vec())).map(|entry| entry.value().clone());
        let response = match exact {
            Some(response) => Some(response),
            None if data.len() >= 4 => {
                let mut selector = [0u8; 4];
                selector.copy_from_slice(&data[..4]);
                self.by_selector.get(&(blockchain, to, selector)).map(|entry| entry.value().clone())
            }
            None => None,
        };

        match response {
            Some(CallOutcome::Output(output)) => Ok(output),
            Some(CallOutcome::Revert(reason)) => Err(SdkError::reverted(context, reason)),
            Some(CallOutcome::Unreachable(reason)) => Err(SdkError::external(context, reason)),
            // 未预置的调用按空池处理
            None => Err(SdkError::reverted(context, "no data")),
        }
    }

    async fn estimate_gas(
        &self,
        blockchain: BlockchainName,
        _from: Address,
        tx: &EvmEncodeConfig,
    ) -> Result<U256, SdkError> {
        self.gas_limit
            .lock()
            .clone()
            .map_err(|reason| SdkError::external(format!("eth_estimateGas to {} on {blockchain}", tx.to), reason))
    }

    async fn gas_price(&self, blockchain: BlockchainName) -> Result<U256, SdkError> {
        self.gas_price
            .lock()
            .clone()
            .map_err(|reason| SdkError::external(format!("eth_gasPrice on {blockchain}"), reason))
    }
}
