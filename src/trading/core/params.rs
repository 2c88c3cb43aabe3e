//! 计算与编码参数

use crate::common::types::CallbackExecutionMode;
use crate::trading::lifecycle::CallbackRef;
use alloy_primitives::{Address, U256};
use bigdecimal::BigDecimal;
use num_bigint::BigInt;

/// 默认滑点 2%
pub fn default_slippage() -> BigDecimal {
    BigDecimal::new(BigInt::from(2), 2)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GasCalculation {
    /// 计算时估算 gas（需要已知钱包地址）
    Calculate,
    #[default]
    Disabled,
}

/// 同链交易计算参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnChainCalculationOptions {
    /// 滑点（小数，0.02 表示 2%）
    pub slippage_tolerance: BigDecimal,
    pub gas_calculation: GasCalculation,
    /// 只允许直连路径
    pub disable_multihops: bool,
    /// 路由合约交易的截止时间（分钟）
    pub deadline_minutes: u64,
    /// 覆盖配置中的钱包地址
    pub from_address: Option<Address>,
}

impl Default for OnChainCalculationOptions {
    fn default() -> Self {
        Self {
            slippage_tolerance: default_slippage(),
            gas_calculation: GasCalculation::default(),
            disable_multihops: false,
            deadline_minutes: 20,
            from_address: None,
        }
    }
}

impl OnChainCalculationOptions {
    pub fn with_slippage(mut self, slippage_tolerance: BigDecimal) -> Self {
        self.slippage_tolerance = slippage_tolerance;
        self
    }

    pub fn with_gas_calculation(mut self, gas_calculation: GasCalculation) -> Self {
        self.gas_calculation = gas_calculation;
        self
    }

    pub fn with_disable_multihops(mut self, disable_multihops: bool) -> Self {
        self.disable_multihops = disable_multihops;
        self
    }

    pub fn with_deadline_minutes(mut self, deadline_minutes: u64) -> Self {
        self.deadline_minutes = deadline_minutes;
        self
    }

    pub fn with_from_address(mut self, from_address: Address) -> Self {
        self.from_address = Some(from_address);
        self
    }
}

/// 跨链交易计算参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossChainCalculationOptions {
    pub slippage_tolerance: BigDecimal,
    /// 估算源链交易的 gas（需要已知钱包地址）
    pub gas_calculation: GasCalculation,
    pub from_address: Option<Address>,
    /// 目标链接收地址，编码时未指定接收地址则使用它
    pub receiver_address: Option<Address>,
}

impl Default for CrossChainCalculationOptions {
    fn default() -> Self {
        Self {
            slippage_tolerance: default_slippage(),
            gas_calculation: GasCalculation::default(),
            from_address: None,
            receiver_address: None,
        }
    }
}

impl CrossChainCalculationOptions {
    pub fn with_slippage(mut self, slippage_tolerance: BigDecimal) -> Self {
        self.slippage_tolerance = slippage_tolerance;
        self
    }

    pub fn with_gas_calculation(mut self, gas_calculation: GasCalculation) -> Self {
        self.gas_calculation = gas_calculation;
        self
    }

    pub fn with_from_address(mut self, from_address: Address) -> Self {
        self.from_address = Some(from_address);
        self
    }

    pub fn with_receiver_address(mut self, receiver_address: Address) -> Self {
        self.receiver_address = Some(receiver_address);
        self
    }
}

/// 编码参数
#[derive(Clone)]
pub struct EncodeTransactionOptions {
    /// 发送交易的钱包
    pub from_address: Address,
    /// 接收地址，默认与 `from_address` 相同
    pub receiver_address: Option<Address>,
    pub gas_limit: Option<U256>,
    pub gas_price: Option<U256>,
    /// 交易编码完成后的回调
    pub callback: Option<CallbackRef>,
    /// 覆盖配置中的回调执行模式
    pub callback_execution_mode: Option<CallbackExecutionMode>,
}

impl EncodeTransactionOptions {
    pub fn new(from_address: Address) -> Self {
        Self {
            from_address,
            receiver_address: None,
            gas_limit: None,
            gas_price: None,
            callback: None,
            callback_execution_mode: None,
        }
    }

    pub fn with_receiver(mut self, receiver_address: Address) -> Self {
        self.receiver_address = Some(receiver_address);
        self
    }

    pub fn with_gas(mut self, gas_limit: Option<U256>, gas_price: Option<U256>) -> Self {
        self.gas_limit = gas_limit;
        self.gas_price = gas_price;
        self
    }

    pub fn with_callback(mut self, callback: CallbackRef, mode: Option<CallbackExecutionMode>) -> Self {
        self.callback = Some(callback);
        self.callback_execution_mode = mode;
        self
    }

    pub fn receiver(&self) -> Address {
        self.receiver_address.unwrap_or(self.from_address)
    }
}
