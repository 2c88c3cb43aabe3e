//! 交易对象
//!
//! `*TradeData` 是纯数据，`OnChainTrade` / `CrossChainTrade` 在数据之外持有生成它的提供方，
//! 因而可以直接 `encode`。

use crate::common::errors::SdkError;
use crate::common::tokens::{PriceTokenAmount, Token};
use crate::common::types::EvmEncodeConfig;
use crate::constants::{CrossChainTradeType, OnChainTradeType};
use crate::trading::core::params::EncodeTransactionOptions;
use crate::trading::core::traits::{CrossChainProvider, OnChainProvider};
use crate::trading::lifecycle::{self, CallbackContext};
use crate::utils::amount::{from_wei, to_wei};
use crate::utils::token;
use alloy_primitives::{Address, U256};
use bigdecimal::BigDecimal;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{debug, info};

/// gas 信息
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GasFeeInfo {
    pub gas_limit: Option<U256>,
    pub gas_price: Option<U256>,
    /// gas_limit × gas_price，以原生币计
    pub total_gas: Option<BigDecimal>,
}

impl GasFeeInfo {
    pub fn new(gas_limit: Option<U256>, gas_price: Option<U256>) -> Self {
        let total_gas = match (gas_limit, gas_price) {
            (Some(limit), Some(price)) => limit.checked_mul(price).map(|total| from_wei(total, 18)),
            _ => None,
        };
        Self { gas_limit, gas_price, total_gas }
    }
}

/// 各提供方编码时需要的路由信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnChainRoute {
    XyDex { swap_provider: String },
    Oneinch { disable_multihops: bool },
    UniswapV2 { path: Vec<Address>, deadline_minutes: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnChainTradeData {
    pub trade_type: OnChainTradeType,
    pub from: PriceTokenAmount,
    pub to: PriceTokenAmount,
    pub path: Vec<Token>,
    /// 小数形式，0.02 表示 2%
    pub slippage_tolerance: BigDecimal,
    /// 需要授权的合约（路由合约或聚合器 spender）
    pub contract_address: Address,
    pub gas_fee_info: Option<GasFeeInfo>,
    pub route: OnChainRoute,
}

impl OnChainTradeData {
    /// 扣除滑点后的最少到账数量
    pub fn to_token_amount_min(&self) -> BigDecimal {
        self.to.token_amount() * (BigDecimal::from(1) - &self.slippage_tolerance)
    }

    pub fn to_wei_amount_min(&self) -> Result<U256, SdkError> {
        to_wei(&self.to_token_amount_min(), self.to.token.decimals)
    }
}

fn check_from_address(from: Address) -> Result<(), SdkError> {
    if from.is_zero() {
        return Err(SdkError::WalletNotConnected);
    }
    Ok(())
}

fn check_receiver_address(receiver: Option<Address>) -> Result<(), SdkError> {
    match receiver {
        Some(receiver) if receiver.is_zero() => {
            Err(SdkError::InvalidAddress(format!("receiver {receiver} is the zero address")))
        }
        _ => Ok(()),
    }
}

fn apply_gas_overrides(mut tx: EvmEncodeConfig, options: &EncodeTransactionOptions) -> EvmEncodeConfig {
    if options.gas_limit.is_some() {
        tx.gas = options.gas_limit;
    }
    if options.gas_price.is_some() {
        tx.gas_price = options.gas_price;
    }
    tx
}

/// 同链交易
#[derive(Clone)]
pub struct OnChainTrade {
    data: OnChainTradeData,
    provider: Arc<dyn OnChainProvider>,
}

impl OnChainTrade {
    pub fn new(data: OnChainTradeData, provider: Arc<dyn OnChainProvider>) -> Self {
        Self { data, provider }
    }

    pub fn data(&self) -> &OnChainTradeData {
        &self.data
    }

    pub fn into_data(self) -> OnChainTradeData {
        self.data
    }

    /// 替换目标数量与路径，其余字段不变
    pub fn with_fresh_output(&self, to: PriceTokenAmount, path: Vec<Token>) -> Self {
        let mut data = self.data.clone();
        data.to = to;
        data.path = path;
        Self { data, provider: self.provider.clone() }
    }

    pub(crate) fn set_gas_fee_info(&mut self, gas_fee_info: GasFeeInfo) {
        self.data.gas_fee_info = Some(gas_fee_info);
    }

    /// 编码交易
    ///
    /// 检查发送与接收地址，重新报价并校验，随后触发生命周期回调。报价过期时返回
    /// `SdkError::UpdatedRates`，其中携带按新报价重建的交易。
    pub async fn encode(&self, options: &EncodeTransactionOptions) -> Result<EvmEncodeConfig, SdkError> {
        check_from_address(options.from_address)?;
        check_receiver_address(options.receiver_address)?;

        let tx = apply_gas_overrides(self.provider.encode(self, options).await?, options);

        let deps = self.provider.deps();
        let mode = options.callback_execution_mode.unwrap_or(deps.callback_execution_mode);
        let context = CallbackContext::new(
            tx.clone(),
            self.from.blockchain(),
            self.trade_type.as_str(),
            options.from_address,
            self.from.string_wei_amount(),
            self.to.string_wei_amount(),
        );
        lifecycle::dispatch(options.callback.as_ref(), mode, context).await?;

        info!(provider = %self.trade_type, to = %tx.to, value = %tx.value, "transaction encoded");
        Ok(tx)
    }

    /// 卖出代币对 `contract_address` 的授权是否不足
    pub async fn needs_approve(&self, owner: Address) -> Result<bool, SdkError> {
        check_from_address(owner)?;
        token::needs_approve(self.provider.deps().chain.as_ref(), &self.from, owner, self.contract_address).await
    }

    /// 无限额授权交易
    pub fn encode_approve(&self) -> Result<EvmEncodeConfig, SdkError> {
        if self.from.is_native() {
            return Err(SdkError::Encoding("native tokens do not need approval".to_string()));
        }
        Ok(token::encode_approve(self.from.token.address, self.contract_address, U256::MAX))
    }

    /// 估算 gas 上限；任何失败都返回 `None`
    pub async fn estimate_gas_limit(&self, wallet: Address) -> Option<U256> {
        let options = EncodeTransactionOptions::new(wallet);
        let tx = match self.provider.encode(self, &options).await {
            Ok(tx) => tx,
            Err(e) => {
                debug!(provider = %self.trade_type, error = %e, "gas estimation skipped");
                return None;
            }
        };
        self.provider.deps().chain.estimate_gas(self.from.blockchain(), wallet, &tx).await.ok()
    }
}

impl Deref for OnChainTrade {
    type Target = OnChainTradeData;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl fmt::Debug for OnChainTrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnChainTrade").field("data", &self.data).finish_non_exhaustive()
    }
}

/// 提供方收取的原生币费用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoFee {
    pub amount_wei: U256,
    pub token: Token,
}

impl CryptoFee {
    pub fn amount(&self) -> BigDecimal {
        from_wei(self.amount_wei, self.token.decimals)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeeInfo {
    pub provider_crypto_fee: Option<CryptoFee>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrossChainRoute {
    Stargate {
        src_pool_id: u32,
        dst_pool_id: u32,
        dst_layer_zero_chain_id: u16,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossChainTradeData {
    pub trade_type: CrossChainTradeType,
    pub from: PriceTokenAmount,
    pub to: PriceTokenAmount,
    pub to_token_amount_min: BigDecimal,
    pub slippage_tolerance: BigDecimal,
    /// 源链上的桥接合约
    pub contract_address: Address,
    pub fee_info: FeeInfo,
    pub gas_fee_info: Option<GasFeeInfo>,
    /// 计算时指定的目标链接收地址；编码参数中的接收地址优先
    pub receiver_address: Option<Address>,
    pub route: CrossChainRoute,
}

impl CrossChainTradeData {
    /// 目标链接收地址：编码参数 > 计算参数 > 发送钱包
    pub fn receiver(&self, options: &EncodeTransactionOptions) -> Address {
        options.receiver_address.or(self.receiver_address).unwrap_or(options.from_address)
    }
}

/// 跨链交易
#[derive(Clone)]
pub struct CrossChainTrade {
    data: CrossChainTradeData,
    provider: Arc<dyn CrossChainProvider>,
}

impl CrossChainTrade {
    pub fn new(data: CrossChainTradeData, provider: Arc<dyn CrossChainProvider>) -> Self {
        Self { data, provider }
    }

    pub fn data(&self) -> &CrossChainTradeData {
        &self.data
    }

    pub fn into_data(self) -> CrossChainTradeData {
        self.data
    }

    pub(crate) fn set_gas_fee_info(&mut self, gas_fee_info: GasFeeInfo) {
        self.data.gas_fee_info = Some(gas_fee_info);
    }

    pub async fn encode(&self, options: &EncodeTransactionOptions) -> Result<EvmEncodeConfig, SdkError> {
        check_from_address(options.from_address)?;
        check_receiver_address(options.receiver_address.or(self.receiver_address))?;

        let tx = apply_gas_overrides(self.provider.encode(self, options).await?, options);

        let deps = self.provider.deps();
        let mode = options.callback_execution_mode.unwrap_or(deps.callback_execution_mode);
        let context = CallbackContext::new(
            tx.clone(),
            self.from.blockchain(),
            self.trade_type.as_str(),
            options.from_address,
            self.from.string_wei_amount(),
            self.to.string_wei_amount(),
        );
        lifecycle::dispatch(options.callback.as_ref(), mode, context).await?;

        info!(provider = %self.trade_type, to = %tx.to, value = %tx.value, "cross-chain transaction encoded");
        Ok(tx)
    }

    pub async fn needs_approve(&self, owner: Address) -> Result<bool, SdkError> {
        check_from_address(owner)?;
        token::needs_approve(self.provider.deps().chain.as_ref(), &self.from, owner, self.contract_address).await
    }

    pub fn encode_approve(&self) -> Result<EvmEncodeConfig, SdkError> {
        if self.from.is_native() {
            return Err(SdkError::Encoding("native tokens do not need approval".to_string()));
        }
        Ok(token::encode_approve(self.from.token.address, self.contract_address, U256::MAX))
    }

    /// 估算源链交易的 gas 上限；任何失败都返回 `None`
    pub async fn estimate_gas_limit(&self, wallet: Address) -> Option<U256> {
        let options = EncodeTransactionOptions::new(wallet);
        let tx = match self.provider.encode(self, &options).await {
            Ok(tx) => tx,
            Err(e) => {
                debug!(provider = %self.trade_type, error = %e, "gas estimation skipped");
                return None;
            }
        };
        self.provider.deps().chain.estimate_gas(self.from.blockchain(), wallet, &tx).await.ok()
    }
}

impl Deref for CrossChainTrade {
    type Target = CrossChainTradeData;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl fmt::Debug for CrossChainTrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrossChainTrade").field("data", &self.data).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gas_fee_info_total() {
        let info = GasFeeInfo::new(Some(U256::from(200_000u64)), Some(U256::from(5_000_000_000u64)));
        assert_eq!(info.total_gas, Some(from_wei(U256::from(1_000_000_000_000_000u64), 18)));
        assert_eq!(GasFeeInfo::new(None, Some(U256::from(1u64))).total_gas, None);
    }

    #[test]
    fn test_address_checks() {
        assert!(matches!(check_from_address(Address::ZERO), Err(SdkError::WalletNotConnected)));
        assert!(check_from_address(Address::repeat_byte(1)).is_ok());
        assert!(matches!(check_receiver_address(Some(Address::ZERO)), Err(SdkError::InvalidAddress(_))));
        assert!(check_receiver_address(None).is_ok());
    }

    #[test]
    fn test_gas_overrides_only_replace_given_values() {
        let mut tx = EvmEncodeConfig::new(Address::repeat_byte(1), Vec::new(), U256::ZERO);
        tx.gas = Some(U256::from(21_000u64));
        let options = EncodeTransactionOptions::new(Address::repeat_byte(2)).with_gas(None, Some(U256::from(7u64)));
        let tx = apply_gas_overrides(tx, &options);
        assert_eq!(tx.gas, Some(U256::from(21_000u64)));
        assert_eq!(tx.gas_price, Some(U256::from(7u64)));
    }
}
