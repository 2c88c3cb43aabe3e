use crate::common::errors::SdkError;
use crate::common::mock_chain::MockChainReader;
use crate::common::mock_http::MockHttpClient;
use crate::common::tokens::{PriceToken, PriceTokenAmount, Token};
use crate::common::types::EvmEncodeConfig;
use crate::constants::{BlockchainName, OnChainTradeType};
use crate::trading::core::params::{EncodeTransactionOptions, OnChainCalculationOptions};
use crate::trading::core::trade::{OnChainRoute, OnChainTrade, OnChainTradeData};
use crate::trading::core::traits::{OnChainProvider, ProviderDeps, RouteLookup};
use crate::trading::registry::ProviderConfig;
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use std::sync::Arc;

pub(crate) struct StubProvider {
    config: ProviderConfig,
    deps: ProviderDeps,
}

impl StubProvider {
    pub(crate) fn new() -> Self {
        Self {
            config: ProviderConfig::new(vec![BlockchainName::Ethereum]),
            deps: ProviderDeps::new(Arc::new(MockHttpClient::new()), Arc::new(MockChainReader::new())),
        }
    }
}

#[async_trait]
impl OnChainProvider for StubProvider {
    fn trade_type(&self) -> OnChainTradeType {
        OnChainTradeType::XyDex
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn deps(&self) -> &ProviderDeps {
        &self.deps
    }

    async fn calculate(
        &self,
        _from: &PriceTokenAmount,
        _to: &PriceToken,
        _options: &OnChainCalculationOptions,
    ) -> Result<RouteLookup<OnChainTradeData>, SdkError> {
        Ok(RouteLookup::NoRoute("stub".to_string()))
    }

    async fn encode(
        &self,
        _trade: &OnChainTrade,
        _options: &EncodeTransactionOptions,
    ) -> Result<EvmEncodeConfig, SdkError> {
        Ok(sample_transaction())
    }
}

pub(crate) fn sample_transaction() -> EvmEncodeConfig {
    EvmEncodeConfig::new(Address::repeat_byte(0xc0), vec![0x12, 0x34], U256::ZERO)
}

/// 目标代币 0 位小数，便于直接用整数表达数量
pub(crate) fn sample_trade(expected_to_wei: u64) -> OnChainTrade {
    let from = Token::new(BlockchainName::Ethereum, Address::repeat_byte(0x0a), 6, "USDC", "USD Coin");
    let to = Token::new(BlockchainName::Ethereum, Address::repeat_byte(0x0b), 0, "IDX", "Index");
    let data = OnChainTradeData {
        trade_type: OnChainTradeType::XyDex,
        from: PriceTokenAmount::from_wei(from.clone(), U256::from(1_000_000_000u64)),
        to: PriceTokenAmount::from_wei(to.clone(), U256::from(expected_to_wei)),
        path: vec![from, to],
        slippage_tolerance: BigDecimal::new(1.into(), 2),
        contract_address: Address::repeat_byte(0xc0),
        gas_fee_info: None,
        route: OnChainRoute::XyDex { swap_provider: "stub".to_string() },
    };
    OnChainTrade::new(data, Arc::new(StubProvider::new()))
}
