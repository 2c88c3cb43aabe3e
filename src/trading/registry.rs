//! 提供方注册表
//!
//! 每个提供方的可变部分（支持的链、合约地址、报价容差、API 地址）都在 `ProviderConfig`
//! 中声明，注册表按交易类型分发到对应的提供方。

use crate::common::types::SdkConfig;
use crate::constants::{BlockchainName, CrossChainTradeType, OnChainTradeType};
use crate::providers::oneinch::{self, OneinchProvider};
use crate::providers::stargate::StargateProvider;
use crate::providers::uniswap_v2::{UNISWAP_V2_DEXES, UniswapV2Provider};
use crate::providers::xy_dex::{self, XyDexProvider};
use crate::trading::core::rate_validator::RateTolerance;
use crate::trading::core::traits::{CrossChainProvider, OnChainProvider, ProviderDeps};
use alloy_primitives::Address;
use std::collections::HashMap;
use std::sync::Arc;

/// 提供方配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub blockchains: Vec<BlockchainName>,
    /// 固定的路由合约；聚合器 API 提供方为空，合约地址来自报价
    pub contract_address: Option<Address>,
    /// 编码前校验新报价时使用的容差
    pub tolerance: RateTolerance,
    pub api_base_url: Option<String>,
    pub api_key: Option<String>,
}

impl ProviderConfig {
    pub fn new(blockchains: Vec<BlockchainName>) -> Self {
        Self {
            blockchains,
            contract_address: None,
            tolerance: RateTolerance::default(),
            api_base_url: None,
            api_key: None,
        }
    }

    pub fn with_contract_address(mut self, contract_address: Address) -> Self {
        self.contract_address = Some(contract_address);
        self
    }

    pub fn with_tolerance(mut self, tolerance: RateTolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_api(mut self, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        self.api_base_url = Some(base_url.into());
        self.api_key = api_key;
        self
    }

    pub fn supports(&self, blockchain: BlockchainName) -> bool {
        self.blockchains.contains(&blockchain)
    }
}

fn apply_tolerance_override(
    config: &SdkConfig,
    trade_type: OnChainTradeType,
    provider_config: ProviderConfig,
) -> ProviderConfig {
    match config.tolerance_overrides.get(&trade_type) {
        Some(tolerance) => provider_config.with_tolerance(tolerance.clone()),
        None => provider_config,
    }
}

/// 提供方注册表
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    on_chain: HashMap<OnChainTradeType, Arc<dyn OnChainProvider>>,
    cross_chain: HashMap<CrossChainTradeType, Arc<dyn CrossChainProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册全部内置提供方，并应用配置中的容差覆盖
    pub fn with_defaults(config: &SdkConfig, deps: ProviderDeps) -> Self {
        let mut registry = Self::new();

        let xy_config = apply_tolerance_override(config, OnChainTradeType::XyDex, xy_dex::default_config(config));
        registry.register_on_chain(Arc::new(XyDexProvider::new(xy_config, deps.clone())));

        let oneinch_config =
            apply_tolerance_override(config, OnChainTradeType::Oneinch, oneinch::default_config(config));
        registry.register_on_chain(Arc::new(OneinchProvider::new(oneinch_config, deps.clone())));

        for dex in UNISWAP_V2_DEXES.iter() {
            let dex_config = apply_tolerance_override(config, dex.trade_type, dex.provider_config());
            registry.register_on_chain(Arc::new(UniswapV2Provider::new(dex.clone(), dex_config, deps.clone())));
        }

        registry.register_cross_chain(Arc::new(StargateProvider::new(deps)));
        registry
    }

    /// 注册（或替换）同链提供方
    pub fn register_on_chain(&mut self, provider: Arc<dyn OnChainProvider>) {
        self.on_chain.insert(provider.trade_type(), provider);
    }

    pub fn register_cross_chain(&mut self, provider: Arc<dyn CrossChainProvider>) {
        self.cross_chain.insert(provider.trade_type(), provider);
    }

    pub fn on_chain(&self, trade_type: OnChainTradeType) -> Option<Arc<dyn OnChainProvider>> {
        self.on_chain.get(&trade_type).cloned()
    }

    pub fn cross_chain(&self, trade_type: CrossChainTradeType) -> Option<Arc<dyn CrossChainProvider>> {
        self.cross_chain.get(&trade_type).cloned()
    }

    /// 支持指定链的同链提供方
    pub fn on_chain_providers_for(&self, blockchain: BlockchainName) -> Vec<Arc<dyn OnChainProvider>> {
        let mut providers: Vec<_> = self
            .on_chain
            .values()
            .filter(|provider| provider.is_supported_blockchain(blockchain))
            .cloned()
            .collect();
        providers.sort_by_key(|provider| provider.trade_type().as_str());
        providers
    }

    pub fn cross_chain_providers(&self) -> Vec<Arc<dyn CrossChainProvider>> {
        self.cross_chain.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::mock_chain::MockChainReader;
    use crate::common::mock_http::MockHttpClient;
    use bigdecimal::BigDecimal;

    fn deps() -> ProviderDeps {
        ProviderDeps::new(Arc::new(MockHttpClient::new()), Arc::new(MockChainReader::new()))
    }

    #[test]
    fn test_defaults_register_every_provider() {
        let registry = ProviderRegistry::with_defaults(&SdkConfig::default(), deps());
        for trade_type in OnChainTradeType::ALL {
            assert!(registry.on_chain(trade_type).is_some(), "{trade_type} missing");
        }
        assert!(registry.cross_chain(CrossChainTradeType::Stargate).is_some());
    }

    #[test]
    fn test_providers_filtered_by_blockchain() {
        let registry = ProviderRegistry::with_defaults(&SdkConfig::default(), deps());
        let avalanche: Vec<_> = registry
            .on_chain_providers_for(BlockchainName::Avalanche)
            .iter()
            .map(|p| p.trade_type())
            .collect();
        assert!(avalanche.contains(&OnChainTradeType::Pangolin));
        assert!(avalanche.contains(&OnChainTradeType::SushiSwap));
        assert!(!avalanche.contains(&OnChainTradeType::UniswapV2));

        let ethereum: Vec<_> = registry
            .on_chain_providers_for(BlockchainName::Ethereum)
            .iter()
            .map(|p| p.trade_type())
            .collect();
        assert!(ethereum.contains(&OnChainTradeType::UniswapV2));
        assert!(!ethereum.contains(&OnChainTradeType::Pangolin));
    }

    #[test]
    fn test_tolerance_override_applies() {
        let strict = RateTolerance::new(BigDecimal::from(0), BigDecimal::from(0)).unwrap();
        let config = SdkConfig::default().with_tolerance(OnChainTradeType::XyDex, strict.clone());
        let registry = ProviderRegistry::with_defaults(&config, deps());

        let xy = registry.on_chain(OnChainTradeType::XyDex).unwrap();
        assert_eq!(xy.config().tolerance, strict);
        let oneinch = registry.on_chain(OnChainTradeType::Oneinch).unwrap();
        assert_eq!(oneinch.config().tolerance, RateTolerance::default());
    }
}
