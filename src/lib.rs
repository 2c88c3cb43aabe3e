pub mod common;
pub mod constants;
pub mod providers;
pub mod trading;
pub mod utils;

pub use crate::common::errors::SdkError;
pub use crate::common::tokens::{PriceToken, PriceTokenAmount, Token};
pub use crate::common::types::{CallbackExecutionMode, EvmEncodeConfig, SdkConfig};
pub use crate::constants::{BlockchainName, CrossChainTradeType, OnChainTradeType};
pub use crate::trading::{
    CalculationResult, CallbackContext, CallbackRef, CrossChainCalculationOptions, CrossChainTrade,
    EncodeTransactionOptions, GasCalculation, NoopCallback, OnChainCalculationOptions, OnChainTrade,
    ProviderRegistry, RateTolerance, TransactionLifecycleCallback,
};

use crate::common::chain_reader::{ChainReader, RpcChainReader};
use crate::common::http_client::{HttpClient, HttpClientConfig, ReqwestHttpClient};
use crate::trading::core::trade::GasFeeInfo;
use crate::trading::core::traits::{CrossChainProvider, OnChainProvider, ProviderDeps, RouteLookup};
use alloy_primitives::U256;
use futures::future::join_all;
use std::cmp::Reverse;
use std::sync::Arc;

/// 同链计算结果，附带提供方类型
pub type OnChainCalculation = (OnChainTradeType, CalculationResult<OnChainTrade>);

/// 跨链计算结果，附带提供方类型
pub type CrossChainCalculation = (CrossChainTradeType, CalculationResult<CrossChainTrade>);

/// 按结果好坏排序用的键：找到的交易按到账数量从大到小，其后是无路径，最后是失败
fn rank<T>(result: &CalculationResult<T>, amount: impl Fn(&T) -> U256) -> (u8, Reverse<U256>) {
    match result {
        CalculationResult::Found(trade) => (0, Reverse(amount(trade))),
        CalculationResult::NoRoute { .. } => (1, Reverse(U256::ZERO)),
        CalculationResult::Failed(_) => (2, Reverse(U256::ZERO)),
    }
}

fn into_calculation<T, D>(
    lookup: Result<RouteLookup<D>, SdkError>,
    wrap: impl FnOnce(D) -> T,
) -> CalculationResult<T> {
    match lookup {
        Ok(RouteLookup::Found(data)) => CalculationResult::Found(wrap(data)),
        Ok(RouteLookup::NoRoute(reason)) => CalculationResult::NoRoute { reason },
        Err(err) => CalculationResult::Failed(err),
    }
}

/// SDK 入口
///
/// 持有全部提供方共享的配置与外部依赖。计算得到的交易对象自带生成它的提供方，
/// 因此可以直接 `encode`。
#[derive(Clone)]
pub struct SwapSdk {
    config: SdkConfig,
    deps: ProviderDeps,
    registry: ProviderRegistry,
}

impl SwapSdk {
    /// 使用 reqwest 的 HTTP 客户端和 JSON-RPC 读取器创建 SDK
    ///
    /// # 参数
    /// * `config` - RPC 地址、API 地址、超时、代理与默认钱包等配置
    ///
    /// # 错误
    /// HTTP 客户端无法构建（例如代理地址无效）时返回 `SdkError::Config`
    pub fn new(config: SdkConfig) -> Result<Self, SdkError> {
        let http = ReqwestHttpClient::new(HttpClientConfig {
            timeout_millis: config.http_timeout_millis,
            proxy_url: config.proxy_url.clone(),
        })?;
        let chain = RpcChainReader::new(
            config.rpc_urls.clone(),
            config.http_timeout_millis,
            config.proxy_url.as_deref(),
        )?;
        Ok(Self::with_dependencies(config, Arc::new(http), Arc::new(chain)))
    }

    /// 使用外部提供的 HTTP 客户端与链上读取器（测试中传入 mock）
    pub fn with_dependencies(config: SdkConfig, http: Arc<dyn HttpClient>, chain: Arc<dyn ChainReader>) -> Self {
        let mut deps = ProviderDeps::new(http, chain);
        deps.wallet_address = config.wallet_address;
        deps.provider_address = config.provider_address;
        deps.callback_execution_mode = config.callback_execution_mode;

        let registry = ProviderRegistry::with_defaults(&config, deps.clone());
        log::debug!("swap sdk initialized with {} rpc endpoints", config.rpc_urls.len());
        Self { config, deps, registry }
    }

    /// 替换提供方注册表（例如注册自定义提供方）
    pub fn with_registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// 用指定提供方计算同链交易
    pub async fn calculate(
        &self,
        trade_type: OnChainTradeType,
        from: &PriceTokenAmount,
        to: &PriceToken,
        options: &OnChainCalculationOptions,
    ) -> CalculationResult<OnChainTrade> {
        log::debug!("calculate {trade_type}: {} {} -> {}", from.token_amount(), from.token, to.token);
        let Some(provider) = self.registry.on_chain(trade_type) else {
            return CalculationResult::NoRoute { reason: format!("{trade_type} is not registered") };
        };
        self.calculate_with(provider, from, to, options).await
    }

    /// 所有支持该链的同链提供方并发计算，结果按到账数量从高到低排序
    pub async fn calculate_all(
        &self,
        from: &PriceTokenAmount,
        to: &PriceToken,
        options: &OnChainCalculationOptions,
    ) -> Vec<OnChainCalculation> {
        let providers = self.registry.on_chain_providers_for(from.blockchain());
        log::debug!("calculate {} providers: {} -> {}", providers.len(), from.token, to.token);

        let mut results = join_all(providers.into_iter().map(|provider| async move {
            let trade_type = provider.trade_type();
            (trade_type, self.calculate_with(provider, from, to, options).await)
        }))
        .await;
        results.sort_by_key(|(_, result)| rank(result, |trade| trade.to.wei_amount));
        results
    }

    async fn calculate_with(
        &self,
        provider: Arc<dyn OnChainProvider>,
        from: &PriceTokenAmount,
        to: &PriceToken,
        options: &OnChainCalculationOptions,
    ) -> CalculationResult<OnChainTrade> {
        if !provider.is_supported_blockchain(from.blockchain()) {
            return CalculationResult::NoRoute {
                reason: format!("{} does not support {}", provider.trade_type(), from.blockchain()),
            };
        }

        let lookup = provider.calculate(from, to, options).await;
        let mut result = into_calculation(lookup, |data| OnChainTrade::new(data, provider.clone()));

        let wallet = options.from_address.or(self.deps.wallet_address);
        if let (CalculationResult::Found(trade), Some(wallet)) = (&mut result, wallet) {
            if options.gas_calculation == GasCalculation::Calculate && trade.gas_fee_info.is_none() {
                let gas_limit = trade.estimate_gas_limit(wallet).await;
                if let Some(gas_fee_info) = self.gas_fee_info(trade.from.blockchain(), gas_limit).await {
                    trade.set_gas_fee_info(gas_fee_info);
                }
            }
        }
        result
    }

    /// 有 gas 上限时补上 gas 价格；上限估算失败则不填
    async fn gas_fee_info(&self, blockchain: BlockchainName, gas_limit: Option<U256>) -> Option<GasFeeInfo> {
        let gas_limit = gas_limit?;
        let gas_price = match self.deps.chain.gas_price(blockchain).await {
            Ok(price) => Some(price),
            Err(e) => {
                log::debug!("gas price unavailable for {blockchain}: {e}");
                None
            }
        };
        Some(GasFeeInfo::new(Some(gas_limit), gas_price))
    }

    /// 用指定桥计算跨链交易
    pub async fn calculate_cross_chain(
        &self,
        trade_type: CrossChainTradeType,
        from: &PriceTokenAmount,
        to: &PriceToken,
        options: &CrossChainCalculationOptions,
    ) -> CalculationResult<CrossChainTrade> {
        log::debug!("calculate {trade_type}: {} {} -> {}", from.token_amount(), from.token, to.token);
        let Some(provider) = self.registry.cross_chain(trade_type) else {
            return CalculationResult::NoRoute { reason: format!("{trade_type} is not registered") };
        };
        self.calculate_cross_chain_with(provider, from, to, options).await
    }

    /// 所有跨链提供方并发计算，结果按最少到账数量从高到低排序
    pub async fn calculate_cross_chain_all(
        &self,
        from: &PriceTokenAmount,
        to: &PriceToken,
        options: &CrossChainCalculationOptions,
    ) -> Vec<CrossChainCalculation> {
        let providers = self.registry.cross_chain_providers();
        let mut results = join_all(providers.into_iter().map(|provider| async move {
            let trade_type = provider.trade_type();
            (trade_type, self.calculate_cross_chain_with(provider, from, to, options).await)
        }))
        .await;
        results.sort_by_key(|(_, result)| rank(result, |trade| trade.to.wei_amount));
        results
    }

    async fn calculate_cross_chain_with(
        &self,
        provider: Arc<dyn CrossChainProvider>,
        from: &PriceTokenAmount,
        to: &PriceToken,
        options: &CrossChainCalculationOptions,
    ) -> CalculationResult<CrossChainTrade> {
        let (src, dst) = (from.blockchain(), to.token.blockchain);
        if !provider.is_supported_blockchain(src) || !provider.is_supported_blockchain(dst) {
            return CalculationResult::NoRoute {
                reason: format!("{} does not support {src} -> {dst}", provider.trade_type()),
            };
        }
        let lookup = provider.calculate(from, to, options).await;
        let mut result = into_calculation(lookup, |data| CrossChainTrade::new(data, provider.clone()));

        let wallet = options.from_address.or(self.deps.wallet_address);
        if let (CalculationResult::Found(trade), Some(wallet)) = (&mut result, wallet) {
            if options.gas_calculation == GasCalculation::Calculate && trade.gas_fee_info.is_none() {
                let gas_limit = trade.estimate_gas_limit(wallet).await;
                if let Some(gas_fee_info) = self.gas_fee_info(src, gas_limit).await {
                    trade.set_gas_fee_info(gas_fee_info);
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::mock_chain::MockChainReader;
    use crate::common::mock_http::MockHttpClient;

    #[test]
    fn test_rank_orders_found_before_failures() {
        let mut results: Vec<CalculationResult<U256>> = vec![
            CalculationResult::Failed(SdkError::WalletNotConnected),
            CalculationResult::Found(U256::from(5u64)),
            CalculationResult::NoRoute { reason: "none".to_string() },
            CalculationResult::Found(U256::from(9u64)),
        ];
        results.sort_by_key(|result| rank(result, |amount| *amount));
        assert_eq!(results[0].trade(), Some(&U256::from(9u64)));
        assert_eq!(results[1].trade(), Some(&U256::from(5u64)));
        assert!(matches!(results[2], CalculationResult::NoRoute { .. }));
        assert!(results[3].error().is_some());
    }

    #[tokio::test]
    async fn test_unsupported_chain_is_no_route() {
        let sdk = SwapSdk::with_dependencies(
            SdkConfig::default(),
            Arc::new(MockHttpClient::new()),
            Arc::new(MockChainReader::new()),
        );
        let from = PriceTokenAmount::from_wei(Token::native(BlockchainName::Kava), U256::from(1u64));
        let to = PriceToken::from(Token::native(BlockchainName::Kava));
        let result = sdk
            .calculate(OnChainTradeType::UniswapV2, &from, &to, &OnChainCalculationOptions::default())
            .await;
        assert!(matches!(result, CalculationResult::NoRoute { .. }));
    }
}
