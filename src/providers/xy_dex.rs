//! XY Dex：基于 XY Finance 聚合器 API 的同链兑换

use crate::common::errors::SdkError;
use crate::common::http_client::{get_typed, join_url, to_query};
use crate::common::tokens::{PriceToken, PriceTokenAmount};
use crate::common::types::{EvmEncodeConfig, SdkConfig};
use crate::constants::{OnChainTradeType, to_aggregator_address};
use crate::providers::utils::xy_dex::{
    XY_DEX_NAME, XY_SUPPORTED_BLOCKCHAINS, XyBuildTxRequest, XyBuildTxResponse, XyQuoteRequest, XyQuoteResponse,
    xy_error_message,
};
use crate::providers::utils::{api_transaction, parse_address};
use crate::trading::core::params::{EncodeTransactionOptions, GasCalculation, OnChainCalculationOptions};
use crate::trading::core::pipeline::{FreshQuote, run_encode_pipeline};
use crate::trading::core::trade::{GasFeeInfo, OnChainRoute, OnChainTrade, OnChainTradeData};
use crate::trading::core::traits::{OnChainProvider, ProviderDeps, RouteLookup};
use crate::trading::registry::ProviderConfig;
use crate::utils::amount::{format_decimal, parse_quantity};
use crate::utils::quote::Quote;
use crate::utils::token;
use alloy_primitives::Address;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use tracing::debug;

pub fn default_config(config: &SdkConfig) -> ProviderConfig {
    ProviderConfig::new(XY_SUPPORTED_BLOCKCHAINS.to_vec()).with_api(config.xy_api_url.clone(), None)
}

pub struct XyDexProvider {
    config: ProviderConfig,
    deps: ProviderDeps,
}

impl XyDexProvider {
    pub fn new(config: ProviderConfig, deps: ProviderDeps) -> Self {
        Self { config, deps }
    }

    fn endpoint(&self, path: &str) -> String {
        let base = self.config.api_base_url.as_deref().unwrap_or(crate::common::types::DEFAULT_XY_API_URL);
        join_url(base, path)
    }

    fn quote_request(
        &self,
        from: &PriceTokenAmount,
        to_address: Address,
        slippage_tolerance: &BigDecimal,
    ) -> XyQuoteRequest {
        let chain_id = from.blockchain().chain_id();
        XyQuoteRequest {
            src_chain_id: chain_id,
            src_quote_token_address: to_aggregator_address(from.token.address).to_string(),
            src_quote_token_amount: from.string_wei_amount(),
            dst_chain_id: chain_id,
            dst_quote_token_address: to_aggregator_address(to_address).to_string(),
            slippage: format_decimal(&(slippage_tolerance * BigDecimal::from(100))),
        }
    }
}

#[async_trait]
impl OnChainProvider for XyDexProvider {
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
        from: &PriceTokenAmount,
        to: &PriceToken,
        options: &OnChainCalculationOptions,
    ) -> Result<RouteLookup<OnChainTradeData>, SdkError> {
        let blockchain = from.blockchain();
        if blockchain != to.token.blockchain {
            return Err(SdkError::unsupported(XY_DEX_NAME, "tokens are on different blockchains"));
        }
        if !self.is_supported_blockchain(blockchain) {
            return Err(SdkError::unsupported(XY_DEX_NAME, format!("{blockchain} is not supported")));
        }

        let request = self.quote_request(from, to.token.address, &options.slippage_tolerance);
        let response: XyQuoteResponse =
            get_typed(self.deps.http.as_ref(), &self.endpoint("quote"), &to_query(&request)?, &Vec::new()).await?;
        if !response.success {
            return Err(SdkError::external(
                "XY quote",
                xy_error_message(response.error_code.as_deref(), response.error_msg.as_deref()),
            ));
        }
        let Some(route) = response.best_route() else {
            return Ok(RouteLookup::NoRoute(format!("XY has no route for {} -> {}", from.token, to.token)));
        };

        let to_amount_wei = parse_quantity(&route.dst_quote_token_amount)?;
        let contract_address = parse_address(&route.contract_address)?;
        let swap_provider = route.swap_provider().unwrap_or_default().to_string();
        debug!(provider = XY_DEX_NAME, %swap_provider, %to_amount_wei, "XY quote received");

        // 已知钱包时，授权不足直接报错，调用方先授权 XY 合约再计算
        if let Some(wallet) = options.from_address.or(self.deps.wallet_address) {
            if token::needs_approve(self.deps.chain.as_ref(), from, wallet, contract_address).await? {
                debug!(provider = XY_DEX_NAME, %wallet, spender = %contract_address, "approve needed");
                return Err(SdkError::ApproveNeeded { spender: contract_address });
            }
        }

        let gas_fee_info = match options.gas_calculation {
            GasCalculation::Calculate => {
                let gas_limit = route.estimated_gas.as_deref().and_then(|gas| parse_quantity(gas).ok());
                let gas_price = self.deps.chain.gas_price(blockchain).await.ok();
                Some(GasFeeInfo::new(gas_limit, gas_price))
            }
            GasCalculation::Disabled => None,
        };

        let to_amount = PriceTokenAmount::from_wei(to.token.clone(), to_amount_wei).with_price(to.price.clone());
        Ok(RouteLookup::Found(OnChainTradeData {
            trade_type: OnChainTradeType::XyDex,
            from: from.clone(),
            path: vec![from.token.clone(), to.token.clone()],
            to: to_amount,
            slippage_tolerance: options.slippage_tolerance.clone(),
            contract_address,
            gas_fee_info,
            route: OnChainRoute::XyDex { swap_provider },
        }))
    }

    async fn encode(
        &self,
        trade: &OnChainTrade,
        options: &EncodeTransactionOptions,
    ) -> Result<EvmEncodeConfig, SdkError> {
        let OnChainRoute::XyDex { swap_provider } = &trade.route else {
            return Err(SdkError::Encoding("trade was not calculated by XY".to_string()));
        };
        let request = XyBuildTxRequest {
            quote: self.quote_request(&trade.from, trade.to.token.address, &trade.slippage_tolerance),
            receiver: options.receiver().to_string(),
            src_swap_provider: swap_provider.clone(),
        };
        let query = to_query(&request)?;
        let url = self.endpoint("buildTx");

        let fetch = async {
            let response: XyBuildTxResponse = get_typed(self.deps.http.as_ref(), &url, &query, &Vec::new()).await?;
            if !response.success {
                return Err(SdkError::external(
                    "XY buildTx",
                    xy_error_message(response.error_code.as_deref(), response.error_msg.as_deref()),
                ));
            }
            let (Some(route), Some(tx)) = (response.route, response.tx) else {
                return Err(SdkError::external("XY buildTx", "response has no route or transaction"));
            };
            Ok(FreshQuote {
                quote: Quote::from_wei_strings(&route.dst_quote_token_amount, route.min_receive_amount.as_deref())?,
                transaction: api_transaction(&tx.to, &tx.data, &tx.value)?,
            })
        };
        run_encode_pipeline(trade, &self.config.tolerance, fetch).await
    }
}
