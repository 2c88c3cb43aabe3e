//! 1inch：基于 1inch 聚合器 API 的同链兑换

use crate::common::errors::SdkError;
use crate::common::http_client::{Headers, get_typed, join_url, to_query};
use crate::common::tokens::{PriceToken, PriceTokenAmount, Token};
use crate::common::types::{DEFAULT_ONEINCH_API_URL, EvmEncodeConfig, SdkConfig};
use crate::constants::{BlockchainName, OnChainTradeType, to_aggregator_address};
use crate::providers::utils::oneinch::{
    ONEINCH_NAME, ONEINCH_SUPPORTED_BLOCKCHAINS, OneinchProtocols, OneinchQuoteRequest, OneinchQuoteResponse,
    OneinchSpenderResponse, OneinchSwapRequest, OneinchSwapResponse, OneinchTokensResponse, intermediate_addresses,
};
use crate::providers::utils::{api_transaction, parse_address};
use crate::trading::core::params::{EncodeTransactionOptions, GasCalculation, OnChainCalculationOptions};
use crate::trading::core::pipeline::{FreshQuote, run_encode_pipeline};
use crate::trading::core::trade::{GasFeeInfo, OnChainRoute, OnChainTrade, OnChainTradeData};
use crate::trading::core::traits::{OnChainProvider, ProviderDeps, RouteLookup};
use crate::trading::registry::ProviderConfig;
use crate::utils::amount::{format_decimal, parse_quantity};
use crate::utils::quote::Quote;
use crate::utils::token::{fetch_token, needs_approve};
use alloy_primitives::Address;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use dashmap::DashMap;
use futures::future::try_join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

pub fn default_config(config: &SdkConfig) -> ProviderConfig {
    ProviderConfig::new(ONEINCH_SUPPORTED_BLOCKCHAINS.to_vec())
        .with_api(config.oneinch_api_url.clone(), config.oneinch_api_key.clone())
}

/// 报价或兑换接口的共同部分
struct TradeInfo {
    to_amount: String,
    protocols: OneinchProtocols,
    gas: Option<String>,
}

impl From<OneinchQuoteResponse> for TradeInfo {
    fn from(response: OneinchQuoteResponse) -> Self {
        Self { to_amount: response.to_amount, protocols: response.protocols, gas: response.gas }
    }
}

impl From<OneinchSwapResponse> for TradeInfo {
    fn from(response: OneinchSwapResponse) -> Self {
        Self { to_amount: response.to_amount, protocols: response.protocols, gas: response.tx.gas }
    }
}

pub struct OneinchProvider {
    config: ProviderConfig,
    deps: ProviderDeps,
    /// 每条链支持的代币地址
    supported_tokens: DashMap<BlockchainName, Arc<HashSet<Address>>>,
    /// 每条链的授权合约
    spenders: DashMap<BlockchainName, Address>,
}

impl OneinchProvider {
    pub fn new(config: ProviderConfig, deps: ProviderDeps) -> Self {
        Self { config, deps, supported_tokens: DashMap::new(), spenders: DashMap::new() }
    }

    fn endpoint(&self, blockchain: BlockchainName, path: &str) -> String {
        let base = self.config.api_base_url.as_deref().unwrap_or(DEFAULT_ONEINCH_API_URL);
        join_url(&join_url(base, &blockchain.chain_id().to_string()), path)
    }

    fn headers(&self) -> Headers {
        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        if let Some(api_key) = &self.config.api_key {
            headers.push(("Authorization".to_string(), format!("Bearer {api_key}")));
        }
        headers
    }

    async fn supported_tokens(&self, blockchain: BlockchainName) -> Result<Arc<HashSet<Address>>, SdkError> {
        if let Some(cached) = self.supported_tokens.get(&blockchain) {
            return Ok(cached.clone());
        }
        let response: OneinchTokensResponse = get_typed(
            self.deps.http.as_ref(),
            &self.endpoint(blockchain, "tokens"),
            &Vec::new(),
            &self.headers(),
        )
        .await?;
        let tokens = Arc::new(response.addresses().collect::<HashSet<_>>());
        debug!(provider = ONEINCH_NAME, %blockchain, count = tokens.len(), "supported tokens loaded");
        self.supported_tokens.insert(blockchain, tokens.clone());
        Ok(tokens)
    }

    async fn spender(&self, blockchain: BlockchainName) -> Result<Address, SdkError> {
        if let Some(cached) = self.spenders.get(&blockchain) {
            return Ok(*cached);
        }
        let response: OneinchSpenderResponse = get_typed(
            self.deps.http.as_ref(),
            &self.endpoint(blockchain, "approve/spender"),
            &Vec::new(),
            &self.headers(),
        )
        .await?;
        let spender = parse_address(&response.address)?;
        self.spenders.insert(blockchain, spender);
        Ok(spender)
    }

    fn quote_request(&self, from: &PriceTokenAmount, to_address: Address, disable_multihops: bool) -> OneinchQuoteRequest {
        OneinchQuoteRequest {
            src: to_aggregator_address(from.token.address).to_string(),
            dst: to_aggregator_address(to_address).to_string(),
            amount: from.string_wei_amount(),
            include_protocols: true,
            include_gas: true,
            main_route_parts: disable_multihops.then_some(1),
            complexity_level: disable_multihops.then_some(0),
        }
    }

    async fn fetch_quote(
        &self,
        from: &PriceTokenAmount,
        to_address: Address,
        disable_multihops: bool,
    ) -> Result<OneinchQuoteResponse, SdkError> {
        let request = self.quote_request(from, to_address, disable_multihops);
        get_typed(
            self.deps.http.as_ref(),
            &self.endpoint(from.blockchain(), "quote"),
            &to_query(&request)?,
            &self.headers(),
        )
        .await
    }

    async fn fetch_swap(
        &self,
        from: &PriceTokenAmount,
        to_address: Address,
        slippage_tolerance: &BigDecimal,
        wallet: Address,
        receiver: Option<Address>,
        disable_multihops: bool,
        disable_estimate: bool,
    ) -> Result<OneinchSwapResponse, SdkError> {
        let request = OneinchSwapRequest {
            quote: self.quote_request(from, to_address, disable_multihops),
            from: wallet.to_string(),
            slippage: format_decimal(&(slippage_tolerance * BigDecimal::from(100))),
            receiver: receiver.filter(|r| *r != wallet).map(|r| r.to_string()),
            referrer: self.deps.provider_address.map(|a| a.to_string()),
            disable_estimate,
        };
        get_typed(
            self.deps.http.as_ref(),
            &self.endpoint(from.blockchain(), "swap"),
            &to_query(&request)?,
            &self.headers(),
        )
        .await
    }

    /// `[from, 中间代币..., to]`
    async fn build_path(&self, from: &Token, to: &Token, protocols: &OneinchProtocols) -> Result<Vec<Token>, SdkError> {
        let hops = intermediate_addresses(protocols);
        let chain = self.deps.chain.as_ref();
        let middle = try_join_all(hops.into_iter().map(|address| fetch_token(chain, from.blockchain, address))).await?;

        let mut path = Vec::with_capacity(middle.len() + 2);
        path.push(from.clone());
        path.extend(middle);
        path.push(to.clone());
        Ok(path)
    }

    async fn trade_info(
        &self,
        from: &PriceTokenAmount,
        to_address: Address,
        options: &OnChainCalculationOptions,
        spender: Address,
    ) -> Result<TradeInfo, SdkError> {
        let wallet = options.from_address.or(self.deps.wallet_address);
        if let Some(wallet) = wallet {
            let approved = !needs_approve(self.deps.chain.as_ref(), from, wallet, spender).await.unwrap_or(true);
            if approved {
                match self
                    .fetch_swap(from, to_address, &options.slippage_tolerance, wallet, None, options.disable_multihops, true)
                    .await
                {
                    Ok(swap) => return Ok(swap.into()),
                    Err(e) => warn!(provider = ONEINCH_NAME, error = %e, "swap quote failed, falling back to quote"),
                }
            }
        }
        Ok(self.fetch_quote(from, to_address, options.disable_multihops).await?.into())
    }
}

#[async_trait]
impl OnChainProvider for OneinchProvider {
    fn trade_type(&self) -> OnChainTradeType {
        OnChainTradeType::Oneinch
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
            return Err(SdkError::unsupported(ONEINCH_NAME, "tokens are on different blockchains"));
        }
        if !self.is_supported_blockchain(blockchain) {
            return Err(SdkError::unsupported(ONEINCH_NAME, format!("{blockchain} is not supported")));
        }

        let tokens = self.supported_tokens(blockchain).await?;
        for token in [&from.token, &to.token] {
            if !tokens.contains(&to_aggregator_address(token.address)) {
                return Err(SdkError::unsupported(ONEINCH_NAME, format!("token {token} is not listed")));
            }
        }

        let spender = self.spender(blockchain).await?;
        let info = self.trade_info(from, to.token.address, options, spender).await?;
        let to_amount_wei = parse_quantity(&info.to_amount)?;
        if to_amount_wei.is_zero() {
            return Ok(RouteLookup::NoRoute(format!("1inch returned zero output for {} -> {}", from.token, to.token)));
        }
        let path = self.build_path(&from.token, &to.token, &info.protocols).await?;

        let gas_fee_info = match options.gas_calculation {
            GasCalculation::Calculate => {
                let gas_limit = info.gas.as_deref().and_then(|gas| parse_quantity(gas).ok());
                let gas_price = self.deps.chain.gas_price(blockchain).await.ok();
                Some(GasFeeInfo::new(gas_limit, gas_price))
            }
            GasCalculation::Disabled => None,
        };

        Ok(RouteLookup::Found(OnChainTradeData {
            trade_type: OnChainTradeType::Oneinch,
            from: from.clone(),
            to: PriceTokenAmount::from_wei(to.token.clone(), to_amount_wei).with_price(to.price.clone()),
            path,
            slippage_tolerance: options.slippage_tolerance.clone(),
            contract_address: spender,
            gas_fee_info,
            route: OnChainRoute::Oneinch { disable_multihops: options.disable_multihops },
        }))
    }

    async fn encode(
        &self,
        trade: &OnChainTrade,
        options: &EncodeTransactionOptions,
    ) -> Result<EvmEncodeConfig, SdkError> {
        let OnChainRoute::Oneinch { disable_multihops } = &trade.route else {
            return Err(SdkError::Encoding("trade was not calculated by 1inch".to_string()));
        };

        let fetch = async {
            let swap = self
                .fetch_swap(
                    &trade.from,
                    trade.to.token.address,
                    &trade.slippage_tolerance,
                    options.from_address,
                    options.receiver_address,
                    *disable_multihops,
                    false,
                )
                .await?;
            let path = self.build_path(&trade.from.token, &trade.to.token, &swap.protocols).await?;
            let mut transaction = api_transaction(&swap.tx.to, &swap.tx.data, &swap.tx.value)?;
            transaction.gas = swap.tx.gas.as_deref().map(parse_quantity).transpose()?;
            transaction.gas_price = swap.tx.gas_price.as_deref().map(parse_quantity).transpose()?;
            Ok(FreshQuote { quote: Quote::from_wei_strings(&swap.to_amount, None)?.with_path(path), transaction })
        };
        run_encode_pipeline(trade, &self.config.tolerance, fetch).await
    }
}

impl OneinchProvider {
    /// 清空代币列表与授权合约缓存
    pub fn clear_caches(&self) {
        self.supported_tokens.clear();
        self.spenders.clear();
    }

    pub fn cached_spender(&self, blockchain: BlockchainName) -> Option<Address> {
        self.spenders.get(&blockchain).map(|entry| *entry)
    }
}
