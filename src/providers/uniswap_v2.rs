//! Uniswap V2 兼容路由合约（Uniswap V2、SushiSwap、Pangolin）
//!
//! 所有分叉共用同一套逻辑，差异只在 `UniswapV2Dex` 配置中。

use crate::common::chain_reader::call_contract_method;
use crate::common::errors::SdkError;
use crate::common::tokens::{PriceToken, PriceTokenAmount, Token};
use crate::common::types::EvmEncodeConfig;
use crate::constants::OnChainTradeType;
use crate::providers::utils::uniswap_v2::{
    NativeSwapMethods, getAmountsOutCall, swapExactAVAXForTokensCall, swapExactETHForTokensCall,
    swapExactTokensForAVAXCall, swapExactTokensForETHCall, swapExactTokensForTokensCall,
};
use crate::trading::core::params::{EncodeTransactionOptions, OnChainCalculationOptions};
use crate::trading::core::pipeline::{FreshQuote, run_encode_pipeline};
use crate::trading::core::trade::{OnChainRoute, OnChainTrade, OnChainTradeData};
use crate::trading::core::traits::{OnChainProvider, ProviderDeps, RouteLookup};
use crate::trading::registry::ProviderConfig;
use crate::utils::quote::Quote;
use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, warn};

pub use crate::providers::utils::uniswap_v2::{UNISWAP_V2_DEXES, UniswapV2Dex, find_dex};

/// 路由中原生币以包装原生币代替
fn path_address(token: &Token) -> Address {
    if token.is_native() { token.blockchain.wrapped_native_address() } else { token.address }
}

/// 交易截止时间（unix 秒）
fn swap_deadline(now: i64, deadline_minutes: u64) -> Result<U256, SdkError> {
    let now = u64::try_from(now).map_err(|_| SdkError::Encoding(format!("clock is before unix epoch: {now}")))?;
    deadline_minutes
        .checked_mul(60)
        .and_then(|seconds| now.checked_add(seconds))
        .map(U256::from)
        .ok_or_else(|| SdkError::Encoding(format!("deadline of {deadline_minutes} minutes overflows")))
}

pub struct UniswapV2Provider {
    dex: UniswapV2Dex,
    config: ProviderConfig,
    deps: ProviderDeps,
}

impl UniswapV2Provider {
    pub fn new(dex: UniswapV2Dex, config: ProviderConfig, deps: ProviderDeps) -> Self {
        Self { dex, config, deps }
    }

    fn router(&self) -> Address {
        self.config.contract_address.unwrap_or(self.dex.router)
    }

    fn name(&self) -> &'static str {
        self.dex.trade_type.as_str()
    }

    /// 直连路径，以及（允许多跳时）经过包装原生币的路径
    fn candidate_paths(&self, from: &Token, to: &Token, disable_multihops: bool) -> Vec<Vec<Address>> {
        let wrapped = self.dex.blockchain.wrapped_native_address();
        let (src, dst) = (path_address(from), path_address(to));
        let mut paths = vec![vec![src, dst]];
        if !disable_multihops && src != wrapped && dst != wrapped {
            paths.push(vec![src, wrapped, dst]);
        }
        paths
    }

    async fn amount_out(&self, amount_in: U256, path: &[Address]) -> Result<U256, SdkError> {
        let call = getAmountsOutCall { amountIn: amount_in, path: path.to_vec() };
        let amounts = call_contract_method(self.deps.chain.as_ref(), self.dex.blockchain, self.router(), &call).await?;
        amounts
            .last()
            .copied()
            .ok_or_else(|| SdkError::external(format!("{} getAmountsOut", self.name()), "empty amounts"))
    }

    /// 输出最多的路径；没有任何路径有流动性时返回 `None`
    ///
    /// 只有合约 revert 或零输出算作无流动性，网络与节点错误原样返回。
    async fn best_path(
        &self,
        amount_in: U256,
        paths: Vec<Vec<Address>>,
    ) -> Result<Option<(Vec<Address>, U256)>, SdkError> {
        let quotes = join_all(paths.into_iter().map(|path| async move {
            let amount = self.amount_out(amount_in, &path).await;
            (path, amount)
        }))
        .await;

        let mut best: Option<(Vec<Address>, U256)> = None;
        for (path, amount) in quotes {
            let amount = match amount {
                Ok(amount) => amount,
                Err(e) if e.is_revert() => {
                    debug!(provider = self.name(), hops = path.len() - 1, error = %e, "path has no liquidity");
                    continue;
                }
                Err(e) => {
                    warn!(provider = self.name(), hops = path.len() - 1, error = %e, "getAmountsOut failed");
                    return Err(e);
                }
            };
            if amount.is_zero() || best.as_ref().is_some_and(|(_, best_amount)| *best_amount >= amount) {
                continue;
            }
            best = Some((path, amount));
        }
        Ok(best)
    }

    fn path_tokens(&self, from: &Token, to: &Token, path: &[Address]) -> Vec<Token> {
        let mut tokens = vec![from.clone()];
        if path.len() > 2 {
            tokens.extend(path[1..path.len() - 1].iter().map(|_| Token::wrapped_native(self.dex.blockchain)));
        }
        tokens.push(to.clone());
        tokens
    }

    fn swap_calldata(
        &self,
        trade: &OnChainTrade,
        path: &[Address],
        amount_out_min: U256,
        receiver: Address,
        deadline: U256,
    ) -> (Vec<u8>, U256) {
        let path = path.to_vec();
        let amount_in = trade.from.wei_amount;
        match (trade.from.is_native(), trade.to.is_native(), self.dex.native_methods) {
            (true, _, NativeSwapMethods::Eth) => (
                swapExactETHForTokensCall { amountOutMin: amount_out_min, path, to: receiver, deadline }.abi_encode(),
                amount_in,
            ),
            (true, _, NativeSwapMethods::Avax) => (
                swapExactAVAXForTokensCall { amountOutMin: amount_out_min, path, to: receiver, deadline }.abi_encode(),
                amount_in,
            ),
            (false, true, NativeSwapMethods::Eth) => (
                swapExactTokensForETHCall { amountIn: amount_in, amountOutMin: amount_out_min, path, to: receiver, deadline }
                    .abi_encode(),
                U256::ZERO,
            ),
            (false, true, NativeSwapMethods::Avax) => (
                swapExactTokensForAVAXCall { amountIn: amount_in, amountOutMin: amount_out_min, path, to: receiver, deadline }
                    .abi_encode(),
                U256::ZERO,
            ),
            (false, false, _) => (
                swapExactTokensForTokensCall {
                    amountIn: amount_in,
                    amountOutMin: amount_out_min,
                    path,
                    to: receiver,
                    deadline,
                }
                .abi_encode(),
                U256::ZERO,
            ),
        }
    }
}

#[async_trait]
impl OnChainProvider for UniswapV2Provider {
    fn trade_type(&self) -> OnChainTradeType {
        self.dex.trade_type
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
            return Err(SdkError::unsupported(self.name(), "tokens are on different blockchains"));
        }
        if !self.is_supported_blockchain(blockchain) {
            return Err(SdkError::unsupported(self.name(), format!("{blockchain} is not supported")));
        }
        if path_address(&from.token) == path_address(&to.token) {
            return Err(SdkError::unsupported(self.name(), "wrapping native tokens is not a swap"));
        }

        let paths = self.candidate_paths(&from.token, &to.token, options.disable_multihops);
        let Some((path, amount_out)) = self.best_path(from.wei_amount, paths).await? else {
            return Ok(RouteLookup::NoRoute(format!("{} has no liquidity for {} -> {}", self.name(), from.token, to.token)));
        };
        debug!(provider = self.name(), hops = path.len() - 1, %amount_out, "router quote");

        Ok(RouteLookup::Found(OnChainTradeData {
            trade_type: self.dex.trade_type,
            from: from.clone(),
            to: PriceTokenAmount::from_wei(to.token.clone(), amount_out).with_price(to.price.clone()),
            path: self.path_tokens(&from.token, &to.token, &path),
            slippage_tolerance: options.slippage_tolerance.clone(),
            contract_address: self.router(),
            gas_fee_info: None,
            route: OnChainRoute::UniswapV2 { path, deadline_minutes: options.deadline_minutes },
        }))
    }

    async fn encode(
        &self,
        trade: &OnChainTrade,
        options: &EncodeTransactionOptions,
    ) -> Result<EvmEncodeConfig, SdkError> {
        let OnChainRoute::UniswapV2 { path, deadline_minutes } = &trade.route else {
            return Err(SdkError::Encoding(format!("trade was not calculated by {}", self.name())));
        };

        let amount_out_min = trade.to_wei_amount_min()?;
        let deadline = swap_deadline(chrono::Utc::now().timestamp(), *deadline_minutes)?;
        let (calldata, value) = self.swap_calldata(trade, path, amount_out_min, options.receiver(), deadline);
        let transaction = EvmEncodeConfig::new(self.router(), calldata, value);

        let fetch = async {
            let fresh = self.amount_out(trade.from.wei_amount, path).await.map_err(|e| {
                warn!(provider = self.name(), error = %e, "fresh router quote failed");
                e
            })?;
            Ok(FreshQuote {
                quote: Quote::new(fresh).with_min_receive(amount_out_min).with_path(trade.path.clone()),
                transaction,
            })
        };
        run_encode_pipeline(trade, &self.config.tolerance, fetch).await
    }
}
