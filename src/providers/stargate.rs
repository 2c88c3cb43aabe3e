//! Stargate 跨链桥
//!
//! 只支持两端池 id 相同的稳定币 / ETH 池。报价不访问外部 API：到账下限按滑点直接
//! 由卖出数量计算，LayerZero 消息费通过路由合约的 `quoteLayerZeroFee` 读取。

use crate::common::chain_reader::call_contract_method;
use crate::common::errors::SdkError;
use crate::common::tokens::{PriceToken, PriceTokenAmount, Token};
use crate::common::types::EvmEncodeConfig;
use crate::constants::{BlockchainName, CrossChainTradeType};
use crate::providers::utils::stargate::{
    LzTxObj, STARGATE_NAME, STARGATE_SUPPORTED_BLOCKCHAINS, TYPE_SWAP_REMOTE, layer_zero_chain_id, pool_id,
    quoteLayerZeroFeeCall, router_address, supported_pools, swapCall,
};
use crate::trading::core::params::{CrossChainCalculationOptions, EncodeTransactionOptions};
use crate::trading::core::trade::{CrossChainRoute, CrossChainTrade, CrossChainTradeData, CryptoFee, FeeInfo};
use crate::trading::core::traits::{CrossChainProvider, ProviderDeps, RouteLookup};
use crate::utils::amount::to_wei;
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use tracing::{debug, warn};

/// 一次跨链所需的池与链信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StargateLeg {
    router: Address,
    src_pool_id: u32,
    dst_pool_id: u32,
    dst_layer_zero_chain_id: u16,
}

fn lz_tx_params(dst_native_addr: Address) -> LzTxObj {
    LzTxObj {
        dstGasForCall: U256::ZERO,
        dstNativeAmount: U256::ZERO,
        dstNativeAddr: Bytes::copy_from_slice(dst_native_addr.as_slice()),
    }
}

/// 查找路由；不支持时返回原因
fn resolve_leg(from: &Token, to: &Token) -> Result<StargateLeg, String> {
    let (src_chain, dst_chain) = (from.blockchain, to.blockchain);
    if src_chain == dst_chain {
        return Err(format!("{STARGATE_NAME} bridges between different blockchains only"));
    }
    let (Some(router), Some(dst_layer_zero_chain_id)) = (router_address(src_chain), layer_zero_chain_id(dst_chain))
    else {
        return Err(format!("{STARGATE_NAME} does not support {src_chain} -> {dst_chain}"));
    };
    if from.is_native() {
        return Err(format!("{STARGATE_NAME} router does not accept native {}", from.symbol));
    }

    let (Some(src_pool_id), Some(dst_pool_id)) = (pool_id(&from.symbol), pool_id(&to.symbol)) else {
        return Err(format!("no {STARGATE_NAME} pool for {} -> {}", from.symbol, to.symbol));
    };
    if src_pool_id != dst_pool_id {
        return Err(format!("{STARGATE_NAME} pools do not match: {src_pool_id} != {dst_pool_id}"));
    }
    if !supported_pools(src_chain).contains(&src_pool_id) || !supported_pools(dst_chain).contains(&dst_pool_id) {
        return Err(format!("{STARGATE_NAME} pool {src_pool_id} is not open on {src_chain} and {dst_chain}"));
    }

    Ok(StargateLeg { router, src_pool_id, dst_pool_id, dst_layer_zero_chain_id })
}

pub struct StargateProvider {
    deps: ProviderDeps,
}

impl StargateProvider {
    pub fn new(deps: ProviderDeps) -> Self {
        Self { deps }
    }

    /// LayerZero 消息费（源链原生币 wei）
    async fn layer_zero_fee(
        &self,
        blockchain: BlockchainName,
        router: Address,
        dst_layer_zero_chain_id: u16,
        wallet: Address,
    ) -> Result<U256, SdkError> {
        let call = quoteLayerZeroFeeCall {
            _dstChainId: dst_layer_zero_chain_id,
            _functionType: TYPE_SWAP_REMOTE,
            _toAddress: Bytes::copy_from_slice(wallet.as_slice()),
            _transferAndCallPayload: Bytes::new(),
            _lzTxParams: lz_tx_params(wallet),
        };
        let fee = call_contract_method(self.deps.chain.as_ref(), blockchain, router, &call).await?;
        Ok(fee.nativeFee)
    }
}

#[async_trait]
impl CrossChainProvider for StargateProvider {
    fn trade_type(&self) -> CrossChainTradeType {
        CrossChainTradeType::Stargate
    }

    fn deps(&self) -> &ProviderDeps {
        &self.deps
    }

    fn is_supported_blockchain(&self, blockchain: BlockchainName) -> bool {
        STARGATE_SUPPORTED_BLOCKCHAINS.contains(&blockchain)
    }

    async fn calculate(
        &self,
        from: &PriceTokenAmount,
        to: &PriceToken,
        options: &CrossChainCalculationOptions,
    ) -> Result<RouteLookup<CrossChainTradeData>, SdkError> {
        let leg = match resolve_leg(&from.token, &to.token) {
            Ok(leg) => leg,
            Err(reason) => {
                debug!(provider = STARGATE_NAME, %reason, "no route");
                return Ok(RouteLookup::NoRoute(reason));
            }
        };

        if let Some(receiver) = options.receiver_address.filter(|receiver| receiver.is_zero()) {
            return Err(SdkError::InvalidAddress(format!("receiver {receiver} is the zero address")));
        }

        let slippage = &options.slippage_tolerance;
        if *slippage < BigDecimal::from(0) || *slippage >= BigDecimal::from(1) {
            return Err(SdkError::InvalidTolerance(format!("slippage {slippage} must be in [0, 1)")));
        }
        let amount_out_min = from.token_amount() * (BigDecimal::from(1) - slippage);
        let to_amount = PriceTokenAmount::from_token_amount(to.token.clone(), &amount_out_min)?.with_price(to.price.clone());

        let blockchain = from.blockchain();
        let wallet = options.from_address.or(self.deps.wallet_address).unwrap_or(Address::ZERO);
        let native_fee = self
            .layer_zero_fee(blockchain, leg.router, leg.dst_layer_zero_chain_id, wallet)
            .await
            .map_err(|e| {
                warn!(provider = STARGATE_NAME, error = %e, "quoteLayerZeroFee failed");
                e
            })?;
        debug!(provider = STARGATE_NAME, pool = leg.src_pool_id, %native_fee, "layer zero fee");

        Ok(RouteLookup::Found(CrossChainTradeData {
            trade_type: CrossChainTradeType::Stargate,
            from: from.clone(),
            to: to_amount,
            to_token_amount_min: amount_out_min,
            slippage_tolerance: slippage.clone(),
            contract_address: leg.router,
            fee_info: FeeInfo {
                provider_crypto_fee: Some(CryptoFee { amount_wei: native_fee, token: Token::native(blockchain) }),
            },
            gas_fee_info: None,
            receiver_address: options.receiver_address,
            route: CrossChainRoute::Stargate {
                src_pool_id: leg.src_pool_id,
                dst_pool_id: leg.dst_pool_id,
                dst_layer_zero_chain_id: leg.dst_layer_zero_chain_id,
            },
        }))
    }

    async fn encode(
        &self,
        trade: &CrossChainTrade,
        options: &EncodeTransactionOptions,
    ) -> Result<EvmEncodeConfig, SdkError> {
        let CrossChainRoute::Stargate { src_pool_id, dst_pool_id, dst_layer_zero_chain_id } = trade.route;
        let router = trade.contract_address;
        let receiver = trade.receiver(options);

        // 消息费可能在计算之后变化，编码前重新读取
        let native_fee = self
            .layer_zero_fee(trade.from.blockchain(), router, dst_layer_zero_chain_id, options.from_address)
            .await?;

        // minAmountLD 以源链代币精度表示
        let min_amount = to_wei(&trade.to_token_amount_min, trade.from.token.decimals)?;
        let call = swapCall {
            _dstChainId: dst_layer_zero_chain_id,
            _srcPoolId: U256::from(src_pool_id),
            _dstPoolId: U256::from(dst_pool_id),
            _refundAddress: options.from_address,
            _amountLD: trade.from.wei_amount,
            _minAmountLD: min_amount,
            _lzTxParams: lz_tx_params(receiver),
            _to: Bytes::copy_from_slice(receiver.as_slice()),
            _payload: Bytes::new(),
        };
        Ok(EvmEncodeConfig::new(router, call.abi_encode(), native_fee))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(blockchain: BlockchainName, symbol: &str, decimals: u8) -> Token {
        Token::new(blockchain, Address::repeat_byte(0x33), decimals, symbol, symbol)
    }

    #[test]
    fn test_resolve_leg_matching_pools() {
        let leg = resolve_leg(
            &token(BlockchainName::Ethereum, "USDC", 6),
            &token(BlockchainName::Polygon, "USDC", 6),
        )
        .unwrap();
        assert_eq!(leg.src_pool_id, 1);
        assert_eq!(leg.dst_layer_zero_chain_id, 109);
        assert_eq!(Some(leg.router), router_address(BlockchainName::Ethereum));
    }

    #[test]
    fn test_resolve_leg_rejections() {
        // 池 id 不一致
        assert!(resolve_leg(&token(BlockchainName::Ethereum, "USDC", 6), &token(BlockchainName::Polygon, "USDT", 6)).is_err());
        // BSC 没有 USDC 池
        assert!(resolve_leg(&token(BlockchainName::Ethereum, "USDC", 6), &token(BlockchainName::BinanceSmartChain, "USDC", 18)).is_err());
        // 同链
        assert!(resolve_leg(&token(BlockchainName::Ethereum, "USDC", 6), &token(BlockchainName::Ethereum, "USDC", 6)).is_err());
        // 不支持的链
        assert!(resolve_leg(&token(BlockchainName::Gnosis, "USDC", 6), &token(BlockchainName::Ethereum, "USDC", 6)).is_err());
        // 原生币
        assert!(resolve_leg(&Token::native(BlockchainName::Ethereum), &token(BlockchainName::Arbitrum, "ETH", 18)).is_err());
    }

    #[test]
    fn test_lz_tx_params_carry_address() {
        let params = lz_tx_params(Address::repeat_byte(0xaa));
        assert_eq!(params.dstNativeAddr.len(), 20);
        assert!(params.dstGasForCall.is_zero());
    }
}
