//! ERC-20 元数据与授权查询
//!
//! decimals / symbol 在进程内缓存，减少 RPC 调用

use crate::common::chain_reader::{ChainReader, call_contract_method};
use crate::common::errors::SdkError;
use crate::common::tokens::{PriceTokenAmount, Token};
use crate::common::types::EvmEncodeConfig;
use crate::constants::{BlockchainName, NATIVE_TOKEN_ADDRESS};
use alloy_primitives::{Address, U256};
use alloy_sol_types::{SolCall, sol};
use dashmap::DashMap;
use once_cell::sync::Lazy;

sol! {
    function decimals() external view returns (uint8);
    function symbol() external view returns (string);
    function allowance(address owner, address spender) external view returns (uint256);
    function approve(address spender, uint256 amount) external returns (bool);
}

const MAX_TOKEN_METADATA_CACHE_SIZE: usize = 10_000;

/// 全局 Token Decimal 缓存
static DECIMALS_CACHE: Lazy<DashMap<(BlockchainName, Address), u8>> =
    Lazy::new(|| DashMap::with_capacity(MAX_TOKEN_METADATA_CACHE_SIZE));

/// 全局 Token Symbol 缓存
static SYMBOL_CACHE: Lazy<DashMap<(BlockchainName, Address), String>> =
    Lazy::new(|| DashMap::with_capacity(MAX_TOKEN_METADATA_CACHE_SIZE));

/// 获取代币精度
///
/// 使用全局缓存减少 RPC 调用
pub async fn get_token_decimals(
    chain: &dyn ChainReader,
    blockchain: BlockchainName,
    address: Address,
) -> Result<u8, SdkError> {
    if address == NATIVE_TOKEN_ADDRESS {
        return Ok(blockchain.native_currency().decimals);
    }
    if let Some(cached) = DECIMALS_CACHE.get(&(blockchain, address)) {
        return Ok(*cached);
    }

    let decimals = call_contract_method(chain, blockchain, address, &decimalsCall {}).await?;
    DECIMALS_CACHE.insert((blockchain, address), decimals);
    Ok(decimals)
}

/// 获取代币 Symbol
pub async fn get_token_symbol(
    chain: &dyn ChainReader,
    blockchain: BlockchainName,
    address: Address,
) -> Result<String, SdkError> {
    if address == NATIVE_TOKEN_ADDRESS {
        return Ok(blockchain.native_currency().symbol.to_string());
    }
    if let Some(cached) = SYMBOL_CACHE.get(&(blockchain, address)) {
        return Ok(cached.clone());
    }

    let symbol = call_contract_method(chain, blockchain, address, &symbolCall {}).await?;
    SYMBOL_CACHE.insert((blockchain, address), symbol.clone());
    Ok(symbol)
}

/// 读取链上元数据构造 Token，原生币直接返回
pub async fn fetch_token(
    chain: &dyn ChainReader,
    blockchain: BlockchainName,
    address: Address,
) -> Result<Token, SdkError> {
    if address == NATIVE_TOKEN_ADDRESS {
        return Ok(Token::native(blockchain));
    }
    let (decimals, symbol) = tokio::try_join!(
        get_token_decimals(chain, blockchain, address),
        get_token_symbol(chain, blockchain, address),
    )?;
    Ok(Token::new(blockchain, address, decimals, symbol.clone(), symbol))
}

pub async fn get_allowance(
    chain: &dyn ChainReader,
    blockchain: BlockchainName,
    token: Address,
    owner: Address,
    spender: Address,
) -> Result<U256, SdkError> {
    call_contract_method(chain, blockchain, token, &allowanceCall { owner, spender }).await
}

/// 授权额度是否不足；原生币永远不需要授权
pub async fn needs_approve(
    chain: &dyn ChainReader,
    amount: &PriceTokenAmount,
    owner: Address,
    spender: Address,
) -> Result<bool, SdkError> {
    if amount.is_native() {
        return Ok(false);
    }
    let allowance = get_allowance(chain, amount.blockchain(), amount.token.address, owner, spender).await?;
    Ok(allowance < amount.wei_amount)
}

/// 构造 ERC-20 `approve` 交易
pub fn encode_approve(token: Address, spender: Address, amount: U256) -> EvmEncodeConfig {
    EvmEncodeConfig::new(token, approveCall { spender, amount }.abi_encode(), U256::ZERO)
}

/// 清空所有代币元数据缓存
pub fn clear_token_caches() {
    DECIMALS_CACHE.clear();
    SYMBOL_CACHE.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::mock_chain::MockChainReader;
    use alloy_sol_types::SolValue;

    const BLOCKCHAIN: BlockchainName = BlockchainName::Fantom;

    #[tokio::test]
    async fn test_decimals_are_cached() {
        let token = Address::repeat_byte(0x71);
        let chain = MockChainReader::new();
        chain.on_selector::<decimalsCall>(BLOCKCHAIN, token, (U256::from(6),).abi_encode_params());

        assert_eq!(get_token_decimals(&chain, BLOCKCHAIN, token).await.unwrap(), 6);
        assert_eq!(get_token_decimals(&chain, BLOCKCHAIN, token).await.unwrap(), 6);
        assert_eq!(chain.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_token_reads_metadata() {
        let token = Address::repeat_byte(0x72);
        let chain = MockChainReader::new();
        chain.on_selector::<decimalsCall>(BLOCKCHAIN, token, (U256::from(18),).abi_encode_params());
        chain.on_selector::<symbolCall>(BLOCKCHAIN, token, ("fUSDT".to_string(),).abi_encode_params());

        let fetched = fetch_token(&chain, BLOCKCHAIN, token).await.unwrap();
        assert_eq!(fetched.decimals, 18);
        assert_eq!(fetched.symbol, "fUSDT");

        let native = fetch_token(&chain, BLOCKCHAIN, NATIVE_TOKEN_ADDRESS).await.unwrap();
        assert!(native.is_native());
    }

    #[test]
    fn test_encode_approve_targets_token() {
        let token = Address::repeat_byte(0x74);
        let tx = encode_approve(token, Address::repeat_byte(0x02), U256::MAX);
        assert_eq!(tx.to, token);
        assert_eq!(tx.value, U256::ZERO);
        assert_eq!(&tx.data[..4], approveCall::SELECTOR.as_slice());
    }

    #[tokio::test]
    async fn test_needs_approve_compares_allowance() {
        let token = Token::new(BLOCKCHAIN, Address::repeat_byte(0x73), 6, "USDC", "USD Coin");
        let owner = Address::repeat_byte(0x01);
        let spender = Address::repeat_byte(0x02);
        let chain = MockChainReader::new();
        chain.on_call(
            BLOCKCHAIN,
            token.address,
            &allowanceCall { owner, spender },
            (U256::from(1_000u64),).abi_encode_params(),
        );

        let small = PriceTokenAmount::from_wei(token.clone(), U256::from(1_000u64));
        let large = PriceTokenAmount::from_wei(token, U256::from(1_001u64));
        assert!(!needs_approve(&chain, &small, owner, spender).await.unwrap());
        assert!(needs_approve(&chain, &large, owner, spender).await.unwrap());

        let native = PriceTokenAmount::from_wei(Token::native(BLOCKCHAIN), U256::MAX);
        assert!(!needs_approve(&chain, &native, owner, spender).await.unwrap());
    }
}
