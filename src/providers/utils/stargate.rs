//! Stargate 桥：LayerZero 链 id、路由合约、池 id 与 ABI

use crate::constants::BlockchainName;
use alloy_primitives::{Address, address};
use alloy_sol_types::sol;

pub const STARGATE_NAME: &str = "STARGATE";

sol! {
    struct LzTxObj {
        uint256 dstGasForCall;
        uint256 dstNativeAmount;
        bytes dstNativeAddr;
    }

    function quoteLayerZeroFee(
        uint16 _dstChainId,
        uint8 _functionType,
        bytes _toAddress,
        bytes _transferAndCallPayload,
        LzTxObj _lzTxParams
    ) external view returns (uint256 nativeFee, uint256 zroFee);

    function swap(
        uint16 _dstChainId,
        uint256 _srcPoolId,
        uint256 _dstPoolId,
        address _refundAddress,
        uint256 _amountLD,
        uint256 _minAmountLD,
        LzTxObj _lzTxParams,
        bytes _to,
        bytes _payload
    ) external payable;
}

/// `quoteLayerZeroFee` 的 function type：普通跨链兑换
pub const TYPE_SWAP_REMOTE: u8 = 1;

pub const STARGATE_SUPPORTED_BLOCKCHAINS: [BlockchainName; 7] = [
    BlockchainName::Ethereum,
    BlockchainName::BinanceSmartChain,
    BlockchainName::Avalanche,
    BlockchainName::Polygon,
    BlockchainName::Arbitrum,
    BlockchainName::Optimism,
    BlockchainName::Fantom,
];

/// LayerZero 链 id
pub fn layer_zero_chain_id(blockchain: BlockchainName) -> Option<u16> {
    match blockchain {
        BlockchainName::Ethereum => Some(101),
        BlockchainName::BinanceSmartChain => Some(102),
        BlockchainName::Avalanche => Some(106),
        BlockchainName::Polygon => Some(109),
        BlockchainName::Arbitrum => Some(110),
        BlockchainName::Optimism => Some(111),
        BlockchainName::Fantom => Some(112),
        _ => None,
    }
}

/// Stargate 路由合约
pub fn router_address(blockchain: BlockchainName) -> Option<Address> {
    match blockchain {
        BlockchainName::Ethereum => Some(address!("8731d54E9D02c286767d56ac03e8037C07e01e98")),
        BlockchainName::BinanceSmartChain => Some(address!("4a364f8c717cAAD9A442737Eb7b8A55cc6cf18D8")),
        BlockchainName::Avalanche | BlockchainName::Polygon => {
            Some(address!("45A01E4e04F14f7A4a6702c74187c5F6222033cd"))
        }
        BlockchainName::Arbitrum => Some(address!("53Bf833A5d6c4ddA888F69c22C88C9f356a41614")),
        BlockchainName::Optimism => Some(address!("B0D502E938ed5f4df2E681fE6E419ff29631d62b")),
        BlockchainName::Fantom => Some(address!("Af5191B0De278C7286d6C7CC6ab6BB8A73bA2Cd6")),
        _ => None,
    }
}

/// 按代币符号查找池 id
pub fn pool_id(symbol: &str) -> Option<u32> {
    let id = match symbol {
        "USDC" => 1,
        "USDT" => 2,
        "DAI" => 3,
        "BUSD" => 5,
        "FRAX" => 7,
        "USDD" => 11,
        "ETH" | "WETH" | "AETH" | "SGETH" => 13,
        "sUSD" => 14,
        "LUSD" => 15,
        "MAI" => 16,
        "METIS" => 17,
        "m.USDT" => 19,
        "FUSDC" => 21,
        _ => return None,
    };
    Some(id)
}

/// 每条链上开放的池
pub fn supported_pools(blockchain: BlockchainName) -> &'static [u32] {
    match blockchain {
        BlockchainName::Ethereum => &[1, 2, 3, 7, 11, 14, 15, 16, 13],
        BlockchainName::BinanceSmartChain => &[2, 5, 11, 16],
        BlockchainName::Avalanche => &[1, 2, 7, 16],
        BlockchainName::Polygon => &[1, 2, 3, 16],
        BlockchainName::Arbitrum => &[1, 2, 7, 15, 16, 13],
        BlockchainName::Optimism => &[1, 3, 7, 14, 15, 16, 13],
        BlockchainName::Fantom => &[21],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_supported_chain_has_router_and_lz_id() {
        for blockchain in STARGATE_SUPPORTED_BLOCKCHAINS {
            assert!(router_address(blockchain).is_some(), "{blockchain} has no router");
            assert!(layer_zero_chain_id(blockchain).is_some(), "{blockchain} has no LayerZero id");
            assert!(!supported_pools(blockchain).is_empty());
        }
        assert!(router_address(BlockchainName::Gnosis).is_none());
    }

    #[test]
    fn test_pool_ids() {
        assert_eq!(pool_id("USDC"), Some(1));
        assert_eq!(pool_id("USDT"), Some(2));
        assert_eq!(pool_id("WETH"), pool_id("ETH"));
        assert_eq!(pool_id("SHIB"), None);
    }
}
