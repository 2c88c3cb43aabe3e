//! 支持的 EVM 区块链及其链上常量

use alloy_primitives::{Address, address};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SDK 支持的区块链
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockchainName {
    Ethereum,
    BinanceSmartChain,
    Polygon,
    Avalanche,
    Fantom,
    Arbitrum,
    Optimism,
    Base,
    Kava,
    Gnosis,
}

/// 原生币信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeCurrency {
    pub symbol: &'static str,
    pub name: &'static str,
    pub decimals: u8,
}

impl BlockchainName {
    pub const ALL: [BlockchainName; 10] = [
        BlockchainName::Ethereum,
        BlockchainName::BinanceSmartChain,
        BlockchainName::Polygon,
        BlockchainName::Avalanche,
        BlockchainName::Fantom,
        BlockchainName::Arbitrum,
        BlockchainName::Optimism,
        BlockchainName::Base,
        BlockchainName::Kava,
        BlockchainName::Gnosis,
    ];

    /// EIP-155 chain id
    pub fn chain_id(&self) -> u64 {
        match self {
            BlockchainName::Ethereum => 1,
            BlockchainName::BinanceSmartChain => 56,
            BlockchainName::Polygon => 137,
            BlockchainName::Avalanche => 43114,
            BlockchainName::Fantom => 250,
            BlockchainName::Arbitrum => 42161,
            BlockchainName::Optimism => 10,
            BlockchainName::Base => 8453,
            BlockchainName::Kava => 2222,
            BlockchainName::Gnosis => 100,
        }
    }

    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        Self::ALL.iter().copied().find(|b| b.chain_id() == chain_id)
    }

    pub fn native_currency(&self) -> NativeCurrency {
        let (symbol, name) = match self {
            BlockchainName::Ethereum
            | BlockchainName::Arbitrum
            | BlockchainName::Optimism
            | BlockchainName::Base => ("ETH", "Ether"),
            BlockchainName::BinanceSmartChain => ("BNB", "Binance Coin"),
            BlockchainName::Polygon => ("MATIC", "Matic Network"),
            BlockchainName::Avalanche => ("AVAX", "Avalanche"),
            BlockchainName::Fantom => ("FTM", "Fantom"),
            BlockchainName::Kava => ("KAVA", "Kava"),
            BlockchainName::Gnosis => ("XDAI", "xDai"),
        };
        NativeCurrency { symbol, name, decimals: 18 }
    }

    /// 包装原生币（WETH / WAVAX / ...）合约地址
    pub fn wrapped_native_address(&self) -> Address {
        match self {
            BlockchainName::Ethereum => address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
            BlockchainName::BinanceSmartChain => {
                address!("bb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c")
            }
            BlockchainName::Polygon => address!("0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270"),
            BlockchainName::Avalanche => address!("B31f66AA3C1e785363F0875A1B74E27b85FD66c7"),
            BlockchainName::Fantom => address!("21be370D5312f44cB42ce377BC9b8a0cEF1A4C83"),
            BlockchainName::Arbitrum => address!("82aF49447D8a07e3bd95BD0d56f35241523fBab1"),
            BlockchainName::Optimism | BlockchainName::Base => {
                address!("4200000000000000000000000000000000000006")
            }
            BlockchainName::Kava => address!("c86c7C0eFbd6A49B35E8714C5f59D99De09A225b"),
            BlockchainName::Gnosis => address!("e91D153E0b41518A2Ce8Dd3D7944Fa863463a97d"),
        }
    }

    /// 环境变量中使用的短名称，例如 `RPC_URL_ETH`
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockchainName::Ethereum => "ETH",
            BlockchainName::BinanceSmartChain => "BSC",
            BlockchainName::Polygon => "POLYGON",
            BlockchainName::Avalanche => "AVALANCHE",
            BlockchainName::Fantom => "FANTOM",
            BlockchainName::Arbitrum => "ARBITRUM",
            BlockchainName::Optimism => "OPTIMISM",
            BlockchainName::Base => "BASE",
            BlockchainName::Kava => "KAVA",
            BlockchainName::Gnosis => "GNOSIS",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.as_str() == upper)
            .ok_or_else(|| format!("unknown blockchain: {s}"))
    }
}

impl fmt::Display for BlockchainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_roundtrip() {
        for blockchain in BlockchainName::ALL {
            assert_eq!(BlockchainName::from_chain_id(blockchain.chain_id()), Some(blockchain));
        }
        assert_eq!(BlockchainName::from_chain_id(999_999), None);
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!(BlockchainName::from_str("bsc"), Ok(BlockchainName::BinanceSmartChain));
        assert_eq!(BlockchainName::from_str(" Avalanche "), Ok(BlockchainName::Avalanche));
        assert!(BlockchainName::from_str("solana").is_err());
    }
}
