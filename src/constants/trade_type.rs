//! 交易提供方类型

use serde::{Deserialize, Serialize};
use std::fmt;

/// 同链交易提供方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnChainTradeType {
    XyDex,
    Oneinch,
    UniswapV2,
    SushiSwap,
    Pangolin,
}

impl OnChainTradeType {
    pub const ALL: [OnChainTradeType; 5] = [
        OnChainTradeType::XyDex,
        OnChainTradeType::Oneinch,
        OnChainTradeType::UniswapV2,
        OnChainTradeType::SushiSwap,
        OnChainTradeType::Pangolin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OnChainTradeType::XyDex => "XY_DEX",
            OnChainTradeType::Oneinch => "ONE_INCH",
            OnChainTradeType::UniswapV2 => "UNISWAP_V2",
            OnChainTradeType::SushiSwap => "SUSHI_SWAP",
            OnChainTradeType::Pangolin => "PANGOLIN",
        }
    }
}

impl fmt::Display for OnChainTradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 跨链交易提供方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrossChainTradeType {
    Stargate,
}

impl CrossChainTradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrossChainTradeType::Stargate => "STARGATE",
        }
    }
}

impl fmt::Display for CrossChainTradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
