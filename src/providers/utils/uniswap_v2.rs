//! Uniswap V2 兼容路由合约：ABI 与各 DEX 的配置

use crate::constants::{BlockchainName, OnChainTradeType};
use crate::trading::registry::ProviderConfig;
use alloy_primitives::{Address, address};
use alloy_sol_types::sol;

sol! {
    function getAmountsOut(uint256 amountIn, address[] path) external view returns (uint256[] amounts);

    function swapExactTokensForTokens(uint256 amountIn, uint256 amountOutMin, address[] path, address to, uint256 deadline) external returns (uint256[] amounts);
    function swapExactETHForTokens(uint256 amountOutMin, address[] path, address to, uint256 deadline) external payable returns (uint256[] amounts);
    function swapExactTokensForETH(uint256 amountIn, uint256 amountOutMin, address[] path, address to, uint256 deadline) external returns (uint256[] amounts);

    function swapExactAVAXForTokens(uint256 amountOutMin, address[] path, address to, uint256 deadline) external payable returns (uint256[] amounts);
    function swapExactTokensForAVAX(uint256 amountIn, uint256 amountOutMin, address[] path, address to, uint256 deadline) external returns (uint256[] amounts);
}

/// 原生币兑换方法的命名风格
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeSwapMethods {
    /// `swapExactETHForTokens` / `swapExactTokensForETH`
    Eth,
    /// `swapExactAVAXForTokens` / `swapExactTokensForAVAX`（Pangolin）
    Avax,
}

/// 一个 Uniswap V2 分叉在一条链上的部署
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniswapV2Dex {
    pub trade_type: OnChainTradeType,
    pub blockchain: BlockchainName,
    pub router: Address,
    pub native_methods: NativeSwapMethods,
}

impl UniswapV2Dex {
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig::new(vec![self.blockchain]).with_contract_address(self.router)
    }
}

pub const UNISWAP_V2_DEXES: [UniswapV2Dex; 3] = [
    UniswapV2Dex {
        trade_type: OnChainTradeType::UniswapV2,
        blockchain: BlockchainName::Ethereum,
        router: address!("7a250d5630B4cF539739dF2C5dAcb4c659F2488D"),
        native_methods: NativeSwapMethods::Eth,
    },
    UniswapV2Dex {
        trade_type: OnChainTradeType::SushiSwap,
        blockchain: BlockchainName::Avalanche,
        router: address!("1b02dA8Cb0d097eB8D57A175b88c7D8b47997506"),
        native_methods: NativeSwapMethods::Eth,
    },
    UniswapV2Dex {
        trade_type: OnChainTradeType::Pangolin,
        blockchain: BlockchainName::Avalanche,
        router: address!("E54Ca86531e17Ef3616d22Ca28b0D458b6C89106"),
        native_methods: NativeSwapMethods::Avax,
    },
];

/// 按交易类型查找部署
pub fn find_dex(trade_type: OnChainTradeType) -> Option<&'static UniswapV2Dex> {
    UNISWAP_V2_DEXES.iter().find(|dex| dex.trade_type == trade_type)
}
