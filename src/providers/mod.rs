//! 交易提供方实现

pub mod oneinch;
pub mod stargate;
pub mod uniswap_v2;
pub mod utils;
pub mod xy_dex;

pub use oneinch::OneinchProvider;
pub use stargate::StargateProvider;
pub use uniswap_v2::UniswapV2Provider;
pub use xy_dex::XyDexProvider;
