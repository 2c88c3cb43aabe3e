use alloy_primitives::{Address, address};

/// SDK 内部表示原生币的地址
pub const NATIVE_TOKEN_ADDRESS: Address = Address::ZERO;

/// 聚合器 API（XY / 1inch）约定的原生币地址
pub const AGGREGATOR_NATIVE_ADDRESS: Address = address!("EeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

/// 内部地址 → 聚合器 API 使用的地址
pub fn to_aggregator_address(address: Address) -> Address {
    if address == NATIVE_TOKEN_ADDRESS { AGGREGATOR_NATIVE_ADDRESS } else { address }
}

/// 聚合器 API 返回的地址 → 内部地址
pub fn from_aggregator_address(address: Address) -> Address {
    if address == AGGREGATOR_NATIVE_ADDRESS { NATIVE_TOKEN_ADDRESS } else { address }
}
