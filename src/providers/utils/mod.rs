//! 提供方共享的常量与 DTO

pub mod oneinch;
pub mod stargate;
pub mod uniswap_v2;
pub mod xy_dex;

use crate::common::errors::SdkError;
use crate::common::types::EvmEncodeConfig;
use crate::utils::amount::parse_quantity;
use alloy_primitives::{Address, Bytes};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

pub(crate) fn parse_address(raw: &str) -> Result<Address, SdkError> {
    Address::from_str(raw.trim()).map_err(|e| SdkError::InvalidAddress(format!("{raw}: {e}")))
}

/// API 返回的交易 `{to, data, value}` → `EvmEncodeConfig`
pub(crate) fn api_transaction(to: &str, data: &str, value: &str) -> Result<EvmEncodeConfig, SdkError> {
    let data = Bytes::from_str(data).map_err(|e| SdkError::Encoding(format!("invalid calldata: {e}")))?;
    Ok(EvmEncodeConfig::new(parse_address(to)?, data, parse_quantity(value)?))
}

/// 接受字符串或数字，统一为字符串
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
