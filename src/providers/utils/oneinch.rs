//! 1inch 聚合器 API 的请求 / 响应结构

use super::string_or_number;
use crate::constants::{BlockchainName, from_aggregator_address};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;

pub const ONEINCH_NAME: &str = "ONE_INCH";

pub const ONEINCH_SUPPORTED_BLOCKCHAINS: [BlockchainName; 9] = [
    BlockchainName::Ethereum,
    BlockchainName::BinanceSmartChain,
    BlockchainName::Polygon,
    BlockchainName::Avalanche,
    BlockchainName::Fantom,
    BlockchainName::Arbitrum,
    BlockchainName::Optimism,
    BlockchainName::Base,
    BlockchainName::Gnosis,
];

#[derive(Debug, Clone, Deserialize)]
pub struct OneinchTokensResponse {
    pub tokens: HashMap<String, Value>,
}

impl OneinchTokensResponse {
    /// 可解析的代币地址，无法解析的条目直接忽略
    pub fn addresses(&self) -> impl Iterator<Item = Address> + '_ {
        self.tokens.keys().filter_map(|key| Address::from_str(key).ok())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OneinchSpenderResponse {
    pub address: String,
}

/// `/quote` 请求参数
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OneinchQuoteRequest {
    pub src: String,
    pub dst: String,
    pub amount: String,
    pub include_protocols: bool,
    pub include_gas: bool,
    /// 禁用多跳时只保留一条主路径
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_route_parts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity_level: Option<u32>,
}

/// `/swap` 请求参数
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OneinchSwapRequest {
    #[serde(flatten)]
    pub quote: OneinchQuoteRequest,
    pub from: String,
    /// 百分比
    pub slippage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    pub disable_estimate: bool,
}

/// 路由：routes → hops → parts
pub type OneinchProtocols = Vec<Vec<Vec<OneinchProtocolPart>>>;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneinchProtocolPart {
    pub name: String,
    pub from_token_address: String,
    pub to_token_address: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneinchQuoteResponse {
    #[serde(alias = "toTokenAmount")]
    pub to_amount: String,
    #[serde(default)]
    pub protocols: OneinchProtocols,
    #[serde(default, alias = "estimatedGas", deserialize_with = "string_or_number")]
    pub gas: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneinchSwapResponse {
    #[serde(alias = "toTokenAmount")]
    pub to_amount: String,
    #[serde(default)]
    pub protocols: OneinchProtocols,
    pub tx: OneinchTransaction,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneinchTransaction {
    pub to: String,
    pub data: String,
    pub value: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub gas: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub gas_price: Option<String>,
}

/// 主路径上的中间代币：取每一跳第一部分的目标代币，再去掉最后一跳（即目标代币本身）
pub fn intermediate_addresses(protocols: &OneinchProtocols) -> Vec<Address> {
    let Some(route) = protocols.first() else {
        return Vec::new();
    };
    let mut hops: Vec<Address> = route
        .iter()
        .filter_map(|hop| hop.first())
        .filter_map(|part| Address::from_str(&part.to_token_address).ok())
        .map(from_aggregator_address)
        .collect();
    hops.pop();
    hops
}
