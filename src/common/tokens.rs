//! 代币、带价格的代币与代币数量

use crate::common::errors::SdkError;
use crate::constants::{BlockchainName, NATIVE_TOKEN_ADDRESS};
use crate::utils::amount::{from_wei, to_wei};
use alloy_primitives::{Address, U256};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub blockchain: BlockchainName,
    pub address: Address,
    pub decimals: u8,
    pub symbol: String,
    pub name: String,
}

impl Token {
    pub fn new(
        blockchain: BlockchainName,
        address: Address,
        decimals: u8,
        symbol: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self { blockchain, address, decimals, symbol: symbol.into(), name: name.into() }
    }

    /// 链的原生币（地址为零地址）
    pub fn native(blockchain: BlockchainName) -> Self {
        let currency = blockchain.native_currency();
        Self::new(blockchain, NATIVE_TOKEN_ADDRESS, currency.decimals, currency.symbol, currency.name)
    }

    /// 链的包装原生币
    pub fn wrapped_native(blockchain: BlockchainName) -> Self {
        let currency = blockchain.native_currency();
        Self::new(
            blockchain,
            blockchain.wrapped_native_address(),
            currency.decimals,
            format!("W{}", currency.symbol),
            format!("Wrapped {}", currency.name),
        )
    }

    pub fn is_native(&self) -> bool {
        self.address == NATIVE_TOKEN_ADDRESS
    }

    /// 同链同地址即视为同一代币
    pub fn is_equal_to(&self, other: &Token) -> bool {
        self.blockchain == other.blockchain && self.address == other.address
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.symbol, self.blockchain)
    }
}

/// 代币 + 可选的 USD 价格
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceToken {
    pub token: Token,
    pub price: Option<BigDecimal>,
}

impl PriceToken {
    pub fn new(token: Token, price: Option<BigDecimal>) -> Self {
        Self { token, price }
    }
}

impl From<Token> for PriceToken {
    fn from(token: Token) -> Self {
        Self { token, price: None }
    }
}

/// 代币 + 价格 + wei 数量
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceTokenAmount {
    pub token: Token,
    pub price: Option<BigDecimal>,
    pub wei_amount: U256,
}

impl PriceTokenAmount {
    pub fn from_wei(token: Token, wei_amount: U256) -> Self {
        Self { token, price: None, wei_amount }
    }

    /// 按十进制代币数量创建，超出精度的部分截断
    pub fn from_token_amount(token: Token, amount: &BigDecimal) -> Result<Self, SdkError> {
        let wei_amount = to_wei(amount, token.decimals)?;
        Ok(Self { token, price: None, wei_amount })
    }

    pub fn with_price(mut self, price: Option<BigDecimal>) -> Self {
        self.price = price;
        self
    }

    pub fn token_amount(&self) -> BigDecimal {
        from_wei(self.wei_amount, self.token.decimals)
    }

    pub fn string_wei_amount(&self) -> String {
        self.wei_amount.to_string()
    }

    /// 保留代币和价格，替换数量
    pub fn with_wei_amount(&self, wei_amount: U256) -> Self {
        Self { token: self.token.clone(), price: self.price.clone(), wei_amount }
    }

    pub fn price_token(&self) -> PriceToken {
        PriceToken { token: self.token.clone(), price: self.price.clone() }
    }

    pub fn is_native(&self) -> bool {
        self.token.is_native()
    }

    pub fn blockchain(&self) -> BlockchainName {
        self.token.blockchain
    }
}
