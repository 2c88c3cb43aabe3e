//! 聚合器 API 或路由合约返回的最新报价
//!
//! 数量均为目标代币最小单位的整数，报价收到后不再修改。

use crate::common::errors::SdkError;
use crate::common::tokens::Token;
use crate::utils::amount::parse_quantity;
use alloy_primitives::U256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    /// 路由承诺的到账数量
    pub destination_amount_wei: U256,
    /// 扣除滑点后的最少到账数量（来源提供时）
    pub min_receive_amount_wei: Option<U256>,
    /// 报价经过的路径
    pub path: Option<Vec<Token>>,
}

impl Quote {
    pub fn new(destination_amount_wei: U256) -> Self {
        Self { destination_amount_wei, min_receive_amount_wei: None, path: None }
    }

    /// 解析 HTTP API 返回的十进制（或 0x 前缀）整数字符串
    pub fn from_wei_strings(destination: &str, min_receive: Option<&str>) -> Result<Self, SdkError> {
        Ok(Self {
            destination_amount_wei: parse_quantity(destination)?,
            min_receive_amount_wei: min_receive.map(parse_quantity).transpose()?,
            path: None,
        })
    }

    pub fn with_min_receive(mut self, min_receive_amount_wei: U256) -> Self {
        self.min_receive_amount_wei = Some(min_receive_amount_wei);
        self
    }

    pub fn with_path(mut self, path: Vec<Token>) -> Self {
        self.path = Some(path);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_wei_strings() {
        let quote = Quote::from_wei_strings("1015000000", Some("1009925000")).unwrap();
        assert_eq!(quote.destination_amount_wei, U256::from(1_015_000_000u64));
        assert_eq!(quote.min_receive_amount_wei, Some(U256::from(1_009_925_000u64)));
        assert!(quote.path.is_none());

        assert!(Quote::from_wei_strings("not-a-number", None).is_err());
        assert!(Quote::from_wei_strings("1", Some("-5")).is_err());
    }
}
