//! 报价过期检查
//!
//! 编码交易前重新获取报价，并与交易当前展示的目标数量比较：
//! 新报价必须落在 `[expected × (1 − lower/100), expected × (1 + upper/100)]` 内（含边界），
//! 否则交易被视为过期，调用方拿到按新报价重建的交易后需要重新确认。
//!
//! 全部使用 `BigDecimal`，没有浮点运算，也没有 I/O。

use crate::common::errors::SdkError;
use crate::common::tokens::Token;
use crate::trading::core::trade::OnChainTrade;
use crate::utils::amount::{from_wei, percent_to_fraction};
use crate::utils::quote::Quote;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::Signed;
use std::fmt;
use tracing::{debug, warn};

/// 报价容差（百分比）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateTolerance {
    upper_percent: BigDecimal,
    lower_percent: BigDecimal,
}

impl RateTolerance {
    /// 负数容差没有意义，直接拒绝
    pub fn new(upper_percent: BigDecimal, lower_percent: BigDecimal) -> Result<Self, SdkError> {
        if upper_percent.is_negative() || lower_percent.is_negative() {
            return Err(SdkError::InvalidTolerance(format!(
                "tolerances must be non-negative, got upper={upper_percent} lower={lower_percent}"
            )));
        }
        Ok(Self { upper_percent, lower_percent })
    }

    pub fn upper_percent(&self) -> &BigDecimal {
        &self.upper_percent
    }

    pub fn lower_percent(&self) -> &BigDecimal {
        &self.lower_percent
    }

    pub fn bounds(&self, expected: &BigDecimal) -> RateBounds {
        let upper = expected + expected * percent_to_fraction(&self.upper_percent);
        let lower = expected - expected * percent_to_fraction(&self.lower_percent);
        RateBounds { lower, upper }
    }
}

impl Default for RateTolerance {
    /// 上浮 2%，下浮 0.3%
    fn default() -> Self {
        Self {
            upper_percent: BigDecimal::from(2),
            lower_percent: BigDecimal::new(BigInt::from(3), 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateBounds {
    pub lower: BigDecimal,
    pub upper: BigDecimal,
}

impl RateBounds {
    pub fn contains(&self, amount: &BigDecimal) -> bool {
        &self.lower <= amount && amount <= &self.upper
    }
}

impl fmt::Display for RateBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateVerdict {
    Accepted,
    Rejected { bounds: RateBounds },
}

impl RateVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, RateVerdict::Accepted)
    }
}

/// 纯函数：相同输入永远得到相同结论
pub fn validate_rate(fresh: &BigDecimal, expected: &BigDecimal, tolerance: &RateTolerance) -> RateVerdict {
    let bounds = tolerance.bounds(expected);
    if bounds.contains(fresh) {
        RateVerdict::Accepted
    } else {
        RateVerdict::Rejected { bounds }
    }
}

/// 用新报价校验交易
///
/// 通过时返回 `Ok(())`；过期时返回 `SdkError::UpdatedRates`，其中的交易目标数量为新报价，
/// 路径为报价给出的路径，报价没有路径时为 `[from, to]`。
pub fn check_order_amount(trade: &OnChainTrade, quote: &Quote, tolerance: &RateTolerance) -> Result<(), SdkError> {
    let expected = trade.to.token_amount();
    let fresh = from_wei(quote.destination_amount_wei, trade.to.token.decimals);

    match validate_rate(&fresh, &expected, tolerance) {
        RateVerdict::Accepted => {
            debug!(provider = %trade.trade_type, %expected, %fresh, "fresh quote within tolerance");
            Ok(())
        }
        RateVerdict::Rejected { bounds } => {
            warn!(
                provider = %trade.trade_type,
                %expected,
                %fresh,
                lower = %bounds.lower,
                upper = %bounds.upper,
                "fresh quote outside tolerance"
            );
            let new_to = trade.to.with_wei_amount(quote.destination_amount_wei);
            let path: Vec<Token> = match &quote.path {
                Some(path) => path.clone(),
                None => vec![trade.from.token.clone(), new_to.token.clone()],
            };
            Err(SdkError::UpdatedRates(Box::new(trade.with_fresh_output(new_to, path))))
        }
    }
}
