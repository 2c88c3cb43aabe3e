//! wei 整数与十进制代币数量之间的换算
//!
//! 全部使用 `BigDecimal` 精确运算，不经过浮点数

use crate::common::errors::SdkError;
use alloy_primitives::U256;
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_traits::Signed;

/// 10^decimals
pub fn pow10(decimals: u8) -> BigDecimal {
    BigDecimal::new(BigInt::from(1), -i64::from(decimals))
}

/// percent / 100，例如 2 → 0.02
pub fn percent_to_fraction(percent: &BigDecimal) -> BigDecimal {
    percent * BigDecimal::new(BigInt::from(1), 2)
}

/// wei → 代币数量
pub fn from_wei(wei: U256, decimals: u8) -> BigDecimal {
    let digits = BigInt::from_bytes_be(Sign::Plus, &wei.to_be_bytes::<32>());
    BigDecimal::new(digits, i64::from(decimals))
}

/// 代币数量 → wei，多余的小数位向零截断
pub fn to_wei(amount: &BigDecimal, decimals: u8) -> Result<U256, SdkError> {
    if amount.is_negative() {
        return Err(SdkError::InvalidAmount(format!("negative amount {amount}")));
    }
    let scaled = amount * pow10(decimals);
    let (digits, _) = scaled.with_scale(0).into_bigint_and_exponent();
    let (_, bytes) = digits.to_bytes_be();
    if bytes.len() > 32 {
        return Err(SdkError::InvalidAmount(format!("{amount} overflows uint256")));
    }
    U256::try_from_be_slice(&bytes)
        .ok_or_else(|| SdkError::InvalidAmount(format!("{amount} overflows uint256")))
}

/// 解析 API 返回的数量，支持十进制和 `0x` 十六进制
pub fn parse_quantity(raw: &str) -> Result<U256, SdkError> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some("") => Ok(U256::ZERO),
        Some(hex_digits) => U256::from_str_radix(hex_digits, 16),
        None => U256::from_str_radix(raw, 10),
    };
    parsed.map_err(|e| SdkError::InvalidAmount(format!("cannot parse quantity {raw:?}: {e}")))
}

/// 不带多余尾零的十进制字符串，例如 2.00 → "2"
pub fn format_decimal(value: &BigDecimal) -> String {
    let text = value.to_string();
    if text.contains('.') && !text.contains(['e', 'E']) {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_from_wei_scales_by_decimals() {
        assert_eq!(from_wei(U256::from(1_500_000u64), 6), dec("1.5"));
        assert_eq!(from_wei(U256::from(1u64), 18), dec("0.000000000000000001"));
        assert_eq!(from_wei(U256::ZERO, 18), dec("0"));
    }

    #[test]
    fn test_to_wei_truncates_extra_digits() {
        assert_eq!(to_wei(&dec("1.2345678"), 6).unwrap(), U256::from(1_234_567u64));
        assert_eq!(to_wei(&dec("1015"), 0).unwrap(), U256::from(1015u64));
        assert_eq!(to_wei(&dec("0"), 18).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_to_wei_rejects_negative_and_overflow() {
        assert!(matches!(to_wei(&dec("-1"), 6), Err(SdkError::InvalidAmount(_))));
        let huge = from_wei(U256::MAX, 0) * BigDecimal::from(10);
        assert!(matches!(to_wei(&huge, 0), Err(SdkError::InvalidAmount(_))));
    }

    #[test]
    fn test_wei_conversion_preserves_large_values() {
        let wei = U256::MAX;
        assert_eq!(to_wei(&from_wei(wei, 18), 18).unwrap(), wei);
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("1000").unwrap(), U256::from(1000u64));
        assert_eq!(parse_quantity("0x3e8").unwrap(), U256::from(1000u64));
        assert_eq!(parse_quantity("0x").unwrap(), U256::ZERO);
        assert!(parse_quantity("12.5").is_err());
    }

    #[test]
    fn test_format_decimal_trims_zeros() {
        assert_eq!(format_decimal(&dec("2.00")), "2");
        assert_eq!(format_decimal(&dec("0.50")), "0.5");
        assert_eq!(format_decimal(&dec("100")), "100");
        assert_eq!(format_decimal(&(dec("0.02") * BigDecimal::from(100))), "2");
    }
}
