use num_bigint::BigUint;

use crate::error::CoreError;

/// Unbounded, non-negative account balance and gas price.
pub type Balance = BigUint;

/// Parse a balance from a decimal or `0x`-prefixed hex string
pub fn parse_balance(s: &str) -> Result<Balance, CoreError> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x") {
        Some(hex) => BigUint::parse_bytes(hex.as_bytes(), 16),
        None => BigUint::parse_bytes(s.as_bytes(), 10),
    };
    parsed.ok_or_else(|| CoreError::InvalidBalance(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_balance() {
        assert_eq!(parse_balance("1000").unwrap(), Balance::from(1000u32));
        assert_eq!(parse_balance("0x10").unwrap(), Balance::from(16u32));
        assert_eq!(
            parse_balance("340282366920938463463374607431768211456").unwrap(),
            Balance::from(u128::MAX) + 1u32
        );
    }

    #[test]
    fn test_parse_balance_invalid() {
        assert!(matches!(parse_balance("-5"), Err(CoreError::InvalidBalance(_))));
        assert!(parse_balance("ten").is_err());
        assert!(parse_balance("").is_err());
    }
}
