use alloy_primitives::U256;
use alloy_primitives::utils::parse_units;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("amount is negative")]
    Negative,
    #[error("invalid amount {0:?}: {1}")]
    Invalid(String, String),
}

/// Parse a user-typed decimal amount into base units of a token with `decimals`.
pub fn parse_amount(text: &str, decimals: u8) -> Result<U256, AmountError> {
    let text = text.trim();
    if text.is_empty() || text == "." {
        return Err(AmountError::Empty);
    }
    if text.starts_with('-') {
        return Err(AmountError::Negative);
    }
    let parsed = parse_units(text, decimals).map_err(|e| AmountError::Invalid(text.to_string(), e.to_string()))?;
    Ok(parsed.get_absolute())
}

/// An amount counts as empty when it is blank, does not parse, or is zero.
pub fn is_empty_amount(text: &str) -> bool {
    // 18 decimals accepts every fractional length a token can carry.
    parse_amount(text, 18).map(|v| v.is_zero()).unwrap_or(true)
}

/// `numerator / denominator` scaled by `10^places`, rounded half up.
///
/// `None` for a zero denominator or a result that does not fit in 256 bits.
/// Fractional digits come from long division on the remainder, so no
/// intermediate product exceeds the denominator.
pub fn scale_ratio(numerator: U256, denominator: U256, places: u8) -> Option<U256> {
    if denominator.is_zero() {
        return None;
    }
    let scale = U256::from(10).checked_pow(U256::from(places))?;
    let (whole, mut remainder) = numerator.div_rem(denominator);

    let mut fraction = U256::ZERO;
    for _ in 0..places {
        // remainder * 10 mod denominator; each wrap is one unit of the digit
        let mut digit = 0u64;
        let mut next = U256::ZERO;
        for _ in 0..10 {
            let room = denominator - remainder;
            if next >= room {
                next -= room;
                digit += 1;
            } else {
                next += remainder;
            }
        }
        fraction = fraction * U256::from(10) + U256::from(digit);
        remainder = next;
    }
    if remainder >= denominator - remainder {
        fraction += U256::from(1);
    }

    whole.checked_mul(scale)?.checked_add(fraction)
}

/// Render `value / 10^decimals` with exactly `places` fractional digits,
/// rounding half up. `None` when the scaled value overflows.
pub fn format_fixed(value: U256, decimals: u8, places: u8) -> Option<String> {
    let scale = U256::from(10).checked_pow(U256::from(decimals))?;
    let out_scale = U256::from(10).checked_pow(U256::from(places))?;
    let scaled = scale_ratio(value, scale, places)?;
    let (int_part, frac_part) = scaled.div_rem(out_scale);
    if places == 0 {
        Some(int_part.to_string())
    } else {
        Some(format!("{}.{:0>width$}", int_part, frac_part.to_string(), width = places as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1.5", 6), Ok(U256::from(1_500_000u64)));
        assert_eq!(parse_amount(" 100 ", 0), Ok(U256::from(100u64)));
        assert_eq!(parse_amount("", 18), Err(AmountError::Empty));
        assert_eq!(parse_amount("-1", 18), Err(AmountError::Negative));
        assert!(matches!(parse_amount("abc", 18), Err(AmountError::Invalid(..))));
    }

    #[test]
    fn test_empty_amounts() {
        assert!(is_empty_amount(""));
        assert!(is_empty_amount("0"));
        assert!(is_empty_amount("0.000"));
        assert!(is_empty_amount("."));
        assert!(is_empty_amount("x"));
        assert!(!is_empty_amount("1.0"));
        assert!(!is_empty_amount("0.0001"));
    }

    #[test]
    fn test_format_fixed_rounds_half_up() {
        assert_eq!(format_fixed(U256::from(70_049u64), 4, 2).as_deref(), Some("7.00"));
        assert_eq!(format_fixed(U256::from(70_050u64), 4, 2).as_deref(), Some("7.01"));
        assert_eq!(format_fixed(U256::from(1_500_000u64), 6, 4).as_deref(), Some("1.5000"));
        assert_eq!(format_fixed(U256::from(12u64), 0, 2).as_deref(), Some("12.00"));
        assert_eq!(format_fixed(U256::from(25u64), 1, 0).as_deref(), Some("3"));
    }

    #[test]
    fn test_scale_ratio_large_operands() {
        let ten = U256::from(10);
        // 10^74 / 10^75 is 0.1: 1000 at four places
        assert_eq!(scale_ratio(ten.pow(U256::from(74)), ten.pow(U256::from(75)), 4), Some(U256::from(1000)));
        // 7.005% with operands near the top of the range rounds exactly to 7.01
        let denominator = ten.pow(U256::from(76));
        let numerator = U256::from(7_005) * ten.pow(U256::from(71));
        assert_eq!(scale_ratio(numerator, denominator, 4), Some(U256::from(701)));
        // Halves round up
        assert_eq!(scale_ratio(U256::from(1), U256::from(8), 2), Some(U256::from(13)));
    }

    #[test]
    fn test_scale_ratio_overflow_is_none() {
        assert_eq!(scale_ratio(U256::MAX, U256::from(1), 4), None);
        assert_eq!(scale_ratio(U256::from(1), U256::ZERO, 4), None);
        assert_eq!(format_fixed(U256::MAX, 0, 2), None);

        // Large raw balances still format once the decimals divide them down
        let big = U256::from(10).pow(U256::from(76));
        assert_eq!(format_fixed(big, 18, 2), Some(format!("{}.00", U256::from(10).pow(U256::from(58)))));
    }
}
