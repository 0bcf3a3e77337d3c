use crate::data_sync::sdk::{Fraction, TokenAmount, Trade};
use crate::utils::amount::format_fixed;
use crate::utils::constants::{MAX_PRICE_IMPACT, SWAP_FEE_BPS};
use alloy_primitives::U256;
use std::fmt::{Display, Formatter};

/// Decimal places shown for an execution price
pub const PRICE_DECIMALS: u8 = 4;

/// Price impact in hundredths of a percent, i.e. already rounded to the two
/// decimals that are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PriceImpact(u64);

impl PriceImpact {
    pub fn from_hundredths(hundredths: u64) -> Self {
        Self(hundredths)
    }

    /// From a ratio (0.02 means 2%), rounded half up to 0.01%.
    pub fn from_ratio(ratio: &Fraction) -> Option<Self> {
        let hundredths = ratio.scaled(4)?;
        Some(Self(u64::try_from(hundredths).unwrap_or(u64::MAX)))
    }

    pub fn hundredths(&self) -> u64 {
        self.0
    }

    /// Strictly above `ceiling_percent`.
    pub fn exceeds(&self, ceiling_percent: u64) -> bool {
        self.0 > ceiling_percent.saturating_mul(100)
    }
}

impl Display for PriceImpact {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Display-ready trade terms. Each field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Quote {
    pub output_amount: Option<String>,
    pub execution_price: Option<String>,
    pub price_impact: Option<PriceImpact>,
    /// Router fee, in units of the input token
    pub fee_amount: Option<String>,
}

impl Quote {
    pub fn is_price_impact_too_high(&self) -> bool {
        self.price_impact.is_some_and(|impact| impact.exceeds(MAX_PRICE_IMPACT))
    }
}

/// Derive display values from a raw trade. `None` in, `None` out.
pub fn evaluate(raw: Option<&Trade>) -> Option<Quote> {
    let trade = raw?;
    Some(Quote {
        output_amount: trade.output_amount.as_ref().and_then(format_token_amount),
        execution_price: trade.execution_price.as_ref().and_then(|price| price.to_fixed(PRICE_DECIMALS)),
        price_impact: trade.price_impact.as_ref().and_then(PriceImpact::from_ratio),
        fee_amount: trade.input_amount.as_ref().and_then(swap_fee),
    })
}

fn format_token_amount(amount: &TokenAmount) -> Option<String> {
    let decimals = amount.token.get_decimals();
    format_fixed(amount.raw, decimals, decimals)
}

fn swap_fee(input: &TokenAmount) -> Option<String> {
    let bps = U256::from(SWAP_FEE_BPS);
    let (whole, rest) = input.raw.div_rem(U256::from(10_000));
    let fee = whole * bps + rest * bps / U256::from(10_000);
    format_token_amount(&TokenAmount { token: input.token.clone(), raw: fee })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::token::Token;
    use alloy_primitives::Address;
    use std::sync::Arc;

    fn usdc_amount(raw: u64) -> TokenAmount {
        TokenAmount {
            token: Arc::new(Token::new_with_data(Address::repeat_byte(1), Some("USDC".to_string()), None, Some(6))),
            raw: U256::from(raw),
        }
    }

    fn impact(numerator: u64, denominator: u64) -> Fraction {
        Fraction::new(U256::from(numerator), U256::from(denominator))
    }

    #[test]
    fn test_no_trade_no_quote() {
        assert_eq!(evaluate(None), None);
    }

    #[test]
    fn test_full_quote() {
        let trade = Trade {
            input_amount: Some(usdc_amount(1_000_000)),
            output_amount: Some(usdc_amount(2_500_000)),
            execution_price: Some(impact(5, 2)),
            price_impact: Some(impact(2, 100)),
        };

        let quote = evaluate(Some(&trade)).unwrap();
        assert_eq!(quote.output_amount.as_deref(), Some("2.500000"));
        assert_eq!(quote.execution_price.as_deref(), Some("2.5000"));
        assert_eq!(quote.price_impact.map(|i| i.to_string()).as_deref(), Some("2.00"));
        assert_eq!(quote.fee_amount.as_deref(), Some("0.003000"));
        assert!(!quote.is_price_impact_too_high());
    }

    #[test]
    fn test_partial_quote_keeps_present_fields() {
        let trade = Trade { output_amount: Some(usdc_amount(42)), ..Trade::default() };

        let quote = evaluate(Some(&trade)).unwrap();
        assert_eq!(quote.output_amount.as_deref(), Some("0.000042"));
        assert_eq!(quote.execution_price, None);
        assert_eq!(quote.price_impact, None);
        assert!(!quote.is_price_impact_too_high());
    }

    #[test]
    fn test_price_impact_ceiling_is_strict() {
        let at_ceiling = Quote { price_impact: Some(PriceImpact::from_hundredths(700)), ..Quote::default() };
        let above = Quote { price_impact: Some(PriceImpact::from_hundredths(701)), ..Quote::default() };

        assert!(!at_ceiling.is_price_impact_too_high());
        assert!(above.is_price_impact_too_high());
    }

    #[test]
    fn test_price_impact_rounds_before_classifying() {
        // 7.004% displays as 7.00 and is still executable
        let just_under = PriceImpact::from_ratio(&impact(7_004, 100_000)).unwrap();
        assert_eq!(just_under.to_string(), "7.00");
        assert!(!just_under.exceeds(MAX_PRICE_IMPACT));

        // 7.005% rounds up to 7.01
        let rounded_up = PriceImpact::from_ratio(&impact(7_005, 100_000)).unwrap();
        assert_eq!(rounded_up.to_string(), "7.01");
        assert!(rounded_up.exceeds(MAX_PRICE_IMPACT));
    }

    #[test]
    fn test_zero_denominator_degrades_to_absent() {
        let trade = Trade { price_impact: Some(impact(1, 0)), execution_price: Some(impact(1, 0)), ..Trade::default() };
        let quote = evaluate(Some(&trade)).unwrap();
        assert_eq!(quote.price_impact, None);
        assert_eq!(quote.execution_price, None);
    }

    #[test]
    fn test_price_impact_with_huge_terms_still_blocks() {
        let ten = U256::from(10);
        let trade = Trade {
            price_impact: Some(Fraction::new(ten.pow(U256::from(74)), ten.pow(U256::from(75)))),
            ..Trade::default()
        };

        let quote = evaluate(Some(&trade)).unwrap();
        assert_eq!(quote.price_impact, Some(PriceImpact::from_hundredths(1000)));
        assert!(quote.is_price_impact_too_high());
    }
}
