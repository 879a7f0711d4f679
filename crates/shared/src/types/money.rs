//! Peso amounts as printed on liquidation reports.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts stay `rust_decimal::Decimal` until they are rendered.

use rust_decimal::{Decimal, RoundingStrategy};

/// Currency prefix used on printed reports.
pub const CURRENCY_PREFIX: &str = "PHP";

/// Rounds an amount to centavos.
#[must_use]
pub fn to_centavos(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats an amount with thousands separators and two decimals.
///
/// ```
/// use orgfin_shared::types::money::format_amount;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_amount(Decimal::new(123456789, 2)), "1,234,567.89");
/// ```
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let rounded = to_centavos(amount);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{grouped}.{frac_part}")
    } else {
        format!("{grouped}.{frac_part}")
    }
}

/// Formats an amount as `PHP 1,234.56`.
#[must_use]
pub fn format_php(amount: Decimal) -> String {
    format!("{CURRENCY_PREFIX} {}", format_amount(amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(0), "PHP 0.00")]
    #[case(dec!(5), "PHP 5.00")]
    #[case(dec!(999.999), "PHP 1,000.00")]
    #[case(dec!(1234.5), "PHP 1,234.50")]
    #[case(dec!(1000000), "PHP 1,000,000.00")]
    #[case(dec!(-2500.75), "PHP -2,500.75")]
    #[case(dec!(-0.001), "PHP 0.00")]
    fn test_format_php(#[case] amount: Decimal, #[case] expected: &str) {
        assert_eq!(format_php(amount), expected);
    }

    #[test]
    fn test_to_centavos_rounds_half_away_from_zero() {
        assert_eq!(to_centavos(dec!(1.005)), dec!(1.01));
        assert_eq!(to_centavos(dec!(-1.005)), dec!(-1.01));
    }

    proptest! {
        #[test]
        fn prop_formatted_amount_parses_back(cents in -10_000_000_000i64..10_000_000_000i64) {
            let amount = Decimal::new(cents, 2);
            let formatted = format_amount(amount);
            let parsed: Decimal = formatted.replace(',', "").parse().unwrap();
            prop_assert_eq!(parsed, amount);
        }

        #[test]
        fn prop_groups_have_three_digits(cents in 0i64..10_000_000_000i64) {
            let formatted = format_amount(Decimal::new(cents, 2));
            let int_part = formatted.split('.').next().unwrap();
            let groups: Vec<&str> = int_part.split(',').collect();
            prop_assert!(!groups[0].is_empty() && groups[0].len() <= 3);
            for group in &groups[1..] {
                prop_assert_eq!(group.len(), 3);
            }
        }
    }
}
