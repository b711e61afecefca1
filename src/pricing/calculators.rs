//! Core pricing calculation functions.
//!
//! Pure functions for pricing math - no database access, no side effects.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// A forecast line item as the pricing function sees it: the tariff's
/// per-unit-per-day price and the selected unit count.
#[derive(Debug, Clone, Copy)]
pub struct PricedLine {
    pub unit_price: Decimal,
    pub count: i32,
}

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// Banker's rounding rounds to the nearest even number when the value is exactly
/// halfway between two possibilities. This reduces cumulative rounding bias.
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Price a forecast: the daily sum of all line items, times the forecast's
/// duration in days, rounded to two places.
///
/// `days` and each `count` are expected positive; callers validate before
/// invoking. Zero or negative inputs price to zero rather than going
/// negative.
pub fn forecast_price(days: i32, lines: &[PricedLine]) -> Decimal {
    if days <= 0 {
        return Decimal::ZERO;
    }

    let daily: Decimal = lines
        .iter()
        .filter(|l| l.count > 0)
        .map(|l| l.unit_price * Decimal::from(l.count))
        .sum();

    round_money(daily * Decimal::from(days), 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(unit_price: Decimal, count: i32) -> PricedLine {
        PricedLine { unit_price, count }
    }

    // ==================== round_money tests ====================

    #[test]
    fn test_round_money_bankers_rounding_to_even() {
        assert_eq!(round_money(dec!(2.5), 0), dec!(2)); // rounds down to even
        assert_eq!(round_money(dec!(3.5), 0), dec!(4)); // rounds up to even
        assert_eq!(round_money(dec!(2.125), 2), dec!(2.12));
        assert_eq!(round_money(dec!(2.135), 2), dec!(2.14));
    }

    #[test]
    fn test_round_money_normal_rounding() {
        assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
        assert_eq!(round_money(dec!(1.236), 2), dec!(1.24));
    }

    // ==================== forecast_price tests ====================

    #[test]
    fn test_single_line_single_day() {
        let lines = vec![line(dec!(10.50), 1)];
        assert_eq!(forecast_price(1, &lines), dec!(10.50));
    }

    #[test]
    fn test_count_and_days_multiply() {
        // 2 units at 10.50/day for 5 days = 105.00
        let lines = vec![line(dec!(10.50), 2)];
        assert_eq!(forecast_price(5, &lines), dec!(105.00));
    }

    #[test]
    fn test_lines_sum_before_days() {
        let lines = vec![line(dec!(1.25), 4), line(dec!(0.75), 2)];
        // daily = 5.00 + 1.50 = 6.50; 3 days = 19.50
        assert_eq!(forecast_price(3, &lines), dec!(19.50));
    }

    #[test]
    fn test_result_rounded_to_two_places() {
        let lines = vec![line(dec!(0.333), 1)];
        // 0.333 * 7 = 2.331 -> 2.33
        assert_eq!(forecast_price(7, &lines), dec!(2.33));
    }

    #[test]
    fn test_empty_lines_price_to_zero() {
        assert_eq!(forecast_price(5, &[]), Decimal::ZERO);
    }

    #[test]
    fn test_nonpositive_days_price_to_zero() {
        let lines = vec![line(dec!(10), 1)];
        assert_eq!(forecast_price(0, &lines), Decimal::ZERO);
        assert_eq!(forecast_price(-3, &lines), Decimal::ZERO);
    }

    #[test]
    fn test_nonpositive_counts_are_ignored() {
        let lines = vec![line(dec!(10), 0), line(dec!(5), 2)];
        assert_eq!(forecast_price(2, &lines), dec!(20));
    }
}
