use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// Money type with 8 decimal places of working precision
///
/// Running balances keep the full precision from period to period; rounding to
/// cents happens only when an amount is displayed or exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    pub const CENT: Money = Money(Decimal::from_parts(1, 0, 0, false, 2));

    /// create from decimal
    pub fn from_decimal(d: Decimal) -> Self {
        Money(d.round_dp(8))
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money(Decimal::from_str(s.trim())?.round_dp(8)))
    }

    /// create from integer amount (dollars, rand, etc)
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// round to specified decimal places
    pub fn round_dp(&self, dp: u32) -> Self {
        Money(self.0.round_dp(dp))
    }

    /// rounded decimal with a fixed scale, for display and export
    pub fn to_display_decimal(&self, dp: u32) -> Decimal {
        let mut d = self.0.round_dp(dp);
        d.rescale(dp);
        d
    }

    /// fixed-scale string such as "963.49"
    pub fn display(&self, dp: u32) -> String {
        self.to_display_decimal(dp).to_string()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// strictly less than zero
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// simple interest for `days` at an annual rate over a `year_basis`-day year
    ///
    /// Negative day counts produce negative interest; callers own period validity.
    pub fn apply_rate(&self, annual_rate: Rate, days: i64, year_basis: u32) -> Self {
        let fraction = Decimal::from(days) / Decimal::from(year_basis);
        Money((self.0 * fraction * annual_rate.as_decimal()).round_dp(8))
    }

    /// true when both amounts agree to within `tolerance`
    pub fn approx_eq(&self, other: Money, tolerance: Money) -> bool {
        (*self - other).abs() <= tolerance
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money((self.0 + other.0).round_dp(8))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 = (self.0 + other.0).round_dp(8);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money((self.0 - other.0).round_dp(8))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 = (self.0 - other.0).round_dp(8);
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

/// rate type for interest rates, stored as a fraction (0.12 for 12%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);

    /// create from decimal (e.g., 0.05 for 5%)
    pub fn from_decimal(d: Decimal) -> Self {
        Rate(d)
    }

    /// create from whole percentage (e.g., 5 for 5%)
    pub fn from_percentage(p: u32) -> Self {
        Rate(Decimal::from(p) / Decimal::from(100))
    }

    /// create from a percent-per-annum figure as entered by an operator (e.g., 12.5)
    pub fn from_percent(p: Decimal) -> Self {
        Rate(p / Decimal::from(100))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn as_percentage(&self) -> Decimal {
        self.0 * Decimal::from(100)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_precision() {
        let m = Money::from_str_exact("100.123456789").unwrap();
        assert_eq!(m.to_string(), "100.12345679"); // rounded to 8 places
    }

    #[test]
    fn test_display_keeps_two_places() {
        assert_eq!(Money::from_major(5).display(2), "5.00");
        assert_eq!(Money::from_str_exact("963.49315068").unwrap().display(2), "963.49");
        assert_eq!(Money::from_str_exact("-12.5").unwrap().display(2), "-12.50");
    }

    #[test]
    fn test_apply_rate_over_days() {
        let balance = Money::from_major(1_000);
        let rate = Rate::from_percent(dec!(10));

        let interest = balance.apply_rate(rate, 31, 365);
        assert_eq!(interest.round_dp(2), Money::from_str_exact("8.49").unwrap());

        let full_year = Money::from_major(10_000).apply_rate(Rate::from_percentage(5), 365, 365);
        assert_eq!(full_year.round_dp(2).display(2), "500.00");
    }

    #[test]
    fn test_negative_days_give_negative_interest() {
        let interest = Money::from_major(1_000).apply_rate(Rate::from_percentage(10), -5, 365);
        assert!(interest.is_negative());
    }

    #[test]
    fn test_rate_from_percent() {
        let rate = Rate::from_percent(dec!(12.5));
        assert_eq!(rate.as_decimal(), dec!(0.125));
        assert_eq!(rate.to_string(), "12.5%");
    }

    #[test]
    fn test_sign_checks_are_strict() {
        assert!(!Money::ZERO.is_positive());
        assert!(!Money::ZERO.is_negative());
        assert!(Money::CENT.is_positive());
        assert!((-Money::CENT).is_negative());
    }
}
