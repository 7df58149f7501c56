//! Product prices using decimal arithmetic.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog price in euros.
///
/// The API sends prices as plain JSON numbers; they are held as [`Decimal`]
/// so formatting never shows binary floating point noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The underlying amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} €", self.0.round_dp(2))
    }
}

impl std::str::FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().replace(',', ".").parse::<Decimal>().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_displays_two_decimals() {
        assert_eq!(Price::from_cents(1250).to_string(), "12.50 €");
        assert_eq!("3".parse::<Price>().unwrap().to_string(), "3.00 €");
    }

    #[test]
    fn test_price_accepts_comma_decimal_separator() {
        assert_eq!("4,99".parse::<Price>().unwrap(), Price::from_cents(499));
    }

    #[test]
    fn test_price_round_trips_as_json_number() {
        let price: Price = serde_json::from_str("19.9").unwrap();
        assert_eq!(price, Price::from_cents(1990));
        assert_eq!(serde_json::to_string(&Price::from_cents(500)).unwrap(), "5.0");
    }
}
