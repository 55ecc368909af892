//! Immutable decimal amount tagged with a currency code.

use crate::errors::MoneyError;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// An exact amount plus the currency it is denominated in.
///
/// * Every operation returns a new value.
/// * Addition, subtraction and comparison only work between equal currency
///   codes (case-sensitive; the empty code is a currency like any other).
/// * Scaling by a unitless factor never looks at the currency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    pub fn zero(currency: impl Into<String>) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    /// Lossy: binary floats rarely hold the decimal you meant.
    /// Only kept for sources that already hand us `f64`.
    pub fn from_f64(amount: f64, currency: impl Into<String>) -> Result<Self, MoneyError> {
        let amount =
            Decimal::from_f64(amount).ok_or_else(|| MoneyError::Parse(amount.to_string()))?;
        Ok(Self::new(amount, currency))
    }

    /// Parse a bare decimal such as `"-100.50"`.
    pub fn parse(amount: &str, currency: impl Into<String>) -> Result<Self, MoneyError> {
        let trimmed = amount.trim();
        let amount =
            Decimal::from_str(trimmed).map_err(|_| MoneyError::Parse(trimmed.to_string()))?;
        Ok(Self::new(amount, currency))
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.same_currency(other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(MoneyError::Overflow)?;
        Ok(Self::new(amount, self.currency.clone()))
    }

    pub fn subtract(&self, other: &Money) -> Result<Money, MoneyError> {
        self.same_currency(other)?;
        let amount = self
            .amount
            .checked_sub(other.amount)
            .ok_or(MoneyError::Overflow)?;
        Ok(Self::new(amount, self.currency.clone()))
    }

    /// Saturates at `Decimal::MAX`/`MIN` instead of overflowing.
    pub fn multiply(&self, factor: Decimal) -> Money {
        Self::new(self.amount.saturating_mul(factor), self.currency.clone())
    }

    pub fn divide(&self, divisor: Decimal) -> Result<Money, MoneyError> {
        let amount = self
            .amount
            .checked_div(divisor)
            .ok_or(MoneyError::DivisionByZero)?;
        Ok(Self::new(amount, self.currency.clone()))
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    pub fn abs(&self) -> Money {
        Self::new(self.amount.abs(), self.currency.clone())
    }

    pub fn negate(&self) -> Money {
        Self::new(-self.amount, self.currency.clone())
    }

    /// Ordering of two amounts in the same currency.
    pub fn compare(&self, other: &Money) -> Result<Ordering, MoneyError> {
        self.same_currency(other)?;
        Ok(self.amount.cmp(&other.amount))
    }

    /// Amount rounded half away from zero to `places`, followed by the code.
    pub fn to_string_with_places(&self, places: u32) -> String {
        let amount = format_amount(self.amount, places);
        if self.currency.is_empty() {
            amount
        } else {
            format!("{amount} {}", self.currency)
        }
    }

    fn same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.currency == other.currency {
            Ok(())
        } else {
            Err(MoneyError::CurrencyMismatch {
                left: self.currency.clone(),
                right: other.currency.clone(),
            })
        }
    }
}

/// Fixed-point rendering used everywhere a decimal leaves the crate.
pub(crate) fn format_amount(amount: Decimal, places: u32) -> String {
    let rounded = amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", places as usize, rounded)
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with_places(2))
    }
}

/// Accepts the `Display` form: `"<amount>"` or `"<amount> <CURRENCY>"`.
impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let amount = parts.next().ok_or_else(|| MoneyError::Parse(s.to_string()))?;
        let currency = parts.next().unwrap_or_default();
        if parts.next().is_some() {
            return Err(MoneyError::Parse(s.to_string()));
        }
        Self::parse(amount, currency)
    }
}
