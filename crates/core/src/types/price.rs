//! Type-safe price representation using decimal arithmetic.
//!
//! The storefront sells in a single currency (INR). Prices are stored in the
//! standard unit (rupees) and converted to minor units (paise) only at the
//! payment-gateway boundary.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// ISO 4217 code of the only currency the store trades in.
pub const CURRENCY_CODE: &str = "INR";

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Prices cannot be negative.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
    /// The amount does not fit the gateway's minor-unit integer.
    #[error("price {0} cannot be expressed in minor units")]
    Overflow(Decimal),
}

/// A non-negative amount in rupees.
///
/// ```
/// use ambre_core::Price;
/// use rust_decimal::Decimal;
///
/// let price = Price::try_new(Decimal::new(49950, 2)).unwrap();
/// assert_eq!(price.to_minor_units().unwrap(), 49950);
/// assert!(Price::try_new(Decimal::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price, rejecting negative amounts.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `amount` is below zero.
    pub fn try_new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of rupees.
    #[must_use]
    pub fn from_rupees(rupees: u32) -> Self {
        Self(Decimal::from(rupees))
    }

    /// The amount in rupees.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The amount in paise, as payment gateways expect it.
    ///
    /// Fractions of a paisa are rounded half away from zero.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the amount does not fit in a `u64`.
    pub fn to_minor_units(&self) -> Result<u64, PriceError> {
        let paise = (self.0 * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        paise.to_u64().ok_or(PriceError::Overflow(self.0))
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::try_new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self::Output {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{:.2}", self.0)
    }
}
