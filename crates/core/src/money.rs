//! Exact decimal money amount (single implicit currency).

use core::cmp::Ordering;
use core::iter::Sum;
use core::ops::{Add, Sub};
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_object::ValueObject;

/// Monetary amount backed by `rust_decimal::Decimal`.
///
/// Equality, hashing and ordering are by numeric value, so `10.0` and `10.00`
/// are the same amount. No operation goes through floating point. All
/// operations return a new value; `Money` is never mutated in place.
///
/// Negative amounts are legal here. Whether a negative total is acceptable is
/// decided by the ledgers, not by this type.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl ValueObject for Money {}

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn zero() -> Self {
        Self::ZERO
    }

    /// Amount in minor units (e.g. cents) with the given scale.
    pub fn from_minor(minor: i64, scale: u32) -> Self {
        Self(Decimal::new(minor, scale))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn add(self, other: Money) -> Money {
        Money(self.0 + other.0)
    }

    /// `None` when the sum does not fit in a `Decimal`.
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn subtract(self, other: Money) -> Money {
        Money(self.0 - other.0)
    }

    pub fn multiply(self, factor: Decimal) -> Money {
        Money(self.0 * factor)
    }

    pub fn compare(self, other: Money) -> Ordering {
        self.0.cmp(&other.0)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// `self` if non-negative, zero otherwise.
    pub fn floor_at_zero(self) -> Money {
        if self.is_negative() { Money::ZERO } else { self }
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl FromStr for Money {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .map(Money)
            .map_err(|e| DomainError::invalid_adjustment(format!("malformed amount {s:?}: {e}")))
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money::add(self, rhs)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money::subtract(self, rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + *m)
    }
}
