//! Money value object.
//!
//! Single-currency amounts backed by `rust_decimal::Decimal`. Arithmetic is
//! exact; rounding to currency precision happens only where a caller asks
//! for it (`rounded`), so intermediate figures such as a yield-normalized
//! unit cost keep their full precision.

use core::iter::Sum;
use core::ops::{Add, AddAssign, Div, Mul, Sub};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// Decimal places of the currency (cents).
pub const CURRENCY_DP: u32 = 2;

/// A single-currency monetary amount.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Round to currency precision, midpoint away from zero.
    pub fn rounded(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

impl ValueObject for Money {}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
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
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

/// Scale by a quantity (e.g. `unit_cost * quantity`).
impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, rhs: Decimal) -> Money {
        Money(self.0 * rhs)
    }
}

/// Divide by a quantity (e.g. total cost per yield unit).
///
/// Panics on a zero divisor, like `Decimal` itself; callers validate
/// divisors before dividing.
impl Div<Decimal> for Money {
    type Output = Money;

    fn div(self, rhs: Decimal) -> Money {
        Money(self.0 / rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}
