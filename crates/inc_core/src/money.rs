//! Whole-currency money and integer-first percentage helpers.
//!
//! Amounts carry no minor units. Percentage scaling is computed on the exact
//! rational `amount * pct / 100` and rounded once, half away from zero.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};

/// Ceiling for any configured per-unit amount (slab incentive, category bonus).
/// With the kicker rate capped at 300 %, one sale earns at most four times this,
/// so totals over `u32::MAX` sales stay far inside `i64`.
pub const MAX_UNIT_AMOUNT: i64 = 10_000_000;

/// Whole-currency amount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    #[inline]
    pub const fn new(v: i64) -> Self {
        Money(v)
    }

    #[inline]
    pub const fn get(self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// `self × units`.
    #[inline]
    pub fn times(self, units: u32) -> Money {
        Money(self.0 * i64::from(units))
    }

    /// `self × pct / 100`, rounded half away from zero.
    #[inline]
    pub fn scale_pct(self, pct: u32) -> Money {
        Money(scale_pct_half_up(self.0, pct))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Money;
    #[inline]
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;
    #[inline]
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |a, b| a + b)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |a, b| a + *b)
    }
}

impl From<i64> for Money {
    #[inline]
    fn from(v: i64) -> Self {
        Money(v)
    }
}

/// `base × pct / 100` in i128, rounded half away from zero.
pub fn scale_pct_half_up(base: i64, pct: u32) -> i64 {
    let num = i128::from(base) * i128::from(pct);
    let q = num / 100;
    let r = num % 100;
    let rounded = if r.abs() * 2 >= 100 {
        if num < 0 { q - 1 } else { q + 1 }
    } else {
        q
    };
    // The product of an i64 and a small percentage fits back unless the inputs are absurd.
    i64::try_from(rounded).unwrap_or(if rounded < 0 { i64::MIN } else { i64::MAX })
}

/// Render a tenths-of-a-percent value as one-decimal text, e.g. `295` → `"29.5%"`.
pub fn percent_tenths_string(tenths: u16) -> String {
    format!("{}.{}%", tenths / 10, tenths % 10)
}
