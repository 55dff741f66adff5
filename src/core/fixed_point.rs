//! Two-digit fixed-point magnitudes
//!
//! Damage arrives as decimal magnitudes with two fractional digits. Keeping
//! them as scaled integers makes multiplier-then-ceiling exact: 0.5 × 3.01 is
//! 1.505 and always rounds up to 2, never to 1 because of float drift.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// Hundredths per unit
const SCALE: i64 = 100;

/// Decimal value stored as hundredths
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fixed2(i64);

impl Fixed2 {
    pub const ZERO: Fixed2 = Fixed2(0);

    pub const fn from_int(value: i64) -> Self {
        Self(value.saturating_mul(SCALE))
    }

    pub const fn from_hundredths(raw: i64) -> Self {
        Self(raw)
    }

    /// Nearest representable value
    pub fn from_f32(value: f32) -> Self {
        Self((value as f64 * SCALE as f64).round() as i64)
    }

    pub fn raw(&self) -> i64 {
        self.0
    }

    pub fn to_f32(&self) -> f32 {
        self.0 as f32 / SCALE as f32
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// `ceil(self × num / den)` computed without leaving integers
    ///
    /// Widened to i128 so any stored magnitude scales without overflow; the
    /// result saturates at the i64 range.
    pub fn scaled_ceil(&self, num: i64, den: i64) -> i64 {
        debug_assert!(den > 0, "scale denominator must be positive");
        let numerator = self.0 as i128 * num as i128;
        let denominator = den as i128 * SCALE as i128;
        let ceil = -((-numerator).div_euclid(denominator));
        ceil.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }
}

impl Add for Fixed2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Fixed2 {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Fixed2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl std::iter::Sum for Fixed2 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Fixed2::ZERO, |acc, v| acc + v)
    }
}

impl fmt::Display for Fixed2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{}{}.{:02}", sign, abs / SCALE, abs % SCALE)
    }
}
