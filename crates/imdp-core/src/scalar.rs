//! Numeric polymorphism for the Bellman kernels.
//!
//! The reference engine parameterizes its value type over any totally
//! ordered field with a working `min`/`max`; 64-bit float is the common
//! case, 32-bit float trades precision for throughput, and a rational type
//! is exercised only in tests to check exact arithmetic. [`Scalar`] captures
//! exactly the operations the kernels need and nothing more — no transcendental
//! functions, no `Ord` (floats aren't), just a total order via `partial_cmp`
//! plus field arithmetic.

use std::ops::{Add, Mul, Neg, Sub};

/// A totally ordered field element usable as a value-function entry.
pub trait Scalar:
    Copy
    + Clone
    + PartialOrd
    + PartialEq
    + std::fmt::Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + Send
    + Sync
    + 'static
{
    /// Additive identity.
    fn zero() -> Self;
    /// Multiplicative identity.
    fn one() -> Self;
    /// Lossy conversion in from a 64-bit float literal (discount factors,
    /// reward constants, convergence tolerances).
    fn from_f64(v: f64) -> Self;
    /// Lossy conversion out, used only for reporting/logging and test
    /// assertions against the literal scenarios in the test suite.
    fn to_f64(self) -> f64;

    fn min(self, other: Self) -> Self {
        if self.partial_cmp(&other).map(|o| o.is_le()).unwrap_or(false) {
            self
        } else {
            other
        }
    }

    fn max(self, other: Self) -> Self {
        if self.partial_cmp(&other).map(|o| o.is_ge()).unwrap_or(false) {
            self
        } else {
            other
        }
    }

    fn abs(self) -> Self {
        if self < Self::zero() {
            -self
        } else {
            self
        }
    }
}

macro_rules! impl_scalar_for_float {
    ($ty:ty) => {
        impl Scalar for $ty {
            fn zero() -> Self {
                0.0
            }
            fn one() -> Self {
                1.0
            }
            fn from_f64(v: f64) -> Self {
                v as $ty
            }
            fn to_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

impl_scalar_for_float!(f64);
impl_scalar_for_float!(f32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_max_on_f64() {
        assert_eq!(Scalar::min(1.0f64, 2.0f64), 1.0);
        assert_eq!(Scalar::max(1.0f64, 2.0f64), 2.0);
    }

    #[test]
    fn abs_on_negative() {
        assert_eq!(Scalar::abs(-3.5f64), 3.5);
    }

    #[test]
    fn f32_round_trips_through_f64() {
        let v: f32 = Scalar::from_f64(0.5);
        assert_eq!(Scalar::to_f64(v), 0.5);
    }
}
