//! Overflow-checked arithmetic over unsigned magnitudes.
//!
//! A [`Checked`] value either holds a number or records that some earlier step
//! overflowed, underflowed or divided by zero. Once invalid it stays invalid,
//! so a whole expression can be written with ordinary operators and inspected
//! once at the end.

use std::ops::{Add, Div, Mul, Sub};

use crate::error::ValidationError;

/// Unsigned integer types that [`Checked`] can wrap.
pub trait CheckedInt: Copy + PartialOrd + std::fmt::Debug {
    const ZERO: Self;
    const ONE: Self;

    fn checked_add(self, rhs: Self) -> Option<Self>;
    fn checked_sub(self, rhs: Self) -> Option<Self>;
    fn checked_mul(self, rhs: Self) -> Option<Self>;
    fn checked_div(self, rhs: Self) -> Option<Self>;
}

macro_rules! impl_checked_int {
    ($($t:ty),*) => {
        $(
            impl CheckedInt for $t {
                const ZERO: Self = 0;
                const ONE: Self = 1;

                #[inline]
                fn checked_add(self, rhs: Self) -> Option<Self> {
                    <$t>::checked_add(self, rhs)
                }

                #[inline]
                fn checked_sub(self, rhs: Self) -> Option<Self> {
                    <$t>::checked_sub(self, rhs)
                }

                #[inline]
                fn checked_mul(self, rhs: Self) -> Option<Self> {
                    <$t>::checked_mul(self, rhs)
                }

                #[inline]
                fn checked_div(self, rhs: Self) -> Option<Self> {
                    <$t>::checked_div(self, rhs)
                }
            }
        )*
    };
}

impl_checked_int!(u32, u64, usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checked<T>(Option<T>);

impl<T: CheckedInt> Checked<T> {
    pub fn new(value: T) -> Self {
        Checked(Some(value))
    }

    pub fn invalid() -> Self {
        Checked(None)
    }

    pub fn value(self) -> Option<T> {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0.is_some()
    }

    /// Division rounding toward positive infinity.
    pub fn div_ceil(self, rhs: impl Into<Checked<T>>) -> Self {
        let rhs = rhs.into();
        let (Some(lhs), Some(rhs)) = (self.0, rhs.0) else {
            return Checked::invalid();
        };
        if rhs == T::ZERO {
            return Checked::invalid();
        }
        // lhs / rhs + (lhs % rhs != 0), without computing lhs + rhs - 1.
        let quotient = Checked(lhs.checked_div(rhs));
        let remainder = Checked::new(lhs) - quotient * rhs;
        match remainder.0 {
            Some(r) if r > T::ZERO => quotient + T::ONE,
            Some(_) => quotient,
            None => Checked::invalid(),
        }
    }

    /// Converts into another magnitude, failing if the value does not fit.
    pub fn cast<U>(self) -> Checked<U>
    where
        U: CheckedInt + TryFrom<T>,
    {
        Checked(self.0.and_then(|v| U::try_from(v).ok()))
    }

    /// Unwraps the value or reports an arithmetic overflow naming `context`.
    pub fn ok_or_overflow(self, context: impl FnOnce() -> String) -> Result<T, ValidationError> {
        self.0.ok_or_else(|| ValidationError::overflow(context()))
    }
}

impl<T: CheckedInt> From<T> for Checked<T> {
    fn from(value: T) -> Self {
        Checked::new(value)
    }
}

macro_rules! impl_checked_op {
    ($trait:ident, $method:ident, $op:ident) => {
        impl<T: CheckedInt> $trait<Checked<T>> for Checked<T> {
            type Output = Checked<T>;

            #[inline]
            fn $method(self, rhs: Checked<T>) -> Checked<T> {
                match (self.0, rhs.0) {
                    (Some(lhs), Some(rhs)) => Checked(lhs.$op(rhs)),
                    _ => Checked::invalid(),
                }
            }
        }

        impl<T: CheckedInt> $trait<T> for Checked<T> {
            type Output = Checked<T>;

            #[inline]
            fn $method(self, rhs: T) -> Checked<T> {
                self.$method(Checked::new(rhs))
            }
        }
    };
}

impl_checked_op!(Add, add, checked_add);
impl_checked_op!(Sub, sub, checked_sub);
impl_checked_op!(Mul, mul, checked_mul);
impl_checked_op!(Div, div, checked_div);

/// Product of `dims` as a 64-bit magnitude. An empty list yields 1.
pub fn checked_product(dims: &[u32]) -> Checked<u64> {
    dims.iter()
        .fold(Checked::new(1u64), |acc, &dim| acc * u64::from(dim))
}

/// Sum of `values` as a 32-bit magnitude.
pub fn checked_sum(values: impl IntoIterator<Item = u32>) -> Checked<u32> {
    values
        .into_iter()
        .fold(Checked::new(0u32), |acc, value| acc + value)
}
