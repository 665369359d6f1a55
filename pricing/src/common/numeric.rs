use rust_decimal::Decimal;
use std::ops::Sub;

/// Value types a payoff can be evaluated in: exact decimals at the API boundary and
/// `f64` inside the trial loop.
pub trait PayoffValue: Copy + PartialOrd + Sub<Output = Self> {
    fn zero() -> Self;

    #[inline]
    fn floor_at_zero(self) -> Self {
        if self > Self::zero() {
            self
        } else {
            Self::zero()
        }
    }
}

#[macro_export]
macro_rules! impl_payoff_value {
    ($impl_type:ty, $zero:expr) => {
        impl $crate::common::numeric::PayoffValue for $impl_type {
            #[inline]
            fn zero() -> Self {
                $zero
            }
        }
    };
}

impl_payoff_value! { f64, 0.0 }
impl_payoff_value! { Decimal, Decimal::ZERO }
