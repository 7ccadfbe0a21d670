use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const VND_CURRENCY_CODE: &str = "VND";
pub const VND_CURRENCY_CODE_LOWER: &str = "vnd";

//--------------------------------------        Vnd        -----------------------------------------------------------
/// An amount of Vietnamese đồng.
///
/// The đồng has no minor currency unit in circulation, so the wrapped value is a whole number of đồng. This is also
/// exactly the integer the payment gateway expects, so amounts are never re-scaled when they cross the gateway
/// boundary.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Vnd(i64);

op!(binary Vnd, Add, add);
op!(binary Vnd, Sub, sub);
op!(inplace Vnd, SubAssign, sub_assign);
op!(unary Vnd, Neg, neg);

impl Mul<i64> for Vnd {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Vnd {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in đồng: {0}")]
pub struct VndConversionError(String);

impl From<i64> for Vnd {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Vnd {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Vnd {}

impl TryFrom<u64> for Vnd {
    type Error = VndConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(VndConversionError(format!("Value {} is too large to convert to Vnd", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Vnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}₫", self.0)
    }
}

impl Vnd {
    pub fn value(&self) -> i64 {
        self.0
    }
}
