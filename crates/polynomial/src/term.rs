// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! A single `coefficient · x^exponent` monomial.

use crate::errors::PolynomialError;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One term of a sparse polynomial.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Term {
    pub coefficient: i64,
    pub exponent: u32,
}

impl Term {
    pub const fn new(coefficient: i64, exponent: u32) -> Self {
        Self {
            coefficient,
            exponent,
        }
    }

    /// Validates a raw `(coefficient, exponent)` pair read from input.
    ///
    /// # Arguments
    ///
    /// * `index` - Position of the pair in the input, reported on failure.
    /// * `coefficient` - The coefficient.
    /// * `exponent` - The signed exponent as supplied by the caller.
    ///
    /// # Errors
    ///
    /// Returns `PolynomialError::InvalidTerm` if the exponent is negative or
    /// does not fit in a `u32`.
    pub fn from_raw(index: usize, coefficient: i64, exponent: i64) -> Result<Self, PolynomialError> {
        if exponent < 0 {
            return Err(PolynomialError::InvalidTerm {
                index,
                message: format!("exponent {exponent} is negative"),
            });
        }
        let exponent = u32::try_from(exponent).map_err(|_| PolynomialError::InvalidTerm {
            index,
            message: format!("exponent {exponent} exceeds {}", u32::MAX),
        })?;
        Ok(Self::new(coefficient, exponent))
    }

    pub fn is_zero(&self) -> bool {
        self.coefficient == 0
    }

    /// Evaluates this term at `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        self.coefficient as f64 * powu(x, self.exponent)
    }
}

impl From<(i64, u32)> for Term {
    fn from((coefficient, exponent): (i64, u32)) -> Self {
        Self::new(coefficient, exponent)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x^{}", self.coefficient, self.exponent)
    }
}

/// Raises `base` to a non-negative integer power by repeated squaring.
pub(crate) fn powu(mut base: f64, mut exp: u32) -> f64 {
    let mut acc = 1.0;
    while exp > 0 {
        if exp & 1 == 1 {
            acc *= base;
        }
        base *= base;
        exp >>= 1;
    }
    acc
}
