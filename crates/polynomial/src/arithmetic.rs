// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Polynomial arithmetic.
//!
//! Results are always fresh polynomials allocated in the left operand's pool;
//! operands are never modified. A right operand living in another pool is
//! copied into the left operand's pool first.

use crate::errors::PolynomialError;
use crate::polynomial::{append_node, Polynomial};
use crate::term::Term;
use num_traits::{One, Zero};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::ops::{Add, Mul, Neg, Sub};
use tracing::trace;

/// How equal-exponent pairs and right-only terms are combined during a merge.
#[derive(Clone, Copy, Debug)]
enum Merge {
    Sum,
    Difference,
}

impl Merge {
    fn both(self, left: Term, right: Term) -> Result<i64, PolynomialError> {
        match self {
            Merge::Sum => left.coefficient.checked_add(right.coefficient),
            Merge::Difference => left.coefficient.checked_sub(right.coefficient),
        }
        .ok_or_else(|| PolynomialError::overflow(format!("{self:?} of {left} and {right}")))
    }

    fn right(self, right: Term) -> Result<Term, PolynomialError> {
        match self {
            Merge::Sum => Ok(right),
            Merge::Difference => negate(right),
        }
    }
}

fn negate(term: Term) -> Result<Term, PolynomialError> {
    let coefficient = term
        .coefficient
        .checked_neg()
        .ok_or_else(|| PolynomialError::overflow(format!("negating {term}")))?;
    Ok(Term::new(coefficient, term.exponent))
}

impl Polynomial {
    /// Adds two polynomials.
    ///
    /// Walks both descending chains once. Equal exponents produce one summed
    /// term (kept even if it sums to zero); otherwise the larger exponent is
    /// emitted unchanged.
    ///
    /// # Errors
    ///
    /// Returns `PolynomialError::Overflow` if a coefficient sum overflows.
    pub fn checked_add(&self, other: &Self) -> Result<Self, PolynomialError> {
        self.merge(other, Merge::Sum)
    }

    /// Subtracts `other` from `self`.
    ///
    /// Same walk as [`checked_add`](Self::checked_add) with right-hand
    /// coefficients negated.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, PolynomialError> {
        self.merge(other, Merge::Difference)
    }

    /// Multiplies two polynomials.
    ///
    /// Every pair of terms contributes `(c1 * c2, e1 + e2)`. Contributions are
    /// accumulated per exponent in a hash map and the entries are then
    /// inserted into the result, which restores descending order.
    ///
    /// # Errors
    ///
    /// Returns `PolynomialError::Overflow` if an exponent sum overflows `u32`
    /// or a coefficient product or accumulated sum overflows `i64`.
    pub fn checked_mul(&self, other: &Self) -> Result<Self, PolynomialError> {
        let other = self.local(other);

        let mut products: HashMap<u32, i64> = HashMap::new();
        for left in self.iter() {
            for right in other.iter() {
                let exponent = left.exponent.checked_add(right.exponent).ok_or_else(|| {
                    PolynomialError::overflow(format!("exponent of {left} * {right}"))
                })?;
                let coefficient = left
                    .coefficient
                    .checked_mul(right.coefficient)
                    .ok_or_else(|| {
                        PolynomialError::overflow(format!("coefficient of {left} * {right}"))
                    })?;
                let sum = products.entry(exponent).or_insert(0);
                *sum = sum.checked_add(coefficient).ok_or_else(|| {
                    PolynomialError::overflow(format!("accumulating x^{exponent}"))
                })?;
            }
        }

        trace!(
            left = self.len(),
            right = other.len(),
            exponents = products.len(),
            "Accumulated product terms"
        );

        let mut result = Polynomial::new_in(self.pool());
        result.extend(
            products
                .into_iter()
                .map(|(exponent, coefficient)| Term::new(coefficient, exponent)),
        );
        Ok(result)
    }

    /// Negates every coefficient.
    pub fn checked_neg(&self) -> Result<Self, PolynomialError> {
        self.map_terms(negate)
    }

    /// Multiplies every coefficient by `factor`.
    pub fn checked_scale(&self, factor: i64) -> Result<Self, PolynomialError> {
        self.map_terms(|term| {
            let coefficient = term.coefficient.checked_mul(factor).ok_or_else(|| {
                PolynomialError::overflow(format!("scaling {term} by {factor}"))
            })?;
            Ok(Term::new(coefficient, term.exponent))
        })
    }

    /// Multiplies every coefficient by `factor`.
    ///
    /// # Panics
    ///
    /// Panics if a coefficient overflows.
    pub fn scale(&self, factor: i64) -> Self {
        self.checked_scale(factor).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Borrows `other` if it shares our pool, otherwise copies it over.
    fn local<'a>(&self, other: &'a Self) -> Cow<'a, Self> {
        if self.shares_pool(other) {
            Cow::Borrowed(other)
        } else {
            Cow::Owned(other.clone_into_pool(self.pool()))
        }
    }

    fn merge(&self, other: &Self, op: Merge) -> Result<Self, PolynomialError> {
        let other = self.local(other);
        let mut result = Polynomial::new_in(self.pool());

        let len = {
            let mut pool = self.pool.borrow_mut();
            let (lhs, rhs, out) = (self.head, other.head, result.head);
            let mut p1 = pool.link(lhs);
            let mut p2 = pool.link(rhs);
            let mut tail = out;
            let mut len = 0;

            while p1 != lhs && p2 != rhs {
                let (a, b) = (pool.term(p1), pool.term(p2));
                let term = match a.exponent.cmp(&b.exponent) {
                    Ordering::Equal => {
                        p1 = pool.link(p1);
                        p2 = pool.link(p2);
                        Term::new(op.both(a, b)?, a.exponent)
                    }
                    Ordering::Greater => {
                        p1 = pool.link(p1);
                        a
                    }
                    Ordering::Less => {
                        p2 = pool.link(p2);
                        op.right(b)?
                    }
                };
                tail = append_node(&mut pool, out, tail, term);
                len += 1;
            }

            while p1 != lhs {
                let term = pool.term(p1);
                p1 = pool.link(p1);
                tail = append_node(&mut pool, out, tail, term);
                len += 1;
            }

            while p2 != rhs {
                let term = op.right(pool.term(p2))?;
                p2 = pool.link(p2);
                tail = append_node(&mut pool, out, tail, term);
                len += 1;
            }

            len
        };

        result.len = len;
        Ok(result)
    }

    fn map_terms<F>(&self, mut f: F) -> Result<Self, PolynomialError>
    where
        F: FnMut(Term) -> Result<Term, PolynomialError>,
    {
        let mut result = Polynomial::new_in(self.pool());
        {
            let mut pool = self.pool.borrow_mut();
            let mut cursor = pool.link(self.head);
            let mut tail = result.head;
            while cursor != self.head {
                let term = f(pool.term(cursor))?;
                cursor = pool.link(cursor);
                tail = append_node(&mut pool, result.head, tail, term);
            }
        }
        result.len = self.len();
        Ok(result)
    }
}

impl Add for &Polynomial {
    type Output = Polynomial;

    /// # Panics
    ///
    /// Panics on coefficient overflow, like primitive integer addition.
    fn add(self, rhs: &Polynomial) -> Polynomial {
        self.checked_add(rhs).unwrap_or_else(|err| panic!("{err}"))
    }
}

impl Add for Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: Polynomial) -> Polynomial {
        &self + &rhs
    }
}

impl Sub for &Polynomial {
    type Output = Polynomial;

    /// # Panics
    ///
    /// Panics on coefficient overflow.
    fn sub(self, rhs: &Polynomial) -> Polynomial {
        self.checked_sub(rhs).unwrap_or_else(|err| panic!("{err}"))
    }
}

impl Sub for Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: Polynomial) -> Polynomial {
        &self - &rhs
    }
}

impl Mul for &Polynomial {
    type Output = Polynomial;

    /// # Panics
    ///
    /// Panics on coefficient or exponent overflow.
    fn mul(self, rhs: &Polynomial) -> Polynomial {
        self.checked_mul(rhs).unwrap_or_else(|err| panic!("{err}"))
    }
}

impl Mul for Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: Polynomial) -> Polynomial {
        &self * &rhs
    }
}

impl Neg for &Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        self.checked_neg().unwrap_or_else(|err| panic!("{err}"))
    }
}

impl Neg for Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        -&self
    }
}

impl Zero for Polynomial {
    fn zero() -> Self {
        Polynomial::new()
    }

    /// True when every stored coefficient is zero.
    fn is_zero(&self) -> bool {
        self.iter().all(|term| term.is_zero())
    }
}

impl One for Polynomial {
    fn one() -> Self {
        Polynomial::from_terms([Term::new(1, 0)])
    }
}
