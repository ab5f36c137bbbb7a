// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Sparse polynomial container.

use crate::errors::PolynomialError;
use crate::pool::{default_pool, NodeId, SharedPool, TermPool};
use crate::term::Term;
use std::fmt;
use std::iter::FusedIterator;
use std::rc::Rc;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A sparse univariate polynomial with integer coefficients.
///
/// Terms live in a circular chain of pool nodes hanging off a sentinel node,
/// kept in descending order of exponent. Terms with equal exponents inserted
/// directly are kept side by side (the newest first) and zero coefficients
/// are kept until [`combine_like_terms`](Self::combine_like_terms) or
/// [`prune_zeros`](Self::prune_zeros) is called.
///
/// A polynomial exclusively owns the nodes reachable from its sentinel and
/// hands all of them back to its pool when dropped.
pub struct Polynomial {
    pub(crate) pool: SharedPool,
    pub(crate) head: NodeId,
    pub(crate) len: usize,
}

impl Polynomial {
    /// Creates an empty polynomial in the thread's default pool.
    pub fn new() -> Self {
        Self::new_in(&default_pool())
    }

    /// Creates an empty polynomial drawing nodes from `pool`.
    pub fn new_in(pool: &SharedPool) -> Self {
        let head = {
            let mut pool = pool.borrow_mut();
            let head = pool.acquire();
            pool.set_link(head, head);
            head
        };

        Self {
            pool: Rc::clone(pool),
            head,
            len: 0,
        }
    }

    /// Builds a polynomial by inserting `terms` one after another.
    pub fn from_terms<I: IntoIterator<Item = Term>>(terms: I) -> Self {
        Self::from_terms_in(&default_pool(), terms)
    }

    pub fn from_terms_in<I: IntoIterator<Item = Term>>(pool: &SharedPool, terms: I) -> Self {
        let mut poly = Self::new_in(pool);
        poly.extend(terms);
        poly
    }

    /// Builds a polynomial from unvalidated `(coefficient, exponent)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `PolynomialError::InvalidTerm` for the first pair whose exponent
    /// is negative or too large. No node is acquired in that case.
    pub fn from_raw_terms(raw: &[(i64, i64)]) -> Result<Self, PolynomialError> {
        Self::from_raw_terms_in(&default_pool(), raw)
    }

    pub fn from_raw_terms_in(
        pool: &SharedPool,
        raw: &[(i64, i64)],
    ) -> Result<Self, PolynomialError> {
        let terms = raw
            .iter()
            .enumerate()
            .map(|(index, &(coefficient, exponent))| Term::from_raw(index, coefficient, exponent))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_terms_in(pool, terms))
    }

    /// Parses the `n c1 e1 c2 e2 ... cn en` input format.
    ///
    /// The whole string must describe exactly one polynomial.
    pub fn parse(input: &str) -> Result<Self, PolynomialError> {
        Self::parse_in(&default_pool(), input)
    }

    pub fn parse_in(pool: &SharedPool, input: &str) -> Result<Self, PolynomialError> {
        let mut tokens = input.split_whitespace();
        let poly = Self::read_in(pool, &mut tokens)?;
        match tokens.next() {
            Some(token) => Err(PolynomialError::TrailingInput {
                token: token.to_string(),
            }),
            None => Ok(poly),
        }
    }

    /// Reads one polynomial from a token stream, leaving later tokens unread.
    ///
    /// Use this when several polynomials share one input stream.
    ///
    /// # Errors
    ///
    /// * `MissingCount` if the stream is empty.
    /// * `InvalidCount` if the count is not a non-negative integer.
    /// * `InvalidTerm` for a non-numeric token or an invalid exponent.
    /// * `UnexpectedEnd` if the stream runs out before `n` pairs were read.
    pub fn read_in<'a, I>(pool: &SharedPool, tokens: &mut I) -> Result<Self, PolynomialError>
    where
        I: Iterator<Item = &'a str>,
    {
        let count_token = tokens.next().ok_or(PolynomialError::MissingCount)?;
        let count: usize = count_token
            .parse()
            .map_err(|_| PolynomialError::InvalidCount {
                token: count_token.to_string(),
            })?;

        let mut raw = Vec::with_capacity(count.min(1024));
        for index in 0..count {
            let (Some(coefficient), Some(exponent)) = (tokens.next(), tokens.next()) else {
                return Err(PolynomialError::UnexpectedEnd {
                    expected: count,
                    found: index,
                });
            };
            raw.push((
                parse_integer(index, "coefficient", coefficient)?,
                parse_integer(index, "exponent", exponent)?,
            ));
        }

        Self::from_raw_terms_in(pool, &raw)
    }

    /// The pool this polynomial draws its nodes from.
    pub fn pool(&self) -> &SharedPool {
        &self.pool
    }

    pub fn shares_pool(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.pool, &other.pool)
    }

    /// Number of stored terms, duplicates and zeros included.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Exponent of the first stored term, or `None` when empty.
    ///
    /// This is structural: a leading zero coefficient is not skipped.
    pub fn degree(&self) -> Option<u32> {
        self.leading_term().map(|term| term.exponent)
    }

    pub fn leading_term(&self) -> Option<Term> {
        self.iter().next()
    }

    /// Iterates over the terms in descending exponent order.
    pub fn iter(&self) -> Terms<'_> {
        let first = self.pool.borrow().link(self.head);
        Terms {
            poly: self,
            cursor: first,
            remaining: self.len,
        }
    }

    pub fn to_terms(&self) -> Vec<Term> {
        self.iter().collect()
    }

    /// Checks that exponents never increase along the chain.
    pub fn is_sorted_descending(&self) -> bool {
        let terms = self.to_terms();
        terms.windows(2).all(|w| w[0].exponent >= w[1].exponent)
    }

    /// Inserts `term` before the first stored term whose exponent is not
    /// greater than its own.
    ///
    /// Terms are never merged here: inserting an exponent that is already
    /// present places the new term in front of the existing one.
    pub fn insert(&mut self, term: Term) {
        let mut pool = self.pool.borrow_mut();
        let node = pool.acquire();
        pool.set_term(node, term);

        let mut prev = self.head;
        let mut current = pool.link(self.head);
        while current != self.head && pool.term(current).exponent > term.exponent {
            prev = current;
            current = pool.link(current);
        }

        pool.set_link(node, current);
        pool.set_link(prev, node);
        self.len += 1;
    }

    /// Removes the first term with the given exponent.
    pub fn remove(&mut self, exponent: u32) -> Option<Term> {
        let mut pool = self.pool.borrow_mut();
        let mut prev = self.head;
        let mut current = pool.link(self.head);

        while current != self.head {
            let term = pool.term(current);
            if term.exponent == exponent {
                let next = pool.link(current);
                pool.set_link(prev, next);
                pool.release(current);
                self.len -= 1;
                return Some(term);
            }
            if term.exponent < exponent {
                break;
            }
            prev = current;
            current = pool.link(current);
        }
        None
    }

    /// Releases every term node, keeping the polynomial usable.
    pub fn clear(&mut self) {
        let mut pool = self.pool.borrow_mut();
        release_chain(&mut pool, self.head);
        pool.set_link(self.head, self.head);
        self.len = 0;
    }

    /// Drops every term whose coefficient is zero.
    pub fn prune_zeros(&mut self) {
        let mut pool = self.pool.borrow_mut();
        let mut prev = self.head;
        let mut current = pool.link(self.head);

        while current != self.head {
            let next = pool.link(current);
            if pool.term(current).is_zero() {
                pool.set_link(prev, next);
                pool.release(current);
                self.len -= 1;
            } else {
                prev = current;
            }
            current = next;
        }
    }

    /// Folds runs of equal exponents into a single term.
    ///
    /// Absorbed nodes go back to the pool. Zero sums are kept.
    ///
    /// # Errors
    ///
    /// Returns `PolynomialError::Overflow` if a sum overflows. Runs folded
    /// before the overflow stay folded; the chain remains sorted.
    pub fn combine_like_terms(&mut self) -> Result<(), PolynomialError> {
        let mut pool = self.pool.borrow_mut();
        let mut current = pool.link(self.head);

        while current != self.head {
            let next = pool.link(current);
            if next == self.head {
                break;
            }

            let (kept, absorbed) = (pool.term(current), pool.term(next));
            if kept.exponent != absorbed.exponent {
                current = next;
                continue;
            }

            let coefficient = kept
                .coefficient
                .checked_add(absorbed.coefficient)
                .ok_or_else(|| {
                    PolynomialError::overflow(format!(
                        "combining {kept} and {absorbed}"
                    ))
                })?;
            pool.set_term(current, Term::new(coefficient, kept.exponent));
            let after = pool.link(next);
            pool.set_link(current, after);
            pool.release(next);
            self.len -= 1;
        }
        Ok(())
    }

    /// Makes `self` an exact copy of `source`, keeping `self`'s pool.
    ///
    /// Existing nodes are overwritten in order. Extra nodes are acquired or
    /// surplus ones released as needed.
    pub fn assign(&mut self, source: &Polynomial) {
        if self.shares_pool(source) {
            let mut pool = self.pool.borrow_mut();
            let mut cursor = pool.link(source.head);
            let stop = source.head;
            overwrite_chain(&mut pool, self.head, |pool| {
                if cursor == stop {
                    return None;
                }
                let node = *pool.node(cursor);
                cursor = node.link;
                Some(node.term)
            });
        } else {
            let mut terms = source.iter();
            let mut pool = self.pool.borrow_mut();
            overwrite_chain(&mut pool, self.head, |_| terms.next());
        }
        self.len = source.len;
    }

    /// Deep copies this polynomial into another pool.
    pub fn clone_into_pool(&self, pool: &SharedPool) -> Self {
        let mut copy = Self::new_in(pool);
        copy.assign(self);
        copy
    }

    /// Evaluates the polynomial at `x`.
    ///
    /// Integer powers are computed by repeated squaring. The empty polynomial
    /// evaluates to zero.
    pub fn evaluate(&self, x: f64) -> f64 {
        self.iter().map(|term| term.evaluate(x)).sum()
    }

    /// Appends terms that are already in non-increasing exponent order.
    #[cfg(feature = "serde")]
    fn from_ordered_terms_in(pool: &SharedPool, terms: &[Term]) -> Self {
        let mut poly = Self::new_in(pool);
        {
            let mut pool = poly.pool.borrow_mut();
            let mut tail = poly.head;
            for term in terms {
                tail = append_node(&mut pool, poly.head, tail, *term);
            }
        }
        poly.len = terms.len();
        poly
    }
}

/// Links a fresh node carrying `term` after `tail` and closes the circle.
pub(crate) fn append_node(pool: &mut TermPool, head: NodeId, tail: NodeId, term: Term) -> NodeId {
    let node = pool.acquire();
    pool.set_term(node, term);
    pool.set_link(node, head);
    pool.set_link(tail, node);
    node
}

fn release_chain(pool: &mut TermPool, head: NodeId) {
    let mut current = pool.link(head);
    while current != head {
        let next = pool.link(current);
        pool.release(current);
        current = next;
    }
}

/// Rewrites the chain under `head` with the terms produced by `next_term`.
fn overwrite_chain<F>(pool: &mut TermPool, head: NodeId, mut next_term: F)
where
    F: FnMut(&TermPool) -> Option<Term>,
{
    let mut prev = head;
    let mut current = pool.link(head);

    while let Some(term) = next_term(&*pool) {
        if current == head {
            prev = append_node(pool, head, prev, term);
        } else {
            pool.set_term(current, term);
            prev = current;
            current = pool.link(current);
        }
    }

    pool.set_link(prev, head);
    while current != head {
        let next = pool.link(current);
        pool.release(current);
        current = next;
    }
}

fn parse_integer(index: usize, what: &str, token: &str) -> Result<i64, PolynomialError> {
    token.parse().map_err(|_| PolynomialError::InvalidTerm {
        index,
        message: format!("{what} '{token}' is not an integer"),
    })
}

impl Default for Polynomial {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Polynomial {
    fn clone(&self) -> Self {
        self.clone_into_pool(&self.pool)
    }

    fn clone_from(&mut self, source: &Self) {
        self.assign(source);
    }
}

impl Drop for Polynomial {
    /// # Panics
    ///
    /// Panics if the pool is borrowed elsewhere, since the nodes could not be
    /// returned to it. While already unwinding the nodes are left in the
    /// arena instead.
    fn drop(&mut self) {
        let mut pool = match self.pool.try_borrow_mut() {
            Ok(pool) => pool,
            Err(_) if std::thread::panicking() => return,
            Err(_) => panic!("Term pool is borrowed while dropping a polynomial"),
        };
        release_chain(&mut pool, self.head);
        pool.release(self.head);
    }
}

impl PartialEq for Polynomial {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl Eq for Polynomial {}

impl fmt::Debug for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl fmt::Display for Polynomial {
    /// Terms joined by single spaces. The empty polynomial writes nothing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{term}")?;
        }
        Ok(())
    }
}

impl FromStr for Polynomial {
    type Err = PolynomialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Extend<Term> for Polynomial {
    fn extend<I: IntoIterator<Item = Term>>(&mut self, iter: I) {
        // One borrow per insert: `iter` may itself read from this pool.
        for term in iter {
            self.insert(term);
        }
    }
}

impl FromIterator<Term> for Polynomial {
    fn from_iter<I: IntoIterator<Item = Term>>(iter: I) -> Self {
        Self::from_terms(iter)
    }
}

impl<'a> IntoIterator for &'a Polynomial {
    type Item = Term;
    type IntoIter = Terms<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a polynomial's terms, highest exponent first.
///
/// The pool is borrowed only for the duration of each step.
pub struct Terms<'a> {
    poly: &'a Polynomial,
    cursor: NodeId,
    remaining: usize,
}

impl Iterator for Terms<'_> {
    type Item = Term;

    fn next(&mut self) -> Option<Term> {
        if self.remaining == 0 {
            return None;
        }
        let node = *self.poly.pool.borrow().node(self.cursor);
        self.cursor = node.link;
        self.remaining -= 1;
        Some(node.term)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Terms<'_> {}

impl FusedIterator for Terms<'_> {}

#[cfg(feature = "serde")]
impl Serialize for Polynomial {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Polynomial {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let terms = Vec::<Term>::deserialize(deserializer)?;
        let pool = default_pool();
        if terms.windows(2).all(|w| w[0].exponent >= w[1].exponent) {
            Ok(Self::from_ordered_terms_in(&pool, &terms))
        } else {
            Ok(Self::from_terms_in(&pool, terms))
        }
    }
}
