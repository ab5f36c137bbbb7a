// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! # Sparse Polynomial Library
//!
//! Univariate polynomials with `i64` coefficients stored as sparse term lists.
//!
//! ## Features
//!
//! - Terms kept in descending exponent order inside a circular chain with a
//!   sentinel node.
//! - A pooled node arena ([`TermPool`]) with an intrusive free list, shared by
//!   every polynomial of a thread so node storage is recycled instead of
//!   reallocated.
//! - Merge-based addition and subtraction, hash-aggregated multiplication,
//!   and floating-point evaluation.
//! - Checked variants of every operation that report overflow instead of
//!   panicking.
//! - Serialization: optional serde support (polynomials serialize as their
//!   term sequence) with bincode integration.
//!
//! ## Example
//!
//! ```
//! use polyterm_polynomial::Polynomial;
//!
//! let a: Polynomial = "3 3 2 2 1 1 0".parse().unwrap();
//! let b: Polynomial = "2 1 2 4 0".parse().unwrap();
//!
//! assert_eq!((&a + &b).to_string(), "4x^2 2x^1 5x^0");
//! assert_eq!(a.evaluate(2.0), 17.0);
//! ```

mod arithmetic;
pub mod errors;
pub mod polynomial;
pub mod pool;
pub mod term;

pub use errors::PolynomialError;
pub use polynomial::{Polynomial, Terms};
pub use pool::{
    default_pool, NodeId, PoolConfig, PoolStats, SharedPool, TermPool, MAX_INITIAL_CAPACITY,
};
pub use term::Term;
