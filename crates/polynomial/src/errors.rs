// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Error types for polynomial operations.

use thiserror::Error;

/// Errors that can occur while reading or combining polynomials.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PolynomialError {
    /// The input did not contain a term count.
    #[error("Input is empty: expected a term count")]
    MissingCount,

    /// The term count token is not a non-negative integer.
    #[error("Invalid term count '{token}'")]
    InvalidCount { token: String },

    /// A coefficient or exponent could not be accepted.
    #[error("Invalid term at position {index}: {message}")]
    InvalidTerm { index: usize, message: String },

    /// The input ended before every declared term was read.
    #[error("Unexpected end of input: expected {expected} terms, found {found}")]
    UnexpectedEnd { expected: usize, found: usize },

    /// Tokens were left over after the declared terms.
    #[error("Trailing input after last term: '{token}'")]
    TrailingInput { token: String },

    /// Coefficient or exponent arithmetic overflowed
    #[error("Arithmetic overflow: {message}")]
    Overflow { message: String },
}

impl PolynomialError {
    pub(crate) fn overflow(message: impl Into<String>) -> Self {
        PolynomialError::Overflow {
            message: message.into(),
        }
    }
}
