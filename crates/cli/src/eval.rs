// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::run::read_operand;
use anyhow::{bail, Result};
use polyterm_config::PolytermConfig;
use polyterm_polynomial::TermPool;
use tracing::info;

pub fn execute(config: &PolytermConfig, terms: &str, x: Option<f64>) -> Result<()> {
    println!("{}", evaluate(config, terms, x)?);
    Ok(())
}

pub fn evaluate(config: &PolytermConfig, terms: &str, x: Option<f64>) -> Result<f64> {
    let pool = TermPool::shared(config.pool.clone());
    let mut tokens = terms.split_whitespace();
    let poly = read_operand(config, &pool, &mut tokens, 1)?;
    if let Some(token) = tokens.next() {
        bail!("Trailing input after polynomial: '{token}'");
    }

    let x = x.unwrap_or(config.evaluate_at);
    info!(terms = poly.len(), degree = ?poly.degree(), x, "evaluating polynomial");
    Ok(poly.evaluate(x))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate() -> Result<()> {
        let config = PolytermConfig::default();

        assert_eq!(evaluate(&config, "3 3 2 2 1 1 0", None)?, 17.0);
        assert_eq!(evaluate(&config, "3 3 2 2 1 1 0", Some(0.5))?, 2.75);
        assert_eq!(evaluate(&config, "0", Some(10.0))?, 0.0);
        assert_eq!(evaluate(&config, "1 -4 3", Some(-2.0))?, 32.0);
        Ok(())
    }

    #[test]
    fn test_evaluate_rejects_bad_input() {
        let config = PolytermConfig::default();

        assert!(evaluate(&config, "", None).is_err());
        assert!(evaluate(&config, "2 1 1", None).is_err());
        assert!(evaluate(&config, "1 1 1 extra", None).is_err());
    }
}
