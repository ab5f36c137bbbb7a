// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{bail, Context, Result};
use polyterm_config::PolytermConfig;
use polyterm_polynomial::{Polynomial, SharedPool, TermPool};
use std::fmt::Write;
use std::io::{self, Read};
use tracing::debug;

pub fn execute(config: &PolytermConfig, x: Option<f64>) -> Result<()> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("Could not read polynomials from stdin")?;

    print!("{}", render(config, &input, x)?);
    Ok(())
}

/// Read two polynomials from `input` and format the report printed by `run`.
pub fn render(config: &PolytermConfig, input: &str, x: Option<f64>) -> Result<String> {
    let pool = TermPool::shared(config.pool.clone());
    let mut tokens = input.split_whitespace();

    let p1 = read_operand(config, &pool, &mut tokens, 1)?;
    let p2 = read_operand(config, &pool, &mut tokens, 2)?;
    if let Some(token) = tokens.next() {
        bail!("Trailing input after polynomial 2: '{token}'");
    }

    let sum = p1.checked_add(&p2).context("Could not add polynomials")?;
    let difference = p1.checked_sub(&p2).context("Could not subtract polynomials")?;
    let product = p1.checked_mul(&p2).context("Could not multiply polynomials")?;
    let x = x.unwrap_or(config.evaluate_at);

    let mut out = String::new();
    writeln!(out, "Polynomial 1: {}", shown(config, &p1))?;
    writeln!(out, "Polynomial 2: {}", shown(config, &p2))?;
    writeln!(out, "P1 + P2: {}", shown(config, &sum))?;
    writeln!(out, "P1 - P2: {}", shown(config, &difference))?;
    writeln!(out, "P1 * P2: {}", shown(config, &product))?;
    writeln!(out, "P1({x}) = {}", p1.evaluate(x))?;

    let pool = pool.borrow();
    debug!(
        in_use = pool.in_use(),
        capacity = pool.capacity(),
        stats = ?pool.stats(),
        "term pool after run"
    );

    Ok(out)
}

pub(crate) fn read_operand<'a, I>(
    config: &PolytermConfig,
    pool: &SharedPool,
    tokens: &mut I,
    position: usize,
) -> Result<Polynomial>
where
    I: Iterator<Item = &'a str>,
{
    let mut poly = Polynomial::read_in(pool, tokens)
        .with_context(|| format!("Could not read polynomial {position}"))?;

    if config.merge_duplicates {
        poly.combine_like_terms()
            .with_context(|| format!("Could not merge terms of polynomial {position}"))?;
    }
    Ok(poly)
}

/// Formats `poly` for the report, writing `0` for an empty result.
fn shown(config: &PolytermConfig, poly: &Polynomial) -> String {
    let mut shown = poly.clone();
    if config.prune_zeros {
        shown.prune_zeros();
    }
    if shown.is_empty() {
        return "0".to_string();
    }
    shown.to_string()
}
