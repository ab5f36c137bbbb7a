// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::path::PathBuf;

use crate::{eval, print_config, run};
use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use polyterm_config::{load_config, PolytermConfig};
use tracing::{info, instrument, Level};

#[derive(Parser, Debug)]
#[command(name = "polyterm")]
#[command(about = "Add, subtract, multiply and evaluate sparse integer polynomials", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,

    /// Indicate error levels by adding additional `-v` arguments. Eg. `polyterm -vvv` will give you
    /// trace level output
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true
    )]
    pub verbose: u8,

    /// Silence all output. This argument cannot be used alongside `-v`
    #[arg(
        short,
        long,
        action = ArgAction::SetTrue,
        conflicts_with = "verbose",
        global = true
    )]
    quiet: bool,
}

impl Cli {
    pub fn log_level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else {
            match self.verbose {
                0 => Level::WARN,  //
                1 => Level::INFO,  // -v
                2 => Level::DEBUG, // -vv
                _ => Level::TRACE, // -vvv
            }
        }
    }

    #[instrument(skip_all)]
    pub fn execute(self) -> Result<()> {
        let config = self.load_config()?;
        info!("Config loaded from: {:?}", config.config_file());

        match self.command {
            Commands::Run { x } => run::execute(&config, x)?,
            Commands::Eval { terms, x } => eval::execute(&config, &terms, x)?,
            Commands::Config => print_config::execute(&config)?,
        }

        Ok(())
    }

    pub fn load_config(&self) -> Result<PolytermConfig> {
        load_config(self.config.as_deref())
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read two polynomials from stdin and print their sum, difference,
    /// product and the value of the first one
    Run {
        /// Point at which to evaluate the first polynomial. Defaults to `evaluate_at`
        #[arg(long, allow_negative_numbers = true)]
        x: Option<f64>,
    },

    /// Evaluate a single polynomial
    Eval {
        /// Polynomial in input form: a term count followed by coefficient/exponent pairs.
        /// Eg. "3 3 2 2 1 1 0"
        #[arg(long, allow_hyphen_values = true)]
        terms: String,

        /// Point at which to evaluate. Defaults to `evaluate_at`
        #[arg(long, allow_negative_numbers = true)]
        x: Option<f64>,
    },

    /// Print the resolved configuration as YAML
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_log_level() {
        let level = |args: &[&str]| Cli::try_parse_from(args).map(|cli| cli.log_level());

        assert_eq!(level(&["polyterm", "config"]).unwrap(), Level::WARN);
        assert_eq!(level(&["polyterm", "-v", "config"]).unwrap(), Level::INFO);
        assert_eq!(level(&["polyterm", "config", "-vv"]).unwrap(), Level::DEBUG);
        assert_eq!(level(&["polyterm", "-vvvv", "run"]).unwrap(), Level::TRACE);
        assert_eq!(level(&["polyterm", "-q", "run"]).unwrap(), Level::ERROR);
        assert!(level(&["polyterm", "-q", "-v", "run"]).is_err());
    }

    #[test]
    fn test_parse_commands() {
        let cli = Cli::try_parse_from([
            "polyterm",
            "--config",
            "conf/polyterm.yaml",
            "eval",
            "--terms",
            "-1 5 0",
            "--x",
            "-2.5",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("conf/polyterm.yaml")));
        match cli.command {
            Commands::Eval { terms, x } => {
                assert_eq!(terms, "-1 5 0");
                assert_eq!(x, Some(-2.5));
            }
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::try_parse_from(["polyterm", "run"]).unwrap();
        assert!(matches!(cli.command, Commands::Run { x: None }));
    }
}
