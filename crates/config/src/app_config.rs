// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::load_config::{find_in_parent, resolve_config_path, ResolvedPath};
use anyhow::{bail, Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use polyterm_polynomial::{PoolConfig, MAX_INITIAL_CAPACITY};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::debug;

pub const DEFAULT_CONFIG_NAME: &str = "polyterm.config.yaml";

/// Prefix for environment overrides. Nested keys are separated by `__`,
/// e.g. `POLYTERM_POOL__INITIAL_CAPACITY`.
pub const ENV_PREFIX: &str = "POLYTERM_";

/// Settings for the `polyterm` binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolytermConfig {
    /// Node pool shared by every polynomial of a session.
    pub pool: PoolConfig,
    /// Point used by `run` when `--x` is not given.
    pub evaluate_at: f64,
    /// Merge duplicate exponents of parsed input.
    pub merge_duplicates: bool,
    /// Drop zero-coefficient terms before printing.
    pub prune_zeros: bool,
    #[serde(skip)]
    config_file: Option<PathBuf>,
}

impl Default for PolytermConfig {
    fn default() -> Self {
        Self {
            pool: PoolConfig::default(),
            evaluate_at: 2.0,
            merge_duplicates: false,
            prune_zeros: false,
            config_file: None,
        }
    }
}

impl PolytermConfig {
    /// The file the configuration was read from, if any.
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Could not serialize configuration")
    }

    fn validate(&self) -> Result<()> {
        if !self.evaluate_at.is_finite() {
            bail!("evaluate_at must be a finite number, got {}", self.evaluate_at);
        }
        if self.pool.initial_capacity > MAX_INITIAL_CAPACITY {
            bail!(
                "pool.initial_capacity must not exceed {}, got {}",
                MAX_INITIAL_CAPACITY,
                self.pool.initial_capacity
            );
        }
        Ok(())
    }
}

/// Load the config at `cli_file`, or the discovered or default location if not provided.
pub fn load_config(cli_file: Option<&Path>) -> Result<PolytermConfig> {
    let default_config_dir = OsDirs::config_dir();
    let resolved = resolve_config_path(
        find_in_parent,
        &env::current_dir()?,
        default_config_dir.as_deref(),
        DEFAULT_CONFIG_NAME,
        cli_file,
    );

    load_resolved_config(resolved.as_ref())
}

/// Layer defaults, the resolved YAML file and environment overrides.
pub fn load_resolved_config(resolved: Option<&ResolvedPath>) -> Result<PolytermConfig> {
    let mut figment = Figment::from(Serialized::defaults(PolytermConfig::default()));
    let mut config_file = None;

    if let Some(resolved) = resolved {
        if resolved.required() {
            fs::metadata(&resolved.path).with_context(|| {
                format!("Configuration file not found: {}", resolved.path.display())
            })?;
        }

        if resolved.path.is_file() {
            debug!(path = %resolved.path.display(), "loading configuration file");
            figment = figment.merge(Yaml::file(&resolved.path));
            config_file = Some(resolved.path.clone());
        } else {
            debug!(path = %resolved.path.display(), "no configuration file, using defaults");
        }
    }

    let mut config: PolytermConfig = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .context("Could not parse configuration")?;

    config.validate()?;
    config.config_file = config_file;
    Ok(config)
}

pub struct OsDirs;
impl OsDirs {
    /// `None` on platforms without a config dir. See https://docs.rs/dirs.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("polyterm"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_config::ConfigSource;
    use figment::Jail;

    #[test]
    fn test_deserialization() -> Result<()> {
        let config_str = r#"
pool:
  initial_capacity: 256
  preallocate: true
evaluate_at: -0.5
prune_zeros: true
"#;
        let config: PolytermConfig = serde_yaml::from_str(config_str)?;

        assert_eq!(
            config.pool,
            PoolConfig {
                initial_capacity: 256,
                preallocate: true,
            }
        );
        assert_eq!(config.evaluate_at, -0.5);
        assert!(!config.merge_duplicates);
        assert!(config.prune_zeros);
        assert_eq!(config.config_file(), None);
        Ok(())
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let config_str = r#"
pool:
  initial_capacity: 4
  capacity: 8
"#;
        assert!(serde_yaml::from_str::<PolytermConfig>(config_str).is_err());
        assert!(serde_yaml::from_str::<PolytermConfig>("evaluate: 1.0").is_err());
    }

    #[test]
    fn test_yaml_output_reloads() -> Result<()> {
        let mut config = PolytermConfig::default();
        config.merge_duplicates = true;
        config.pool.preallocate = true;

        let yaml = config.to_yaml()?;
        assert!(yaml.contains("merge_duplicates: true"));
        assert!(!yaml.contains("config_file"));
        assert_eq!(serde_yaml::from_str::<PolytermConfig>(&yaml)?, config);
        Ok(())
    }

    #[test]
    fn test_file_not_found() -> Result<()> {
        let Err(err) = load_config(Some(Path::new("/nope/polyterm.config.yaml"))) else {
            bail!("error expected");
        };
        let Some(e) = err.downcast_ref::<std::io::Error>() else {
            bail!("io error expected");
        };

        assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
        Ok(())
    }

    #[test]
    fn test_missing_default_file_uses_defaults() {
        Jail::expect_with(|jail| {
            let resolved = ResolvedPath {
                path: jail.directory().join(DEFAULT_CONFIG_NAME),
                source: ConfigSource::Default,
            };

            let config = load_resolved_config(Some(&resolved)).map_err(|e| e.to_string())?;
            assert_eq!(config.pool, PoolConfig::default());
            assert_eq!(config.evaluate_at, 2.0);
            assert_eq!(config.config_file(), None);
            Ok(())
        });
    }

    #[test]
    fn test_defaults() {
        Jail::expect_with(|jail| {
            let home = format!("{}", jail.directory().to_string_lossy());
            jail.set_env("HOME", &home);
            jail.set_env("XDG_CONFIG_HOME", &format!("{}/.config", home));

            let config = load_config(None).map_err(|e| e.to_string())?;

            assert_eq!(config, PolytermConfig::default());
            assert_eq!(config.config_file(), None);
            Ok(())
        });
    }

    #[test]
    fn test_config() {
        Jail::expect_with(|jail| {
            let home = format!("{}", jail.directory().to_string_lossy());
            jail.set_env("HOME", &home);
            jail.set_env("XDG_CONFIG_HOME", &format!("{}/.config", home));

            let expected_config_dir =
                OsDirs::config_dir().ok_or_else(|| "no config dir".to_string())?;
            let filename = expected_config_dir.join(DEFAULT_CONFIG_NAME);
            jail.create_dir(&expected_config_dir)?;
            jail.create_file(
                filename.clone(),
                r#"
pool:
  initial_capacity: 16
evaluate_at: 3.0
"#,
            )?;

            let config = load_config(None).map_err(|e| e.to_string())?;

            assert_eq!(config.pool.initial_capacity, 16);
            assert!(!config.pool.preallocate);
            assert_eq!(config.evaluate_at, 3.0);
            assert_eq!(config.config_file(), Some(filename.as_path()));
            Ok(())
        });
    }

    #[test]
    fn test_config_discovered_from_cwd() {
        Jail::expect_with(|jail| {
            let home = format!("{}", jail.directory().to_string_lossy());
            jail.set_env("HOME", &home);
            jail.set_env("XDG_CONFIG_HOME", &format!("{}/.config", home));

            jail.create_file(DEFAULT_CONFIG_NAME, "merge_duplicates: true")?;
            jail.create_dir("nested/deeper")?;
            std::env::set_current_dir(jail.directory().join("nested/deeper"))
                .map_err(|e| e.to_string())?;

            let config = load_config(None).map_err(|e| e.to_string())?;

            assert!(config.merge_duplicates);
            let found = config
                .config_file()
                .ok_or_else(|| "config file expected".to_string())?;
            assert!(found.ends_with(DEFAULT_CONFIG_NAME));
            Ok(())
        });
    }

    #[test]
    fn test_explicit_relative_path() {
        Jail::expect_with(|jail| {
            jail.create_dir("conf")?;
            jail.create_file("conf/custom.yaml", "prune_zeros: true")?;

            let config =
                load_config(Some(Path::new("conf/custom.yaml"))).map_err(|e| e.to_string())?;

            assert!(config.prune_zeros);
            assert!(!config.merge_duplicates);
            Ok(())
        });
    }

    #[test]
    fn test_config_env_vars() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "custom.yaml",
                r#"
pool:
  initial_capacity: 16
  preallocate: true
evaluate_at: 3.0
"#,
            )?;
            jail.set_env("POLYTERM_EVALUATE_AT", "-1.5");
            jail.set_env("POLYTERM_POOL__INITIAL_CAPACITY", "8");
            jail.set_env("POLYTERM_PRUNE_ZEROS", "true");

            let config =
                load_config(Some(Path::new("custom.yaml"))).map_err(|e| e.to_string())?;

            // environment wins over the file, the file over defaults
            assert_eq!(config.evaluate_at, -1.5);
            assert_eq!(config.pool.initial_capacity, 8);
            assert!(config.pool.preallocate);
            assert!(config.prune_zeros);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("bad.yaml", "evaluate_at: .nan")?;
            assert!(load_config(Some(Path::new("bad.yaml"))).is_err());

            jail.create_file("huge.yaml", "pool:\n  initial_capacity: 4294967295")?;
            let err = load_config(Some(Path::new("huge.yaml"))).unwrap_err();
            assert!(err.to_string().contains("pool.initial_capacity must not exceed"));

            jail.create_file(
                "limit.yaml",
                &format!("pool:\n  initial_capacity: {MAX_INITIAL_CAPACITY}"),
            )?;
            let config = load_config(Some(Path::new("limit.yaml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.pool.initial_capacity, MAX_INITIAL_CAPACITY);

            jail.create_file("typo.yaml", "pool:\n  initial_capcity: 4")?;
            let err = load_config(Some(Path::new("typo.yaml"))).unwrap_err();
            assert!(format!("{err:#}").contains("Could not parse configuration"));
            Ok(())
        });
    }
}
