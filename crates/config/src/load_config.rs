// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::path::{Path, PathBuf};

use path_clean::clean;

pub type FindInParent = fn(&Path, &str) -> Option<PathBuf>;

/// Where a resolved configuration path came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigSource {
    /// Passed on the command line. The file must exist.
    Explicit,
    /// Found by walking up from the working directory.
    Discovered,
    /// The platform configuration directory. The file may be absent.
    Default,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPath {
    pub path: PathBuf,
    pub source: ConfigSource,
}

impl ResolvedPath {
    /// Whether a missing file at this path should be reported.
    pub fn required(&self) -> bool {
        self.source == ConfigSource::Explicit
    }
}

pub fn find_in_parent(path: &Path, filename: &str) -> Option<PathBuf> {
    let mut current = path.to_path_buf();

    loop {
        let file_path = current.join(filename);
        if file_path.is_file() {
            return Some(file_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

pub fn resolve_config_path(
    find_in_parent: FindInParent,
    cwd: &Path,
    default_config_dir: Option<&Path>,
    default_filename: &str,
    cli_file: Option<&Path>,
) -> Option<ResolvedPath> {
    if let Some(cli_file) = cli_file {
        let path = if cli_file.is_absolute() {
            cli_file.to_path_buf()
        } else {
            clean(cwd.join(cli_file))
        };
        return Some(ResolvedPath {
            path,
            source: ConfigSource::Explicit,
        });
    }

    if let Some(path) = find_in_parent(cwd, default_filename) {
        return Some(ResolvedPath {
            path,
            source: ConfigSource::Discovered,
        });
    }

    // no platform config dir means defaults only
    default_config_dir.map(|dir| ResolvedPath {
        path: clean(dir.join(default_filename)),
        source: ConfigSource::Default,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;

    fn not_found(_: &Path, _: &str) -> Option<PathBuf> {
        None
    }

    fn found(_: &Path, _: &str) -> Option<PathBuf> {
        Some(PathBuf::from("/foo/polyterm.config.yaml"))
    }

    #[test]
    fn test_resolve_cli() -> Result<()> {
        let resolved = resolve_config_path(
            not_found,
            Path::new("/foo/bar"),
            Some(Path::new("/my/config")),
            "polyterm.config.yaml",
            None,
        );
        assert_eq!(
            resolved,
            Some(ResolvedPath {
                path: PathBuf::from("/my/config/polyterm.config.yaml"),
                source: ConfigSource::Default,
            })
        );

        // explicit path wins over a discovered one
        let resolved = resolve_config_path(
            found,
            Path::new("/foo/bar"),
            Some(Path::new("/my/config")),
            "polyterm.config.yaml",
            Some(Path::new("/my/absolute/conf.yaml")),
        );
        assert_eq!(
            resolved.map(|r| (r.path, r.source)),
            Some((
                PathBuf::from("/my/absolute/conf.yaml"),
                ConfigSource::Explicit
            ))
        );

        let resolved = resolve_config_path(
            found,
            Path::new("/foo/bar"),
            Some(Path::new("/my/config")),
            "polyterm.config.yaml",
            None,
        );
        assert_eq!(
            resolved.map(|r| (r.path, r.source)),
            Some((
                PathBuf::from("/foo/polyterm.config.yaml"),
                ConfigSource::Discovered
            ))
        );
        Ok(())
    }

    #[test]
    fn test_relative_cli_path_is_cleaned() {
        let resolved = resolve_config_path(
            found,
            Path::new("/work/project"),
            None,
            "polyterm.config.yaml",
            Some(Path::new("../shared/./polyterm.yaml")),
        )
        .unwrap();

        assert_eq!(resolved.path, PathBuf::from("/work/shared/polyterm.yaml"));
        assert!(resolved.required());
    }

    #[test]
    fn test_no_config_dir() {
        let resolved = resolve_config_path(
            not_found,
            Path::new("/foo/bar"),
            None,
            "polyterm.config.yaml",
            None,
        );
        assert_eq!(resolved, None);
    }

    #[test]
    fn test_find_in_parent() -> Result<()> {
        let root = tempfile::tempdir()?;
        let nested = root.path().join("a").join("b");
        fs::create_dir_all(&nested)?;
        fs::write(root.path().join("a").join("polyterm.config.yaml"), "")?;

        assert_eq!(
            find_in_parent(&nested, "polyterm.config.yaml"),
            Some(root.path().join("a").join("polyterm.config.yaml"))
        );
        assert_eq!(find_in_parent(&nested, "missing.yaml"), None);
        Ok(())
    }
}
