// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use polyterm_config::PolytermConfig;

pub fn execute(config: &PolytermConfig) -> Result<()> {
    print!("{}", describe(config)?);
    Ok(())
}

fn describe(config: &PolytermConfig) -> Result<String> {
    let source = match config.config_file() {
        Some(path) => format!("# loaded from {}\n", path.display()),
        None => "# no configuration file found, showing defaults\n".to_string(),
    };
    Ok(format!("{source}{}", config.to_yaml()?))
}
