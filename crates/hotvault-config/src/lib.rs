// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the Hotvault secrets vault.
//!
//! TOML files in the usual hierarchy plus `HOTVAULT_*` environment overrides,
//! strict key checking and miette diagnostics with typo suggestions.
//!
//! ```no_run
//! let config = hotvault_config::load_and_validate().expect("config errors");
//! println!("listening on {}:{}", config.server.host, config.server.port);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::HotvaultConfig;

/// Load from the standard hierarchy and validate.
pub fn load_and_validate() -> Result<HotvaultConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => validation::validate_config(&config).map(|()| config),
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &hierarchy_sources(),
        )),
    }
}

/// Load one explicit file (plus env) and validate.
pub fn load_and_validate_path(path: &Path) -> Result<HotvaultConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => validation::validate_config(&config).map(|()| config),
        Err(err) => {
            let sources: Vec<_> = read_source(path).into_iter().collect();
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load a TOML string over the defaults and validate.
pub fn load_and_validate_str(toml_content: &str) -> Result<HotvaultConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => validation::validate_config(&config).map(|()| config),
        Err(err) => {
            let sources = [("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// figment records absolute paths, so sources are keyed the same way.
fn read_source(path: &Path) -> Option<(String, String)> {
    let content = std::fs::read_to_string(path).ok()?;
    let absolute = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    Some((absolute.display().to_string(), content))
}

/// Contents of whichever hierarchy files exist, for error spans.
fn hierarchy_sources() -> Vec<(String, String)> {
    let mut paths = vec![Path::new(loader::SYSTEM_CONFIG_PATH).to_path_buf()];
    paths.extend(loader::user_config_path());
    paths.push(Path::new(loader::LOCAL_CONFIG_FILE).to_path_buf());
    paths.iter().filter_map(|p| read_source(p)).collect()
}
