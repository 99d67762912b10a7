// src/config/loader.rs

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::model::ConfigFile;

/// Default config file name, looked up in the current working directory.
pub const DEFAULT_CONFIG_PATH: &str = "Snipgen.toml";

/// Load a configuration file from a given path.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading config file at {path:?}"))?;

    let config: ConfigFile =
        toml::from_str(&contents).with_context(|| format!("parsing TOML config from {path:?}"))?;

    Ok(config)
}

/// Resolve the effective configuration.
///
/// An explicitly named file must exist; the default `Snipgen.toml` is only
/// read if present, otherwise built-in defaults apply.
pub fn load(explicit: Option<&Path>) -> Result<ConfigFile> {
    match explicit {
        Some(path) => load_from_path(path),
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if default.exists() {
                load_from_path(default)
            } else {
                Ok(ConfigFile::default())
            }
        }
    }
}
