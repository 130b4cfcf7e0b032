// src/config/loader.rs

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{Config, RawConfig};
use crate::errors::Result;

/// Read and deserialize a config file without validating it.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: RawConfig = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a config file and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Config> {
    let raw = load_from_path(&path)?;
    Config::try_from(raw)
}

/// Load the config for the CLI.
///
/// An explicitly requested file must exist. When falling back to
/// [`default_config_path`], a missing file just means defaults.
pub fn load_or_default(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => load_and_validate(path),
        None => {
            let path = default_config_path();
            match load_and_validate(&path) {
                Err(crate::errors::ExecError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                    debug!(path = %path.display(), "no config file; using defaults");
                    Ok(Config::default())
                }
                other => other,
            }
        }
    }
}

/// `provexec.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("provexec.toml")
}
