// src/config/validate.rs

use crate::config::model::{Config, RawConfig};
use crate::errors::{ExecError, Result};

impl TryFrom<RawConfig> for Config {
    type Error = ExecError;

    fn try_from(raw: RawConfig) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        Ok(Config::new_unchecked(raw))
    }
}

pub fn validate_config(cfg: &RawConfig) -> Result<()> {
    validate_manifest_name(cfg)?;
    validate_remote_shell(cfg)?;
    Ok(())
}

fn validate_manifest_name(cfg: &RawConfig) -> Result<()> {
    let Some(name) = cfg.manifest.name.as_deref() else {
        return Ok(());
    };
    if name.is_empty() {
        return Err(ExecError::Config(
            "[manifest].name must not be empty (omit it to use \"exec\")".to_string(),
        ));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(ExecError::Config(format!(
            "[manifest].name '{}' must not contain a path separator",
            name
        )));
    }
    Ok(())
}

fn validate_remote_shell(cfg: &RawConfig) -> Result<()> {
    if cfg.remote.shell.trim().is_empty() {
        return Err(ExecError::Config(
            "[remote].shell must name a remote shell program".to_string(),
        ));
    }
    Ok(())
}
