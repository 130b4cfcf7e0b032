// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::remote::DEFAULT_REMOTE_SHELL;

/// Configuration as read from a TOML file.
///
/// ```toml
/// [exec]
/// timeout_secs = 600
/// exec_dir = "/scratch/run"
///
/// [manifest]
/// dir = "/scratch/provenance"
/// name = "osu_bw"
///
/// [remote]
/// shell = "ssh"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfig {
    #[serde(default)]
    pub exec: ExecSection,

    #[serde(default)]
    pub manifest: ManifestSection,

    #[serde(default)]
    pub remote: RemoteSection,
}

/// `[exec]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ExecSection {
    /// Deadline in seconds; `0` or absent means the 30 minute default.
    #[serde(default)]
    pub timeout_secs: u64,

    /// Working directory for commands; absent inherits the caller's.
    #[serde(default)]
    pub exec_dir: Option<PathBuf>,
}

/// `[manifest]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ManifestSection {
    /// Directory for manifests; absent disables them.
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Manifest name without the `.MANIFEST` suffix.
    #[serde(default)]
    pub name: Option<String>,
}

/// `[remote]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteSection {
    #[serde(default = "default_shell")]
    pub shell: String,
}

fn default_shell() -> String {
    DEFAULT_REMOTE_SHELL.to_string()
}

impl Default for RemoteSection {
    fn default() -> Self {
        Self {
            shell: default_shell(),
        }
    }
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfig>` (see `validate.rs`) or
/// [`Config::default`].
#[derive(Debug, Clone, Default)]
pub struct Config {
    exec: ExecSection,
    manifest: ManifestSection,
    remote: RemoteSection,
}

impl Config {
    pub(crate) fn new_unchecked(raw: RawConfig) -> Self {
        Self {
            exec: raw.exec,
            manifest: raw.manifest,
            remote: raw.remote,
        }
    }

    /// Explicit deadline, if one was configured.
    pub fn timeout(&self) -> Option<Duration> {
        match self.exec.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn exec_dir(&self) -> Option<&PathBuf> {
        self.exec.exec_dir.as_ref()
    }

    pub fn manifest_dir(&self) -> Option<&PathBuf> {
        self.manifest.dir.as_ref()
    }

    pub fn manifest_name(&self) -> Option<&str> {
        self.manifest.name.as_deref()
    }

    pub fn remote_shell(&self) -> &str {
        &self.remote.shell
    }
}
