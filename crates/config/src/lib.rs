pub mod schema;
pub mod watcher;

pub use schema::{BatteryConfig, DevinfoConfig, DisplayConfig, RefreshConfig, SectionConfig};
pub use watcher::ConfigWatcher;

use devinfo_core::{DevinfoError, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Read `path` as a [`DevinfoConfig`].
///
/// A missing file is not an error: defaults are used and a warning logged.
pub fn load(path: impl AsRef<Path>) -> Result<DevinfoConfig> {
    let path = path.as_ref();
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("No config at '{}'; running with defaults", path.display());
            return Ok(DevinfoConfig::default());
        }
        Err(e) => {
            return Err(DevinfoError::Config(format!("read '{}': {e}", path.display())));
        }
    };

    toml::from_str(&raw)
        .map_err(|e| DevinfoError::Config(format!("parse '{}': {e}", path.display())))
}

/// `$XDG_CONFIG_HOME/devinfo/devinfo.toml`, or `~/.config/...` without XDG.
pub fn default_path() -> PathBuf {
    let config_home = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_default()
            .join(".config"),
    };
    config_home.join("devinfo").join("devinfo.toml")
}

/// Settings given on the command line.  They win over the file, including
/// after every live reload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub fast_interval_ms: Option<u64>,
    pub sections:         Option<Vec<SectionConfig>>,
}

impl ConfigOverrides {
    /// Return `config` with these overrides applied.
    pub fn apply(&self, mut config: DevinfoConfig) -> DevinfoConfig {
        if let Some(ms) = self.fast_interval_ms {
            config.refresh.fast_interval_ms = ms;
        }
        if let Some(sections) = &self.sections {
            config.display.sections = sections.clone();
        }
        config
    }
}
