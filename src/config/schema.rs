//! Configuration schema for taco-build
//!
//! The optional config file lives at `~/.config/taco-build/config.toml`:
//!
//! ```toml
//! [build]
//! package_name = "cordova"
//! module_version = "6.2.0"
//! add_support_plugin = true
//! cache_root = "/var/cache/cordova"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The tool package provisioned when none is configured
pub const DEFAULT_PACKAGE: &str = "cordova";

/// Fully resolved configuration for one call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Root of the Cordova project
    pub project_path: PathBuf,

    /// npm package providing the tool
    pub package_name: String,

    /// Version or range of the tool package (`None` = resolve from project or latest)
    pub module_version: Option<String>,

    /// Install the support plugin into the project when missing
    pub add_support_plugin: bool,

    /// Root of the version-keyed module cache
    pub cache_root: PathBuf,
}

impl BuildConfig {
    /// Whether this config targets the default tool package
    pub fn is_default_package(&self) -> bool {
        self.package_name == DEFAULT_PACKAGE
    }

    /// Same config pinned to `version`
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        Self {
            module_version: Some(version.into()),
            ..self.clone()
        }
    }
}

/// Partial configuration; only the fields that are set take effect on merge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    pub project_path: Option<PathBuf>,
    pub package_name: Option<String>,
    pub module_version: Option<String>,
    pub add_support_plugin: Option<bool>,
    pub cache_root: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Overrides that only set the project path
    pub fn project(path: impl Into<PathBuf>) -> Self {
        Self {
            project_path: Some(path.into()),
            ..Self::default()
        }
    }
}

/// On-disk config file layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Build defaults
    pub build: ConfigOverrides,
}
