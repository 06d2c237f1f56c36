//! Configuration management for taco-build
//!
//! A [`BuildConfig`] is always produced by merging [`ConfigOverrides`] onto an
//! existing config. Merging is additive: fields absent from the overrides keep
//! their current value.

pub mod schema;

pub use schema::{BuildConfig, ConfigFile, ConfigOverrides, DEFAULT_PACKAGE};

use crate::cache::root::resolve_cache_root;
use crate::error::{TacoError, TacoResult};
use crate::orchestration::HostOs;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

impl BuildConfig {
    /// Defaults for this process: current directory as project, cache root
    /// from the environment.
    pub fn from_env() -> TacoResult<Self> {
        let project_path = std::env::current_dir()
            .map_err(|e| TacoError::io("getting current directory", e))?;
        Ok(Self {
            project_path,
            package_name: DEFAULT_PACKAGE.to_string(),
            module_version: None,
            add_support_plugin: true,
            cache_root: resolve_cache_root(|key| std::env::var(key).ok(), HostOs::detect()),
        })
    }

    /// Merge `overrides` onto this config, see [`merge`]
    pub fn merged(&self, overrides: &ConfigOverrides) -> TacoResult<Self> {
        merge(overrides, self)
    }
}

/// Merge `new` onto `current`.
///
/// A supplied cache root is created eagerly. A supplied project path is made
/// absolute and must exist.
pub fn merge(new: &ConfigOverrides, current: &BuildConfig) -> TacoResult<BuildConfig> {
    let mut merged = current.clone();

    if let Some(ref root) = new.cache_root {
        let root = absolute(root)?;
        std::fs::create_dir_all(&root).map_err(|e| TacoError::ConfigDirCreate {
            path: root.clone(),
            source: e,
        })?;
        debug!("Module cache at {}", root.display());
        merged.cache_root = root;
    }

    if let Some(ref version) = new.module_version {
        merged.module_version = Some(version.clone());
    }

    if let Some(add) = new.add_support_plugin {
        merged.add_support_plugin = add;
    }

    if let Some(ref name) = new.package_name {
        merged.package_name = name.clone();
    }

    if let Some(ref project) = new.project_path {
        let project = absolute(project)?;
        if !project.exists() {
            return Err(TacoError::ProjectPathMissing(project));
        }
        merged.project_path = project;
    }

    Ok(merged)
}

fn absolute(path: &Path) -> TacoResult<PathBuf> {
    std::path::absolute(path)
        .map_err(|e| TacoError::io(format!("resolving path {}", path.display()), e))
}

/// Configuration file manager
pub struct ConfigManager {
    config_path: PathBuf,
    explicit: bool,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
            explicit: false,
        }
    }

    /// Create a config manager with a custom path; the file must exist
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config_path: path,
            explicit: true,
        }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("taco-build")
            .join("config.toml")
    }

    /// Load the `[build]` overrides, empty when the default file is absent
    pub async fn load(&self) -> TacoResult<ConfigOverrides> {
        if !self.config_path.exists() {
            if self.explicit {
                return Err(TacoError::ConfigNotFound(self.config_path.clone()));
            }
            debug!("Config file not found, using defaults");
            return Ok(ConfigOverrides::default());
        }

        let content = fs::read_to_string(&self.config_path).await.map_err(|e| {
            TacoError::io(
                format!("reading config from {}", self.config_path.display()),
                e,
            )
        })?;

        let file: ConfigFile = toml::from_str(&content).map_err(|e| TacoError::ConfigInvalid {
            path: self.config_path.clone(),
            reason: e.to_string(),
        })?;
        info!("Loaded configuration from {}", self.config_path.display());
        Ok(file.build)
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
