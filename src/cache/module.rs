//! Installing tool packages into the cache

use crate::cache::registry::Registry;
use crate::cache::version::resolve_version;
use crate::cache::{module_path, version_dir};
use crate::config::BuildConfig;
use crate::error::{TacoError, TacoResult};
use std::path::PathBuf;
use tokio::fs;
use tracing::info;

/// An installed (package, version) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// npm package name
    pub package_name: String,
    /// Exact installed version
    pub version: String,
    /// Directory the module loads from
    pub path: PathBuf,
}

/// Version-keyed cache of installed tool packages
pub struct ModuleCache {
    registry: Registry,
}

impl ModuleCache {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    /// Resolve the configured version and pin it to an exact published one.
    ///
    /// The registry is asked even for an explicit version so a range never
    /// ends up as a cache key.
    pub async fn resolve_exact(&self, config: &BuildConfig) -> TacoResult<String> {
        let spec = resolve_version(config).await?;
        if spec.is_none() {
            info!("No {} version configured, using latest", config.package_name);
        }
        self.registry
            .exact_version(&config.package_name, spec.as_deref())
            .await
    }

    /// Install `version` under the cache root unless it is already there
    pub async fn ensure_installed(&self, config: &BuildConfig, version: &str) -> TacoResult<CacheEntry> {
        let package = config.package_name.as_str();
        let install_dir = version_dir(&config.cache_root, package, version);
        let path = module_path(&config.cache_root, package, version);
        info!("Module cache at {}", config.cache_root.display());

        if path.exists() {
            info!("{}@{} already installed.", package, version);
        } else {
            // node_modules being present pins npm's install location
            let node_modules = install_dir.join("node_modules");
            fs::create_dir_all(&node_modules).await.map_err(|e| {
                TacoError::io(format!("creating {}", node_modules.display()), e)
            })?;
            self.registry.install(package, version, &install_dir).await?;
        }

        Ok(CacheEntry {
            package_name: package.to_string(),
            version: version.to_string(),
            path,
        })
    }

    /// Resolve, pin and install the tool package for `config`
    pub async fn cache_module(&self, config: &BuildConfig) -> TacoResult<CacheEntry> {
        let version = self.resolve_exact(config).await?;
        self.ensure_installed(config, &version).await
    }
}
