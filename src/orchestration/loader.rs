//! Single-slot resident module cache
//!
//! A session keeps at most one loaded tool module. Loading the same path again
//! hands back the resident instance; loading any other path evicts it.

use crate::cache::module_path;
use crate::config::BuildConfig;
use crate::error::TacoResult;
use crate::orchestration::module::ToolModule;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Produces live module instances from installed package directories
#[async_trait]
pub trait ModuleFactory: Send + Sync {
    /// Load the module installed at `path`; `env` is applied to every
    /// process the module later launches.
    async fn load(&self, path: &Path, env: &[(String, String)]) -> TacoResult<Arc<dyn ToolModule>>;
}

struct ResidentModule {
    path: PathBuf,
    instance: Arc<dyn ToolModule>,
}

/// Holds the most recently loaded module
pub struct ModuleLoader {
    factory: Arc<dyn ModuleFactory>,
    resident: Option<ResidentModule>,
}

impl ModuleLoader {
    pub fn new(factory: Arc<dyn ModuleFactory>) -> Self {
        Self {
            factory,
            resident: None,
        }
    }

    /// Return the module at `path`, loading it if it is not the resident one
    pub async fn load(&mut self, path: &Path, env: &[(String, String)]) -> TacoResult<Arc<dyn ToolModule>> {
        if let Some(ref resident) = self.resident {
            if resident.path == path {
                debug!("Module at {} already loaded", path.display());
                return Ok(Arc::clone(&resident.instance));
            }
        }

        let instance = self.factory.load(path, env).await?;
        self.resident = Some(ResidentModule {
            path: path.to_path_buf(),
            instance: Arc::clone(&instance),
        });
        Ok(instance)
    }

    /// The resident module, only if it is the one `config` resolves to
    pub fn get_resident(&self, config: &BuildConfig) -> Option<Arc<dyn ToolModule>> {
        let expected = Self::derive_path(config)?;
        self.resident
            .as_ref()
            .filter(|resident| resident.path == expected)
            .map(|resident| Arc::clone(&resident.instance))
    }

    /// Path a module for `config` would be loaded from.
    ///
    /// `None` without an explicit version: "latest" needs a registry query.
    pub fn derive_path(config: &BuildConfig) -> Option<PathBuf> {
        let version = config.module_version.as_deref()?;
        Some(module_path(&config.cache_root, &config.package_name, version))
    }

    #[cfg(test)]
    pub(crate) fn resident_path(&self) -> Option<&Path> {
        self.resident.as_ref().map(|r| r.path.as_path())
    }
}
