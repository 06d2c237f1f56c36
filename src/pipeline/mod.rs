//! Build pipeline
//!
//! A [`BuildSession`] drives the stages for one or more platforms, strictly
//! in order. The first fatal failure aborts the rest; advisory stages only
//! record their outcome.
//!
//! - `platforms`: targets, per-platform arguments, provisioning
//! - `plugin`: support plugin injection
//! - `postprocess`: execute-bit repair and the Xcode gate
//! - `package`: legacy iOS packaging
//! - `stage`: advisory stage bookkeeping

pub mod package;
pub mod platforms;
pub mod plugin;
pub mod postprocess;
pub mod stage;

pub use platforms::{BuildArgs, PlatformSet};
pub use stage::AdvisoryOutcome;

use crate::cache::{tool_env, CacheEntry, ModuleCache, Registry};
use crate::compat::CompatibilityChecker;
use crate::config::{BuildConfig, ConfigOverrides};
use crate::error::TacoResult;
use crate::orchestration::{
    CommandRunner, CordovaModuleFactory, HostOs, ModuleFactory, ModuleLoader, SystemRunner, ToolModule,
};
use crate::pipeline::postprocess::{ExecBitRepair, PermissionRepair};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Per-platform tool command run after provisioning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Prepare,
    Build,
}

impl Action {
    fn name(self) -> &'static str {
        match self {
            Self::Prepare => "prepare",
            Self::Build => "build",
        }
    }
}

/// Owns everything one caller's builds share: default configuration, the
/// resident module, the process runner and the host OS.
///
/// Methods take `&mut self`, so calls on one session never overlap.
pub struct BuildSession {
    defaults: BuildConfig,
    runner: Arc<dyn CommandRunner>,
    cache: ModuleCache,
    checker: CompatibilityChecker,
    loader: ModuleLoader,
    repair: Arc<dyn PermissionRepair>,
    host: HostOs,
    advisories: Vec<AdvisoryOutcome>,
}

impl BuildSession {
    /// Session running real processes on this host
    pub fn new(defaults: BuildConfig) -> Self {
        let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner::new());
        let factory = Arc::new(CordovaModuleFactory::new(Arc::clone(&runner)));
        Self::with_parts(defaults, runner, factory, HostOs::detect())
    }

    /// Session with explicit collaborators
    pub fn with_parts(
        defaults: BuildConfig,
        runner: Arc<dyn CommandRunner>,
        factory: Arc<dyn ModuleFactory>,
        host: HostOs,
    ) -> Self {
        Self {
            defaults,
            cache: ModuleCache::new(Registry::new(Arc::clone(&runner), host)),
            checker: CompatibilityChecker::new(Arc::clone(&runner), host),
            loader: ModuleLoader::new(factory),
            repair: Arc::new(ExecBitRepair),
            runner,
            host,
            advisories: Vec::new(),
        }
    }

    /// Replace the execute-bit repair stage
    pub fn with_permission_repair(mut self, repair: Arc<dyn PermissionRepair>) -> Self {
        self.repair = repair;
        self
    }

    /// Current default configuration
    pub fn config(&self) -> &BuildConfig {
        &self.defaults
    }

    /// Merge `overrides` into the session default
    pub fn configure(&mut self, overrides: &ConfigOverrides) -> TacoResult<&BuildConfig> {
        self.defaults = self.defaults.merged(overrides)?;
        Ok(&self.defaults)
    }

    /// Outcomes of advisory stages from every run so far
    pub fn advisories(&self) -> &[AdvisoryOutcome] {
        &self.advisories
    }

    /// Make sure the configured tool version is installed, without loading it
    pub async fn cache_module(&mut self, overrides: &ConfigOverrides) -> TacoResult<CacheEntry> {
        let config = self.defaults.merged(overrides)?;
        let version = self.cache.resolve_exact(&config).await?;
        self.checker
            .ensure_compatible(&config.package_name, &version)
            .await?;
        self.cache.ensure_installed(&config, &version).await
    }

    /// Prepare each platform in order
    pub async fn prepare_project(
        &mut self,
        platforms: &PlatformSet,
        args: &BuildArgs,
        project_path: Option<&Path>,
    ) -> TacoResult<()> {
        self.run(Action::Prepare, platforms, args, project_path).await
    }

    /// Build each platform in order
    pub async fn build_project(
        &mut self,
        platforms: &PlatformSet,
        args: &BuildArgs,
        project_path: Option<&Path>,
    ) -> TacoResult<()> {
        self.run(Action::Build, platforms, args, project_path).await
    }

    /// Package already built platforms
    pub async fn package_project(
        &mut self,
        platforms: &PlatformSet,
        args: &BuildArgs,
        project_path: Option<&Path>,
    ) -> TacoResult<()> {
        let config = self.call_config(project_path)?;
        let module = self.ensure_module(&config).await?;
        plugin::ensure_support_plugin(module.as_ref(), &config).await?;

        for platform in platforms.iter() {
            package::package_platform(
                self.runner.as_ref(),
                &config.project_path,
                platform,
                args.for_platform(platform),
            )
            .await?;
        }
        Ok(())
    }

    fn call_config(&self, project_path: Option<&Path>) -> TacoResult<BuildConfig> {
        match project_path {
            Some(path) => self.defaults.merged(&ConfigOverrides::project(path)),
            None => Ok(self.defaults.clone()),
        }
    }

    /// Pin, check, cache and load the tool module for `config`
    async fn ensure_module(&mut self, config: &BuildConfig) -> TacoResult<Arc<dyn ToolModule>> {
        let version = self.cache.resolve_exact(config).await?;
        self.checker
            .ensure_compatible(&config.package_name, &version)
            .await?;

        if let Some(module) = self.loader.get_resident(&config.with_version(version.as_str())) {
            info!("{}@{} already loaded.", config.package_name, version);
            return Ok(module);
        }

        let entry = self.cache.ensure_installed(config, &version).await?;
        self.loader
            .load(&entry.path, &tool_env(&config.cache_root))
            .await
    }

    async fn run(
        &mut self,
        action: Action,
        platforms: &PlatformSet,
        args: &BuildArgs,
        project_path: Option<&Path>,
    ) -> TacoResult<()> {
        let config = self.call_config(project_path)?;
        let project = config.project_path.as_path();
        let module = self.ensure_module(&config).await?;

        let outcome = stage::run_advisory(
            "permission repair",
            self.repair.repair(project, platforms, self.host),
        )
        .await;
        self.advisories.push(outcome);

        plugin::ensure_support_plugin(module.as_ref(), &config).await?;
        self::platforms::provision(module.as_ref(), project, platforms).await?;

        for platform in platforms.iter() {
            let options = args.for_platform(platform);
            postprocess::check_toolchain(self.runner.as_ref(), project, platform, options).await?;

            info!("Running {} for {}...", action.name(), platform);
            match action {
                Action::Prepare => module.prepare(project, platform, options).await?,
                Action::Build => module.build(project, platform, options).await?,
            }
        }
        Ok(())
    }
}
