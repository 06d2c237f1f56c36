//! Handle on an installed tool module
//!
//! A loaded module is the installed npm package plus the command line entry
//! point declared in its `package.json`. Every tool operation runs that entry
//! point under `node` with the project as working directory.

use crate::error::{TacoError, TacoResult};
use crate::orchestration::loader::ModuleFactory;
use crate::orchestration::runner::{run_checked, CommandRunner, CommandSpec};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Operations the pipeline needs from the wrapped toolkit
#[async_trait]
pub trait ToolModule: Send + Sync {
    /// Directory the module was loaded from
    fn path(&self) -> &Path;

    /// Version declared by the module's own manifest
    fn version(&self) -> &str;

    /// Add a platform target to the project
    async fn platform_add(&self, project: &Path, platform: &str) -> TacoResult<()>;

    /// Add a plugin (registry id, path or git URL) to the project
    async fn plugin_add(&self, project: &Path, plugin: &str) -> TacoResult<()>;

    /// Prepare one platform
    async fn prepare(&self, project: &Path, platform: &str, options: &[String]) -> TacoResult<()>;

    /// Build one platform
    async fn build(&self, project: &Path, platform: &str, options: &[String]) -> TacoResult<()>;
}

/// `bin` field of a package manifest: a single path or a name → path map
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BinField {
    Single(String),
    Named(BTreeMap<String, String>),
}

#[derive(Debug, Deserialize)]
struct PackageManifest {
    name: Option<String>,
    version: String,
    bin: Option<BinField>,
}

impl PackageManifest {
    /// Relative path of the CLI entry point
    fn entry_point(&self) -> Option<&str> {
        match self.bin.as_ref()? {
            BinField::Single(path) => Some(path),
            BinField::Named(map) => self
                .name
                .as_ref()
                .and_then(|name| map.get(name))
                .or_else(|| map.values().next())
                .map(String::as_str),
        }
    }
}

/// A Cordova-style CLI module installed in the cache
pub struct CordovaModule {
    path: PathBuf,
    version: String,
    entry: PathBuf,
    runner: Arc<dyn CommandRunner>,
    env: Vec<(String, String)>,
}

impl CordovaModule {
    async fn invoke(&self, project: &Path, args: &[&str], options: &[String]) -> TacoResult<()> {
        let spec = CommandSpec::new("node")
            .arg(self.entry.to_string_lossy())
            .args(args.iter().copied())
            .args(options.iter().cloned())
            .cwd(project)
            .envs(&self.env);

        debug!("Running tool command: {}", spec.display());
        run_checked(self.runner.as_ref(), &spec).await?;
        Ok(())
    }
}

#[async_trait]
impl ToolModule for CordovaModule {
    fn path(&self) -> &Path {
        &self.path
    }

    fn version(&self) -> &str {
        &self.version
    }

    async fn platform_add(&self, project: &Path, platform: &str) -> TacoResult<()> {
        self.invoke(project, &["platform", "add", platform], &[]).await
    }

    async fn plugin_add(&self, project: &Path, plugin: &str) -> TacoResult<()> {
        self.invoke(project, &["plugin", "add", plugin], &[]).await
    }

    async fn prepare(&self, project: &Path, platform: &str, options: &[String]) -> TacoResult<()> {
        self.invoke(project, &["prepare", platform], options).await
    }

    async fn build(&self, project: &Path, platform: &str, options: &[String]) -> TacoResult<()> {
        self.invoke(project, &["build", platform], options).await
    }
}

/// Loads [`CordovaModule`]s from installed package directories
pub struct CordovaModuleFactory {
    runner: Arc<dyn CommandRunner>,
}

impl CordovaModuleFactory {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl ModuleFactory for CordovaModuleFactory {
    async fn load(&self, path: &Path, env: &[(String, String)]) -> TacoResult<Arc<dyn ToolModule>> {
        let manifest_path = path.join("package.json");
        let content = tokio::fs::read_to_string(&manifest_path)
            .await
            .map_err(|e| TacoError::ModuleLoad {
                path: path.to_path_buf(),
                reason: format!("cannot read {}: {}", manifest_path.display(), e),
            })?;
        let manifest: PackageManifest =
            serde_json::from_str(&content).map_err(|e| TacoError::ModuleLoad {
                path: path.to_path_buf(),
                reason: format!("invalid package.json: {}", e),
            })?;

        let entry = manifest
            .entry_point()
            .map(|rel| path.join(rel))
            .ok_or_else(|| TacoError::ModuleLoad {
                path: path.to_path_buf(),
                reason: "package.json declares no command line entry point".to_string(),
            })?;
        if !entry.is_file() {
            return Err(TacoError::ModuleLoad {
                path: path.to_path_buf(),
                reason: format!("entry point {} is missing", entry.display()),
            });
        }

        info!("Loaded {} from {}", manifest.version, path.display());
        Ok(Arc::new(CordovaModule {
            path: path.to_path_buf(),
            version: manifest.version,
            entry,
            runner: Arc::clone(&self.runner),
            env: env.to_vec(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{write_module, FakeRunner};
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_reads_version_and_entry() {
        let dir = TempDir::new().unwrap();
        let module_dir = dir.path().join("node_modules").join("cordova");
        write_module(&module_dir, "cordova", "6.2.0");

        let factory = CordovaModuleFactory::new(Arc::new(FakeRunner::new()));
        let module = factory.load(&module_dir, &[]).await.unwrap();

        assert_eq!(module.version(), "6.2.0");
        assert_eq!(module.path(), module_dir.as_path());
    }

    #[tokio::test]
    async fn load_missing_module_fails() {
        let dir = TempDir::new().unwrap();
        let factory = CordovaModuleFactory::new(Arc::new(FakeRunner::new()));
        let err = factory.load(&dir.path().join("nope"), &[]).await.err().unwrap();
        assert!(matches!(err, TacoError::ModuleLoad { .. }));
    }

    #[tokio::test]
    async fn operations_run_entry_point_in_project_with_env() {
        let dir = TempDir::new().unwrap();
        let module_dir = dir.path().join("cordova");
        write_module(&module_dir, "cordova", "6.2.0");
        let project = dir.path().join("app");
        std::fs::create_dir_all(&project).unwrap();

        let runner = Arc::new(FakeRunner::new());
        let env = vec![("CORDOVA_HOME".to_string(), "/c/_cordova".to_string())];
        let factory = CordovaModuleFactory::new(runner.clone());
        let module = factory.load(&module_dir, &env).await.unwrap();

        module
            .build(&project, "android", &["--release".to_string()])
            .await
            .unwrap();

        let calls = runner.calls();
        let call = calls.last().unwrap();
        assert_eq!(call.program, "node");
        assert!(call.args[0].ends_with("cordova"));
        assert_eq!(&call.args[1..], ["build", "android", "--release"]);
        assert_eq!(call.cwd.as_deref(), Some(project.as_path()));
        assert_eq!(call.env, env);
    }

    #[test]
    fn entry_point_prefers_package_name() {
        let manifest: PackageManifest = serde_json::from_str(
            r#"{"name":"cordova","version":"1.0.0","bin":{"aaa":"x.js","cordova":"./bin/cordova"}}"#,
        )
        .unwrap();
        assert_eq!(manifest.entry_point(), Some("./bin/cordova"));

        let single: PackageManifest =
            serde_json::from_str(r#"{"version":"1.0.0","bin":"cli.js"}"#).unwrap();
        assert_eq!(single.entry_point(), Some("cli.js"));
    }
}
