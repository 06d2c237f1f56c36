//! Test doubles shared by the unit tests

use crate::config::{BuildConfig, DEFAULT_PACKAGE};
use crate::error::{TacoError, TacoResult};
use crate::orchestration::{CommandOutput, CommandRunner, CommandSpec, ModuleFactory, ToolModule};
use crate::pipeline::plugin::SUPPORT_PLUGIN_ID;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Lay out a minimal installed npm package at `dir`
pub(crate) fn write_module(dir: &Path, name: &str, version: &str) {
    fs::create_dir_all(dir.join("bin")).unwrap();
    let mut bin = serde_json::Map::new();
    bin.insert(name.to_string(), serde_json::json!(format!("./bin/{}", name)));
    let manifest = serde_json::json!({
        "name": name,
        "version": version,
        "bin": bin,
    });
    fs::write(dir.join("package.json"), manifest.to_string()).unwrap();
    fs::write(dir.join("bin").join(name), "#!/usr/bin/env node\n").unwrap();
}

/// Config with an existing project directory and a cache root under `dir`
pub(crate) fn test_config(dir: &Path) -> BuildConfig {
    let project_path = dir.join("project");
    fs::create_dir_all(&project_path).unwrap();
    BuildConfig {
        project_path,
        package_name: DEFAULT_PACKAGE.to_string(),
        module_version: None,
        add_support_plugin: true,
        cache_root: dir.join("cache"),
    }
}

fn ok(stdout: impl Into<String>) -> TacoResult<CommandOutput> {
    Ok(CommandOutput {
        code: Some(0),
        stdout: stdout.into(),
        stderr: String::new(),
    })
}

fn failed(stderr: impl Into<String>) -> TacoResult<CommandOutput> {
    Ok(CommandOutput {
        code: Some(1),
        stdout: String::new(),
        stderr: stderr.into(),
    })
}

/// Split `name@spec`, keeping a leading scope `@`
fn split_package(target: &str) -> (&str, Option<&str>) {
    match target.get(1..).and_then(|rest| rest.find('@')) {
        Some(idx) => (&target[..idx + 1], Some(&target[idx + 2..])),
        None => (target, None),
    }
}

/// Scripted stand-in for node, npm and the Apple toolchain.
///
/// Records every invocation and mimics the filesystem side effects the
/// pipeline relies on (installed packages, added platforms and plugins).
pub(crate) struct FakeRunner {
    calls: Mutex<Vec<CommandSpec>>,
    node_version: String,
    latest: String,
    published: HashMap<String, String>,
    xcode: Option<String>,
    platform_scripts: HashMap<String, String>,
    fail_install: bool,
    fail_build: Option<String>,
}

impl FakeRunner {
    pub(crate) fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            node_version: "4.4.7".to_string(),
            latest: "6.3.1".to_string(),
            published: HashMap::new(),
            xcode: None,
            platform_scripts: HashMap::new(),
            fail_install: false,
            fail_build: None,
        }
    }

    pub(crate) fn with_node(mut self, version: &str) -> Self {
        self.node_version = version.to_string();
        self
    }

    /// Registry answer for a version range
    pub(crate) fn publish(mut self, spec: &str, exact: &str) -> Self {
        self.published.insert(spec.to_string(), exact.to_string());
        self
    }

    pub(crate) fn with_xcode(mut self, version_output: &str) -> Self {
        self.xcode = Some(version_output.to_string());
        self
    }

    /// Output of `platforms/<platform>/cordova/version`
    pub(crate) fn with_platform_script(mut self, platform: &str, version: &str) -> Self {
        self.platform_scripts
            .insert(platform.to_string(), version.to_string());
        self
    }

    pub(crate) fn failing_install(mut self) -> Self {
        self.fail_install = true;
        self
    }

    pub(crate) fn failing_build(mut self, platform: &str) -> Self {
        self.fail_build = Some(platform.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, pred: impl Fn(&CommandSpec) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub(crate) fn installs(&self) -> usize {
        self.count(|c| c.program.starts_with("npm") && c.args.first().map(String::as_str) == Some("install"))
    }

    /// Tool sub-commands (args after the entry point) in invocation order
    pub(crate) fn tool_commands(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.program == "node" && c.args.len() > 1)
            .map(|c| c.args[1..].to_vec())
            .collect()
    }

    fn cwd(spec: &CommandSpec) -> TacoResult<&Path> {
        spec.cwd
            .as_deref()
            .ok_or_else(|| TacoError::Internal(format!("{} has no cwd", spec.display())))
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, spec: &CommandSpec) -> TacoResult<CommandOutput> {
        self.calls.lock().unwrap().push(spec.clone());
        let args: Vec<&str> = spec.args.iter().map(String::as_str).collect();

        match (spec.program.as_str(), args.as_slice()) {
            ("node", ["--version"]) => ok(format!("v{}\n", self.node_version)),
            ("npm" | "npm.cmd", ["view", target, "version"]) => {
                let exact = match split_package(target).1 {
                    None => self.latest.clone(),
                    Some(spec) => self
                        .published
                        .get(spec)
                        .cloned()
                        .unwrap_or_else(|| spec.to_string()),
                };
                ok(format!("{}\n", exact))
            }
            ("npm" | "npm.cmd", ["install", target]) => {
                if self.fail_install {
                    return failed("npm ERR! code ETIMEDOUT\nnpm ERR! network timeout");
                }
                let (name, version) = split_package(target);
                let dir = Self::cwd(spec)?.join("node_modules").join(name);
                write_module(&dir, name, version.unwrap_or("0.0.0"));
                ok(format!("+ {}\nadded 1 package\n", target))
            }
            ("node", [_, "platform", "add", platform]) => {
                fs::create_dir_all(Self::cwd(spec)?.join("platforms").join(platform))
                    .map_err(|e| TacoError::io("fake platform add", e))?;
                ok("")
            }
            ("node", [_, "plugin", "add", _]) => {
                fs::create_dir_all(Self::cwd(spec)?.join("plugins").join(SUPPORT_PLUGIN_ID))
                    .map_err(|e| TacoError::io("fake plugin add", e))?;
                ok("")
            }
            ("node", [_, "build", platform, ..]) => {
                if self.fail_build.as_deref() == Some(*platform) {
                    failed("** BUILD FAILED **")
                } else {
                    ok("BUILD SUCCEEDED\n")
                }
            }
            ("node", [_, "prepare", ..]) => ok(""),
            ("xcodebuild", ["-version"]) => match self.xcode {
                Some(ref out) => ok(out.clone()),
                None => Err(TacoError::command_failed(
                    "xcodebuild -version",
                    std::io::Error::from(std::io::ErrorKind::NotFound),
                )),
            },
            ("xcrun", _) => ok("Results at ipa\n"),
            (program, []) if program.ends_with("version") => {
                let platform = PathBuf::from(program)
                    .parent()
                    .and_then(Path::parent)
                    .and_then(Path::file_name)
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                match self.platform_scripts.get(&platform) {
                    Some(v) => ok(format!("{}\n", v)),
                    None => failed("no version script"),
                }
            }
            _ => Err(TacoError::Internal(format!(
                "unexpected command: {}",
                spec.display()
            ))),
        }
    }
}

/// Module that does nothing
pub(crate) struct StubModule {
    path: PathBuf,
}

#[async_trait]
impl ToolModule for StubModule {
    fn path(&self) -> &Path {
        &self.path
    }

    fn version(&self) -> &str {
        "0.0.0"
    }

    async fn platform_add(&self, _project: &Path, _platform: &str) -> TacoResult<()> {
        Ok(())
    }

    async fn plugin_add(&self, _project: &Path, _plugin: &str) -> TacoResult<()> {
        Ok(())
    }

    async fn prepare(&self, _project: &Path, _platform: &str, _options: &[String]) -> TacoResult<()> {
        Ok(())
    }

    async fn build(&self, _project: &Path, _platform: &str, _options: &[String]) -> TacoResult<()> {
        Ok(())
    }
}

/// Factory that records which paths were loaded, handing out stubs or
/// delegating to a real factory
#[derive(Default)]
pub(crate) struct CountingFactory {
    loads: Mutex<Vec<PathBuf>>,
    inner: Option<Arc<dyn ModuleFactory>>,
}

impl CountingFactory {
    pub(crate) fn wrapping(inner: Arc<dyn ModuleFactory>) -> Self {
        Self {
            loads: Mutex::new(Vec::new()),
            inner: Some(inner),
        }
    }

    pub(crate) fn loads_of(&self, path: &Path) -> usize {
        self.loads.lock().unwrap().iter().filter(|p| p.as_path() == path).count()
    }
}

#[async_trait]
impl ModuleFactory for CountingFactory {
    async fn load(&self, path: &Path, env: &[(String, String)]) -> TacoResult<Arc<dyn ToolModule>> {
        self.loads.lock().unwrap().push(path.to_path_buf());
        match self.inner {
            Some(ref inner) => inner.load(path, env).await,
            None => Ok(Arc::new(StubModule {
                path: path.to_path_buf(),
            })),
        }
    }
}

#[test]
fn split_package_handles_scopes() {
    assert_eq!(split_package("cordova@6.2.0"), ("cordova", Some("6.2.0")));
    assert_eq!(split_package("cordova"), ("cordova", None));
    assert_eq!(split_package("@scope/tool@1.0.0"), ("@scope/tool", Some("1.0.0")));
}
