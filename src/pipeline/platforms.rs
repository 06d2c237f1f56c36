//! Platform targets, per-platform arguments and provisioning

use crate::error::{TacoError, TacoResult};
use crate::orchestration::{run_checked, CommandRunner, CommandSpec, ToolModule};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Ordered, duplicate-free list of platform identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformSet(Vec<String>);

impl PlatformSet {
    /// Build from caller order, dropping blanks and repeats
    pub fn new<I, S>(platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ordered: Vec<String> = Vec::new();
        for platform in platforms {
            let platform = platform.into().trim().to_string();
            if !platform.is_empty() && !ordered.contains(&platform) {
                ordered.push(platform);
            }
        }
        Self(ordered)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Arguments forwarded to the tool's prepare/build commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildArgs {
    /// Same arguments for every platform
    Shared(Vec<String>),
    /// Arguments per platform; platforms without an entry get none
    PerPlatform(HashMap<String, Vec<String>>),
}

impl Default for BuildArgs {
    fn default() -> Self {
        Self::Shared(Vec::new())
    }
}

impl BuildArgs {
    pub fn for_platform(&self, platform: &str) -> &[String] {
        match self {
            Self::Shared(args) => args,
            Self::PerPlatform(map) => map.get(platform).map(Vec::as_slice).unwrap_or(&[]),
        }
    }
}

/// Whether `options` select a debug build
pub fn is_debug_build(options: &[String]) -> bool {
    options.join(" ").to_lowercase().contains("debug")
}

/// `platforms/<platform>` under the project
pub fn platform_dir(project: &Path, platform: &str) -> PathBuf {
    project.join("platforms").join(platform)
}

/// Add every requested platform that is not yet in the project.
///
/// Strictly one at a time: the tool rewrites shared project metadata on each
/// add.
pub async fn provision(module: &dyn ToolModule, project: &Path, platforms: &PlatformSet) -> TacoResult<()> {
    for platform in platforms.iter() {
        if platform_dir(project, platform).exists() {
            info!("Platform {} already added.", platform);
            continue;
        }
        info!("Adding platform {}...", platform);
        module.platform_add(project, platform).await?;
    }
    Ok(())
}

/// Version of the platform installed in the project (not the CLI version).
///
/// Reads `platforms/platforms.json` when present, otherwise asks the
/// platform's own `cordova/version` script.
pub async fn installed_platform_version(
    runner: &dyn CommandRunner,
    project: &Path,
    platform: &str,
) -> TacoResult<String> {
    let platforms_json = project.join("platforms").join("platforms.json");
    if platforms_json.is_file() {
        let content = tokio::fs::read_to_string(&platforms_json)
            .await
            .map_err(|e| TacoError::io(format!("reading {}", platforms_json.display()), e))?;
        let versions: HashMap<String, String> = serde_json::from_str(&content)?;
        if let Some(version) = versions.get(platform) {
            return Ok(version.trim().to_string());
        }
    }

    let script_name = if cfg!(windows) { "version.bat" } else { "version" };
    let script = platform_dir(project, platform).join("cordova").join(script_name);
    let output = run_checked(
        runner,
        &CommandSpec::new(script.to_string_lossy()).cwd(project),
    )
    .await?;
    Ok(output.stdout.trim().to_string())
}
