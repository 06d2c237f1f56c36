//! Platform post-processing
//!
//! - Execute-bit repair: best effort, POSIX hosts only.
//! - Xcode gate: fatal checks before an iOS build on Xcode 8 or later, whose
//!   own failure for a missing signing team is opaque.

use crate::compat::parse_version;
use crate::error::{TacoError, TacoResult};
use crate::orchestration::{run_checked, CommandRunner, CommandSpec, HostOs};
use crate::pipeline::platforms::{installed_platform_version, is_debug_build, platform_dir, PlatformSet};
use async_trait::async_trait;
use semver::Version;
use serde_json::Value;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// First Xcode major version with the signing changes
pub const XCODE_BREAKING_MAJOR: u64 = 8;

/// Project-level build configuration manifest
pub const BUILD_MANIFEST: &str = "build.json";

/// Platform that needs the Xcode gate
pub const IOS: &str = "ios";

fn min_ios_platform() -> Version {
    Version::new(4, 3, 0)
}

/// Restore execute bits that cross-OS file transfers tend to strip.
///
/// Covers every file in the requested platform directories that exist, the
/// project's `hooks/` directory and every `*.sh` in the project.
pub async fn fix_permissions(project: &Path, platforms: &PlatformSet, host: HostOs) -> TacoResult<()> {
    if !host.is_posix() {
        debug!("Skipping permission repair on {}", host);
        return Ok(());
    }

    let mut count = 0;
    for platform in platforms.iter() {
        let dir = platform_dir(project, platform);
        if dir.is_dir() {
            count += mark_executable(&dir, |_| true).await?;
        }
    }

    let hooks = project.join("hooks");
    if hooks.is_dir() {
        count += mark_executable(&hooks, |_| true).await?;
    }

    count += mark_executable(project, |path| {
        path.extension().is_some_and(|ext| ext == "sh")
    })
    .await?;

    info!("Set execute permission on {} file(s)", count);
    Ok(())
}

/// Execute-bit repair run before each prepare or build
#[async_trait]
pub trait PermissionRepair: Send + Sync {
    async fn repair(&self, project: &Path, platforms: &PlatformSet, host: HostOs) -> TacoResult<()>;
}

/// Repairs execute bits on the local filesystem with [`fix_permissions`]
pub struct ExecBitRepair;

#[async_trait]
impl PermissionRepair for ExecBitRepair {
    async fn repair(&self, project: &Path, platforms: &PlatformSet, host: HostOs) -> TacoResult<()> {
        fix_permissions(project, platforms, host).await
    }
}

/// Walk `root` without following symlinks and add execute bits to every
/// regular file accepted by `select`. Returns the number of files touched.
async fn mark_executable(root: &Path, select: fn(&Path) -> bool) -> TacoResult<usize> {
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || mark_executable_blocking(&root, select))
        .await
        .map_err(|e| TacoError::Internal(format!("permission repair task failed: {}", e)))?
}

fn mark_executable_blocking(root: &Path, select: fn(&Path) -> bool) -> TacoResult<usize> {
    let mut count = 0;
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| TacoError::io(format!("walking {}", root.display()), e.into()))?;
        if entry.file_type().is_file() && select(entry.path()) {
            set_executable(entry.path())?;
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(unix)]
fn set_executable(path: &Path) -> TacoResult<()> {
    use std::os::unix::fs::PermissionsExt;

    let meta = std::fs::metadata(path)
        .map_err(|e| TacoError::io(format!("inspecting {}", path.display()), e))?;
    let mode = meta.permissions().mode();
    if mode & 0o111 != 0o111 {
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode | 0o111))
            .map_err(|e| TacoError::io(format!("setting permissions on {}", path.display()), e))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> TacoResult<()> {
    Ok(())
}

/// Major version from `xcodebuild -version` output (`Xcode 8.2.1`)
pub fn parse_xcode_major(output: &str) -> Option<u64> {
    output
        .lines()
        .find_map(|line| line.trim().strip_prefix("Xcode "))
        .and_then(|rest| rest.trim().split('.').next())
        .and_then(|major| major.parse().ok())
}

fn gate_error(xcode_major: u64, reason: String) -> TacoError {
    TacoError::ToolchainGate {
        xcode_major,
        reason,
    }
}

/// Refuse an iOS build that Xcode 8+ would reject with an opaque error
pub async fn check_toolchain(
    runner: &dyn CommandRunner,
    project: &Path,
    platform: &str,
    options: &[String],
) -> TacoResult<()> {
    if platform != IOS {
        return Ok(());
    }

    let output = match run_checked(runner, &CommandSpec::new("xcodebuild").arg("-version")).await {
        Ok(output) => output,
        Err(e) => {
            warn!("Could not determine Xcode version, skipping Xcode checks: {}", e);
            return Ok(());
        }
    };
    let Some(major) = parse_xcode_major(&output.stdout) else {
        warn!("Unrecognised xcodebuild output, skipping Xcode checks");
        return Ok(());
    };
    if major < XCODE_BREAKING_MAJOR {
        debug!("Xcode {} needs no extra checks", major);
        return Ok(());
    }

    let installed = installed_platform_version(runner, project, IOS).await?;
    match parse_version(&installed) {
        Some(v) if v < min_ios_platform() => {
            return Err(gate_error(
                major,
                format!(
                    "cordova-ios {} does not support Xcode {}. Update the platform to {} or later (cordova platform update ios).",
                    installed,
                    major,
                    min_ios_platform()
                ),
            ));
        }
        Some(_) => {}
        None => warn!("Unrecognised cordova-ios version {:?}", installed),
    }

    let manifest_path = project.join(BUILD_MANIFEST);
    if !manifest_path.is_file() {
        return Err(gate_error(
            major,
            format!(
                "{} not found in {}. Xcode {} requires a development team in {} for iOS builds.",
                BUILD_MANIFEST,
                project.display(),
                major,
                BUILD_MANIFEST
            ),
        ));
    }

    let content = fs::read_to_string(&manifest_path)
        .await
        .map_err(|e| TacoError::io(format!("reading {}", manifest_path.display()), e))?;
    let manifest: Value = serde_json::from_str(&content)?;

    let configuration = if is_debug_build(options) { "debug" } else { "release" };
    let team = manifest
        .get(IOS)
        .and_then(|ios| ios.get(configuration))
        .and_then(|cfg| cfg.get("developmentTeam"))
        .and_then(Value::as_str)
        .filter(|team| !team.trim().is_empty());

    match team {
        Some(team) => {
            info!("Xcode {} {} build signing with team {}", major, configuration, team);
            Ok(())
        }
        None => Err(gate_error(
            major,
            format!(
                "{} has no ios.{}.developmentTeam. Add your Apple development team id for {} builds.",
                BUILD_MANIFEST, configuration, configuration
            ),
        )),
    }
}
