//! Legacy iOS packaging
//!
//! cordova-ios 3.9.0 and later produce the `.ipa` during the build. Older
//! platforms leave a `.app` bundle that has to be packaged with `xcrun`.

use crate::compat::parse_version;
use crate::error::{TacoError, TacoResult};
use crate::orchestration::{run_checked, CommandRunner, CommandSpec};
use crate::pipeline::platforms::{installed_platform_version, platform_dir};
use crate::pipeline::postprocess::IOS;
use semver::Version;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

fn self_packaging_version() -> Version {
    Version::new(3, 9, 0)
}

/// Whether an installed cordova-ios version still needs the packaging step
pub fn needs_legacy_packaging(installed: &str) -> bool {
    match parse_version(installed) {
        Some(v) => v < self_packaging_version(),
        None => {
            warn!("Unrecognised cordova-ios version {:?}, assuming it packages itself", installed);
            false
        }
    }
}

/// Run the package step for one platform
pub async fn package_platform(
    runner: &dyn CommandRunner,
    project: &Path,
    platform: &str,
    options: &[String],
) -> TacoResult<()> {
    if platform != IOS {
        info!("Platform {} does not require a separate package step.", platform);
        return Ok(());
    }

    let installed = installed_platform_version(runner, project, IOS).await?;
    if !needs_legacy_packaging(&installed) {
        info!(
            "cordova-ios {} creates the ipa during build, skipping package step.",
            installed
        );
        return Ok(());
    }

    create_ipa(runner, project, options).await
}

/// The single `.app` bundle in `dir`
async fn find_app(dir: &Path) -> TacoResult<PathBuf> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| TacoError::io(format!("reading {}", dir.display()), e))?;

    let mut apps = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| TacoError::io(format!("reading {}", dir.display()), e))?
    {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "app") {
            apps.push(path);
        }
    }

    match apps.len() {
        1 => Ok(apps.remove(0)),
        found => Err(TacoError::Package(format!(
            "Expected only one .app in {} - found {}",
            dir.display(),
            found
        ))),
    }
}

async fn create_ipa(runner: &dyn CommandRunner, project: &Path, options: &[String]) -> TacoResult<()> {
    let device_dir = platform_dir(project, IOS).join("build").join("device");
    let app = find_app(&device_dir).await?;
    let name = app
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .ok_or_else(|| TacoError::Package(format!("Invalid app bundle {}", app.display())))?;
    let ipa = device_dir.join(format!("{}.ipa", name));

    let cmd = CommandSpec::new("xcrun")
        .args(["-v", "-sdk", "iphoneos", "PackageApplication"])
        .arg(app.to_string_lossy())
        .arg("-o")
        .arg(ipa.to_string_lossy())
        .args(options.iter().cloned())
        .cwd(project);

    info!("Exec: {}", cmd.display());
    run_checked(runner, &cmd).await?;
    info!("Created {}", ipa.display());
    Ok(())
}
