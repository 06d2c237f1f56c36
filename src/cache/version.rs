//! Tool version resolution
//!
//! Precedence for the default package: `taco.json` pin (only when no version
//! is configured), then the configured version, then
//! `<PACKAGE>_DEFAULT_VERSION`, then latest. Custom packages never read
//! `taco.json`.

use crate::config::BuildConfig;
use crate::error::{TacoError, TacoResult};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Project manifest that may pin the tool version
pub const PROJECT_MANIFEST: &str = "taco.json";

#[derive(Debug, Default, Deserialize)]
struct TacoManifest {
    #[serde(rename = "cordova-cli")]
    cordova_cli: Option<String>,
}

/// Name of the environment variable holding a package's default version
pub fn default_version_var(package: &str) -> String {
    let upper: String = package
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{}_DEFAULT_VERSION", upper)
}

/// Read the `cordova-cli` pin from the project's `taco.json`, if any
pub async fn manifest_version(project: &Path) -> TacoResult<Option<String>> {
    let path = project.join(PROJECT_MANIFEST);
    if !path.is_file() {
        return Ok(None);
    }
    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| TacoError::io(format!("reading {}", path.display()), e))?;
    let manifest: TacoManifest = serde_json::from_str(&content)?;
    Ok(manifest
        .cordova_cli
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

/// Version (or range) to install for `config`; `None` means latest
pub async fn resolve_version(config: &BuildConfig) -> TacoResult<Option<String>> {
    if config.module_version.is_none() && config.is_default_package() {
        if let Some(pinned) = manifest_version(&config.project_path).await? {
            info!(
                "{} version set to {} based on the contents of {}",
                config.package_name, pinned, PROJECT_MANIFEST
            );
            return Ok(Some(pinned));
        }
    }

    if let Some(ref version) = config.module_version {
        return Ok(Some(version.clone()));
    }

    let var = default_version_var(&config.package_name);
    match std::env::var(&var).ok().filter(|v| !v.is_empty()) {
        Some(version) => {
            info!("{} version set to {} from {}", config.package_name, version, var);
            Ok(Some(version))
        }
        None => Ok(None),
    }
}
