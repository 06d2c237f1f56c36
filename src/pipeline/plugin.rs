//! Support plugin injection
//!
//! The support plugin wires IDE and task-runner hooks into the project. Later
//! stages expect its hooks to be present, so it is added before any platform
//! is provisioned.

use crate::compat::parse_version;
use crate::config::BuildConfig;
use crate::error::TacoResult;
use crate::orchestration::ToolModule;
use semver::Version;
use tracing::info;

/// Plugin id, also its directory name under `plugins/`
pub const SUPPORT_PLUGIN_ID: &str = "cordova-plugin-vs-taco-support";

/// Source-control reference for tools too old to resolve the registry id
pub const SUPPORT_PLUGIN_GIT: &str = "https://github.com/Chuxel/taco-cordova-support-plugin.git";

/// Reference to install the support plugin from for a given tool version.
///
/// Tools before 5.0.0 cannot fetch plugins from npm.
pub fn plugin_source(tool_version: &str) -> &'static str {
    match parse_version(tool_version) {
        Some(v) if v < Version::new(5, 0, 0) => SUPPORT_PLUGIN_GIT,
        _ => SUPPORT_PLUGIN_ID,
    }
}

/// Add the support plugin unless disabled or already present
pub async fn ensure_support_plugin(module: &dyn ToolModule, config: &BuildConfig) -> TacoResult<()> {
    if !config.add_support_plugin {
        return Ok(());
    }

    let installed = config.project_path.join("plugins").join(SUPPORT_PLUGIN_ID);
    if installed.exists() {
        info!("Support plugin already added.");
        return Ok(());
    }

    let source = plugin_source(module.version());
    info!("Adding support plugin from {}.", source);
    module.plugin_add(&config.project_path, source).await
}
