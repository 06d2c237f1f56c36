//! Version-keyed on-disk module cache
//!
//! Installed copies of the tool package live at
//! `<cache_root>/<package>/<version>/node_modules/<package>`. A pair is cached
//! exactly when that directory exists, which makes installation idempotent.
//!
//! # Layout
//!
//! | Path | Contents |
//! |------|----------|
//! | `<root>/<package>/<version>/` | npm install working directory |
//! | `<root>/_cordova/` | the tool's own platform cache (`CORDOVA_HOME`) |
//! | `<root>/_plugman/` | the tool's plugin cache (`PLUGMAN_HOME`) |
//!
//! There is no locking: two overlapping installs of the same pair race.

pub mod module;
pub mod registry;
pub mod root;
pub mod version;

pub use module::{CacheEntry, ModuleCache};
pub use registry::Registry;
pub use root::{resolve_cache_root, tool_env};
pub use version::{default_version_var, resolve_version};

use std::path::{Path, PathBuf};

/// Install directory for one package version
pub fn version_dir(cache_root: &Path, package: &str, version: &str) -> PathBuf {
    cache_root.join(package).join(version)
}

/// Directory the installed module is loaded from
pub fn module_path(cache_root: &Path, package: &str, version: &str) -> PathBuf {
    version_dir(cache_root, package, version)
        .join("node_modules")
        .join(package)
}
