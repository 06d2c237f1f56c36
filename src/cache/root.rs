//! Cache root discovery

use crate::orchestration::HostOs;
use std::path::{Path, PathBuf};

/// Explicit cache root
pub const CACHE_ENV: &str = "CORDOVA_CACHE";

/// TACO home; the cache lives in its `node_modules/cordova`
pub const TACO_HOME_ENV: &str = "TACO_HOME";

/// Pick the cache root from the environment.
///
/// `CORDOVA_CACHE` wins, then `TACO_HOME`, then the per-OS TACO default.
/// `lookup` reads one environment variable.
pub fn resolve_cache_root(lookup: impl Fn(&str) -> Option<String>, os: HostOs) -> PathBuf {
    let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(cache) = non_empty(CACHE_ENV) {
        return absolute_or_raw(PathBuf::from(cache));
    }

    let taco_home = match non_empty(TACO_HOME_ENV) {
        Some(home) => absolute_or_raw(PathBuf::from(home)),
        None => default_taco_home(os),
    };
    taco_home.join("node_modules").join("cordova")
}

fn default_taco_home(os: HostOs) -> PathBuf {
    match os {
        HostOs::Windows => dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("taco_home"),
        _ => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".taco_home"),
    }
}

fn absolute_or_raw(path: PathBuf) -> PathBuf {
    std::path::absolute(&path).unwrap_or(path)
}

/// Environment handed to the wrapped tool so its own platform and plugin
/// caches live under the cache root.
pub fn tool_env(cache_root: &Path) -> Vec<(String, String)> {
    vec![
        (
            "CORDOVA_HOME".to_string(),
            cache_root.join("_cordova").to_string_lossy().to_string(),
        ),
        (
            "PLUGMAN_HOME".to_string(),
            cache_root.join("_plugman").to_string_lossy().to_string(),
        ),
    ]
}
