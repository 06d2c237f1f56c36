//! Pre-flight Node.js / Cordova compatibility check
//!
//! Old Cordova releases break on newer Node.js runtimes. The known breakages
//! are kept as a table of version-range rules:
//!
//! | Host | Cordova | Node.js | Result |
//! |------|---------|---------|--------|
//! | any | < 5.4.0 | >= 5.0.0 | newer runtime unsupported |
//! | Windows | < 5.3.3 | >= 4.0.0 | older tool unsupported |
//!
//! Versions that do not parse are treated as compatible.

use crate::config::DEFAULT_PACKAGE;
use crate::error::{TacoError, TacoResult};
use crate::orchestration::{run_checked, CommandRunner, CommandSpec, HostOs};
use semver::Version;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of the compatibility check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompatibilityResult {
    Compatible,
    IncompatibleOlderRuntime,
    IncompatibleNewerRuntime,
}

impl fmt::Display for CompatibilityResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compatible => write!(f, "compatible"),
            Self::IncompatibleOlderRuntime => write!(f, "incompatible runtime for this tool release"),
            Self::IncompatibleNewerRuntime => write!(f, "runtime newer than this tool release supports"),
        }
    }
}

struct CompatRule {
    /// Host the rule applies to; `None` = every host
    host: Option<HostOs>,
    tool_below: Version,
    runtime_at_least: Version,
    result: CompatibilityResult,
    remedy: &'static str,
}

impl CompatRule {
    fn matches(&self, tool: &Version, runtime: &Version, host: HostOs) -> bool {
        self.host.map_or(true, |h| h == host)
            && *tool < self.tool_below
            && *runtime >= self.runtime_at_least
    }
}

fn rules() -> [CompatRule; 2] {
    [
        CompatRule {
            host: None,
            tool_below: Version::new(5, 4, 0),
            runtime_at_least: Version::new(5, 0, 0),
            result: CompatibilityResult::IncompatibleNewerRuntime,
            remedy: "Use Cordova 5.4.0 or later, or install Node.js 4.x.",
        },
        CompatRule {
            host: Some(HostOs::Windows),
            tool_below: Version::new(5, 3, 3),
            runtime_at_least: Version::new(4, 0, 0),
            result: CompatibilityResult::IncompatibleOlderRuntime,
            remedy: "Use Cordova 5.3.3 or later, or install Node.js 0.12.x.",
        },
    ]
}

/// Parse `1.2.3`, `v1.2.3` or a pre-release like `5.4.0-rc.1`
pub fn parse_version(raw: &str) -> Option<Version> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(trimmed).ok()
}

/// Evaluate the rules for one tool / runtime pair
pub fn evaluate(package: &str, tool_version: &str, runtime_version: &str, host: HostOs) -> CompatibilityResult {
    match find_rule(package, tool_version, runtime_version, host) {
        Some(rule) => rule.result,
        None => CompatibilityResult::Compatible,
    }
}

fn find_rule(package: &str, tool_version: &str, runtime_version: &str, host: HostOs) -> Option<CompatRule> {
    if package != DEFAULT_PACKAGE {
        return None;
    }
    let (Some(tool), Some(runtime)) = (parse_version(tool_version), parse_version(runtime_version)) else {
        debug!(
            "Cannot compare {} with Node.js {}, assuming compatible",
            tool_version, runtime_version
        );
        return None;
    };
    rules()
        .into_iter()
        .find(|rule| rule.matches(&tool, &runtime, host))
}

/// Runs the check against the installed Node.js
pub struct CompatibilityChecker {
    runner: Arc<dyn CommandRunner>,
    host: HostOs,
}

impl CompatibilityChecker {
    pub fn new(runner: Arc<dyn CommandRunner>, host: HostOs) -> Self {
        Self { runner, host }
    }

    /// Version reported by `node --version`
    pub async fn runtime_version(&self) -> TacoResult<String> {
        let output = run_checked(self.runner.as_ref(), &CommandSpec::new("node").arg("--version")).await?;
        Ok(output.stdout.trim().to_string())
    }

    /// Check `tool_version` of `package` against the host runtime
    pub async fn check(&self, package: &str, tool_version: &str) -> TacoResult<CompatibilityResult> {
        if package != DEFAULT_PACKAGE {
            return Ok(CompatibilityResult::Compatible);
        }
        let runtime = self.runtime_version().await?;
        Ok(evaluate(package, tool_version, &runtime, self.host))
    }

    /// Fail with a remediation message unless compatible
    pub async fn ensure_compatible(&self, package: &str, tool_version: &str) -> TacoResult<()> {
        if package != DEFAULT_PACKAGE {
            return Ok(());
        }
        let runtime = self.runtime_version().await?;
        match find_rule(package, tool_version, &runtime, self.host) {
            None => {
                info!("{} {} is compatible with Node.js {}", package, tool_version, runtime);
                Ok(())
            }
            Some(rule) => Err(TacoError::Incompatible {
                package: package.to_string(),
                tool_version: tool_version.to_string(),
                runtime_version: runtime,
                result: rule.result,
                remedy: rule.remedy.to_string(),
            }),
        }
    }
}
