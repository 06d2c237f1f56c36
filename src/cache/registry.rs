//! npm registry queries and installs

use crate::error::{TacoError, TacoResult};
use crate::orchestration::{CommandRunner, CommandSpec, HostOs};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Thin wrapper over the npm command line
#[derive(Clone)]
pub struct Registry {
    runner: Arc<dyn CommandRunner>,
    npm: &'static str,
}

impl Registry {
    pub fn new(runner: Arc<dyn CommandRunner>, host: HostOs) -> Self {
        Self {
            runner,
            npm: host.npm_program(),
        }
    }

    /// Exact published version that `spec` (version, range or latest) maps to
    pub async fn exact_version(&self, package: &str, spec: Option<&str>) -> TacoResult<String> {
        let target = package_spec(package, spec);
        let cmd = CommandSpec::new(self.npm).args(["view", target.as_str(), "version"]);
        debug!("Resolving {} against the registry", target);

        let output = self.runner.run(&cmd).await?;
        if !output.success() {
            return Err(TacoError::RegistryLookup {
                package: target,
                output: output.combined(),
            });
        }

        parse_view_output(&output.stdout).ok_or_else(|| TacoError::RegistryLookup {
            package: target,
            output: "no published version matches".to_string(),
        })
    }

    /// `npm install <package>@<version>` with `dir` as working directory.
    ///
    /// Failure carries npm's output verbatim.
    pub async fn install(&self, package: &str, version: &str, dir: &Path) -> TacoResult<()> {
        let target = package_spec(package, Some(version));
        info!("Installing {}. (This may take a few minutes.)", target);

        let cmd = CommandSpec::new(self.npm)
            .args(["install", target.as_str()])
            .cwd(dir);
        let output = match self.runner.run(&cmd).await {
            Ok(output) => output,
            Err(TacoError::CommandFailed { source, .. }) => {
                return Err(TacoError::Install {
                    package: target,
                    output: source.to_string(),
                })
            }
            Err(e) => return Err(e),
        };

        if output.success() {
            info!("Exec complete.");
            Ok(())
        } else {
            Err(TacoError::Install {
                package: target,
                output: output.combined(),
            })
        }
    }
}

fn package_spec(package: &str, spec: Option<&str>) -> String {
    match spec {
        Some(v) => format!("{}@{}", package, v),
        None => package.to_string(),
    }
}

/// Pick the version out of `npm view ... version` output.
///
/// A range prints one `name@x.y.z 'x.y.z'` line per match; the highest
/// version comes last.
pub fn parse_view_output(stdout: &str) -> Option<String> {
    let line = stdout.lines().map(str::trim).rfind(|l| !l.is_empty())?;
    let version = match (line.find('\''), line.rfind('\'')) {
        (Some(start), Some(end)) if end > start => &line[start + 1..end],
        _ => line,
    };
    Some(version.to_string()).filter(|v| !v.is_empty())
}
