//! Error types for taco-build
//!
//! All modules use `TacoResult<T>` as their return type.

use crate::compat::CompatibilityResult;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for taco-build operations
pub type TacoResult<T> = Result<T, TacoError>;

/// All errors that can occur while provisioning or building
#[derive(Error, Debug)]
pub enum TacoError {
    // Configuration errors
    #[error("Specified project path does not exist: \"{}\"", .0.display())]
    ProjectPathMissing(PathBuf),

    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Failed to create directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Pre-flight errors
    #[error("{package} {tool_version} is not compatible with Node.js {runtime_version} ({result}). {remedy}")]
    Incompatible {
        package: String,
        tool_version: String,
        runtime_version: String,
        result: CompatibilityResult,
        remedy: String,
    },

    // Install errors
    #[error("Failed to look up {package} in the npm registry:\n{output}")]
    RegistryLookup { package: String, output: String },

    #[error("npm install {package} failed:\n{output}")]
    Install { package: String, output: String },

    #[error("Failed to load module at {path}: {reason}")]
    ModuleLoad { path: PathBuf, reason: String },

    // Build errors
    #[error("Xcode {xcode_major} build check failed: {reason}")]
    ToolchainGate { xcode_major: u64, reason: String },

    #[error("Packaging failed: {0}")]
    Package(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command execution error: {command}, output:\n{output}")]
    CommandExecution { command: String, output: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TacoError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command execution error
    pub fn command_exec(command: impl Into<String>, output: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
            output: output.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ProjectPathMissing(_) => {
                Some("Pass --project pointing at the Cordova project root")
            }
            Self::Incompatible { .. } => {
                Some("Pin a compatible version with --module-version or in taco.json")
            }
            Self::ToolchainGate { .. } => {
                Some("See https://cordova.apache.org/docs/en/latest/guide/platforms/ios/ for build.json signing settings")
            }
            Self::RegistryLookup { .. } => Some("Check network access and that npm is on PATH"),
            Self::CommandFailed { .. } => Some("Check that node and npm are installed and on PATH"),
            _ => None,
        }
    }
}
