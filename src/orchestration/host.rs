//! Host operating system detection

use std::fmt;

/// Operating system family of the machine running the build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    /// macOS - the only host that can run the iOS toolchain
    MacOS,
    /// Linux
    Linux,
    /// Windows
    Windows,
    /// Anything else
    Other,
}

impl HostOs {
    /// Detect the current host
    pub fn detect() -> Self {
        match std::env::consts::OS {
            "macos" => HostOs::MacOS,
            "linux" => HostOs::Linux,
            "windows" => HostOs::Windows,
            _ => HostOs::Other,
        }
    }

    /// Get a human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            HostOs::MacOS => "macOS",
            HostOs::Linux => "Linux",
            HostOs::Windows => "Windows",
            HostOs::Other => "Unknown",
        }
    }

    /// Whether files on this host carry POSIX permission bits
    pub fn is_posix(&self) -> bool {
        matches!(self, HostOs::MacOS | HostOs::Linux)
    }

    /// Program name used to invoke npm
    pub fn npm_program(&self) -> &'static str {
        match self {
            HostOs::Windows => "npm.cmd",
            _ => "npm",
        }
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
