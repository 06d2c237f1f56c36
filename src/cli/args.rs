//! CLI argument definitions using clap derive

use crate::config::ConfigOverrides;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// taco-build - Cordova toolkit cache and build driver
///
/// Installs the Cordova version a project asks for into a shared cache and
/// runs the platform build pipeline with it.
#[derive(Parser, Debug)]
#[command(name = "taco-build")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "TACO_BUILD_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Prepare platforms without compiling
    Prepare(PipelineArgs),

    /// Build platforms
    Build(PipelineArgs),

    /// Package built platforms (legacy iOS .ipa creation)
    Package(PipelineArgs),

    /// Install the configured tool version into the cache
    Cache(CacheArgs),
}

/// Options shared by every command that resolves a tool module
#[derive(Args, Debug, Default)]
pub struct ProjectArgs {
    /// Cordova project root (defaults to current directory)
    #[arg(long)]
    pub project: Option<PathBuf>,

    /// Tool version or range (overrides taco.json)
    #[arg(long)]
    pub module_version: Option<String>,

    /// npm package providing the tool
    #[arg(long)]
    pub package_name: Option<String>,

    /// Root of the module cache
    #[arg(long)]
    pub cache_root: Option<PathBuf>,

    /// Do not add the support plugin to the project
    #[arg(long)]
    pub no_support_plugin: bool,
}

impl ProjectArgs {
    /// Config overrides for the flags that were given
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            project_path: self.project.clone(),
            package_name: self.package_name.clone(),
            module_version: self.module_version.clone(),
            add_support_plugin: self.no_support_plugin.then_some(false),
            cache_root: self.cache_root.clone(),
        }
    }
}

/// Arguments for prepare, build and package
#[derive(Parser, Debug)]
pub struct PipelineArgs {
    /// Platform to process, in order (repeatable or comma separated)
    #[arg(short, long = "platform", value_name = "PLATFORM", value_delimiter = ',', required = true)]
    pub platforms: Vec<String>,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Options passed through to the tool (after --)
    #[arg(last = true, value_name = "TOOL_ARGS")]
    pub options: Vec<String>,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}
