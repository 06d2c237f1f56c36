//! Prepare, build and package commands

use crate::cli::args::PipelineArgs;
use crate::config::BuildConfig;
use crate::error::TacoResult;
use crate::pipeline::{BuildArgs, BuildSession, PlatformSet};
use console::style;

#[derive(Debug, Clone, Copy)]
enum Step {
    Prepare,
    Build,
    Package,
}

/// Execute the prepare command
pub async fn prepare(args: PipelineArgs, defaults: BuildConfig) -> TacoResult<()> {
    execute(Step::Prepare, args, defaults).await
}

/// Execute the build command
pub async fn build(args: PipelineArgs, defaults: BuildConfig) -> TacoResult<()> {
    execute(Step::Build, args, defaults).await
}

/// Execute the package command
pub async fn package(args: PipelineArgs, defaults: BuildConfig) -> TacoResult<()> {
    execute(Step::Package, args, defaults).await
}

async fn execute(step: Step, args: PipelineArgs, defaults: BuildConfig) -> TacoResult<()> {
    let mut session = BuildSession::new(defaults);
    session.configure(&args.project.overrides())?;

    let platforms = PlatformSet::new(args.platforms);
    let options = BuildArgs::Shared(args.options);

    let verb = match step {
        Step::Prepare => {
            session.prepare_project(&platforms, &options, None).await?;
            "Prepared"
        }
        Step::Build => {
            session.build_project(&platforms, &options, None).await?;
            "Built"
        }
        Step::Package => {
            session.package_project(&platforms, &options, None).await?;
            "Packaged"
        }
    };

    for outcome in session.advisories() {
        if let Some(ref error) = outcome.error {
            eprintln!("{} {} skipped: {}", style("Warning:").yellow(), outcome.stage, error);
        }
    }

    let names: Vec<&str> = platforms.iter().collect();
    println!(
        "{} {} {}",
        style("✓").green(),
        verb,
        names.join(", ")
    );
    Ok(())
}
