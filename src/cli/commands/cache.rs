//! Cache command - install the configured tool version

use crate::cli::args::CacheArgs;
use crate::config::BuildConfig;
use crate::error::TacoResult;
use crate::pipeline::BuildSession;
use console::style;

/// Execute the cache command
pub async fn execute(args: CacheArgs, defaults: BuildConfig) -> TacoResult<()> {
    let mut session = BuildSession::new(defaults);
    let entry = session.cache_module(&args.project.overrides()).await?;

    println!(
        "{} {}@{}",
        style("✓").green(),
        entry.package_name,
        entry.version
    );
    println!("  {}", style(entry.path.display()).dim());
    Ok(())
}
