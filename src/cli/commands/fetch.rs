//! Fetch command - clone an action through the cache

use crate::cache::Cache;
use crate::cli::args::FetchArgs;
use crate::config::Config;
use crate::error::ActfetchResult;
use crate::fetch::{CacheCloner, GitCloner};
use crate::ui::{self, TaskSpinner, UiContext};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Execute the fetch command
pub async fn execute(args: FetchArgs, config: &Config, cache_root: &Path) -> ActfetchResult<()> {
    let ctx = UiContext::detect();
    let fetcher = CacheCloner::new(GitCloner::from_config(&config.fetch), Cache::new(cache_root))
        .with_default_host(&config.fetch.default_host);

    let target = fetcher.target(&args.reference, args.sha.as_deref())?;
    debug!(
        "Fetching {} (ref {:?}, sha {:?})",
        target.url(),
        target.selector,
        target.sha
    );

    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Fetching {}...", args.reference));
    let result = fetcher.fetch(&cancel, target).await;
    interrupt.abort();

    let fetched = match result {
        Ok(fetched) => {
            spinner.stop(&format!("Fetched {}", args.reference));
            fetched
        }
        Err(e) => {
            spinner.stop_error(&format!("Failed to fetch {}", args.reference));
            return Err(e);
        }
    };

    if fetched.manifest.is_none() {
        ui::step_warn_hint(
            &ctx,
            "No action.yml or action.yaml found",
            &fetched.action_dir.display().to_string(),
        );
    }

    println!("{}", fetched.action_dir.display());
    Ok(())
}
