//! Resolve command - show how a reference is interpreted

use crate::cli::args::{OutputFormat, ResolveArgs};
use crate::config::Config;
use crate::error::ActfetchResult;
use crate::fetch::FetchTarget;
use crate::reference::qualify;
use crate::ui::{self, UiContext};
use serde::Serialize;

/// What a reference resolves to, without touching the network
#[derive(Debug, Serialize)]
struct Resolution {
    url: String,
    selector: String,
    qualified: String,
    sha: Option<String>,
    path: String,
    strict: bool,
    cache_key: String,
}

impl From<&FetchTarget> for Resolution {
    fn from(target: &FetchTarget) -> Self {
        Self {
            url: target.url().to_string(),
            selector: target.selector.clone(),
            qualified: qualify(&target.selector),
            sha: target.sha.clone(),
            path: target.subpath.display().to_string(),
            strict: target.resolved.is_action(),
            cache_key: target.cache_key(),
        }
    }
}

/// Execute the resolve command
pub async fn execute(args: ResolveArgs, config: &Config) -> ActfetchResult<()> {
    let target = FetchTarget::resolve(&args.reference, &config.fetch.default_host, None)?;
    let resolution = Resolution::from(&target);

    match args.format {
        OutputFormat::Table => print_table(&resolution),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&resolution)?),
        OutputFormat::Plain => print_plain(&resolution),
    }

    Ok(())
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

fn print_table(resolution: &Resolution) {
    let ctx = UiContext::detect();
    ui::key_value(&ctx, "URL", &resolution.url);
    ui::key_value(&ctx, "Selector", or_dash(&resolution.selector));
    ui::key_value(&ctx, "Ref", or_dash(&resolution.qualified));
    ui::key_value(&ctx, "Commit", or_dash(resolution.sha.as_deref().unwrap_or_default()));
    ui::key_value(&ctx, "Path", or_dash(&resolution.path));
    ui::key_value(&ctx, "Key", &resolution.cache_key);
}

fn print_plain(resolution: &Resolution) {
    println!(
        "{} {} {}",
        resolution.url,
        or_dash(&resolution.qualified),
        or_dash(&resolution.path)
    );
}
