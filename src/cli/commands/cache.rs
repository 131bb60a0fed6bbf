//! Cache command - inspect the action cache

use crate::cache::{Cache, CacheEntry, CacheState};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::Config;
use crate::error::ActfetchResult;
use crate::fetch::FetchTarget;
use crate::ui::{self, UiContext};
use console::style;
use std::path::Path;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config, cache_root: &Path) -> ActfetchResult<()> {
    let cache = Cache::new(cache_root);

    match args.action {
        CacheAction::List { format } => list_entries(&cache, format).await,
        CacheAction::Info { reference, sha } => {
            show_entry_info(&cache, config, &reference, sha.as_deref())
        }
    }
}

/// List all cache entries
async fn list_entries(cache: &Cache, format: OutputFormat) -> ActfetchResult<()> {
    let entries = cache.list().await?;

    if entries.is_empty() && format != OutputFormat::Json {
        eprintln!("No cache entries in {}", cache.root().display());
        return Ok(());
    }

    match format {
        OutputFormat::Table => print_entry_table(&entries),
        OutputFormat::Json => print_entry_json(&entries)?,
        OutputFormat::Plain => print_entry_plain(&entries),
    }

    Ok(())
}

/// Colored state label, padded to `width` before styling
fn styled_state(state: CacheState, width: usize) -> String {
    let label = format!("{:<width$}", state.to_string(), width = width);
    match state {
        CacheState::Complete => style(label).green().to_string(),
        CacheState::Building => style(label).yellow().to_string(),
        CacheState::Miss => style(label).dim().to_string(),
    }
}

fn completed(entry: &CacheEntry) -> String {
    entry
        .completed_at()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn print_entry_table(entries: &[CacheEntry]) {
    println!("{:<66} {:<10} {:<20}", "DIGEST", "STATE", "COMPLETED");
    println!("{}", "-".repeat(96));

    for entry in entries {
        println!(
            "{:<66} {} {:<20}",
            entry.digest(),
            styled_state(entry.state(), 10),
            completed(entry)
        );
    }

    println!();
    println!("Total: {} entr{}", entries.len(), if entries.len() == 1 { "y" } else { "ies" });
}

fn print_entry_json(entries: &[CacheEntry]) -> ActfetchResult<()> {
    #[derive(serde::Serialize)]
    struct EntryJson {
        digest: String,
        state: CacheState,
        path: String,
        completed_at: Option<String>,
    }

    let json_entries: Vec<EntryJson> = entries
        .iter()
        .map(|e| EntryJson {
            digest: e.digest(),
            state: e.state(),
            path: e.payload_dir().display().to_string(),
            completed_at: e.completed_at().map(|t| t.to_rfc3339()),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&json_entries)?);
    Ok(())
}

fn print_entry_plain(entries: &[CacheEntry]) {
    for entry in entries {
        println!("{}", entry.payload_dir().display());
    }
}

/// Show the cache entry a reference maps to
fn show_entry_info(
    cache: &Cache,
    config: &Config,
    reference: &str,
    sha: Option<&str>,
) -> ActfetchResult<()> {
    let ctx = UiContext::detect();
    let target = FetchTarget::resolve(reference, &config.fetch.default_host, sha)?;
    let key = target.cache_key();
    let entry = cache.entry(&key);
    let state = entry.state();

    ui::key_value(&ctx, "Reference", reference);
    ui::key_value(&ctx, "Key", &key);
    ui::key_value(&ctx, "Digest", &entry.digest());
    ui::key_value(&ctx, "Directory", &entry.dir().display().to_string());
    ui::key_value(&ctx, "State", &styled_state(state, 0));
    ui::key_value(&ctx, "Completed", &completed(&entry));
    if state == CacheState::Complete {
        ui::key_value(
            &ctx,
            "Action",
            &target.action_dir(&entry.payload_dir()).display().to_string(),
        );
    }

    Ok(())
}
