//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{ActfetchError, ActfetchResult};
use crate::ui::{self, UiContext};
use std::path::PathBuf;

/// Keys accepted by `config set`
const VALID_KEYS: [&str; 10] = [
    "general.log_format",
    "cache.root",
    "fetch.default_host",
    "fetch.token_env",
    "fetch.depth",
    "fetch.timeout_secs",
    "fetch.retry.max_attempts",
    "fetch.retry.initial_interval_ms",
    "fetch.retry.max_interval_ms",
    "fetch.retry.max_elapsed_ms",
];

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    manager: &ConfigManager,
) -> ActfetchResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => show_path(manager),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => set_value(manager, config, &key, &value).await?,
    }

    Ok(())
}

fn show_config(config: &Config) -> ActfetchResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn show_path(manager: &ConfigManager) {
    println!("{}", manager.path().display());
}

async fn init_config(manager: &ConfigManager, force: bool) -> ActfetchResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;

    ui::step_ok_detail(
        &ctx,
        "Configuration initialized",
        &path.display().to_string(),
    );

    Ok(())
}

async fn set_value(
    manager: &ConfigManager,
    config: &Config,
    key: &str,
    value: &str,
) -> ActfetchResult<()> {
    let ctx = UiContext::detect();
    let mut config = config.clone();

    if let Err(e) = apply(&mut config, key, value) {
        ui::step_error_detail(&ctx, "Cannot set config key", key);
        ui::remark(&ctx, &format!("Valid keys: {}", VALID_KEYS.join(", ")));
        return Err(e);
    }

    manager.save(&config).await?;
    ui::step_ok(&ctx, &format!("Set {} = {}", key, value));

    Ok(())
}

/// Apply a dotted `key = value` to `config`
fn apply(config: &mut Config, key: &str, value: &str) -> ActfetchResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "log_format"] => match value {
            "text" | "json" => config.general.log_format = value.to_string(),
            _ => {
                return Err(ActfetchError::User(format!(
                    "Invalid log format: {}. Use text/json",
                    value
                )))
            }
        },
        ["cache", "root"] => {
            config.cache.root = (!value.is_empty()).then(|| PathBuf::from(value));
        }
        ["fetch", "default_host"] => config.fetch.default_host = value.to_string(),
        ["fetch", "token_env"] => config.fetch.token_env = value.to_string(),
        ["fetch", "depth"] => config.fetch.depth = parse_number(value)?,
        ["fetch", "timeout_secs"] => config.fetch.timeout_secs = parse_number(value)?,
        ["fetch", "retry", "max_attempts"] => config.fetch.retry.max_attempts = parse_number(value)?,
        ["fetch", "retry", "initial_interval_ms"] => {
            config.fetch.retry.initial_interval_ms = parse_number(value)?
        }
        ["fetch", "retry", "max_interval_ms"] => {
            config.fetch.retry.max_interval_ms = parse_number(value)?
        }
        ["fetch", "retry", "max_elapsed_ms"] => {
            config.fetch.retry.max_elapsed_ms = parse_number(value)?
        }
        _ => return Err(ActfetchError::User(format!("Unknown config key: {}", key))),
    }

    Ok(())
}

fn parse_number<T: std::str::FromStr>(value: &str) -> ActfetchResult<T> {
    value
        .parse()
        .map_err(|_| ActfetchError::User(format!("Invalid number: {}", value)))
}
