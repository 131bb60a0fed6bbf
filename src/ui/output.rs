//! Output functions for consistent CLI formatting
//!
//! Status lines go to stderr. Stdout is reserved for command results.

use super::context::UiContext;
use console::style;

/// Display a success step
pub fn step_ok(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::success(message).ok();
    } else {
        eprintln!("  {} {}", style("[OK]").green(), message);
    }
}

/// Display a success step with detail
pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::success(format!("{} ({})", message, style(detail).dim())).ok();
    } else {
        eprintln!("  {} {} ({})", style("[OK]").green(), message, detail);
    }
}

/// Display a warning step with hint
pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::warning(format!("{} - {}", message, style(hint).dim())).ok();
    } else {
        eprintln!("  {} {} - {}", style("[WARN]").yellow(), message, hint);
    }
}

/// Display an error step with detail
pub fn step_error_detail(ctx: &UiContext, message: &str, detail: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::error(format!("{}: {}", message, style(detail).red())).ok();
    } else {
        eprintln!("  {} {}: {}", style("[FAIL]").red(), message, detail);
    }
}

/// Display a remark/hint
pub fn remark(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::remark(message).ok();
    } else {
        eprintln!("  {}", style(message).dim());
    }
}

/// Print a key-value pair as a command result (stdout)
pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    if ctx.use_fancy_output() {
        println!("{:<10} {}", style(format!("{}:", key)).dim(), value);
    } else {
        println!("{:<10} {}", format!("{}:", key), value);
    }
}
