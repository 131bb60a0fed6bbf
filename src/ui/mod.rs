//! UI module for consistent CLI output
//!
//! Uses `cliclack` for styled status lines and spinners on a terminal,
//! with automatic fallback to plain output in CI/non-interactive environments.
//!
//! # Example
//!
//! ```rust,ignore
//! use actfetch::ui::{self, UiContext, TaskSpinner};
//!
//! let ctx = UiContext::detect();
//!
//! let mut spinner = TaskSpinner::new(&ctx);
//! spinner.start("Fetching actions/checkout@v4...");
//! // ... do work ...
//! spinner.stop("Fetched actions/checkout@v4");
//!
//! ui::step_warn_hint(&ctx, "No action manifest", "Check the action path");
//! ```

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{key_value, remark, step_error_detail, step_ok, step_ok_detail, step_warn_hint};
pub use progress::TaskSpinner;
