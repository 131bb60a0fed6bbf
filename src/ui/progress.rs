//! Progress indicators with CI fallback

use super::context::UiContext;
use console::style;

/// A task spinner with CI fallback
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
}

impl TaskSpinner {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
        }
    }

    /// Start the spinner with a message
    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else {
            eprintln!("{} {}", style("...").dim(), message);
        }
    }

    /// Stop with success message
    pub fn stop(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        } else if self.interactive {
            eprintln!("{} {}", style("✓").green(), message);
        } else {
            eprintln!("{} {}", style("[OK]").green(), message);
        }
    }

    /// Stop with error message
    pub fn stop_error(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.error(message);
        } else if self.interactive {
            eprintln!("{} {}", style("✗").red(), message);
        } else {
            eprintln!("{} {}", style("[FAIL]").red(), message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spinner_non_interactive() {
        let ctx = UiContext::non_interactive();
        let mut spinner = TaskSpinner::new(&ctx);
        spinner.start("Fetching...");
        spinner.stop("Done");

        spinner.start("Fetching again...");
        spinner.stop_error("Failed");
        // Should not panic
    }
}
