//! Shared helpers for command handlers: the console implementations of
//! the core's collaborator traits.

use owo_colors::OwoColorize;

use spindle_core::{ConfirmPrompt, Notifier};

/// Prints command outcomes to stderr so `-o json` output on stdout
/// stays machine-readable. Success lines respect `--quiet`.
pub struct ConsoleNotifier {
    pub quiet: bool,
    pub color: bool,
}

impl Notifier for ConsoleNotifier {
    fn notify_success(&self, text: &str) {
        if self.quiet {
            return;
        }
        if self.color {
            eprintln!("{} {text}", "ok".green().bold());
        } else {
            eprintln!("ok {text}");
        }
    }

    fn notify_error(&self, text: &str) {
        if self.color {
            eprintln!("{} {text}", "error".red().bold());
        } else {
            eprintln!("error {text}");
        }
    }
}

/// Interactive confirmation via dialoguer, auto-approving when `--yes`
/// was passed. A failed prompt (no TTY) counts as a decline.
pub struct CliConfirm {
    pub yes: bool,
}

impl ConfirmPrompt for CliConfirm {
    fn confirm(&self, message: &str) -> bool {
        if self.yes {
            return true;
        }
        dialoguer::Confirm::new()
            .with_prompt(message)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}
