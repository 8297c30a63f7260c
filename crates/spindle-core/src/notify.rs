// ── Collaborator seams ──
//
// The controller never renders anything itself; it reports outcomes
// through these traits. Frontends supply concrete implementations
// (the CLI prints, a web shell would toast).

use tracing::{info, warn};

/// Fire-and-forget outcome sink. Implementations must not block the
/// caller.
pub trait Notifier: Send + Sync {
    fn notify_success(&self, text: &str);
    fn notify_error(&self, text: &str);
}

/// Asked before irreversible actions (array deletion). Returning false
/// abandons the command before the gate is ever acquired.
pub trait ConfirmPrompt: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

/// Notifier that only logs. Useful for headless runs and tests.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify_success(&self, text: &str) {
        info!("{text}");
    }

    fn notify_error(&self, text: &str) {
        warn!("{text}");
    }
}

/// Prompt that approves everything (`--yes` flows, tests).
pub struct AutoConfirm;

impl ConfirmPrompt for AutoConfirm {
    fn confirm(&self, _message: &str) -> bool {
        true
    }
}
