use tracing::{error, info};

/// Delivers user-facing notifications. The client calls it exactly once per
/// settled operation.
pub trait Notifier: Send + Sync {
    fn notify_success(&self, message: &str);

    fn notify_info(&self, message: &str);

    fn notify_error(&self, message: &str);
}

/// Writes notifications to the log. Used when no UI is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_success(&self, message: &str) {
        info!(target: "notify", "{}", message);
    }

    fn notify_info(&self, message: &str) {
        info!(target: "notify", "{}", message);
    }

    fn notify_error(&self, message: &str) {
        error!(target: "notify", "{}", message);
    }
}
